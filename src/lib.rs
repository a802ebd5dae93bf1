//! mtg-rules - a rules engine for a turn-based collectible card game
//!
//! The game lives in one [`game::GameState`]; [`game::GameLoop`] drives turns
//! and priority over it. Decisions are delegated to
//! [`game::PlayerController`] implementations.

pub mod catalog;
pub mod core;
pub mod error;
pub mod game;
pub mod zones;

pub use error::{MtgError, Result};
