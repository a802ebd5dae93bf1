//! mtg-rules - command line driver
//!
//! Plays demo games between the built-in controllers using the sample decks.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use mtg_rules::{
    catalog,
    core::PlayerId,
    game::{
        GameConfig, GameEndReason, GameLoop, GameResult, GameState, OutputFormat, PlayerController,
        RandomController, VerbosityLevel, ZeroController,
    },
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

/// Controller type for a player
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Never acts (goldfish)
    Zero,
    /// Makes random legal choices
    Random,
}

/// Verbosity level for game output (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "mtg-rules")]
#[command(about = "Turn-based card game rules engine", long_about = None)]
struct Cli {
    /// Game configuration file (JSON); missing fields use the defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game and print its log
    Play {
        /// Deck for player 1 (green, red or azorius)
        #[arg(long, default_value = "green")]
        deck1: String,

        /// Deck for player 2
        #[arg(long, default_value = "red")]
        deck2: String,

        /// Player 1 controller type
        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        /// Player 2 controller type
        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        /// Set random seed for deterministic games
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of turns before the game is called
        #[arg(long)]
        max_turns: Option<u32>,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityArg,

        /// Print log entries as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Run many independent games in parallel and print win statistics
    Simulate {
        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: u64,

        #[arg(long, default_value = "green")]
        deck1: String,

        #[arg(long, default_value = "red")]
        deck2: String,

        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        /// Base seed; game i uses seed + i
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GameConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Play {
            deck1,
            deck2,
            p1,
            p2,
            seed,
            max_turns,
            verbosity,
            json,
        } => run_play(config, &deck1, &deck2, p1, p2, seed, max_turns, verbosity.0, json),
        Commands::Simulate {
            games,
            deck1,
            deck2,
            p1,
            p2,
            seed,
        } => run_simulate(config, games, &deck1, &deck2, p1, p2, seed),
    }
}

fn make_controller(kind: ControllerType, player: PlayerId, seed: u64) -> Box<dyn PlayerController> {
    match kind {
        ControllerType::Zero => Box::new(ZeroController::new(player)),
        ControllerType::Random => Box::new(RandomController::with_seed(player, seed)),
    }
}

fn new_game(config: GameConfig, deck1: &str, deck2: &str) -> anyhow::Result<GameState> {
    let mut game = GameState::new(&["Player 1", "Player 2"], config);
    for (player, name) in [(PlayerId::new(0), deck1), (PlayerId::new(1), deck2)] {
        let Some(deck) = catalog::deck_by_name(name) else {
            bail!(
                "unknown deck '{name}' (expected one of: {})",
                catalog::DECK_NAMES.join(", ")
            );
        };
        game.build_deck(player, &deck)?;
    }
    Ok(game)
}

#[allow(clippy::too_many_arguments)]
fn run_play(
    config: GameConfig,
    deck1: &str,
    deck2: &str,
    p1: ControllerType,
    p2: ControllerType,
    seed: Option<u64>,
    max_turns: Option<u32>,
    verbosity: VerbosityLevel,
    json: bool,
) -> anyhow::Result<()> {
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);
    let config = GameConfig {
        max_turns: max_turns.unwrap_or(config.max_turns),
        ..config.with_seed(seed)
    };
    let mut game = new_game(config, deck1, deck2)?;
    if json {
        game.logger.set_output_format(OutputFormat::Json);
    }
    let mut controllers = vec![
        make_controller(p1, PlayerId::new(0), seed.wrapping_add(1)),
        make_controller(p2, PlayerId::new(1), seed.wrapping_add(2)),
    ];

    let result = GameLoop::new(&mut game)
        .with_verbosity(verbosity)
        .run_game(&mut controllers)?;

    println!("\nSeed: {seed}");
    println!("Turns played: {}", result.turns_played);
    match result.end_reason {
        GameEndReason::Victory(winner) => {
            println!("Winner: {}", game.describe_target(winner.into()));
        }
        other => println!("No winner ({other:?})"),
    }
    for player in &game.players {
        println!("  {}: {} life", player.name, player.life);
    }
    Ok(())
}

fn run_simulate(
    config: GameConfig,
    games: u64,
    deck1: &str,
    deck2: &str,
    p1: ControllerType,
    p2: ControllerType,
    seed: u64,
) -> anyhow::Result<()> {
    println!("Running {games} games: {deck1} ({p1:?}) vs {deck2} ({p2:?})");
    let start = Instant::now();

    // Each game owns its state, so games run independently
    let results: Vec<anyhow::Result<GameResult>> = (0..games)
        .into_par_iter()
        .map(|i| {
            let game_seed = seed.wrapping_add(i);
            let mut game = new_game(config.clone().with_seed(game_seed), deck1, deck2)?;
            game.logger.set_verbosity(VerbosityLevel::Silent);
            let mut controllers = vec![
                make_controller(p1, PlayerId::new(0), game_seed.wrapping_mul(2)),
                make_controller(p2, PlayerId::new(1), game_seed.wrapping_mul(2).wrapping_add(1)),
            ];
            Ok(GameLoop::new(&mut game).run_game(&mut controllers)?)
        })
        .collect();

    let mut wins = [0u64; 2];
    let mut draws = 0u64;
    let mut turn_limit = 0u64;
    let mut failed = 0u64;
    let mut turns = 0u64;
    for result in &results {
        match result {
            Ok(result) => {
                turns += u64::from(result.turns_played);
                match result.end_reason {
                    GameEndReason::Victory(winner) => wins[winner.index().min(1)] += 1,
                    GameEndReason::TurnLimit => turn_limit += 1,
                    GameEndReason::Draw | GameEndReason::Manual => draws += 1,
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Warning: game failed: {e:#}");
            }
        }
    }

    let elapsed = start.elapsed();
    let finished = games - failed;
    let pct = |n: u64| {
        if finished == 0 {
            0.0
        } else {
            100.0 * n as f64 / finished as f64
        }
    };
    println!("\n=== Simulation Complete ===");
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    println!("Games per second: {:.2}", games as f64 / elapsed.as_secs_f64());
    println!("P1 wins: {} ({:.1}%)", wins[0], pct(wins[0]));
    println!("P2 wins: {} ({:.1}%)", wins[1], pct(wins[1]));
    println!("Draws: {} ({:.1}%)", draws, pct(draws));
    println!("Turn limit: {} ({:.1}%)", turn_limit, pct(turn_limit));
    if finished > 0 {
        println!("Average turns: {:.1}", turns as f64 / finished as f64);
    }
    if failed > 0 {
        bail!("{failed} games failed");
    }
    Ok(())
}
