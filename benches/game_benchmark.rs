//! Performance benchmarks for the rules engine
//!
//! Measures full games using Criterion.rs. Every iteration builds a fresh
//! game from the sample decks, so setup cost (deck building, shuffling) is
//! part of the measurement.
//!
//! Two matchups are measured:
//!
//! 1. **Goldfish** - ZeroController vs ZeroController; turn structure only
//! 2. **Random** - RandomController vs RandomController; actions, stack, combat

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mtg_rules::{
    catalog,
    core::PlayerId,
    game::{
        GameConfig, GameLoop, GameResult, GameState, PlayerController, RandomController,
        VerbosityLevel, ZeroController,
    },
    Result,
};
use std::time::{Duration, Instant};

/// Metrics collected during game execution
#[derive(Debug, Clone)]
struct GameMetrics {
    /// Total turns played
    turns: u32,
    /// Game duration
    duration: Duration,
}

impl GameMetrics {
    fn games_per_sec(&self) -> f64 {
        1.0 / self.duration.as_secs_f64()
    }

    fn turns_per_sec(&self) -> f64 {
        self.turns as f64 / self.duration.as_secs_f64()
    }
}

fn new_game(seed: u64) -> Result<GameState> {
    let config = GameConfig::default().with_seed(seed);
    let mut game = GameState::new(&["Player 1", "Player 2"], config);
    game.build_deck(PlayerId::new(0), &catalog::green_deck())?;
    game.build_deck(PlayerId::new(1), &catalog::red_deck())?;
    game.logger.set_verbosity(VerbosityLevel::Silent);
    Ok(game)
}

fn run_game(seed: u64, random: bool) -> Result<GameResult> {
    let mut game = new_game(seed)?;
    let mut controllers: Vec<Box<dyn PlayerController>> = if random {
        vec![
            Box::new(RandomController::with_seed(PlayerId::new(0), seed)),
            Box::new(RandomController::with_seed(PlayerId::new(1), seed.wrapping_add(1))),
        ]
    } else {
        vec![
            Box::new(ZeroController::new(PlayerId::new(0))),
            Box::new(ZeroController::new(PlayerId::new(1))),
        ]
    };
    GameLoop::new(&mut game).run_game(&mut controllers)
}

/// Run one game outside criterion and print its throughput
fn report(name: &str, seed: u64, random: bool) {
    let start = Instant::now();
    match run_game(seed, random) {
        Ok(result) => {
            let metrics = GameMetrics {
                turns: result.turns_played,
                duration: start.elapsed(),
            };
            println!(
                "{name} (seed {seed}): {} turns, {:.0} games/sec, {:.0} turns/sec",
                metrics.turns,
                metrics.games_per_sec(),
                metrics.turns_per_sec()
            );
        }
        Err(e) => eprintln!("{name} (seed {seed}) failed: {e}"),
    }
}

fn bench_goldfish(c: &mut Criterion) {
    report("goldfish", 42, false);
    let mut group = c.benchmark_group("goldfish");
    group.bench_function(BenchmarkId::new("fresh", 42), |b| {
        b.iter(|| run_game(black_box(42), false))
    });
    group.finish();
}

fn bench_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("random");
    for seed in [42u64, 7, 1234] {
        report("random", seed, true);
        group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
            b.iter(|| run_game(black_box(seed), true))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_goldfish, bench_random);
criterion_main!(benches);
