#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic bonus system that periodically places potion pickups.

use std::time::Duration;

use maze_escape_core::{CellCoord, Command, Event};
use maze_escape_world::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Cadence at which fresh potions are placed when no override is supplied.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(60);

/// Samples drawn before falling back to a linear scan for an open cell.
const SAMPLE_ATTEMPTS: u32 = 64;

/// Configuration parameters required to construct the bonus system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits bonus placement commands.
///
/// Potions are replaced wholesale on every firing, matching the lifecycle of
/// the maze itself: stale uncollected potions simply move somewhere new.
#[derive(Debug)]
pub struct Bonus {
    spawn_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Bonus {
    /// Creates a new bonus system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit placement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: &Grid,
        player_cell: CellCoord,
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::LevelStarted { .. } => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if accumulated.is_zero() || self.spawn_interval.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            let Some(vision) = self.select_open_cell(grid, player_cell) else {
                return;
            };
            let Some(speed) = self.select_open_cell(grid, player_cell) else {
                return;
            };
            out.push(Command::SpawnBonuses { vision, speed });
        }
    }

    /// Picks a walkable cell the player does not occupy.
    ///
    /// Rejection sampling over the interior almost always succeeds within a
    /// handful of draws; the linear fallback only matters on degenerate grids.
    fn select_open_cell(&mut self, grid: &Grid, player_cell: CellCoord) -> Option<CellCoord> {
        let columns = grid.columns();
        let rows = grid.rows();
        if columns < 3 || rows < 3 {
            return None;
        }

        for _ in 0..SAMPLE_ATTEMPTS {
            let cell = CellCoord::new(
                self.rng.gen_range(1..columns - 1),
                self.rng.gen_range(1..rows - 1),
            );
            if grid.is_walkable(cell) && cell != player_cell {
                return Some(cell);
            }
        }

        for row in 1..rows - 1 {
            for column in 1..columns - 1 {
                let cell = CellCoord::new(column, row);
                if grid.is_walkable(cell) && cell != player_cell {
                    return Some(cell);
                }
            }
        }
        None
    }
}
