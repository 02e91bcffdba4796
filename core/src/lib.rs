#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Stream label used when deriving the maze carving seed.
pub const RNG_STREAM_MAZE: &str = "maze";
/// Stream label used when deriving the creature system seed.
pub const RNG_STREAM_CREATURE: &str = "creature";
/// Stream label used when deriving the bonus system seed.
pub const RNG_STREAM_BONUS: &str = "bonus";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the world for the provided level: fresh grid, carved maze,
    /// exit placement, actor resets. The transition is atomic.
    StartLevel {
        /// Level the world should enter.
        level: Level,
    },
    /// Advances the simulation clock by one frame of the game loop.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player step one cell in the provided direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the creature step one cell in the provided direction.
    StepCreature {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Places the pair of bonus potions on the provided walkable cells.
    SpawnBonuses {
        /// Cell that should hold the vision potion.
        vision: CellCoord,
        /// Cell that should hold the speed potion.
        speed: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh level was built and all actors were reset.
    LevelStarted {
        /// Level the world entered.
        level: Level,
        /// Generation token issued for the new level.
        generation: LevelGeneration,
        /// Number of columns in the freshly carved grid.
        columns: u32,
        /// Number of rows in the freshly carved grid.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced by one frame.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after the move.
        to: CellCoord,
    },
    /// Confirms that the creature moved between two cells.
    CreatureAdvanced {
        /// Cell the creature occupied before moving.
        from: CellCoord,
        /// Cell the creature occupies after the move.
        to: CellCoord,
    },
    /// Reports that the player stepped onto the exit cell.
    ExitReached {
        /// Level that was cleared.
        level: Level,
    },
    /// Reports that the creature and the player occupy the same cell.
    PlayerCaught {
        /// Level on which the player was caught.
        level: Level,
    },
    /// Confirms that a bonus potion was placed on a cell.
    BonusSpawned {
        /// Kind of potion that appeared.
        kind: BonusKind,
        /// Cell that holds the potion.
        cell: CellCoord,
    },
    /// Confirms that the player picked up a bonus potion.
    BonusCollected {
        /// Kind of potion that was collected.
        kind: BonusKind,
        /// Cell the potion occupied.
        cell: CellCoord,
    },
    /// Reports that a status effect reverted to the player's default value.
    EffectExpired {
        /// Kind of effect that wore off.
        kind: BonusKind,
    },
}

/// Classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Solid cell that no actor may occupy.
    Wall,
    /// Carved corridor cell.
    Path,
    /// Carved cell that completes the level when the player enters it.
    Exit,
}

impl CellKind {
    /// Returns `true` when actors may stand on the cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path | Self::Exit)
    }
}

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in a fixed canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction of the single-cell step from `from` to `to`,
    /// or `None` when the two cells are not cardinal neighbors.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row() > from.row() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Euclidean distance between two cell coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let column_diff = self.column().abs_diff(other.column()) as f32;
        let row_diff = self.row().abs_diff(other.row()) as f32;
        column_diff.hypot(row_diff)
    }

    /// Returns the neighboring cell one step in the provided direction, or
    /// `None` when the step would leave the coordinate space.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => {
                if self.row == 0 {
                    None
                } else {
                    Some(CellCoord::new(self.column, self.row - 1))
                }
            }
            Direction::East => Some(CellCoord::new(self.column + 1, self.row)),
            Direction::South => Some(CellCoord::new(self.column, self.row + 1)),
            Direction::West => {
                if self.column == 0 {
                    None
                } else {
                    Some(CellCoord::new(self.column - 1, self.row))
                }
            }
        }
    }
}

/// Behavior mode the creature derives on every decision tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreatureMode {
    /// The creature drifts through the maze at random.
    Wandering,
    /// The creature follows a shortest path toward the player.
    Pursuing,
}

/// Kinds of bonus potions the spawner may place in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Temporarily widens the player's visibility radius.
    Vision,
    /// Temporarily shortens the player's move interval.
    Speed,
}

/// Monotonic level counter that drives grid size and creature speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// The level every run starts on and every loss resets to.
    #[must_use]
    pub const fn first() -> Self {
        Self(1)
    }

    /// Creates a level counter with the provided value, clamped to at least 1.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self(1)
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level that follows a win on this level.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Number of grid rows for this level, guaranteed odd and at least 5.
    #[must_use]
    pub const fn grid_rows(&self) -> u32 {
        next_odd(31 + 2 * self.0)
    }

    /// Number of grid columns for this level, guaranteed odd and at least 5.
    #[must_use]
    pub const fn grid_columns(&self) -> u32 {
        next_odd(41 + 2 * self.0)
    }

    /// Distance below which the creature switches from wandering to pursuit.
    #[must_use]
    pub fn proximity_threshold(&self) -> f32 {
        6.0 + self.0 as f32
    }

    /// Game-loop ticks between creature decisions, floored at 15.
    #[must_use]
    pub const fn creature_move_interval(&self) -> u32 {
        let interval = 30u32.saturating_sub(2 * self.0);
        if interval < 15 {
            15
        } else {
            interval
        }
    }
}

/// Token identifying one atomic level build.
///
/// Deferred work scheduled during one level (such as a status-effect
/// reversion) carries the generation it was scheduled under; the world
/// discards the work when the tokens no longer match, so stale timers never
/// corrupt a freshly reset level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelGeneration(u64);

impl LevelGeneration {
    /// Generation assigned to the first level build of a world.
    #[must_use]
    pub const fn initial() -> Self {
        Self(0)
    }

    /// Generation that supersedes this one after the next level build.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Errors raised by bounds-checked grid access and maze generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A cell coordinate lies outside the grid dimensions.
    #[error("cell ({column}, {row}) lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Column of the rejected coordinate.
        column: u32,
        /// Row of the rejected coordinate.
        row: u32,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// Grid dimensions violate the odd-and-at-least-5 carving precondition.
    #[error("grid dimensions {columns}x{rows} must be odd and at least 5")]
    InvalidDimensions {
        /// Number of columns that failed validation.
        columns: u32,
        /// Number of rows that failed validation.
        rows: u32,
    },
}

const fn next_odd(value: u32) -> u32 {
    if value % 2 == 0 {
        value + 1
    } else {
        value
    }
}
