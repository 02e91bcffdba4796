#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic creature system that decides between wandering and pursuit.

use std::collections::VecDeque;

use maze_escape_core::{CellCoord, Command, CreatureMode, Direction, Event, Level};
use maze_escape_world::{navigation, Grid};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the creature system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that reacts to world events and emits creature step commands.
///
/// Decisions happen on a per-level cadence: every `move_interval` ticks the
/// creature measures the straight-line distance to the player and either
/// pursues along a cached shortest path or takes one random walkable step.
#[derive(Debug)]
pub struct Creature {
    level: Level,
    mode: CreatureMode,
    move_interval: u32,
    move_timer: u32,
    path: VecDeque<CellCoord>,
    rng: ChaCha8Rng,
}

impl Creature {
    /// Creates a new creature system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            level: Level::first(),
            mode: CreatureMode::Wandering,
            move_interval: Level::first().creature_move_interval(),
            move_timer: 0,
            path: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit at most one step command.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: &Grid,
        player_cell: CellCoord,
        creature_cell: CellCoord,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::LevelStarted { level, .. } = event {
                self.level = *level;
                self.mode = CreatureMode::Wandering;
                self.move_interval = level.creature_move_interval();
                self.move_timer = 0;
                self.path.clear();
            }
        }

        let elapsed = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        if elapsed == 0 {
            return;
        }

        self.move_timer = self.move_timer.saturating_add(elapsed as u32);
        if self.move_timer < self.move_interval {
            return;
        }
        self.move_timer = 0;

        let distance = creature_cell.euclidean_distance(player_cell);
        if distance < self.level.proximity_threshold() {
            self.pursue(grid, player_cell, creature_cell, out);
        } else {
            self.wander(grid, creature_cell, out);
        }
    }

    fn pursue(
        &mut self,
        grid: &Grid,
        player_cell: CellCoord,
        creature_cell: CellCoord,
        out: &mut Vec<Command>,
    ) {
        if self.mode != CreatureMode::Pursuing {
            self.mode = CreatureMode::Pursuing;
            self.path.clear();
        }

        // A cached hop that is no longer adjacent means the plan went stale,
        // usually because a step was rejected or the level changed under us.
        if let Some(&next) = self.path.front() {
            if Direction::between(creature_cell, next).is_none() {
                self.path.clear();
            }
        }

        if self.path.is_empty() {
            self.path = navigation::shortest_path(grid, creature_cell, player_cell).into();
        }

        let Some(next) = self.path.pop_front() else {
            // On top of the player or cut off entirely; hold position.
            return;
        };
        let Some(direction) = Direction::between(creature_cell, next) else {
            self.path.clear();
            return;
        };
        out.push(Command::StepCreature { direction });
    }

    fn wander(&mut self, grid: &Grid, creature_cell: CellCoord, out: &mut Vec<Command>) {
        self.mode = CreatureMode::Wandering;
        self.path.clear();

        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| {
                creature_cell
                    .step(direction)
                    .map_or(false, |cell| grid.is_walkable(cell))
            })
            .collect();
        if let Some(&direction) = open.choose(&mut self.rng) {
            out.push(Command::StepCreature { direction });
        }
    }

    /// Behavior mode chosen at the most recent decision tick.
    #[must_use]
    pub const fn mode(&self) -> CreatureMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{CellKind, LevelGeneration};
    use std::time::Duration;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn open_room(columns: u32, rows: u32) -> Grid {
        let mut grid = Grid::new(columns, rows);
        for row in 1..rows - 1 {
            for column in 1..columns - 1 {
                grid.set_kind(CellCoord::new(column, row), CellKind::Path)
                    .expect("cell is in bounds");
            }
        }
        grid
    }

    fn level_started(level: Level) -> Event {
        Event::LevelStarted {
            level,
            generation: LevelGeneration::initial(),
            columns: level.grid_columns(),
            rows: level.grid_rows(),
        }
    }

    fn ticks(count: u32) -> Vec<Event> {
        (0..count).map(|_| Event::TimeAdvanced { dt: FRAME }).collect()
    }

    fn pump_until_decision(
        creature: &mut Creature,
        grid: &Grid,
        player: CellCoord,
        cell: CellCoord,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        let events = ticks(Level::first().creature_move_interval());
        creature.handle(&events, grid, player, cell, &mut out);
        out
    }

    #[test]
    fn no_decision_before_the_interval_elapses() {
        let grid = open_room(31, 11);
        let mut creature = Creature::new(Config::new(9));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(5, 5), CellCoord::new(1, 1), &mut out);

        let events = ticks(Level::first().creature_move_interval() - 1);
        creature.handle(&events, &grid, CellCoord::new(5, 5), CellCoord::new(1, 1), &mut out);
        assert!(out.is_empty());

        creature.handle(&ticks(1), &grid, CellCoord::new(5, 5), CellCoord::new(1, 1), &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn nearby_player_triggers_pursuit_along_the_shortest_path() {
        let grid = open_room(31, 11);
        let mut creature = Creature::new(Config::new(1));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(5, 1), CellCoord::new(1, 1), &mut out);

        let out = pump_until_decision(&mut creature, &grid, CellCoord::new(5, 1), CellCoord::new(1, 1));
        assert_eq!(
            out,
            vec![Command::StepCreature {
                direction: Direction::East
            }]
        );
        assert_eq!(creature.mode(), CreatureMode::Pursuing);
    }

    #[test]
    fn distant_player_leaves_the_creature_wandering() {
        let grid = open_room(31, 11);
        let mut creature = Creature::new(Config::new(2));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(25, 1), CellCoord::new(1, 1), &mut out);

        let out = pump_until_decision(&mut creature, &grid, CellCoord::new(25, 1), CellCoord::new(1, 1));
        assert_eq!(out.len(), 1);
        let Command::StepCreature { direction } = &out[0] else {
            panic!("wandering emits a step command");
        };
        // From the corner only east and south are open.
        assert!(matches!(direction, Direction::East | Direction::South));
        assert_eq!(creature.mode(), CreatureMode::Wandering);
    }

    #[test]
    fn threshold_widens_with_the_level() {
        let grid = open_room(31, 11);
        // Distance 8 is outside level 1's threshold (7) but inside level 3's (9).
        let player = CellCoord::new(9, 1);
        let cell = CellCoord::new(1, 1);

        let mut creature = Creature::new(Config::new(3));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, player, cell, &mut out);
        creature.handle(
            &ticks(Level::first().creature_move_interval()),
            &grid,
            player,
            cell,
            &mut out,
        );
        assert_eq!(creature.mode(), CreatureMode::Wandering);

        let mut creature = Creature::new(Config::new(3));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::new(3))], &grid, player, cell, &mut out);
        creature.handle(
            &ticks(Level::new(3).creature_move_interval()),
            &grid,
            player,
            cell,
            &mut out,
        );
        assert_eq!(creature.mode(), CreatureMode::Pursuing);
    }

    #[test]
    fn mode_matches_the_proximity_threshold_across_levels() {
        for level_number in [1u32, 2, 10] {
            let level = Level::new(level_number);
            let threshold = level.proximity_threshold() as u32;
            let grid = open_room(threshold * 2 + 5, 5);
            let cell = CellCoord::new(1, 1);

            for (offset, expected) in [
                (threshold - 1, CreatureMode::Pursuing),
                (threshold + 1, CreatureMode::Wandering),
            ] {
                let player = CellCoord::new(1 + offset, 1);
                let mut creature = Creature::new(Config::new(6));
                let mut out = Vec::new();
                creature.handle(&[level_started(level)], &grid, player, cell, &mut out);
                creature.handle(
                    &ticks(level.creature_move_interval()),
                    &grid,
                    player,
                    cell,
                    &mut out,
                );
                assert_eq!(
                    creature.mode(),
                    expected,
                    "level {level_number}, player {offset} cells away"
                );
            }
        }
    }

    #[test]
    fn a_player_closing_in_flips_wandering_into_pursuit() {
        let grid = open_room(31, 11);
        let cell = CellCoord::new(1, 1);
        let mut creature = Creature::new(Config::new(8));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(25, 1), cell, &mut out);

        creature.handle(
            &ticks(Level::first().creature_move_interval()),
            &grid,
            CellCoord::new(25, 1),
            cell,
            &mut out,
        );
        assert_eq!(creature.mode(), CreatureMode::Wandering);

        // The player steps inside the threshold before the next decision.
        creature.handle(
            &ticks(Level::first().creature_move_interval()),
            &grid,
            CellCoord::new(4, 1),
            cell,
            &mut out,
        );
        assert_eq!(creature.mode(), CreatureMode::Pursuing);
    }

    #[test]
    fn pursuit_path_survives_between_decisions() {
        // A corridor: the creature should walk it hop by hop without stalling.
        let grid = open_room(9, 3);
        let mut creature = Creature::new(Config::new(7));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(7, 1), CellCoord::new(1, 1), &mut out);

        let mut cell = CellCoord::new(1, 1);
        for _ in 0..6 {
            let out = pump_until_decision(&mut creature, &grid, CellCoord::new(7, 1), cell);
            let [Command::StepCreature { direction }] = out.as_slice() else {
                panic!("pursuit emits one step per decision");
            };
            cell = cell.step(*direction).expect("step stays in bounds");
        }
        assert_eq!(cell, CellCoord::new(7, 1));
    }

    #[test]
    fn level_start_resets_the_cached_path_and_timer() {
        let grid = open_room(9, 3);
        let mut creature = Creature::new(Config::new(4));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(7, 1), CellCoord::new(1, 1), &mut out);
        let _ = pump_until_decision(&mut creature, &grid, CellCoord::new(7, 1), CellCoord::new(1, 1));
        assert_eq!(creature.mode(), CreatureMode::Pursuing);

        let mut out = Vec::new();
        creature.handle(&[level_started(Level::new(2))], &grid, CellCoord::new(7, 1), CellCoord::new(1, 1), &mut out);
        assert_eq!(creature.mode(), CreatureMode::Wandering);
        assert!(out.is_empty());

        // Fewer ticks than the new interval: the reset timer must not fire.
        creature.handle(
            &ticks(Level::new(2).creature_move_interval() - 1),
            &grid,
            CellCoord::new(7, 1),
            CellCoord::new(1, 1),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn creature_holds_when_standing_on_the_player() {
        let grid = open_room(9, 3);
        let mut creature = Creature::new(Config::new(5));
        let mut out = Vec::new();
        creature.handle(&[level_started(Level::first())], &grid, CellCoord::new(3, 1), CellCoord::new(3, 1), &mut out);
        let out = pump_until_decision(&mut creature, &grid, CellCoord::new(3, 1), CellCoord::new(3, 1));
        assert!(out.is_empty());
    }
}
