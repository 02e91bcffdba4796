#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Escape.
//!
//! The [`World`] owns the grid, the player, the creature position, the bonus
//! potions, and the level lifecycle. All mutation flows through [`apply`];
//! systems and adapters read through [`query`] and never hold mutable access.

mod maze;
pub mod navigation;

use maze_escape_core::{
    BonusKind, CellCoord, CellKind, Command, Event, GridError, Level, LevelGeneration,
    WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used when the embedding adapter does not provide one.
const DEFAULT_WORLD_SEED: u64 = 0x6d61_7a65_5f65_7363;

/// Visibility radius the player starts every level with.
const DEFAULT_VISIBILITY_RADIUS: f32 = 5.0;
/// Visibility radius granted by the vision potion.
const BOOSTED_VISIBILITY_RADIUS: f32 = 10.0;
/// Ticks the player must wait between accepted moves by default.
const DEFAULT_MOVE_INTERVAL: u32 = 0;
/// Ticks shaved off the move interval by the speed potion, floored at zero.
const SPEED_BONUS_REDUCTION: u32 = 1;
/// Lifetime of a collected bonus effect: 15 seconds at 60 ticks per second.
const EFFECT_DURATION_TICKS: u64 = 900;

/// Fixed-size cell array holding the carved maze.
///
/// Allocated entirely as [`CellKind::Wall`], carved once at level start, and
/// replaced wholesale on every level transition. Access is bounds-checked;
/// an out-of-range coordinate is a caller bug and surfaces as
/// [`GridError::OutOfBounds`] rather than being clamped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Allocates a grid of the provided dimensions filled with walls.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![CellKind::Wall; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Retrieves the kind of the cell at the provided coordinate.
    pub fn kind_at(&self, cell: CellCoord) -> Result<CellKind, GridError> {
        self.index(cell)
            .map(|index| self.cells[index])
            .ok_or(self.out_of_bounds(cell))
    }

    /// Overwrites the kind of the cell at the provided coordinate.
    pub fn set_kind(&mut self, cell: CellCoord, kind: CellKind) -> Result<(), GridError> {
        match self.index(cell) {
            Some(index) => {
                self.cells[index] = kind;
                Ok(())
            }
            None => Err(self.out_of_bounds(cell)),
        }
    }

    /// Reports whether an actor may stand on the cell; out-of-bounds is not
    /// walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.cells[index].is_walkable())
    }

    /// Dense cell kinds stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    const fn out_of_bounds(&self, cell: CellCoord) -> GridError {
        GridError::OutOfBounds {
            column: cell.column(),
            row: cell.row(),
            columns: self.columns,
            rows: self.rows,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    visibility_radius: f32,
    move_interval: u32,
    move_cooldown: u32,
}

impl Player {
    fn spawned() -> Self {
        Self {
            cell: maze::SEED_CELL,
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            move_interval: DEFAULT_MOVE_INTERVAL,
            move_cooldown: 0,
        }
    }
}

/// Fire-once reversion scheduled when a bonus is collected.
///
/// The generation token guards against the stale-timer hazard: a record
/// scheduled on a previous level must never mutate the freshly reset player.
#[derive(Clone, Copy, Debug)]
struct EffectTimer {
    kind: BonusKind,
    expires_at_tick: u64,
    generation: LevelGeneration,
}

#[derive(Clone, Copy, Debug, Default)]
struct BonusItems {
    vision: Option<CellCoord>,
    speed: Option<CellCoord>,
}

/// Represents the authoritative Maze Escape world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    player: Player,
    creature_cell: CellCoord,
    bonuses: BonusItems,
    effects: Vec<EffectTimer>,
    level: Level,
    generation: LevelGeneration,
    tick_index: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world carved for the first level using the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_WORLD_SEED)
    }

    /// Creates a world carved for the first level using the provided seed.
    ///
    /// Two worlds built from the same seed produce bit-identical grids for
    /// the same sequence of level starts.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid: Grid::new(0, 0),
            player: Player::spawned(),
            creature_cell: maze::SEED_CELL,
            bonuses: BonusItems::default(),
            effects: Vec::new(),
            level: Level::first(),
            generation: LevelGeneration::initial(),
            tick_index: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        world.build_level(Level::first());
        world
    }

    /// Rebuilds the world for `level` as one atomic reset.
    fn build_level(&mut self, level: Level) {
        let columns = level.grid_columns();
        let rows = level.grid_rows();

        let mut grid = Grid::new(columns, rows);
        maze::carve(&mut grid, &mut self.rng)
            .expect("level dimensions are derived odd and at least 5");
        let exit = CellCoord::new(columns - 2, rows - 2);
        grid.set_kind(exit, CellKind::Exit)
            .expect("exit cell lies inside the grid");

        self.level = level;
        self.generation = self.generation.next();
        self.grid = grid;
        self.player = Player::spawned();
        self.creature_cell = exit;
        self.bonuses = BonusItems::default();
        self.effects.clear();
    }

    fn collect_bonus(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let kind = if self.bonuses.vision == Some(cell) {
            self.bonuses.vision = None;
            self.player.visibility_radius = BOOSTED_VISIBILITY_RADIUS;
            BonusKind::Vision
        } else if self.bonuses.speed == Some(cell) {
            self.bonuses.speed = None;
            self.player.move_interval = DEFAULT_MOVE_INTERVAL.saturating_sub(SPEED_BONUS_REDUCTION);
            BonusKind::Speed
        } else {
            return;
        };

        self.effects.push(EffectTimer {
            kind,
            expires_at_tick: self.tick_index + EFFECT_DURATION_TICKS,
            generation: self.generation,
        });
        out_events.push(Event::BonusCollected { kind, cell });
    }

    fn expire_effects(&mut self, out_events: &mut Vec<Event>) {
        let pending = std::mem::take(&mut self.effects);
        for timer in pending {
            if timer.generation != self.generation {
                // Scheduled on a level that no longer exists; discard.
                continue;
            }
            if timer.expires_at_tick > self.tick_index {
                self.effects.push(timer);
                continue;
            }
            match timer.kind {
                BonusKind::Vision => self.player.visibility_radius = DEFAULT_VISIBILITY_RADIUS,
                BonusKind::Speed => self.player.move_interval = DEFAULT_MOVE_INTERVAL,
            }
            out_events.push(Event::EffectExpired { kind: timer.kind });
        }
    }

    fn place_bonus(&mut self, kind: BonusKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        if !self.grid.is_walkable(cell) || cell == self.player.cell {
            return;
        }
        match kind {
            BonusKind::Vision => self.bonuses.vision = Some(cell),
            BonusKind::Speed => self.bonuses.speed = Some(cell),
        }
        out_events.push(Event::BonusSpawned { kind, cell });
    }

    #[cfg(test)]
    fn set_player_move_interval(&mut self, interval: u32) {
        self.player.move_interval = interval;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel { level } => {
            world.build_level(level);
            out_events.push(Event::LevelStarted {
                level,
                generation: world.generation,
                columns: world.grid.columns(),
                rows: world.grid.rows(),
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.player.move_cooldown = world.player.move_cooldown.saturating_sub(1);
            world.expire_effects(out_events);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { direction } => {
            if world.player.move_cooldown > 0 {
                return;
            }
            let Some(destination) = world.player.cell.step(direction) else {
                return;
            };
            if !world.grid.is_walkable(destination) {
                return;
            }

            let from = world.player.cell;
            world.player.cell = destination;
            world.player.move_cooldown = world.player.move_interval;
            out_events.push(Event::PlayerMoved {
                from,
                to: destination,
            });
            world.collect_bonus(destination, out_events);

            if world.grid.kind_at(destination) == Ok(CellKind::Exit) {
                // Escaping wins even when the creature camps the exit cell.
                out_events.push(Event::ExitReached { level: world.level });
            } else if destination == world.creature_cell {
                out_events.push(Event::PlayerCaught { level: world.level });
            }
        }
        Command::StepCreature { direction } => {
            let Some(destination) = world.creature_cell.step(direction) else {
                return;
            };
            if !world.grid.is_walkable(destination) {
                return;
            }

            let from = world.creature_cell;
            world.creature_cell = destination;
            out_events.push(Event::CreatureAdvanced {
                from,
                to: destination,
            });
            if destination == world.player.cell {
                out_events.push(Event::PlayerCaught { level: world.level });
            }
        }
        Command::SpawnBonuses { vision, speed } => {
            world.place_bonus(BonusKind::Vision, vision, out_events);
            world.place_bonus(BonusKind::Speed, speed, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{BonusItems, Grid, World};
    use maze_escape_core::{CellCoord, Level, LevelGeneration};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the carved grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Level the world is currently on.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.level
    }

    /// Generation token of the current level build.
    #[must_use]
    pub fn generation(world: &World) -> LevelGeneration {
        world.generation
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            visibility_radius: world.player.visibility_radius,
            move_interval: world.player.move_interval,
            move_cooldown: world.player.move_cooldown,
        }
    }

    /// Cell the creature currently occupies.
    #[must_use]
    pub fn creature_cell(world: &World) -> CellCoord {
        world.creature_cell
    }

    /// Captures the positions of any spawned bonus potions.
    #[must_use]
    pub fn bonuses(world: &World) -> BonusSnapshot {
        let BonusItems { vision, speed } = world.bonuses;
        BonusSnapshot { vision, speed }
    }

    /// Immutable representation of the player's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Cell the player currently occupies.
        pub cell: CellCoord,
        /// Radius within which the renderer reveals the maze.
        pub visibility_radius: f32,
        /// Ticks required between accepted moves.
        pub move_interval: u32,
        /// Ticks remaining before the next move is accepted.
        pub move_cooldown: u32,
    }

    /// Positions of the bonus potions currently placed in the maze.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BonusSnapshot {
        /// Cell holding the vision potion, if spawned.
        pub vision: Option<CellCoord>,
        /// Cell holding the speed potion, if spawned.
        pub speed: Option<CellCoord>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::Direction;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn tick(world: &mut World, events: &mut Vec<Event>) {
        apply(world, Command::Tick { dt: FRAME }, events);
    }

    fn first_open_step(world: &World) -> Direction {
        let player = query::player(world).cell;
        Direction::ALL
            .into_iter()
            .find(|&direction| {
                player
                    .step(direction)
                    .map_or(false, |cell| query::grid(world).is_walkable(cell))
            })
            .expect("the seed cell always has a carved neighbor")
    }

    #[test]
    fn fresh_world_matches_the_first_level_formulas() {
        let world = World::new();
        let grid = query::grid(&world);
        assert_eq!(grid.columns(), 43);
        assert_eq!(grid.rows(), 33);
        assert_eq!(query::level(&world), Level::first());
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
        assert_eq!(query::creature_cell(&world), CellCoord::new(41, 31));
        assert_eq!(grid.kind_at(CellCoord::new(41, 31)), Ok(CellKind::Exit));
    }

    #[test]
    fn exactly_one_exit_exists_after_generation() {
        let world = World::with_seed(5);
        let exits = query::grid(&world)
            .cells()
            .iter()
            .filter(|&&kind| kind == CellKind::Exit)
            .count();
        assert_eq!(exits, 1);
    }

    #[test]
    fn worlds_with_equal_seeds_carve_identical_grids() {
        let first = World::with_seed(77);
        let second = World::with_seed(77);
        assert_eq!(query::grid(&first), query::grid(&second));
    }

    #[test]
    fn start_level_replaces_the_grid_wholesale() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartLevel {
                level: Level::new(3),
            },
            &mut events,
        );

        let grid = query::grid(&world);
        assert_eq!(grid.columns(), Level::new(3).grid_columns());
        assert_eq!(grid.rows(), Level::new(3).grid_rows());
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
        assert_eq!(
            query::creature_cell(&world),
            CellCoord::new(grid.columns() - 2, grid.rows() - 2)
        );
        assert_eq!(query::bonuses(&world), query::BonusSnapshot::default());
        assert!(matches!(
            events.as_slice(),
            [Event::LevelStarted { level, .. }] if *level == Level::new(3)
        ));
    }

    #[test]
    fn moves_into_walls_are_rejected_silently() {
        let mut world = World::new();
        let mut events = Vec::new();
        // The border ring guarantees walls north and west of the spawn.
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::West,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
    }

    #[test]
    fn cooldown_gates_movement_and_never_goes_negative() {
        let mut world = World::new();
        let mut events = Vec::new();
        world.set_player_move_interval(2);
        let open = first_open_step(&world);

        apply(&mut world, Command::MovePlayer { direction: open }, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(query::player(&world).move_cooldown, 2);

        // Still cooling down: the second move is swallowed without events.
        let reverse = match open {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        };
        apply(
            &mut world,
            Command::MovePlayer { direction: reverse },
            &mut events,
        );
        assert_eq!(events.len(), 1);

        tick(&mut world, &mut events);
        assert_eq!(query::player(&world).move_cooldown, 1);
        tick(&mut world, &mut events);
        assert_eq!(query::player(&world).move_cooldown, 0);
        tick(&mut world, &mut events);
        assert_eq!(query::player(&world).move_cooldown, 0);

        events.clear();
        apply(
            &mut world,
            Command::MovePlayer { direction: reverse },
            &mut events,
        );
        assert!(matches!(events.as_slice(), [Event::PlayerMoved { .. }]));
    }

    #[test]
    fn walking_the_shortest_path_to_the_exit_wins_the_level() {
        let mut world = World::with_seed(11);
        let mut events = Vec::new();
        let start = query::player(&world).cell;
        let goal = CellCoord::new(
            query::grid(&world).columns() - 2,
            query::grid(&world).rows() - 2,
        );
        let path = navigation::shortest_path(query::grid(&world), start, goal);
        assert!(!path.is_empty(), "the carved maze connects spawn and exit");

        let mut cursor = start;
        for cell in path {
            let direction = Direction::between(cursor, cell).expect("path steps are adjacent");
            apply(&mut world, Command::MovePlayer { direction }, &mut events);
            cursor = cell;
        }

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ExitReached { level } if *level == Level::first())));
        // The creature camps the exit cell; escaping must not read as a loss.
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PlayerCaught { .. })));
    }

    #[test]
    fn creature_stepping_onto_the_player_is_a_loss() {
        let mut world = World::with_seed(23);
        let mut events = Vec::new();
        let path = navigation::shortest_path(
            query::grid(&world),
            query::creature_cell(&world),
            query::player(&world).cell,
        );
        assert!(!path.is_empty());

        let mut cursor = query::creature_cell(&world);
        for cell in path {
            let direction = Direction::between(cursor, cell).expect("path steps are adjacent");
            apply(&mut world, Command::StepCreature { direction }, &mut events);
            cursor = cell;
        }

        assert_eq!(query::creature_cell(&world), query::player(&world).cell);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PlayerCaught { level } if *level == Level::first())));
    }

    #[test]
    fn creature_steps_into_walls_are_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        // The exit sits against the south-east border.
        apply(
            &mut world,
            Command::StepCreature {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StepCreature {
                direction: Direction::South,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn collecting_the_vision_potion_boosts_and_reverts() {
        let mut world = World::new();
        let mut events = Vec::new();
        let open = first_open_step(&world);
        let target = query::player(&world).cell.step(open).expect("in bounds");

        apply(
            &mut world,
            Command::SpawnBonuses {
                vision: target,
                speed: target,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::BonusSpawned { kind: BonusKind::Vision, .. })));

        events.clear();
        apply(&mut world, Command::MovePlayer { direction: open }, &mut events);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::BonusCollected { kind: BonusKind::Vision, .. })));
        assert!((query::player(&world).visibility_radius - 10.0).abs() < f32::EPSILON);

        events.clear();
        for _ in 0..EFFECT_DURATION_TICKS + 1 {
            tick(&mut world, &mut events);
        }
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EffectExpired { kind: BonusKind::Vision })));
        assert!((query::player(&world).visibility_radius - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bonuses_never_spawn_on_walls_or_the_player() {
        let mut world = World::new();
        let mut events = Vec::new();
        let player_cell = query::player(&world).cell;
        apply(
            &mut world,
            Command::SpawnBonuses {
                vision: CellCoord::new(0, 0),
                speed: player_cell,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::bonuses(&world), query::BonusSnapshot::default());
    }

    #[test]
    fn stale_effect_timers_do_not_outlive_a_level_reset() {
        let mut world = World::new();
        let mut events = Vec::new();
        let open = first_open_step(&world);
        let target = query::player(&world).cell.step(open).expect("in bounds");
        apply(
            &mut world,
            Command::SpawnBonuses {
                vision: target,
                speed: CellCoord::new(0, 0),
            },
            &mut events,
        );
        apply(&mut world, Command::MovePlayer { direction: open }, &mut events);
        assert!((query::player(&world).visibility_radius - 10.0).abs() < f32::EPSILON);

        apply(
            &mut world,
            Command::StartLevel {
                level: Level::first(),
            },
            &mut events,
        );
        assert!((query::player(&world).visibility_radius - 5.0).abs() < f32::EPSILON);

        events.clear();
        for _ in 0..EFFECT_DURATION_TICKS + 1 {
            tick(&mut world, &mut events);
        }
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EffectExpired { .. })));
    }

    #[test]
    fn grid_access_outside_bounds_fails_loudly() {
        let world = World::new();
        let outside = CellCoord::new(1000, 1);
        assert!(matches!(
            query::grid(&world).kind_at(outside),
            Err(GridError::OutOfBounds { column: 1000, .. })
        ));
    }
}
