#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Maze Escape experience.

use anyhow::Result;
use clap::Parser;
use maze_escape_core::{
    BonusKind, Command, Event, Level, RNG_STREAM_BONUS, RNG_STREAM_CREATURE, RNG_STREAM_MAZE,
};
use maze_escape_rendering::{
    ActorPresentation, BonusPresentation, CellGridPresentation, Color, FrameInput, Presentation,
    RenderingBackend, Scene, VisibilityPresentation,
};
use maze_escape_rendering_macroquad::MacroquadBackend;
use maze_escape_system_bonus::{Bonus, Config as BonusConfig, DEFAULT_SPAWN_INTERVAL};
use maze_escape_system_creature::{Config as CreatureConfig, Creature};
use maze_escape_system_progression::Progression;
use maze_escape_world::{query, World};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// One simulation tick per rendered frame, matching a 60 Hz fixed step.
const FIXED_FRAME: Duration = Duration::from_micros(16_667);
/// Frames an overlay banner stays on screen.
const BANNER_HOLD_FRAMES: u32 = 150;
/// Reference cell edge length handed to the presentation layer.
const CELL_LENGTH: f32 = 24.0;

const CLEAR_COLOR: Color = Color::from_rgb_u8(0x00, 0x00, 0x00);
const PLAYER_COLOR: Color = Color::from_rgb_u8(0xff, 0xec, 0x27);
const CREATURE_COLOR: Color = Color::from_rgb_u8(0xff, 0x00, 0x4d);
const VISION_COLOR: Color = Color::from_rgb_u8(0x29, 0xad, 0xff);
const SPEED_COLOR: Color = Color::from_rgb_u8(0xff, 0xa3, 0x00);

/// Escape a procedurally generated maze before the creature catches you.
#[derive(Debug, Parser)]
#[command(name = "maze-escape")]
struct Args {
    /// Seed shared by maze carving and every system's random stream.
    #[arg(long)]
    seed: Option<u64>,
    /// Level to start on.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Render as fast as possible instead of synchronising with the display.
    #[arg(long)]
    no_vsync: bool,
    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Derives an independent seed for one named random stream.
///
/// Hashing the global seed with a stream label keeps the carve, the creature,
/// and the bonus placement statistically independent while still reproducible
/// from a single `--seed` value.
fn derive_labeled_seed(global_seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Owns the world, the systems, and the command/event plumbing between them.
struct Simulation {
    world: World,
    creature: Creature,
    bonus: Bonus,
    progression: Progression,
    commands: Vec<Command>,
    events: Vec<Event>,
    banner: Option<String>,
    banner_frames: u32,
}

impl Simulation {
    fn new(global_seed: u64, level: Level) -> Self {
        let mut simulation = Self {
            world: World::with_seed(derive_labeled_seed(global_seed, RNG_STREAM_MAZE)),
            creature: Creature::new(CreatureConfig::new(derive_labeled_seed(
                global_seed,
                RNG_STREAM_CREATURE,
            ))),
            bonus: Bonus::new(BonusConfig::new(
                DEFAULT_SPAWN_INTERVAL,
                derive_labeled_seed(global_seed, RNG_STREAM_BONUS),
            )),
            progression: Progression,
            commands: Vec::new(),
            events: Vec::new(),
            banner: None,
            banner_frames: 0,
        };
        simulation.commands.push(Command::StartLevel { level });
        simulation.pump();
        simulation
    }

    /// Advances the simulation by one frame's worth of commands.
    fn advance(&mut self, input: FrameInput) {
        if let Some(direction) = input.direction {
            self.commands.push(Command::MovePlayer { direction });
        }
        self.commands.push(Command::Tick { dt: FIXED_FRAME });
        self.pump();

        if self.banner_frames > 0 {
            self.banner_frames -= 1;
            if self.banner_frames == 0 {
                self.banner = None;
            }
        }
    }

    /// Applies pending commands and feeds the resulting events back through
    /// the systems until no further commands are produced.
    ///
    /// The loop converges because only `TimeAdvanced` events trigger new
    /// periodic work, and each pump carries at most one tick of time.
    fn pump(&mut self) {
        while !self.commands.is_empty() {
            self.events.clear();
            let pending = std::mem::take(&mut self.commands);
            for command in pending {
                maze_escape_world::apply(&mut self.world, command, &mut self.events);
            }
            self.note_banners();

            let grid = query::grid(&self.world);
            let player_cell = query::player(&self.world).cell;
            let creature_cell = query::creature_cell(&self.world);
            self.creature
                .handle(&self.events, grid, player_cell, creature_cell, &mut self.commands);
            self.bonus
                .handle(&self.events, grid, player_cell, &mut self.commands);
            self.progression.handle(&self.events, &mut self.commands);
        }
    }

    fn note_banners(&mut self) {
        let mut escaped = None;
        let mut caught = false;
        let mut started = None;
        for event in &self.events {
            match event {
                Event::ExitReached { level } => escaped = Some(*level),
                Event::PlayerCaught { .. } => caught = true,
                Event::LevelStarted { level, .. } => started = Some(*level),
                _ => {}
            }
        }

        if let Some(level) = escaped {
            self.set_banner(format!(
                "You escaped! Entering level {}",
                level.next().get()
            ));
        } else if caught {
            self.set_banner("Caught by the creature! Back to level 1".to_owned());
        } else if let Some(level) = started {
            // Terminal banners from the previous pump already name the level;
            // only quiet transitions get the plain title.
            if self.banner_frames == 0 {
                self.set_banner(format!("Level {}", level.get()));
            }
        }
    }

    fn set_banner(&mut self, text: String) {
        self.banner = Some(text);
        self.banner_frames = BANNER_HOLD_FRAMES;
    }
}

fn build_scene(simulation: &Simulation) -> Scene {
    let grid = query::grid(&simulation.world);
    let player = query::player(&simulation.world);
    let bonuses = query::bonuses(&simulation.world);

    let mut bonus_presentations = Vec::new();
    if let Some(cell) = bonuses.vision {
        bonus_presentations.push(BonusPresentation::new(BonusKind::Vision, cell, VISION_COLOR));
    }
    if let Some(cell) = bonuses.speed {
        bonus_presentations.push(BonusPresentation::new(BonusKind::Speed, cell, SPEED_COLOR));
    }

    Scene::new(
        CellGridPresentation::new(grid.columns(), grid.rows(), CELL_LENGTH)
            .expect("cell length is a positive constant"),
        grid.cells().to_vec(),
        ActorPresentation::new(player.cell, PLAYER_COLOR),
        ActorPresentation::new(query::creature_cell(&simulation.world), CREATURE_COLOR),
        bonus_presentations,
        VisibilityPresentation::new(player.cell, player.visibility_radius),
        query::level(&simulation.world).get(),
        simulation.banner.clone(),
    )
    .expect("the world cell buffer always covers its grid")
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let global_seed = args.seed.unwrap_or_else(rand::random);
    let mut simulation = Simulation::new(global_seed, Level::new(args.level));

    println!("{}", query::welcome_banner(&simulation.world));
    simulation.set_banner(format!(
        "{} Level {}",
        query::welcome_banner(&simulation.world),
        query::level(&simulation.world).get()
    ));

    let presentation = Presentation::new("Maze Escape", CLEAR_COLOR, build_scene(&simulation));
    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    backend.run(presentation, move |_dt, input, scene| {
        simulation.advance(input);
        *scene = build_scene(&simulation);
    })
}
