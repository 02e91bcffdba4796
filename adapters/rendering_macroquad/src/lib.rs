#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Maze Escape.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.

use anyhow::Result;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use maze_escape_core::{CellCoord, Direction};
use maze_escape_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, VisibilityPresentation,
};
use std::{collections::VecDeque, time::Duration};

/// Frames a direction key must stay held before auto-repeat begins.
const REPEAT_DELAY_FRAMES: u32 = 12;
/// Frames between repeated steps once auto-repeat is active.
const REPEAT_INTERVAL_FRAMES: u32 = 3;

/// Translates raw "direction held" samples into discrete step requests.
///
/// The first sample of a hold fires immediately; further steps wait for the
/// repeat delay and then fire on a fixed cadence, mirroring OS key repeat
/// without depending on platform repeat settings. Switching direction
/// mid-hold restarts the cadence.
#[derive(Clone, Copy, Debug, Default)]
struct RepeatGate {
    held: Option<(Direction, u32)>,
}

impl RepeatGate {
    fn sample(&mut self, down: Option<Direction>) -> Option<Direction> {
        let Some(direction) = down else {
            self.held = None;
            return None;
        };

        let frames = match self.held {
            Some((held, frames)) if held == direction => frames.saturating_add(1),
            _ => 0,
        };
        self.held = Some((direction, frames));

        let fires = frames == 0
            || (frames >= REPEAT_DELAY_FRAMES
                && (frames - REPEAT_DELAY_FRAMES) % REPEAT_INTERVAL_FRAMES == 0);
        fires.then_some(direction)
    }
}

fn direction_held() -> Option<Direction> {
    if is_key_down(KeyCode::Up) || is_key_down(KeyCode::W) {
        Some(Direction::North)
    } else if is_key_down(KeyCode::Right) || is_key_down(KeyCode::D) {
        Some(Direction::East)
    } else if is_key_down(KeyCode::Down) || is_key_down(KeyCode::S) {
        Some(Direction::South)
    } else if is_key_down(KeyCode::Left) || is_key_down(KeyCode::A) {
        Some(Direction::West)
    } else {
        None
    }
}

fn quit_requested() -> bool {
    is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q)
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing
    /// ten-second averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<(f32, f32)> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        if seconds <= f32::EPSILON {
            self.elapsed = Duration::ZERO;
            self.frames = 0;
            return None;
        }

        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some((per_second, trailing_ten_seconds))
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the
    /// display refresh rate or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1032,
            window_height: 792,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut repeat_gate = RepeatGate::default();

            loop {
                if quit_requested() {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    direction: repeat_gate.sample(direction_held()),
                };

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_maze(&scene, &metrics);
                draw_inhabitants(&scene, &metrics);
                draw_hud(&scene);
                if let Some(banner) = &scene.banner {
                    draw_banner(banner);
                }

                if show_fps {
                    if let Some((per_second, trailing_ten_seconds)) =
                        fps_counter.record_frame(frame_dt)
                    {
                        println!("FPS: {per_second:.2} (10s avg: {trailing_ten_seconds:.2})");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Pixel-space placement of the maze within the window.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    cell_step: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    /// Scales the grid to fit the window while preserving square cells.
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let columns = scene.cell_grid.columns.max(1) as f32;
        let rows = scene.cell_grid.rows.max(1) as f32;
        let cell_step = (screen_width / columns).min(screen_height / rows);
        let offset_x = (screen_width - columns * cell_step) / 2.0;
        let offset_y = (screen_height - rows * cell_step) / 2.0;
        Self {
            cell_step,
            offset_x,
            offset_y,
        }
    }

    fn cell_origin(&self, cell: CellCoord) -> (f32, f32) {
        (
            self.offset_x + cell.column() as f32 * self.cell_step,
            self.offset_y + cell.row() as f32 * self.cell_step,
        )
    }

    fn cell_center(&self, cell: CellCoord) -> (f32, f32) {
        let (x, y) = self.cell_origin(cell);
        (x + self.cell_step / 2.0, y + self.cell_step / 2.0)
    }
}

const WALL_COLOR: Color = Color::from_rgb_u8(0x1d, 0x2b, 0x53);
const PATH_COLOR: Color = Color::from_rgb_u8(0xc2, 0xc3, 0xc7);
const EXIT_COLOR: Color = Color::from_rgb_u8(0x00, 0xe4, 0x36);

fn draw_maze(scene: &Scene, metrics: &SceneMetrics) {
    let columns = scene.cell_grid.columns;
    let visibility = scene.visibility;
    for (index, kind) in scene.cells.iter().enumerate() {
        let cell = CellCoord::new(index as u32 % columns, index as u32 / columns);
        // Cells outside the disc stay the clear color: darkness.
        if !visibility.reveals(cell) {
            continue;
        }
        let color = match kind {
            maze_escape_core::CellKind::Wall => WALL_COLOR,
            maze_escape_core::CellKind::Path => PATH_COLOR,
            maze_escape_core::CellKind::Exit => EXIT_COLOR.lighten(0.2),
        };
        let (x, y) = metrics.cell_origin(cell);
        macroquad::shapes::draw_rectangle(
            x,
            y,
            metrics.cell_step,
            metrics.cell_step,
            to_macroquad_color(color),
        );
    }
}

fn draw_inhabitants(scene: &Scene, metrics: &SceneMetrics) {
    let radius = metrics.cell_step * 0.38;
    let visibility: VisibilityPresentation = scene.visibility;

    for bonus in &scene.bonuses {
        if visibility.reveals(bonus.cell) {
            let (x, y) = metrics.cell_center(bonus.cell);
            macroquad::shapes::draw_circle(x, y, radius * 0.7, to_macroquad_color(bonus.color));
        }
    }

    if visibility.reveals(scene.creature.cell) {
        let (x, y) = metrics.cell_center(scene.creature.cell);
        macroquad::shapes::draw_circle(x, y, radius, to_macroquad_color(scene.creature.color));
    }

    let (x, y) = metrics.cell_center(scene.player.cell);
    macroquad::shapes::draw_circle(x, y, radius, to_macroquad_color(scene.player.color));
}

fn draw_hud(scene: &Scene) {
    let text = format!("Level {}", scene.level_number);
    macroquad::text::draw_text(&text, 12.0, 24.0, 28.0, macroquad::color::WHITE);
}

fn draw_banner(banner: &str) {
    let screen_width = macroquad::window::screen_width();
    let screen_height = macroquad::window::screen_height();
    let font_size = 48.0;
    let dimensions = macroquad::text::measure_text(banner, None, font_size as u16, 1.0);

    let band_height = font_size * 2.0;
    let band_top = (screen_height - band_height) / 2.0;
    macroquad::shapes::draw_rectangle(
        0.0,
        band_top,
        screen_width,
        band_height,
        macroquad::color::Color::new(0.0, 0.0, 0.0, 0.75),
    );
    macroquad::text::draw_text(
        banner,
        (screen_width - dimensions.width) / 2.0,
        band_top + band_height / 2.0 + dimensions.offset_y / 2.0,
        font_size,
        macroquad::color::WHITE,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
