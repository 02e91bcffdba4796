#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Escape adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use maze_escape_core::{BonusKind, CellCoord, CellKind, Direction};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction the player asked to step in on this frame, if any.
    pub direction: Option<Direction>,
}

/// Describes a square cell grid that can be rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
}

impl CellGridPresentation {
    /// Creates a new cell grid descriptor.
    ///
    /// Returns an error when `cell_length` is not strictly positive.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, RenderingError> {
        if cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }
}

/// Actor rendered as a filled shape inside a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Cell the actor occupies.
    pub cell: CellCoord,
    /// Fill color of the actor's body.
    pub color: Color,
}

impl ActorPresentation {
    /// Creates a new actor descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, color: Color) -> Self {
        Self { cell, color }
    }
}

/// Potion pickup rendered inside a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonusPresentation {
    /// Kind of potion placed at the cell.
    pub kind: BonusKind,
    /// Cell the potion occupies.
    pub cell: CellCoord,
    /// Fill color of the potion.
    pub color: Color,
}

impl BonusPresentation {
    /// Creates a new potion descriptor.
    #[must_use]
    pub const fn new(kind: BonusKind, cell: CellCoord, color: Color) -> Self {
        Self { kind, cell, color }
    }
}

/// Fog-of-war disc centered on the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityPresentation {
    /// Cell the disc is centered on.
    pub origin: CellCoord,
    /// Radius of the disc measured in cells.
    pub radius: f32,
}

impl VisibilityPresentation {
    /// Creates a new visibility descriptor.
    #[must_use]
    pub const fn new(origin: CellCoord, radius: f32) -> Self {
        Self { origin, radius }
    }

    /// Reports whether a cell falls inside the visible disc.
    ///
    /// Distance is measured center to center; a cell exactly on the radius
    /// is hidden.
    #[must_use]
    pub fn reveals(&self, cell: CellCoord) -> bool {
        let origin = Vec2::new(self.origin.column() as f32, self.origin.row() as f32);
        let target = Vec2::new(cell.column() as f32, cell.row() as f32);
        origin.distance(target) < self.radius
    }
}

/// Scene description combining the maze grid and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Cell grid that composes the play area.
    pub cell_grid: CellGridPresentation,
    /// Kind of every cell, stored in row-major order.
    pub cells: Vec<CellKind>,
    /// Player actor.
    pub player: ActorPresentation,
    /// Pursuing creature actor.
    pub creature: ActorPresentation,
    /// Potions currently placed in the maze.
    pub bonuses: Vec<BonusPresentation>,
    /// Fog-of-war disc revealing part of the maze.
    pub visibility: VisibilityPresentation,
    /// One-based number of the level being played.
    pub level_number: u32,
    /// Overlay text shown across the maze, if any.
    pub banner: Option<String>,
}

impl Scene {
    /// Creates a new scene descriptor.
    ///
    /// Returns an error when the cell buffer does not cover the grid exactly.
    #[allow(clippy::too_many_arguments)] // Scene construction intentionally enumerates every channel explicitly.
    pub fn new(
        cell_grid: CellGridPresentation,
        cells: Vec<CellKind>,
        player: ActorPresentation,
        creature: ActorPresentation,
        bonuses: Vec<BonusPresentation>,
        visibility: VisibilityPresentation,
        level_number: u32,
        banner: Option<String>,
    ) -> Result<Self, RenderingError> {
        let expected = cell_grid.columns as usize * cell_grid.rows as usize;
        if cells.len() != expected {
            return Err(RenderingError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            cell_grid,
            cells,
            player,
            creature,
            bonuses,
            visibility,
            level_number,
            banner,
        })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Maze Escape scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered, allowing adapters to animate world snapshots
    /// deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cell length must be positive to avoid a zero-sized maze.
    InvalidCellLength {
        /// Provided cell length that failed validation.
        cell_length: f32,
    },
    /// The cell buffer must cover the grid exactly.
    CellCountMismatch {
        /// Number of cells implied by the grid dimensions.
        expected: usize,
        /// Number of cells actually supplied.
        actual: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
            Self::CellCountMismatch { expected, actual } => {
                write!(
                    f,
                    "cell buffer must hold exactly {expected} cells (received {actual})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> CellGridPresentation {
        CellGridPresentation::new(4, 3, 16.0).expect("positive cell length")
    }

    fn scene_with_cells(cells: Vec<CellKind>) -> Result<Scene, RenderingError> {
        Scene::new(
            grid(),
            cells,
            ActorPresentation::new(CellCoord::new(1, 1), Color::from_rgb_u8(255, 255, 0)),
            ActorPresentation::new(CellCoord::new(2, 1), Color::from_rgb_u8(255, 0, 0)),
            Vec::new(),
            VisibilityPresentation::new(CellCoord::new(1, 1), 5.0),
            1,
            None,
        )
    }

    #[test]
    fn grid_creation_rejects_non_positive_cell_lengths() {
        let error = CellGridPresentation::new(4, 3, 0.0)
            .expect_err("zero cell length must be rejected");
        assert!(matches!(
            error,
            RenderingError::InvalidCellLength { .. }
        ));
    }

    #[test]
    fn grid_dimensions_scale_with_cell_length() {
        let grid = grid();
        assert!((grid.width() - 64.0).abs() < f32::EPSILON);
        assert!((grid.height() - 48.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scene_creation_rejects_a_short_cell_buffer() {
        let error = scene_with_cells(vec![CellKind::Wall; 11])
            .expect_err("eleven cells cannot cover a 4x3 grid");
        assert_eq!(
            error,
            RenderingError::CellCountMismatch {
                expected: 12,
                actual: 11,
            }
        );
    }

    #[test]
    fn scene_creation_accepts_an_exact_cell_buffer() {
        let scene = scene_with_cells(vec![CellKind::Wall; 12]).expect("exact cover");
        assert_eq!(scene.cells.len(), 12);
        assert!(scene.banner.is_none());
    }

    #[test]
    fn visibility_reveals_strictly_inside_the_radius() {
        let visibility = VisibilityPresentation::new(CellCoord::new(10, 10), 5.0);
        assert!(visibility.reveals(CellCoord::new(10, 10)));
        assert!(visibility.reveals(CellCoord::new(13, 13)));
        // Exactly on the radius: hidden.
        assert!(!visibility.reveals(CellCoord::new(15, 10)));
        assert!(!visibility.reveals(CellCoord::new(10, 5)));
        assert!(!visibility.reveals(CellCoord::new(16, 10)));
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 128, 255).lighten(0.5);
        assert!(color.red > 0.49 && color.red < 0.51);
        assert!(color.green > 0.75);
        assert!((color.blue - 1.0).abs() < f32::EPSILON);
    }
}
