//! Maze carving via randomized depth-first backtracking.

use maze_escape_core::{CellCoord, CellKind, Direction, GridError};
use rand::{seq::SliceRandom, Rng};

use crate::Grid;

/// Cell the carve always starts from; also the player spawn.
pub(crate) const SEED_CELL: CellCoord = CellCoord::new(1, 1);

/// Stack frame for the iterative carve.
///
/// Each frame owns a fresh random permutation of the four directions so the
/// branching order differs per junction; a single shared shuffle would bias
/// every corridor the same way.
struct Frame {
    cell: CellCoord,
    directions: [Direction; 4],
    next: usize,
}

impl Frame {
    fn new(cell: CellCoord, rng: &mut impl Rng) -> Self {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions,
            next: 0,
        }
    }
}

/// Carves a perfect maze into the all-wall `grid`, starting at [`SEED_CELL`].
///
/// Uses an explicit stack of `(cell, remaining directions)` frames rather
/// than native recursion so the depth stays bounded on large grids. Every
/// carved cell is reachable from the seed by exactly one simple path.
///
/// Both dimensions must be odd and at least 5; otherwise the far corners of
/// the grid cannot be reached by the two-cell stride and the carve is
/// rejected before any cell is mutated.
pub(crate) fn carve(grid: &mut Grid, rng: &mut impl Rng) -> Result<(), GridError> {
    let columns = grid.columns();
    let rows = grid.rows();
    if columns < 5 || rows < 5 || columns % 2 == 0 || rows % 2 == 0 {
        return Err(GridError::InvalidDimensions { columns, rows });
    }

    grid.set_kind(SEED_CELL, CellKind::Path)?;

    let mut stack = vec![Frame::new(SEED_CELL, rng)];
    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.directions.len() {
            let _ = stack.pop();
            continue;
        }

        let direction = frame.directions[frame.next];
        frame.next += 1;
        let cell = frame.cell;

        let Some((between, beyond)) = two_cell_stride(cell, direction) else {
            continue;
        };
        if !strictly_inside_border(beyond, columns, rows) {
            continue;
        }
        if grid.kind_at(beyond)? != CellKind::Wall {
            continue;
        }

        grid.set_kind(between, CellKind::Path)?;
        grid.set_kind(beyond, CellKind::Path)?;
        stack.push(Frame::new(beyond, rng));
    }

    Ok(())
}

fn two_cell_stride(cell: CellCoord, direction: Direction) -> Option<(CellCoord, CellCoord)> {
    let between = cell.step(direction)?;
    let beyond = between.step(direction)?;
    Some((between, beyond))
}

fn strictly_inside_border(cell: CellCoord, columns: u32, rows: u32) -> bool {
    cell.column() > 0 && cell.column() < columns - 1 && cell.row() > 0 && cell.row() < rows - 1
}
