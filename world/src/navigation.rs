//! Shortest-path search over the carved grid.

use std::collections::VecDeque;

use maze_escape_core::{CellCoord, Direction};

use crate::Grid;

/// Computes the shortest walkable path from `start` to `goal`.
///
/// Breadth-first search over the 4-connected walkable cells, so the first
/// time `goal` is reached the path is shortest in unweighted steps. Cells are
/// marked visited when enqueued, not when dequeued, which bounds the search
/// to one visit per cell. The result lists the cells from the one after
/// `start` up to and including `goal`.
///
/// Returns an empty path when `start == goal`, when either endpoint is out of
/// bounds or a wall, or when the two cells lie in disconnected regions.
/// Callers treat an empty path as "hold position"; it is never an error.
#[must_use]
pub fn shortest_path(grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if start == goal || !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return Vec::new();
    }

    let columns = grid.columns() as usize;
    let cell_count = columns * grid.rows() as usize;
    let mut parents: Vec<Option<CellCoord>> = vec![None; cell_count];
    let index = |cell: CellCoord| cell.row() as usize * columns + cell.column() as usize;

    let mut frontier = VecDeque::new();
    parents[index(start)] = Some(start);
    frontier.push_back(start);

    while let Some(cell) = frontier.pop_front() {
        if cell == goal {
            return reconstruct(&parents, columns, start, goal);
        }

        for direction in Direction::ALL {
            let Some(neighbor) = cell.step(direction) else {
                continue;
            };
            if !grid.is_walkable(neighbor) {
                continue;
            }
            let slot = &mut parents[index(neighbor)];
            if slot.is_none() {
                *slot = Some(cell);
                frontier.push_back(neighbor);
            }
        }
    }

    Vec::new()
}

fn reconstruct(
    parents: &[Option<CellCoord>],
    columns: usize,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        path.push(cursor);
        let index = cursor.row() as usize * columns + cursor.column() as usize;
        match parents[index] {
            Some(parent) => cursor = parent,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
