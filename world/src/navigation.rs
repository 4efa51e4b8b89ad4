//! Occupancy grid and flow-field builder used by the world crate.

use std::collections::VecDeque;

use arcade_defence_core::{CellCoord, GRID_COLUMNS, GRID_ROWS};

/// Distance assigned to cells the exit cannot reach, and to blocked cells.
pub(crate) const UNREACHABLE: u16 = 999;

/// Dense occupancy bitmap for the fixed defence grid.
///
/// Only blocking towers mark cells; traps and overlays stay walkable. The
/// grid is mutated exclusively by build, sell and destruction paths so the
/// flow field can be rebuilt eagerly after every change.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    cells: Vec<bool>,
}

impl Grid {
    pub(crate) fn new() -> Self {
        Self {
            cells: vec![false; cell_count()],
        }
    }

    pub(crate) fn is_blocked(&self, cell: CellCoord) -> bool {
        index(cell).map_or(true, |offset| self.cells[offset])
    }

    pub(crate) fn set_blocked(&mut self, cell: CellCoord, blocked: bool) {
        if let Some(offset) = index(cell) {
            self.cells[offset] = blocked;
        }
    }
}

/// Dense distance-to-exit map guiding ground movement.
///
/// Rebuilt with a reverse breadth-first search seeded at the exit whenever
/// the grid changes. Distances start at zero on the exit cell and grow by
/// one per step; [`UNREACHABLE`] marks walls and severed regions.
#[derive(Clone, Debug)]
pub(crate) struct FlowField {
    distances: Vec<u16>,
}

impl FlowField {
    pub(crate) fn new() -> Self {
        Self {
            distances: vec![UNREACHABLE; cell_count()],
        }
    }

    /// Rebuilds the distances from scratch for the provided exit and grid.
    pub(crate) fn rebuild(&mut self, exit: CellCoord, grid: &Grid) {
        self.distances.fill(UNREACHABLE);

        let Some(exit_index) = index(exit) else {
            return;
        };
        if grid.is_blocked(exit) {
            return;
        }

        self.distances[exit_index] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(exit);

        while let Some(cell) = queue.pop_front() {
            let Some(cell_index) = index(cell) else {
                continue;
            };
            let next_distance = self.distances[cell_index] + 1;

            for neighbor in cardinal_neighbors(cell) {
                if grid.is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Distance recorded for the cell; out-of-bounds reads as unreachable.
    pub(crate) fn distance(&self, cell: CellCoord) -> u16 {
        index(cell).map_or(UNREACHABLE, |offset| self.distances[offset])
    }

    pub(crate) fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell) < UNREACHABLE
    }
}

/// In-bounds 4-connected neighbors probed in the fixed order down, right,
/// up, left. Ground movement relies on this order for its tie-break.
pub(crate) fn cardinal_neighbors(cell: CellCoord) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if cell.row() + 1 < GRID_ROWS {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() + 1));
        count += 1;
    }
    if cell.column() + 1 < GRID_COLUMNS {
        candidates[count] = Some(CellCoord::new(cell.column() + 1, cell.row()));
        count += 1;
    }
    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }
    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn cell_count() -> usize {
    GRID_COLUMNS as usize * GRID_ROWS as usize
}

fn index(cell: CellCoord) -> Option<usize> {
    if cell.in_bounds() {
        Some(cell.row() as usize * GRID_COLUMNS as usize + cell.column() as usize)
    } else {
        None
    }
}
