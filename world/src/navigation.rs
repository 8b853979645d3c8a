//! Grid-constrained A* search used to route enemies toward the base.

use mine_defence_core::{CellCoord, Path};

use crate::grid::Grid;

const UNREACHED: u32 = u32::MAX;

/// Computes the shortest 4-connected walkable route from `start` to `goal`.
///
/// Steps cost one and the heuristic is the Manhattan distance. The open list is
/// scanned linearly for the lowest `f = g + h` and ties resolve to the entry
/// that was inserted first, so equal-length routes are chosen deterministically.
/// Returns `None` when the goal is not walkable or no walkable chain connects
/// the two cells.
pub(crate) fn find_path(grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<Path> {
    if !grid.is_walkable(goal) || !grid.is_inside_bounds(start) {
        return None;
    }

    let width = usize::try_from(grid.width()).ok()?;
    let height = usize::try_from(grid.height()).ok()?;
    let cell_count = width.checked_mul(height)?;

    let mut g_scores = vec![UNREACHED; cell_count];
    let mut f_scores = vec![UNREACHED; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut open = vec![start];

    let start_index = index(width, start)?;
    g_scores[start_index] = 0;
    f_scores[start_index] = start.manhattan_distance(goal);

    while !open.is_empty() {
        let mut best = 0;
        let mut best_f = score(&f_scores, width, open[0]);
        for (position, &candidate) in open.iter().enumerate().skip(1) {
            let candidate_f = score(&f_scores, width, candidate);
            if candidate_f < best_f {
                best = position;
                best_f = candidate_f;
            }
        }

        let current = open.remove(best);
        if current == goal {
            return Some(reconstruct(&came_from, width, current));
        }

        let tentative = score(&g_scores, width, current).saturating_add(1);
        for neighbor in grid.walkable_neighbors(current) {
            let Some(neighbor_index) = index(width, neighbor) else {
                continue;
            };

            if tentative >= g_scores[neighbor_index] {
                continue;
            }

            came_from[neighbor_index] = Some(current);
            g_scores[neighbor_index] = tentative;
            f_scores[neighbor_index] = tentative.saturating_add(neighbor.manhattan_distance(goal));

            if !open.contains(&neighbor) {
                open.push(neighbor);
            }
        }
    }

    None
}

fn reconstruct(came_from: &[Option<CellCoord>], width: usize, goal: CellCoord) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;

    while let Some(previous) = index(width, current).and_then(|offset| came_from[offset]) {
        cells.push(previous);
        current = previous;
    }

    cells.reverse();
    Path::new(cells)
}

fn score(scores: &[u32], width: usize, cell: CellCoord) -> u32 {
    index(width, cell)
        .and_then(|offset| scores.get(offset).copied())
        .unwrap_or(UNREACHED)
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
