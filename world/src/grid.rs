//! Hazard grid holding disclosure state and progress counters.

use mine_defence_core::{Cell, CellCoord, CellState, Event, GridConfig};
use rand::Rng;

/// Axis-aligned cell rectangle with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CellBounds {
    min_column: u32,
    max_column: u32,
    min_row: u32,
    max_row: u32,
}

impl CellBounds {
    /// Square of side `side` centred on `(width / 2, height / 2)`, clipped to the grid.
    ///
    /// Even sides extend one cell further toward the lower indices, so a side of
    /// four on a twenty cell axis spans `8..=11`. Returns `None` when nothing of
    /// the square lies inside the grid.
    pub(crate) fn centered(width: u32, height: u32, side: u32) -> Option<Self> {
        if side == 0 || width == 0 || height == 0 {
            return None;
        }

        let (min_column, max_column) = centered_span(width, side)?;
        let (min_row, max_row) = centered_span(height, side)?;
        Some(Self {
            min_column,
            max_column,
            min_row,
            max_row,
        })
    }

    /// Reports whether the cell lies inside the rectangle.
    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        (self.min_column..=self.max_column).contains(&cell.column())
            && (self.min_row..=self.max_row).contains(&cell.row())
    }

    /// Cells of the rectangle, column by column.
    pub(crate) fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let rows = self.min_row..=self.max_row;
        (self.min_column..=self.max_column)
            .flat_map(move |column| rows.clone().map(move |row| CellCoord::new(column, row)))
    }
}

fn centered_span(extent: u32, side: u32) -> Option<(u32, u32)> {
    let center = i64::from(extent / 2);
    let half = i64::from(side / 2);
    let min = center - half;
    let max = if side % 2 == 0 {
        center + half - 1
    } else {
        center + half
    };

    let min = min.max(0);
    let max = max.min(i64::from(extent) - 1);
    if min > max {
        return None;
    }

    Some((u32::try_from(min).ok()?, u32::try_from(max).ok()?))
}

/// Surrounding offsets in `dx = -1..=1`, `dy = -1..=1` order.
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Clone, Copy, Debug)]
struct Tile {
    state: CellState,
    hazard: bool,
    adjacent_hazards: u8,
    spawn_origin: bool,
}

impl Tile {
    const fn hidden() -> Self {
        Self {
            state: CellState::Hidden,
            hazard: false,
            adjacent_hazards: 0,
            spawn_origin: false,
        }
    }
}

/// Dense row-major grid of cells.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    hazard_count: u32,
    opened_count: u32,
    baseline_opened: u32,
    safe_zone: Option<CellBounds>,
}

impl Grid {
    /// Builds the grid, scatters hazards and opens the safe zone.
    pub(crate) fn generate<R: Rng>(config: &GridConfig, rng: &mut R) -> Self {
        let width = config.width;
        let height = config.height;
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);

        let mut grid = Self {
            width,
            height,
            tiles: vec![Tile::hidden(); capacity],
            hazard_count: 0,
            opened_count: 0,
            baseline_opened: 0,
            safe_zone: CellBounds::centered(width, height, config.safe_zone_size),
        };

        grid.place_hazards(config.hazard_ratio, rng);
        grid.count_adjacent_hazards();
        grid.open_safe_zone();

        tracing::info!(
            width,
            height,
            hazards = grid.hazard_count,
            baseline = grid.baseline_opened,
            "grid initialised"
        );
        grid
    }

    fn place_hazards<R: Rng>(&mut self, ratio: f32, rng: &mut R) {
        if self.tiles.is_empty() {
            return;
        }

        let total = self.tiles.len();
        let target = (total as f32 * ratio).round() as usize;
        let mut budget = total.saturating_mul(10);
        let mut placed = 0;

        while placed < target && budget > 0 {
            budget -= 1;

            let cell = CellCoord::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height));
            if self.in_safe_zone(cell) {
                continue;
            }

            let Some(index) = self.index(cell) else {
                continue;
            };
            let tile = &mut self.tiles[index];
            if tile.hazard {
                continue;
            }

            tile.hazard = true;
            placed += 1;
        }

        if placed < target {
            tracing::warn!(placed, target, "hazard placement budget exhausted");
        }

        self.hazard_count = u32::try_from(placed).unwrap_or(u32::MAX);
    }

    fn count_adjacent_hazards(&mut self) {
        for row in 0..self.height {
            for column in 0..self.width {
                let cell = CellCoord::new(column, row);
                let count = self
                    .moore_neighbors(cell)
                    .filter(|neighbor| self.is_hazard(*neighbor))
                    .count();
                if let Some(index) = self.index(cell) {
                    self.tiles[index].adjacent_hazards = count as u8;
                }
            }
        }
    }

    fn open_safe_zone(&mut self) {
        let mut discarded = Vec::new();
        if let Some(zone) = self.safe_zone {
            for cell in zone.cells() {
                if self.is_hazard(cell) {
                    continue;
                }
                self.disclose(cell, false, &mut discarded);
            }
        }
        self.baseline_opened = self.opened_count;
    }

    /// Number of columns.
    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Hazards actually placed during initialisation.
    pub(crate) fn hazard_count(&self) -> u32 {
        self.hazard_count
    }

    /// Non-hazard cells opened so far, safe zone included.
    pub(crate) fn opened_count(&self) -> u32 {
        self.opened_count
    }

    /// Cells opened by the safe zone, excluded from progress.
    pub(crate) fn baseline_opened(&self) -> u32 {
        self.baseline_opened
    }

    /// Reports whether the cell falls inside the free starting area.
    pub(crate) fn in_safe_zone(&self, cell: CellCoord) -> bool {
        self.safe_zone.is_some_and(|zone| zone.contains(cell))
    }

    /// Fraction of the non-hazard, non-baseline cells opened by the player.
    pub(crate) fn progress(&self) -> f32 {
        let total = u32::try_from(self.tiles.len()).unwrap_or(u32::MAX);
        let opened = self.opened_count.saturating_sub(self.baseline_opened);
        let available = total
            .saturating_sub(self.hazard_count)
            .saturating_sub(self.baseline_opened)
            .max(1);
        opened as f32 / available as f32
    }

    /// Reports whether the coordinate lies inside the grid.
    pub(crate) fn is_inside_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Snapshot of the cell, if it exists.
    pub(crate) fn cell(&self, cell: CellCoord) -> Option<Cell> {
        let tile = self.tile(cell)?;
        Some(Cell {
            coord: cell,
            state: tile.state,
            hazard: tile.hazard,
            adjacent_hazards: tile.adjacent_hazards,
            spawn_origin: tile.spawn_origin,
        })
    }

    /// Snapshots of every cell, column by column.
    pub(crate) fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.width).flat_map(move |column| {
            (0..self.height).filter_map(move |row| self.cell(CellCoord::new(column, row)))
        })
    }

    /// A cell is walkable when it exists, hides no hazard and is open.
    pub(crate) fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile(cell)
            .is_some_and(|tile| !tile.hazard && tile.state == CellState::Open)
    }

    /// Walkable axis-aligned neighbours in `+x, -x, +y, -y` order.
    pub(crate) fn walkable_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        [
            cell.offset(1, 0),
            cell.offset(-1, 0),
            cell.offset(0, 1),
            cell.offset(0, -1),
        ]
        .into_iter()
        .flatten()
        .filter(move |neighbor| self.is_walkable(*neighbor))
    }

    /// Opens the cell and flood-fills zero regions.
    ///
    /// Every opened cell raises its own [`Event::CellDisclosed`] when
    /// `counts_toward_progress` is set.
    pub(crate) fn disclose(
        &mut self,
        cell: CellCoord,
        counts_toward_progress: bool,
        out_events: &mut Vec<Event>,
    ) {
        let mut pending = vec![cell];
        while let Some(opened) = self.disclose_next(&mut pending) {
            if counts_toward_progress {
                out_events.push(Event::CellDisclosed {
                    cell: opened,
                    progress: self.progress(),
                });
            }
        }
    }

    /// Opens the next cell of a flood-fill work list and returns it.
    ///
    /// The work list replays the recursive visitation order: a cell's
    /// neighbours are explored depth first in `dx = -1..=1`, `dy = -1..=1`
    /// order, and cells that are already open when popped are skipped, which
    /// bounds the fill by the grid size. Returns `None` once the list is
    /// exhausted.
    pub(crate) fn disclose_next(&mut self, pending: &mut Vec<CellCoord>) -> Option<CellCoord> {
        while let Some(current) = pending.pop() {
            let Some(index) = self.index(current) else {
                continue;
            };

            let tile = &mut self.tiles[index];
            if tile.hazard || matches!(tile.state, CellState::Open | CellState::Flagged) {
                continue;
            }

            tile.state = CellState::Open;
            let adjacent_hazards = tile.adjacent_hazards;
            self.opened_count = self.opened_count.saturating_add(1);

            if adjacent_hazards == 0 {
                let neighbors: Vec<CellCoord> = self
                    .moore_neighbors(current)
                    .filter(|neighbor| !self.is_hazard(*neighbor))
                    .collect();
                pending.extend(neighbors.into_iter().rev());
            }
            return Some(current);
        }
        None
    }

    /// Cycles the flag on a closed cell, returning the new flagged state.
    ///
    /// Open cells are left untouched. A buildable cell becomes flagged and is
    /// not restored to buildable by a second toggle.
    pub(crate) fn toggle_flag(&mut self, cell: CellCoord) -> Option<bool> {
        let index = self.index(cell)?;
        let tile = &mut self.tiles[index];
        match tile.state {
            CellState::Open => None,
            CellState::Flagged => {
                tile.state = CellState::Hidden;
                Some(false)
            }
            CellState::Hidden | CellState::Buildable => {
                tile.state = CellState::Flagged;
                Some(true)
            }
        }
    }

    /// Forces the cell into the buildable state.
    pub(crate) fn mark_buildable(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.tiles[index].state = CellState::Buildable;
        true
    }

    /// Opens a hazardous cell without flood-fill or progress accounting.
    pub(crate) fn reveal_hazard(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let tile = &mut self.tiles[index];
        if !tile.hazard || matches!(tile.state, CellState::Open | CellState::Flagged) {
            return false;
        }
        tile.state = CellState::Open;
        true
    }

    /// Permanently flags the cell as a spawn origin.
    pub(crate) fn set_spawn_origin(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.tiles[index].spawn_origin = true;
        }
    }

    fn is_hazard(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(|tile| tile.hazard)
    }

    fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    fn moore_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let mut candidates = [None; 8];
        for (slot, (dx, dy)) in candidates.iter_mut().zip(MOORE_OFFSETS) {
            *slot = cell
                .offset(dx, dy)
                .filter(|neighbor| self.is_inside_bounds(*neighbor));
        }
        candidates.into_iter().flatten()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.is_inside_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}
