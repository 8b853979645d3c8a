//! Authoritative spawn origin bookkeeping.

use mine_defence_core::{CellCoord, CellState, GridConfig, SpawnOrigin, SpawnOriginId};
use rand::Rng;

use crate::grid::{CellBounds, Grid};

/// Registry that stores spawn origins and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct SpawnOriginRegistry {
    entries: Vec<SpawnOrigin>,
    next_origin_id: SpawnOriginId,
    base_center: CellCoord,
    base_area: Option<CellBounds>,
    min_distance: u32,
}

impl SpawnOriginRegistry {
    /// Creates an empty registry around the base described by the configuration.
    pub(crate) fn new(config: &GridConfig) -> Self {
        Self {
            entries: Vec::new(),
            next_origin_id: SpawnOriginId::new(0),
            base_center: CellCoord::new(config.width / 2, config.height / 2),
            base_area: CellBounds::centered(config.width, config.height, config.base_size),
            min_distance: config.min_origin_distance,
        }
    }

    /// Reference point enemies travel toward.
    pub(crate) fn base_center(&self) -> CellCoord {
        self.base_center
    }

    /// Reports whether the cell lies inside the protected base area.
    pub(crate) fn in_base_area(&self, cell: CellCoord) -> bool {
        self.base_area.is_some_and(|area| area.contains(cell))
    }

    /// Registered origins in creation order.
    pub(crate) fn origins(&self) -> &[SpawnOrigin] {
        &self.entries
    }

    /// Promotes one qualifying cell to a spawn origin.
    ///
    /// Candidates are open, hazard-free cells that are not origins yet, lie
    /// outside the base area and sit at least the configured Manhattan distance
    /// away from the base centre. Returns `None` without touching the grid when
    /// no cell qualifies.
    pub(crate) fn try_register<R: Rng>(
        &mut self,
        grid: &mut Grid,
        rng: &mut R,
    ) -> Option<SpawnOrigin> {
        let candidates: Vec<CellCoord> = grid
            .cells()
            .filter(|cell| {
                cell.state == CellState::Open
                    && !cell.hazard
                    && !cell.spawn_origin
                    && !self.in_base_area(cell.coord)
                    && cell.coord.manhattan_distance(self.base_center) >= self.min_distance
            })
            .map(|cell| cell.coord)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let cell = candidates[rng.gen_range(0..candidates.len())];
        grid.set_spawn_origin(cell);

        let origin = SpawnOrigin {
            id: self.next_origin_id,
            cell,
        };
        self.next_origin_id = SpawnOriginId::new(self.next_origin_id.get().saturating_add(1));
        self.entries.push(origin);
        Some(origin)
    }

    /// Uniformly picks one registered origin.
    pub(crate) fn random_origin<R: Rng>(&self, rng: &mut R) -> Option<SpawnOrigin> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries[rng.gen_range(0..self.entries.len())])
    }
}
