//! Active enemy bookkeeping.

use std::collections::BTreeMap;

use mine_defence_core::{CellCoord, EnemyId, EnemyKind, EnemySnapshot, Path};

/// Snapshot of an enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) kind: EnemyKind,
    pub(crate) health: f32,
    pub(crate) origin: CellCoord,
    pub(crate) cell: CellCoord,
    pub(crate) path: Path,
}

/// Registry that stores live enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty enemy registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Stores a new enemy positioned on its origin and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: EnemyKind,
        health: f32,
        origin: CellCoord,
        path: Path,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            EnemyState {
                kind,
                health,
                origin,
                cell: origin,
                path,
            },
        );
        id
    }

    /// Drops the enemy, returning its last state when it was present.
    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<EnemyState> {
        self.entries.remove(&id)
    }

    /// Updates the cell the enemy currently occupies.
    pub(crate) fn relocate(&mut self, id: EnemyId, cell: CellCoord) -> bool {
        match self.entries.get_mut(&id) {
            Some(enemy) => {
                enemy.cell = cell;
                true
            }
            None => false,
        }
    }

    /// Number of live enemies.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot of the enemy, if it is still alive.
    pub(crate) fn snapshot(&self, id: EnemyId) -> Option<EnemySnapshot> {
        self.entries.get(&id).map(|enemy| snapshot(id, enemy))
    }

    /// Snapshots of every live enemy ordered by identifier.
    pub(crate) fn snapshots(&self) -> Vec<EnemySnapshot> {
        self.entries
            .iter()
            .map(|(id, enemy)| snapshot(*id, enemy))
            .collect()
    }

    /// Closest live enemy within `range` cells of `from`, measured in straight
    /// line distance. Ties resolve to the lowest identifier.
    pub(crate) fn nearest(&self, from: CellCoord, range: u32) -> Option<EnemyId> {
        let limit = u64::from(range) * u64::from(range);
        self.entries
            .iter()
            .map(|(id, enemy)| (squared_distance(from, enemy.cell), *id))
            .filter(|(distance, _)| *distance <= limit)
            .min()
            .map(|(_, id)| id)
    }
}

fn snapshot(id: EnemyId, enemy: &EnemyState) -> EnemySnapshot {
    EnemySnapshot {
        id,
        kind: enemy.kind,
        health: enemy.health,
        origin: enemy.origin,
        cell: enemy.cell,
        path: enemy.path.clone(),
    }
}

fn squared_distance(a: CellCoord, b: CellCoord) -> u64 {
    let dx = u64::from(a.column().abs_diff(b.column()));
    let dy = u64::from(a.row().abs_diff(b.row()));
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_allocated_in_order() {
        let mut registry = EnemyRegistry::new();
        let first = registry.insert(EnemyKind::Normal, 3.0, CellCoord::new(0, 0), Path::empty());
        let second = registry.insert(EnemyKind::Tank, 3.3, CellCoord::new(1, 0), Path::empty());

        assert_eq!(first, EnemyId::new(0));
        assert_eq!(second, EnemyId::new(1));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(first).is_some());
        assert!(registry.remove(first).is_none());
        let third = registry.insert(EnemyKind::Fast, 3.0, CellCoord::new(0, 0), Path::empty());
        assert_eq!(third, EnemyId::new(2));
    }

    #[test]
    fn nearest_respects_range_and_ties() {
        let mut registry = EnemyRegistry::new();
        let far = registry.insert(EnemyKind::Normal, 3.0, CellCoord::new(9, 0), Path::empty());
        let left = registry.insert(EnemyKind::Normal, 3.0, CellCoord::new(2, 5), Path::empty());
        let right = registry.insert(EnemyKind::Normal, 3.0, CellCoord::new(8, 5), Path::empty());

        let center = CellCoord::new(5, 5);
        assert_eq!(registry.nearest(center, 3), Some(left));
        assert_eq!(registry.nearest(center, 2), None);

        assert!(registry.relocate(right, CellCoord::new(6, 5)));
        assert_eq!(registry.nearest(center, 3), Some(right));
        assert_eq!(registry.nearest(CellCoord::new(9, 1), 1), Some(far));
    }
}
