#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Mine Defence.

mod enemies;
mod grid;
mod navigation;
mod origins;

use std::collections::BTreeSet;

use mine_defence_core::{
    BuildError, CellCoord, Command, ConfigError, Event, GridConfig, PlayMode,
    BASE_ENEMY_HEALTH, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use enemies::EnemyRegistry;
use grid::Grid;
use origins::SpawnOriginRegistry;

/// Hit points of the base the enemies are marching on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseHealth {
    current: u32,
    max: u32,
}

impl BaseHealth {
    /// Creates a base at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Hit points left.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Hit points at full health.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether the base has no hit points left.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.current == 0
    }

    fn damage(&mut self, amount: u32) -> Option<u32> {
        if self.is_destroyed() {
            return None;
        }
        self.current = self.current.saturating_sub(amount);
        Some(self.current)
    }
}

/// Represents the authoritative Mine Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    origins: SpawnOriginRegistry,
    enemies: EnemyRegistry,
    base: BaseHealth,
    play_mode: PlayMode,
    build_sites: BTreeSet<CellCoord>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world from the provided grid layout.
    ///
    /// Hazard placement and spawn origin selection draw from a generator seeded
    /// with `seed`, so equal seeds and commands always produce equal worlds.
    pub fn new(config: &GridConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::generate(config, &mut rng);

        Ok(Self {
            banner: WELCOME_BANNER,
            grid,
            origins: SpawnOriginRegistry::new(config),
            enemies: EnemyRegistry::new(),
            base: BaseHealth::new(config.base_health),
            play_mode: PlayMode::Explore,
            build_sites: BTreeSet::new(),
            rng,
        })
    }

    fn claim_build_site(&mut self, cell: CellCoord) -> Result<(), BuildError> {
        if self.play_mode != PlayMode::Build {
            return Err(BuildError::InvalidMode);
        }

        if !self.grid.is_inside_bounds(cell) {
            return Err(BuildError::OutOfBounds);
        }

        if self.build_sites.contains(&cell) {
            return Err(BuildError::Occupied);
        }

        if !query::is_buildable(self, cell) {
            return Err(BuildError::NotBuildable);
        }

        let _ = self.build_sites.insert(cell);
        Ok(())
    }
}

/// Opens `cell` and flood-fills zero regions, handing each counted
/// disclosure to `observer` before the next cell opens.
///
/// Each [`Event::CellDisclosed`] is pushed to `out_events` and then passed to
/// the observer together with the world as it stood when that cell opened.
/// The observer may mutate the world and append its own events, which land
/// between this disclosure and the next one.
pub fn disclose<F>(
    world: &mut World,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
    mut observer: F,
) where
    F: FnMut(&mut World, &Event, &mut Vec<Event>),
{
    let mut pending = vec![cell];
    while let Some(opened) = world.grid.disclose_next(&mut pending) {
        let event = Event::CellDisclosed {
            cell: opened,
            progress: world.grid.progress(),
        };
        out_events.push(event.clone());
        observer(world, &event, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Disclose { cell } => disclose(world, cell, out_events, |_, _, _| {}),
        Command::ToggleFlag { cell } => {
            if let Some(flagged) = world.grid.toggle_flag(cell) {
                out_events.push(Event::FlagToggled { cell, flagged });
            }
        }
        Command::RevealHazard { cell } => {
            if world.grid.reveal_hazard(cell) {
                tracing::info!(column = cell.column(), row = cell.row(), "hazard triggered");
                out_events.push(Event::HazardTriggered { cell });
            }
        }
        Command::MarkBuildable { cell } => {
            if world.grid.mark_buildable(cell) {
                out_events.push(Event::CellMarkedBuildable { cell });
            }
        }
        Command::SetPlayMode { mode } => {
            if world.play_mode != mode {
                world.play_mode = mode;
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::CreateSpawnOrigin => {
            match world.origins.try_register(&mut world.grid, &mut world.rng) {
                Some(origin) => {
                    tracing::info!(
                        origin = origin.id.get(),
                        column = origin.cell.column(),
                        row = origin.cell.row(),
                        "spawn origin registered"
                    );
                    out_events.push(Event::SpawnOriginRegistered {
                        origin: origin.id,
                        cell: origin.cell,
                    });
                }
                None => tracing::debug!("no cell qualifies as a spawn origin yet"),
            }
        }
        Command::ClaimBuildSite { cell } => match world.claim_build_site(cell) {
            Ok(()) => out_events.push(Event::BuildSiteClaimed { cell }),
            Err(reason) => {
                tracing::debug!(
                    ?reason,
                    column = cell.column(),
                    row = cell.row(),
                    "build site rejected"
                );
                out_events.push(Event::BuildSiteRejected { cell, reason });
            }
        },
        Command::SpawnEnemy {
            kind,
            hp_multiplier,
            origin,
            path,
        } => {
            let health = BASE_ENEMY_HEALTH * hp_multiplier;
            let enemy = world.enemies.insert(kind, health, origin, path.clone());
            out_events.push(Event::EnemySpawned {
                enemy,
                kind,
                health,
                origin,
                path,
            });
        }
        Command::RelocateEnemy { enemy, cell } => {
            if world.enemies.relocate(enemy, cell) {
                out_events.push(Event::EnemyRelocated { enemy, cell });
            }
        }
        Command::EnemyReachedBase { enemy } => {
            if world.enemies.remove(enemy).is_none() {
                return;
            }
            out_events.push(Event::EnemyReachedBase { enemy });

            if let Some(remaining) = world.base.damage(1) {
                out_events.push(Event::BaseDamaged { remaining });
                if remaining == 0 {
                    tracing::info!("base destroyed");
                    out_events.push(Event::BaseDestroyed);
                }
            }
        }
        Command::RemoveEnemy { enemy } => {
            if world.enemies.remove(enemy).is_some() {
                out_events.push(Event::EnemyRemoved { enemy });
            }
        }
    }
}

/// Read-only views into the world state.
pub mod query {
    use mine_defence_core::{
        Cell, CellCoord, CellState, EnemyId, EnemySnapshot, Path, PlayMode, SpawnOrigin,
    };
    use rand::Rng;

    use super::{navigation, BaseHealth, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Reports the grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.width(), world.grid.height())
    }

    /// Snapshot of the cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(world: &World, coord: CellCoord) -> Option<Cell> {
        world.grid.cell(coord)
    }

    /// Snapshots of every cell, column by column.
    #[must_use]
    pub fn cells(world: &World) -> Vec<Cell> {
        world.grid.cells().collect()
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn is_inside_bounds(world: &World, coord: CellCoord) -> bool {
        world.grid.is_inside_bounds(coord)
    }

    /// Reports whether enemies may stand on the cell.
    #[must_use]
    pub fn is_walkable(world: &World, coord: CellCoord) -> bool {
        world.grid.is_walkable(coord)
    }

    /// Walkable axis-aligned neighbours in `+x, -x, +y, -y` order.
    #[must_use]
    pub fn walkable_neighbors(world: &World, coord: CellCoord) -> Vec<CellCoord> {
        world.grid.walkable_neighbors(coord).collect()
    }

    /// Reports whether the cell lies in the square opened at start.
    #[must_use]
    pub fn in_safe_zone(world: &World, coord: CellCoord) -> bool {
        world.grid.in_safe_zone(coord)
    }

    /// Fraction of the disclosable cells the player has opened, in `[0, 1]`.
    #[must_use]
    pub fn progress(world: &World) -> f32 {
        world.grid.progress()
    }

    /// Hazards placed during initialisation.
    #[must_use]
    pub fn hazard_count(world: &World) -> u32 {
        world.grid.hazard_count()
    }

    /// Non-hazard cells opened so far, safe zone included.
    #[must_use]
    pub fn opened_count(world: &World) -> u32 {
        world.grid.opened_count()
    }

    /// Cells opened by the safe zone before play started.
    #[must_use]
    pub fn baseline_opened_count(world: &World) -> u32 {
        world.grid.baseline_opened()
    }

    /// A cell accepts construction when it is a flagged hazard or was marked
    /// buildable.
    #[must_use]
    pub fn is_buildable(world: &World, coord: CellCoord) -> bool {
        world.grid.cell(coord).is_some_and(|cell| {
            (cell.state == CellState::Flagged && cell.hazard) || cell.state == CellState::Buildable
        })
    }

    /// Reports whether a construction claim already covers the cell.
    #[must_use]
    pub fn is_build_site_claimed(world: &World, coord: CellCoord) -> bool {
        world.build_sites.contains(&coord)
    }

    /// Active play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Reference point every wave is routed toward.
    #[must_use]
    pub fn base_center(world: &World) -> CellCoord {
        world.origins.base_center()
    }

    /// Reports whether the cell lies in the area protected from spawn origins.
    #[must_use]
    pub fn in_base_area(world: &World, coord: CellCoord) -> bool {
        world.origins.in_base_area(coord)
    }

    /// Current hit points of the base.
    #[must_use]
    pub fn base_health(world: &World) -> BaseHealth {
        world.base
    }

    /// Registered spawn origins in creation order.
    #[must_use]
    pub fn spawn_origins(world: &World) -> &[SpawnOrigin] {
        world.origins.origins()
    }

    /// Uniformly picks a registered spawn origin using the caller's generator.
    #[must_use]
    pub fn random_origin<R: Rng>(world: &World, rng: &mut R) -> Option<SpawnOrigin> {
        world.origins.random_origin(rng)
    }

    /// Shortest walkable route between two cells, both inclusive.
    #[must_use]
    pub fn find_path(world: &World, start: CellCoord, goal: CellCoord) -> Option<Path> {
        navigation::find_path(&world.grid, start, goal)
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Snapshot of a live enemy.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<EnemySnapshot> {
        world.enemies.snapshot(enemy)
    }

    /// Snapshots of every live enemy ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world.enemies.snapshots()
    }

    /// Closest live enemy within `range` cells of `from`.
    #[must_use]
    pub fn nearest_enemy(world: &World, from: CellCoord, range: u32) -> Option<EnemyId> {
        world.enemies.nearest(from, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mine_defence_core::{EnemyId, EnemyKind, Path};

    fn small_world() -> World {
        let config = GridConfig {
            width: 6,
            height: 6,
            hazard_ratio: 0.0,
            safe_zone_size: 0,
            ..GridConfig::default()
        };
        World::new(&config, 5).expect("valid config")
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GridConfig {
            width: 0,
            ..GridConfig::default()
        };
        assert!(matches!(
            World::new(&config, 0),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn observer_sees_each_cell_as_it_opens() {
        let mut world = small_world();
        let mut events = Vec::new();
        let mut opened_at_notification = Vec::new();

        disclose(&mut world, CellCoord::new(0, 0), &mut events, |world, event, _| {
            if let Event::CellDisclosed { progress, .. } = event {
                assert_eq!(*progress, query::progress(world));
            }
            opened_at_notification.push(query::opened_count(world));
        });

        assert_eq!(events.len(), 36);
        assert_eq!(opened_at_notification, (1..=36).collect::<Vec<u32>>());
    }

    #[test]
    fn play_mode_change_is_reported_once() {
        let mut world = small_world();
        let mut events = Vec::new();

        apply(&mut world, Command::SetPlayMode { mode: PlayMode::Build }, &mut events);
        apply(&mut world, Command::SetPlayMode { mode: PlayMode::Build }, &mut events);

        assert_eq!(events, vec![Event::PlayModeChanged { mode: PlayMode::Build }]);
        assert_eq!(query::play_mode(&world), PlayMode::Build);
    }

    #[test]
    fn build_claims_report_typed_rejections() {
        let mut world = small_world();
        let cell = CellCoord::new(1, 1);
        let mut events = Vec::new();

        apply(&mut world, Command::ClaimBuildSite { cell }, &mut events);
        apply(&mut world, Command::SetPlayMode { mode: PlayMode::Build }, &mut events);
        apply(&mut world, Command::ClaimBuildSite { cell }, &mut events);
        apply(
            &mut world,
            Command::ClaimBuildSite {
                cell: CellCoord::new(40, 0),
            },
            &mut events,
        );
        apply(&mut world, Command::MarkBuildable { cell }, &mut events);
        apply(&mut world, Command::ClaimBuildSite { cell }, &mut events);
        apply(&mut world, Command::ClaimBuildSite { cell }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::BuildSiteRejected {
                    cell,
                    reason: BuildError::InvalidMode
                },
                Event::PlayModeChanged {
                    mode: PlayMode::Build
                },
                Event::BuildSiteRejected {
                    cell,
                    reason: BuildError::NotBuildable
                },
                Event::BuildSiteRejected {
                    cell: CellCoord::new(40, 0),
                    reason: BuildError::OutOfBounds
                },
                Event::CellMarkedBuildable { cell },
                Event::BuildSiteClaimed { cell },
                Event::BuildSiteRejected {
                    cell,
                    reason: BuildError::Occupied
                },
            ]
        );
        assert!(query::is_build_site_claimed(&world, cell));
    }

    #[test]
    fn enemies_damage_base_until_destroyed() {
        let config = GridConfig {
            width: 4,
            height: 4,
            hazard_ratio: 0.0,
            base_health: 2,
            ..GridConfig::default()
        };
        let mut world = World::new(&config, 1).expect("valid config");
        let origin = CellCoord::new(0, 0);
        let mut events = Vec::new();

        for _ in 0..3 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    kind: EnemyKind::Normal,
                    hp_multiplier: 1.0,
                    origin,
                    path: Path::empty(),
                },
                &mut events,
            );
        }
        assert_eq!(query::enemy_count(&world), 3);
        events.clear();

        for id in 0..3 {
            apply(
                &mut world,
                Command::EnemyReachedBase {
                    enemy: EnemyId::new(id),
                },
                &mut events,
            );
        }

        assert_eq!(
            events,
            vec![
                Event::EnemyReachedBase {
                    enemy: EnemyId::new(0)
                },
                Event::BaseDamaged { remaining: 1 },
                Event::EnemyReachedBase {
                    enemy: EnemyId::new(1)
                },
                Event::BaseDamaged { remaining: 0 },
                Event::BaseDestroyed,
                Event::EnemyReachedBase {
                    enemy: EnemyId::new(2)
                },
            ]
        );
        assert!(query::base_health(&world).is_destroyed());
        assert_eq!(query::enemy_count(&world), 0);
    }

    #[test]
    fn spawned_enemy_health_is_scaled() {
        let mut world = small_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Tank,
                hp_multiplier: 2.0,
                origin: CellCoord::new(0, 0),
                path: Path::empty(),
            },
            &mut events,
        );

        let enemy = query::enemy(&world, EnemyId::new(0)).expect("enemy");
        assert_eq!(enemy.health, BASE_ENEMY_HEALTH * 2.0);
        assert_eq!(enemy.cell, CellCoord::new(0, 0));
    }
}
