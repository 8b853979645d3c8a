#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation root that owns the Mine Defence world and its systems.
//!
//! Every public entry point applies exactly one player or entity-layer command
//! to the world. Each counted disclosure reaches the threshold scheduler
//! before the flood-fill opens its next cell, so spawn origins and waves are
//! resolved against the grid as it stood at that notification. The returned
//! event list interleaves each disclosure with the spawns it caused.

use mine_defence_core::{
    CellCoord, CellState, Command, ConfigError, EnemyId, Event, PlayMode, SimulationConfig,
};
use mine_defence_system_scheduler::{SpawnRequests, ThresholdScheduler};
use mine_defence_system_spawning::{Config as SpawnerConfig, WaveSpawner};
use mine_defence_world::{self as world, query, World};

/// Mixed into the run seed so wave draws never mirror grid draws.
const WAVE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Owns one world together with the scheduler and spawner that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: ThresholdScheduler,
    spawner: WaveSpawner,
}

impl Simulation {
    /// Builds a simulation after validating the configuration.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let world = World::new(&config.grid, config.seed)?;
        let scheduler = ThresholdScheduler::new(&config.thresholds);
        let spawner = WaveSpawner::new(SpawnerConfig::new(
            &config.waves,
            config.seed ^ WAVE_SEED_SALT,
        ));

        Ok(Self {
            world,
            scheduler,
            spawner,
        })
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the threshold scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &ThresholdScheduler {
        &self.scheduler
    }

    /// Read-only access to the wave spawner.
    #[must_use]
    pub fn spawner(&self) -> &WaveSpawner {
        &self.spawner
    }

    /// Opens a cell, flood-filling zero regions.
    pub fn disclose(&mut self, cell: CellCoord) -> Vec<Event> {
        self.execute(Command::Disclose { cell })
    }

    /// Cycles the flag on a closed cell.
    pub fn toggle_flag(&mut self, cell: CellCoord) -> Vec<Event> {
        self.execute(Command::ToggleFlag { cell })
    }

    /// Marks a cell as available for construction.
    pub fn mark_buildable(&mut self, cell: CellCoord) -> Vec<Event> {
        self.execute(Command::MarkBuildable { cell })
    }

    /// Switches between exploring and building.
    pub fn set_play_mode(&mut self, mode: PlayMode) -> Vec<Event> {
        self.execute(Command::SetPlayMode { mode })
    }

    /// Records the cell an enemy moved to.
    pub fn relocate_enemy(&mut self, enemy: EnemyId, cell: CellCoord) -> Vec<Event> {
        self.execute(Command::RelocateEnemy { enemy, cell })
    }

    /// Reports an enemy that walked into the base.
    pub fn enemy_reached_base(&mut self, enemy: EnemyId) -> Vec<Event> {
        self.execute(Command::EnemyReachedBase { enemy })
    }

    /// Removes an enemy that left play without reaching the base.
    pub fn remove_enemy(&mut self, enemy: EnemyId) -> Vec<Event> {
        self.execute(Command::RemoveEnemy { enemy })
    }

    /// Routes the primary pointer action according to the play mode.
    ///
    /// While exploring, flagged cells ignore the action, hazards are forced
    /// open and every other cell is disclosed. While building, the action
    /// claims a construction site.
    pub fn primary_action(&mut self, cell: CellCoord) -> Vec<Event> {
        match query::play_mode(&self.world) {
            PlayMode::Build => self.execute(Command::ClaimBuildSite { cell }),
            PlayMode::Explore => match query::cell(&self.world, cell) {
                None => Vec::new(),
                Some(target) if target.state == CellState::Flagged => Vec::new(),
                Some(target) if target.hazard => self.execute(Command::RevealHazard { cell }),
                Some(_) => self.execute(Command::Disclose { cell }),
            },
        }
    }

    /// Routes the secondary pointer action, which only flags while exploring.
    pub fn secondary_action(&mut self, cell: CellCoord) -> Vec<Event> {
        match query::play_mode(&self.world) {
            PlayMode::Explore => self.execute(Command::ToggleFlag { cell }),
            PlayMode::Build => {
                tracing::debug!("flags cannot be placed while building");
                Vec::new()
            }
        }
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut out = Vec::new();
        let Self {
            world: state,
            scheduler,
            spawner,
        } = self;

        match command {
            Command::Disclose { cell } => {
                world::disclose(state, cell, &mut out, |current, event, out| {
                    let waiting = scheduler.pending().origins;
                    let mut requests = Dispatch {
                        world: current,
                        spawner: &mut *spawner,
                        out: &mut *out,
                    };
                    scheduler.handle(std::slice::from_ref(event), &mut requests);

                    if waiting == 0 && scheduler.pending().origins > 0 {
                        out.push(Event::SpawnOriginDeferred);
                    }
                });
            }
            other => world::apply(state, other, &mut out),
        }
        out
    }
}

/// Resolves scheduler requests against the world and the spawner.
struct Dispatch<'a> {
    world: &'a mut World,
    spawner: &'a mut WaveSpawner,
    out: &'a mut Vec<Event>,
}

impl SpawnRequests for Dispatch<'_> {
    fn try_spawn_origin(&mut self) -> bool {
        let before = self.out.len();
        world::apply(self.world, Command::CreateSpawnOrigin, self.out);
        self.out[before..]
            .iter()
            .any(|event| matches!(event, Event::SpawnOriginRegistered { .. }))
    }

    fn try_spawn_wave(&mut self) -> bool {
        let view: &World = &*self.world;
        let mut commands = Vec::new();
        let launched = self.spawner.try_spawn_wave(
            query::spawn_origins(view),
            query::base_center(view),
            |start, goal| query::find_path(view, start, goal),
            &mut commands,
        );

        for command in commands {
            world::apply(self.world, command, self.out);
        }
        launched
    }
}
