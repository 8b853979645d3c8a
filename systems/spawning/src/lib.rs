#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave spawner responsible for emitting enemy spawn commands.

use mine_defence_core::{CellCoord, Command, EnemyKind, Path, SpawnOrigin, WaveConfig};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Spawn index below which every enemy is a [`EnemyKind::Normal`].
const FAST_UNLOCK_INDEX: u32 = 4;
/// Spawn index below which no [`EnemyKind::Tank`] appears.
const TANK_UNLOCK_INDEX: u32 = 7;

/// Configuration parameters required to construct the wave spawner.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    base_count: u32,
    bonus_every: u32,
    growth_factor: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the wave parameters and a seed.
    #[must_use]
    pub fn new(waves: &WaveConfig, rng_seed: u64) -> Self {
        Self {
            base_count: waves.base_count,
            bonus_every: waves.bonus_every,
            growth_factor: waves.growth_factor,
            rng_seed,
        }
    }
}

/// Pure system that turns wave requests into enemy spawn commands.
#[derive(Debug)]
pub struct WaveSpawner {
    config: Config,
    spawned: u32,
    waves: u32,
    rng: ChaCha8Rng,
}

impl WaveSpawner {
    /// Creates a new spawner using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            spawned: 0,
            waves: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Number of enemies attempted across every wave so far.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Number of waves launched so far.
    #[must_use]
    pub fn waves(&self) -> u32 {
        self.waves
    }

    /// Enemies the next wave will contain.
    #[must_use]
    pub fn next_wave_size(&self) -> u32 {
        let bonus = self.spawned.checked_div(self.config.bonus_every).unwrap_or(0);
        self.config.base_count.saturating_add(bonus)
    }

    /// Health multiplier the next wave will share.
    #[must_use]
    pub fn next_hp_multiplier(&self) -> f32 {
        let exponent = i32::try_from(self.spawned).unwrap_or(i32::MAX);
        self.config.growth_factor.powi(exponent)
    }

    /// Emits one wave of spawn commands toward `base`.
    ///
    /// Returns `false` without consuming anything when `origins` is empty.
    /// Each enemy leaves from a uniformly chosen origin and receives the route
    /// produced by `find_path`; an origin without a route yields an empty path
    /// and the enemy stays where it spawned.
    pub fn try_spawn_wave<F>(
        &mut self,
        origins: &[SpawnOrigin],
        base: CellCoord,
        mut find_path: F,
        out: &mut Vec<Command>,
    ) -> bool
    where
        F: FnMut(CellCoord, CellCoord) -> Option<Path>,
    {
        if origins.is_empty() {
            return false;
        }

        let size = self.next_wave_size();
        let hp_multiplier = self.next_hp_multiplier();
        tracing::info!(
            wave = self.waves,
            size,
            hp_multiplier,
            "launching wave"
        );

        for _ in 0..size {
            let Some(origin) = origins.choose(&mut self.rng).copied() else {
                break;
            };

            let roll = self.rng.gen::<f32>();
            let kind = kind_for(self.spawned, roll);
            let path = find_path(origin.cell, base).unwrap_or_else(|| {
                tracing::warn!(
                    column = origin.cell.column(),
                    row = origin.cell.row(),
                    "no route to the base, enemy stays at its origin"
                );
                Path::empty()
            });

            out.push(Command::SpawnEnemy {
                kind,
                hp_multiplier,
                origin: origin.cell,
                path,
            });
            self.spawned = self.spawned.saturating_add(1);
        }

        self.waves = self.waves.saturating_add(1);
        true
    }
}

/// Picks the enemy archetype for the given global spawn index and a uniform
/// roll in `[0, 1)`.
#[must_use]
pub fn kind_for(spawn_index: u32, roll: f32) -> EnemyKind {
    if spawn_index < FAST_UNLOCK_INDEX {
        EnemyKind::Normal
    } else if spawn_index < TANK_UNLOCK_INDEX {
        if roll < 0.7 {
            EnemyKind::Normal
        } else {
            EnemyKind::Fast
        }
    } else if roll < 0.4 {
        EnemyKind::Normal
    } else if roll < 0.8 {
        EnemyKind::Fast
    } else {
        EnemyKind::Tank
    }
}
