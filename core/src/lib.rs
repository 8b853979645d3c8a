#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mine Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values in emission order
//! for systems to react to within the same call. Systems consume event
//! streams, query immutable snapshots, and respond with new commands.

mod config;

pub use config::{
    ConfigError, GridConfig, SimulationConfig, ThresholdConfig, WaveConfig, MAX_GRID_CELLS,
};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Mine Defence.";

/// Hit points carried by an enemy before difficulty scaling is applied.
pub const BASE_ENEMY_HEALTH: f32 = 3.0;

/// Describes the active gameplay mode for the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Exploration mode where primary actions disclose cells.
    Explore,
    /// Build mode where primary actions claim construction sites.
    Build,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Opens a cell on behalf of the player, flood-filling zero regions.
    Disclose {
        /// Cell the player asked to open.
        cell: CellCoord,
    },
    /// Cycles the flag marker on a closed cell.
    ToggleFlag {
        /// Cell whose flag should toggle.
        cell: CellCoord,
    },
    /// Forces a hazardous cell open after the player stepped on it.
    RevealHazard {
        /// Hazardous cell that was triggered.
        cell: CellCoord,
    },
    /// Overrides a cell's state to buildable without further validation.
    MarkBuildable {
        /// Cell that becomes available for construction.
        cell: CellCoord,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Asks the world to register one new spawn origin if a candidate exists.
    CreateSpawnOrigin,
    /// Requests a construction claim on the provided cell.
    ClaimBuildSite {
        /// Cell targeted for construction.
        cell: CellCoord,
    },
    /// Places an enemy produced by a wave into the world.
    SpawnEnemy {
        /// Archetype assigned to the enemy.
        kind: EnemyKind,
        /// Difficulty multiplier applied to the enemy's base health.
        hp_multiplier: f32,
        /// Spawn origin cell the enemy emerges from.
        origin: CellCoord,
        /// Route toward the base, empty when no route exists.
        path: Path,
    },
    /// Records the cell an enemy occupies after the entity layer moved it.
    RelocateEnemy {
        /// Identifier of the moving enemy.
        enemy: EnemyId,
        /// Cell the enemy now occupies.
        cell: CellCoord,
    },
    /// Reports that an enemy reached the final cell of its path.
    EnemyReachedBase {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
    },
    /// Removes an enemy from the world, for example after it was defeated.
    RemoveEnemy {
        /// Identifier of the enemy to drop.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A cell opened through player disclosure, including flood-filled cells.
    CellDisclosed {
        /// Cell that opened.
        cell: CellCoord,
        /// Progress ratio observed right after the cell opened.
        progress: f32,
    },
    /// The flag marker on a cell changed.
    FlagToggled {
        /// Cell whose marker changed.
        cell: CellCoord,
        /// Whether the cell carries a flag after the toggle.
        flagged: bool,
    },
    /// The player stepped on a hazard and the cell was forced open.
    HazardTriggered {
        /// Hazardous cell that opened.
        cell: CellCoord,
    },
    /// A cell was externally marked as buildable.
    CellMarkedBuildable {
        /// Cell that became buildable.
        cell: CellCoord,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// A new spawn origin was registered.
    SpawnOriginRegistered {
        /// Identifier assigned to the origin.
        origin: SpawnOriginId,
        /// Cell that hosts the origin.
        cell: CellCoord,
    },
    /// A spawn origin was requested but no cell qualifies yet.
    SpawnOriginDeferred,
    /// A construction claim succeeded.
    BuildSiteClaimed {
        /// Cell reserved for construction.
        cell: CellCoord,
    },
    /// A construction claim was rejected.
    BuildSiteRejected {
        /// Cell provided in the claim.
        cell: CellCoord,
        /// Specific reason the claim failed.
        reason: BuildError,
    },
    /// An enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Scaled hit points of the enemy.
        health: f32,
        /// Spawn origin cell the enemy emerged from.
        origin: CellCoord,
        /// Route toward the base, empty when the enemy stays put.
        path: Path,
    },
    /// An enemy moved to a new cell.
    EnemyRelocated {
        /// Identifier of the moving enemy.
        enemy: EnemyId,
        /// Cell the enemy now occupies.
        cell: CellCoord,
    },
    /// An enemy arrived at the base and left the world.
    EnemyReachedBase {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
    },
    /// An enemy was removed without reaching the base.
    EnemyRemoved {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// The base lost hit points.
    BaseDamaged {
        /// Hit points left after the damage.
        remaining: u32,
    },
    /// The base ran out of hit points.
    BaseDestroyed,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Shifts the coordinate by a signed offset, failing below zero or on overflow.
    #[must_use]
    pub fn offset(self, columns: i32, rows: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(CellCoord::new(column, row))
    }
}

/// Disclosure state of a cell as seen by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Not yet opened.
    Hidden,
    /// Opened and visible.
    Open,
    /// Marked with a flag by the player.
    Flagged,
    /// Externally marked as a construction site.
    Buildable,
}

/// Immutable representation of a single cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Location of the cell.
    pub coord: CellCoord,
    /// Disclosure state of the cell.
    pub state: CellState,
    /// Whether the cell hides a hazard.
    pub hazard: bool,
    /// Hazards among the up to eight surrounding cells.
    pub adjacent_hazards: u8,
    /// Whether the cell hosts a spawn origin.
    pub spawn_origin: bool,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a spawn origin, in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnOriginId(u32);

impl SpawnOriginId {
    /// Creates a new spawn origin identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Registered enemy entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnOrigin {
    /// Identifier allocated when the origin was registered.
    pub id: SpawnOriginId,
    /// Cell hosting the origin.
    pub cell: CellCoord,
}

/// Archetypes of enemies produced by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline enemy.
    Normal,
    /// Quick enemy introduced in the middle band.
    Fast,
    /// Durable enemy introduced late.
    Tank,
}

/// Ordered cell sequence from a start cell to a goal cell, both inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Wraps the provided cells, which must already be ordered start to goal.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Creates a path without cells, used for enemies that cannot move.
    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Cells composing the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Reports whether the path holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of unit steps needed to walk the path.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// First cell of the path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Last cell of the path.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }
}

/// Reasons a build-site claim may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The simulation is not in build mode.
    InvalidMode,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The cell is neither a flagged hazard nor marked buildable.
    NotBuildable,
    /// The cell was already claimed.
    Occupied,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Scaled hit points of the enemy.
    pub health: f32,
    /// Spawn origin cell the enemy emerged from.
    pub origin: CellCoord,
    /// Cell the enemy currently occupies.
    pub cell: CellCoord,
    /// Route toward the base.
    pub path: Path,
}
