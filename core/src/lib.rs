#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon crawler engine.
//!
//! This crate defines the data and message surface that connects adapters,
//! the authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable views such as the
//! [`GridMap`] and [`EntityView`], and respond exclusively with new command
//! batches.

mod config;
mod grid;
pub mod timer;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{ConfigError, EngineConfig, PursuitConfig};
pub use grid::{GridCell, GridError, GridMap, TileKind};
pub use timer::Timer;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the dungeon.";

/// Describes the active gameplay mode for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Free roaming; enemies pursue the player and the 3D view is rendered.
    Exploration,
    /// An enemy engaged the player and the combat collaborator owns the frame.
    Combat,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Wall-clock time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Replaces the player pose reported by the input collaborator.
    SetPlayerPose {
        /// Pose the player holds for the current frame.
        pose: PlayerPose,
    },
    /// Overwrites a single grid cell, e.g. to open or close a gate.
    SetCell {
        /// Cell being rewritten.
        cell: CellCoord,
        /// New contents of the cell.
        value: GridCell,
    },
    /// Moves an entity to a new continuous world position.
    MoveEntity {
        /// Entity being moved.
        entity: EntityId,
        /// Destination expressed in world units.
        to: Vec2,
    },
    /// Requests that the provided hostile entity enters combat with the player.
    EngageCombat {
        /// Enemy that reached melee range.
        enemy: EntityId,
    },
    /// Reports the outcome of a combat encounter resolved by the combat collaborator.
    ResolveCombat {
        /// Enemy that took part in the encounter.
        enemy: EntityId,
        /// Whether the enemy was defeated and must leave the world.
        enemy_defeated: bool,
    },
    /// Requests that the player picks up a collectible entity.
    CollectEntity {
        /// Collectible being picked up.
        entity: EntityId,
    },
    /// Interacts with whatever entity stands one tile ahead of the player.
    ///
    /// Collectibles are picked up and characters start their dialogue.
    Interact,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player pose changed.
    PlayerMoved {
        /// Pose the player holds after the update.
        pose: PlayerPose,
    },
    /// Confirms that a grid cell was overwritten and derived caches rebuilt.
    CellChanged {
        /// Cell that changed.
        cell: CellCoord,
        /// Contents of the cell after the change.
        value: GridCell,
    },
    /// Reports that a cell overwrite targeted a cell outside the grid.
    CellChangeRejected {
        /// Cell named by the rejected command.
        cell: CellCoord,
    },
    /// Confirms that an entity moved.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Position held before the move.
        from: Vec2,
        /// Position held after the move.
        to: Vec2,
    },
    /// Confirms that an entity left the world.
    EntityRemoved {
        /// Handle of the removed entity; it no longer resolves.
        entity: EntityId,
    },
    /// Announces that a hostile entity engaged the player.
    CombatEngaged {
        /// Enemy that engaged.
        enemy: EntityId,
    },
    /// Confirms that the player collected an item.
    ItemCollected {
        /// Collectible that was picked up.
        entity: EntityId,
        /// Name of the collected item.
        item: &'static str,
    },
    /// Announces that a dialogue should be shown to the player.
    DialogueStarted {
        /// Entity the dialogue belongs to; collected items no longer resolve.
        entity: EntityId,
        /// Key of the dialogue to show.
        dialogue: &'static str,
    },
    /// Announces that the session entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
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

    /// Cell containing the provided world position, if it lies at non-negative coordinates.
    #[must_use]
    pub fn from_world(position: Vec2, tile_size: f32) -> Option<Self> {
        if tile_size <= 0.0 {
            return None;
        }

        let column = (position.x / tile_size).floor();
        let row = (position.y / tile_size).floor();
        if column < 0.0 || row < 0.0 || !column.is_finite() || !row.is_finite() {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }

    /// World position of the cell center.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            self.column as f32 * tile_size + tile_size / 2.0,
            self.row as f32 * tile_size + tile_size / 2.0,
        )
    }

    /// Straight-line distance between two cells measured in cells.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let dx = self.column.abs_diff(other.column) as f32;
        let dy = self.row.abs_diff(other.row) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Number of king moves separating two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Position and heading of the player as reported by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPose {
    /// Continuous world position of the viewer.
    pub position: Vec2,
    /// Heading in degrees; zero looks along +X and positive angles turn toward +Y.
    pub angle_degrees: f32,
}

impl PlayerPose {
    /// Creates a pose from world coordinates and a heading in degrees.
    #[must_use]
    pub const fn new(x: f32, y: f32, angle_degrees: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            angle_degrees,
        }
    }

    /// Creates a pose standing at the center of the provided cell.
    #[must_use]
    pub fn at_cell(cell: CellCoord, tile_size: f32, angle_degrees: f32) -> Self {
        Self {
            position: cell.center(tile_size),
            angle_degrees,
        }
    }

    /// Heading converted to radians.
    #[must_use]
    pub fn heading_radians(&self) -> f32 {
        self.angle_degrees.to_radians()
    }

    /// Unit vector pointing along the heading.
    ///
    /// The sprite camera and interaction reach both derive from it.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        let heading = self.heading_radians();
        Vec2::new(heading.cos(), heading.sin())
    }
}

/// Generation-checked handle into the session's entity arena.
///
/// A handle keeps pointing at the same logical entity for its whole lifetime;
/// once the entity is removed the slot may be reused, but the bumped
/// generation makes every outstanding handle to the old occupant stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates a new handle from an arena slot and its generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot referenced by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Combat parameters carried by hostile entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostileStats {
    /// Health the enemy spawns with.
    pub max_health: u32,
    /// Damage dealt per successful attack, consumed by the combat collaborator.
    pub base_damage: u32,
    /// Movement speed in world units per second.
    pub speed: f32,
}

/// Behavior variant of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityKind {
    /// Scenery that is only drawn.
    Static,
    /// Item the player can pick up.
    Collectible {
        /// Dialogue started when the item is collected.
        dialogue: &'static str,
    },
    /// Enemy that pursues the player and starts combat.
    Hostile(HostileStats),
    /// Character the player can talk to.
    Dialogue {
        /// Dialogue shown when the player interacts.
        dialogue: &'static str,
    },
}

impl EntityKind {
    /// Hostile statistics, if the entity is an enemy.
    #[must_use]
    pub const fn hostile(&self) -> Option<HostileStats> {
        match self {
            Self::Hostile(stats) => Some(*stats),
            _ => None,
        }
    }
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Handle of the entity.
    pub id: EntityId,
    /// Asset name used by the renderer to pick a texture.
    pub name: &'static str,
    /// Behavior variant of the entity.
    pub kind: EntityKind,
    /// Continuous world position.
    pub position: Vec2,
    /// Vertical offset applied when the sprite is projected.
    pub elevation: f32,
    /// Render scale applied to the sprite texture.
    pub scale: f32,
    /// Distance to the player refreshed on every tick and pose update.
    pub distance_to_player: f32,
}

/// Read-only snapshot describing all live entities.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the hostile entities together with their statistics.
    pub fn hostiles(&self) -> impl Iterator<Item = (&EntitySnapshot, HostileStats)> {
        self.snapshots
            .iter()
            .filter_map(|snapshot| snapshot.kind.hostile().map(|stats| (snapshot, stats)))
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Solid cell derived from the grid for renderers and the minimap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wall {
    cell: CellCoord,
    texture_id: u16,
}

impl Wall {
    /// Creates a wall occupying the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord, texture_id: u16) -> Self {
        Self { cell, texture_id }
    }

    /// Cell occupied by the wall.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Texture selected by the cell payload.
    #[must_use]
    pub const fn texture_id(&self) -> u16 {
        self.texture_id
    }

    /// Upper-left corner of the wall in world units.
    #[must_use]
    pub fn world_position(&self, tile_size: f32) -> Vec2 {
        Vec2::new(
            self.cell.column() as f32 * tile_size,
            self.cell.row() as f32 * tile_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_from_world_floors_positions() {
        assert_eq!(
            CellCoord::from_world(Vec2::new(70.0, 31.9), 32.0),
            Some(CellCoord::new(2, 0))
        );
        assert_eq!(CellCoord::from_world(Vec2::new(-0.5, 10.0), 32.0), None);
        assert_eq!(CellCoord::from_world(Vec2::new(5.0, 5.0), 0.0), None);
    }

    #[test]
    fn cell_center_lies_in_the_middle_of_the_tile() {
        let center = CellCoord::new(3, 1).center(32.0);
        assert_eq!(center, Vec2::new(112.0, 48.0));
        assert_eq!(
            CellCoord::from_world(center, 32.0),
            Some(CellCoord::new(3, 1))
        );
    }

    #[test]
    fn distances_match_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 5);
        assert!((origin.euclidean_distance(destination) - 5.0).abs() < f32::EPSILON);
        assert_eq!(origin.chebyshev_distance(destination), 4);
        assert_eq!(destination.chebyshev_distance(origin), 4);
    }

    #[test]
    fn forward_follows_heading() {
        let pose = PlayerPose::new(0.0, 0.0, 90.0);
        let forward = pose.forward();
        assert!(forward.x.abs() < 1e-6);
        assert!((forward.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn entity_view_orders_snapshots_and_filters_hostiles() {
        let snapshot = |index: u32, kind: EntityKind| EntitySnapshot {
            id: EntityId::new(index, 0),
            name: "test",
            kind,
            position: Vec2::ZERO,
            elevation: 0.0,
            scale: 1.0,
            distance_to_player: 0.0,
        };
        let stats = HostileStats {
            max_health: 10,
            base_damage: 2,
            speed: 30.0,
        };
        let view = EntityView::from_snapshots(vec![
            snapshot(2, EntityKind::Hostile(stats)),
            snapshot(0, EntityKind::Static),
        ]);

        let ids: Vec<u32> = view.iter().map(|entity| entity.id.index()).collect();
        assert_eq!(ids, vec![0, 2]);
        let hostiles: Vec<_> = view.hostiles().collect();
        assert_eq!(hostiles.len(), 1);
        assert_eq!(hostiles[0].1, stats);
    }

    #[test]
    fn wall_world_position_scales_cell() {
        let wall = Wall::new(CellCoord::new(2, 3), 1);
        assert_eq!(wall.world_position(32.0), Vec2::new(64.0, 96.0));
    }
}
