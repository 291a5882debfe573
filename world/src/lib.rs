#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the dungeon crawler.
//!
//! The [`Session`] owns the tile grid and the caches derived from it (the wall
//! list and the path node graph), the entity arena, the player pose and the
//! active play mode. It is mutated exclusively through [`apply`] and observed
//! through the [`query`] module.

mod arena;
mod spawn;

use crawler_core::{
    CellCoord, Command, EngineConfig, EntityId, EntityKind, Event, GridMap, PlayMode, PlayerPose,
    Wall, WELCOME_BANNER,
};
use crawler_system_pathfinding::{rebuild_node_graph, NodeGrid};

use arena::{Entity, EntityArena};

/// Represents the authoritative state of one dungeon run.
#[derive(Debug)]
pub struct Session {
    banner: &'static str,
    config: EngineConfig,
    grid: GridMap,
    walls: Vec<Wall>,
    nodes: NodeGrid,
    entities: EntityArena,
    player: PlayerPose,
    play_mode: PlayMode,
}

impl Session {
    /// Creates a session on the provided grid and spawns the entities encoded in it.
    #[must_use]
    pub fn new(grid: GridMap, player: PlayerPose, config: EngineConfig) -> Self {
        let walls = rebuild_walls(&grid);
        let nodes = rebuild_node_graph(&grid);
        let mut session = Self {
            banner: WELCOME_BANNER,
            config,
            grid,
            walls,
            nodes,
            entities: EntityArena::default(),
            player,
            play_mode: PlayMode::Exploration,
        };
        session.spawn_entities();
        session.refresh_distances();

        tracing::info!(
            columns = session.grid.columns(),
            rows = session.grid.rows(),
            walls = session.walls.len(),
            entities = session.entities.len(),
            "session created"
        );
        session
    }

    fn spawn_entities(&mut self) {
        let tile_size = self.config.tile_size;
        for (cell, contents) in self.grid.iter() {
            if contents.is_solid() || contents.payload() == 0 {
                continue;
            }

            let Some(template) = spawn::template_for(contents.payload()) else {
                tracing::warn!(?cell, code = contents.payload(), "skipping unknown spawn code");
                continue;
            };

            let id = self.entities.insert(Entity {
                name: template.name,
                kind: template.kind,
                position: cell.center(tile_size),
                elevation: spawn::SPAWN_ELEVATION,
                scale: template.scale / spawn::SCALE_DIVISOR,
                distance_to_player: 0.0,
            });
            tracing::debug!(?id, ?cell, name = template.name, "spawned entity");
        }
    }

    fn refresh_distances(&mut self) {
        let player = self.player.position;
        for entity in self.entities.iter_mut() {
            entity.distance_to_player = entity.position.distance(player);
        }
    }

    fn set_play_mode(&mut self, mode: PlayMode, out_events: &mut Vec<Event>) {
        if self.play_mode != mode {
            self.play_mode = mode;
            out_events.push(Event::PlayModeChanged { mode });
        }
    }
}

/// Derives one wall per solid cell, textured by the cell payload.
#[must_use]
pub fn rebuild_walls(grid: &GridMap) -> Vec<Wall> {
    grid.iter()
        .filter(|(_, contents)| contents.is_solid())
        .map(|(cell, contents)| Wall::new(cell, contents.payload()))
        .collect()
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            let dt = dt.min(session.config.max_frame_delta());
            session.refresh_distances();
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SetPlayerPose { pose } => {
            session.player = pose;
            session.refresh_distances();
            out_events.push(Event::PlayerMoved { pose });
        }
        Command::SetCell { cell, value } => {
            if session.grid.set_cell(cell, value) {
                session.walls = rebuild_walls(&session.grid);
                session.nodes.rebuild(&session.grid);
                tracing::debug!(?cell, ?value, walls = session.walls.len(), "cell rewritten");
                out_events.push(Event::CellChanged { cell, value });
            } else {
                tracing::warn!(?cell, "rejected cell change outside the grid");
                out_events.push(Event::CellChangeRejected { cell });
            }
        }
        Command::MoveEntity { entity, to } => {
            let player = session.player.position;
            if let Some(moving) = session.entities.get_mut(entity) {
                let from = moving.position;
                moving.position = to;
                moving.distance_to_player = to.distance(player);
                out_events.push(Event::EntityMoved { entity, from, to });
            }
        }
        Command::EngageCombat { enemy } => {
            if session.play_mode != PlayMode::Exploration {
                return;
            }
            let hostile = session
                .entities
                .get(enemy)
                .is_some_and(|entity| entity.kind.hostile().is_some());
            if !hostile {
                tracing::warn!(?enemy, "ignoring combat request for a non-hostile entity");
                return;
            }

            tracing::info!(?enemy, "combat engaged");
            out_events.push(Event::CombatEngaged { enemy });
            session.set_play_mode(PlayMode::Combat, out_events);
        }
        Command::ResolveCombat {
            enemy,
            enemy_defeated,
        } => {
            if session.play_mode != PlayMode::Combat {
                tracing::warn!(?enemy, "ignoring combat resolution outside of combat");
                return;
            }

            if enemy_defeated && session.entities.remove(enemy).is_some() {
                out_events.push(Event::EntityRemoved { entity: enemy });
            }
            tracing::info!(?enemy, enemy_defeated, "combat resolved");
            session.set_play_mode(PlayMode::Exploration, out_events);
        }
        Command::CollectEntity { entity } => {
            let collectible = session
                .entities
                .get(entity)
                .is_some_and(|found| matches!(found.kind, EntityKind::Collectible { .. }));
            if !collectible {
                tracing::warn!(?entity, "ignoring collection of a non-collectible entity");
                return;
            }
            collect(session, entity, out_events);
        }
        Command::Interact => {
            if session.play_mode != PlayMode::Exploration {
                return;
            }
            let Some(entity) = entity_ahead(session) else {
                return;
            };
            let Some(kind) = session.entities.get(entity).map(|found| found.kind) else {
                return;
            };

            match kind {
                EntityKind::Dialogue { dialogue } => {
                    tracing::debug!(?entity, dialogue, "dialogue started");
                    out_events.push(Event::DialogueStarted { entity, dialogue });
                }
                EntityKind::Collectible { dialogue } => {
                    collect(session, entity, out_events);
                    out_events.push(Event::DialogueStarted { entity, dialogue });
                }
                EntityKind::Static | EntityKind::Hostile(_) => {}
            }
        }
    }
}

fn collect(session: &mut Session, entity: EntityId, out_events: &mut Vec<Event>) {
    if let Some(collected) = session.entities.remove(entity) {
        tracing::info!(?entity, item = collected.name, "item collected");
        out_events.push(Event::ItemCollected {
            entity,
            item: collected.name,
        });
        out_events.push(Event::EntityRemoved { entity });
    }
}

/// Entity standing in the cell one tile ahead of the player, if any.
#[must_use]
pub fn entity_ahead(session: &Session) -> Option<EntityId> {
    let tile_size = session.config.tile_size;
    let reach = session.player.position + session.player.forward() * tile_size;
    CellCoord::from_world(reach, tile_size).and_then(|cell| entity_at(session, cell))
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use super::Session;
    use crawler_core::{
        EngineConfig, EntityId, EntitySnapshot, EntityView, GridMap, PlayMode, PlayerPose, Wall,
    };
    use crawler_system_pathfinding::NodeGrid;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(session: &Session) -> &'static str {
        session.banner
    }

    /// Engine configuration the session was created with.
    #[must_use]
    pub fn config(session: &Session) -> &EngineConfig {
        &session.config
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(session: &Session) -> &GridMap {
        &session.grid
    }

    /// Walls derived from the solid cells of the grid.
    #[must_use]
    pub fn walls(session: &Session) -> &[Wall] {
        &session.walls
    }

    /// Path node graph derived from the grid.
    #[must_use]
    pub fn node_grid(session: &Session) -> &NodeGrid {
        &session.nodes
    }

    /// Splits the session into the grid and the node graph so searches can run.
    ///
    /// The node graph is handed out mutably because searches use its scratch
    /// fields; its structure only changes through [`crate::apply`].
    pub fn navigation(session: &mut Session) -> (&GridMap, &mut NodeGrid) {
        (&session.grid, &mut session.nodes)
    }

    /// Captures a read-only view of the live entities.
    #[must_use]
    pub fn entity_view(session: &Session) -> EntityView {
        EntityView::from_snapshots(
            session
                .entities
                .iter()
                .map(|(id, entity)| entity.snapshot(id))
                .collect(),
        )
    }

    /// Snapshot of a single entity, if the handle still resolves.
    #[must_use]
    pub fn entity(session: &Session, id: EntityId) -> Option<EntitySnapshot> {
        session.entities.get(id).map(|entity| entity.snapshot(id))
    }

    /// Pose most recently reported for the player.
    #[must_use]
    pub fn player_pose(session: &Session) -> PlayerPose {
        session.player
    }

    /// Reports the active play mode.
    #[must_use]
    pub fn play_mode(session: &Session) -> PlayMode {
        session.play_mode
    }
}

/// Finds the live entity standing in the provided cell, if any.
#[must_use]
pub fn entity_at(session: &Session, cell: CellCoord) -> Option<EntityId> {
    let tile_size = session.config.tile_size;
    session
        .entities
        .iter()
        .find(|(_, entity)| CellCoord::from_world(entity.position, tile_size) == Some(cell))
        .map(|(id, _)| id)
}
