//! Drives one frame of the session: simulation, pursuit, rays and sprites.

use std::time::Duration;

use crawler_core::{Command, EngineConfig, EntitySnapshot, Event, PlayerPose};
use crawler_system_projection::{
    project_all, wall_strips, Billboard, DepthBuffer, SpriteProjection, Viewport, WallStrip,
};
use crawler_system_pursuit::Pursuit;
use crawler_system_raycaster::{Ray, Raycaster};
use crawler_world::{self as world, query, Session};

/// Texel size assumed for every sprite; textures are not loaded headlessly.
const SPRITE_TEXTURE_SIZE: f32 = 64.0;

/// Everything produced while advancing a single frame.
#[derive(Debug)]
pub(crate) struct FrameReport {
    pub(crate) pose: PlayerPose,
    pub(crate) events: Vec<Event>,
    pub(crate) strips: Vec<WallStrip>,
    pub(crate) sprites: Vec<(EntitySnapshot, SpriteProjection)>,
}

/// Owns the systems and frame-scoped buffers reused across frames.
#[derive(Debug)]
pub(crate) struct FrameDriver {
    pursuit: Pursuit,
    raycaster: Raycaster,
    viewport: Viewport,
    ray_count: u32,
    rays: Vec<Ray>,
}

impl FrameDriver {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        Self {
            pursuit: Pursuit::new(config.pursuit.clone()),
            raycaster: Raycaster::from_config(config),
            viewport: Viewport::from_config(config),
            ray_count: config.ray_count,
            rays: Vec::with_capacity(config.ray_count as usize),
        }
    }

    pub(crate) fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Advances the session by `dt` with the player at `pose` and renders the result.
    pub(crate) fn advance(
        &mut self,
        session: &mut Session,
        pose: PlayerPose,
        dt: Duration,
    ) -> FrameReport {
        let mut events = Vec::new();
        world::apply(session, Command::Tick { dt }, &mut events);
        world::apply(session, Command::SetPlayerPose { pose }, &mut events);
        let events = self.pump_pursuit(session, events);

        let grid = query::grid(session);
        self.raycaster.cast_all_rays(
            &pose,
            grid,
            self.ray_count,
            self.viewport.fov_degrees,
            &mut self.rays,
        );
        let depth = DepthBuffer::from_rays(&self.rays);
        let strips = wall_strips(&self.rays, &self.viewport);

        let billboards = query::entity_view(session)
            .into_vec()
            .into_iter()
            .map(|snapshot| {
                let billboard =
                    Billboard::from_snapshot(&snapshot, SPRITE_TEXTURE_SIZE, SPRITE_TEXTURE_SIZE);
                (snapshot, billboard)
            });
        let sprites = project_all(billboards, &pose, &depth, &self.viewport);

        tracing::debug!(
            walls = strips.iter().filter(|strip| strip.texture_id.is_some()).count(),
            sprites = sprites.len(),
            events = events.len(),
            "frame rendered"
        );

        FrameReport {
            pose,
            events,
            strips,
            sprites,
        }
    }

    /// Feeds events to pursuit until it stops issuing commands.
    ///
    /// Combat resolution belongs to an external collaborator; headlessly the
    /// player wins every encounter as soon as it starts.
    fn pump_pursuit(&mut self, session: &mut Session, initial: Vec<Event>) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = initial;

        loop {
            log.extend(pending.iter().cloned());

            let player = query::player_pose(session);
            let entities = query::entity_view(session);
            let tile_size = query::config(session).tile_size;
            let mut commands = Vec::new();
            {
                let (grid, nodes) = query::navigation(session);
                self.pursuit.handle(
                    &pending,
                    &player,
                    &entities,
                    grid,
                    nodes,
                    tile_size,
                    &mut commands,
                );
            }

            if commands.is_empty() {
                break;
            }

            pending.clear();
            for command in commands {
                world::apply(session, command, &mut pending);
            }

            let engaged: Vec<_> = pending
                .iter()
                .filter_map(|event| match event {
                    Event::CombatEngaged { enemy } => Some(*enemy),
                    _ => None,
                })
                .collect();
            for enemy in engaged {
                world::apply(
                    session,
                    Command::ResolveCombat {
                        enemy,
                        enemy_defeated: true,
                    },
                    &mut pending,
                );
            }
        }

        log
    }
}
