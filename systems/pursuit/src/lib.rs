#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy pursuit system that plans paths toward the player and proposes moves.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    time::Duration,
};

use crawler_core::{
    timer, CellCoord, Command, EntityId, EntityView, Event, GridMap, PlayMode, PlayerPose,
    PursuitConfig, Timer,
};
use crawler_system_pathfinding::{find_path, NodeGrid};
use glam::Vec2;

/// Distance at which an enemy counts as standing on a path node.
pub const ARRIVAL_RADIUS: f32 = 0.1;

/// Behavior an enemy currently exhibits toward the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PursuitState {
    /// The player is out of range; the enemy holds position.
    Idle,
    /// The enemy follows a planned path toward the player.
    Pursuing,
    /// The enemy reached melee range and requested combat.
    Engaged,
}

#[derive(Clone, Debug)]
struct Tracker {
    state: PursuitState,
    replan: Timer,
    path: VecDeque<CellCoord>,
}

impl Tracker {
    fn new(interval: Duration) -> Self {
        Self {
            state: PursuitState::Idle,
            replan: Timer::new(interval),
            path: VecDeque::new(),
        }
    }

    fn hold(&mut self, state: PursuitState) {
        self.state = state;
        self.path.clear();
        self.replan.reset();
    }
}

/// Pure system that reacts to session events and emits pursuit commands.
#[derive(Debug)]
pub struct Pursuit {
    config: PursuitConfig,
    play_mode: PlayMode,
    trackers: BTreeMap<EntityId, Tracker>,
}

impl Pursuit {
    /// Creates a pursuit system with the provided tuning.
    #[must_use]
    pub fn new(config: PursuitConfig) -> Self {
        Self {
            config,
            play_mode: PlayMode::Exploration,
            trackers: BTreeMap::new(),
        }
    }

    /// State of the provided enemy, if it has been observed.
    #[must_use]
    pub fn state(&self, enemy: EntityId) -> Option<PursuitState> {
        self.trackers.get(&enemy).map(|tracker| tracker.state)
    }

    /// Remaining planned cells of the provided enemy, next cell first.
    pub fn planned_path(&self, enemy: EntityId) -> impl Iterator<Item = CellCoord> + '_ {
        self.trackers
            .get(&enemy)
            .into_iter()
            .flat_map(|tracker| tracker.path.iter().copied())
    }

    /// Consumes session events and immutable views to emit pursuit commands.
    ///
    /// Enemies only act on frames that advanced time while the session is
    /// exploring. The node graph is borrowed mutably for the scratch fields of
    /// the path searches.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerPose,
        entities: &EntityView,
        grid: &GridMap,
        nodes: &mut NodeGrid,
        tile_size: f32,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = None;
        for event in events {
            match event {
                Event::PlayModeChanged { mode } => {
                    self.play_mode = *mode;
                    if *mode == PlayMode::Exploration {
                        for tracker in self.trackers.values_mut() {
                            if tracker.state == PursuitState::Engaged {
                                tracker.hold(PursuitState::Idle);
                            }
                        }
                    }
                }
                Event::EntityRemoved { entity } => {
                    let _ = self.trackers.remove(entity);
                }
                Event::TimeAdvanced { dt } => elapsed = Some(*dt),
                _ => {}
            }
        }

        if self.play_mode != PlayMode::Exploration {
            return;
        }
        let Some(dt) = elapsed else {
            return;
        };

        let present: BTreeSet<EntityId> = entities.hostiles().map(|(enemy, _)| enemy.id).collect();
        self.trackers.retain(|id, _| present.contains(id));

        let engage_range = self.config.engage_tiles * tile_size;
        let disengage_range = self.config.disengage_tiles * tile_size;
        let player_cell = CellCoord::from_world(player.position, tile_size);

        for (enemy, stats) in entities.hostiles() {
            let tracker = self
                .trackers
                .entry(enemy.id)
                .or_insert_with(|| Tracker::new(self.config.replan_interval()));
            let distance = enemy.position.distance(player.position);

            if distance <= engage_range {
                if tracker.state != PursuitState::Engaged {
                    tracing::debug!(enemy = ?enemy.id, distance, "enemy engaged the player");
                    tracker.hold(PursuitState::Engaged);
                    out.push(Command::EngageCombat { enemy: enemy.id });
                }
                // The session enters combat; everyone else holds this frame.
                break;
            }

            if distance >= disengage_range {
                if tracker.state != PursuitState::Idle {
                    tracing::debug!(enemy = ?enemy.id, distance, "enemy lost the player");
                    tracker.hold(PursuitState::Idle);
                }
                continue;
            }

            let entering = tracker.state != PursuitState::Pursuing;
            let replan_due = if entering {
                tracker.state = PursuitState::Pursuing;
                tracker.replan.reset();
                true
            } else {
                timer::update(&mut tracker.replan, dt)
            };

            if replan_due {
                let start = CellCoord::from_world(enemy.position, tile_size);
                tracker.path = match (start, player_cell) {
                    // Sharing a cell with the player: close in on its center.
                    (Some(start), Some(target)) if start == target => VecDeque::from([target]),
                    (Some(start), Some(target)) => find_path(start, target, nodes).into(),
                    _ => VecDeque::new(),
                };
                tracing::debug!(
                    enemy = ?enemy.id,
                    entering,
                    length = tracker.path.len(),
                    "replanned pursuit path"
                );
            }

            let step = stats.speed * dt.as_secs_f32();
            let to = steer(enemy.position, &mut tracker.path, step, grid, tile_size);
            if to != enemy.position {
                out.push(Command::MoveEntity { entity: enemy.id, to });
            }
        }
    }
}

impl Default for Pursuit {
    fn default() -> Self {
        Self::new(PursuitConfig::default())
    }
}

/// Moves `position` up to `step` units toward the next node of `path`.
///
/// X and Y are resolved independently against the grid so enemies slide
/// along walls instead of stopping. The step never overshoots the node.
fn steer(
    position: Vec2,
    path: &mut VecDeque<CellCoord>,
    step: f32,
    grid: &GridMap,
    tile_size: f32,
) -> Vec2 {
    while path
        .front()
        .is_some_and(|cell| cell.center(tile_size).distance(position) <= ARRIVAL_RADIUS)
    {
        let _ = path.pop_front();
    }
    let Some(next) = path.front() else {
        return position;
    };

    let offset = next.center(tile_size) - position;
    let distance = offset.length();
    let delta = offset / distance * step.min(distance);

    let mut moved = position;
    if !grid.is_wall_at(Vec2::new(position.x + delta.x, position.y), tile_size) {
        moved.x += delta.x;
    }
    if !grid.is_wall_at(Vec2::new(moved.x, position.y + delta.y), tile_size) {
        moved.y += delta.y;
    }

    if path
        .front()
        .is_some_and(|cell| cell.center(tile_size).distance(moved) <= ARRIVAL_RADIUS)
    {
        let _ = path.pop_front();
    }
    moved
}
