use std::time::Duration;

use crawler_core::{CellCoord, Command, EngineConfig, Event, GridCell, GridMap, PlayerPose};
use crawler_system_pathfinding::find_path;
use crawler_world::{self as world, entity_at, query, Session};
use glam::Vec2;

const BUNDLE: &str = r#"{
    "map": [
        [[1,1],[1,1],[1,1],[1,1],[1,1],[1,1]],
        [[1,1],[0,0],[0,0],[1,2],[0,2],[1,1]],
        [[1,1],[0,0],[0,0],[1,2],[0,0],[1,1]],
        [[1,1],[0,0],[0,0],[0,0],[0,4],[1,1]],
        [[1,1],[1,1],[1,1],[1,1],[1,1],[1,1]]
    ],
    "other": [[[0,0]]]
}"#;

fn session() -> Session {
    let grid = GridMap::from_bundle_json(BUNDLE, "map").expect("bundled map");
    let config = EngineConfig::default();
    let pose = PlayerPose::at_cell(CellCoord::new(1, 1), config.tile_size, 0.0);
    Session::new(grid, pose, config)
}

#[test]
fn walls_mirror_solid_cells() {
    let session = session();
    let walls = query::walls(&session);

    assert_eq!(walls.len(), 20);
    assert!(walls
        .iter()
        .all(|wall| query::grid(&session).cell(wall.cell()).is_some_and(|cell| cell.is_solid())));
    let inner: Vec<u16> = walls
        .iter()
        .filter(|wall| wall.cell().column() == 3 && (1..3).contains(&wall.cell().row()))
        .map(|wall| wall.texture_id())
        .collect();
    assert_eq!(inner, vec![2, 2]);
}

#[test]
fn opening_a_gate_shortens_the_route() {
    let mut session = session();
    let start = CellCoord::new(1, 1);
    let target = CellCoord::new(4, 1);

    let detour = {
        let (_, nodes) = query::navigation(&mut session);
        find_path(start, target, nodes)
    };
    assert!(detour.len() > 3);

    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::SetCell {
            cell: CellCoord::new(3, 1),
            value: GridCell::FLOOR,
        },
        &mut events,
    );
    assert_eq!(query::walls(&session).len(), 19);

    let (_, nodes) = query::navigation(&mut session);
    let direct = find_path(start, target, nodes);
    assert_eq!(
        direct,
        vec![CellCoord::new(2, 1), CellCoord::new(3, 1), CellCoord::new(4, 1)]
    );
}

#[test]
fn moves_refresh_distances_and_ignore_stale_handles() {
    let mut session = session();
    let skeleton = entity_at(&session, CellCoord::new(4, 1)).expect("skeleton");
    let key = entity_at(&session, CellCoord::new(4, 3)).expect("key");
    let mut events = Vec::new();

    world::apply(
        &mut session,
        Command::MoveEntity {
            entity: skeleton,
            to: Vec2::new(112.0, 48.0),
        },
        &mut events,
    );
    let moved = query::entity(&session, skeleton).expect("skeleton still alive");
    assert_eq!(moved.position, Vec2::new(112.0, 48.0));
    assert!((moved.distance_to_player - 64.0).abs() < 1e-4);

    world::apply(&mut session, Command::CollectEntity { entity: key }, &mut events);
    events.clear();
    world::apply(
        &mut session,
        Command::MoveEntity {
            entity: key,
            to: Vec2::ZERO,
        },
        &mut events,
    );
    assert!(events.is_empty());
}

#[test]
fn player_pose_updates_distances_on_tick() {
    let mut session = session();
    let skeleton = entity_at(&session, CellCoord::new(4, 1)).expect("skeleton");
    let mut events = Vec::new();
    let pose = PlayerPose::at_cell(CellCoord::new(4, 2), 32.0, 270.0);

    world::apply(&mut session, Command::SetPlayerPose { pose }, &mut events);
    world::apply(
        &mut session,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::PlayerMoved { pose },
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            },
        ]
    );
    let snapshot = query::entity(&session, skeleton).expect("skeleton");
    assert!((snapshot.distance_to_player - 32.0).abs() < 1e-4);
    assert_eq!(query::player_pose(&session), pose);
}
