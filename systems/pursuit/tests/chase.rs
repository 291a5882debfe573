use std::time::Duration;

use crawler_core::{
    CellCoord, Command, EngineConfig, EntityId, Event, GridMap, PlayMode, PlayerPose,
};
use crawler_system_pursuit::{Pursuit, PursuitState};
use crawler_world::{self as world, entity_at, query, Session};

const MAP: &str = r#"[
    [[1,1],[1,1],[1,1],[1,1],[1,1],[1,1],[1,1]],
    [[1,1],[0,0],[0,0],[1,1],[0,0],[0,0],[1,1]],
    [[1,1],[0,0],[0,0],[1,1],[0,3],[0,0],[1,1]],
    [[1,1],[0,0],[0,0],[0,0],[0,0],[0,0],[1,1]],
    [[1,1],[1,1],[1,1],[1,1],[1,1],[1,1],[1,1]]
]"#;

const PINCHED_MAP: &str = r#"[
    [[0,0],[0,0],[0,0],[0,0],[0,0],[0,0]],
    [[0,0],[0,3],[1,1],[0,0],[0,0],[0,0]],
    [[0,0],[1,1],[0,0],[0,0],[0,0],[0,0]],
    [[0,0],[0,0],[0,0],[0,0],[0,0],[0,0]],
    [[0,0],[0,0],[0,0],[0,0],[0,0],[0,0]]
]"#;

fn session_on(map: &str, player: CellCoord) -> Session {
    let grid = GridMap::from_json(map).expect("valid map");
    let config = EngineConfig::default();
    let pose = PlayerPose::at_cell(player, config.tile_size, 0.0);
    Session::new(grid, pose, config)
}

fn session() -> Session {
    session_on(MAP, CellCoord::new(1, 1))
}

fn run_frame(session: &mut Session, pursuit: &mut Pursuit, log: &mut Vec<Event>) {
    let mut pending = Vec::new();
    world::apply(
        session,
        Command::Tick {
            dt: Duration::from_millis(50),
        },
        &mut pending,
    );

    while !pending.is_empty() {
        log.extend(pending.iter().cloned());
        let player = query::player_pose(session);
        let entities = query::entity_view(session);
        let tile_size = query::config(session).tile_size;
        let mut commands = Vec::new();
        {
            let (grid, nodes) = query::navigation(session);
            pursuit.handle(&pending, &player, &entities, grid, nodes, tile_size, &mut commands);
        }

        pending.clear();
        for command in commands {
            world::apply(session, command, &mut pending);
        }
    }
}

fn rat(session: &Session) -> EntityId {
    entity_at(session, CellCoord::new(4, 2)).expect("rat spawned")
}

#[test]
fn enemy_walks_around_the_wall_and_engages() {
    let mut session = session();
    let rat = rat(&session);
    let mut pursuit = Pursuit::new(query::config(&session).pursuit.clone());
    let mut log = Vec::new();

    for _ in 0..120 {
        run_frame(&mut session, &mut pursuit, &mut log);
        if query::play_mode(&session) == PlayMode::Combat {
            break;
        }
    }

    assert_eq!(query::play_mode(&session), PlayMode::Combat);
    assert_eq!(pursuit.state(rat), Some(PursuitState::Engaged));
    assert!(log.contains(&Event::CombatEngaged { enemy: rat }));

    let tile_size = query::config(&session).tile_size;
    let grid = query::grid(&session);
    for event in &log {
        if let Event::EntityMoved { to, .. } = event {
            assert!(!grid.is_wall_at(*to, tile_size), "rat entered a wall at {to:?}");
        }
    }
}

#[test]
fn enemy_does_not_squeeze_between_diagonal_walls() {
    let mut session = session_on(PINCHED_MAP, CellCoord::new(4, 3));
    let rat = entity_at(&session, CellCoord::new(1, 1)).expect("rat spawned");
    let mut pursuit = Pursuit::default();
    let mut log = Vec::new();

    run_frame(&mut session, &mut pursuit, &mut log);
    assert_eq!(pursuit.state(rat), Some(PursuitState::Pursuing));
    assert!(!pursuit
        .planned_path(rat)
        .any(|cell| cell == CellCoord::new(2, 2)));

    for _ in 0..200 {
        if query::play_mode(&session) == PlayMode::Combat {
            break;
        }
        run_frame(&mut session, &mut pursuit, &mut log);
    }

    assert_eq!(query::play_mode(&session), PlayMode::Combat);
    assert!(log.contains(&Event::CombatEngaged { enemy: rat }));
}

#[test]
fn resolved_combat_resets_or_forgets_the_enemy() {
    let mut session = session();
    let rat = rat(&session);
    let mut pursuit = Pursuit::default();
    let mut log = Vec::new();

    for _ in 0..120 {
        if query::play_mode(&session) == PlayMode::Combat {
            break;
        }
        run_frame(&mut session, &mut pursuit, &mut log);
    }
    assert_eq!(query::play_mode(&session), PlayMode::Combat);

    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::ResolveCombat {
            enemy: rat,
            enemy_defeated: false,
        },
        &mut events,
    );
    let mut commands = Vec::new();
    {
        let player = query::player_pose(&session);
        let entities = query::entity_view(&session);
        let (grid, nodes) = query::navigation(&mut session);
        pursuit.handle(&events, &player, &entities, grid, nodes, 32.0, &mut commands);
    }
    assert!(commands.is_empty());
    assert_eq!(pursuit.state(rat), Some(PursuitState::Idle));

    run_frame(&mut session, &mut pursuit, &mut log);
    assert_eq!(query::play_mode(&session), PlayMode::Combat);

    events.clear();
    world::apply(
        &mut session,
        Command::ResolveCombat {
            enemy: rat,
            enemy_defeated: true,
        },
        &mut events,
    );
    {
        let player = query::player_pose(&session);
        let entities = query::entity_view(&session);
        let (grid, nodes) = query::navigation(&mut session);
        pursuit.handle(&events, &player, &entities, grid, nodes, 32.0, &mut commands);
    }
    assert_eq!(pursuit.state(rat), None);
    assert!(query::entity(&session, rat).is_none());
}
