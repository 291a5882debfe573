use crawler_core::{CellCoord, EngineConfig, GridCell, GridMap, PlayerPose};
use crawler_system_projection::{project_all, project_sprite, Billboard, DepthBuffer, Viewport};
use crawler_system_raycaster::Raycaster;
use crawler_world::{query, Session};

fn corridor_session() -> Session {
    let mut grid = GridMap::filled(10, 3, GridCell::FLOOR);
    for column in 0..10 {
        let _ = grid.set_cell(CellCoord::new(column, 0), GridCell::solid(1));
        let _ = grid.set_cell(CellCoord::new(column, 2), GridCell::solid(1));
    }
    let _ = grid.set_cell(CellCoord::new(5, 1), GridCell::solid(2));
    let _ = grid.set_cell(CellCoord::new(3, 1), GridCell::walkable(3));
    let _ = grid.set_cell(CellCoord::new(7, 1), GridCell::walkable(6));

    let config = EngineConfig::default();
    let pose = PlayerPose::at_cell(CellCoord::new(1, 1), config.tile_size, 0.0);
    Session::new(grid, pose, config)
}

fn frame_depth(session: &Session) -> DepthBuffer {
    let config = query::config(session);
    let mut rays = Vec::new();
    Raycaster::from_config(config).cast_all_rays(
        &query::player_pose(session),
        query::grid(session),
        config.ray_count,
        config.fov_degrees,
        &mut rays,
    );
    DepthBuffer::from_rays(&rays)
}

#[test]
fn walls_hide_sprites_behind_them() {
    let session = corridor_session();
    let depth = frame_depth(&session);
    let viewport = Viewport::from_config(query::config(&session));
    let pose = query::player_pose(&session);

    assert_eq!(depth.len(), 400);
    let center = depth.get(200).expect("center column");
    assert!((center - 112.0).abs() < 1e-3);

    let view = query::entity_view(&session);
    let projected = project_all(
        view.iter()
            .map(|entity| (entity.name, Billboard::from_snapshot(entity, 64.0, 64.0))),
        &pose,
        &depth,
        &viewport,
    );

    let names: Vec<&str> = projected.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["tree", "rat"]);
    assert!(projected[0].1.columns.is_empty(), "tree sits behind the wall");
    assert!(!projected[1].1.columns.is_empty(), "rat stands in the open");
}

#[test]
fn sprite_columns_are_ordered_and_on_screen() {
    let session = corridor_session();
    let depth = frame_depth(&session);
    let viewport = Viewport::from_config(query::config(&session));
    let pose = query::player_pose(&session);
    let rat = query::entity_view(&session)
        .into_vec()
        .into_iter()
        .find(|entity| entity.name == "rat")
        .expect("rat spawned");

    let projection = project_sprite(
        &Billboard::from_snapshot(&rat, 64.0, 64.0),
        &pose,
        &depth,
        &viewport,
    )
    .expect("rat is in front of the player");

    assert!((projection.depth - 64.0).abs() < 1e-3);
    assert!(projection
        .columns
        .windows(2)
        .all(|pair| pair[0].screen_x < pair[1].screen_x));
    assert!(projection
        .columns
        .iter()
        .all(|column| (0..800).contains(&column.screen_x) && (0.0..1.0).contains(&column.texture_u)));
}
