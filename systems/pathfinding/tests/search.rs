use std::f32::consts::SQRT_2;

use crawler_core::{CellCoord, GridCell, GridMap};
use crawler_system_pathfinding::{find_path, path_cost, rebuild_node_graph, PathNode};

fn grid_from_ascii(rows: &[&str]) -> GridMap {
    let cells = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|symbol| match symbol {
                    '#' => GridCell::solid(1),
                    _ => GridCell::FLOOR,
                })
                .collect()
        })
        .collect();
    GridMap::from_rows(cells).expect("rectangular grid")
}

fn octile(start: CellCoord, target: CellCoord) -> f32 {
    let dx = start.column().abs_diff(target.column()) as f32;
    let dy = start.row().abs_diff(target.row()) as f32;
    dx.max(dy) - dx.min(dy) + dx.min(dy) * SQRT_2
}

#[test]
fn obstacle_free_cost_matches_octile_distance() {
    let grid = GridMap::filled(12, 9, GridCell::FLOOR);
    let mut nodes = rebuild_node_graph(&grid);
    let pairs = [
        (CellCoord::new(0, 0), CellCoord::new(11, 8)),
        (CellCoord::new(3, 7), CellCoord::new(10, 1)),
        (CellCoord::new(5, 5), CellCoord::new(0, 5)),
        (CellCoord::new(2, 0), CellCoord::new(4, 8)),
    ];

    for (start, target) in pairs {
        let path = find_path(start, target, &mut nodes);
        let expected = octile(start, target);
        assert!(
            (path_cost(start, &path) - expected).abs() < 1e-3,
            "cost from {start:?} to {target:?} was not optimal"
        );
        let steps = start.chebyshev_distance(target) as usize;
        assert!(path.len() >= steps && path.len() <= steps + 1);
        assert_eq!(path.last(), Some(&target));
        assert!(!path.contains(&start));
    }
}

#[test]
fn path_steps_are_adjacent_and_walkable() {
    let grid = grid_from_ascii(&[
        "..........",
        ".########.",
        ".#......#.",
        ".#.####.#.",
        ".#....#...",
        ".######.#.",
        "..........",
    ]);
    let mut nodes = rebuild_node_graph(&grid);
    let start = CellCoord::new(2, 2);
    let target = CellCoord::new(5, 4);

    let path = find_path(start, target, &mut nodes);

    assert_eq!(path.last(), Some(&target));
    let mut previous = start;
    for cell in &path {
        assert!(grid.is_walkable(*cell), "{cell:?} is blocked");
        assert_eq!(previous.chebyshev_distance(*cell), 1);
        previous = *cell;
    }
}

#[test]
fn enclosed_target_yields_empty_path() {
    let grid = grid_from_ascii(&[
        ".......", //
        "..###..", //
        "..#.#..", //
        "..###..", //
        ".......",
    ]);
    let mut nodes = rebuild_node_graph(&grid);

    let path = find_path(CellCoord::new(0, 0), CellCoord::new(3, 2), &mut nodes);

    assert!(path.is_empty());
    assert!(nodes.nodes().all(PathNode::is_neutral));
}

#[test]
fn repeated_searches_are_identical() {
    let grid = grid_from_ascii(&[
        "........", //
        "...#....", //
        "...#.#..", //
        "...#.#..", //
        ".....#..",
    ]);
    let mut nodes = rebuild_node_graph(&grid);
    let start = CellCoord::new(0, 2);
    let target = CellCoord::new(7, 3);

    let first = find_path(start, target, &mut nodes);
    assert!(nodes.nodes().all(PathNode::is_neutral));
    let second = find_path(start, target, &mut nodes);
    assert!(nodes.nodes().all(PathNode::is_neutral));

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn rebuilt_graph_routes_around_new_wall() {
    let mut grid = GridMap::filled(5, 3, GridCell::FLOOR);
    let mut nodes = rebuild_node_graph(&grid);
    let start = CellCoord::new(0, 1);
    let target = CellCoord::new(4, 1);
    assert_eq!(find_path(start, target, &mut nodes).len(), 4);

    assert!(grid.set_cell(CellCoord::new(2, 1), GridCell::solid(2)));
    nodes.rebuild(&grid);

    let detour = find_path(start, target, &mut nodes);
    assert!(!detour.contains(&CellCoord::new(2, 1)));
    assert_eq!(detour.last(), Some(&target));

    assert!(grid.set_cell(CellCoord::new(2, 0), GridCell::solid(2)));
    assert!(grid.set_cell(CellCoord::new(2, 2), GridCell::solid(2)));
    nodes.rebuild(&grid);
    assert!(find_path(start, target, &mut nodes).is_empty());
}
