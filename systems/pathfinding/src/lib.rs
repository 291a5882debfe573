#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* pathfinding over the 8-connected walkable cells of the tile grid.
//!
//! The node graph is built once per grid and reused by every search. Each
//! node carries scratch fields (`g`, `h`, `f`, parent and open/closed state)
//! that a search fills in and resets before returning, so consecutive searches
//! never observe each other's values. Searches run synchronously to
//! completion; grids are small enough that a full search fits in a frame, but
//! the cost grows with the number of walkable cells and the linear open-set
//! scan, which is the scalability ceiling of this design.

use std::f32::consts::SQRT_2;

use crawler_core::{CellCoord, GridMap};

const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Stable position of a node inside its [`NodeGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Row-major offset of the node.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchState {
    Unvisited,
    Open,
    Closed,
}

/// Graph vertex corresponding to one grid cell.
#[derive(Clone, Debug)]
pub struct PathNode {
    cell: CellCoord,
    walkable: bool,
    neighbors: Vec<NodeIndex>,
    g: f32,
    h: f32,
    f: f32,
    parent: Option<NodeIndex>,
    state: SearchState,
}

impl PathNode {
    fn new(cell: CellCoord, walkable: bool) -> Self {
        Self {
            cell,
            walkable,
            neighbors: Vec::new(),
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: None,
            state: SearchState::Unvisited,
        }
    }

    /// Cell represented by the node.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Whether the cell can be traversed.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Walkable nodes adjacent to this one, orthogonally or diagonally.
    ///
    /// A diagonal neighbor is left out when both cells flanking the step are
    /// solid, since nothing moving along the grid axes can pass between them.
    #[must_use]
    pub fn neighbors(&self) -> &[NodeIndex] {
        &self.neighbors
    }

    /// Cost of the best known route from the search start.
    #[must_use]
    pub const fn g(&self) -> f32 {
        self.g
    }

    /// Estimated remaining cost to the search target.
    #[must_use]
    pub const fn h(&self) -> f32 {
        self.h
    }

    /// Sum of [`g`](Self::g) and [`h`](Self::h).
    #[must_use]
    pub const fn f(&self) -> f32 {
        self.f
    }

    /// Predecessor on the best known route.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Reports whether every scratch field holds its neutral value.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.g == 0.0
            && self.h == 0.0
            && self.f == 0.0
            && self.parent.is_none()
            && self.state == SearchState::Unvisited
    }

    fn reset_scratch(&mut self) {
        self.g = 0.0;
        self.h = 0.0;
        self.f = 0.0;
        self.parent = None;
        self.state = SearchState::Unvisited;
    }
}

/// Pool of path nodes mirroring the grid, one node per cell.
#[derive(Clone, Debug, Default)]
pub struct NodeGrid {
    columns: u32,
    rows: u32,
    nodes: Vec<PathNode>,
}

impl NodeGrid {
    /// Builds the node pool and its neighbor lists from the grid.
    #[must_use]
    pub fn build(grid: &GridMap) -> Self {
        let mut nodes = Self::default();
        nodes.rebuild(grid);
        nodes
    }

    /// Refreshes walkability and neighbor lists after the grid changed.
    ///
    /// When the dimensions are unchanged every node keeps its index, so
    /// callers holding [`NodeIndex`] values or cells from an earlier search
    /// still refer to the same nodes.
    pub fn rebuild(&mut self, grid: &GridMap) {
        if self.columns != grid.columns() || self.rows != grid.rows() {
            self.columns = grid.columns();
            self.rows = grid.rows();
            self.nodes = grid
                .iter()
                .map(|(cell, _)| PathNode::new(cell, grid.is_walkable(cell)))
                .collect();
        } else {
            for node in &mut self.nodes {
                node.walkable = grid.is_walkable(node.cell);
                node.neighbors.clear();
                node.reset_scratch();
            }
        }

        for offset in 0..self.nodes.len() {
            if !self.nodes[offset].walkable {
                continue;
            }

            let cell = self.nodes[offset].cell;
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let column = i64::from(cell.column()) + dx;
                let row = i64::from(cell.row()) + dy;
                let Some(neighbor) = self.index_at(column, row) else {
                    continue;
                };
                if !self.nodes[neighbor.0].walkable {
                    continue;
                }
                // A diagonal squeezed between two solid cells cannot be walked.
                if dx != 0
                    && dy != 0
                    && !self.open_at(column, i64::from(cell.row()))
                    && !self.open_at(i64::from(cell.column()), row)
                {
                    continue;
                }
                self.nodes[offset].neighbors.push(neighbor);
            }
        }

        tracing::debug!(
            columns = self.columns,
            rows = self.rows,
            walkable = self.nodes.iter().filter(|node| node.walkable).count(),
            "rebuilt path node graph"
        );
    }

    /// Number of node columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of node rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Node representing the provided cell.
    #[must_use]
    pub fn node(&self, cell: CellCoord) -> Option<&PathNode> {
        self.index(cell).map(|index| &self.nodes[index.0])
    }

    /// Node stored at the provided index.
    #[must_use]
    pub fn node_at(&self, index: NodeIndex) -> Option<&PathNode> {
        self.nodes.get(index.0)
    }

    /// Iterator over every node in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &PathNode> {
        self.nodes.iter()
    }

    /// Computes the cheapest route from `start` to `target`.
    ///
    /// The returned cells exclude `start` and include `target`. The path is
    /// empty when the target cannot be reached, when both cells coincide, or
    /// when either lies outside the grid; callers treat an empty path as
    /// "hold position".
    pub fn find_path(&mut self, start: CellCoord, target: CellCoord) -> Vec<CellCoord> {
        let (Some(start_index), Some(target_index)) = (self.index(start), self.index(target))
        else {
            return Vec::new();
        };
        if start_index == target_index {
            return Vec::new();
        }

        let mut open = vec![start_index];
        let mut touched = vec![start_index];
        {
            let node = &mut self.nodes[start_index.0];
            node.g = 0.0;
            node.h = start.euclidean_distance(target);
            node.f = node.h;
            node.state = SearchState::Open;
        }

        let mut reached = false;
        let mut expanded = 0_usize;
        while !open.is_empty() {
            let mut best_slot = 0;
            let mut best_f = f32::INFINITY;
            for (slot, index) in open.iter().enumerate() {
                let f = self.nodes[index.0].f;
                if f < best_f {
                    best_f = f;
                    best_slot = slot;
                }
            }

            let current = open.remove(best_slot);
            if current == target_index {
                reached = true;
                break;
            }

            expanded += 1;
            self.nodes[current.0].state = SearchState::Closed;
            let current_cell = self.nodes[current.0].cell;
            let current_g = self.nodes[current.0].g;

            for slot in 0..self.nodes[current.0].neighbors.len() {
                let neighbor = self.nodes[current.0].neighbors[slot];
                let node = &mut self.nodes[neighbor.0];
                if !node.walkable || node.state == SearchState::Closed {
                    continue;
                }

                let diagonal = node.cell.column() != current_cell.column()
                    && node.cell.row() != current_cell.row();
                let g = current_g + if diagonal { SQRT_2 } else { 1.0 };

                match node.state {
                    SearchState::Unvisited => {
                        node.parent = Some(current);
                        node.g = g;
                        node.h = node.cell.euclidean_distance(target);
                        node.f = node.g + node.h;
                        node.state = SearchState::Open;
                        open.push(neighbor);
                        touched.push(neighbor);
                    }
                    SearchState::Open if g < node.g => {
                        node.parent = Some(current);
                        node.g = g;
                        node.f = node.g + node.h;
                    }
                    SearchState::Open | SearchState::Closed => {}
                }
            }
        }

        let path = if reached {
            self.reconstruct(start_index, target_index)
        } else {
            Vec::new()
        };

        for index in touched {
            self.nodes[index.0].reset_scratch();
        }

        tracing::debug!(
            ?start,
            ?target,
            expanded,
            length = path.len(),
            reached,
            "path search finished"
        );
        path
    }

    fn reconstruct(&self, start: NodeIndex, target: NodeIndex) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut cursor = target;
        while cursor != start {
            let node = &self.nodes[cursor.0];
            path.push(node.cell);
            match node.parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    fn index(&self, cell: CellCoord) -> Option<NodeIndex> {
        self.index_at(i64::from(cell.column()), i64::from(cell.row()))
    }

    fn open_at(&self, column: i64, row: i64) -> bool {
        self.index_at(column, row)
            .is_some_and(|index| self.nodes[index.0].walkable)
    }

    fn index_at(&self, column: i64, row: i64) -> Option<NodeIndex> {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return None;
        }
        let offset = usize::try_from(row * i64::from(self.columns) + column).ok()?;
        (offset < self.nodes.len()).then_some(NodeIndex(offset))
    }
}

/// Builds the path node graph for the provided grid.
#[must_use]
pub fn rebuild_node_graph(grid: &GridMap) -> NodeGrid {
    NodeGrid::build(grid)
}

/// Computes the cheapest route between two cells; see [`NodeGrid::find_path`].
pub fn find_path(start: CellCoord, target: CellCoord, nodes: &mut NodeGrid) -> Vec<CellCoord> {
    nodes.find_path(start, target)
}

/// Total movement cost of following `path` from `start`, counting diagonal steps as √2.
#[must_use]
pub fn path_cost(start: CellCoord, path: &[CellCoord]) -> f32 {
    let mut cost = 0.0;
    let mut previous = start;
    for &cell in path {
        cost += previous.euclidean_distance(cell);
        previous = cell;
    }
    cost
}
