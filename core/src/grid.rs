//! Tile grid shared by the raycaster, the pathfinder and the session.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Base traversability of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Floor the player and enemies can stand on.
    Walkable,
    /// Wall that stops rays and movement.
    Solid,
}

impl TileKind {
    /// Serialized discriminant used by map files.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Walkable => 0,
            Self::Solid => 1,
        }
    }
}

impl TryFrom<u8> for TileKind {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Walkable),
            1 => Ok(Self::Solid),
            other => Err(GridError::UnknownTileKind(other)),
        }
    }
}

/// Contents of a single grid cell.
///
/// The payload selects a wall texture on solid cells and an entity spawn code
/// on walkable cells, where `0` means empty. Cells serialize as the two
/// element tuple `[kind, payload]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u16)", into = "(u8, u16)")]
pub struct GridCell {
    kind: TileKind,
    payload: u16,
}

impl GridCell {
    /// Empty floor.
    pub const FLOOR: Self = Self::walkable(0);

    /// Creates a walkable cell carrying a spawn code.
    #[must_use]
    pub const fn walkable(spawn_code: u16) -> Self {
        Self {
            kind: TileKind::Walkable,
            payload: spawn_code,
        }
    }

    /// Creates a solid cell carrying a texture id.
    #[must_use]
    pub const fn solid(texture_id: u16) -> Self {
        Self {
            kind: TileKind::Solid,
            payload: texture_id,
        }
    }

    /// Base traversability of the cell.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Texture id or spawn code stored alongside the kind.
    #[must_use]
    pub const fn payload(&self) -> u16 {
        self.payload
    }

    /// Reports whether the cell blocks rays and movement.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        matches!(self.kind, TileKind::Solid)
    }
}

impl TryFrom<(u8, u16)> for GridCell {
    type Error = GridError;

    fn try_from((kind, payload): (u8, u16)) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: TileKind::try_from(kind)?,
            payload,
        })
    }
}

impl From<GridCell> for (u8, u16) {
    fn from(cell: GridCell) -> Self {
        (cell.kind.code(), cell.payload)
    }
}

/// Rectangular, row-major grid of cells.
///
/// Lookups outside the grid never fail: they report "not solid" and "not
/// walkable" so rays and paths fail safe at the map edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<GridCell>,
}

impl GridMap {
    /// Builds a grid from row-major rows of cells.
    pub fn from_rows(rows: Vec<Vec<GridCell>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, contents) in rows.iter().enumerate() {
            if contents.len() != expected {
                return Err(GridError::RaggedRow {
                    row,
                    expected,
                    found: contents.len(),
                });
            }
            cells.extend_from_slice(contents);
        }

        let columns = u32::try_from(expected).map_err(|_| GridError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;

        Ok(Self {
            columns,
            rows: row_count,
            cells,
        })
    }

    /// Parses a grid serialized as a JSON array of rows of `[kind, payload]` tuples.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let rows: Vec<Vec<GridCell>> = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    /// Parses a JSON object mapping map ids to grids and extracts the requested map.
    pub fn from_bundle_json(json: &str, id: &str) -> Result<Self, GridError> {
        let mut bundle: HashMap<String, Vec<Vec<GridCell>>> = serde_json::from_str(json)?;
        let rows = bundle
            .remove(id)
            .ok_or_else(|| GridError::MissingMap(id.to_owned()))?;
        Self::from_rows(rows)
    }

    /// Creates a grid where every cell holds the same contents.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, cell: GridCell) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![cell; count],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Contents of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<GridCell> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Contents of the cell at signed coordinates, if it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Option<GridCell> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.cell(CellCoord::new(column, row))
    }

    /// Reports whether the cell at signed coordinates is solid; cells outside are not.
    #[must_use]
    pub fn is_solid_at(&self, column: i64, row: i64) -> bool {
        self.cell_at(column, row).is_some_and(|cell| cell.is_solid())
    }

    /// Reports whether the cell can be walked on; cells outside cannot.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.cell(cell).is_some_and(|contents| !contents.is_solid())
    }

    /// Reports whether the world position lies inside a solid cell.
    #[must_use]
    pub fn is_wall_at(&self, position: Vec2, tile_size: f32) -> bool {
        if tile_size <= 0.0 {
            return false;
        }
        let column = (position.x / tile_size).floor();
        let row = (position.y / tile_size).floor();
        if !column.is_finite() || !row.is_finite() {
            return false;
        }
        self.is_solid_at(column as i64, row as i64)
    }

    /// Overwrites a single cell, returning `false` when it lies outside the grid.
    pub fn set_cell(&mut self, cell: CellCoord, value: GridCell) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Iterator over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, GridCell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *cell)
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Errors raised while loading a grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// The grid has no rows or its rows have no cells.
    #[error("grid must contain at least one row and one column")]
    Empty,
    /// A row does not match the width of the first row.
    #[error("row {row} has {found} cells but the first row has {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The grid dimensions do not fit the cell coordinate range.
    #[error("grid dimensions exceed the supported cell range")]
    TooLarge,
    /// A cell used a base type other than walkable or solid.
    #[error("unknown tile kind {0}; expected 0 (walkable) or 1 (solid)")]
    UnknownTileKind(u8),
    /// The requested map id is absent from a map bundle.
    #[error("map `{0}` is not present in the bundle")]
    MissingMap(String),
    /// The JSON document could not be parsed.
    #[error("failed to parse grid json: {0}")]
    Json(#[from] serde_json::Error),
}
