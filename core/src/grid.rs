//! Static level layout: tile kinds, validated grids and the navigation graph.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

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

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell containing the provided world-space position.
    ///
    /// Returns `None` for negative positions or a non-positive tile length.
    #[must_use]
    pub fn containing(position: Vec2, tile_length: f32) -> Option<Self> {
        if tile_length <= 0.0 || !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / tile_length).floor();
        let row = (position.y / tile_length).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }

    /// World-space center of the cell.
    #[must_use]
    pub fn center(self, tile_length: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * tile_length,
            (self.row as f32 + 0.5) * tile_length,
        )
    }
}

/// Kind of content occupying a single level cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open floor.
    Empty,
    /// Solid wall that blocks movement, bullets and sight.
    Wall,
    /// Floor cell where the player starts.
    PlayerSpawn,
    /// Floor cell where a basic mob starts.
    MobSpawn,
    /// Floor cell where a boss starts.
    BossSpawn,
}

/// Reasons a decoded level grid is rejected before simulation starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The grid has no rows or its first row has no cells.
    #[error("level grid contains no cells")]
    Empty,
    /// A row's length differs from the first row.
    #[error("level row {row} has {found} cells but the first row has {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// No cell marks the player's start.
    #[error("level grid has no player spawn")]
    MissingPlayerSpawn,
    /// More than one cell marks the player's start.
    #[error("level grid has {count} player spawns but exactly one is required")]
    DuplicatePlayerSpawn {
        /// Number of player spawn cells found.
        count: usize,
    },
    /// The grid is too large to address with cell coordinates.
    #[error("level grid of {columns}x{rows} cells exceeds the addressable size")]
    TooLarge {
        /// Number of columns supplied.
        columns: usize,
        /// Number of rows supplied.
        rows: usize,
    },
}

/// Validated rectangular level layout. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// Builds a grid from row-major tile rows.
    ///
    /// Rejects empty grids, rows of differing length and grids without exactly
    /// one player spawn.
    pub fn from_rows(rows: Vec<Vec<TileKind>>) -> Result<Self, LevelError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(LevelError::Empty);
        }

        for (index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(LevelError::RaggedRow {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
        }

        let too_large = LevelError::TooLarge {
            columns: expected,
            rows: rows.len(),
        };
        let columns = u32::try_from(expected).map_err(|_| too_large.clone())?;
        let row_count = u32::try_from(rows.len()).map_err(|_| too_large)?;

        let cells: Vec<TileKind> = rows.into_iter().flatten().collect();
        let spawns = cells
            .iter()
            .filter(|kind| **kind == TileKind::PlayerSpawn)
            .count();
        match spawns {
            0 => return Err(LevelError::MissingPlayerSpawn),
            1 => {}
            count => return Err(LevelError::DuplicatePlayerSpawn { count }),
        }

        Ok(Self {
            columns,
            rows: row_count,
            cells,
        })
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

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile kind stored at the cell, if it lies inside the grid.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> Option<TileKind> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        self.cells.get(row * width + column).copied()
    }

    /// Reports whether the cell is a wall. Cells outside the grid are not walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.kind_at(cell) == Some(TileKind::Wall)
    }

    /// Iterates every cell in row-major order together with its kind.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + '_ {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| {
            (0..columns).filter_map(move |column| {
                let cell = CellCoord::new(column, row);
                self.kind_at(cell).map(|kind| (cell, kind))
            })
        })
    }

    /// Counts the cells of the provided kind.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|candidate| **candidate == kind).count()
    }

    /// Cell that marks the player's start.
    #[must_use]
    pub fn player_spawn(&self) -> Option<CellCoord> {
        self.iter()
            .find(|(_, kind)| *kind == TileKind::PlayerSpawn)
            .map(|(cell, _)| cell)
    }
}

/// Passability graph derived from a tile grid.
///
/// Maps each cell to its passable orthogonal neighbors and records the blocked
/// cells separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridGraph {
    adjacency: BTreeMap<CellCoord, Vec<CellCoord>>,
    obstacles: BTreeSet<CellCoord>,
}

impl GridGraph {
    /// Assembles a graph from prepared adjacency lists and obstacles.
    #[must_use]
    pub fn from_parts(
        adjacency: BTreeMap<CellCoord, Vec<CellCoord>>,
        obstacles: BTreeSet<CellCoord>,
    ) -> Self {
        Self {
            adjacency,
            obstacles,
        }
    }

    /// Passable neighbors of the cell; empty for obstacles and unknown cells.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> &[CellCoord] {
        self.adjacency.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reports whether the cell belongs to the graph.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.adjacency.contains_key(&cell)
    }

    /// Reports whether the cell is blocked.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellCoord) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Iterates all cells known to the graph in ascending order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.adjacency.keys().copied()
    }

    /// Iterates the blocked cells in ascending order.
    pub fn obstacles(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.obstacles.iter().copied()
    }

    /// Number of cells in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Reports whether the graph has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}
