//! Static navigation data derived from a level grid once per activation.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use shooter_core::{CellCoord, GridGraph, Segment, TileGrid, TileKind};

/// Builds the 4-connected passability graph for the grid.
///
/// Wall cells are recorded as obstacles and receive no neighbors. Every other
/// cell lists its in-bounds orthogonal neighbors that are not walls, in north,
/// east, south, west order.
#[must_use]
pub fn build_graph(grid: &TileGrid) -> GridGraph {
    let mut adjacency = BTreeMap::new();
    let mut obstacles = BTreeSet::new();

    for (cell, kind) in grid.iter() {
        if kind == TileKind::Wall {
            let _ = obstacles.insert(cell);
            let _ = adjacency.insert(cell, Vec::new());
            continue;
        }

        let passable = neighbors(cell, grid.columns(), grid.rows())
            .filter(|neighbor| !grid.is_wall(*neighbor))
            .collect();
        let _ = adjacency.insert(cell, passable);
    }

    GridGraph::from_parts(adjacency, obstacles)
}

/// Collects the wall edges that border open floor or the level boundary.
///
/// Edges shared by two wall cells are skipped because no sight line can reach
/// them without first crossing an exposed edge.
#[must_use]
pub fn wall_boundary_edges(grid: &TileGrid, tile_length: f32) -> Vec<Segment> {
    let mut edges = Vec::new();

    for (cell, kind) in grid.iter() {
        if kind != TileKind::Wall {
            continue;
        }

        let left = cell.column() as f32 * tile_length;
        let top = cell.row() as f32 * tile_length;
        let right = left + tile_length;
        let bottom = top + tile_length;

        let north = cell
            .row()
            .checked_sub(1)
            .map(|row| CellCoord::new(cell.column(), row));
        let east = Some(CellCoord::new(cell.column().saturating_add(1), cell.row()));
        let south = Some(CellCoord::new(cell.column(), cell.row().saturating_add(1)));
        let west = cell
            .column()
            .checked_sub(1)
            .map(|column| CellCoord::new(column, cell.row()));

        let sides = [
            (north, Vec2::new(left, top), Vec2::new(right, top)),
            (east, Vec2::new(right, top), Vec2::new(right, bottom)),
            (south, Vec2::new(right, bottom), Vec2::new(left, bottom)),
            (west, Vec2::new(left, bottom), Vec2::new(left, top)),
        ];

        for (neighbor, start, end) in sides {
            let covered = neighbor.is_some_and(|neighbor| grid.is_wall(neighbor));
            if !covered {
                edges.push(Segment::new(start, end));
            }
        }
    }

    edges
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: TileKind = TileKind::Empty;
    const W: TileKind = TileKind::Wall;
    const P: TileKind = TileKind::PlayerSpawn;
    const M: TileKind = TileKind::MobSpawn;

    fn grid(rows: Vec<Vec<TileKind>>) -> TileGrid {
        TileGrid::from_rows(rows).expect("valid test grid")
    }

    #[test]
    fn walls_become_obstacles_without_neighbors() {
        let grid = grid(vec![vec![W, W, W], vec![W, P, E], vec![W, W, W]]);
        let graph = build_graph(&grid);

        assert_eq!(graph.len(), 9);
        assert_eq!(graph.obstacles().count(), 7);
        assert!(graph.obstacles().all(|cell| grid.is_wall(cell)));
        assert!(graph.is_obstacle(CellCoord::new(0, 0)));
        assert!(graph.neighbors(CellCoord::new(0, 0)).is_empty());
        assert_eq!(
            graph.neighbors(CellCoord::new(1, 1)),
            &[CellCoord::new(2, 1)]
        );
        assert_eq!(
            graph.neighbors(CellCoord::new(2, 1)),
            &[CellCoord::new(1, 1)]
        );
    }

    #[test]
    fn neighbors_are_in_bounds_and_never_obstacles() {
        let grid = grid(vec![
            vec![E, W, E, E],
            vec![E, E, W, M],
            vec![W, P, E, E],
        ]);
        let graph = build_graph(&grid);

        for cell in graph.cells() {
            for neighbor in graph.neighbors(cell) {
                assert!(grid.contains(*neighbor), "{neighbor:?} is out of bounds");
                assert!(
                    !graph.is_obstacle(*neighbor),
                    "{neighbor:?} listed as neighbor of {cell:?} but is blocked"
                );
            }
        }
        assert_eq!(
            graph.neighbors(CellCoord::new(0, 0)),
            &[CellCoord::new(0, 1)]
        );
        assert_eq!(
            graph.neighbors(CellCoord::new(3, 1)),
            &[CellCoord::new(3, 0), CellCoord::new(3, 2)]
        );
    }

    #[test]
    fn shared_wall_edges_are_deduplicated() {
        let grid = grid(vec![vec![W, W], vec![P, E]]);
        let edges = wall_boundary_edges(&grid, 10.0);

        // Two walls side by side expose six of their eight edges.
        assert_eq!(edges.len(), 6);
        assert!(!edges.contains(&Segment::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0))));
        assert!(edges.contains(&Segment::new(Vec2::new(10.0, 10.0), Vec2::new(0.0, 10.0))));
    }
}
