#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted best-first search over a level's passability graph.
//!
//! The frontier is ordered by the Manhattan distance to the goal plus a
//! weighted penalty on the length of the partial path. The travelled cost is
//! not part of the priority, so results favour short paths without being
//! guaranteed optimal.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, BinaryHeap},
};

use shooter_core::{CellCoord, GridGraph};

/// Tuning for the search priority.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathfinderConfig {
    /// Multiplier applied to the number of cells in a partial path.
    pub weight: f32,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self { weight: 0.1 }
    }
}

/// Search engine that keeps its scratch buffers between queries.
#[derive(Debug)]
pub struct Pathfinder {
    config: PathfinderConfig,
    nodes: Vec<SearchNode>,
    frontier: BinaryHeap<FrontierEntry>,
    visited: BTreeSet<CellCoord>,
    next_sequence: u64,
}

impl Pathfinder {
    /// Creates a pathfinder using the provided tuning.
    #[must_use]
    pub fn new(config: PathfinderConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            visited: BTreeSet::new(),
            next_sequence: 0,
        }
    }

    /// Tuning the pathfinder was created with.
    #[must_use]
    pub fn config(&self) -> PathfinderConfig {
        self.config
    }

    /// Finds a path of cells from `start` to `goal`, both inclusive.
    ///
    /// Returns an empty path when the goal cannot be reached or when either
    /// endpoint is blocked or unknown to the graph. Entries with equal priority
    /// leave the frontier in insertion order, and a cell is closed the first
    /// time it is popped.
    pub fn search(&mut self, graph: &GridGraph, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
        if !is_walkable(graph, start) || !is_walkable(graph, goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        self.reset();
        self.push(start, goal, None, 1);

        while let Some(entry) = self.frontier.pop() {
            let Some(node) = self.nodes.get(entry.node).copied() else {
                continue;
            };
            if !self.visited.insert(node.cell) {
                continue;
            }
            if node.cell == goal {
                return self.reconstruct(entry.node);
            }

            for neighbor in graph.neighbors(node.cell) {
                if graph.is_obstacle(*neighbor) || self.visited.contains(neighbor) {
                    continue;
                }
                self.push(*neighbor, goal, Some(entry.node), node.length.saturating_add(1));
            }
        }

        Vec::new()
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.frontier.clear();
        self.visited.clear();
        self.next_sequence = 0;
    }

    fn push(&mut self, cell: CellCoord, goal: CellCoord, parent: Option<usize>, length: u32) {
        let priority =
            cell.manhattan_distance(goal) as f32 + self.config.weight * length as f32;
        self.nodes.push(SearchNode {
            cell,
            parent,
            length,
        });
        self.frontier.push(FrontierEntry {
            priority,
            sequence: self.next_sequence,
            node: self.nodes.len() - 1,
        });
        self.next_sequence = self.next_sequence.saturating_add(1);
    }

    fn reconstruct(&self, tail: usize) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut cursor = Some(tail);
        while let Some(index) = cursor {
            let Some(node) = self.nodes.get(index) else {
                break;
            };
            path.push(node.cell);
            cursor = node.parent;
        }
        path.reverse();
        path
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(PathfinderConfig::default())
    }
}

fn is_walkable(graph: &GridGraph, cell: CellCoord) -> bool {
    graph.contains(cell) && !graph.is_obstacle(cell)
}

/// Partial path ending at `cell`, linked to its predecessor by arena index.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: CellCoord,
    parent: Option<usize>,
    /// Number of cells from the start to this node, inclusive.
    length: u32,
}

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    priority: f32,
    sequence: u64,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: lower priority and earlier insertion pop first.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_priorities_pop_in_insertion_order() {
        let mut heap = BinaryHeap::new();
        for sequence in 0..3 {
            heap.push(FrontierEntry {
                priority: 2.0,
                sequence,
                node: sequence as usize,
            });
        }
        heap.push(FrontierEntry {
            priority: 1.5,
            sequence: 3,
            node: 3,
        });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|entry| entry.node)).collect();
        assert_eq!(order, vec![3, 0, 1, 2]);
    }

    #[test]
    fn reconstruct_follows_parent_links() {
        let mut pathfinder = Pathfinder::default();
        pathfinder.push(CellCoord::new(0, 0), CellCoord::new(2, 0), None, 1);
        pathfinder.push(CellCoord::new(1, 0), CellCoord::new(2, 0), Some(0), 2);
        pathfinder.push(CellCoord::new(2, 0), CellCoord::new(2, 0), Some(1), 3);

        assert_eq!(
            pathfinder.reconstruct(2),
            vec![CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)]
        );
    }
}
