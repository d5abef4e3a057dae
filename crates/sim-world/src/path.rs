//! Road network queries. Not used by the simulation tick.

use crate::grid::Grid;
use crate::Pos;
use pathfinding::prelude::{astar, bfs_reach};
use std::collections::BTreeSet;

/// Shortest 4-neighbour path from `start` to `goal` stepping only on road cells.
///
/// `start` itself may be any cell, so a path can begin at a building next to
/// the network. Returns the cells visited, both ends included.
pub fn find_road_path(grid: &Grid, start: Pos, goal: Pos) -> Option<Vec<Pos>> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }
    astar(
        &start,
        |p| {
            grid.neighbors4(*p)
                .into_iter()
                .filter(|n| grid.is_road(*n))
                .map(|n| (n, 1u32))
        },
        |p| p.manhattan(goal),
        |p| *p == goal,
    )
    .map(|(path, _cost)| path)
}

/// All road cells connected to `start`, including it. Empty if `start` is not a road.
pub fn road_component(grid: &Grid, start: Pos) -> BTreeSet<Pos> {
    if !grid.is_road(start) {
        return BTreeSet::new();
    }
    bfs_reach(start, |p| {
        grid.neighbors4(*p)
            .into_iter()
            .filter(|n| grid.is_road(*n))
    })
    .collect()
}
