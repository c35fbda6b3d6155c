//! Cluster finder - flood fill over 4-connected same-color tiles
//!
//! A cluster is recomputed from the grid on every query and never cached
//! across player actions.

use std::collections::VecDeque;

use crate::grid::Grid;
use crate::types::{ColorType, Coord};

/// A maximal set of same-color tiles reachable from one another through
/// orthogonal steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    color: ColorType,
    /// Members in discovery order; the seed comes first
    members: Vec<Coord>,
}

impl Cluster {
    pub fn color(&self) -> ColorType {
        self.color
    }

    /// Always at least 1: the seed is a member
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Coord] {
        &self.members
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.members.contains(&at)
    }

    pub fn seed(&self) -> Option<Coord> {
        self.members.first().copied()
    }
}

/// Cluster containing the tile at `(column, row)`.
///
/// Returns `None` if the cell is empty or out of bounds.
///
/// # Examples
///
/// ```
/// use tui_collapse_core::{find_cluster, Grid};
/// use tui_collapse_types::ColorType;
///
/// // bottom row: 0 0 1, top row: 1 0 1
/// let colors: Vec<ColorType> = [0, 0, 1, 1, 0, 1].iter().map(|&c| ColorType(c)).collect();
/// let grid = Grid::from_colors(3, 2, &colors).unwrap();
///
/// assert_eq!(find_cluster(&grid, 0, 0).unwrap().len(), 3);
/// assert_eq!(find_cluster(&grid, 2, 1).unwrap().len(), 2);
/// assert_eq!(find_cluster(&grid, 0, 1).unwrap().len(), 1);
/// assert!(find_cluster(&grid, 3, 0).is_none());
/// ```
pub fn find_cluster(grid: &Grid, column: i32, row: i32) -> Option<Cluster> {
    let seed = grid.get(column, row)?.position();
    let mut visited = vec![false; grid.cell_count()];
    Some(flood(grid, seed, &mut visited))
}

/// Partition every live tile into clusters.
///
/// Each tile lands in exactly one cluster; clusters are ordered by their
/// lowest flat index.
pub fn partition(grid: &Grid) -> Vec<Cluster> {
    let mut visited = vec![false; grid.cell_count()];
    let mut clusters = Vec::new();
    for idx in 0..grid.cell_count() {
        if visited[idx] {
            continue;
        }
        if let Some(tile) = grid.get_index(idx) {
            clusters.push(flood(grid, tile.position(), &mut visited));
        }
    }
    clusters
}

/// Breadth-first fill from `seed`. `visited` is indexed by flat cell index
/// and may carry marks from disjoint earlier fills.
fn flood(grid: &Grid, seed: Coord, visited: &mut [bool]) -> Cluster {
    let color = match grid.get_at(seed) {
        Some(tile) => tile.color(),
        None => {
            return Cluster {
                color: ColorType(0),
                members: Vec::new(),
            }
        }
    };

    let mut members = Vec::new();
    let mut queue = VecDeque::new();
    if let Some(idx) = grid.index(seed.column as i32, seed.row as i32) {
        visited[idx] = true;
    }
    members.push(seed);
    queue.push_back(seed);

    while let Some(at) = queue.pop_front() {
        for next in grid.neighbors(at) {
            let Some(idx) = grid.index(next.column as i32, next.row as i32) else {
                continue;
            };
            if visited[idx] {
                continue;
            }
            if grid.get_index(idx).map(|t| t.color()) == Some(color) {
                visited[idx] = true;
                members.push(next);
                queue.push_back(next);
            }
        }
    }

    Cluster { color, members }
}
