//! Grid storage and cluster search through the facade crate.

use tui_collapse::core::{find_cluster, partition, ConfigError, Grid, Tile};
use tui_collapse::types::{ColorType, Coord, TileId};

fn grid(columns: u8, rows: u8, v: &[u8]) -> Grid {
    let colors: Vec<ColorType> = v.iter().map(|&c| ColorType(c)).collect();
    Grid::from_colors(columns, rows, &colors).unwrap()
}

#[test]
fn test_grid_out_of_bounds_reads_are_none() {
    let g = grid(3, 2, &[0, 1, 2, 3, 0, 1]);
    assert!(g.get(-1, 0).is_none());
    assert!(g.get(0, -1).is_none());
    assert!(g.get(3, 0).is_none());
    assert!(g.get(0, 2).is_none());
    assert_eq!(g.get(2, 1).map(|t| t.color()), Some(ColorType(1)));
    assert_eq!(g.index(2, 1), Some(5));
}

#[test]
fn test_grid_from_colors_rejects_wrong_length() {
    let colors = [ColorType(0); 3];
    assert!(matches!(
        Grid::from_colors(2, 2, &colors),
        Err(ConfigError::GridIncomplete { column: 1, row: 1 })
    ));
    let colors = [ColorType(0); 5];
    assert!(Grid::from_colors(2, 2, &colors).is_err());
}

#[test]
fn test_grid_remove_and_set() {
    let mut g = grid(2, 2, &[0, 1, 2, 3]);
    let tile = g.remove(1, 0).unwrap();
    assert_eq!(tile.id(), TileId(1));
    assert!(g.get(1, 0).is_none());
    assert!(!g.is_full());
    assert_eq!(g.occupied(), 3);

    g.set(1, 0, Tile::new(TileId(9), ColorType(2), Coord::new(1, 0)));
    assert!(g.is_full());
    assert!(g.is_consistent());
}

#[test]
#[should_panic(expected = "already holds")]
fn test_grid_set_occupied_panics() {
    let mut g = grid(2, 2, &[0, 1, 2, 3]);
    g.set(0, 0, Tile::new(TileId(9), ColorType(2), Coord::new(0, 0)));
}

#[test]
fn test_cluster_is_orthogonal_only() {
    // row 1: 1 0
    // row 0: 0 1
    let g = grid(2, 2, &[0, 1, 1, 0]);
    for (c, r) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(find_cluster(&g, c, r).map(|cl| cl.len()), Some(1));
    }
}

#[test]
fn test_cluster_wraps_around_corners() {
    // row 2: 0 0 0
    // row 1: 0 1 0
    // row 0: 0 1 0
    let g = grid(3, 3, &[0, 1, 0, 0, 1, 0, 0, 0, 0]);
    let ring = find_cluster(&g, 2, 0).unwrap();
    assert_eq!(ring.len(), 7);
    assert_eq!(ring.color(), ColorType(0));
    assert_eq!(ring.seed(), Some(Coord::new(2, 0)));
    assert!(!ring.contains(Coord::new(1, 1)));

    let stem = find_cluster(&g, 1, 1).unwrap();
    assert_eq!(stem.len(), 2);
    assert!(find_cluster(&g, 3, 0).is_none());
}

#[test]
fn test_partition_covers_each_cell_once() {
    let g = grid(3, 3, &[0, 1, 0, 0, 1, 0, 0, 0, 0]);
    let clusters = partition(&g);
    assert_eq!(clusters.len(), 2);
    let mut seen: Vec<Coord> = clusters.iter().flat_map(|c| c.members().to_vec()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 9);
}
