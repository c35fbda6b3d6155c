//! Board scenarios: scripted boards with known outcomes.

use tui_collapse::core::{Board, Grid, LevelConfig, ScriptedColors, SelectOutcome};
use tui_collapse::types::{BoardEvent, BoardState, ColorType, Coord, Tier};

fn colors(v: &[u8]) -> Vec<ColorType> {
    v.iter().map(|&c| ColorType(c)).collect()
}

fn tier_at(board: &Board<ScriptedColors>, column: i32, row: i32) -> Tier {
    board.grid().get(column, row).map(|t| t.tier()).unwrap()
}

#[test]
fn single_color_board_is_one_tier4_cluster() {
    let level = LevelConfig::new(3, 3, 1, 1, 3, 5).unwrap();
    let mut board = Board::with_seed(level, 99);

    assert_eq!(board.state(), BoardState::Interactive);
    assert_eq!(board.cluster_at(1, 1).map(|c| c.len()), Some(9));
    for tile in board.grid().tiles() {
        assert_eq!(tile.color(), ColorType(0));
        assert_eq!(tile.tier(), Tier::Tier4);
    }

    let events = board.take_events();
    let spawned = events
        .iter()
        .filter(|e| matches!(e, BoardEvent::TileSpawned { .. }))
        .count();
    let tiered = events
        .iter()
        .filter(|e| matches!(e, BoardEvent::TileTierChanged { tier: Tier::Tier4, .. }))
        .count();
    assert_eq!(spawned, 9);
    assert_eq!(tiered, 9);
    assert_eq!(events.last(), Some(&BoardEvent::BoardSettled));
}

#[test]
fn distinct_colors_deadlock_without_tier_changes() {
    let level = LevelConfig::new(2, 2, 4, 2, 4, 5).unwrap();
    let grid = Grid::from_colors(2, 2, &colors(&[0, 1, 2, 3])).unwrap();
    let mut board = Board::with_grid(level, grid, ScriptedColors::new([0])).unwrap();

    assert_eq!(board.state(), BoardState::Deadlocked);
    let events = board.take_events();
    assert!(!events
        .iter()
        .any(|e| matches!(e, BoardEvent::TileTierChanged { .. })));
    assert_eq!(events.last(), Some(&BoardEvent::BoardDeadlocked));

    // Selections are rejected until reset.
    assert_eq!(
        board.select(0, 0),
        SelectOutcome::NotInteractive(BoardState::Deadlocked)
    );
    assert!(board.take_events().is_empty());
}

#[test]
fn four_tile_cluster_resolves_and_refills() {
    // row 2: 2 3 2
    // row 1: 0 0 3
    // row 0: 0 0 1
    let level = LevelConfig::new(3, 3, 4, 2, 4, 6).unwrap();
    let grid = Grid::from_colors(3, 3, &colors(&[0, 0, 1, 0, 0, 3, 2, 3, 2])).unwrap();
    let mut board = Board::with_grid(level, grid, ScriptedColors::new([1, 2, 3, 1])).unwrap();
    board.take_events();

    for (c, r) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(tier_at(&board, c, r), Tier::Tier2);
    }
    assert_eq!(tier_at(&board, 2, 0), Tier::Tier1);

    assert_eq!(board.select(1, 1), SelectOutcome::Resolved { removed: 4 });
    assert_eq!(board.moves(), 1);
    assert!(board.grid().is_full());
    assert!(board.grid().is_consistent());

    // row 2: 2 1 2
    // row 1: 1 3 3
    // row 0: 2 3 1
    let expected = [2, 3, 1, 1, 3, 3, 2, 1, 2];
    for (i, &c) in expected.iter().enumerate() {
        let (column, row) = ((i % 3) as i32, (i / 3) as i32);
        assert_eq!(
            board.grid().get(column, row).map(|t| t.color()),
            Some(ColorType(c)),
            "color at ({column}, {row})"
        );
    }
    assert_eq!(tier_at(&board, 1, 0), Tier::Tier2);
    assert_eq!(tier_at(&board, 2, 1), Tier::Tier2);
    assert_eq!(tier_at(&board, 0, 0), Tier::Tier1);
    assert_eq!(board.state(), BoardState::Interactive);

    let events = board.take_events();
    let kinds: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
    assert_eq!(&kinds[..4], &["tile_removed"; 4]);
    assert_eq!(&kinds[4..8], &["tile_spawned"; 4]);
    assert_eq!(&kinds[8..14], &["tile_repositioned"; 6]);
    assert_eq!(&kinds[14..17], &["tile_tier_changed"; 3]);
    assert_eq!(kinds[17..], ["board_settled"]);

    let spawn_coords: Vec<Coord> = events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::TileSpawned { at, .. } => Some(*at),
            _ => None,
        })
        .collect();
    assert_eq!(
        spawn_coords,
        vec![
            Coord::new(0, 3),
            Coord::new(0, 4),
            Coord::new(1, 3),
            Coord::new(1, 4)
        ]
    );
}

#[test]
fn survivors_keep_their_vertical_order() {
    // row 3: 0 3
    // row 2: 2 3
    // row 1: 1 2
    // row 0: 0 0
    let level = LevelConfig::new(4, 2, 4, 2, 4, 6).unwrap();
    let grid = Grid::from_colors(2, 4, &colors(&[0, 0, 1, 2, 2, 3, 0, 3])).unwrap();
    let mut board = Board::with_grid(level, grid, ScriptedColors::new([1, 1])).unwrap();

    let ids_before: Vec<_> = (1..4)
        .map(|r| board.grid().get(0, r).map(|t| t.id()).unwrap())
        .collect();
    assert!(board.select(0, 0).is_resolved());
    let ids_after: Vec<_> = (0..3)
        .map(|r| board.grid().get(0, r).map(|t| t.id()).unwrap())
        .collect();
    assert_eq!(ids_before, ids_after);
}

#[test]
fn isolated_tile_selection_emits_nothing() {
    let level = LevelConfig::new(2, 2, 4, 2, 4, 5).unwrap();
    let grid = Grid::from_colors(2, 2, &colors(&[0, 0, 1, 2])).unwrap();
    let mut board = Board::with_grid(level, grid, ScriptedColors::new([3])).unwrap();
    board.take_events();

    assert_eq!(board.select(1, 1), SelectOutcome::TooSmall { size: 1 });
    assert_eq!(board.select(5, 0), SelectOutcome::NoTile);
    assert_eq!(board.select(0, -1), SelectOutcome::NoTile);
    assert!(board.take_events().is_empty());
    assert_eq!(board.moves(), 0);
}

#[test]
fn reset_deals_a_fresh_board() {
    let level = LevelConfig::new(2, 2, 4, 2, 4, 5).unwrap();
    let grid = Grid::from_colors(2, 2, &colors(&[0, 1, 2, 3])).unwrap();
    let mut board = Board::with_grid(level, grid, ScriptedColors::new([1, 1, 1, 1])).unwrap();
    board.take_events();

    board.reset();
    assert_eq!(board.board_id(), 1);
    assert_eq!(board.state(), BoardState::Interactive);
    let events = board.take_events();
    assert_eq!(events.first(), Some(&BoardEvent::BoardReset));
    // Fresh tiles do not reuse ids from the previous board.
    for e in &events {
        if let BoardEvent::TileSpawned { id, .. } = e {
            assert!(id.0 >= 4);
        }
    }
}

#[test]
fn min_match_three_ignores_pairs() {
    let level = LevelConfig::new(2, 2, 4, 2, 4, 5)
        .unwrap()
        .with_min_match(3)
        .unwrap();
    let grid = Grid::from_colors(2, 2, &colors(&[0, 0, 1, 2])).unwrap();
    let mut board = Board::with_grid(level, grid, ScriptedColors::new([0])).unwrap();
    assert_eq!(board.state(), BoardState::Deadlocked);
    assert!(matches!(
        board.select(0, 0),
        SelectOutcome::NotInteractive(BoardState::Deadlocked)
    ));
}
