use tui_collapse::core::{Board, LevelConfig};
use tui_collapse::term::{color_rgb, tier_glyph, AnchorY, FrameBuffer, GameView, Viewport};
use tui_collapse::types::{BoardState, Coord};

#[test]
fn game_view_draws_every_tile_of_a_seeded_board() {
    let board = Board::with_seed(LevelConfig::default(), 2024);
    let snap = board.snapshot();
    assert_eq!(snap.state, BoardState::Interactive);
    // Exactly the bordered board: 5 cells of 2 columns plus the border.
    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let fb = view.render(&snap, None, Viewport::new(12, 7));
    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(11, 6).unwrap().ch, '┘');

    for row in 0..snap.rows {
        for column in 0..snap.columns {
            let tile = snap.get(column as i32, row as i32).unwrap();
            // Cells are 2 wide inside a 1-cell border; row 0 is the bottom row.
            let x = 1 + column as u16 * 2;
            let y = 1 + (snap.rows - 1 - row) as u16;
            let cell = fb.get(x, y).unwrap();
            assert_eq!(cell.ch, tier_glyph(tile.tier));
            assert_eq!(cell.style.fg, color_rgb(tile.color));
            assert_eq!(fb.get(x + 1, y).unwrap().ch, cell.ch);
        }
    }
}

#[test]
fn game_view_render_into_reuses_framebuffer() {
    let board = Board::with_seed(LevelConfig::default(), 5);
    let snap = board.snapshot();
    let view = GameView::default();

    let mut fb = FrameBuffer::new(0, 0);
    view.render_into(&snap, Some(Coord::new(0, 0)), Viewport::new(50, 16), &mut fb);
    assert_eq!((fb.width(), fb.height()), (50, 16));
    let first = fb.clone();

    view.render_into(&snap, Some(Coord::new(0, 0)), Viewport::new(50, 16), &mut fb);
    assert_eq!(fb, first);
}

#[test]
fn game_view_click_maps_to_rendered_tile() {
    let board = Board::with_seed(LevelConfig::default(), 77);
    let snap = board.snapshot();
    assert_eq!(snap.state, BoardState::Interactive);
    let view = GameView::default();
    let viewport = Viewport::new(48, 18);
    let fb = view.render(&snap, None, viewport);

    let mut hits = 0;
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            if let Some(at) = view.cell_at(snap.columns, snap.rows, viewport, x, y) {
                let tile = snap.get(at.column as i32, at.row as i32).unwrap();
                assert_eq!(fb.get(x, y).unwrap().ch, tier_glyph(tile.tier));
                hits += 1;
            }
        }
    }
    assert_eq!(hits, snap.columns as usize * snap.rows as usize * 2);
}
