//! GameView: maps a [`BoardSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::BoardSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{BoardState, ColorType, Coord, Tier};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// What the side panel shows about the TCP adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(235, 235, 235);

const PALETTE: [Rgb; 8] = [
    Rgb::new(220, 80, 80),
    Rgb::new(80, 200, 120),
    Rgb::new(80, 140, 230),
    Rgb::new(240, 210, 80),
    Rgb::new(200, 120, 220),
    Rgb::new(80, 220, 220),
    Rgb::new(255, 165, 0),
    Rgb::new(180, 180, 180),
];

/// Palette entry for a tile color. Colors past the palette wrap around.
pub fn color_rgb(color: ColorType) -> Rgb {
    PALETTE[color.index() % PALETTE.len()]
}

/// Denser glyphs for larger clusters.
pub fn tier_glyph(tier: Tier) -> char {
    match tier {
        Tier::Tier1 => '░',
        Tier::Tier2 => '▒',
        Tier::Tier3 => '▓',
        Tier::Tier4 => '█',
    }
}

/// Where the bordered board frame sits in the viewport.
#[derive(Debug, Clone, Copy)]
struct Layout {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

/// A lightweight terminal renderer for the collapse board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 compensates for the usual terminal glyph aspect ratio.
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn layout(&self, columns: u8, rows: u8, viewport: Viewport) -> Layout {
        let w = (columns as u16) * self.cell_w + 2;
        let h = (rows as u16) * self.cell_h + 2;
        let x = viewport.width.saturating_sub(w) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(h) / 2,
            AnchorY::Top => 0,
        };
        Layout { x, y, w, h }
    }

    /// Board cell under terminal position `(x, y)`, if any.
    ///
    /// Uses the same layout as rendering, so a click maps back to the tile
    /// drawn under it.
    pub fn cell_at(&self, columns: u8, rows: u8, viewport: Viewport, x: u16, y: u16) -> Option<Coord> {
        let layout = self.layout(columns, rows, viewport);
        let dx = x.checked_sub(layout.x + 1)?;
        let dy = y.checked_sub(layout.y + 1)?;
        let column = dx / self.cell_w;
        let from_top = dy / self.cell_h;
        if column >= columns as u16 || from_top >= rows as u16 {
            return None;
        }
        let row = rows as u16 - 1 - from_top;
        Some(Coord::new(column as u8, row as u8))
    }

    /// Render into an existing framebuffer.
    ///
    /// Callers can reuse one framebuffer across frames; it is only resized
    /// when the viewport changes.
    pub fn render_into(
        &self,
        snap: &BoardSnapshot,
        cursor: Option<Coord>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        self.render_into_with_adapter(snap, cursor, None, viewport, fb);
    }

    pub fn render_into_with_adapter(
        &self,
        snap: &BoardSnapshot,
        cursor: Option<Coord>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let layout = self.layout(snap.columns, snap.rows, viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(
            layout.x + 1,
            layout.y + 1,
            layout.w.saturating_sub(2),
            layout.h.saturating_sub(2),
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG),
        );
        draw_border(fb, layout, border);

        for row in 0..snap.rows {
            for column in 0..snap.columns {
                let at = Coord::new(column, row);
                let selected = cursor == Some(at);
                match snap.get(column as i32, row as i32) {
                    Some(cell) => {
                        let style = CellStyle {
                            fg: color_rgb(cell.color),
                            bg: if selected { CURSOR_BG } else { BOARD_BG },
                            bold: cell.tier == Tier::Tier4,
                            dim: false,
                        };
                        self.fill_cell(fb, layout, snap.rows, at, tier_glyph(cell.tier), style);
                    }
                    None => {
                        let style = CellStyle {
                            fg: Rgb::new(90, 90, 100),
                            bg: if selected { CURSOR_BG } else { BOARD_BG },
                            bold: false,
                            dim: true,
                        };
                        self.fill_cell(fb, layout, snap.rows, at, '·', style);
                    }
                }
            }
        }

        self.draw_side_panel(fb, snap, adapter, viewport, layout);

        if snap.state == BoardState::Deadlocked {
            draw_overlay_text(fb, layout, "NO MOVES");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &BoardSnapshot, cursor: Option<Coord>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, cursor, viewport, &mut fb);
        fb
    }

    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        layout: Layout,
        rows: u8,
        at: Coord,
        ch: char,
        style: CellStyle,
    ) {
        // Row 0 is drawn at the bottom of the frame.
        let from_top = (rows - 1 - at.row) as u16;
        let px = layout.x + 1 + at.column as u16 * self.cell_w;
        let py = layout.y + 1 + from_top * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &BoardSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        layout: Layout,
    ) {
        let panel_x = layout.x.saturating_add(layout.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle {
            bold: true,
            ..CellStyle::default()
        };
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = CellStyle { dim: true, ..value };

        let mut y = layout.y;
        fb.put_str(panel_x, y, "STATE", label);
        y += 1;
        fb.put_str(panel_x, y, snap.state.as_str(), value);
        y += 2;

        fb.put_str(panel_x, y, "MOVES", label);
        y += 1;
        fb.put_u32(panel_x, y, snap.moves, value);
        y += 2;

        fb.put_str(panel_x, y, "BOARD", label);
        y += 1;
        fb.put_char(panel_x, y, '#', dim);
        fb.put_u32(panel_x + 1, y, snap.board_id, value);
        y += 2;

        fb.put_str(panel_x, y, "COLORS", label);
        y += 1;
        for c in 0..snap.color_count.min(PALETTE.len() as u8) {
            let swatch = CellStyle::new(color_rgb(ColorType(c)), Rgb::new(0, 0, 0));
            fb.put_char(panel_x + c as u16 * 2, y, '█', swatch);
        }
        y += 2;

        fb.put_str(panel_x, y, "TIERS", label);
        y += 1;
        let mut x = panel_x;
        for (glyph, max) in Tier::ALL.iter().map(|&t| tier_glyph(t)).zip(snap.thresholds) {
            fb.put_char(x, y, glyph, value);
            x += 1 + fb.put_u32(x + 1, y, max, dim) + 1;
        }
        fb.put_char(x, y, tier_glyph(Tier::Tier4), value);
        fb.put_char(x + 1, y, '+', dim);
        y += 2;

        fb.put_str(panel_x, y, "AI", label);
        y += 1;
        match adapter {
            Some(st) => {
                fb.put_char(panel_x, y, ':', value);
                fb.put_u32(panel_x + 1, y, st.port as u32, value);
            }
            None => fb.put_str(panel_x, y, "OFF", value),
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, layout: Layout, style: CellStyle) {
    let Layout { x, y, w, h } = layout;
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, layout: Layout, text: &str) {
    let mid_y = layout.y.saturating_add(layout.h / 2);
    let text_w = text.chars().count() as u16;
    let x = layout.x.saturating_add(layout.w.saturating_sub(text_w) / 2);
    let style = CellStyle {
        fg: Rgb::new(255, 255, 255),
        bg: Rgb::new(0, 0, 0),
        bold: true,
        dim: false,
    };
    fb.put_str(x, mid_y, text, style);
}
