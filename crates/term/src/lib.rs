//! Terminal renderer for the collapse board.
//!
//! Renders into a plain framebuffer that is flushed to the terminal with
//! run-length diffing. No widget toolkit is involved:
//! - [`GameView`] is pure and maps a board snapshot to cells
//! - [`TerminalRenderer`] owns the terminal and does the I/O
//! - Board cells are two terminal columns wide to look roughly square

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_collapse_core as core;
pub use tui_collapse_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{color_rgb, tier_glyph, AdapterStatusView, AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
