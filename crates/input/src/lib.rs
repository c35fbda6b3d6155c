//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into [`crate::types::PlayerAction`]
//! and keeps the keyboard cursor. Independent of any UI framework.

pub mod cursor;
pub mod map;

pub use tui_collapse_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, handle_mouse_event, should_quit};
