//! Adapter - AI control via TCP socket with a JSON protocol
//!
//! External agents connect over TCP, observe the board and, when they hold
//! control, select tiles or reset the board.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: client connects (default: 127.0.0.1:7777)
//! 2. **Handshake**: client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: first client to hello becomes the controller
//! 4. **Observation Streaming**: after every board change the server sends
//!    an `observation` to clients that asked for one
//! 5. **Event Streaming**: clients that set `stream_events` receive one
//!    `event` per board event, in emission order
//! 6. **Commanding**: the controller sends `select` or `reset` commands
//!
//! # Environment Variables
//!
//! - `COLLAPSE_AI_HOST`: bind address (default: "127.0.0.1")
//! - `COLLAPSE_AI_PORT`: port number (default: 7777)
//! - `COLLAPSE_AI_MAX_PENDING`: command queue depth (default: 10)
//! - `COLLAPSE_AI_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_observations":true}}
//! S: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! S: {"type":"observation","seq":1,"ts":...,"state":"interactive","board":{"columns":5,"rows":5,"cells":[...]},...}
//! C: {"type":"command","seq":2,"ts":0,"action":"select","column":0,"row":0}
//! S: {"type":"ack","seq":2,"ts":...,"status":"ok","removed":3}
//! ```
//!
//! # Threading
//!
//! The server runs on its own tokio runtime ([`runtime::Adapter`]). The
//! game loop polls commands, applies them through [`bridge::Bridge`] and
//! hands the resulting lines back to the server.

pub use tui_collapse_core as core;
pub use tui_collapse_types as types;

pub mod bridge;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use bridge::Bridge;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, PROTOCOL_VERSION};
