//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::server::{is_disabled, run_server, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// A controller command to apply and ack
    Command(ClientCommand),
    /// A freshly handshaken client wants the current observation
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Select { column: i32, row: i32 },
    Reset,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// Sent to clients streaming observations
    Broadcast { line: String },
    /// Sent to clients streaming events
    BroadcastEvent { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: std::net::SocketAddr,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `COLLAPSE_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if is_disabled() {
            info!("adapter disabled by environment");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Bind the server and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server = rt.spawn(run_server(config, cmd_tx, out_rx, Some(ready_tx)));

        let local_addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            // The server dropped `ready_tx` without sending: it failed to bind.
            Err(_) => {
                let err = match rt.block_on(server) {
                    Ok(Err(e)) => e,
                    Ok(Ok(())) => anyhow::anyhow!("adapter server exited before listening"),
                    Err(join) => anyhow::anyhow!(join),
                };
                return Err(err.context("failed to start adapter server"));
            }
        };

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}
