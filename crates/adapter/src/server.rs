//! TCP server for the AI adapter
//!
//! Accepts connections, performs the hello/welcome handshake, tracks the
//! controller, and forwards validated commands to the game loop over a
//! bounded channel. Observations, acks and events come back from the game
//! loop as ready-to-write lines.

use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::{BoardSnapshot, SelectOutcome};
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{BoardEvent, Coord};

/// Protocol version spoken by this server. Clients must share the major version.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Pull `"seq": N` out of a line that failed to parse, so the error can echo it.
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `COLLAPSE_AI_HOST`, `COLLAPSE_AI_PORT` and `COLLAPSE_AI_MAX_PENDING`,
    /// falling back to the defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("COLLAPSE_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("COLLAPSE_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("COLLAPSE_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}

/// Check `COLLAPSE_AI_DISABLED` (`1` or `true`)
pub fn is_disabled() -> bool {
    std::env::var("COLLAPSE_AI_DISABLED")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Handle to a connected client
#[derive(Debug)]
struct ClientHandle {
    id: usize,
    handshaken: bool,
    stream_observations: bool,
    stream_events: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<String>,
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Record `seq` if it is strictly greater than the client's last one
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    async fn send_to(&self, client_id: usize, line: String) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(line);
        }
    }

    async fn broadcast(&self, line: &str, wants: impl Fn(&ClientHandle) -> bool) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken && wants(c)) {
            let _ = c.tx.send(line.to_string());
        }
    }
}

fn encode<T: serde::Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to encode adapter message");
            None
        }
    }
}

fn send_error(tx: &mpsc::UnboundedSender<String>, seq: u64, code: ErrorCode, message: &str) {
    if let Some(line) = encode(&create_error(seq, code, message)) {
        let _ = tx.send(line);
    }
}

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up (useful
/// with port 0). Runs until the listener fails.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        state.send_to(client_id, line).await;
                    }
                    OutboundMessage::Broadcast { line } => {
                        state.broadcast(&line, |c| c.stream_observations).await;
                    }
                    OutboundMessage::BroadcastEvent { line } => {
                        state.broadcast(&line, |c| c.stream_events).await;
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        handshaken: false,
        stream_observations: false,
        stream_events: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let result = read_loop(&mut reader, client_id, &state, &command_tx, &tx).await;

    // Remove the client and hand control to the next one, if any.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => info!(client_id = new_id, "controller promoted"),
                None => info!(client_id, "controller released"),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    info!(client_id, %addr, "client disconnected");
    result
}

async fn read_loop(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: &mpsc::Sender<InboundCommand>,
    tx: &mpsc::UnboundedSender<String>,
) -> anyhow::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if !handle_hello(hello, client_id, state, command_tx, tx).await {
                    return Ok(());
                }
            }
            Ok(ParsedMessage::Command(cmd)) => {
                handle_command(cmd, client_id, state, command_tx, tx).await;
            }
            Ok(ParsedMessage::Control(ctrl)) => {
                handle_control(ctrl, client_id, state, tx).await;
            }
            Ok(ParsedMessage::Unknown(msg)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, msg.seq).await
                {
                    send_error(tx, msg.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(tx, msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(
                    tx,
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
            }
        }
    }
}

/// Returns false when the connection should be closed.
async fn handle_hello(
    hello: HelloMessage,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: &mpsc::Sender<InboundCommand>,
    tx: &mpsc::UnboundedSender<String>,
) -> bool {
    if state.is_handshaken(client_id).await
        && !state.check_and_update_seq(client_id, hello.seq).await
    {
        send_error(tx, hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
        return true;
    }

    let major = state
        .config
        .protocol_version
        .split('.')
        .next()
        .unwrap_or("1");
    if hello.protocol_version.split('.').next() != Some(major) {
        send_error(
            tx,
            hello.seq,
            ErrorCode::ProtocolMismatch,
            &format!("Protocol version {} not supported", hello.protocol_version),
        );
        return false;
    }

    {
        let mut clients = state.clients.write().await;
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.handshaken = true;
            client.last_seq = Some(hello.seq);
            client.stream_observations = hello.requested.stream_observations;
            client.stream_events = hello.requested.stream_events;
        }
    }

    let wants_control = !matches!(hello.requested.role, Some(RequestedRole::Observer));
    let (role, controller_id) = {
        let mut controller = state.controller.write().await;
        if controller.is_none() && wants_control {
            *controller = Some(client_id);
            info!(client_id, "client is now controller");
        }
        let role = if *controller == Some(client_id) {
            AssignedRole::Controller
        } else {
            AssignedRole::Observer
        };
        (role, controller.map(|id| id as u64))
    };

    let welcome = create_welcome(
        hello.seq,
        &state.config.protocol_version,
        client_id as u64,
        role,
        controller_id,
    );
    if let Some(line) = encode(&welcome) {
        let _ = tx.send(line);
    }

    if hello.requested.stream_observations
        && command_tx
            .try_send(InboundCommand {
                client_id,
                seq: hello.seq,
                payload: InboundPayload::SnapshotRequest,
            })
            .is_err()
    {
        debug!(client_id, seq = hello.seq, "command queue full, no initial observation");
        send_error(tx, hello.seq, ErrorCode::Backpressure, "Command queue is full");
    }
    true
}

async fn handle_command(
    cmd: CommandMessage,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: &mpsc::Sender<InboundCommand>,
    tx: &mpsc::UnboundedSender<String>,
) {
    if !state.is_handshaken(client_id).await {
        send_error(tx, cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
        return;
    }
    if !state.check_and_update_seq(client_id, cmd.seq).await {
        send_error(tx, cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
        return;
    }
    if !state.is_controller(client_id).await {
        send_error(tx, cmd.seq, ErrorCode::NotController, "Only controller may send commands");
        return;
    }

    let mapped = match map_command(&cmd) {
        Ok(c) => c,
        Err((code, message)) => {
            send_error(tx, cmd.seq, code, &message);
            return;
        }
    };

    // The game loop acks once the command is applied.
    if command_tx
        .try_send(InboundCommand {
            client_id,
            seq: cmd.seq,
            payload: InboundPayload::Command(mapped),
        })
        .is_err()
    {
        debug!(client_id, seq = cmd.seq, "command queue full");
        send_error(tx, cmd.seq, ErrorCode::Backpressure, "Command queue is full");
    }
}

async fn handle_control(
    ctrl: ControlMessage,
    client_id: usize,
    state: &Arc<ServerState>,
    tx: &mpsc::UnboundedSender<String>,
) {
    if !state.is_handshaken(client_id).await {
        send_error(tx, ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
        return;
    }
    if !state.check_and_update_seq(client_id, ctrl.seq).await {
        send_error(tx, ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
        return;
    }

    let mut controller = state.controller.write().await;
    let granted = match ctrl.action {
        ControlAction::Claim if controller.is_none() || *controller == Some(client_id) => {
            *controller = Some(client_id);
            info!(client_id, "controller claimed");
            Ok(())
        }
        ControlAction::Claim => Err((ErrorCode::ControllerActive, "Controller already assigned")),
        ControlAction::Release if *controller == Some(client_id) => {
            *controller = None;
            info!(client_id, "controller released");
            Ok(())
        }
        ControlAction::Release => Err((ErrorCode::NotController, "Only controller may release")),
    };
    drop(controller);

    match granted {
        Ok(()) => {
            if let Some(line) = encode(&create_ack(ctrl.seq)) {
                let _ = tx.send(line);
            }
        }
        Err((code, message)) => send_error(tx, ctrl.seq, code, message),
    }
}

/// Map a protocol command into a board command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.action {
        CommandAction::Select => match (cmd.column, cmd.row) {
            (Some(column), Some(row)) => Ok(ClientCommand::Select { column, row }),
            _ => Err((
                ErrorCode::InvalidCommand,
                "select requires column and row".to_string(),
            )),
        },
        CommandAction::Reset => Ok(ClientCommand::Reset),
    }
}

/// Build an observation from a board snapshot
pub fn build_observation(snapshot: &BoardSnapshot, seq: u64) -> ObservationMessage {
    let mut hasher = Fnv1aHasher::new();
    snapshot.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    let columns = snapshot.columns as i32;
    let cells = (0..snapshot.rows as i32)
        .map(|row| {
            (0..columns)
                .map(|column| {
                    snapshot.get(column, row).map(|cell| CellView {
                        id: cell.id.0,
                        color: cell.color.0,
                        tier: TierLower::from(cell.tier),
                    })
                })
                .collect()
        })
        .collect();

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snapshot.playable(),
        state: BoardStateLower::from(snapshot.state),
        board_id: snapshot.board_id,
        moves: snapshot.moves,
        seed: snapshot.seed,
        board: BoardView {
            columns: snapshot.columns,
            rows: snapshot.rows,
            cells,
        },
        color_count: snapshot.color_count,
        tier_thresholds: snapshot.thresholds,
        min_match: snapshot.min_match,
        state_hash,
    }
}

fn coord_view(at: Coord) -> CoordView {
    CoordView {
        column: at.column,
        row: at.row,
    }
}

/// Build the wire form of one board event
pub fn build_event(event: &BoardEvent, seq: u64) -> EventMessage {
    let mut msg = EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event: EventKind::BoardSettled,
        id: None,
        at: None,
        from: None,
        to: None,
        color: None,
        tier: None,
    };
    match *event {
        BoardEvent::TileSpawned { id, at, color } => {
            msg.event = EventKind::TileSpawned;
            msg.id = Some(id.0);
            msg.at = Some(coord_view(at));
            msg.color = Some(color.0);
        }
        BoardEvent::TileRemoved { id, at } => {
            msg.event = EventKind::TileRemoved;
            msg.id = Some(id.0);
            msg.at = Some(coord_view(at));
        }
        BoardEvent::TileRepositioned { id, from, to } => {
            msg.event = EventKind::TileRepositioned;
            msg.id = Some(id.0);
            msg.from = Some(coord_view(from));
            msg.to = Some(coord_view(to));
        }
        BoardEvent::TileTierChanged { id, at, tier } => {
            msg.event = EventKind::TileTierChanged;
            msg.id = Some(id.0);
            msg.at = Some(coord_view(at));
            msg.tier = Some(TierLower::from(tier));
        }
        BoardEvent::BoardSettled => msg.event = EventKind::BoardSettled,
        BoardEvent::BoardDeadlocked => msg.event = EventKind::BoardDeadlocked,
        BoardEvent::BoardReset => msg.event = EventKind::BoardReset,
    }
    msg
}

/// Acknowledge a select command according to what the board did with it
pub fn ack_for_outcome(seq: u64, outcome: SelectOutcome) -> AckMessage {
    match outcome {
        SelectOutcome::Resolved { removed } => AckMessage {
            removed: Some(removed as u32),
            ..create_ack(seq)
        },
        SelectOutcome::TooSmall { .. } => create_ignored_ack(seq, IgnoreReason::TooSmall),
        SelectOutcome::NoTile => create_ignored_ack(seq, IgnoreReason::NoTile),
        SelectOutcome::NotInteractive(_) => {
            create_ignored_ack(seq, IgnoreReason::NotInteractive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, Grid, LevelConfig, SimpleRng};
    use crate::types::{BoardState, ColorType, TileId, Tier};

    fn small_board() -> Board {
        let level = LevelConfig::new(2, 2, 3, 1, 2, 3).unwrap();
        let colors = [0, 0, 1, 2].map(ColorType);
        let grid = Grid::from_colors(2, 2, &colors).unwrap();
        Board::with_grid(level, grid, SimpleRng::new(3)).unwrap()
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"seq":"x"}"#), None);
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7777);
        assert_eq!(config.max_pending_commands, 10);
        assert!(config.socket_addr().is_ok());
    }

    #[test]
    fn test_map_command_requires_coordinates() {
        let cmd = CommandMessage {
            msg_type: CommandType::Command,
            seq: 1,
            ts: 0,
            action: CommandAction::Select,
            column: Some(1),
            row: None,
        };
        let err = map_command(&cmd).unwrap_err();
        assert_eq!(err.0, ErrorCode::InvalidCommand);

        let ok = CommandMessage { row: Some(0), ..cmd };
        assert!(matches!(
            map_command(&ok),
            Ok(ClientCommand::Select { column: 1, row: 0 })
        ));
    }

    #[test]
    fn test_observation_cells_are_bottom_row_first() {
        let board = small_board();
        let obs = build_observation(&board.snapshot(), 5);
        assert_eq!(obs.seq, 5);
        assert_eq!(obs.state, BoardStateLower::Interactive);
        assert!(obs.playable);
        assert_eq!(obs.board.cells.len(), 2);
        assert_eq!(obs.board.cells[0][0].map(|c| c.color), Some(0));
        assert_eq!(obs.board.cells[1][1].map(|c| c.color), Some(2));
        assert_eq!(obs.board.cells[0][1].map(|c| c.tier), Some(TierLower::Tier2));
    }

    #[test]
    fn test_state_hash_tracks_board_changes() {
        let mut board = small_board();
        let before = build_observation(&board.snapshot(), 1).state_hash;
        let again = build_observation(&board.snapshot(), 2).state_hash;
        assert_eq!(before, again);

        board.select(0, 0);
        let after = build_observation(&board.snapshot(), 3).state_hash;
        assert_ne!(before, after);
    }

    #[test]
    fn test_build_event_fields() {
        let ev = BoardEvent::TileRepositioned {
            id: TileId(4),
            from: Coord::new(1, 3),
            to: Coord::new(1, 0),
        };
        let v = serde_json::to_value(build_event(&ev, 8)).unwrap();
        assert_eq!(v["type"], "event");
        assert_eq!(v["event"], "tile_repositioned");
        assert_eq!(v["id"], 4);
        assert_eq!(v["from"]["row"], 3);
        assert_eq!(v["to"]["row"], 0);
        assert!(v.get("color").is_none());

        let tier = BoardEvent::TileTierChanged {
            id: TileId(1),
            at: Coord::new(0, 0),
            tier: Tier::Tier4,
        };
        let v = serde_json::to_value(build_event(&tier, 9)).unwrap();
        assert_eq!(v["tier"], "tier4");

        let v = serde_json::to_value(build_event(&BoardEvent::BoardDeadlocked, 10)).unwrap();
        assert_eq!(v["event"], "board_deadlocked");
        assert!(v.get("id").is_none());
    }

    #[test]
    fn test_ack_for_outcome() {
        let ack = ack_for_outcome(3, SelectOutcome::Resolved { removed: 4 });
        assert_eq!(ack.status, AckStatus::Ok);
        assert_eq!(ack.removed, Some(4));

        let ack = ack_for_outcome(4, SelectOutcome::NotInteractive(BoardState::Deadlocked));
        assert_eq!(ack.status, AckStatus::Ignored);
        assert_eq!(ack.reason, Some(IgnoreReason::NotInteractive));
    }
}
