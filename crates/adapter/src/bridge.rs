//! Game-loop side of the adapter.
//!
//! Applies inbound commands to a [`Board`] and turns board events and
//! observations into outbound lines. Runs on the game thread; the server
//! never touches the board.

use tracing::{debug, warn};

use crate::core::{Board, BoardSnapshot, ColorSource};
use crate::protocol::create_ack;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::server::{ack_for_outcome, build_event, build_observation};

fn encode<T: serde::Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to encode adapter message");
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct Bridge {
    seq: u64,
    snapshot: BoardSnapshot,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Apply one inbound command and answer the sender.
    ///
    /// Board events raised by the command stay queued on the board until
    /// the next [`Bridge::flush`].
    pub fn handle_command<R: ColorSource>(
        &mut self,
        board: &mut Board<R>,
        cmd: InboundCommand,
    ) -> Vec<OutboundMessage> {
        let client_id = cmd.client_id;
        let line = match cmd.payload {
            InboundPayload::SnapshotRequest => self.observation_line(board),
            InboundPayload::Command(ClientCommand::Select { column, row }) => {
                let outcome = board.select(column, row);
                debug!(client_id, seq = cmd.seq, ?outcome, "adapter select");
                encode(&ack_for_outcome(cmd.seq, outcome))
            }
            InboundPayload::Command(ClientCommand::Reset) => {
                board.reset();
                encode(&create_ack(cmd.seq))
            }
        };
        line.map(|line| OutboundMessage::ToClient { client_id, line })
            .into_iter()
            .collect()
    }

    /// Drain the board's queued events.
    ///
    /// Each event becomes an event broadcast, and a single observation
    /// broadcast follows when anything happened.
    pub fn flush<R: ColorSource>(&mut self, board: &mut Board<R>) -> Vec<OutboundMessage> {
        let events = board.take_events();
        if events.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(events.len() + 1);
        for event in &events {
            let seq = self.next_seq();
            if let Some(line) = encode(&build_event(event, seq)) {
                out.push(OutboundMessage::BroadcastEvent { line });
            }
        }
        if let Some(line) = self.observation_line(board) {
            out.push(OutboundMessage::Broadcast { line });
        }
        out
    }

    fn observation_line<R: ColorSource>(&mut self, board: &Board<R>) -> Option<String> {
        board.snapshot_into(&mut self.snapshot);
        let seq = self.next_seq();
        encode(&build_observation(&self.snapshot, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Grid, LevelConfig, ScriptedColors};
    use crate::types::{BoardState, ColorType};

    fn board() -> Board<ScriptedColors> {
        // row 1: 1 2
        // row 0: 0 0
        let level = LevelConfig::new(2, 2, 3, 1, 2, 3).unwrap();
        let grid = Grid::from_colors(2, 2, &[0, 0, 1, 2].map(ColorType)).unwrap();
        Board::with_grid(level, grid, ScriptedColors::new([0, 1])).unwrap()
    }

    fn lines(out: &[OutboundMessage]) -> Vec<serde_json::Value> {
        out.iter()
            .map(|m| match m {
                OutboundMessage::ToClient { line, .. }
                | OutboundMessage::Broadcast { line }
                | OutboundMessage::BroadcastEvent { line } => {
                    serde_json::from_str(line).unwrap()
                }
            })
            .collect()
    }

    #[test]
    fn select_is_acked_with_removed_count() {
        let mut board = board();
        board.take_events();
        let mut bridge = Bridge::new();

        let out = bridge.handle_command(
            &mut board,
            InboundCommand {
                client_id: 3,
                seq: 11,
                payload: InboundPayload::Command(ClientCommand::Select { column: 1, row: 0 }),
            },
        );
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], OutboundMessage::ToClient { client_id: 3, .. }));
        let v = &lines(&out)[0];
        assert_eq!(v["type"], "ack");
        assert_eq!(v["seq"], 11);
        assert_eq!(v["status"], "ok");
        assert_eq!(v["removed"], 2);
    }

    #[test]
    fn small_cluster_is_ignored() {
        let mut board = board();
        let mut bridge = Bridge::new();
        let out = bridge.handle_command(
            &mut board,
            InboundCommand {
                client_id: 1,
                seq: 2,
                payload: InboundPayload::Command(ClientCommand::Select { column: 0, row: 1 }),
            },
        );
        let v = &lines(&out)[0];
        assert_eq!(v["status"], "ignored");
        assert_eq!(v["reason"], "too_small");
        assert_eq!(board.moves(), 0);
    }

    #[test]
    fn flush_emits_events_then_observation() {
        let mut board = board();
        board.take_events();
        let mut bridge = Bridge::new();
        bridge.handle_command(
            &mut board,
            InboundCommand {
                client_id: 1,
                seq: 1,
                payload: InboundPayload::Command(ClientCommand::Select { column: 0, row: 0 }),
            },
        );

        let out = bridge.flush(&mut board);
        let values = lines(&out);
        let (last, events) = values.split_last().unwrap();
        assert_eq!(last["type"], "observation");
        assert_eq!(last["moves"], 1);
        assert!(events.iter().all(|v| v["type"] == "event"));
        assert_eq!(events[0]["event"], "tile_removed");
        assert_eq!(events.last().unwrap()["event"], "board_deadlocked");
        assert_eq!(board.state(), BoardState::Deadlocked);

        // Nothing new happened.
        assert!(bridge.flush(&mut board).is_empty());
    }

    #[test]
    fn reset_is_acked_and_bumps_board_id() {
        let mut board = board();
        let mut bridge = Bridge::new();
        let out = bridge.handle_command(
            &mut board,
            InboundCommand {
                client_id: 1,
                seq: 4,
                payload: InboundPayload::Command(ClientCommand::Reset),
            },
        );
        assert_eq!(lines(&out)[0]["status"], "ok");
        assert_eq!(board.board_id(), 1);
    }

    #[test]
    fn snapshot_request_answers_sender_only() {
        let mut board = board();
        let mut bridge = Bridge::new();
        let out = bridge.handle_command(
            &mut board,
            InboundCommand {
                client_id: 7,
                seq: 1,
                payload: InboundPayload::SnapshotRequest,
            },
        );
        assert!(matches!(out[0], OutboundMessage::ToClient { client_id: 7, .. }));
        let v = &lines(&out)[0];
        assert_eq!(v["type"], "observation");
        assert_eq!(v["board"]["cells"][1][1]["color"], 2);
    }
}
