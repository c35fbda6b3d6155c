//! Terminal collapse puzzle runner (default binary).
//!
//! Owns the board and drives it from the keyboard, the mouse and, unless
//! disabled, the TCP adapter. Logs go to the file named by `COLLAPSE_LOG`
//! because the terminal belongs to the renderer.

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tui_collapse::adapter::{Adapter, Bridge};
use tui_collapse::core::{Board, BoardSnapshot, LevelConfig};
use tui_collapse::input::{handle_key_event, handle_mouse_event, should_quit, Cursor};
use tui_collapse::term::{AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_collapse::types::{
    Coord, PlayerAction, DEFAULT_COLOR_COUNT, DEFAULT_COLUMNS, DEFAULT_MIN_MATCH, DEFAULT_ROWS,
};

const FRAME: Duration = Duration::from_millis(33);

/// Tile-collapse puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tui-collapse",
    version,
    about = "Tile-collapse puzzle in the terminal. Select a group of matching tiles to clear it; new tiles drop in from above.",
    long_about = "Select a tile to remove its whole group of same-colored neighbors. Survivors \
        fall, replacements drop in, and every tile shows how large its group is. The board is \
        stuck when no group is big enough; press r for a new one.\n\n\
        CONTROLS:\n  Arrows / hjkl / wasd  Move cursor   Enter / Space  Select\n  \
        Mouse click  Select tile   r  New board   q / Esc / Ctrl-C  Quit\n\n\
        AI agents can connect over TCP (COLLAPSE_AI_HOST / COLLAPSE_AI_PORT)."
)]
struct Args {
    /// Board height in tiles.
    #[arg(long, env = "COLLAPSE_ROWS", default_value_t = DEFAULT_ROWS, value_name = "N")]
    rows: u8,

    /// Board width in tiles.
    #[arg(long, env = "COLLAPSE_COLUMNS", default_value_t = DEFAULT_COLUMNS, value_name = "N")]
    columns: u8,

    /// Number of tile colors.
    #[arg(long, env = "COLLAPSE_COLORS", default_value_t = DEFAULT_COLOR_COUNT, value_name = "N")]
    colors: u8,

    /// Largest cluster size for tiers 1, 2 and 3 (larger clusters are tier 4).
    #[arg(
        long,
        env = "COLLAPSE_TIERS",
        value_delimiter = ',',
        default_value = "2,4,5",
        value_name = "T1,T2,T3"
    )]
    tiers: Vec<u32>,

    /// Smallest cluster a selection removes.
    #[arg(long, env = "COLLAPSE_MIN_MATCH", default_value_t = DEFAULT_MIN_MATCH, value_name = "N")]
    min_match: u32,

    /// RNG seed. Random when not set.
    #[arg(long, env = "COLLAPSE_SEED")]
    seed: Option<u32>,

    /// Deal a new board as soon as the current one has no moves.
    #[arg(long, env = "COLLAPSE_AUTO_REGENERATE")]
    auto_regenerate: bool,

    /// Do not start the TCP adapter.
    #[arg(long)]
    no_adapter: bool,
}

impl Args {
    fn level(&self) -> Result<LevelConfig> {
        let [t1, t2, t3] = self.tiers[..] else {
            bail!("--tiers takes exactly three values, got {}", self.tiers.len());
        };
        let level = LevelConfig::new(self.rows, self.columns, self.colors, t1, t2, t3)?
            .with_min_match(self.min_match)?;
        Ok(level)
    }
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("COLLAPSE_LOG") else {
        return Ok(());
    };
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.to_string_lossy()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

struct App {
    board: Board,
    cursor: Cursor,
    adapter: Option<Adapter>,
    bridge: Bridge,
    auto_regenerate: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let level = args.level()?;
    let seed = args.seed.unwrap_or_else(time_seed);
    let adapter = if args.no_adapter {
        None
    } else {
        Adapter::start_from_env()?
    };
    info!(seed, rows = level.rows(), columns = level.columns(), "starting");

    let mut app = App {
        board: Board::with_seed(level, seed),
        cursor: Cursor::default(),
        adapter,
        bridge: Bridge::new(),
        auto_regenerate: args.auto_regenerate,
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App) -> Result<()> {
    let view = GameView::default();
    let status = app
        .adapter
        .as_ref()
        .map(|a| AdapterStatusView { port: a.local_addr().port() });
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = BoardSnapshot::default();

    loop {
        app.poll_adapter();
        app.settle();

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        app.board.snapshot_into(&mut snap);
        let cursor = Coord::new(app.cursor.column, app.cursor.row);
        view.render_into_with_adapter(&snap, Some(cursor), status.as_ref(), viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        if !event::poll(FRAME)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(action) = handle_key_event(key) {
                    app.apply(action);
                }
            }
            Event::Mouse(mouse) => {
                let Some((x, y)) = handle_mouse_event(mouse) else {
                    continue;
                };
                let grid = app.board.grid();
                if let Some(at) = view.cell_at(grid.columns(), grid.rows(), viewport, x, y) {
                    app.cursor = Cursor::new(at.column, at.row);
                    app.apply(PlayerAction::Select);
                }
            }
            Event::Resize(..) => term.invalidate(),
            _ => {}
        }
    }
}

impl App {
    fn apply(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::Select => {
                self.board
                    .select(self.cursor.column as i32, self.cursor.row as i32);
            }
            PlayerAction::Reset => self.board.reset(),
            _ => {
                let grid = self.board.grid();
                let (columns, rows) = (grid.columns(), grid.rows());
                self.cursor.apply(action, columns, rows);
            }
        }
    }

    fn poll_adapter(&mut self) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        while let Some(cmd) = adapter.try_recv() {
            for msg in self.bridge.handle_command(&mut self.board, cmd) {
                adapter.send(msg);
            }
        }
    }

    /// Regenerate a deadlocked board if asked to, then hand queued events
    /// to the adapter (or drop them when there is none).
    fn settle(&mut self) {
        if self.auto_regenerate && self.board.is_deadlocked() {
            info!(board_id = self.board.board_id(), "regenerating deadlocked board");
            self.board.reset();
        }
        match self.adapter.as_ref() {
            Some(adapter) => {
                for msg in self.bridge.flush(&mut self.board) {
                    adapter.send(msg);
                }
            }
            None => self.board.drain_events().for_each(drop),
        }
    }
}
