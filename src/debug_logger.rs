// Debug logging module for asynchronous turn logging
//
// Turns are handed to a single writer task over a channel so the turn loop
// never waits on disk. Each turn's input frame and emitted moves are written to
// a JSONL file that the replay tool can read back. `shutdown` must be awaited
// before the runtime goes away or the tail of the game is lost.

use log::error;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::map_state::Frame;
use crate::types::{Grid, Move};

/// Represents a single debug log entry (one line of the JSONL file)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LogEntry {
    pub turn: u32,
    pub my_id: u16,
    pub production: Grid<u16>,
    pub frame: Frame,
    pub moves: Vec<Move>,
    pub timestamp: String,
}

/// Debug logger handle
/// Entries queue up in order; the writer task appends them one line at a time
pub struct DebugLogger {
    sender: Option<UnboundedSender<LogEntry>>,
    writer: Option<JoinHandle<()>>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    /// and spawns the writer task on the current runtime
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                let (sender, receiver) = mpsc::unbounded_channel();
                DebugLogger {
                    sender: Some(sender),
                    writer: Some(tokio::spawn(run_writer(file, receiver))),
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            sender: None,
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues a turn for the writer task without blocking
    pub fn log_turn(
        &self,
        turn: u32,
        my_id: u16,
        production: &Grid<u16>,
        frame: &Frame,
        moves: &[Move],
    ) {
        let Some(sender) = &self.sender else {
            return;
        };

        let entry = LogEntry {
            turn,
            my_id,
            production: production.clone(),
            frame: frame.clone(),
            moves: moves.to_vec(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if sender.send(entry).is_err() {
            error!("Debug log writer stopped, dropping turn {}", turn);
        }
    }

    /// Closes the queue and waits until every queued entry is on disk
    pub async fn shutdown(self) {
        let DebugLogger { sender, writer } = self;
        drop(sender);

        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                error!("Debug log writer failed: {}", e);
            }
        }
    }
}

async fn run_writer(mut file: File, mut receiver: UnboundedReceiver<LogEntry>) {
    while let Some(entry) = receiver.recv().await {
        write_entry(&mut file, &entry).await;
    }
    if let Err(e) = file.sync_all().await {
        error!("Failed to sync debug log: {}", e);
    }
}

/// Serializes and appends one entry, flushing afterwards
async fn write_entry(file: &mut File, entry: &LogEntry) {
    match serde_json::to_string(entry) {
        Ok(json_line) => {
            let line_with_newline = format!("{}\n", json_line);
            if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                error!("Failed to write debug log entry: {}", e);
            } else if let Err(e) = file.flush().await {
                error!("Failed to flush debug log: {}", e);
            }
        }
        Err(e) => {
            error!("Failed to serialize debug log entry: {}", e);
        }
    }
}
