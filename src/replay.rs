// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Replay the decision engine on historical frames
// 3. Compare logged vs replayed moves cell by cell
// 4. Generate detailed analysis reports

use log::{info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::LogEntry;
use crate::map_state::MapState;
use crate::topology::GridTopology;
use crate::types::{Coord, Direction, Move};

/// A cell whose replayed move differs from the logged one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMismatch {
    pub coord: Coord,
    /// None when the cell was missing from the logged moves
    pub original: Option<Direction>,
    /// None when the replay emitted nothing for the cell
    pub replayed: Option<Direction>,
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: u32,
    pub cells: usize,
    pub mismatches: Vec<CellMismatch>,
    pub matches: bool,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    pub mismatched_cells: usize,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    bot: Bot,
    verbose: bool,
    /// Topologies are expensive, build each map size once
    topologies: Mutex<HashMap<(usize, usize), Arc<GridTopology>>>,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            bot: Bot::new(config),
            verbose,
            topologies: Mutex::new(HashMap::new()),
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    fn topology_for(&self, width: usize, height: usize) -> Arc<GridTopology> {
        self.topologies
            .lock()
            .entry((width, height))
            .or_insert_with(|| Arc::new(GridTopology::build(width, height)))
            .clone()
    }

    /// Re-runs the decision engine on one logged frame
    pub fn replay_moves(&self, entry: &LogEntry) -> Result<Vec<Move>, String> {
        let width = entry.production.width();
        let height = entry.production.height();
        if width == 0 || height == 0 {
            return Err(format!("Turn {}: empty map", entry.turn));
        }
        for (name, grid_width, grid_height) in [
            ("owners", entry.frame.owners.width(), entry.frame.owners.height()),
            ("strength", entry.frame.strength.width(), entry.frame.strength.height()),
        ] {
            if grid_width != width || grid_height != height {
                return Err(format!(
                    "Turn {}: {} is {}x{}, production is {}x{}",
                    entry.turn, name, grid_width, grid_height, width, height
                ));
            }
        }

        let topology = self.topology_for(width, height);
        let state = MapState::derive(&topology, &entry.production, &entry.frame, entry.my_id);
        Ok(self.bot.get_moves(entry.turn, &topology, &state))
    }

    /// Compares two move lists cell by cell, ignoring order
    pub fn diff_moves(original: &[Move], replayed: &[Move]) -> Vec<CellMismatch> {
        let original: HashMap<Coord, Direction> =
            original.iter().map(|m| (m.coord(), m.direction)).collect();
        let replayed: HashMap<Coord, Direction> =
            replayed.iter().map(|m| (m.coord(), m.direction)).collect();

        let mut coords: Vec<Coord> = original.keys().chain(replayed.keys()).copied().collect();
        coords.sort_by_key(|c| (c.y, c.x));
        coords.dedup();

        coords
            .into_iter()
            .filter_map(|coord| {
                let o = original.get(&coord).copied();
                let r = replayed.get(&coord).copied();
                if o == r {
                    None
                } else {
                    Some(CellMismatch {
                        coord,
                        original: o,
                        replayed: r,
                    })
                }
            })
            .collect()
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let start_time = Instant::now();
        let replayed = self.replay_moves(entry)?;
        let computation_time_ms = start_time.elapsed().as_millis();

        let mismatches = Self::diff_moves(&entry.moves, &replayed);
        let matches = mismatches.is_empty();

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} cells (time: {}ms)",
                    entry.turn,
                    replayed.len(),
                    computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - {} of {} cells differ (time: {}ms)",
                    entry.turn,
                    mismatches.len(),
                    replayed.len(),
                    computation_time_ms
                );
            }
        }

        Ok(ReplayResult {
            turn: entry.turn,
            cells: replayed.len(),
            mismatches,
            matches,
            computation_time_ms,
        })
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        Ok(results)
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
            mismatched_cells: results.iter().map(|r| r.mismatches.len()).sum(),
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:      {}", stats.total_turns);
        println!("Matches:          {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:       {}", stats.mismatches);
        println!("Mismatched Cells: {}", stats.mismatched_cells);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_cells: f64 =
                results.iter().map(|r| r.cells as f64).sum::<f64>() / results.len() as f64;

            println!("Average Owned Cells:        {:.1}", avg_cells);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatched: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatched.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatched {
                println!("Turn {}:", result.turn);
                for m in &result.mismatches {
                    println!(
                        "  ({}, {}): {} → {}",
                        m.coord.x,
                        m.coord.y,
                        m.original.map_or("missing", |d| d.as_str()),
                        m.replayed.map_or("missing", |d| d.as_str()),
                    );
                }
            }
            println!();
        }
    }

    /// Validates that the logged move of specific cells was one of the acceptable directions
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u32, Coord, Vec<Direction>)], // (turn, cell, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, coord, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual = entry
                .moves
                .iter()
                .find(|m| m.coord() == *coord)
                .map(|m| m.direction)
                .ok_or_else(|| {
                    format!("Turn {}: no move logged for ({}, {})", turn, coord.x, coord.y)
                })?;

            if !acceptable.contains(&actual) {
                return Err(format!(
                    "Turn {} ({}, {}): Expected one of {:?}, but got {}",
                    turn,
                    coord.x,
                    coord.y,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual.as_str()
                ));
            }
        }

        Ok(())
    }

    /// Parses a direction name ("north") or wire code ("1")
    pub fn parse_direction(s: &str) -> Result<Direction, String> {
        match s.trim().to_lowercase().as_str() {
            "stay" | "still" => Ok(Direction::Stay),
            "north" | "n" => Ok(Direction::North),
            "east" | "e" => Ok(Direction::East),
            "south" | "s" => Ok(Direction::South),
            "west" | "w" => Ok(Direction::West),
            // Wire codes as they appear in the move line
            other => other
                .parse::<u8>()
                .ok()
                .and_then(Direction::from_code)
                .ok_or_else(|| format!("Invalid direction: {}", s)),
        }
    }
}
