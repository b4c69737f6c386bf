// Game session binding
//
// Owns everything that lives for the whole game (topology, production, player id,
// bot) and turns each incoming frame into a move list. Per-turn state is never
// kept here: every call derives a fresh MapState.

use log::info;
use std::time::Instant;

use crate::bot::Bot;
use crate::debug_logger::DebugLogger;
use crate::map_state::{Frame, MapState};
use crate::profiler::TurnProfiler;
use crate::topology::GridTopology;
use crate::types::{Grid, Move};

pub struct Session {
    bot: Bot,
    topology: GridTopology,
    production: Grid<u16>,
    my_id: u16,
    turn: u32,
    debug_logger: DebugLogger,
    profiler: TurnProfiler,
}

impl Session {
    pub fn new(
        bot: Bot,
        topology: GridTopology,
        production: Grid<u16>,
        my_id: u16,
        debug_logger: DebugLogger,
    ) -> Self {
        let profiler = TurnProfiler::new(
            bot.config().timing.turn_budget_ms,
            bot.config().profiling.enabled,
        );
        Session {
            bot,
            topology,
            production,
            my_id,
            turn: 0,
            debug_logger,
            profiler,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// Decides the moves for one frame
    pub fn play_turn(&mut self, frame: &Frame) -> Vec<Move> {
        self.turn += 1;
        let start_time = Instant::now();

        let state = MapState::derive(&self.topology, &self.production, frame, self.my_id);
        let moves = self.bot.get_moves(self.turn, &self.topology, &state);

        self.profiler.record(self.turn, start_time.elapsed());
        self.debug_logger
            .log_turn(self.turn, self.my_id, &self.production, frame, &moves);

        moves
    }

    /// Called once the game closes the stream; returns after the debug log is complete
    pub async fn finish(self) {
        info!("GAME OVER after {} turns", self.turn);
        self.profiler.report();
        self.debug_logger.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::debug_logger::LogEntry;
    use crate::types::{Coord, Direction};

    fn session() -> Session {
        Session::new(
            Bot::new(Config::default_hardcoded()),
            GridTopology::build(3, 3),
            Grid::filled(3, 3, 5),
            1,
            DebugLogger::disabled(),
        )
    }

    #[test]
    fn test_turns_are_counted_and_derived_fresh() {
        let mut session = session();

        let first = Frame {
            owners: Grid::from_rows(vec![vec![1, 0, 0], vec![0, 0, 0], vec![0, 0, 2]]).unwrap(),
            strength: Grid::filled(3, 3, 10),
        };
        let moves = session.play_turn(&first);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].coord(), Coord::new(0, 0));

        // Nothing from the previous frame leaks into the next one
        let second = Frame {
            owners: Grid::filled(3, 3, 1),
            strength: Grid::filled(3, 3, 10),
        };
        let moves = session.play_turn(&second);
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|m| m.direction == Direction::Stay));
        assert_eq!(session.turn(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_finish_waits_for_every_logged_turn() {
        let path = std::env::temp_dir().join(format!(
            "overkill_session_log_{}.jsonl",
            std::process::id()
        ));
        let topology = GridTopology::build(50, 50);
        let mut owners = vec![0u16; 2500];
        owners[0] = 1;
        owners[2499] = 2;
        let frame = Frame {
            owners: Grid::from_vec(50, 50, owners).unwrap(),
            strength: Grid::filled(50, 50, 10),
        };

        let logger = DebugLogger::new(true, &path.to_string_lossy()).await;
        let mut session = Session::new(
            Bot::new(Config::default_hardcoded()),
            topology,
            Grid::filled(50, 50, 3),
            1,
            logger,
        );
        for _ in 0..5 {
            tokio::task::block_in_place(|| session.play_turn(&frame));
        }
        session.finish().await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let turns: Vec<u32> = contents
            .lines()
            .map(|l| serde_json::from_str::<LogEntry>(l).unwrap().turn)
            .collect();
        assert_eq!(turns, vec![1, 2, 3, 4, 5]);

        let _ = std::fs::remove_file(&path);
    }
}
