// Move decision engine
//
// Every owned cell is decided independently from the immutable topology and the
// current MapState, so the per-cell work can run on the rayon pool without any
// coordination. The overkill policy per cell:
// 1. Border cell: attack the most valuable neighbor unless it is stronger than us
// 2. Interior cell that is still weak relative to its production: stay and grow
// 3. Otherwise: head for the nearest border cell

use log::{debug, info};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

use crate::config::{Config, Strategy};
use crate::map_state::MapState;
use crate::resolver;
use crate::topology::GridTopology;
use crate::types::{Coord, Direction, Move};

/// Uniform pool for the random strategy, Stay included
const RANDOM_CHOICES: [Direction; 5] = [
    Direction::Stay,
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

/// Halite bot with OOP-style API
/// Holds static configuration; turn data is passed in on every call
pub struct Bot {
    config: Config,
    /// Only touched by the random strategy
    rng: Mutex<StdRng>,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        let rng = match config.bot.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Bot {
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Name sent to the game environment during the handshake
    pub fn name(&self) -> &str {
        &self.config.bot.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Computes one move per owned cell for this turn
    ///
    /// # Arguments
    /// * `turn` - Current turn number, only used for logging
    /// * `topology` - Session-wide precomputed distances and neighbors
    /// * `state` - This turn's derived map snapshot
    ///
    /// # Returns
    /// * `Vec<Move>` - Moves in the same order as `state.owned_coords()`
    pub fn get_moves(&self, turn: u32, topology: &GridTopology, state: &MapState) -> Vec<Move> {
        let start_time = Instant::now();
        let owned = state.owned_coords();

        let moves = match self.config.bot.strategy {
            Strategy::Overkill => self.overkill_moves(topology, state),
            Strategy::Random => self.random_moves(owned),
        };

        info!(
            "Turn {}: {} moves ({} owned, {} border) in {}ms",
            turn,
            moves.len(),
            owned.len(),
            state.border_count(),
            start_time.elapsed().as_millis()
        );

        moves
    }

    fn overkill_moves(&self, topology: &GridTopology, state: &MapState) -> Vec<Move> {
        let owned = state.owned_coords();
        let multiplier = self.config.decision.accumulation_multiplier;

        if owned.len() >= self.config.parallel.min_cells_for_parallel {
            debug!("Deciding {} cells on the rayon pool", owned.len());
            owned
                .par_iter()
                .map(|&c| Move::new(c, Self::decide_cell(topology, state, c, multiplier)))
                .collect()
        } else {
            owned
                .iter()
                .map(|&c| Move::new(c, Self::decide_cell(topology, state, c, multiplier)))
                .collect()
        }
    }

    fn random_moves(&self, owned: &[Coord]) -> Vec<Move> {
        let mut rng = self.rng.lock();
        owned
            .iter()
            .map(|&c| {
                let direction = RANDOM_CHOICES[rng.random_range(0..RANDOM_CHOICES.len())];
                Move::new(c, direction)
            })
            .collect()
    }

    /// Overkill decision for a single owned cell
    pub fn decide_cell(
        topology: &GridTopology,
        state: &MapState,
        coord: Coord,
        accumulation_multiplier: u32,
    ) -> Direction {
        if state.is_border(coord) {
            return Self::border_move(topology, state, coord);
        }

        let strength = state.strength(coord) as u32;
        if strength < accumulation_multiplier.saturating_mul(state.production(coord) as u32) {
            return Direction::Stay;
        }

        match Self::nearest_border(topology, state, coord) {
            Some(target) => resolver::resolve(coord, target, topology.width(), topology.height()),
            // Whole map is ours: nothing to advance towards
            None => Direction::Stay,
        }
    }

    /// Attack the highest-scoring neighbor, or hold if it would beat us
    fn border_move(topology: &GridTopology, state: &MapState, coord: Coord) -> Direction {
        let neighbors = topology.neighbors(coord);

        let mut best = 0;
        for i in 1..neighbors.len() {
            if state.heuristic(neighbors[i]) > state.heuristic(neighbors[best]) {
                best = i;
            }
        }

        if state.strength(neighbors[best]) > state.strength(coord) {
            Direction::Stay
        } else {
            Direction::cardinals()[best]
        }
    }

    /// Closest border cell by precomputed distance; ties go to the lowest row-major index
    fn nearest_border(topology: &GridTopology, state: &MapState, coord: Coord) -> Option<Coord> {
        topology
            .distance_row(coord)
            .iter()
            .zip(state.border_mask())
            .enumerate()
            .filter(|(_, (_, border))| **border)
            .min_by_key(|(_, (distance, _))| **distance)
            .map(|(index, _)| topology.coord(index))
    }
}
