//! Decision engine scenario tests
//!
//! Whole-turn behavior of the overkill policy, plus a full game session driven
//! over the line protocol the way the game environment runs the bot.

use overkill_bot::bot::Bot;
use overkill_bot::config::Config;
use overkill_bot::debug_logger::DebugLogger;
use overkill_bot::map_state::{Frame, MapState};
use overkill_bot::protocol::Connection;
use overkill_bot::session::Session;
use overkill_bot::topology::GridTopology;
use overkill_bot::types::{Coord, Direction, Grid, Move};

fn decide(owners: Vec<Vec<u16>>, strength: Vec<Vec<u16>>, production: Vec<Vec<u16>>) -> Vec<Move> {
    let frame = Frame {
        owners: Grid::from_rows(owners).unwrap(),
        strength: Grid::from_rows(strength).unwrap(),
    };
    let topo = GridTopology::build(frame.owners.width(), frame.owners.height());
    let state = MapState::derive(&topo, &Grid::from_rows(production).unwrap(), &frame, 1);
    Bot::new(Config::default_hardcoded()).get_moves(1, &topo, &state)
}

fn direction_at(moves: &[Move], coord: Coord) -> Direction {
    moves
        .iter()
        .find(|m| m.coord() == coord)
        .map(|m| m.direction)
        .expect("every owned cell gets a move")
}

#[test]
fn test_one_move_per_owned_cell() {
    let moves = decide(
        vec![vec![1, 1, 0, 0], vec![0, 1, 2, 0], vec![0, 0, 0, 1]],
        vec![vec![30; 4]; 3],
        vec![vec![2; 4]; 3],
    );
    let mut coords: Vec<Coord> = moves.iter().map(|m| m.coord()).collect();
    coords.sort();
    assert_eq!(
        coords,
        vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 1), Coord::new(3, 2)]
    );
    assert!(moves.iter().all(|m| m.direction.code() <= 4));
}

#[test]
fn test_single_owner_map_stays_everywhere() {
    let moves = decide(vec![vec![1; 5]; 5], vec![vec![255; 5]; 5], vec![vec![1; 5]; 5]);
    assert_eq!(moves.len(), 25);
    assert!(moves.iter().all(|m| m.direction == Direction::Stay));
}

#[test]
fn test_border_cell_prefers_enemy_adjacent_target() {
    // Owned (2,2); south neighbor (2,3) sits next to a strong enemy at (2,4)
    let mut owners = vec![vec![0u16; 5]; 5];
    owners[2][2] = 1;
    owners[4][2] = 2;
    let mut strength = vec![vec![10u16; 5]; 5];
    strength[4][2] = 40;
    strength[2][2] = 12;
    let moves = decide(owners, strength, vec![vec![3; 5]; 5]);
    assert_eq!(direction_at(&moves, Coord::new(2, 2)), Direction::South);
}

#[test]
fn test_interior_cells_accumulate_then_advance() {
    // 3x3 owned block in a 7x7 map, the center is the only interior cell
    let mut owners = vec![vec![0u16; 7]; 7];
    for row in owners.iter_mut().take(5).skip(2) {
        for cell in row.iter_mut().take(5).skip(2) {
            *cell = 1;
        }
    }
    let production = vec![vec![4u16; 7]; 7];

    let mut weak = vec![vec![1u16; 7]; 7];
    weak[3][3] = 19;
    let moves = decide(owners.clone(), weak, production.clone());
    assert_eq!(direction_at(&moves, Coord::new(3, 3)), Direction::Stay);

    let mut strong = vec![vec![1u16; 7]; 7];
    strong[3][3] = 20;
    let moves = decide(owners, strong, production);
    // All four ring cells are at distance 1; (3,2) comes first in row-major order
    assert_eq!(direction_at(&moves, Coord::new(3, 3)), Direction::North);
}

#[test]
fn test_advance_crosses_the_map_seam() {
    // Owned columns 0..=2 and 5; column 5 is a border one step west of column 0
    // across the seam
    let owners: Vec<Vec<u16>> = (0..4).map(|_| vec![1, 1, 1, 0, 0, 1]).collect();
    let mut strength = vec![vec![1u16; 6]; 4];
    strength[1][0] = 50;
    let moves = decide(owners, strength, vec![vec![1u16; 6]; 4]);
    // (0,1) is interior: neighbors (0,0), (1,1), (0,2), (5,1) are all owned
    assert_eq!(direction_at(&moves, Coord::new(0, 1)), Direction::West);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_game_over_the_protocol() {
    // 3x3 map, we are player 1 in the top-left corner, player 2 bottom-right
    let input = concat!(
        "1\n",
        "3 3\n",
        "5 5 5 5 5 5 5 5 5\n",
        "1 1 7 0 1 2 10 10 10 10 10 10 10 10 10\n",
        "1 1 7 0 1 2 10 10 10 10 10 10 10 10 10\n",
        "9 1 255 255 255 255 255 255 255 255 255\n",
    );
    let mut conn = Connection::new(input.as_bytes(), Vec::new());

    let init = conn.read_init().await.unwrap();
    let config = Config::default_hardcoded();
    let bot = Bot::new(config);
    conn.send_init(bot.name()).await.unwrap();

    let topology = GridTopology::build(init.width, init.height);
    let mut session = Session::new(bot, topology, init.production, init.my_id, DebugLogger::disabled());

    while let Some(frame) = conn.read_frame(init.width, init.height).await.unwrap() {
        let moves = session.play_turn(&frame);
        conn.send_moves(&moves).await.unwrap();
    }
    assert_eq!(session.turn(), 2);
    session.finish().await;

    let sent = String::from_utf8(conn.into_writer()).unwrap();
    let lines: Vec<&str> = sent.lines().collect();
    assert_eq!(lines[0], "OverkillRustBot");
    // (0,0) attacks north across the seam towards the enemy-adjacent (0,2)
    assert_eq!(lines[1], "0 0 1");
    // Whole map owned: every cell stays
    let codes: Vec<&str> = lines[2].split(' ').collect();
    assert_eq!(codes.len(), 27);
    assert!(codes.chunks(3).all(|t| t[2] == "0"));
}
