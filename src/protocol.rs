// Halite line protocol
//
// The game environment talks to the bot over stdin/stdout, one message per line:
// - init: player id, "width height", production values, initial frame
// - reply to init: the bot's name
// - every turn: one frame line in, one move line out
//
// Frames are run-length encoded owners ("count owner" pairs covering every cell)
// followed by one strength value per cell, all in row-major order.
// Parsing is kept separate from I/O so it can be tested without a game.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::map_state::Frame;
use crate::types::{Grid, Move};

/// Everything the environment sends before the first turn
#[derive(Debug, Clone, PartialEq)]
pub struct InitData {
    pub my_id: u16,
    pub width: usize,
    pub height: usize,
    pub production: Grid<u16>,
    pub frame: Frame,
}

fn parse_value<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    token
        .parse::<T>()
        .map_err(|e| format!("Invalid {} '{}': {}", what, token, e))
}

pub fn parse_my_id(line: &str) -> Result<u16, String> {
    parse_value(line.trim(), "player id")
}

/// Parses the "width height" line
pub fn parse_dimensions(line: &str) -> Result<(usize, usize), String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(format!("Expected 'width height', got '{}'", line.trim()));
    }
    let width: usize = parse_value(parts[0], "width")?;
    let height: usize = parse_value(parts[1], "height")?;
    if width == 0 || height == 0 {
        return Err(format!("Map dimensions must be positive, got {}x{}", width, height));
    }
    Ok((width, height))
}

pub fn parse_production(line: &str, width: usize, height: usize) -> Result<Grid<u16>, String> {
    let values = line
        .split_whitespace()
        .map(|t| parse_value(t, "production"))
        .collect::<Result<Vec<u16>, String>>()?;
    Grid::from_vec(width, height, values)
}

pub fn parse_frame(line: &str, width: usize, height: usize) -> Result<Frame, String> {
    let cells = width * height;
    let mut tokens = line.split_whitespace();

    let mut owners = Vec::with_capacity(cells);
    while owners.len() < cells {
        let count: usize = match tokens.next() {
            Some(t) => parse_value(t, "run length")?,
            None => {
                return Err(format!(
                    "Frame ended after {} of {} owner cells",
                    owners.len(),
                    cells
                ))
            }
        };
        let owner: u16 = match tokens.next() {
            Some(t) => parse_value(t, "owner")?,
            None => return Err("Frame ended inside an owner run".to_string()),
        };
        if count == 0 || owners.len() + count > cells {
            return Err(format!(
                "Owner run of {} at cell {} does not fit a {}-cell map",
                count,
                owners.len(),
                cells
            ));
        }
        owners.extend(std::iter::repeat(owner).take(count));
    }

    let strength = tokens
        .map(|t| parse_value(t, "strength"))
        .collect::<Result<Vec<u16>, String>>()?;
    if strength.len() != cells {
        return Err(format!(
            "Expected {} strength values, got {}",
            cells,
            strength.len()
        ));
    }

    Ok(Frame {
        owners: Grid::from_vec(width, height, owners)?,
        strength: Grid::from_vec(width, height, strength)?,
    })
}

/// Encodes moves as space-separated "x y direction" triples
pub fn format_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| format!("{} {} {}", m.x, m.y, m.direction.code()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line-oriented connection to the game environment
pub struct Connection<R, W> {
    lines: Lines<R>,
    writer: W,
}

impl<R, W> Connection<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Connection {
            lines: reader.lines(),
            writer,
        }
    }

    /// Next line, or None once the environment closes the stream
    async fn next_line(&mut self) -> Result<Option<String>, String> {
        self.lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read from game: {}", e))
    }

    async fn require_line(&mut self, what: &str) -> Result<String, String> {
        self.next_line()
            .await?
            .ok_or_else(|| format!("Game closed the stream before sending {}", what))
    }

    pub async fn read_init(&mut self) -> Result<InitData, String> {
        let my_id = parse_my_id(&self.require_line("the player id").await?)?;
        let (width, height) = parse_dimensions(&self.require_line("the map size").await?)?;
        let production =
            parse_production(&self.require_line("production").await?, width, height)?;
        let frame = parse_frame(&self.require_line("the initial frame").await?, width, height)?;

        Ok(InitData {
            my_id,
            width,
            height,
            production,
            frame,
        })
    }

    /// Reads the next turn's frame; Ok(None) means the game is over
    pub async fn read_frame(&mut self, width: usize, height: usize) -> Result<Option<Frame>, String> {
        match self.next_line().await? {
            Some(line) => parse_frame(&line, width, height).map(Some),
            None => Ok(None),
        }
    }

    pub async fn send_init(&mut self, name: &str) -> Result<(), String> {
        self.send_line(name).await
    }

    pub async fn send_moves(&mut self, moves: &[Move]) -> Result<(), String> {
        self.send_line(&format_moves(moves)).await
    }

    async fn send_line(&mut self, line: &str) -> Result<(), String> {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .map_err(|e| format!("Failed to write to game: {}", e))?;
        self.writer
            .flush()
            .await
            .map_err(|e| format!("Failed to flush to game: {}", e))
    }

    /// Gives back the writer, mainly so tests can inspect what was sent
    pub fn into_writer(self) -> W {
        self.writer
    }
}
