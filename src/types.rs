// Halite game types
// Coordinates, directions and the per-cell matrices shared by every layer of the bot

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Cell position on the toroidal map, `0 <= x < width`, `0 <= y < height`
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Coord { x, y }
    }
}

/// Movement directive for a single cell, encoded on the wire as 0..=4
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Stay,
    North,
    East,
    South,
    West,
}

impl Direction {
    /// The four cardinal directions in neighbor-table order
    pub fn cardinals() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Wire code: 0 = stay, 1 = north, 2 = east, 3 = south, 4 = west
    pub fn code(&self) -> u8 {
        match self {
            Direction::Stay => 0,
            Direction::North => 1,
            Direction::East => 2,
            Direction::South => 3,
            Direction::West => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            0 => Some(Direction::Stay),
            1 => Some(Direction::North),
            2 => Some(Direction::East),
            3 => Some(Direction::South),
            4 => Some(Direction::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Stay => "stay",
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    /// Coordinate reached by one step in this direction, wrapping on both axes.
    /// North decreases y.
    pub fn apply(&self, coord: Coord, width: usize, height: usize) -> Coord {
        match self {
            Direction::Stay => coord,
            Direction::North => Coord::new(coord.x, (coord.y + height - 1) % height),
            Direction::East => Coord::new((coord.x + 1) % width, coord.y),
            Direction::South => Coord::new(coord.x, (coord.y + 1) % height),
            Direction::West => Coord::new((coord.x + width - 1) % width, coord.y),
        }
    }
}

/// One emitted order: the cell at (x, y) moves in `direction`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

impl Move {
    pub fn new(coord: Coord, direction: Direction) -> Self {
        Move {
            x: coord.x,
            y: coord.y,
            direction,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Per-turn classification of a cell relative to our player id
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    Owned,
    Neutral,
    Enemy,
}

impl Ownership {
    pub fn classify(owner: u16, my_id: u16) -> Ownership {
        if owner == my_id {
            Ownership::Owned
        } else if owner == 0 {
            Ownership::Neutral
        } else {
            Ownership::Enemy
        }
    }
}

/// Row-major width x height matrix (index = y * width + x)
///
/// Deserialization goes through `from_vec`, so a grid read back from a log
/// always has exactly `width * height` cells.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawGrid<T>")]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

#[derive(Deserialize)]
struct RawGrid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = String;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        Grid::from_vec(raw.width, raw.height, raw.cells)
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `fill`
    pub fn filled(width: usize, height: usize, fill: T) -> Self {
        Grid {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps a row-major vector, rejecting a length that does not match the dimensions
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Result<Self, String> {
        if cells.len() != width * height {
            return Err(format!(
                "Grid of {}x{} needs {} cells, got {}",
                width,
                height,
                width * height,
                cells.len()
            ));
        }
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Builds a grid from nested rows (`rows[y][x]`), mostly useful in tests
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, String> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != width) {
            return Err("Grid rows have inconsistent lengths".to_string());
        }
        Self::from_vec(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }

    /// Row-major index of `coord`. Panics on an out-of-bounds coordinate.
    pub fn index_of(&self, coord: Coord) -> usize {
        assert!(
            coord.x < self.width && coord.y < self.height,
            "coordinate ({}, {}) outside {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y * self.width + coord.x
    }

    pub fn get(&self, coord: Coord) -> &T {
        &self.cells[self.index_of(coord)]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    /// Applies `f` to every cell, keeping the dimensions
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T> Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, coord: Coord) -> &T {
        self.get(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_codes_round_trip_through_wire_values() {
        for code in 0..=4u8 {
            let dir = Direction::from_code(code).unwrap();
            assert_eq!(dir.code(), code);
        }
        assert_eq!(Direction::from_code(5), None);
    }

    #[test]
    fn test_apply_wraps_at_edges() {
        let corner = Coord::new(0, 0);
        assert_eq!(Direction::North.apply(corner, 4, 3), Coord::new(0, 2));
        assert_eq!(Direction::West.apply(corner, 4, 3), Coord::new(3, 0));
        assert_eq!(Direction::East.apply(Coord::new(3, 1), 4, 3), Coord::new(0, 1));
        assert_eq!(Direction::South.apply(Coord::new(2, 2), 4, 3), Coord::new(2, 0));
        assert_eq!(Direction::Stay.apply(corner, 4, 3), corner);
    }

    #[test]
    fn test_classify_partitions_owner_ids() {
        assert_eq!(Ownership::classify(1, 1), Ownership::Owned);
        assert_eq!(Ownership::classify(0, 1), Ownership::Neutral);
        assert_eq!(Ownership::classify(2, 1), Ownership::Enemy);
    }

    #[test]
    fn test_grid_is_row_major() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid[Coord::new(2, 0)], 3);
        assert_eq!(grid[Coord::new(0, 1)], 4);
    }

    #[test]
    fn test_grid_rejects_wrong_length() {
        assert!(Grid::from_vec(2, 2, vec![0u16; 3]).is_err());
        assert!(Grid::from_rows(vec![vec![0u16; 2], vec![0u16; 3]]).is_err());
    }

    #[test]
    fn test_deserialize_checks_dimensions() {
        let grid: Grid<u16> =
            serde_json::from_str(r#"{"width":2,"height":2,"cells":[1,2,3,4]}"#).unwrap();
        assert_eq!(grid[Coord::new(1, 1)], 4);

        // Height disagrees with the cell count
        let err = serde_json::from_str::<Grid<u16>>(r#"{"width":2,"height":5,"cells":[1,2,3,4]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Grid of 2x5 needs 10 cells, got 4"), "{}", err);
    }

    #[test]
    #[should_panic(expected = "outside 2x2 grid")]
    fn test_out_of_bounds_coordinate_panics() {
        let grid = Grid::filled(2, 2, 0u16);
        let _ = grid[Coord::new(2, 0)];
    }
}
