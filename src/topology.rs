// Toroidal grid topology
//
// Everything here depends only on the map dimensions, so it is built once at
// startup (inside the generous init budget) and shared read-only by every turn:
// - the full pairwise distance table (cells x cells, O(w^2 h^2))
// - the N/E/S/W neighbor table (cells x 4)

use rayon::prelude::*;

use crate::types::Coord;

/// Distances and adjacency for a width x height map that wraps on both axes
#[derive(Debug, Clone)]
pub struct GridTopology {
    width: usize,
    height: usize,
    /// Row-major by source cell: `distances[src * cells + dst]`
    distances: Vec<u16>,
    /// Neighbor cell indices in N, E, S, W order
    neighbors: Vec<[usize; 4]>,
}

impl GridTopology {
    /// Precomputes the distance and neighbor tables.
    ///
    /// The distance row of (0, 0) is computed from the closed form once, every other
    /// row is a translated copy of it. Rows are filled in parallel.
    pub fn build(width: usize, height: usize) -> Self {
        assert!(
            width > 0 && height > 0,
            "map dimensions must be positive, got {}x{}",
            width,
            height
        );
        assert!(
            width / 2 + height / 2 <= u16::MAX as usize,
            "map {}x{} too large for the distance table",
            width,
            height
        );

        let cells = width * height;

        let base: Vec<u16> = (0..cells)
            .map(|i| Self::wrapped_distance(i % width, i / width, width, height))
            .collect();

        let mut distances = vec![0u16; cells * cells];
        distances
            .par_chunks_mut(cells)
            .enumerate()
            .for_each(|(src, row)| {
                let (sx, sy) = (src % width, src / width);
                for ty in 0..height {
                    let dy = (ty + height - sy) % height;
                    for tx in 0..width {
                        let dx = (tx + width - sx) % width;
                        row[ty * width + tx] = base[dy * width + dx];
                    }
                }
            });

        let neighbors = (0..cells)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                [
                    ((y + height - 1) % height) * width + x,
                    y * width + (x + 1) % width,
                    ((y + 1) % height) * width + x,
                    y * width + (x + width - 1) % width,
                ]
            })
            .collect();

        GridTopology {
            width,
            height,
            distances,
            neighbors,
        }
    }

    /// Closed-form toroidal Manhattan distance for an axis offset (dx, dy), with the
    /// zero offset clamped to 1
    fn wrapped_distance(dx: usize, dy: usize, width: usize, height: usize) -> u16 {
        let dx = dx % width;
        let dy = dy % height;
        let d = dx.min(width - dx) + dy.min(height - dy);
        d.max(1) as u16
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Row-major index of `coord`. Panics on an out-of-bounds coordinate.
    pub fn index(&self, coord: Coord) -> usize {
        assert!(
            coord.x < self.width && coord.y < self.height,
            "coordinate ({}, {}) outside {}x{} map",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y * self.width + coord.x
    }

    pub fn coord(&self, index: usize) -> Coord {
        assert!(index < self.cell_count(), "cell index {} out of range", index);
        Coord::new(index % self.width, index / self.width)
    }

    /// Precomputed distance between two cells (1 when `a == b`)
    pub fn distance(&self, a: Coord, b: Coord) -> u16 {
        self.distance_row(a)[self.index(b)]
    }

    /// Distances from `source` to every cell, in row-major target order
    pub fn distance_row(&self, source: Coord) -> &[u16] {
        let cells = self.cell_count();
        let start = self.index(source) * cells;
        &self.distances[start..start + cells]
    }

    /// Distance computed directly from the closed form, without the table
    pub fn toroidal_distance(&self, a: Coord, b: Coord) -> u16 {
        let dx = (b.x + self.width - a.x) % self.width;
        let dy = (b.y + self.height - a.y) % self.height;
        Self::wrapped_distance(dx, dy, self.width, self.height)
    }

    /// The 4 orthogonal neighbors of `coord` in N, E, S, W order
    pub fn neighbors(&self, coord: Coord) -> [Coord; 4] {
        let idx = self.neighbor_indices(self.index(coord));
        [
            self.coord(idx[0]),
            self.coord(idx[1]),
            self.coord(idx[2]),
            self.coord(idx[3]),
        ]
    }

    pub fn neighbor_indices(&self, index: usize) -> &[usize; 4] {
        &self.neighbors[index]
    }
}
