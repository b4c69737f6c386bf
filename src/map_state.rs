// Per-turn map snapshot
//
// A MapState is derived from scratch every turn from the raw frame; nothing is
// carried over from the previous turn. All derived fields are row-major grids of
// the same dimensions as the topology.

use serde::{Deserialize, Serialize};

use crate::topology::GridTopology;
use crate::types::{Coord, Grid, Ownership};

/// Heuristic value of owned cells, strictly below any capturable cell's score
pub const OWNED_HEURISTIC: f64 = -1.0;

/// Raw per-turn input handed over by the protocol layer
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Frame {
    pub owners: Grid<u16>,
    pub strength: Grid<u16>,
}

/// Binary operator folded over the 4 orthogonal neighbors of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Max,
}

impl Reduction {
    fn apply(self, a: u32, b: u32) -> u32 {
        match self {
            Reduction::Sum => a + b,
            Reduction::Max => a.max(b),
        }
    }
}

/// Reduces the N, E, S, W neighbor values of every cell (wrapping, center excluded).
pub fn plus_reduce(topology: &GridTopology, values: &[u32], reduction: Reduction) -> Vec<u32> {
    assert_eq!(
        values.len(),
        topology.cell_count(),
        "plus_reduce input does not match the {}x{} map",
        topology.width(),
        topology.height()
    );

    (0..values.len())
        .map(|i| {
            let [n, e, s, w] = *topology.neighbor_indices(i);
            let ne = reduction.apply(values[n], values[e]);
            let sw = reduction.apply(values[s], values[w]);
            reduction.apply(ne, sw)
        })
        .collect()
}

/// Immutable view of one turn with every derived per-cell field
#[derive(Debug, Clone)]
pub struct MapState {
    my_id: u16,
    production: Grid<u16>,
    strength: Grid<u16>,
    ownership: Grid<Ownership>,
    splash_damage: Grid<u32>,
    heuristic: Grid<f64>,
    border: Grid<bool>,
    owned: Vec<Coord>,
}

impl MapState {
    /// Derives the snapshot for one turn.
    ///
    /// # Panics
    /// If any matrix does not have the topology's dimensions.
    pub fn derive(
        topology: &GridTopology,
        production: &Grid<u16>,
        frame: &Frame,
        my_id: u16,
    ) -> MapState {
        for (name, w, h) in [
            ("production", production.width(), production.height()),
            ("owners", frame.owners.width(), frame.owners.height()),
            ("strength", frame.strength.width(), frame.strength.height()),
        ] {
            assert!(
                w == topology.width() && h == topology.height(),
                "{} matrix is {}x{}, map is {}x{}",
                name,
                w,
                h,
                topology.width(),
                topology.height()
            );
        }

        let ownership = frame.owners.map(|&owner| Ownership::classify(owner, my_id));

        let enemy_strength: Vec<u32> = ownership
            .iter()
            .zip(frame.strength.iter())
            .map(|(&o, &s)| if o == Ownership::Enemy { s as u32 } else { 0 })
            .collect();
        let splash_damage = Grid::from_vec(
            topology.width(),
            topology.height(),
            plus_reduce(topology, &enemy_strength, Reduction::Sum),
        )
        .expect("plus_reduce preserves the cell count");

        let heuristic_cells = ownership
            .iter()
            .zip(production.iter())
            .zip(frame.strength.iter())
            .zip(splash_damage.iter())
            .map(|(((&o, &p), &s), &splash)| {
                if o == Ownership::Owned {
                    OWNED_HEURISTIC
                } else {
                    p as f64 / s.max(1) as f64 + splash as f64
                }
            })
            .collect();
        let heuristic = Grid::from_vec(topology.width(), topology.height(), heuristic_cells)
            .expect("heuristic has one value per cell");

        let not_owned: Vec<u32> = ownership
            .iter()
            .map(|&o| (o != Ownership::Owned) as u32)
            .collect();
        let border_cells = plus_reduce(topology, &not_owned, Reduction::Max)
            .into_iter()
            .zip(ownership.iter())
            .map(|(reduced, &o)| o == Ownership::Owned && reduced >= 1)
            .collect();
        let border = Grid::from_vec(topology.width(), topology.height(), border_cells)
            .expect("border has one flag per cell");

        let owned = ownership
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == Ownership::Owned)
            .map(|(i, _)| topology.coord(i))
            .collect();

        MapState {
            my_id,
            production: production.clone(),
            strength: frame.strength.clone(),
            ownership,
            splash_damage,
            heuristic,
            border,
            owned,
        }
    }

    pub fn my_id(&self) -> u16 {
        self.my_id
    }

    pub fn width(&self) -> usize {
        self.ownership.width()
    }

    pub fn height(&self) -> usize {
        self.ownership.height()
    }

    pub fn ownership(&self, coord: Coord) -> Ownership {
        self.ownership[coord]
    }

    pub fn is_owned(&self, coord: Coord) -> bool {
        self.ownership[coord] == Ownership::Owned
    }

    pub fn strength(&self, coord: Coord) -> u16 {
        self.strength[coord]
    }

    pub fn production(&self, coord: Coord) -> u16 {
        self.production[coord]
    }

    pub fn splash_damage(&self, coord: Coord) -> u32 {
        self.splash_damage[coord]
    }

    pub fn heuristic(&self, coord: Coord) -> f64 {
        self.heuristic[coord]
    }

    pub fn is_border(&self, coord: Coord) -> bool {
        self.border[coord]
    }

    /// Border flags in row-major order, aligned with a topology distance row
    pub fn border_mask(&self) -> &[bool] {
        self.border.as_slice()
    }

    pub fn border_count(&self) -> usize {
        self.border.iter().filter(|&&b| b).count()
    }

    /// Owned coordinates in row-major order
    pub fn owned_coords(&self) -> &[Coord] {
        &self.owned
    }
}
