//! MapState derivation tests
//!
//! Covers the ownership partition, the owned-cell heuristic sentinel and border
//! detection on random frames, plus the hand-checked 3x3 scenario.

use proptest::prelude::*;

use overkill_bot::map_state::{Frame, MapState, OWNED_HEURISTIC};
use overkill_bot::topology::GridTopology;
use overkill_bot::types::{Coord, Grid, Ownership};

const MY_ID: u16 = 1;

fn random_map() -> impl Strategy<Value = (usize, usize, Vec<u16>, Vec<u16>, Vec<u16>)> {
    (3usize..9, 3usize..9).prop_flat_map(|(w, h)| {
        let cells = w * h;
        (
            Just(w),
            Just(h),
            proptest::collection::vec(0u16..4, cells),
            proptest::collection::vec(0u16..256, cells),
            proptest::collection::vec(0u16..16, cells),
        )
    })
}

fn derive(w: usize, h: usize, owners: Vec<u16>, strength: Vec<u16>, production: Vec<u16>) -> (GridTopology, MapState) {
    let topo = GridTopology::build(w, h);
    let frame = Frame {
        owners: Grid::from_vec(w, h, owners).unwrap(),
        strength: Grid::from_vec(w, h, strength).unwrap(),
    };
    let state = MapState::derive(&topo, &Grid::from_vec(w, h, production).unwrap(), &frame, MY_ID);
    (topo, state)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_classification_partitions_cells((w, h, owners, strength, production) in random_map()) {
        let (topo, state) = derive(w, h, owners.clone(), strength, production);
        for (i, &owner) in owners.iter().enumerate() {
            let c = topo.coord(i);
            let expected = if owner == MY_ID {
                Ownership::Owned
            } else if owner == 0 {
                Ownership::Neutral
            } else {
                Ownership::Enemy
            };
            prop_assert_eq!(state.ownership(c), expected);
        }
        prop_assert_eq!(
            state.owned_coords().len(),
            owners.iter().filter(|&&o| o == MY_ID).count()
        );
    }

    #[test]
    fn prop_owned_cells_carry_sentinel_heuristic((w, h, owners, strength, production) in random_map()) {
        let (_topo, state) = derive(w, h, owners, strength, production);
        for &c in state.owned_coords() {
            prop_assert_eq!(state.heuristic(c), OWNED_HEURISTIC);
        }
    }

    #[test]
    fn prop_unowned_heuristic_is_ratio_plus_splash((w, h, owners, strength, production) in random_map()) {
        let (topo, state) = derive(w, h, owners, strength, production);
        for i in 0..topo.cell_count() {
            let c = topo.coord(i);
            if state.is_owned(c) {
                continue;
            }
            let splash: u32 = topo
                .neighbors(c)
                .iter()
                .filter(|&&n| state.ownership(n) == Ownership::Enemy)
                .map(|&n| state.strength(n) as u32)
                .sum();
            prop_assert_eq!(state.splash_damage(c), splash);
            let expected = state.production(c) as f64 / state.strength(c).max(1) as f64 + splash as f64;
            prop_assert!(state.heuristic(c) >= 0.0);
            prop_assert!((state.heuristic(c) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_border_iff_owned_with_unowned_neighbor((w, h, owners, strength, production) in random_map()) {
        let (topo, state) = derive(w, h, owners, strength, production);
        for i in 0..topo.cell_count() {
            let c = topo.coord(i);
            let expected = state.is_owned(c)
                && topo.neighbors(c).iter().any(|&n| !state.is_owned(n));
            prop_assert_eq!(state.is_border(c), expected);
        }
    }
}

#[test]
fn test_three_by_three_scenario() {
    // Row-major: y is the row, x the column
    let (_topo, state) = derive(
        3,
        3,
        vec![1, 0, 0, 0, 0, 0, 0, 0, 2],
        vec![10; 9],
        vec![5; 9],
    );

    assert!(state.is_owned(Coord::new(0, 0)));
    assert!(state.is_border(Coord::new(0, 0)));
    assert_eq!(state.owned_coords(), &[Coord::new(0, 0)]);

    // (1,0) is neutral and has no enemy neighbor
    assert_eq!(state.ownership(Coord::new(1, 0)), Ownership::Neutral);
    assert_eq!(state.heuristic(Coord::new(1, 0)), 0.5);

    // (0,2) touches the enemy at (2,2) across the west seam
    assert_eq!(state.splash_damage(Coord::new(0, 2)), 10);
    assert_eq!(state.heuristic(Coord::new(0, 2)), 10.5);
}

#[test]
fn test_fully_owned_map_has_no_border() {
    let (topo, state) = derive(4, 3, vec![1; 12], vec![7; 12], vec![2; 12]);
    assert_eq!(state.owned_coords().len(), topo.cell_count());
    assert_eq!(state.border_count(), 0);
    assert!(state.border_mask().iter().all(|&b| !b));
}
