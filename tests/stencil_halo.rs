mod util;

use sparse_halo::prelude::*;
use util::{
    assert_cross_rank_consistent, assert_dense_external_block, assert_round_trip,
    assert_symmetric_plan, stencil_ranks,
};

const GRIDS: &[(usize, usize, usize)] = &[(2, 1, 1), (1, 3, 1), (2, 2, 2), (3, 1, 2)];

#[test]
fn every_rank_satisfies_plan_invariants() {
    for &procs in GRIDS {
        let ranks = stencil_ranks(procs, (3, 2, 2), &HaloConfig::strict());
        for (geom, a) in &ranks {
            let plan = a.halo().unwrap();
            assert_symmetric_plan(plan);
            assert_dense_external_block(a);
            assert_round_trip(a);
            assert!(a.validate_invariants().is_ok(), "rank {}", geom.rank());
        }
        let mats: Vec<&SparseMatrix> = ranks.iter().map(|(_, a)| a).collect();
        assert_cross_rank_consistent(&mats);
    }
}

#[test]
fn corner_rank_of_cube_has_seven_neighbors() {
    let ranks = stencil_ranks((2, 2, 2), (2, 2, 2), &HaloConfig::strict());
    let (_, a) = &ranks[0];
    let plan = a.halo().unwrap();
    assert_eq!(plan.neighbors(), &[1, 2, 3, 4, 5, 6, 7]);
    // face neighbors share 4 points, edge neighbors 2, the corner neighbor 1
    assert_eq!(plan.receive_length(), &[4, 4, 2, 4, 2, 2, 1]);
    assert_eq!(a.number_of_external_values(), 19);
    assert_eq!(a.local_number_of_columns(), 8 + 19);
}

#[test]
fn serial_and_parallel_rewrite_agree() {
    let serial = HaloConfig {
        validation: Validation::Always,
        rewrite: RewriteStrategy::Serial,
    };
    let parallel = HaloConfig {
        validation: Validation::Always,
        rewrite: RewriteStrategy::Parallel,
    };
    let a = stencil_ranks((2, 2, 1), (4, 3, 2), &serial);
    let b = stencil_ranks((2, 2, 1), (4, 3, 2), &parallel);
    for ((_, x), (_, y)) in a.iter().zip(&b) {
        assert_eq!(x.halo(), y.halo());
        for i in 0..x.local_number_of_rows() {
            assert_eq!(x.local_row(i), y.local_row(i));
        }
    }
}

#[test]
fn repeated_setup_is_byte_identical() {
    let first = stencil_ranks((3, 1, 2), (2, 3, 2), &HaloConfig::strict());
    let second = stencil_ranks((3, 1, 2), (2, 3, 2), &HaloConfig::strict());
    for ((_, x), (_, y)) in first.iter().zip(&second) {
        let px = serde_json::to_vec(x.halo().unwrap()).unwrap();
        let py = serde_json::to_vec(y.halo().unwrap()).unwrap();
        assert_eq!(px, py);
        let ex = serde_json::to_vec(x.external_map().unwrap()).unwrap();
        let ey = serde_json::to_vec(y.external_map().unwrap()).unwrap();
        assert_eq!(ex, ey);
    }
}

#[test]
fn single_rank_geometry_copies_global_columns() {
    let ranks = stencil_ranks((1, 1, 1), (3, 3, 2), &HaloConfig::default());
    let (_, a) = &ranks[0];
    assert_eq!(a.number_of_external_values(), 0);
    assert_eq!(a.local_number_of_columns(), a.local_number_of_rows());
    for i in 0..a.local_number_of_rows() {
        let copied: Vec<u64> = a.local_row(i).iter().map(|&j| j as u64).collect();
        assert_eq!(copied, a.global_row(i));
    }
    assert_eq!(a.halo().unwrap().links().count(), 0);
}
