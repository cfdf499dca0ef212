mod util;

use sparse_halo::prelude::*;
use util::{assert_cross_rank_consistent, assert_round_trip};

// rank 0 owns rows {0,1}, rank 1 owns {2,3}; row 0 couples to column 2 and
// row 2 couples to column 0.
fn build(rank: usize) -> (RowBlocks, SparseMatrix) {
    let blocks = RowBlocks::new(vec![0, 2, 4], rank).unwrap();
    let a = match rank {
        0 => SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 2], vec![1]]),
        _ => SparseMatrix::from_rows(vec![2, 3], vec![vec![0, 2], vec![3]]),
    }
    .unwrap();
    (blocks, a)
}

fn set_up(rank: usize) -> SparseMatrix {
    let (blocks, mut a) = build(rank);
    setup_halo(&blocks, &mut a, &HaloConfig::strict()).unwrap();
    a
}

#[test]
fn rank_zero_plan() {
    let a = set_up(0);
    let plan = a.halo().unwrap();
    assert_eq!(plan.neighbors(), &[1]);
    assert_eq!(plan.number_of_send_neighbors(), 1);
    assert_eq!(plan.receive_length(), &[1]);
    assert_eq!(plan.send_length(), &[1]);
    assert_eq!(plan.elements_to_send(), &[0]);
    assert_eq!(plan.total_to_be_sent(), 1);
    assert_eq!(a.external_map().unwrap().get(2), Some(2));
    assert_eq!(a.number_of_external_values(), 1);
    assert_eq!(a.local_number_of_columns(), 3);
    assert_eq!(a.local_row(0), &[0, 2]);
    assert_eq!(a.local_row(1), &[1]);
}

#[test]
fn rank_one_plan_mirrors_rank_zero() {
    let a = set_up(1);
    let plan = a.halo().unwrap();
    assert_eq!(plan.neighbors(), &[0]);
    assert_eq!(plan.receive_length(), &[1]);
    assert_eq!(plan.send_length(), &[1]);
    // local index of global row 2
    assert_eq!(plan.elements_to_send(), &[0]);
    assert_eq!(a.external_map().unwrap().get(0), Some(2));
    assert_eq!(a.local_number_of_columns(), 3);
    assert_eq!(a.local_row(0), &[2, 0]);
    assert_eq!(a.local_row(1), &[1]);
}

#[test]
fn both_ranks_agree() {
    let (a0, a1) = (set_up(0), set_up(1));
    assert_round_trip(&a0);
    assert_round_trip(&a1);
    assert_cross_rank_consistent(&[&a0, &a1]);
}

#[test]
fn send_buffer_is_sized_and_packs_owned_values() {
    let mut a = set_up(0);
    let (plan, buf) = a.halo_mut().unwrap();
    assert_eq!(buf.len(), plan.total_to_be_sent());
    let x = [3.5, 4.5, f64::NAN];
    assert_eq!(buf.pack(plan, &x).unwrap(), &[3.5]);
}
