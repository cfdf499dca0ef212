//! Neighbor discovery: classify every nonzero column as owned or remote.
//!
//! For a nonzero at row `i` (global id `row`) and remote column `col` owned by
//! rank `r`, this process must receive `col` from `r`. Because the sparsity
//! pattern is assumed structurally symmetric, row `col` on rank `r` has a
//! nonzero in column `row`, so `r` needs `row` from us: the send side is
//! derived from the receive side instead of being negotiated.
//!
//! A pattern that is not symmetric across the partition boundary produces a
//! wrong send side; [`CommSchedule::validate`] detects the count-level symptoms.

use crate::data::sparse_matrix::SparseMatrix;
use crate::halo_error::HaloError;
use crate::overlap::schedule::CommSchedule;
use crate::topology::ownership::OwnershipResolver;

/// Build the send/receive schedule of `matrix` in a single pass over its
/// nonzeros.
///
/// # Errors
/// Ownership-resolution failures are returned as soon as they occur.
pub fn discover_neighbors<R>(matrix: &SparseMatrix, resolver: &R) -> Result<CommSchedule, HaloError>
where
    R: OwnershipResolver + ?Sized,
{
    let rank = resolver.rank();
    matrix.local_to_global().iter().enumerate().try_fold(
        CommSchedule::new(rank),
        |mut schedule, (i, &row)| {
            for &col in matrix.global_row(i) {
                let owner = resolver.checked_owner_of(col)?;
                log::trace!("rank {rank}: row {row} col {col} owner {owner}");
                if owner != rank {
                    schedule.record(owner, row, col);
                }
            }
            Ok(schedule)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ownership::RowBlocks;

    #[test]
    fn remote_columns_land_in_receive_and_rows_in_send() {
        // rank 1 of [0,2) [2,4) [4,6)
        let blocks = RowBlocks::new(vec![0, 2, 4, 6], 1).unwrap();
        let m = SparseMatrix::from_rows(vec![2, 3], vec![vec![1, 2, 3], vec![2, 3, 4, 5]]).unwrap();
        let s = discover_neighbors(&m, &blocks).unwrap();
        assert_eq!(s.neighbor_ranks().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(s.receive_from(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(s.send_to(0).collect::<Vec<_>>(), vec![2]);
        assert_eq!(s.receive_from(2).collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(s.send_to(2).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn unresolvable_column_aborts_discovery() {
        let blocks = RowBlocks::even(4, 2, 0).unwrap();
        let m = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 9], vec![1]]).unwrap();
        assert_eq!(
            discover_neighbors(&m, &blocks),
            Err(HaloError::UnresolvedOwner { global: 9, size: 2 })
        );
    }

    #[test]
    fn fully_local_rows_yield_empty_schedule() {
        let blocks = RowBlocks::even(4, 2, 1).unwrap();
        let m = SparseMatrix::from_rows(vec![2, 3], vec![vec![2, 3], vec![3]]).unwrap();
        assert!(discover_neighbors(&m, &blocks).unwrap().is_empty());
    }
}
