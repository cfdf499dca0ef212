//! Column rewrite (phase B): global column ids to local column ids.
//!
//! Rows are independent: each reads the shared, read-only maps and produces its
//! own local column list, so rows can be processed in parallel. The new lists
//! are returned rather than written into the matrix, so a failure leaves the
//! matrix untouched.

use crate::config::RewriteStrategy;
use crate::data::sparse_matrix::SparseMatrix;
use crate::halo_error::HaloError;
use crate::overlap::external_map::ExternalIndexMap;
use crate::topology::ownership::OwnershipResolver;
use crate::{GlobalIndex, LocalIndex};

/// Local column lists for every row of `matrix`.
///
/// Owned columns resolve through the matrix's global-to-local map, remote
/// columns through `external`.
///
/// # Errors
/// - ownership-resolution failures;
/// - [`HaloError::MissingLocalRow`] for an owned column with no local row;
/// - [`HaloError::UnmappedExternal`] for a remote column absent from `external`.
pub fn rewrite_local_columns<R>(
    matrix: &SparseMatrix,
    resolver: &R,
    external: &ExternalIndexMap,
    strategy: RewriteStrategy,
) -> Result<Vec<Vec<LocalIndex>>, HaloError>
where
    R: OwnershipResolver + ?Sized,
{
    let rank = resolver.rank();
    let owned = matrix.global_to_local_map();
    let localize = |&global: &GlobalIndex| -> Result<LocalIndex, HaloError> {
        if resolver.checked_owner_of(global)? == rank {
            owned
                .get(&global)
                .copied()
                .ok_or(HaloError::MissingLocalRow(global))
        } else {
            external
                .get(global)
                .ok_or(HaloError::UnmappedExternal(global))
        }
    };
    map_rows(matrix.global_rows(), strategy, |row| {
        row.iter().map(&localize).collect()
    })
}

/// Single-partition rewrite: local column ids are the global ids.
///
/// # Errors
/// - [`HaloError::IndexOverflow`] if an id does not fit a local index;
/// - [`HaloError::InvalidMatrix`] if an id is not below the number of rows,
///   i.e. the rows are not numbered `0..n`.
pub fn copy_global_columns(
    matrix: &SparseMatrix,
    strategy: RewriteStrategy,
) -> Result<Vec<Vec<LocalIndex>>, HaloError> {
    let nrows = matrix.local_number_of_rows();
    map_rows(matrix.global_rows(), strategy, |row| {
        row.iter()
            .map(|&global| {
                let local =
                    LocalIndex::try_from(global).map_err(|_| HaloError::IndexOverflow(global))?;
                if local >= nrows {
                    return Err(HaloError::InvalidMatrix(format!(
                        "column {global} outside the {nrows} rows of a single partition"
                    )));
                }
                Ok(local)
            })
            .collect()
    })
}

#[cfg(feature = "rayon")]
fn map_rows<F>(
    rows: &[Vec<GlobalIndex>],
    strategy: RewriteStrategy,
    f: F,
) -> Result<Vec<Vec<LocalIndex>>, HaloError>
where
    F: Fn(&Vec<GlobalIndex>) -> Result<Vec<LocalIndex>, HaloError> + Sync + Send,
{
    use rayon::prelude::*;
    if strategy.is_parallel() {
        rows.par_iter().map(f).collect()
    } else {
        rows.iter().map(f).collect()
    }
}

#[cfg(not(feature = "rayon"))]
fn map_rows<F>(
    rows: &[Vec<GlobalIndex>],
    _strategy: RewriteStrategy,
    f: F,
) -> Result<Vec<Vec<LocalIndex>>, HaloError>
where
    F: Fn(&Vec<GlobalIndex>) -> Result<Vec<LocalIndex>, HaloError>,
{
    rows.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ownership::RowBlocks;

    #[test]
    fn owned_and_remote_columns_resolve() {
        let blocks = RowBlocks::even(4, 2, 0).unwrap();
        let m = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 1, 2], vec![1, 3]]).unwrap();
        let mut ext = ExternalIndexMap::new(2);
        ext.assign_next(2);
        ext.assign_next(3);
        for strategy in [RewriteStrategy::Serial, RewriteStrategy::Parallel] {
            let local = rewrite_local_columns(&m, &blocks, &ext, strategy).unwrap();
            assert_eq!(local, vec![vec![0, 1, 2], vec![1, 3]]);
        }
    }

    #[test]
    fn unnumbered_remote_column_is_an_error() {
        let blocks = RowBlocks::even(4, 2, 0).unwrap();
        let m = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 3], vec![1]]).unwrap();
        let ext = ExternalIndexMap::new(2);
        assert_eq!(
            rewrite_local_columns(&m, &blocks, &ext, RewriteStrategy::Serial),
            Err(HaloError::UnmappedExternal(3))
        );
    }

    #[test]
    fn copy_requires_identity_numbering() {
        let m = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 1], vec![1, 0]]).unwrap();
        assert_eq!(
            copy_global_columns(&m, RewriteStrategy::Serial).unwrap(),
            vec![vec![0, 1], vec![1, 0]]
        );
        let bad = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 5], vec![1]]).unwrap();
        assert!(matches!(
            copy_global_columns(&bad, RewriteStrategy::Parallel),
            Err(HaloError::InvalidMatrix(_))
        ));
    }
}
