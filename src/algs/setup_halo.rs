//! Halo setup: build the communication plan and the local column indices of a
//! row-partitioned matrix.
//!
//! # Precondition
//!
//! The sparsity pattern must be structurally symmetric across partition
//! boundaries: if row `a` has a nonzero in column `b`, row `b` has one in
//! column `a`. The send side of the plan is derived from this, not negotiated
//! with the neighbors. With [`Validation`](crate::config::Validation) enabled
//! a violation that shows up in the per-neighbor counts fails setup with
//! [`HaloError::AsymmetricSchedule`].
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), sparse_halo::halo_error::HaloError> {
//! use sparse_halo::prelude::*;
//!
//! // Rank 0 of two ranks owning rows {0,1} and {2,3}.
//! let blocks = RowBlocks::even(4, 2, 0)?;
//! let mut a = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 2], vec![1]])?;
//! setup_halo(&blocks, &mut a, &HaloConfig::strict())?;
//!
//! let plan = a.halo().expect("plan installed");
//! assert_eq!(plan.neighbors(), &[1]);
//! assert_eq!(plan.elements_to_send(), &[0]);
//! assert_eq!(a.local_row(0), &[0, 2]);
//! assert_eq!(a.local_number_of_columns(), 3);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use crate::algs::discovery::discover_neighbors;
use crate::algs::numbering::assign_external_indices;
use crate::algs::rewrite::{copy_global_columns, rewrite_local_columns};
use crate::config::HaloConfig;
use crate::data::sparse_matrix::SparseMatrix;
use crate::halo_error::HaloError;
use crate::overlap::external_map::ExternalIndexMap;
use crate::overlap::halo_plan::HaloPlan;
use crate::topology::ownership::OwnershipResolver;
use crate::Rank;
use itertools::Itertools;

/// Build the halo plan of `matrix` and rewrite its columns to local indices.
///
/// On success the matrix carries the plan, the external index map and a send
/// buffer sized for the plan. On failure the matrix is left as it was.
///
/// With a single process every column is owned: no plan is discovered and the
/// local column ids are a copy of the global ones.
///
/// # Errors
/// - [`HaloError::AlreadyInitialized`] if the matrix already has a plan;
/// - ownership-resolution failures;
/// - [`HaloError::AsymmetricSchedule`] if validation is enabled and fails;
/// - [`HaloError::Allocation`] if plan storage cannot be reserved.
pub fn setup_halo<R>(
    resolver: &R,
    matrix: &mut SparseMatrix,
    config: &HaloConfig,
) -> Result<(), HaloError>
where
    R: OwnershipResolver + ?Sized,
{
    if matrix.has_halo() {
        return Err(HaloError::AlreadyInitialized);
    }
    let rank = resolver.rank();

    if !resolver.is_distributed() {
        let local = copy_global_columns(matrix, config.rewrite)?;
        let nrows = matrix.local_number_of_rows();
        let plan = HaloPlan::empty(nrows);
        let send_buffer = plan.acquire_send_buffer()?;
        log::debug!("rank {rank}: single partition, {nrows} rows copied");
        return matrix.install_halo(local, plan, ExternalIndexMap::new(nrows), send_buffer);
    }

    let schedule = discover_neighbors(matrix, resolver)?;
    if config.validation.enabled() {
        schedule.validate()?;
    } else {
        log::trace!("rank {rank}: schedule validation skipped");
    }

    let (plan, external) = assign_external_indices(&schedule, matrix)?;
    let local = rewrite_local_columns(matrix, resolver, &external, config.rewrite)?;
    let send_buffer = plan.acquire_send_buffer()?;
    log_plan(rank, resolver.size(), &plan);
    matrix.install_halo(local, plan, external, send_buffer)
}

/// [`setup_halo`] with [`HaloConfig::default`].
pub fn setup_halo_default<R>(resolver: &R, matrix: &mut SparseMatrix) -> Result<(), HaloError>
where
    R: OwnershipResolver + ?Sized,
{
    setup_halo(resolver, matrix, &HaloConfig::default())
}

fn log_plan(rank: Rank, size: usize, plan: &HaloPlan) {
    log::debug!(
        "For rank {rank} of {size}, number of neighbors = {}, external values = {}",
        plan.number_of_send_neighbors(),
        plan.number_of_external_values()
    );
    for link in plan.links() {
        log::debug!(
            "     rank {rank} neighbor {} send/recv length = {}/{}",
            link.rank,
            link.send.len(),
            link.receive.len()
        );
        log::trace!(
            "       rank {rank} elementsToSend to {} = [{}]",
            link.rank,
            link.send.iter().join(", ")
        );
    }
}
