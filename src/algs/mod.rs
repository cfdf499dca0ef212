//! Halo setup algorithms.
//!
//! Setup is a strict sequence: [`discovery`] builds the schedule, the schedule
//! is validated, [`numbering`] assigns external indices and builds the plan,
//! and only then [`rewrite`] converts the matrix columns. [`setup_halo`] drives
//! the sequence.

pub mod discovery;
pub mod numbering;
pub mod rewrite;
pub mod setup_halo;

pub use discovery::discover_neighbors;
pub use numbering::assign_external_indices;
pub use rewrite::{copy_global_columns, rewrite_local_columns};
pub use setup_halo::{setup_halo, setup_halo_default};

use crate::halo_error::HaloError;

/// Empty vector with room for exactly `len` items, or an allocation error.
pub(crate) fn try_vec<T>(len: usize, what: &'static str) -> Result<Vec<T>, HaloError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| HaloError::Allocation { what, len })?;
    Ok(v)
}
