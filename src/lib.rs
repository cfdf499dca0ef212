#![cfg_attr(docsrs, feature(doc_cfg))]
//! # sparse-halo
//!
//! sparse-halo builds the halo-exchange plan of a row-partitioned distributed
//! sparse matrix. Each process owns a block of rows; a nonzero whose column is
//! owned by another process needs that process's value during a matrix-vector
//! product. Halo setup finds those columns, decides who sends what to whom, and
//! renumbers the matrix columns so that owned rows come first and received
//! values follow in one contiguous block.
//!
//! ## Features
//! - Deterministic neighbor discovery over ordered containers: every process
//!   derives a numbering consistent with its neighbors without communicating
//! - Structural-symmetry validation with per-neighbor diagnostics
//! - An immutable [`HaloPlan`](overlap::halo_plan::HaloPlan) with a separately
//!   owned [`SendBuffer`](data::send_buffer::SendBuffer)
//! - Row-parallel column rewrite with the `rayon` feature
//! - Pluggable ownership resolution: contiguous row blocks or a 3-D process grid
//!
//! ## Determinism
//!
//! Running setup twice on the same matrix and partition yields identical plans.
//! Neighbors are ordered by rank and identifiers by global id; no hashed
//! container is iterated on the way to the plan.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! sparse-halo = "0.1"
//! # features = ["rayon", "check-invariants"]
//! ```

pub mod algs;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod halo_error;
pub mod overlap;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// Process rank.
pub type Rank = usize;
/// Partition-independent row/column identifier.
pub type GlobalIndex = u64;
/// Process-local row/column index.
pub type LocalIndex = usize;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::setup_halo::{setup_halo, setup_halo_default};
    pub use crate::config::{HaloConfig, RewriteStrategy, Validation};
    pub use crate::data::send_buffer::SendBuffer;
    pub use crate::data::sparse_matrix::SparseMatrix;
    pub use crate::data::stencil::generate_stencil_matrix;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::halo_error::{HaloError, NeighborMismatch};
    pub use crate::overlap::external_map::ExternalIndexMap;
    pub use crate::overlap::halo_plan::{HaloPlan, NeighborLink};
    pub use crate::overlap::schedule::CommSchedule;
    pub use crate::topology::geometry::Geometry;
    pub use crate::topology::ownership::{OwnershipResolver, RowBlocks};
    pub use crate::{GlobalIndex, LocalIndex, Rank};
}
