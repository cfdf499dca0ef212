//! HaloError: unified error type for halo setup.
//!
//! Every failure in this crate is fatal for the setup step that produced it:
//! either a complete, validated communication plan exists or setup fails.

use crate::{GlobalIndex, Rank};
use std::fmt;
use thiserror::Error;

/// Send/receive disagreement for one neighbor rank.
///
/// A side that does not list the neighbor at all is reported with a count of 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NeighborMismatch {
    pub neighbor: Rank,
    pub send: usize,
    pub receive: usize,
}

impl fmt::Display for NeighborMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "neighbor {} send/recv = {}/{}",
            self.neighbor, self.send, self.receive
        )
    }
}

fn list_mismatches(mismatches: &[NeighborMismatch]) -> String {
    use itertools::Itertools;
    mismatches.iter().join(", ")
}

/// Unified error type for halo setup operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HaloError {
    /// The ownership resolver could not place a global identifier in any partition.
    #[error("global index {global} does not belong to any of the {size} partitions")]
    UnresolvedOwner { global: GlobalIndex, size: usize },
    /// The resolver returned a rank outside `0..size`.
    #[error("ownership resolver returned rank {owner} for global index {global}, but size is {size}")]
    OwnerOutOfRange {
        global: GlobalIndex,
        owner: Rank,
        size: usize,
    },
    /// Row-block offsets are not a valid partition.
    #[error("invalid row partition: {0}")]
    InvalidPartition(String),
    /// Process grid and rank/size are inconsistent.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Matrix rows and the local-to-global map disagree.
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),
    /// Send and receive schedules are not mirror images of each other.
    ///
    /// Either the sparsity pattern is not structurally symmetric across the
    /// partition boundary, or the ownership resolver is inconsistent.
    #[error(
        "asymmetric halo schedule on rank {rank}: total send/recv = {total_send}/{total_receive}; {}",
        list_mismatches(.mismatches)
    )]
    AsymmetricSchedule {
        rank: Rank,
        total_send: usize,
        total_receive: usize,
        mismatches: Vec<NeighborMismatch>,
    },
    /// A global id resolved to this rank has no local row.
    #[error("global index {0} is owned by this rank but has no local row")]
    MissingLocalRow(GlobalIndex),
    /// A remote column was not numbered during external index assignment.
    #[error("remote column {0} has no external local index")]
    UnmappedExternal(GlobalIndex),
    /// A global identifier does not fit the local index type.
    #[error("global index {0} does not fit in a local index")]
    IndexOverflow(GlobalIndex),
    /// Reserving storage for a schedule array failed.
    #[error("failed to allocate {len} entries for {what}")]
    Allocation { what: &'static str, len: usize },
    /// A buffer or vector does not have the length the plan requires.
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The matrix already carries a halo plan.
    #[error("halo has already been set up for this matrix")]
    AlreadyInitialized,
    /// A structural invariant of the plan or matrix does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
