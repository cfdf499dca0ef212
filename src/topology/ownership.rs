//! Ownership resolution for global row/column identifiers.
//!
//! An [`OwnershipResolver`] maps any global identifier to the rank that owns the
//! corresponding row. Halo setup treats it as a black box, but relies on it being
//! a pure function that every process evaluates identically.

use crate::halo_error::HaloError;
use crate::{GlobalIndex, Rank};

/// Maps global identifiers to owning ranks.
pub trait OwnershipResolver: Sync {
    /// Rank of the calling process.
    fn rank(&self) -> Rank;

    /// Number of cooperating processes.
    fn size(&self) -> usize;

    /// Owning rank of `global`.
    ///
    /// # Errors
    /// [`HaloError::UnresolvedOwner`] if `global` lies outside every partition.
    fn owner_of(&self, global: GlobalIndex) -> Result<Rank, HaloError>;

    /// `true` if more than one process shares the matrix.
    fn is_distributed(&self) -> bool {
        self.size() > 1
    }

    /// Owning rank of `global`, checked against `0..size()`.
    fn checked_owner_of(&self, global: GlobalIndex) -> Result<Rank, HaloError> {
        let owner = self.owner_of(global)?;
        if owner >= self.size() {
            return Err(HaloError::OwnerOutOfRange {
                global,
                owner,
                size: self.size(),
            });
        }
        Ok(owner)
    }
}

/// Contiguous 1-D row blocks: rank `r` owns `offsets[r]..offsets[r + 1]`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RowBlocks {
    offsets: Vec<GlobalIndex>,
    rank: Rank,
}

impl RowBlocks {
    /// Build from `size + 1` non-decreasing offsets starting at 0.
    ///
    /// # Errors
    /// [`HaloError::InvalidPartition`] if the offsets are empty, do not start at
    /// zero, decrease, or `rank` is not one of the blocks.
    pub fn new(offsets: Vec<GlobalIndex>, rank: Rank) -> Result<Self, HaloError> {
        if offsets.len() < 2 {
            return Err(HaloError::InvalidPartition(format!(
                "need at least 2 offsets, got {}",
                offsets.len()
            )));
        }
        if offsets[0] != 0 {
            return Err(HaloError::InvalidPartition(format!(
                "first offset must be 0, got {}",
                offsets[0]
            )));
        }
        if let Some(w) = offsets.windows(2).find(|w| w[0] > w[1]) {
            return Err(HaloError::InvalidPartition(format!(
                "offsets decrease from {} to {}",
                w[0], w[1]
            )));
        }
        let size = offsets.len() - 1;
        if rank >= size {
            return Err(HaloError::InvalidPartition(format!(
                "rank {rank} out of range for {size} blocks"
            )));
        }
        Ok(Self { offsets, rank })
    }

    /// Split `n` rows over `size` ranks; the first `n % size` ranks get one extra row.
    pub fn even(n: GlobalIndex, size: usize, rank: Rank) -> Result<Self, HaloError> {
        if size == 0 {
            return Err(HaloError::InvalidPartition("size must be positive".into()));
        }
        let base = n / size as GlobalIndex;
        let extra = n % size as GlobalIndex;
        let mut offsets = Vec::with_capacity(size + 1);
        let mut next = 0;
        offsets.push(next);
        for r in 0..size as GlobalIndex {
            next += base + GlobalIndex::from(r < extra);
            offsets.push(next);
        }
        Self::new(offsets, rank)
    }

    /// Global rows owned by `rank`, or `None` if `rank` is not one of the blocks.
    pub fn rows_of(&self, rank: Rank) -> Option<std::ops::Range<GlobalIndex>> {
        match self.offsets.get(rank..rank.checked_add(2)?)? {
            &[start, end] => Some(start..end),
            _ => None,
        }
    }

    /// Global rows owned by the calling rank.
    pub fn owned_rows(&self) -> std::ops::Range<GlobalIndex> {
        // `new` guarantees `rank + 1 < offsets.len()`
        self.offsets[self.rank]..self.offsets[self.rank + 1]
    }

    /// Total number of global rows.
    pub fn global_rows(&self) -> GlobalIndex {
        self.offsets[self.offsets.len() - 1]
    }
}

impl OwnershipResolver for RowBlocks {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.offsets.len() - 1
    }

    fn owner_of(&self, global: GlobalIndex) -> Result<Rank, HaloError> {
        if global >= self.global_rows() {
            return Err(HaloError::UnresolvedOwner {
                global,
                size: self.size(),
            });
        }
        // Last offset <= global; empty blocks are skipped because the
        // partition point lands past them.
        Ok(self.offsets.partition_point(|&o| o <= global) - 1)
    }
}
