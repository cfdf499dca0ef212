//! Per-neighbor send/receive lists discovered from the sparsity pattern.
//!
//! Both sides are ordered maps `rank → ordered set of global ids`, so iteration
//! order is a pure function of the contents. Every process derives its external
//! numbering from this order without talking to its neighbors, so hashed
//! containers must not be used here.

use crate::halo_error::{HaloError, NeighborMismatch};
use crate::{GlobalIndex, Rank};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered identifier sets keyed by neighbor rank.
pub type NeighborLists = BTreeMap<Rank, BTreeSet<GlobalIndex>>;

/// Send and receive lists of one process.
///
/// `receive[r]` holds the remote global ids owned by `r` that this process
/// reads. `send[r]` holds this process's own rows that `r` reads, derived from
/// the receive side under the structural-symmetry assumption.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommSchedule {
    rank: Rank,
    send: NeighborLists,
    receive: NeighborLists,
}

impl CommSchedule {
    /// Empty schedule for `rank`.
    pub fn new(rank: Rank) -> Self {
        Self {
            rank,
            ..Self::default()
        }
    }

    /// Record that local row `row` reads remote column `column` owned by `owner`.
    ///
    /// The remote value is received, and by symmetry `owner` reads `row` back.
    pub fn record(&mut self, owner: Rank, row: GlobalIndex, column: GlobalIndex) {
        self.receive.entry(owner).or_default().insert(column);
        self.send.entry(owner).or_default().insert(row);
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn send_lists(&self) -> &NeighborLists {
        &self.send
    }

    pub fn receive_lists(&self) -> &NeighborLists {
        &self.receive
    }

    /// Global ids sent to `neighbor`, ascending (empty if not a neighbor).
    pub fn send_to(&self, neighbor: Rank) -> impl Iterator<Item = GlobalIndex> + '_ {
        self.send.get(&neighbor).into_iter().flatten().copied()
    }

    /// Global ids received from `neighbor`, ascending (empty if not a neighbor).
    pub fn receive_from(&self, neighbor: Rank) -> impl Iterator<Item = GlobalIndex> + '_ {
        self.receive.get(&neighbor).into_iter().flatten().copied()
    }

    /// Ranks this process receives from, ascending.
    pub fn neighbor_ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        self.receive.keys().copied()
    }

    pub fn total_to_be_sent(&self) -> usize {
        self.send.values().map(BTreeSet::len).sum()
    }

    pub fn total_to_be_received(&self) -> usize {
        self.receive.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.receive.is_empty() && self.send.is_empty()
    }

    /// Neighbors whose send and receive counts differ, ascending by rank.
    ///
    /// A neighbor listed on one side only is reported with 0 on the other.
    pub fn mismatches(&self) -> Vec<NeighborMismatch> {
        let ranks: BTreeSet<Rank> = self.send.keys().chain(self.receive.keys()).copied().collect();
        ranks
            .into_iter()
            .filter_map(|neighbor| {
                let send = self.send.get(&neighbor).map_or(0, BTreeSet::len);
                let receive = self.receive.get(&neighbor).map_or(0, BTreeSet::len);
                let listed_both = self.send.contains_key(&neighbor)
                    && self.receive.contains_key(&neighbor);
                (send != receive || !listed_both).then_some(NeighborMismatch {
                    neighbor,
                    send,
                    receive,
                })
            })
            .collect()
    }

    /// Check the structural-symmetry invariants:
    /// total send == total receive, identical neighbor sets, and equal
    /// per-neighbor counts.
    ///
    /// # Errors
    /// [`HaloError::AsymmetricSchedule`] listing every offending neighbor.
    pub fn validate(&self) -> Result<(), HaloError> {
        let total_send = self.total_to_be_sent();
        let total_receive = self.total_to_be_received();
        let mismatches = self.mismatches();
        log::trace!(
            "rank {}: totalToBeSent = {total_send} totalToBeReceived = {total_receive}",
            self.rank
        );
        if total_send != total_receive || !mismatches.is_empty() {
            return Err(HaloError::AsymmetricSchedule {
                rank: self.rank,
                total_send,
                total_receive,
                mismatches,
            });
        }
        Ok(())
    }
}
