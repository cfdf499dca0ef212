//! The halo exchange plan consumed by the run-time exchange routine.
//!
//! A [`HaloPlan`] is immutable once built. It lists the neighbors in ascending
//! rank order and, in that same order, how many values go to each neighbor
//! (`send_length`), which owned rows they are (`elements_to_send`, grouped by
//! neighbor), and how many values arrive from each (`receive_length`). Values
//! received from neighbor `k` land contiguously in the external block of any
//! column-aligned vector, right after those of neighbor `k - 1`.

use crate::data::send_buffer::SendBuffer;
use crate::debug_invariants::{DebugInvariants, ensure};
use crate::halo_error::HaloError;
use crate::{LocalIndex, Rank};
use num_traits::Zero;
use std::ops::Range;

/// Communication plan of one process.
///
/// Deserialization goes through [`HaloPlan::validate_invariants`], so a
/// deserialized plan is as consistent as a built one.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawHaloPlan")]
pub struct HaloPlan {
    local_number_of_rows: usize,
    number_of_external_values: usize,
    neighbors: Vec<Rank>,
    send_length: Vec<usize>,
    receive_length: Vec<usize>,
    elements_to_send: Vec<LocalIndex>,
}

/// Unchecked wire form of [`HaloPlan`].
#[derive(serde::Deserialize)]
struct RawHaloPlan {
    local_number_of_rows: usize,
    number_of_external_values: usize,
    neighbors: Vec<Rank>,
    send_length: Vec<usize>,
    receive_length: Vec<usize>,
    elements_to_send: Vec<LocalIndex>,
}

impl TryFrom<RawHaloPlan> for HaloPlan {
    type Error = HaloError;

    fn try_from(raw: RawHaloPlan) -> Result<Self, HaloError> {
        let plan = Self {
            local_number_of_rows: raw.local_number_of_rows,
            number_of_external_values: raw.number_of_external_values,
            neighbors: raw.neighbors,
            send_length: raw.send_length,
            receive_length: raw.receive_length,
            elements_to_send: raw.elements_to_send,
        };
        plan.validate_invariants()?;
        Ok(plan)
    }
}

/// One neighbor's slice of the plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborLink<'a> {
    pub rank: Rank,
    /// Owned local rows to send, in the order the neighbor expects them.
    pub send: &'a [LocalIndex],
    /// External local indices the neighbor's values are written to.
    pub receive: Range<LocalIndex>,
}

impl HaloPlan {
    /// Plan with no neighbors, used when every column is owned locally.
    pub fn empty(local_number_of_rows: usize) -> Self {
        Self {
            local_number_of_rows,
            ..Self::default()
        }
    }

    /// Assemble a plan from its parallel arrays.
    pub(crate) fn from_parts(
        local_number_of_rows: usize,
        neighbors: Vec<Rank>,
        send_length: Vec<usize>,
        receive_length: Vec<usize>,
        elements_to_send: Vec<LocalIndex>,
    ) -> Self {
        let number_of_external_values = receive_length.iter().sum();
        let plan = Self {
            local_number_of_rows,
            number_of_external_values,
            neighbors,
            send_length,
            receive_length,
            elements_to_send,
        };
        plan.debug_assert_invariants();
        plan
    }

    #[inline]
    pub fn local_number_of_rows(&self) -> usize {
        self.local_number_of_rows
    }

    #[inline]
    pub fn number_of_external_values(&self) -> usize {
        self.number_of_external_values
    }

    /// Owned rows plus external values.
    #[inline]
    pub fn local_number_of_columns(&self) -> usize {
        self.local_number_of_rows + self.number_of_external_values
    }

    #[inline]
    pub fn number_of_send_neighbors(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn total_to_be_sent(&self) -> usize {
        self.elements_to_send.len()
    }

    /// Neighbor ranks, ascending.
    pub fn neighbors(&self) -> &[Rank] {
        &self.neighbors
    }

    pub fn send_length(&self) -> &[usize] {
        &self.send_length
    }

    pub fn receive_length(&self) -> &[usize] {
        &self.receive_length
    }

    /// Owned local rows to send, grouped by neighbor in [`neighbors`](Self::neighbors) order.
    pub fn elements_to_send(&self) -> &[LocalIndex] {
        &self.elements_to_send
    }

    /// External block `local_number_of_rows..local_number_of_columns`.
    pub fn external_range(&self) -> Range<LocalIndex> {
        self.local_number_of_rows..self.local_number_of_columns()
    }

    /// Per-neighbor views, in neighbor order.
    pub fn links(&self) -> impl Iterator<Item = NeighborLink<'_>> + '_ {
        let mut send_at = 0;
        let mut recv_at = self.local_number_of_rows;
        self.neighbors
            .iter()
            .zip(self.send_length.iter().zip(&self.receive_length))
            .map(move |(&rank, (&ns, &nr))| {
                let link = NeighborLink {
                    rank,
                    send: &self.elements_to_send[send_at..send_at + ns],
                    receive: recv_at..recv_at + nr,
                };
                send_at += ns;
                recv_at += nr;
                link
            })
    }

    /// Allocate a zeroed payload buffer sized for this plan.
    pub fn acquire_send_buffer<T: Copy + Zero>(&self) -> Result<SendBuffer<T>, HaloError> {
        SendBuffer::try_with_len(self.total_to_be_sent())
    }
}

impl DebugInvariants for HaloPlan {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "HaloPlan invalid");
    }

    fn validate_invariants(&self) -> Result<(), HaloError> {
        let n = self.neighbors.len();
        ensure(
            self.send_length.len() == n && self.receive_length.len() == n,
            || {
                format!(
                    "{n} neighbors but {} send and {} receive lengths",
                    self.send_length.len(),
                    self.receive_length.len()
                )
            },
        )?;
        ensure(self.neighbors.windows(2).all(|w| w[0] < w[1]), || {
            format!("neighbors not strictly ascending: {:?}", self.neighbors)
        })?;
        let sent: usize = self.send_length.iter().sum();
        ensure(sent == self.elements_to_send.len(), || {
            format!(
                "send lengths sum to {sent}, {} elements to send",
                self.elements_to_send.len()
            )
        })?;
        let received: usize = self.receive_length.iter().sum();
        ensure(received == self.number_of_external_values, || {
            format!(
                "receive lengths sum to {received}, {} external values",
                self.number_of_external_values
            )
        })?;
        if let Some(&row) = self
            .elements_to_send
            .iter()
            .find(|&&row| row >= self.local_number_of_rows)
        {
            return Err(HaloError::InvariantViolation(format!(
                "element to send {row} is not an owned row (0..{})",
                self.local_number_of_rows
            )));
        }
        Ok(())
    }
}
