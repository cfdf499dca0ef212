//! Staging buffer for outgoing halo values.
//!
//! The plan only fixes *which* local rows go to each neighbor; a [`SendBuffer`]
//! holds the numeric payload for one exchange. It is owned separately from the
//! plan so the exchange routine can borrow it mutably while the plan stays
//! shared and read-only.

use crate::halo_error::HaloError;
use crate::overlap::halo_plan::HaloPlan;
use num_traits::Zero;

/// Contiguous payload of `total_to_be_sent` values, grouped by neighbor in
/// plan order.
#[derive(Clone, Debug, PartialEq)]
pub struct SendBuffer<T> {
    values: Vec<T>,
}

impl<T: Copy + Zero> SendBuffer<T> {
    /// Allocate `len` zeroed slots.
    ///
    /// # Errors
    /// [`HaloError::Allocation`] if the storage cannot be reserved.
    pub fn try_with_len(len: usize) -> Result<Self, HaloError> {
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| HaloError::Allocation {
                what: "send buffer",
                len,
            })?;
        values.resize(len, T::zero());
        Ok(Self { values })
    }

    /// Gather `x[elements_to_send[k]]` into slot `k` and return the filled buffer.
    ///
    /// `x` is any vector aligned to the matrix columns; only its owned prefix
    /// is read.
    ///
    /// # Errors
    /// [`HaloError::LengthMismatch`] if the buffer was not sized for `plan` or
    /// `x` is shorter than the owned rows.
    pub fn pack(&mut self, plan: &HaloPlan, x: &[T]) -> Result<&[T], HaloError> {
        if self.values.len() != plan.total_to_be_sent() {
            return Err(HaloError::LengthMismatch {
                what: "send buffer",
                expected: plan.total_to_be_sent(),
                actual: self.values.len(),
            });
        }
        if x.len() < plan.local_number_of_rows() {
            return Err(HaloError::LengthMismatch {
                what: "source vector",
                expected: plan.local_number_of_rows(),
                actual: x.len(),
            });
        }
        for (slot, &row) in self.values.iter_mut().zip(plan.elements_to_send()) {
            *slot = x[row];
        }
        Ok(&self.values)
    }
}

impl<T> SendBuffer<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T: bytemuck::Pod> SendBuffer<T> {
    /// Raw bytes of the payload, for byte-oriented transports.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }
}
