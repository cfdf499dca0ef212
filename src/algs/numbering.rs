//! External index assignment (phase A of the local rewrite).
//!
//! Neighbors are visited in ascending rank order and, within a neighbor, remote
//! ids in ascending order. Each remote id takes the next local index after the
//! owned rows, so the external block is dense and neighbor-major. The
//! neighbor's own schedule lists the same ids in the same order on its send
//! side, which is what lets received values be written straight into place.
//!
//! This pass is sequential: the external counter must advance in exactly this
//! order on every run.

use crate::algs::try_vec;
use crate::data::sparse_matrix::SparseMatrix;
use crate::halo_error::HaloError;
use crate::overlap::external_map::ExternalIndexMap;
use crate::overlap::halo_plan::HaloPlan;
use crate::overlap::schedule::CommSchedule;

/// Number the remote columns of `schedule` and build the exchange plan.
///
/// Neighbors are taken from the receive side. With a validated schedule the
/// send side has the same neighbors; otherwise a neighbor missing from the
/// send side gets a send length of 0 and send-only neighbors are not part of
/// the plan.
///
/// # Errors
/// - [`HaloError::MissingLocalRow`] if a send id is not an owned row of `matrix`.
/// - [`HaloError::Allocation`] if a plan array cannot be reserved.
pub fn assign_external_indices(
    schedule: &CommSchedule,
    matrix: &SparseMatrix,
) -> Result<(HaloPlan, ExternalIndexMap), HaloError> {
    let nrows = matrix.local_number_of_rows();
    let nneighbors = schedule.receive_lists().len();

    let mut neighbors = try_vec(nneighbors, "neighbor ranks")?;
    let mut receive_length = try_vec(nneighbors, "receive lengths")?;
    let mut send_length = try_vec(nneighbors, "send lengths")?;
    let mut elements_to_send = try_vec(schedule.total_to_be_sent(), "elements to send")?;
    let mut external = ExternalIndexMap::new(nrows);

    for (&neighbor, incoming) in schedule.receive_lists() {
        neighbors.push(neighbor);
        receive_length.push(incoming.len());
        for &global in incoming {
            external.assign_next(global);
        }

        let before = elements_to_send.len();
        for global in schedule.send_to(neighbor) {
            let local = matrix
                .global_to_local(global)
                .ok_or(HaloError::MissingLocalRow(global))?;
            elements_to_send.push(local);
        }
        send_length.push(elements_to_send.len() - before);
    }

    let plan = HaloPlan::from_parts(
        nrows,
        neighbors,
        send_length,
        receive_length,
        elements_to_send,
    );
    Ok((plan, external))
}
