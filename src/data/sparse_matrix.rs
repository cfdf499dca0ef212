//! Row-partitioned sparse matrix structure.
//!
//! A [`SparseMatrix`] holds the rows owned by one process. Column indices come in
//! two forms:
//! - **global** column indices, supplied at construction and never modified;
//! - **local** column indices, written by halo setup: owned columns map to
//!   `0..local_number_of_rows`, remote columns to the external block
//!   `local_number_of_rows..local_number_of_columns`.
//!
//! Only the sparsity structure is stored; numerical values belong to the
//! kernels that consume the local indexing.

use crate::data::send_buffer::SendBuffer;
use crate::debug_invariants::{DebugInvariants, ensure};
use crate::halo_error::HaloError;
use crate::overlap::external_map::ExternalIndexMap;
use crate::overlap::halo_plan::HaloPlan;
use crate::{GlobalIndex, LocalIndex};
use hashbrown::HashMap;

/// Halo metadata installed by setup; lives as long as the matrix.
#[derive(Clone, Debug)]
struct HaloState {
    plan: HaloPlan,
    external: ExternalIndexMap,
    send_buffer: SendBuffer<f64>,
}

/// Local slice of a row-partitioned sparse matrix.
///
/// # Invariants
///
/// - `local_to_global` and `global_to_local` are inverse bijections over the
///   owned rows.
/// - Before setup every row's local column list is empty; after setup it has
///   exactly `nonzeros_in_row(i)` entries, each `< local_number_of_columns()`.
#[derive(Clone, Debug)]
pub struct SparseMatrix {
    global_columns: Vec<Vec<GlobalIndex>>,
    local_columns: Vec<Vec<LocalIndex>>,
    local_to_global: Vec<GlobalIndex>,
    global_to_local: HashMap<GlobalIndex, LocalIndex>,
    halo: Option<HaloState>,
}

impl SparseMatrix {
    /// Build from the owned rows' global identifiers and their global column
    /// indices (`rows[i]` belongs to global row `local_to_global[i]`).
    ///
    /// # Errors
    /// [`HaloError::InvalidMatrix`] if the two lengths differ or a global row
    /// is listed twice.
    pub fn from_rows(
        local_to_global: Vec<GlobalIndex>,
        rows: Vec<Vec<GlobalIndex>>,
    ) -> Result<Self, HaloError> {
        if local_to_global.len() != rows.len() {
            return Err(HaloError::InvalidMatrix(format!(
                "{} row ids for {} rows",
                local_to_global.len(),
                rows.len()
            )));
        }
        let mut global_to_local = HashMap::with_capacity(local_to_global.len());
        for (local, &global) in local_to_global.iter().enumerate() {
            if global_to_local.insert(global, local).is_some() {
                return Err(HaloError::InvalidMatrix(format!(
                    "global row {global} appears more than once"
                )));
            }
        }
        Ok(Self {
            local_columns: vec![Vec::new(); rows.len()],
            global_columns: rows,
            local_to_global,
            global_to_local,
            halo: None,
        })
    }

    /// Number of rows owned by this process.
    #[inline]
    pub fn local_number_of_rows(&self) -> usize {
        self.global_columns.len()
    }

    /// Number of stored nonzeros in local row `i`.
    #[inline]
    pub fn nonzeros_in_row(&self, i: LocalIndex) -> usize {
        self.global_columns[i].len()
    }

    /// Total number of stored nonzeros.
    pub fn nonzeros(&self) -> usize {
        self.global_columns.iter().map(Vec::len).sum()
    }

    /// Global column indices of local row `i`.
    #[inline]
    pub fn global_row(&self, i: LocalIndex) -> &[GlobalIndex] {
        &self.global_columns[i]
    }

    /// Local column indices of local row `i`; empty before halo setup.
    #[inline]
    pub fn local_row(&self, i: LocalIndex) -> &[LocalIndex] {
        &self.local_columns[i]
    }

    /// Global identifiers of the owned rows, indexed by local row.
    #[inline]
    pub fn local_to_global(&self) -> &[GlobalIndex] {
        &self.local_to_global
    }

    /// Local row index of an owned global identifier.
    #[inline]
    pub fn global_to_local(&self, global: GlobalIndex) -> Option<LocalIndex> {
        self.global_to_local.get(&global).copied()
    }

    /// Whether halo setup has run.
    pub fn has_halo(&self) -> bool {
        self.halo.is_some()
    }

    /// The communication plan, once set up.
    pub fn halo(&self) -> Option<&HaloPlan> {
        self.halo.as_ref().map(|h| &h.plan)
    }

    /// The plan together with the send buffer the exchange routine fills.
    pub fn halo_mut(&mut self) -> Option<(&HaloPlan, &mut SendBuffer<f64>)> {
        self.halo.as_mut().map(|h| (&h.plan, &mut h.send_buffer))
    }

    /// Remote global id → external local index, once set up.
    pub fn external_map(&self) -> Option<&ExternalIndexMap> {
        self.halo.as_ref().map(|h| &h.external)
    }

    /// Number of remote values this process receives (0 before setup).
    pub fn number_of_external_values(&self) -> usize {
        self.halo().map_or(0, HaloPlan::number_of_external_values)
    }

    /// Length of any vector aligned to the local columns.
    pub fn local_number_of_columns(&self) -> usize {
        self.halo()
            .map_or(self.local_number_of_rows(), HaloPlan::local_number_of_columns)
    }

    /// Row-aligned views for the column rewrite.
    pub(crate) fn global_rows(&self) -> &[Vec<GlobalIndex>] {
        &self.global_columns
    }

    pub(crate) fn global_to_local_map(&self) -> &HashMap<GlobalIndex, LocalIndex> {
        &self.global_to_local
    }

    /// Install the results of a successful setup.
    pub(crate) fn install_halo(
        &mut self,
        local_columns: Vec<Vec<LocalIndex>>,
        plan: HaloPlan,
        external: ExternalIndexMap,
        send_buffer: SendBuffer<f64>,
    ) -> Result<(), HaloError> {
        if self.halo.is_some() {
            return Err(HaloError::AlreadyInitialized);
        }
        self.local_columns = local_columns;
        self.halo = Some(HaloState {
            plan,
            external,
            send_buffer,
        });
        crate::debug_invariants!(self.validate_invariants(), "SparseMatrix after halo setup");
        Ok(())
    }
}

impl DebugInvariants for SparseMatrix {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "SparseMatrix invalid");
    }

    fn validate_invariants(&self) -> Result<(), HaloError> {
        ensure(self.local_to_global.len() == self.global_columns.len(), || {
            format!(
                "{} row ids for {} rows",
                self.local_to_global.len(),
                self.global_columns.len()
            )
        })?;
        for (local, global) in self.local_to_global.iter().enumerate() {
            ensure(self.global_to_local(*global) == Some(local), || {
                format!("global row {global} does not map back to local row {local}")
            })?;
        }

        let Some(state) = &self.halo else {
            return ensure(self.local_columns.iter().all(Vec::is_empty), || {
                "local columns written before halo setup".into()
            });
        };
        state.plan.validate_invariants()?;
        ensure(
            state.send_buffer.len() == state.plan.total_to_be_sent(),
            || {
                format!(
                    "send buffer holds {} values, plan sends {}",
                    state.send_buffer.len(),
                    state.plan.total_to_be_sent()
                )
            },
        )?;

        let ncols = self.local_number_of_columns();
        for (i, (globals, locals)) in self
            .global_columns
            .iter()
            .zip(&self.local_columns)
            .enumerate()
        {
            ensure(globals.len() == locals.len(), || {
                format!(
                    "row {i}: {} global but {} local columns",
                    globals.len(),
                    locals.len()
                )
            })?;
            if let Some(&j) = locals.iter().find(|&&j| j >= ncols) {
                return Err(HaloError::InvariantViolation(format!(
                    "row {i}: local column {j} outside 0..{ncols}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_are_inverse() {
        let m = SparseMatrix::from_rows(vec![10, 11, 12], vec![vec![10], vec![11, 12], vec![]])
            .unwrap();
        assert_eq!(m.local_number_of_rows(), 3);
        assert_eq!(m.nonzeros(), 3);
        assert_eq!(m.global_to_local(11), Some(1));
        assert_eq!(m.global_to_local(13), None);
        assert_eq!(m.local_to_global()[2], 12);
        assert!(m.validate_invariants().is_ok());
    }

    #[test]
    fn before_setup_columns_equal_rows() {
        let m = SparseMatrix::from_rows(vec![0, 1], vec![vec![0, 1], vec![0, 1]]).unwrap();
        assert!(!m.has_halo());
        assert_eq!(m.local_number_of_columns(), 2);
        assert_eq!(m.number_of_external_values(), 0);
        assert!(m.local_row(0).is_empty());
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        assert!(matches!(
            SparseMatrix::from_rows(vec![4, 4], vec![vec![], vec![]]),
            Err(HaloError::InvalidMatrix(_))
        ));
        assert!(matches!(
            SparseMatrix::from_rows(vec![4], vec![vec![], vec![]]),
            Err(HaloError::InvalidMatrix(_))
        ));
    }
}
