//! Finalized numbering of remote (external) columns.

use crate::halo_error::HaloError;
use crate::{GlobalIndex, LocalIndex};
use std::collections::BTreeMap;

/// Read-only map from remote global id to its local index in the external block.
///
/// Built once by external index assignment; the column rewrite only reads it.
/// Local indices are dense: `first_local()..first_local() + len()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawExternalIndexMap")]
pub struct ExternalIndexMap {
    first_local: LocalIndex,
    map: BTreeMap<GlobalIndex, LocalIndex>,
    // global ids in local-index order
    order: Vec<GlobalIndex>,
}

#[derive(serde::Deserialize)]
struct RawExternalIndexMap {
    first_local: LocalIndex,
    map: BTreeMap<GlobalIndex, LocalIndex>,
    order: Vec<GlobalIndex>,
}

impl TryFrom<RawExternalIndexMap> for ExternalIndexMap {
    type Error = HaloError;

    /// Renumber `order` from `first_local` and require `map` to match it.
    fn try_from(raw: RawExternalIndexMap) -> Result<Self, HaloError> {
        let mut rebuilt = Self::new(raw.first_local);
        for &global in &raw.order {
            rebuilt.assign_next(global);
        }
        if rebuilt.order.len() != raw.order.len() {
            return Err(HaloError::InvariantViolation(
                "external order lists a global id twice".into(),
            ));
        }
        if rebuilt.map != raw.map {
            return Err(HaloError::InvariantViolation(
                "external map disagrees with its order".into(),
            ));
        }
        Ok(rebuilt)
    }
}

impl ExternalIndexMap {
    /// An empty map whose first assignment would be `first_local`.
    pub(crate) fn new(first_local: LocalIndex) -> Self {
        Self {
            first_local,
            ..Self::default()
        }
    }

    /// Assign the next local index to `global` and return it.
    ///
    /// Callers feed each remote id exactly once; a repeat keeps its first index.
    pub(crate) fn assign_next(&mut self, global: GlobalIndex) -> LocalIndex {
        let next = self.first_local + self.order.len();
        *self.map.entry(global).or_insert_with(|| {
            self.order.push(global);
            next
        })
    }

    /// Local index of remote column `global`.
    #[inline]
    pub fn get(&self, global: GlobalIndex) -> Option<LocalIndex> {
        self.map.get(&global).copied()
    }

    /// Remote global id stored at external local index `local`.
    pub fn global_of(&self, local: LocalIndex) -> Option<GlobalIndex> {
        local
            .checked_sub(self.first_local)
            .and_then(|k| self.order.get(k))
            .copied()
    }

    /// First external local index (= number of owned rows).
    pub fn first_local(&self) -> LocalIndex {
        self.first_local
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remote global ids in local-index order.
    pub fn global_ids(&self) -> &[GlobalIndex] {
        &self.order
    }

    /// `(global, local)` pairs in ascending local-index order.
    pub fn iter(&self) -> impl Iterator<Item = (GlobalIndex, LocalIndex)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(move |(k, &g)| (g, self.first_local + k))
    }
}
