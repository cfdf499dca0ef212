//! Halo setup configuration.
//!
//! [`HaloConfig`] is plain data so it can be embedded in a solver's own
//! configuration file and deserialized with `serde`.

use serde::{Deserialize, Serialize};

/// When to run the structural-symmetry check on the discovered schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Validation {
    /// Always validate.
    Always,
    /// Never validate. An asymmetric matrix silently yields a wrong plan.
    Never,
    /// Validate in debug builds or with the `check-invariants` /
    /// `strict-invariants` features.
    #[default]
    DebugOnly,
}

impl Validation {
    /// Whether the check runs in this build.
    pub fn enabled(self) -> bool {
        match self {
            Validation::Always => true,
            Validation::Never => false,
            Validation::DebugOnly => cfg!(any(
                debug_assertions,
                feature = "check-invariants",
                feature = "strict-invariants"
            )),
        }
    }
}

/// How the column rewrite (and the single-partition copy) walks the rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteStrategy {
    Serial,
    /// Rows in parallel with rayon; serial when the `rayon` feature is off.
    #[default]
    Parallel,
}

impl RewriteStrategy {
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn is_parallel(self) -> bool {
        cfg!(feature = "rayon") && self == RewriteStrategy::Parallel
    }
}

/// Options for [`setup_halo`](crate::algs::setup_halo::setup_halo).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaloConfig {
    pub validation: Validation,
    pub rewrite: RewriteStrategy,
}

impl HaloConfig {
    /// Configuration that always validates, regardless of build profile.
    pub fn strict() -> Self {
        Self {
            validation: Validation::Always,
            ..Self::default()
        }
    }
}
