//! Invariant checking shared by the plan and matrix types.

use crate::halo_error::HaloError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), HaloError>;
}

/// Fail with [`HaloError::InvariantViolation`] unless `holds`.
///
/// The message is only built on failure.
#[inline]
pub fn ensure<F>(holds: bool, msg: F) -> Result<(), HaloError>
where
    F: FnOnce() -> String,
{
    if holds {
        Ok(())
    } else {
        Err(HaloError::InvariantViolation(msg()))
    }
}

/// Run a fallible invariant check and panic on error when invariant checking
/// is enabled; a no-op otherwise.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants")) {
            if let Err(e) = $expr {
                panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
            }
        }
    };
}
