//! Structural invariant checks for the connectivity tables.
//!
//! Checks run after every structural mutation in debug builds; release
//! builds skip them unless the `check-invariants` feature is enabled, so a
//! production run can opt back in when chasing a corruption.

use crate::remap_error::MeshRemapError;

pub trait DebugInvariants {
    /// Panic if the invariants do not hold. A no-op in release builds
    /// without the `check-invariants` feature.
    fn debug_assert_invariants(&self);
    /// Check the invariants, returning the first violation found.
    fn validate_invariants(&self) -> Result<(), MeshRemapError>;
}

/// Panic with context when a validation check fails; compiled out in
/// release builds without the `check-invariants` feature.
#[macro_export]
macro_rules! debug_assert_ok {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!($($ctx)*, ": {}"), e);
        }
    };
}
