//! Error types for dictionary operations.
//!
//! Recoverable conditions that are part of normal operation — a lookup miss,
//! a duplicate key on a unique-key method — are ordinary results
//! ([`Option`], [`Placed::Duplicate`](crate::dict::Placed)), never errors.
//! The error types here cover refused operations; every refusal leaves the
//! dictionary in exactly its pre-call state.

use core::fmt;

/// Error returned when a bounded dictionary is at capacity.
///
/// Carries the value that could not be inserted so the caller keeps
/// ownership of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dictionary is at capacity")
    }
}

impl<T: fmt::Debug> std::error::Error for Full<T> {}

/// Errors reported by dictionary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictError {
    /// Attaching the view would create a cycle in the view chain.
    CycleRejected,
    /// The view chain exceeds the maximum supported depth.
    ViewDepthExceeded,
    /// A view parent was closed (dropped) while still viewed.
    ViewParentClosed,
    /// Discipline or method swap refused: the dictionary is non-empty and
    /// the compatibility assertions do not cover the active method's needs.
    IncompatibleDiscipline,
    /// The iteration cursor was invalidated by an insert or delete; stop or
    /// restart the iteration.
    StaleCursor,
    /// `iterate_step` called with no iteration in progress.
    NoCursor,
    /// The operation requires a sharable method (`SharableSet`/`SharableBag`).
    NotSharable,
    /// The shared lock was poisoned: a writer panicked mid-update.
    LockPoisoned,
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DictError::CycleRejected => "view attach would create a cycle",
            DictError::ViewDepthExceeded => "view chain exceeds maximum depth",
            DictError::ViewParentClosed => "view parent was closed while still viewed",
            DictError::IncompatibleDiscipline => {
                "discipline/method swap refused on non-empty dictionary"
            }
            DictError::StaleCursor => "iteration cursor invalidated by a mutation",
            DictError::NoCursor => "no iteration in progress",
            DictError::NotSharable => "operation requires a sharable method",
            DictError::LockPoisoned => "shared lock poisoned by a panicked writer",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for DictError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_returns_value() {
        let err = Full(42u64);
        assert_eq!(err.into_inner(), 42);
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(
            DictError::CycleRejected.to_string(),
            "view attach would create a cycle"
        );
        assert_eq!(Full(()).to_string(), "dictionary is at capacity");
    }
}
