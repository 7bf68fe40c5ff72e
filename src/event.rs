//! Lifecycle events delivered to a discipline's callback.
//!
//! Events are raised synchronously at structural milestones: open and close
//! (after the change), discipline and method change (before any object is
//! touched, so the old structure can still be walked), hash-table sizing
//! (before resizing, so the consumer can adjust the target), and errors (at
//! detection). The callback receives no access to the dictionary, so it
//! cannot re-enter it.

use crate::method::Method;

/// A structural milestone reported to [`Discipline::on_event`].
///
/// [`Discipline::on_event`]: crate::Discipline::on_event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A dictionary is being opened with the given method.
    Opening { method: Method },
    /// Opening finished; the dictionary is empty and ready.
    Opened { method: Method },
    /// The dictionary is about to be closed; contents are still intact.
    Closing,
    /// Closing finished; all contents have been retired.
    Closed,
    /// The discipline is about to be replaced; the old structure is intact.
    DisciplineChanging,
    /// The method is about to change; the old structure is intact.
    MethodChanging { from: Method, to: Method },
    /// A hash table is about to be built or grown to `proposed` slots.
    /// Answer with [`EventAnswer::HashSize`] to override the target.
    HashSize { proposed: usize },
    /// An error condition was detected.
    Error { severity: Severity, message: &'a str },
}

/// Severity attached to [`Event::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The operation was refused; the dictionary is unchanged.
    Warning,
    /// The dictionary detected a contract violation.
    Error,
}

/// Reply from an event callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventAnswer {
    /// Accept the engine's default behavior.
    #[default]
    Default,
    /// For [`Event::HashSize`]: use this slot count instead. Rounded up to a
    /// power of two; ignored for every other event.
    HashSize(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_default() {
        assert_eq!(EventAnswer::default(), EventAnswer::Default);
    }

    #[test]
    fn severity_orders() {
        assert!(Severity::Warning < Severity::Error);
    }
}
