//! One dictionary abstraction, ten interchangeable storage methods.
//!
//! A [`Dict`] stores caller-owned objects and looks them up by a key the
//! caller's [`Discipline`] extracts from each object. The same operation
//! surface runs over every [`Method`]:
//!
//! * **Hashed**: `Set`, `Bag`, and the sharable `SharableSet` /
//!   `SharableBag` — O(1) expected lookup, chained buckets, insertion
//!   order within a bucket.
//! * **Ordered**: `OrderedSet`, `OrderedBag` — comparator order, O(log n)
//!   operations, ranged probes via [`Dict::at_least`] / [`Dict::at_most`].
//! * **Sequences**: `List`, `Stack`, `Queue`, `Deque` — position order,
//!   O(1) end operations, O(n) key search.
//!
//! Switch methods at any time with [`Dict::swap_method`]; the contents
//! migrate. Detach everything in O(1) with [`Dict::extract`] and pour it
//! into another dictionary with [`Dict::restore`], even across methods.
//!
//! ```
//! use strata::{Dict, Method, Natural, Placed};
//!
//! let mut dict = Dict::open(Natural, Method::Set);
//! dict.insert("carol").unwrap();
//! dict.insert("alice").unwrap();
//! assert!(matches!(
//!     dict.insert("carol").unwrap(),
//!     Placed::Duplicate { .. }
//! ));
//! assert_eq!(dict.len(), 2);
//!
//! dict.swap_method(Method::OrderedSet);
//! let sorted: Vec<&str> = dict.iter().copied().collect();
//! assert_eq!(sorted, vec!["alice", "carol"]);
//! ```
//!
//! # Disciplines
//!
//! [`Natural`] keys each object by itself; [`ByKey`] projects a key field
//! out of the object. Implement [`Discipline`] directly for custom
//! ordering, hashing, a retirement hook, or the event callback that
//! observes the dictionary's life cycle and can resize its hash table.
//!
//! # Sharing and views
//!
//! [`Dict::into_shared`] wraps a dictionary in an `Arc<RwLock<..>>` for
//! cross-thread use. [`view_attach`] chains one dictionary under another:
//! lookups that miss locally fall through, and the nearest entry shadows
//! equal keys above it. Chains are acyclic and depth-bounded by
//! construction.
//!
//! Read operations take `&self` and are safe from any number of threads
//! at once; mutations take `&mut self`, so the type system itself keeps
//! writers exclusive.

mod dict;
mod discipline;
mod error;
mod event;
mod extract;
mod index;
mod method;
mod share;
mod stat;
mod strategy;

pub use dict::{Dict, Installed, Iter, Lookup, Placed};
pub use discipline::{default_hash, ByKey, Discipline, Natural, SwapMode};
pub use error::{DictError, Full};
pub use event::{Event, EventAnswer, Severity};
pub use extract::{Drain, Extracted};
pub use index::Handle;
pub use method::Method;
pub use share::{
    read, view_attach, view_detach, view_install, write, SharedDict, ViewInstallError,
    MAX_VIEW_DEPTH,
};
pub use stat::{Stat, STAT_WIDTH};
