//! Storage methods: the interchangeable strategies behind a dictionary.
//!
//! Every method implements the same operation surface; they differ in
//! ordering, duplicate tolerance, and complexity:
//!
//! | Method | Structure | Duplicates | Order |
//! |---|---|---|---|
//! | `Set` | hash table | rejected | none |
//! | `Bag` | hash table | adjacent runs | none |
//! | `OrderedSet` | skiplist | rejected | key order |
//! | `OrderedBag` | skiplist | stable ties | key order |
//! | `List` | linked list | allowed | insertion order |
//! | `Stack` | linked list | allowed | LIFO |
//! | `Queue` | linked list | allowed | FIFO |
//! | `Deque` | linked list | allowed | both ends |
//! | `SharableSet` | hash table | rejected | none |
//! | `SharableBag` | hash table | adjacent runs | none |
//!
//! The sharable variants are structurally the hash methods; they addition-
//! ally expose the dictionary's user-data slot and are intended for use
//! behind a [`SharedDict`](crate::share::SharedDict) lock.

/// A storage method for a dictionary.
///
/// The enumeration is closed: a dictionary can switch between any of these
/// at runtime via [`Dict::swap_method`](crate::Dict::swap_method), carrying
/// its contents across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Unordered, unique keys.
    Set,
    /// Unordered, duplicate keys kept adjacent.
    Bag,
    /// Key-ordered, unique keys.
    OrderedSet,
    /// Key-ordered, duplicate keys with stable (insertion-order) ties.
    OrderedBag,
    /// Insertion order; insert at head, append at tail.
    List,
    /// LIFO: insert and append both push at the top.
    Stack,
    /// FIFO: insert at the head, unspecified delete removes at the tail.
    Queue,
    /// Push and pop at both ends.
    Deque,
    /// `Set` intended for shared access behind a lock.
    SharableSet,
    /// `Bag` intended for shared access behind a lock.
    SharableBag,
}

/// Structural family a method maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    Hash,
    Skip,
    Seq,
}

impl Method {
    /// Short name of the method.
    pub fn name(self) -> &'static str {
        match self {
            Method::Set => "set",
            Method::Bag => "bag",
            Method::OrderedSet => "oset",
            Method::OrderedBag => "obag",
            Method::List => "list",
            Method::Stack => "stack",
            Method::Queue => "queue",
            Method::Deque => "deque",
            Method::SharableSet => "rhset",
            Method::SharableBag => "rhbag",
        }
    }

    /// One-line description of the method's contract.
    pub fn description(self) -> &'static str {
        match self {
            Method::Set => "unordered set, unique elements",
            Method::Bag => "unordered collection, repeated elements",
            Method::OrderedSet => "ordered set, unique elements",
            Method::OrderedBag => "ordered multiset, stable ties",
            Method::List => "linked list, insertion order",
            Method::Stack => "stack, insert and delete at the top",
            Method::Queue => "queue, insert at head, delete at tail",
            Method::Deque => "deque, insert and append at both ends",
            Method::SharableSet => "sharable set, unique elements",
            Method::SharableBag => "sharable collection, repeated elements",
        }
    }

    /// `true` for the key-ordered methods.
    pub fn is_ordered(self) -> bool {
        matches!(self, Method::OrderedSet | Method::OrderedBag)
    }

    /// `true` for the hash-table methods (including the sharable ones).
    pub fn is_hashed(self) -> bool {
        matches!(
            self,
            Method::Set | Method::Bag | Method::SharableSet | Method::SharableBag
        )
    }

    /// `true` for the positional (linked-list) methods.
    pub fn is_sequence(self) -> bool {
        matches!(
            self,
            Method::List | Method::Stack | Method::Queue | Method::Deque
        )
    }

    /// `true` for the methods intended for shared access.
    pub fn is_sharable(self) -> bool {
        matches!(self, Method::SharableSet | Method::SharableBag)
    }

    /// `true` if the method rejects duplicate keys.
    pub fn unique_keys(self) -> bool {
        matches!(
            self,
            Method::Set | Method::OrderedSet | Method::SharableSet
        )
    }

    pub(crate) fn family(self) -> Family {
        if self.is_hashed() {
            Family::Hash
        } else if self.is_ordered() {
            Family::Skip
        } else {
            Family::Seq
        }
    }
}
