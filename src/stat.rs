//! Dictionary statistics and structural introspection.
//!
//! [`Stat`] is a pure snapshot: producing it never mutates the dictionary,
//! and producing it twice without an intervening mutation yields identical
//! reports. It is safe to call concurrently with other read-only
//! operations.

use core::fmt;

use crate::method::Method;

/// Per-level arrays in a [`Stat`] are clipped to this many entries.
pub const STAT_WIDTH: usize = 256;

/// Structural snapshot of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// Active storage method.
    pub method: Method,
    /// Number of stored objects.
    pub size: usize,
    /// Approximate heap footprint of the structure in bytes (nodes,
    /// buckets, and the handle itself; not the objects' own heap data).
    pub space: usize,
    /// Maximum structural depth: longest hash chain, skiplist height, or
    /// 1 for a non-empty sequence.
    pub max_level: usize,
    /// Hash methods: number of top-level bucket slots. 0 otherwise.
    pub top_slots: usize,
    /// Objects per level (chain depth / node level), clipped to
    /// [`STAT_WIDTH`].
    pub level_size: Vec<usize>,
    /// Hash methods: buckets per chain length, clipped to [`STAT_WIDTH`].
    /// Empty otherwise.
    pub level_slots: Vec<usize>,
    /// Human-readable one-line digest of the above.
    pub digest: String,
}

impl Stat {
    pub(crate) fn digest_of(
        method: Method,
        size: usize,
        space: usize,
        max_level: usize,
        top_slots: usize,
    ) -> String {
        if top_slots > 0 {
            format!(
                "{}: {} objects, {} slots, max chain {}, ~{} bytes",
                method.name(),
                size,
                top_slots,
                max_level,
                space
            )
        } else {
            format!(
                "{}: {} objects, max level {}, ~{} bytes",
                method.name(),
                size,
                max_level,
                space
            )
        }
    }

    /// Counts `level` into a clipped per-level array.
    pub(crate) fn bump(levels: &mut Vec<usize>, level: usize) {
        let slot = level.min(STAT_WIDTH - 1);
        if levels.len() <= slot {
            levels.resize(slot + 1, 0);
        }
        levels[slot] += 1;
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}
