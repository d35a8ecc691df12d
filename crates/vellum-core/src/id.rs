//! Strongly-typed handle and cursor identifiers.

use std::fmt;

/// Opaque reference to one arena-owned node.
///
/// The raw value is what crosses the C boundary. Its layout (slot index in
/// the upper 32 bits, generation in the lower 32 bits) is private to the
/// handle table; callers must treat it as an opaque integer. The raw value
/// `0` is the null handle and never refers to a live node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// The null handle. Never valid.
    pub const NULL: NodeHandle = NodeHandle(0);

    /// Wrap a raw handle value received from the caller.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value handed to the caller.
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Whether this is the null handle.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node({}:{})", self.0 >> 32, self.0 as u32)
    }
}

impl From<u64> for NodeHandle {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Caller-held position of an array iteration.
///
/// Holds the index of the last element returned. A fresh cursor sits at
/// [`ArrayCursor::BEFORE_FIRST`]; each successful step advances it by one.
/// Resetting it to the sentinel restarts the iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArrayCursor(pub i64);

impl ArrayCursor {
    /// Sentinel for "no element returned yet".
    pub const BEFORE_FIRST: ArrayCursor = ArrayCursor(-1);

    /// A cursor positioned before the first element.
    pub const fn new() -> Self {
        Self::BEFORE_FIRST
    }

    /// Index of the element the next step would return.
    ///
    /// `None` if the cursor holds a value below the sentinel or the next
    /// index does not fit in `usize`.
    pub fn next_index(self) -> Option<usize> {
        let next = self.0.checked_add(1)?;
        usize::try_from(next).ok()
    }

    /// Restart from before the first element.
    pub fn reset(&mut self) {
        *self = Self::BEFORE_FIRST;
    }
}

impl Default for ArrayCursor {
    fn default() -> Self {
        Self::BEFORE_FIRST
    }
}
