//! Node arena: registration, construction, extraction and cleanup.
//!
//! Every node the caller can name lives in the arena's handle table. A
//! node is created by a constructor, by parsing, or by extraction (which
//! always deep-copies), and is destroyed by [`NodeArena::cleanup`], by being
//! consumed into a composite, or by being overwritten in an output slot.

use std::collections::HashSet;

use smallvec::SmallVec;
use vellum_codec::Codepage;
use vellum_core::{ConfigError, Map, NodeError, NodeHandle, NodeKind, Value};

use crate::config::ArenaConfig;
use crate::handle::HandleTable;

/// Owner of every live node and the registry of valid handles.
pub struct NodeArena {
    nodes: HandleTable<Value>,
    codepage: Codepage,
}

impl NodeArena {
    /// Create an arena from a validated configuration.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            nodes: HandleTable::with_capacity(config.initial_capacity, config.max_live_nodes),
            codepage: Codepage::WINDOWS_1251,
        })
    }

    /// An unbounded arena with no preallocation, usable in a `static`.
    pub const fn empty() -> Self {
        Self {
            nodes: HandleTable::new(),
            codepage: Codepage::WINDOWS_1251,
        }
    }

    /// The legacy codepage used for string keys and values.
    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    // ── registry ────────────────────────────────────────────────

    /// Whether `handle` currently refers to a live node.
    pub fn is_valid(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(handle)
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    /// Kind of the node behind `handle`.
    pub fn kind(&self, handle: NodeHandle) -> Result<NodeKind, NodeError> {
        self.value(handle).map(NodeKind::of)
    }

    /// Borrow the value behind `handle`.
    pub fn value(&self, handle: NodeHandle) -> Result<&Value, NodeError> {
        self.nodes.get(handle).ok_or(NodeError::InvalidHandle { handle })
    }

    pub(crate) fn value_mut(&mut self, handle: NodeHandle) -> Result<&mut Value, NodeError> {
        self.nodes
            .get_mut(handle)
            .ok_or(NodeError::InvalidHandle { handle })
    }

    /// Register a value and return its new handle.
    pub fn insert(&mut self, value: Value) -> Result<NodeHandle, NodeError> {
        let limit = self.nodes.limit();
        self.nodes.insert(value).ok_or(NodeError::CapacityExceeded {
            limit: limit.unwrap_or(u32::MAX),
        })
    }

    /// Remove a node from the registry and hand its value to the caller.
    ///
    /// The handle is invalid afterwards.
    pub fn take(&mut self, handle: NodeHandle) -> Result<Value, NodeError> {
        self.nodes
            .remove(handle)
            .ok_or(NodeError::InvalidHandle { handle })
    }

    /// Free a node. Its handle is invalid afterwards.
    ///
    /// Freeing a null, unknown or already-freed handle is reported as
    /// [`NodeError::InvalidHandle`] and touches nothing else.
    pub fn cleanup(&mut self, handle: NodeHandle) -> Result<(), NodeError> {
        match self.nodes.remove(handle) {
            Some(_) => Ok(()),
            None => {
                log::debug!("cleanup of {handle} ignored: not a live node");
                Err(NodeError::InvalidHandle { handle })
            }
        }
    }

    /// Register `value` into a caller-held output slot.
    ///
    /// The slot's previous occupant is freed first if it is still live; a
    /// null or stale occupant is left alone. On failure the slot is null.
    pub fn store_output(&mut self, slot: &mut NodeHandle, value: Value) -> Result<(), NodeError> {
        if self.nodes.remove(*slot).is_some() {
            log::trace!("output slot released {slot}");
        }
        *slot = NodeHandle::NULL;
        *slot = self.insert(value)?;
        Ok(())
    }

    /// Deep-copy the node behind `handle` into a new handle.
    pub fn copy(&mut self, handle: NodeHandle) -> Result<NodeHandle, NodeError> {
        let value = self.value(handle)?.clone();
        self.insert(value)
    }

    // ── construction ────────────────────────────────────────────

    /// New `null` node.
    pub fn null(&mut self) -> Result<NodeHandle, NodeError> {
        self.insert(Value::Null)
    }

    /// New boolean node.
    pub fn bool(&mut self, value: bool) -> Result<NodeHandle, NodeError> {
        self.insert(Value::Bool(value))
    }

    /// New integer node.
    pub fn int(&mut self, value: i64) -> Result<NodeHandle, NodeError> {
        self.insert(Value::from(value))
    }

    /// New float node. NaN and infinities are stored as `null`.
    pub fn float(&mut self, value: f64) -> Result<NodeHandle, NodeError> {
        self.insert(float_value(value))
    }

    /// New string node from legacy-encoded bytes.
    pub fn string(&mut self, legacy: &[u8]) -> Result<NodeHandle, NodeError> {
        let text = self.codepage.encode(legacy);
        self.insert(Value::String(text))
    }

    /// New object node built from `(legacy key, handle)` entries.
    ///
    /// All handles are validated before any is consumed: a null, stale or
    /// repeated handle fails the whole call and consumes nothing. On
    /// success every input handle is invalid. For duplicate keys the later
    /// value wins and the key keeps its first position.
    pub fn object<K: AsRef<[u8]>>(
        &mut self,
        entries: &[(K, NodeHandle)],
    ) -> Result<NodeHandle, NodeError> {
        let handles: SmallVec<[NodeHandle; 8]> = entries.iter().map(|(_, h)| *h).collect();
        self.check_distinct(&handles)?;
        let mut map = Map::with_capacity(entries.len());
        for (key, handle) in entries {
            let value = self.take(*handle)?;
            map.insert(self.codepage.encode(key.as_ref()), value);
        }
        self.insert(Value::Object(map))
    }

    /// New array node built from `items`, consumed in order.
    ///
    /// Validation and consumption follow [`object`](Self::object).
    pub fn array(&mut self, items: &[NodeHandle]) -> Result<NodeHandle, NodeError> {
        self.check_distinct(items)?;
        let mut values = Vec::with_capacity(items.len());
        for &handle in items {
            values.push(self.take(handle)?);
        }
        self.insert(Value::Array(values))
    }

    /// Fail on the first handle that is not live or repeats an earlier one.
    pub(crate) fn check_distinct(&self, handles: &[NodeHandle]) -> Result<(), NodeError> {
        let mut seen = HashSet::with_capacity(handles.len());
        for &handle in handles {
            if !self.nodes.contains(handle) || !seen.insert(handle) {
                return Err(NodeError::InvalidHandle { handle });
            }
        }
        Ok(())
    }

    // ── composition ─────────────────────────────────────────────

    /// Combine two containers of the same kind into a new node.
    ///
    /// Objects are combined as a JSON merge patch (RFC 7396): nested objects
    /// merge recursively, `right`'s other values win and a `null` in `right`
    /// deletes the key. Arrays concatenate. Both operands are consumed on
    /// success and untouched on failure.
    pub fn append(&mut self, left: NodeHandle, right: NodeHandle) -> Result<NodeHandle, NodeError> {
        self.check_distinct(&[left, right])?;
        let left_kind = self.kind(left)?;
        let right_kind = self.kind(right)?;
        if !left_kind.is_container() {
            return Err(NodeError::wrong_type("object or array", left_kind));
        }
        if right_kind != left_kind {
            let expected = if left_kind == NodeKind::Object {
                "object"
            } else {
                "array"
            };
            return Err(NodeError::wrong_type(expected, right_kind));
        }

        let combined = match (self.take(left)?, self.take(right)?) {
            (Value::Array(mut items), Value::Array(tail)) => {
                items.extend(tail);
                Value::Array(items)
            }
            (mut target @ Value::Object(_), patch @ Value::Object(_)) => {
                merge_patch(&mut target, patch);
                target
            }
            // Kinds were matched above.
            (value, _) => value,
        };
        self.insert(combined)
    }

    /// Alias of [`append`](Self::append).
    pub fn merge(&mut self, left: NodeHandle, right: NodeHandle) -> Result<NodeHandle, NodeError> {
        self.append(left, right)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self {
            nodes: HandleTable::with_capacity(ArenaConfig::DEFAULT_INITIAL_CAPACITY, None),
            codepage: Codepage::WINDOWS_1251,
        }
    }
}

/// JSON value for a float; non-finite values have no JSON form.
pub(crate) fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Apply `patch` to `target` per RFC 7396.
fn merge_patch(target: &mut Value, patch: Value) {
    let Value::Object(patch) = patch else {
        *target = patch;
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        for (key, value) in patch {
            if value.is_null() {
                map.shift_remove(&key);
            } else {
                merge_patch(map.entry(key).or_insert(Value::Null), value);
            }
        }
    }
}
