//! Keyed mutation, typed getters and array operations.
//!
//! Keys arrive legacy-encoded and are transcoded before lookup. Every
//! operation validates its handles first; nothing is consumed or modified
//! unless the whole call succeeds.

use vellum_core::{ArrayCursor, Map, NodeError, NodeHandle, NodeKind, Value};

use crate::arena::{float_value, NodeArena};

impl NodeArena {
    // ── setters ─────────────────────────────────────────────────

    /// Upsert `node[key] = value`.
    ///
    /// A `null` node is promoted to an empty object first; any other
    /// non-object node fails with [`NodeError::WrongType`].
    pub fn set_value(&mut self, node: NodeHandle, key: &[u8], value: Value) -> Result<(), NodeError> {
        let key = self.codepage().encode(key);
        let target = self.value_mut(node)?;
        if target.is_null() {
            *target = Value::Object(Map::new());
        }
        match target {
            Value::Object(map) => {
                map.insert(key, value);
                Ok(())
            }
            other => Err(NodeError::wrong_type("object", NodeKind::of(other))),
        }
    }

    /// `node[key] = null`.
    pub fn set_null(&mut self, node: NodeHandle, key: &[u8]) -> Result<(), NodeError> {
        self.set_value(node, key, Value::Null)
    }

    /// `node[key] = value`.
    pub fn set_bool(&mut self, node: NodeHandle, key: &[u8], value: bool) -> Result<(), NodeError> {
        self.set_value(node, key, Value::Bool(value))
    }

    /// `node[key] = value`.
    pub fn set_int(&mut self, node: NodeHandle, key: &[u8], value: i64) -> Result<(), NodeError> {
        self.set_value(node, key, Value::from(value))
    }

    /// `node[key] = value`. Non-finite values are stored as `null`.
    pub fn set_float(&mut self, node: NodeHandle, key: &[u8], value: f64) -> Result<(), NodeError> {
        self.set_value(node, key, float_value(value))
    }

    /// `node[key] = value`, with `value` transcoded from the legacy codepage.
    pub fn set_string(&mut self, node: NodeHandle, key: &[u8], value: &[u8]) -> Result<(), NodeError> {
        let text = self.codepage().encode(value);
        self.set_value(node, key, Value::String(text))
    }

    /// Move the object node `value` into `node[key]`, consuming `value`.
    pub fn set_object(&mut self, node: NodeHandle, key: &[u8], value: NodeHandle) -> Result<(), NodeError> {
        self.set_node(node, key, value, NodeKind::Object)
    }

    /// Move the array node `value` into `node[key]`, consuming `value`.
    pub fn set_array(&mut self, node: NodeHandle, key: &[u8], value: NodeHandle) -> Result<(), NodeError> {
        self.set_node(node, key, value, NodeKind::Array)
    }

    fn set_node(
        &mut self,
        node: NodeHandle,
        key: &[u8],
        value: NodeHandle,
        expected: NodeKind,
    ) -> Result<(), NodeError> {
        let target_kind = self.kind(node)?;
        let value_kind = self.kind(value)?;
        if node == value {
            return Err(NodeError::InvalidHandle { handle: value });
        }
        if value_kind != expected {
            return Err(NodeError::wrong_type(expected.name(), value_kind));
        }
        if !matches!(target_kind, NodeKind::Object | NodeKind::Null) {
            return Err(NodeError::wrong_type("object", target_kind));
        }
        let moved = self.take(value)?;
        self.set_value(node, key, moved)
    }

    /// Erase `node[key]`, keeping the order of the remaining keys.
    ///
    /// Returns whether the key was present; an absent key is not an error.
    pub fn remove(&mut self, node: NodeHandle, key: &[u8]) -> Result<bool, NodeError> {
        let key = self.codepage().encode(key);
        Ok(self.object_mut(node)?.shift_remove(&key).is_some())
    }

    // ── getters ─────────────────────────────────────────────────

    /// Kind of `node[key]`.
    pub fn get_kind(&self, node: NodeHandle, key: &[u8]) -> Result<NodeKind, NodeError> {
        self.field(node, key).map(NodeKind::of)
    }

    /// Read a boolean field.
    pub fn get_bool(&self, node: NodeHandle, key: &[u8]) -> Result<bool, NodeError> {
        as_bool(self.field(node, key)?)
    }

    /// Read an integer field. Float fields fail with `WrongType`.
    pub fn get_int(&self, node: NodeHandle, key: &[u8]) -> Result<i64, NodeError> {
        as_int(self.field(node, key)?)
    }

    /// Read a float field. Integer fields fail with `WrongType`.
    pub fn get_float(&self, node: NodeHandle, key: &[u8]) -> Result<f64, NodeError> {
        as_float(self.field(node, key)?)
    }

    /// Read a string field, decoded to the legacy codepage.
    pub fn get_string(&self, node: NodeHandle, key: &[u8]) -> Result<Vec<u8>, NodeError> {
        self.as_legacy_string(self.field(node, key)?)
    }

    /// Copy the object at `node[key]` into the output slot `out`.
    pub fn get_object(&mut self, node: NodeHandle, key: &[u8], out: &mut NodeHandle) -> Result<(), NodeError> {
        self.get_container(node, key, out, NodeKind::Object)
    }

    /// Copy the array at `node[key]` into the output slot `out`.
    pub fn get_array(&mut self, node: NodeHandle, key: &[u8], out: &mut NodeHandle) -> Result<(), NodeError> {
        self.get_container(node, key, out, NodeKind::Array)
    }

    fn get_container(
        &mut self,
        node: NodeHandle,
        key: &[u8],
        out: &mut NodeHandle,
        expected: NodeKind,
    ) -> Result<(), NodeError> {
        let field = self.field(node, key)?;
        let found = NodeKind::of(field);
        if found != expected {
            return Err(NodeError::wrong_type(expected.name(), found));
        }
        let copy = field.clone();
        self.store_output(out, copy)
    }

    /// Read a boolean node.
    pub fn node_bool(&self, node: NodeHandle) -> Result<bool, NodeError> {
        as_bool(self.value(node)?)
    }

    /// Read an integer node.
    pub fn node_int(&self, node: NodeHandle) -> Result<i64, NodeError> {
        as_int(self.value(node)?)
    }

    /// Read a float node.
    pub fn node_float(&self, node: NodeHandle) -> Result<f64, NodeError> {
        as_float(self.value(node)?)
    }

    /// Read a string node, decoded to the legacy codepage.
    pub fn node_string(&self, node: NodeHandle) -> Result<Vec<u8>, NodeError> {
        self.as_legacy_string(self.value(node)?)
    }

    // ── keys ────────────────────────────────────────────────────

    /// Number of keys in an object node.
    pub fn key_count(&self, node: NodeHandle) -> Result<usize, NodeError> {
        Ok(self.object_ref(node)?.len())
    }

    /// The `index`-th key of an object node (insertion order), legacy-encoded.
    pub fn key_at(&self, node: NodeHandle, index: i64) -> Result<Vec<u8>, NodeError> {
        let map = self.object_ref(node)?;
        let key = usize::try_from(index)
            .ok()
            .and_then(|i| map.keys().nth(i))
            .ok_or(NodeError::IndexOutOfRange {
                index,
                len: map.len(),
            })?;
        Ok(self.codepage().decode(key.as_bytes()))
    }

    // ── arrays ──────────────────────────────────────────────────

    /// Number of elements in an array node.
    pub fn array_len(&self, node: NodeHandle) -> Result<usize, NodeError> {
        Ok(self.array_ref(node)?.len())
    }

    /// Copy element `index` of an array node into the output slot `out`.
    pub fn array_get(&mut self, node: NodeHandle, index: i64, out: &mut NodeHandle) -> Result<(), NodeError> {
        let items = self.array_ref(node)?;
        let item = usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .ok_or(NodeError::IndexOutOfRange {
                index,
                len: items.len(),
            })?
            .clone();
        self.store_output(out, item)
    }

    /// Step an iteration over an array node.
    ///
    /// Copies the element after `cursor` into `out` and advances the
    /// cursor. Past the last element this fails with
    /// [`NodeError::IndexOutOfRange`] and leaves both `cursor` and `out`
    /// untouched.
    pub fn array_iterate(
        &mut self,
        node: NodeHandle,
        cursor: &mut ArrayCursor,
        out: &mut NodeHandle,
    ) -> Result<(), NodeError> {
        let items = self.array_ref(node)?;
        let next = cursor
            .next_index()
            .filter(|&i| i < items.len())
            .ok_or(NodeError::IndexOutOfRange {
                index: cursor.0.saturating_add(1),
                len: items.len(),
            })?;
        let item = items[next].clone();
        self.store_output(out, item)?;
        *cursor = ArrayCursor(next as i64);
        Ok(())
    }

    /// Append `value` to the array at `node[key]`, consuming `value`.
    ///
    /// The key must already hold an array; an absent key is
    /// [`NodeError::WrongType`] and nothing is inserted.
    pub fn array_append(&mut self, node: NodeHandle, key: &[u8], value: NodeHandle) -> Result<(), NodeError> {
        self.check_distinct(&[node, value])?;
        let key = self.codepage().encode(key);
        self.array_entry(node, &key)?
            .ok_or(NodeError::wrong_type("array", NodeKind::Null))?;
        let moved = self.take(value)?;
        if let Some(items) = self.array_entry(node, &key)? {
            items.push(moved);
        }
        Ok(())
    }

    /// Append `value` to the array node `node`, consuming `value`.
    pub fn array_push(&mut self, node: NodeHandle, value: NodeHandle) -> Result<(), NodeError> {
        self.check_distinct(&[node, value])?;
        self.array_mut(node)?;
        let moved = self.take(value)?;
        self.array_mut(node)?.push(moved);
        Ok(())
    }

    /// Delete every element of `node[key]` deep-equal to `value`.
    ///
    /// `value` is compared, not consumed. Returns the number of removed
    /// elements.
    pub fn array_remove_value(
        &mut self,
        node: NodeHandle,
        key: &[u8],
        value: NodeHandle,
    ) -> Result<usize, NodeError> {
        let needle = self.value(value)?.clone();
        let key = self.codepage().encode(key);
        let items = self
            .array_entry(node, &key)?
            .ok_or(NodeError::MissingKey { key })?;
        let before = items.len();
        items.retain(|item| *item != needle);
        Ok(before - items.len())
    }

    /// Delete element `index` of `node[key]`, shifting later elements down.
    pub fn array_remove_index(&mut self, node: NodeHandle, key: &[u8], index: i64) -> Result<(), NodeError> {
        let key = self.codepage().encode(key);
        let items = self
            .array_entry(node, &key)?
            .ok_or(NodeError::MissingKey { key })?;
        match usize::try_from(index) {
            Ok(i) if i < items.len() => {
                items.remove(i);
                Ok(())
            }
            _ => Err(NodeError::IndexOutOfRange {
                index,
                len: items.len(),
            }),
        }
    }

    /// Reset `node[key]` to the empty value of its kind.
    ///
    /// Objects become `{}`, arrays `[]`, strings `""`, numbers zero of the
    /// same kind, booleans `false`; `null` stays `null`.
    pub fn array_clear(&mut self, node: NodeHandle, key: &[u8]) -> Result<(), NodeError> {
        let key = self.codepage().encode(key);
        let map = self.object_mut(node)?;
        let field = map.get_mut(&key).ok_or(NodeError::MissingKey { key })?;
        *field = empty_like(field);
        Ok(())
    }

    // ── helpers ─────────────────────────────────────────────────

    /// `node[key]`. A non-object node has no keys.
    fn field(&self, node: NodeHandle, key: &[u8]) -> Result<&Value, NodeError> {
        let key = self.codepage().encode(key);
        match self.value(node)? {
            Value::Object(map) => map.get(&key).ok_or(NodeError::MissingKey { key }),
            _ => Err(NodeError::MissingKey { key }),
        }
    }

    fn object_ref(&self, node: NodeHandle) -> Result<&Map, NodeError> {
        match self.value(node)? {
            Value::Object(map) => Ok(map),
            other => Err(NodeError::wrong_type("object", NodeKind::of(other))),
        }
    }

    fn object_mut(&mut self, node: NodeHandle) -> Result<&mut Map, NodeError> {
        match self.value_mut(node)? {
            Value::Object(map) => Ok(map),
            other => Err(NodeError::wrong_type("object", NodeKind::of(other))),
        }
    }

    fn array_ref(&self, node: NodeHandle) -> Result<&Vec<Value>, NodeError> {
        match self.value(node)? {
            Value::Array(items) => Ok(items),
            other => Err(NodeError::wrong_type("array", NodeKind::of(other))),
        }
    }

    fn array_mut(&mut self, node: NodeHandle) -> Result<&mut Vec<Value>, NodeError> {
        match self.value_mut(node)? {
            Value::Array(items) => Ok(items),
            other => Err(NodeError::wrong_type("array", NodeKind::of(other))),
        }
    }

    /// The array stored at `node[key]`, or `None` if the key is absent.
    fn array_entry(&mut self, node: NodeHandle, key: &str) -> Result<Option<&mut Vec<Value>>, NodeError> {
        match self.object_mut(node)?.get_mut(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(NodeError::wrong_type("array", NodeKind::of(other))),
        }
    }

    fn as_legacy_string(&self, value: &Value) -> Result<Vec<u8>, NodeError> {
        let Value::String(text) = value else {
            return Err(NodeError::wrong_type("string", NodeKind::of(value)));
        };
        let legacy = self.codepage().decode(text.as_bytes());
        if !text.is_empty() && legacy.first() == Some(&0) {
            return Err(NodeError::NoReturnString);
        }
        Ok(legacy)
    }
}

fn as_bool(value: &Value) -> Result<bool, NodeError> {
    value
        .as_bool()
        .ok_or_else(|| NodeError::wrong_type("bool", NodeKind::of(value)))
}

/// Integer storage as `i64`; `u64` values above `i64::MAX` wrap.
fn as_int(value: &Value) -> Result<i64, NodeError> {
    match value {
        Value::Number(n) if !n.is_f64() => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| u as i64))
            .ok_or_else(|| NodeError::wrong_type("int", NodeKind::Float)),
        other => Err(NodeError::wrong_type("int", NodeKind::of(other))),
    }
}

fn as_float(value: &Value) -> Result<f64, NodeError> {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .ok_or_else(|| NodeError::wrong_type("float", NodeKind::Int)),
        other => Err(NodeError::wrong_type("float", NodeKind::of(other))),
    }
}

fn empty_like(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(_) => Value::Bool(false),
        Value::Number(n) if n.is_f64() => Value::from(0.0),
        Value::Number(_) => Value::from(0),
        Value::String(_) => Value::String(String::new()),
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(_) => Value::Object(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with(value: Value) -> (NodeArena, NodeHandle) {
        let mut arena = NodeArena::default();
        let node = arena.insert(value).unwrap();
        (arena, node)
    }

    fn text(arena: &NodeArena, node: NodeHandle) -> String {
        serde_json::to_string(arena.value(node).unwrap()).unwrap()
    }

    // ── setters ─────────────────────────────────────────────────

    #[test]
    fn set_int_then_typed_getters() {
        let (mut a, obj) = with(json!({}));
        a.set_int(obj, b"x", 5).unwrap();
        assert_eq!(a.get_int(obj, b"x").unwrap(), 5);
        assert_eq!(
            a.get_float(obj, b"x").unwrap_err(),
            NodeError::wrong_type("float", NodeKind::Int)
        );
    }

    #[test]
    fn set_float_rejects_int_getter() {
        let (mut a, obj) = with(json!({}));
        a.set_float(obj, b"f", 1.0).unwrap();
        assert_eq!(a.get_float(obj, b"f").unwrap(), 1.0);
        assert!(matches!(
            a.get_int(obj, b"f"),
            Err(NodeError::WrongType { .. })
        ));
    }

    #[test]
    fn set_overwrites_in_place() {
        let (mut a, obj) = with(json!({"a": 1, "b": 2}));
        a.set_string(obj, b"a", b"one").unwrap();
        a.set_bool(obj, b"c", true).unwrap();
        a.set_null(obj, b"d").unwrap();
        assert_eq!(text(&a, obj), r#"{"a":"one","b":2,"c":true,"d":null}"#);
    }

    #[test]
    fn set_on_null_promotes_to_object() {
        let (mut a, node) = with(json!(null));
        a.set_int(node, b"k", 1).unwrap();
        assert_eq!(a.kind(node).unwrap(), NodeKind::Object);
    }

    #[test]
    fn set_on_array_is_wrong_type() {
        let (mut a, node) = with(json!([]));
        assert_eq!(
            a.set_int(node, b"k", 1).unwrap_err(),
            NodeError::wrong_type("object", NodeKind::Array)
        );
    }

    #[test]
    fn set_on_invalid_handle_is_not_found() {
        let mut a = NodeArena::default();
        assert!(a.set_int(NodeHandle::NULL, b"k", 1).unwrap_err().is_not_found());
    }

    #[test]
    fn set_string_transcodes_key_and_value() {
        let (mut a, obj) = with(json!({}));
        // key "Имя" = C8 EC FF, value "Петя" = CF E5 F2 FF
        a.set_string(obj, &[0xC8, 0xEC, 0xFF], &[0xCF, 0xE5, 0xF2, 0xFF])
            .unwrap();
        assert_eq!(a.value(obj).unwrap(), &json!({"Имя": "Петя"}));
        assert_eq!(
            a.get_string(obj, &[0xC8, 0xEC, 0xFF]).unwrap(),
            vec![0xCF, 0xE5, 0xF2, 0xFF]
        );
    }

    #[test]
    fn set_object_consumes_value() {
        let (mut a, obj) = with(json!({}));
        let child = a.insert(json!({"hp": 10})).unwrap();
        a.set_object(obj, b"stats", child).unwrap();
        assert!(!a.is_valid(child));
        assert_eq!(text(&a, obj), r#"{"stats":{"hp":10}}"#);
    }

    #[test]
    fn set_array_requires_array_value() {
        let (mut a, obj) = with(json!({}));
        let child = a.insert(json!({"not": "array"})).unwrap();
        assert_eq!(
            a.set_array(obj, b"list", child).unwrap_err(),
            NodeError::wrong_type("array", NodeKind::Object)
        );
        assert!(a.is_valid(child), "failed set must not consume");
    }

    #[test]
    fn set_object_into_itself_is_not_found() {
        let (mut a, obj) = with(json!({}));
        assert!(a.set_object(obj, b"me", obj).unwrap_err().is_not_found());
        assert!(a.is_valid(obj));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let (mut a, obj) = with(json!({"a": 1, "b": 2, "c": 3}));
        assert!(a.remove(obj, b"a").unwrap());
        assert_eq!(text(&a, obj), r#"{"b":2,"c":3}"#);
        assert!(!a.remove(obj, b"zzz").unwrap(), "absent key is a no-op");
    }

    #[test]
    fn remove_on_non_object_is_wrong_type() {
        let (mut a, arr) = with(json!([1]));
        assert!(matches!(a.remove(arr, b"a"), Err(NodeError::WrongType { .. })));
    }

    // ── getters ─────────────────────────────────────────────────

    #[test]
    fn getters_on_missing_key() {
        let (a, obj) = with(json!({"a": 1}));
        assert_eq!(
            a.get_int(obj, b"b").unwrap_err(),
            NodeError::MissingKey { key: "b".into() }
        );
    }

    #[test]
    fn getters_on_non_object_have_no_keys() {
        let (a, arr) = with(json!([1, 2]));
        assert!(a.get_int(arr, b"0").unwrap_err().is_not_found());
    }

    #[test]
    fn get_kind_reports_field_kind() {
        let (a, obj) = with(json!({"s": "x", "n": null, "a": []}));
        assert_eq!(a.get_kind(obj, b"s").unwrap(), NodeKind::String);
        assert_eq!(a.get_kind(obj, b"n").unwrap(), NodeKind::Null);
        assert_eq!(a.get_kind(obj, b"a").unwrap(), NodeKind::Array);
    }

    #[test]
    fn get_object_copies_into_slot() {
        let (mut a, obj) = with(json!({"inner": {"v": 1}}));
        let mut out = NodeHandle::NULL;
        a.get_object(obj, b"inner", &mut out).unwrap();
        a.set_int(out, b"v", 2).unwrap();
        assert_eq!(a.get_int(out, b"v").unwrap(), 2);
        assert_eq!(text(&a, obj), r#"{"inner":{"v":1}}"#, "no aliasing");
    }

    #[test]
    fn get_array_wrong_kind() {
        let (mut a, obj) = with(json!({"inner": {"v": 1}}));
        let mut out = NodeHandle::NULL;
        assert_eq!(
            a.get_array(obj, b"inner", &mut out).unwrap_err(),
            NodeError::wrong_type("array", NodeKind::Object)
        );
        assert!(out.is_null());
    }

    #[test]
    fn get_string_wrong_kind() {
        let (a, obj) = with(json!({"n": 3}));
        assert!(matches!(
            a.get_string(obj, b"n"),
            Err(NodeError::WrongType { .. })
        ));
    }

    #[test]
    fn string_starting_with_nul_has_no_return_string() {
        let (a, obj) = with(json!({"s": "\u{0}tail", "e": ""}));
        assert_eq!(a.get_string(obj, b"s").unwrap_err(), NodeError::NoReturnString);
        assert_eq!(a.get_string(obj, b"e").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn unmappable_characters_become_question_marks() {
        let (a, obj) = with(json!({"s": "caf\u{e9}"}));
        assert_eq!(a.get_string(obj, b"s").unwrap(), b"caf?");
    }

    #[test]
    fn node_level_getters() {
        let mut a = NodeArena::default();
        let b = a.bool(true).unwrap();
        let i = a.int(-4).unwrap();
        let f = a.float(0.25).unwrap();
        let s = a.string(b"abc").unwrap();
        assert!(a.node_bool(b).unwrap());
        assert_eq!(a.node_int(i).unwrap(), -4);
        assert_eq!(a.node_float(f).unwrap(), 0.25);
        assert_eq!(a.node_string(s).unwrap(), b"abc");
        assert!(matches!(a.node_int(f), Err(NodeError::WrongType { .. })));
    }

    #[test]
    fn unsigned_overflow_wraps_to_i64() {
        let (a, obj) = with(json!({"big": u64::MAX}));
        assert_eq!(a.get_int(obj, b"big").unwrap(), -1);
    }

    // ── keys ────────────────────────────────────────────────────

    #[test]
    fn key_at_walks_insertion_order() {
        let (a, obj) = with(json!({"z": 1, "a": 2}));
        assert_eq!(a.key_count(obj).unwrap(), 2);
        assert_eq!(a.key_at(obj, 0).unwrap(), b"z");
        assert_eq!(a.key_at(obj, 1).unwrap(), b"a");
        assert!(a.key_at(obj, 2).unwrap_err().is_not_found());
        assert!(a.key_at(obj, -1).unwrap_err().is_not_found());
    }

    // ── arrays ──────────────────────────────────────────────────

    #[test]
    fn array_len_on_object_is_wrong_type() {
        let mut a = NodeArena::default();
        let one = a.int(1).unwrap();
        let obj = a.object(&[(b"a", one)]).unwrap();
        assert_eq!(
            a.array_len(obj).unwrap_err(),
            NodeError::wrong_type("array", NodeKind::Object)
        );
    }

    #[test]
    fn array_get_bounds() {
        let (mut a, arr) = with(json!([10, 20]));
        let mut out = NodeHandle::NULL;
        a.array_get(arr, 1, &mut out).unwrap();
        assert_eq!(a.node_int(out).unwrap(), 20);
        assert!(a.array_get(arr, 2, &mut out).unwrap_err().is_not_found());
        assert!(a.array_get(arr, -1, &mut out).unwrap_err().is_not_found());
        assert_eq!(a.node_int(out).unwrap(), 20, "failed get keeps slot");
    }

    #[test]
    fn iterate_yields_each_element_then_stops() {
        let (mut a, arr) = with(json!(["a", "b", "c"]));
        let mut cursor = ArrayCursor::new();
        let mut out = NodeHandle::NULL;
        let mut seen = Vec::new();
        while a.array_iterate(arr, &mut cursor, &mut out).is_ok() {
            seen.push(a.node_string(out).unwrap());
        }
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(cursor, ArrayCursor(2));
        // Only the last copy is live besides the array itself.
        assert_eq!(a.live_count(), 2);
        assert_eq!(a.node_string(out).unwrap(), b"c");

        cursor.reset();
        a.array_iterate(arr, &mut cursor, &mut out).unwrap();
        assert_eq!(a.node_string(out).unwrap(), b"a");
    }

    #[test]
    fn iterate_empty_array_fails_immediately() {
        let (mut a, arr) = with(json!([]));
        let mut cursor = ArrayCursor::new();
        let mut out = NodeHandle::NULL;
        assert!(a
            .array_iterate(arr, &mut cursor, &mut out)
            .unwrap_err()
            .is_not_found());
        assert_eq!(cursor, ArrayCursor::BEFORE_FIRST);
        assert!(out.is_null());
    }

    #[test]
    fn array_append_consumes_value() {
        let (mut a, obj) = with(json!({"list": [1]}));
        let v = a.int(2).unwrap();
        a.array_append(obj, b"list", v).unwrap();
        assert!(!a.is_valid(v));
        assert_eq!(text(&a, obj), r#"{"list":[1,2]}"#);
    }

    #[test]
    fn array_append_to_absent_key_is_wrong_type() {
        let (mut a, obj) = with(json!({}));
        let v = a.int(2).unwrap();
        assert!(matches!(
            a.array_append(obj, b"list", v),
            Err(NodeError::WrongType { .. })
        ));
        assert!(a.is_valid(v));
        assert_eq!(text(&a, obj), "{}");
    }

    #[test]
    fn array_append_to_non_array_leaves_both_valid() {
        let (mut a, obj) = with(json!({"list": "nope"}));
        let v = a.int(2).unwrap();
        assert!(a.array_append(obj, b"list", v).is_err());
        assert!(a.is_valid(obj));
        assert!(a.is_valid(v));
        assert_eq!(text(&a, obj), r#"{"list":"nope"}"#);
    }

    #[test]
    fn array_push_direct() {
        let (mut a, arr) = with(json!([]));
        let v = a.string(b"x").unwrap();
        a.array_push(arr, v).unwrap();
        assert_eq!(a.array_len(arr).unwrap(), 1);
        assert!(!a.is_valid(v));
        assert!(a.array_push(arr, arr).unwrap_err().is_not_found());
    }

    #[test]
    fn remove_value_deletes_all_matches_without_consuming() {
        let (mut a, obj) = with(json!({"l": [1, {"k": 2}, 1, 3, {"k": 2}]}));
        let needle = a.insert(json!({"k": 2})).unwrap();
        assert_eq!(a.array_remove_value(obj, b"l", needle).unwrap(), 2);
        assert_eq!(text(&a, obj), r#"{"l":[1,1,3]}"#);
        assert!(a.is_valid(needle));
    }

    #[test]
    fn remove_value_errors() {
        let (mut a, obj) = with(json!({"s": "x"}));
        let needle = a.int(1).unwrap();
        assert!(a.array_remove_value(obj, b"absent", needle).unwrap_err().is_not_found());
        assert!(matches!(
            a.array_remove_value(obj, b"s", needle),
            Err(NodeError::WrongType { .. })
        ));
    }

    #[test]
    fn remove_index_shifts_elements() {
        let (mut a, obj) = with(json!({"l": ["a", "b", "c"]}));
        a.array_remove_index(obj, b"l", 1).unwrap();
        assert_eq!(text(&a, obj), r#"{"l":["a","c"]}"#);
        assert!(a.array_remove_index(obj, b"l", 2).unwrap_err().is_not_found());
        assert!(a.array_remove_index(obj, b"l", -1).unwrap_err().is_not_found());
        assert!(a.array_remove_index(obj, b"x", 0).unwrap_err().is_not_found());
    }

    #[test]
    fn remove_index_on_non_object_is_wrong_type() {
        let (mut a, arr) = with(json!([1]));
        assert!(matches!(
            a.array_remove_index(arr, b"l", 0),
            Err(NodeError::WrongType { .. })
        ));
    }

    #[test]
    fn clear_resets_every_kind() {
        let (mut a, obj) = with(json!({
            "o": {"a": 1}, "l": [1], "s": "x", "i": 7, "f": 1.5, "b": true, "n": null
        }));
        for key in [&b"o"[..], b"l", b"s", b"i", b"f", b"b", b"n"] {
            a.array_clear(obj, key).unwrap();
        }
        assert_eq!(
            text(&a, obj),
            r#"{"o":{},"l":[],"s":"","i":0,"f":0.0,"b":false,"n":null}"#
        );
        assert!(a.array_clear(obj, b"zz").unwrap_err().is_not_found());
    }
}
