//! Shared value graphs and their cycle-safe deep copy.
//!
//! [`serde_json::Value`] is a tree, so a clone of it can never alias or loop.
//! Fixtures assembled by hand sometimes need shared sub-structure or even
//! self-reference (a record containing itself). [`SharedValue`] keeps records
//! and sequences behind reference-counted handles so such graphs can be
//! expressed, and [`SharedValue::deep_clone`] copies them while preserving
//! which handles are shared.
//!
//! Handles are plain [`Rc`]s, so a cyclic graph (and every deep clone of it)
//! is never freed on its own. Call [`SharedValue::clear`] on one container of
//! each cycle before dropping the last handle.

use crate::error::CycleError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Shared, mutable record handle.
pub type RecordHandle = Rc<RefCell<IndexMap<String, SharedValue>>>;

/// Shared, mutable sequence handle.
pub type SequenceHandle = Rc<RefCell<Vec<SharedValue>>>;

/// A JSON-like value whose containers are shared handles.
#[derive(Clone)]
pub enum SharedValue {
    /// Any non-container value, passed through untouched by clones.
    Scalar(Value),
    /// An object.
    Record(RecordHandle),
    /// An array.
    Sequence(SequenceHandle),
}

impl SharedValue {
    /// A new empty record.
    pub fn record() -> Self {
        Self::Record(Rc::new(RefCell::new(IndexMap::new())))
    }

    /// A new empty sequence.
    pub fn sequence() -> Self {
        Self::Sequence(Rc::new(RefCell::new(Vec::new())))
    }

    /// Sets `key` on a record. Returns `false` if `self` is not a record.
    pub fn set(&self, key: impl Into<String>, value: SharedValue) -> bool {
        match self {
            Self::Record(record) => {
                record.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Appends to a sequence. Returns `false` if `self` is not a sequence.
    pub fn push(&self, value: SharedValue) -> bool {
        match self {
            Self::Sequence(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Handle stored under `key` of a record.
    pub fn get(&self, key: &str) -> Option<SharedValue> {
        match self {
            Self::Record(record) => record.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Handle stored at `idx` of a sequence.
    pub fn at(&self, idx: usize) -> Option<SharedValue> {
        match self {
            Self::Sequence(items) => items.borrow().get(idx).cloned(),
            _ => None,
        }
    }

    /// Empties a record or sequence. Does nothing for scalars.
    ///
    /// The removed handles are dropped, which breaks any cycle running
    /// through this container.
    pub fn clear(&self) {
        match self {
            Self::Record(record) => {
                let entries = std::mem::take(&mut *record.borrow_mut());
                drop(entries);
            }
            Self::Sequence(items) => {
                let items = std::mem::take(&mut *items.borrow_mut());
                drop(items);
            }
            Self::Scalar(_) => {}
        }
    }

    /// The scalar value, if this is one.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Whether both are the same container handle.
    ///
    /// Scalars never share identity.
    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn identity(&self) -> Option<*const ()> {
        match self {
            Self::Scalar(_) => None,
            Self::Record(record) => Some(Rc::as_ptr(record).cast()),
            Self::Sequence(items) => Some(Rc::as_ptr(items).cast()),
        }
    }

    /// Builds a graph from a JSON tree. No handle is shared in the result.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Record(Rc::new(RefCell::new(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ))),
            Value::Array(items) => Self::Sequence(Rc::new(RefCell::new(
                items.iter().map(Self::from_json).collect(),
            ))),
            scalar => Self::Scalar(scalar.clone()),
        }
    }

    /// Flattens the graph into a JSON tree.
    ///
    /// Shared sub-graphs are duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if a container is reachable from itself.
    pub fn to_json(&self) -> Result<Value, CycleError> {
        self.to_json_inner(&mut HashSet::new())
    }

    fn to_json_inner(&self, ancestors: &mut HashSet<*const ()>) -> Result<Value, CycleError> {
        let Some(id) = self.identity() else {
            return Ok(self.as_scalar().cloned().unwrap_or_default());
        };
        if !ancestors.insert(id) {
            return Err(CycleError);
        }

        let result = match self {
            Self::Record(record) => {
                let mut map = Map::new();
                for (key, value) in record.borrow().iter() {
                    map.insert(key.clone(), value.to_json_inner(ancestors)?);
                }
                Value::Object(map)
            }
            Self::Sequence(items) => Value::Array(
                items
                    .borrow()
                    .iter()
                    .map(|item| item.to_json_inner(ancestors))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Scalar(value) => value.clone(),
        };

        ancestors.remove(&id);
        Ok(result)
    }

    /// Copies every reachable container.
    ///
    /// A handle reached more than once maps to the same copy, so cycles and
    /// sharing in the source reappear in the result and the walk terminates.
    pub fn deep_clone(&self) -> SharedValue {
        self.deep_clone_inner(&mut HashMap::new())
    }

    fn deep_clone_inner(&self, visited: &mut HashMap<*const (), SharedValue>) -> SharedValue {
        let Some(id) = self.identity() else {
            return self.clone();
        };
        if let Some(copy) = visited.get(&id) {
            return copy.clone();
        }

        match self {
            Self::Record(source) => {
                let copy: RecordHandle = Rc::new(RefCell::new(IndexMap::new()));
                visited.insert(id, Self::Record(Rc::clone(&copy)));

                let entries: Vec<_> = source
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (key, value) in entries {
                    let value = value.deep_clone_inner(visited);
                    copy.borrow_mut().insert(key, value);
                }
                Self::Record(copy)
            }
            Self::Sequence(source) => {
                let copy: SequenceHandle = Rc::new(RefCell::new(Vec::new()));
                visited.insert(id, Self::Sequence(Rc::clone(&copy)));

                let items: Vec<_> = source.borrow().iter().cloned().collect();
                for item in items {
                    let item = item.deep_clone_inner(visited);
                    copy.borrow_mut().push(item);
                }
                Self::Sequence(copy)
            }
            Self::Scalar(_) => self.clone(),
        }
    }
}

impl From<Value> for SharedValue {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

// Containers may be cyclic, so only print the handle address.
impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Record(record) => write!(f, "Record({:p})", Rc::as_ptr(record)),
            Self::Sequence(items) => write!(f, "Sequence({:p})", Rc::as_ptr(items)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::rc::Weak;

    #[test]
    fn test_tree_clone_is_independent() {
        let source = SharedValue::from_json(&json!({"request": {"uri": "/a"}, "tags": [1, 2]}));
        let copy = source.deep_clone();

        assert!(!copy.ptr_eq(&source));
        let copied_request = copy.get("request").unwrap();
        assert!(!copied_request.ptr_eq(&source.get("request").unwrap()));
        copied_request.set("uri", SharedValue::Scalar(json!("/b")));

        assert_eq!(source.to_json().unwrap()["request"]["uri"], json!("/a"));
        assert_eq!(copy.to_json().unwrap()["request"]["uri"], json!("/b"));
    }

    #[test]
    fn test_self_reference_is_reproduced() {
        let node = SharedValue::record();
        node.set("name", SharedValue::Scalar(json!("loop")));
        node.set("me", node.clone());

        let copy = node.deep_clone();

        assert!(!copy.ptr_eq(&node));
        assert!(copy.get("me").unwrap().ptr_eq(&copy));
        assert_eq!(copy.get("name").unwrap().as_scalar(), Some(&json!("loop")));
    }

    #[test]
    fn test_indirect_cycle_through_sequence() {
        let parent = SharedValue::record();
        let children = SharedValue::sequence();
        let child = SharedValue::record();
        child.set("parent", parent.clone());
        children.push(child);
        parent.set("children", children);

        let copy = parent.deep_clone();
        let copied_child = copy.get("children").unwrap().at(0).unwrap();
        assert!(copied_child.get("parent").unwrap().ptr_eq(&copy));
    }

    #[test]
    fn test_shared_references_stay_shared() {
        let headers = SharedValue::from_json(&json!({"host": [{"key": "Host", "value": "a"}]}));
        let root = SharedValue::record();
        root.set("request", headers.clone());
        root.set("response", headers.clone());

        let copy = root.deep_clone();
        let request = copy.get("request").unwrap();
        let response = copy.get("response").unwrap();

        assert!(request.ptr_eq(&response));
        assert!(!request.ptr_eq(&headers));
    }

    #[test]
    fn test_to_json_rejects_cycles() {
        let node = SharedValue::sequence();
        node.push(node.clone());
        assert_eq!(node.to_json(), Err(CycleError));
    }

    #[test]
    fn test_to_json_duplicates_shared_subgraphs() {
        let leaf = SharedValue::from_json(&json!({"v": 1}));
        let root = SharedValue::sequence();
        root.push(leaf.clone());
        root.push(leaf);
        assert_eq!(root.to_json().unwrap(), json!([{"v": 1}, {"v": 1}]));
    }

    fn weak_record(value: &SharedValue) -> Weak<RefCell<IndexMap<String, SharedValue>>> {
        match value {
            SharedValue::Record(record) => Rc::downgrade(record),
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn test_cycles_outlive_their_handles() {
        let node = SharedValue::record();
        node.set("me", node.clone());
        let weak = weak_record(&node);

        drop(node);
        let leaked = weak.upgrade().map(SharedValue::Record).unwrap();
        leaked.clear();
        drop(leaked);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_clear_frees_cycles_and_their_copies() {
        let parent = SharedValue::record();
        let children = SharedValue::sequence();
        let child = SharedValue::record();
        child.set("parent", parent.clone());
        children.push(child.clone());
        parent.set("children", children);

        let copy = parent.deep_clone();
        let copied_child = copy.get("children").unwrap().at(0).unwrap();
        let weak_child = weak_record(&child);
        let weak_copied_child = weak_record(&copied_child);
        drop((child, copied_child));

        parent.clear();
        copy.clear();
        assert_eq!(parent.to_json().unwrap(), json!({}));

        drop((parent, copy));
        assert!(weak_child.upgrade().is_none());
        assert!(weak_copied_child.upgrade().is_none());
    }

    #[test]
    fn test_clear_sequence_and_scalar() {
        let items = SharedValue::from_json(&json!([1, 2]));
        items.clear();
        assert_eq!(items.to_json().unwrap(), json!([]));

        let scalar = SharedValue::Scalar(json!("x"));
        scalar.clear();
        assert_eq!(scalar.as_scalar(), Some(&json!("x")));
    }

    #[test]
    fn test_scalars_pass_through() {
        let value = SharedValue::Scalar(json!(42));
        let copy = value.deep_clone();
        assert_eq!(copy.as_scalar(), Some(&json!(42)));
        assert!(!copy.ptr_eq(&value));
    }
}
