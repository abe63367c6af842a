//! Insertion-ordered storage for object entries.
//!
//! [`ObjectMap`] wraps an [`IndexMap`] so object fields keep the order they
//! were parsed or inserted in, which the emitter preserves on output. Each
//! entry additionally carries an *accessed* flag used by the dangling-key
//! audit; the flag is an atomic so reads through a shared reference can set
//! it (a lookup is logically a read even on an immutable handle).
//!
//! [`get`](ObjectMap::get) and the yielding iterators mark entries as
//! accessed; [`contains_key`](ObjectMap::contains_key) and
//! [`keys`](ObjectMap::keys) do not.

use indexmap::map::Entry as MapEntry;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::doc::DocInfo;
use crate::value::Value;

/// An ordered map of string keys to values, with per-entry access tracking.
///
/// ```rust
/// use cfgish::{ObjectMap, Value};
///
/// let mut map = ObjectMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ObjectMap {
    inner: IndexMap<String, Entry>,
}

/// A value plus its accessed flag. The insertion ordinal of the original
/// design is the entry's index in the map.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) value: Value,
    accessed: AtomicBool,
}

impl Entry {
    pub(crate) fn new(value: Value) -> Self {
        Entry {
            value,
            accessed: AtomicBool::new(false),
        }
    }

    pub(crate) fn mark(&self, accessed: bool) {
        self.accessed.store(accessed, Ordering::Relaxed);
    }

    pub(crate) fn is_accessed(&self) -> bool {
        self.accessed.load(Ordering::Relaxed)
    }
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Entry {
            value: self.value.clone(),
            accessed: AtomicBool::new(self.is_accessed()),
        }
    }
}

impl ObjectMap {
    pub fn new() -> Self {
        ObjectMap {
            inner: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ObjectMap {
            inner: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True if `key` is present. Does not mark the entry as accessed.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Looks up `key`, marking the entry as accessed on a hit.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).map(|entry| {
            entry.mark(true);
            &entry.value
        })
    }

    /// Mutable lookup. Marks the entry as accessed on a hit.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.inner.get_mut(key).map(|entry| {
            entry.mark(true);
            &mut entry.value
        })
    }

    /// Inserts a key-value pair, returning the previous value if the key was
    /// present. An existing key keeps its position and accessed flag; a new
    /// key goes to the end. Inserting does not count as an access.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        match self.inner.entry(key) {
            MapEntry::Occupied(occupied) => {
                Some(std::mem::replace(&mut occupied.into_mut().value, value))
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value));
                None
            }
        }
    }

    /// `map[key] = value` semantics: an existing entry is marked accessed and
    /// assigned (retaining its provenance when `value` has none); a missing
    /// key becomes a fresh unaccessed entry.
    pub fn insert_or_assign(&mut self, key: &str, value: Value) {
        match self.inner.entry(key.to_string()) {
            MapEntry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                entry.mark(true);
                entry.value.assign(value);
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value));
            }
        }
    }

    /// Inserts only if the key is absent. Returns whether it was inserted.
    pub fn emplace(&mut self, key: String, value: Value) -> bool {
        match self.inner.entry(key) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value));
                true
            }
        }
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.shift_remove(key).map(|entry| entry.value)
    }

    /// Iterates keys in insertion order. Does not mark entries.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    /// Iterates values in insertion order, marking each yielded entry.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.inner.iter().map(|(_, entry)| {
            entry.mark(true);
            &entry.value
        })
    }

    /// Iterates `(key, value)` pairs in insertion order, marking each yielded
    /// entry as accessed.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.inner.iter(),
        }
    }

    /// Like [`iter`](Self::iter) with mutable values; also marks.
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            inner: self.inner.iter_mut(),
        }
    }

    /// Iteration without touching accessed flags. The emitter and the serde
    /// impls use this so serializing is not mistaken for reading.
    pub(crate) fn iter_raw(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(key, entry)| (key.as_str(), &entry.value))
    }

    pub(crate) fn entries(&self) -> indexmap::map::Iter<'_, String, Entry> {
        self.inner.iter()
    }

    pub(crate) fn get_unmarked(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).map(|entry| &entry.value)
    }

    /// The mutable-lookup primitive: an existing entry is marked accessed; a
    /// missing key gets a write-only placeholder recording the parent's
    /// location, turned into a real value by the first assignment.
    pub(crate) fn entry_or_bad_lookup(
        &mut self,
        key: &str,
        doc: Option<Arc<DocInfo>>,
        line: Option<u32>,
    ) -> &mut Value {
        match self.inner.entry(key.to_string()) {
            MapEntry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                entry.mark(true);
                &mut entry.value
            }
            MapEntry::Vacant(vacant) => {
                let placeholder = Value::bad_lookup(doc, line, key.to_string());
                &mut vacant.insert(Entry::new(placeholder)).value
            }
        }
    }
}

/// Structural equality over keys and values; entry order and accessed flags
/// are ignored.
impl PartialEq for ObjectMap {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter_raw().all(|(key, value)| {
            other
                .get_unmarked(key)
                .map_or(false, |other_value| value == other_value)
        })
    }
}

/// Marking iterator over `(key, value)` pairs.
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, entry)| {
            entry.mark(true);
            (key.as_str(), &entry.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Marking iterator over `(key, mutable value)` pairs.
pub struct IterMut<'a> {
    inner: indexmap::map::IterMut<'a, String, Entry>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a str, &'a mut Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, entry)| {
            entry.mark(true);
            (key.as_str(), &mut entry.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a ObjectMap {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over `(key, value)` pairs.
pub struct IntoIter {
    inner: indexmap::map::IntoIter<String, Entry>,
}

impl Iterator for IntoIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, entry)| (key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl IntoIterator for ObjectMap {
    type Item = (String, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.inner.into_iter(),
        }
    }
}

impl FromIterator<(String, Value)> for ObjectMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = ObjectMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut map = ObjectMap::new();
        map.insert("zebra".to_string(), Value::from(1));
        map.insert("apple".to_string(), Value::from(2));
        map.insert("mango".to_string(), Value::from(3));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_insert_keeps_slot() {
        let mut map = ObjectMap::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("b".to_string(), Value::from(2));
        let old = map.insert("a".to_string(), Value::from(3));
        assert_eq!(old, Some(Value::from(1)));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_get_marks_accessed() {
        let mut map = ObjectMap::new();
        map.insert("a".to_string(), Value::from(1));
        assert!(!map.entries().next().map(|(_, e)| e.is_accessed()).unwrap_or(true));
        map.get("a");
        assert!(map.entries().next().map(|(_, e)| e.is_accessed()).unwrap_or(false));
    }

    #[test]
    fn test_contains_does_not_mark() {
        let mut map = ObjectMap::new();
        map.insert("a".to_string(), Value::from(1));
        assert!(map.contains_key("a"));
        assert!(!map.entries().next().map(|(_, e)| e.is_accessed()).unwrap_or(true));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map = ObjectMap::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("b".to_string(), Value::from(2));
        map.insert("c".to_string(), Value::from(3));
        assert!(map.remove("b").is_some());
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_eq_ignores_order() {
        let mut a = ObjectMap::new();
        a.insert("x".to_string(), Value::from(1));
        a.insert("y".to_string(), Value::from(2));
        let mut b = ObjectMap::new();
        b.insert("y".to_string(), Value::from(2));
        b.insert("x".to_string(), Value::from(1));
        assert_eq!(a, b);
    }
}
