//! Sass maps: insertion-ordered, value-equality keys.

use std::sync::Arc;

use crate::Value;

/// A Sass map.
///
/// Entries keep insertion order. Key lookup uses value equality, so
/// `1in` and `96px` are the same key. Maps are small in practice; lookup
/// scans the entry list.
#[derive(Clone, Debug, Default)]
pub struct SassMap {
    entries: Arc<Vec<(Value, Value)>>,
}

impl SassMap {
    pub fn new(entries: Vec<(Value, Value)>) -> Self {
        SassMap {
            entries: Arc::new(entries),
        }
    }

    pub fn empty() -> Self {
        SassMap::default()
    }

    #[inline]
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key by value equality.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// A copy with `key` set to `value`: replaces in place when the key
    /// exists, appends otherwise.
    #[must_use]
    pub fn inserted(&self, key: Value, value: Value) -> SassMap {
        let mut entries = (*self.entries).clone();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
        SassMap::new(entries)
    }

    /// A copy without `key`; no-op when absent.
    #[must_use]
    pub fn removed(&self, key: &Value) -> SassMap {
        let entries = self
            .entries
            .iter()
            .filter(|(k, _)| k != key)
            .cloned()
            .collect();
        SassMap::new(entries)
    }

    /// Order-insensitive equality on entry sets.
    pub fn equals(&self, other: &SassMap) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k) == Some(v))
    }

    /// The map viewed as a list of `(key value)` pairs, the shape
    /// iteration and list functions see.
    pub fn as_pair_values(&self) -> Vec<Value> {
        use sass_ir::ListSeparator;

        use super::list::SassList;

        self.entries
            .iter()
            .map(|(k, v)| {
                Value::List(SassList::new(
                    vec![k.clone(), v.clone()],
                    ListSeparator::Space,
                    false,
                ))
            })
            .collect()
    }
}
