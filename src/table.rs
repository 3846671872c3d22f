use crate::shape::{Segment, Shape};
use indexmap::IndexMap;
use log::trace;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Root names that a template actually reads.
pub type ReferencedSet = HashSet<String>;

/// Safe merge policy: a composite discovered later replaces a bare scalar
/// guess, nothing else replaces anything.
pub fn should_replace(existing: &Shape, incoming: &Shape) -> bool {
    existing.is_scalar() && incoming.is_composite()
}

/// Inferred shape per root variable, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableTable {
    entries: IndexMap<String, Shape>,
}

impl fmt::Display for VariableTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.entries.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Shape> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Shape)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, Shape> {
        self.entries
    }

    pub(crate) fn insert(&mut self, name: &str, shape: Shape) {
        self.entries.insert(name.to_string(), shape);
    }

    /// Record `shape` for `name`. An unseen name is always recorded; with
    /// `allow_override` an existing entry is replaced only when
    /// [`should_replace`] agrees.
    pub fn record(&mut self, name: &str, shape: Shape, allow_override: bool) {
        match self.entries.get_mut(name) {
            None => {
                trace!("{}: recorded {}", name, shape);
                self.entries.insert(name.to_string(), shape);
            }
            Some(existing) if allow_override && should_replace(existing, &shape) => {
                trace!("{}: {} replaced by {}", name, existing, shape);
                *existing = shape;
            }
            Some(existing) => {
                trace!("{}: kept {} over {}", name, existing, shape);
            }
        }
    }

    /// Write `leaf` at a full dotted path whose first segment is the root
    /// variable. See [`Shape::set_path`].
    pub fn set_path(&mut self, path: &[Segment], leaf: Shape) {
        let Some((Segment::Key(root), rest)) = path.split_first() else {
            return;
        };
        let slot = self
            .entries
            .entry(root.clone())
            .or_insert_with(|| Shape::slot_for(rest));
        slot.set_path(rest, leaf);
    }

    pub(crate) fn retain_referenced(&mut self, referenced: &ReferencedSet) {
        self.entries.retain(|name, _| referenced.contains(name));
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.to_json_map())
    }

    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a VariableTable {
    type Item = (&'a String, &'a Shape);
    type IntoIter = indexmap::map::Iter<'a, String, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Scratch state threaded through the passes of a single inference call.
#[derive(Debug, Default)]
pub struct Accumulator {
    pub table: VariableTable,
    pub referenced: ReferencedSet,
}

impl Accumulator {
    pub fn reference(&mut self, root: &str) {
        if !self.referenced.contains(root) {
            self.referenced.insert(root.to_string());
        }
    }

    /// Drop everything that was recorded but never read.
    pub fn finish(mut self) -> VariableTable {
        self.table.retain_referenced(&self.referenced);
        self.table
    }
}
