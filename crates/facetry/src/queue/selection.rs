use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Category ids queued for the next generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionQueue {
    ids: BTreeSet<String>,
}

impl SelectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present. Returns true if the id is
    /// queued afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Unions ids into the queue, returning how many were new.
    pub fn add_all<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.ids.len();
        self.ids.extend(ids.into_iter().map(Into::into));
        self.ids.len() - before
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Whether closing the session now would drop queued work.
    pub fn should_warn_on_exit(&self) -> bool {
        !self.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionQueue {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
