//! Resource snapshots.
//!
//! A snapshot is the player's holdings already aggregated per item name
//! across every storage location. Building it from slots is the job of the
//! inventory collaborator; the ranking only reads it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item name to quantity. A missing key means zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, u32>", into = "HashMap<String, u32>")]
pub struct ResourceSnapshot {
    items: HashMap<String, u32>,
}

impl ResourceSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style quantity setter.
    #[must_use]
    pub fn with(mut self, item: impl Into<String>, quantity: u32) -> Self {
        self.set(item, quantity);
        self
    }

    /// Sets the quantity of an item. Zero removes the entry.
    pub fn set(&mut self, item: impl Into<String>, quantity: u32) {
        let item = item.into();
        if quantity == 0 {
            self.items.remove(&item);
        } else {
            self.items.insert(item, quantity);
        }
    }

    /// Adds to the quantity of an item, saturating at `u32::MAX`.
    pub fn add(&mut self, item: impl Into<String>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.items.entry(item.into()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Returns the count of a specific item.
    #[must_use]
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Checks if the snapshot holds at least the given amount.
    #[must_use]
    pub fn has(&self, item: &str, amount: u32) -> bool {
        self.count(item) >= amount
    }

    /// Sum of holdings across several item names, saturating.
    #[must_use]
    pub fn total_of<'a, I>(&self, items: I) -> u32
    where
        I: IntoIterator<Item = &'a str>,
    {
        items
            .into_iter()
            .fold(0u32, |acc, item| acc.saturating_add(self.count(item)))
    }

    /// Returns a new snapshot holding the sum of both.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (item, quantity) in other.iter() {
            merged.add(item, quantity);
        }
        merged
    }

    /// Number of distinct items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over all items.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.items.iter().map(|(item, &count)| (item.as_str(), count))
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for ResourceSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, u32)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (item, quantity) in iter {
            snapshot.add(item, quantity);
        }
        snapshot
    }
}

impl From<HashMap<String, u32>> for ResourceSnapshot {
    fn from(items: HashMap<String, u32>) -> Self {
        items.into_iter().collect()
    }
}

impl From<ResourceSnapshot> for HashMap<String, u32> {
    fn from(snapshot: ResourceSnapshot) -> Self {
        snapshot.items
    }
}
