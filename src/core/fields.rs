//! Free-form field data on registrants and identities.
//!
//! Registrants carry arbitrary string-keyed field values which can mirror
//! fields of the attached identity. The engine never interprets field names;
//! event types give them meaning (for example by naming the registrant email
//! field used for auto-attach).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A string-keyed field value map.
///
/// A field is "empty" when it is missing or holds an empty string; the sync
/// logic treats both the same way, so setting a field to `""` is equivalent
/// to clearing it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields(FxHashMap<String, String>);

impl Fields {
    /// Create an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value. Missing fields read as `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Whether the named field is missing or blank.
    #[must_use]
    pub fn is_empty_field(&self, name: &str) -> bool {
        self.0.get(name).is_none_or(|v| v.is_empty())
    }

    /// Iterate over (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names present on both maps, in this map's iteration order.
    pub fn shared_names<'a>(&'a self, other: &'a Fields) -> impl Iterator<Item = &'a str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|name| other.0.contains_key(*name))
    }
}

/// Outcome of a two-way fill between two field maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Whether the left map received values.
    pub left_changed: bool,
    /// Whether the right map received values.
    pub right_changed: bool,
}

/// Copy values between two maps so shared fields agree.
///
/// For each field name present on both maps: when exactly one side is empty
/// and the other holds a value, the value is copied to the empty side. Fields
/// filled on both sides are left alone even when they disagree; fields empty
/// on both sides stay empty.
pub fn two_way_fill(left: &mut Fields, right: &mut Fields) -> FillOutcome {
    let shared: Vec<String> = left.shared_names(right).map(String::from).collect();
    let mut outcome = FillOutcome::default();

    for name in shared {
        let left_empty = left.is_empty_field(&name);
        let right_empty = right.is_empty_field(&name);
        if left_empty && !right_empty {
            let value = right.get(&name).unwrap_or_default().to_string();
            left.set(&name, value);
            outcome.left_changed = true;
        } else if right_empty && !left_empty {
            let value = left.get(&name).unwrap_or_default().to_string();
            right.set(&name, value);
            outcome.right_changed = true;
        }
    }

    outcome
}
