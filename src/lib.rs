//! Bulk machine translation for application string catalogs.
//!
//! Language files are flattened into a [`StringSet`] (dotted key → text), the
//! [`mt::TranslationEngine`] masks `:placeholder` tokens, splits the set into
//! provider-sized batches, sends each batch to a [`mt::TranslationDriver`] and
//! merges the results with the existing target catalog.
//!
//! # Example
//!
//! ```ignore
//! use auto_translations::StringSet;
//! use auto_translations::mt::{DriverRegistry, EngineOptions, TranslationEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut texts = StringSet::new();
//!     texts.with_entry("validation.required", "The :attribute field is required.");
//!
//!     let engine = TranslationEngine::new(DriverRegistry::builtin(), Default::default())
//!         .with_options(EngineOptions::default());
//!     let output = engine.translate(&texts, "en", "fr", "google").await?;
//!     println!("{:?}", output.translations);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

pub mod catalog;
pub mod config;
pub mod mt;
pub mod workflow;

pub use catalog::CatalogStore;
pub use config::{Config, DriverConfig};
pub use workflow::{TranslationWorkflow, WorkflowReport};

/// Flat mapping from dotted message key to message text.
///
/// Keys iterate in sorted order so batching and serialized output are
/// deterministic. Every transformation in this crate returns a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringSet(BTreeMap<String, String>);

impl StringSet {
    pub fn new() -> Self {
        StringSet(BTreeMap::new())
    }

    pub fn with_entry(&mut self, key: &str, text: &str) -> &mut Self {
        self.0.insert(key.to_owned(), text.to_owned());
        self
    }

    pub fn insert(&mut self, key: String, text: String) -> Option<String> {
        self.0.insert(key, text)
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, String> {
        self.0.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, String, String> {
        self.0.values()
    }

    /// Entries of `self` whose keys are absent from `other`
    pub fn without_keys_of(&self, other: &StringSet) -> StringSet {
        self.iter()
            .filter(|(key, _)| !other.contains_key(key))
            .map(|(key, text)| (key.clone(), text.clone()))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for StringSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        StringSet(map)
    }
}

impl FromIterator<(String, String)> for StringSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        StringSet(iter.into_iter().collect())
    }
}

impl Extend<(String, String)> for StringSet {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for StringSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
