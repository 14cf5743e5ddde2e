//! Placeholder masking for machine translation
//!
//! Catalog strings carry template placeholders such as `:attribute` or
//! `:seconds-left`. Translation providers happily translate, reorder or
//! re-case those, so before a string leaves the process every placeholder is
//! replaced by a marker: 24 lowercase hex characters derived from the owning
//! key, the occurrence index and the token itself.
//!
//! Markers are unique per key and are reversed through the explicit
//! [`PlaceholderMap`], never by re-matching the translated text.
//!
//! # Example
//! ```ignore
//! let mut texts = StringSet::new();
//! texts.with_entry("wait", "Wait :seconds seconds");
//! let masked = mask(&texts);
//! // masked.texts["wait"] == "Wait 5d1c...e9 seconds"
//! let (restored, warnings) = unmask(&masked.texts, &masked.placeholders);
//! assert_eq!(restored, texts);
//! assert!(warnings.is_empty());
//! ```

use crate::StringSet;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

/// Length of every marker, in hex characters
pub const MARKER_LEN: usize = 24;

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[A-Za-z0-9_\-]+").expect("placeholder pattern is valid"));

static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("[0-9a-f]{{{}}}", MARKER_LEN)).expect("marker pattern is valid")
});

/// One masked placeholder occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedPlaceholder {
    /// The marker that replaced the token in the outgoing text
    pub marker: String,
    /// The original token, e.g. `:attribute`
    pub token: String,
}

/// Masked placeholders recorded per owning key
///
/// Also remembers marker-shaped text that was already present in a source
/// string (hashes, build ids), so it is not reported as residue afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    masked: BTreeMap<String, Vec<MaskedPlaceholder>>,
    literals: BTreeMap<String, BTreeSet<String>>,
}

impl PlaceholderMap {
    pub fn get(&self, key: &str) -> &[MaskedPlaceholder] {
        self.masked.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of masked occurrences across all keys
    pub fn len(&self) -> usize {
        self.masked.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.masked.is_empty()
    }

    /// Whether `candidate` appeared verbatim in the source text of `key`
    pub fn is_source_literal(&self, key: &str, candidate: &str) -> bool {
        self.literals
            .get(key)
            .is_some_and(|found| found.contains(candidate))
    }

    fn record(&mut self, key: &str, placeholder: MaskedPlaceholder) {
        self.masked
            .entry(key.to_string())
            .or_default()
            .push(placeholder);
    }

    fn record_literals(&mut self, key: &str, text: &str) {
        let found: BTreeSet<String> = MARKER_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        if !found.is_empty() {
            self.literals.insert(key.to_string(), found);
        }
    }
}

/// Output of [`mask`]: the texts to send and the map needed to restore them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedStrings {
    pub texts: StringSet,
    pub placeholders: PlaceholderMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A marker-shaped substring survived unmasking
    ResidualMarker,
    /// A marker sent to the provider did not come back
    MissingMarker { token: String },
}

/// Non-fatal diagnostic attached to a translation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub key: String,
    pub kind: WarningKind,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::ResidualMarker => {
                write!(f, "Possible placeholder issue on '{}' string", self.key)
            }
            WarningKind::MissingMarker { token } => write!(
                f,
                "Placeholder '{}' is missing from the '{}' translation",
                token, self.key
            ),
        }
    }
}

/// Derive the marker for the `index`-th placeholder of `key`
pub fn marker_for(key: &str, index: usize, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update([0x1f]);
    hasher.update(index.to_le_bytes());
    hasher.update([0x1f]);
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();

    digest
        .iter()
        .take(MARKER_LEN / 2)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Whether `text` contains anything shaped like a marker
pub fn contains_marker(text: &str) -> bool {
    MARKER_PATTERN.is_match(text)
}

/// Replace every placeholder token with a marker
pub fn mask(texts: &StringSet) -> MaskedStrings {
    let mut masked = MaskedStrings::default();

    for (key, text) in texts {
        masked.placeholders.record_literals(key, text);

        let mut index = 0;
        let replaced = PLACEHOLDER_PATTERN.replace_all(text, |caps: &Captures<'_>| {
            let token = caps[0].to_string();
            let marker = marker_for(key, index, &token);
            index += 1;
            masked.placeholders.record(
                key,
                MaskedPlaceholder {
                    marker: marker.clone(),
                    token,
                },
            );
            marker
        });
        masked.texts.insert(key.clone(), replaced.into_owned());
    }

    masked
}

/// Restore placeholder tokens in translated texts
///
/// Never fails: a marker the provider mangled or dropped is reported as a
/// [`Warning`] for its key and the rest of the run is kept. Marker-shaped text
/// that was already in the source string is left alone.
pub fn unmask(translated: &StringSet, placeholders: &PlaceholderMap) -> (StringSet, Vec<Warning>) {
    let mut restored = StringSet::new();
    let mut warnings = Vec::new();

    for (key, text) in translated {
        let mut text = text.clone();

        for placeholder in placeholders.get(key) {
            if text.contains(&placeholder.marker) {
                text = text.replace(&placeholder.marker, &placeholder.token);
            } else {
                warnings.push(Warning {
                    key: key.clone(),
                    kind: WarningKind::MissingMarker {
                        token: placeholder.token.clone(),
                    },
                });
            }
        }

        let residual = MARKER_PATTERN
            .find_iter(&text)
            .any(|m| !placeholders.is_source_literal(key, m.as_str()));
        if residual {
            warnings.push(Warning {
                key: key.clone(),
                kind: WarningKind::ResidualMarker,
            });
        }

        restored.insert(key.clone(), text);
    }

    (restored, warnings)
}
