//! Mock translation driver for testing
//!
//! This module provides a deterministic, API-free driver for testing the
//! engine and workflow without requiring API keys or network access. It is
//! also registered as the `mock` driver for offline dry runs.
//!
//! # Example
//!
//! ```ignore
//! use auto_translations::StringSet;
//! use auto_translations::mt::{MockDriver, MockMode, TranslationDriver};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockDriver::new(MockMode::Suffix);
//!     let mut batch = StringSet::new();
//!     batch.with_entry("greeting", "hello");
//!     let result = mock.translate(&batch, "en", "fr").await.unwrap();
//!     assert_eq!(result.get("greeting").unwrap(), "hello_fr");
//! }
//! ```

use crate::StringSet;
use crate::config::DriverConfig;
use crate::mt::batching::SizeUnit;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::TranslationDriver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    /// Masked markers survive untouched
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation; unknown texts fall back to Suffix
    Mappings(HashMap<(String, String), String>),

    /// Return one value fewer than requested
    DropLast,

    /// Simulate API errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock driver that simulates various provider behaviors
///
/// Clones share the call counter, so a test can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct MockDriver {
    mode: MockMode,
    /// Optional simulated network delay
    delay: Duration,
    max_output: usize,
    size_unit: SizeUnit,
    calls: Arc<AtomicUsize>,
}

impl MockDriver {
    const NAME: &'static str = "Mock";

    const DEFAULT_MAX_OUTPUT: usize = 10_000;

    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            max_output: Self::DEFAULT_MAX_OUTPUT,
            size_unit: SizeUnit::Chars,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build the registry's `mock` driver; `max_tokens` and `size_unit` apply
    pub fn from_config(config: &DriverConfig) -> Self {
        let mut mock = Self::new(MockMode::Suffix);
        if let Some(max_output) = config.max_tokens {
            mock.max_output = max_output;
        }
        if let Some(size_unit) = config.size_unit {
            mock.size_unit = size_unit;
        }
        mock
    }

    /// Sleep this long before answering each batch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    /// Number of `translate` calls made so far, across all clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> String {
        match &self.mode {
            MockMode::Mappings(map) => map
                .get(&(text.to_string(), target.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, target)),
            MockMode::NoOp => text.to_string(),
            _ => format!("{}_{}", text, target),
        }
    }
}

#[async_trait]
impl TranslationDriver for MockDriver {
    async fn translate(
        &self,
        batch: &StringSet,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<StringSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Delay is per batch, not per string
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.mode {
            MockMode::Error(msg) => Err(MtError::upstream(Self::NAME, msg.clone())),
            MockMode::DropLast => {
                let actual = batch.len().saturating_sub(1);
                Err(MtError::CountMismatchError {
                    provider: Self::NAME.to_string(),
                    expected: batch.len(),
                    actual,
                })
            }
            _ => Ok(batch
                .iter()
                .map(|(key, text)| (key.clone(), self.apply_translation(text, target_locale)))
                .collect()),
        }
    }

    fn render_request(
        &self,
        batch: &StringSet,
        _source_locale: &str,
        _target_locale: &str,
    ) -> MtResult<String> {
        Ok(batch.values().cloned().collect::<Vec<_>>().join("\n"))
    }

    fn size_unit(&self) -> SizeUnit {
        self.size_unit
    }

    fn max_output(&self) -> usize {
        self.max_output
    }

    fn provider_name(&self) -> &str {
        Self::NAME
    }
}
