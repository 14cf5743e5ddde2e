//! Translation driver trait and shared helpers
//!
//! This module defines the `TranslationDriver` trait for provider abstraction,
//! enabling support for different MT backends (Google Translate, DeepL, chat
//! completion APIs, mock) without coupling the engine to any of them.
//!
//! Batching happens above this layer: a driver receives one batch and makes
//! exactly one request for it.
//!
//! # Example
//!
//! ```ignore
//! use auto_translations::StringSet;
//! use auto_translations::mt::{GoogleTranslateProvider, TranslationDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new("api-key".to_string())?;
//!
//!     let mut batch = StringSet::new();
//!     batch.with_entry("hello", "Hello").with_entry("bye", "Goodbye");
//!
//!     let result = provider.translate(&batch, "en", "fr").await?;
//!     println!("{:?}", result); // {"bye": "Au revoir", "hello": "Bonjour"}
//!     Ok(())
//! }
//! ```

use crate::StringSet;
use crate::mt::batching::SizeUnit;
use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for translation providers
///
/// Every implementation upholds the same contract:
///
/// - one network call per [`translate`](TranslationDriver::translate) call
/// - a non-success response is an [`MtError::UpstreamError`] carrying the
///   provider's message, or the raw body when it has none
/// - an unparseable success body is an [`MtError::ResponseFormatError`]
/// - a response with a different number of texts than the batch is an
///   [`MtError::CountMismatchError`] and no partial result is returned
/// - on success the result has exactly the batch's keys
#[async_trait]
pub trait TranslationDriver: Send + Sync {
    /// Translate every value of `batch`, keeping its keys
    ///
    /// # Arguments
    ///
    /// * `batch` - Key → source text; values may contain masked placeholder markers
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "fr", "pt-BR")
    async fn translate(
        &self,
        batch: &StringSet,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<StringSet>;

    /// The request text this driver would send for `batch`
    ///
    /// Used only for sizing, so it must include whatever wrapping the real
    /// request carries (prompts, JSON envelope, separators).
    fn render_request(
        &self,
        batch: &StringSet,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Unit in which [`max_output`](TranslationDriver::max_output) is expressed
    fn size_unit(&self) -> SizeUnit;

    /// Largest output the provider is configured to produce per request
    fn max_output(&self) -> usize;

    /// Get the name of this translation provider
    ///
    /// Used in error messages and logs (e.g., "Google Translate", "DeepL").
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// Converts locale codes from BCP 47 format to ISO 639-1 format:
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `en` → `en` (unchanged)
pub fn normalize_locale(locale: &str) -> String {
    locale.split(['-', '_']).next().unwrap_or(locale).to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Accepts ASCII letters, digits, hyphens and underscores.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

/// Pair translated values with the batch keys, in batch order
///
/// This is the count check every driver funnels through: a provider that
/// returns more or fewer values than it was sent fails the whole batch.
pub fn rekey(provider: &str, batch: &StringSet, values: Vec<String>) -> MtResult<StringSet> {
    if values.len() != batch.len() {
        return Err(MtError::CountMismatchError {
            provider: provider.to_string(),
            expected: batch.len(),
            actual: values.len(),
        });
    }

    Ok(batch.keys().cloned().zip(values).collect())
}

/// Collect `field` from every object of the array at `pointer`, in order
///
/// Used for providers that answer one array element per submitted text.
pub fn collect_texts(
    provider: &str,
    json: &serde_json::Value,
    pointer: &str,
    field: &str,
) -> MtResult<Vec<String>> {
    let items = json
        .pointer(pointer)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| MtError::response_format(provider, format!("missing '{}' array", pointer)))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.get(field)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    MtError::response_format(
                        provider,
                        format!("missing '{}' in {}/{}", field, pointer, index),
                    )
                })
        })
        .collect()
}

/// Pull a human-readable message out of a provider error body
///
/// Looks for `error.message`, then `message`, then falls back to the raw body.
pub fn upstream_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    parsed
        .as_ref()
        .and_then(|json| {
            json.pointer("/error/message")
                .or_else(|| json.get("message"))
                .and_then(serde_json::Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Split a newline-joined provider reply back into one value per line
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
