//! Translation engine
//!
//! Drives one translation run end to end:
//!
//! 1. mask `:placeholder` tokens
//! 2. resolve (or reuse) the driver by name
//! 3. plan batches against the driver's budget, setting blank values aside
//! 4. dispatch batches with bounded concurrency
//! 5. unmask and collect placeholder warnings
//!
//! [`TranslationEngine::translate_and_merge`] adds the merge with an existing
//! catalog. Any failed batch aborts the whole run; a partial result is never
//! returned.

use crate::StringSet;
use crate::config::DriverConfig;
use crate::mt::batching::{DEFAULT_BUFFER_FACTOR, budget_for, plan};
use crate::mt::error::{MtError, MtResult};
use crate::mt::masking::{Warning, mask, unmask};
use crate::mt::registry::DriverRegistry;
use crate::mt::translator::{TranslationDriver, validate_locale};
use futures::{StreamExt, TryStreamExt, stream};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Tuning knobs for a [`TranslationEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Batches in flight at the same time
    pub concurrency: usize,
    /// Divisor applied to the driver's output budget
    pub buffer_factor: usize,
    /// Upper bound on a single driver request
    pub request_timeout: Option<Duration>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            buffer_factor: DEFAULT_BUFFER_FACTOR,
            request_timeout: None,
        }
    }
}

/// Result of [`TranslationEngine::translate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// One entry per input key, placeholders restored
    pub translations: StringSet,
    pub warnings: Vec<Warning>,
}

/// Result of [`TranslationEngine::translate_and_merge`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationOutcome {
    /// Existing catalog combined with the new translations
    pub merged: StringSet,
    /// Only what the driver produced in this run
    pub translated: StringSet,
    pub warnings: Vec<Warning>,
}

/// Cooperative cancellation flag shared between a caller and a running translation
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // Only errors if the sender is dropped, and `self` holds it
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Combine `new` translations with an `existing` catalog
///
/// With `overwrite` the new value wins on conflicting keys, otherwise the
/// existing one does. Existing keys missing from `new` are always kept.
pub fn merge(existing: &StringSet, new: &StringSet, overwrite: bool) -> StringSet {
    let mut merged = existing.clone();
    for (key, text) in new {
        if overwrite || !merged.contains_key(key) {
            merged.insert(key.clone(), text.clone());
        }
    }
    merged
}

pub struct TranslationEngine {
    registry: DriverRegistry,
    driver_configs: HashMap<String, DriverConfig>,
    options: EngineOptions,
    drivers: Mutex<HashMap<String, Arc<dyn TranslationDriver>>>,
}

impl TranslationEngine {
    pub fn new(registry: DriverRegistry, driver_configs: HashMap<String, DriverConfig>) -> Self {
        Self {
            registry,
            driver_configs,
            options: EngineOptions::default(),
            drivers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// The driver registered as `name`, built on first use and cached after
    pub fn driver(&self, name: &str) -> MtResult<Arc<dyn TranslationDriver>> {
        let mut drivers = self.drivers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(driver) = drivers.get(name) {
            return Ok(Arc::clone(driver));
        }

        let config = self.driver_configs.get(name).cloned().unwrap_or_default();
        let driver = self.registry.resolve(name, &config)?;
        debug!(driver = name, provider = driver.provider_name(), "Driver created");
        drivers.insert(name.to_string(), Arc::clone(&driver));
        Ok(driver)
    }

    /// Translate every entry of `texts` with the driver registered as `driver_name`
    pub async fn translate(
        &self,
        texts: &StringSet,
        source_locale: &str,
        target_locale: &str,
        driver_name: &str,
    ) -> MtResult<EngineOutput> {
        self.translate_with_cancel(
            texts,
            source_locale,
            target_locale,
            driver_name,
            &CancelToken::new(),
        )
        .await
    }

    /// Same as [`translate`](Self::translate), stopping early once `cancel` fires
    ///
    /// Batches not yet sent are never sent and in-flight requests are dropped.
    pub async fn translate_with_cancel(
        &self,
        texts: &StringSet,
        source_locale: &str,
        target_locale: &str,
        driver_name: &str,
        cancel: &CancelToken,
    ) -> MtResult<EngineOutput> {
        if texts.is_empty() {
            debug!("Nothing to translate");
            return Ok(EngineOutput::default());
        }

        validate_locale(source_locale)?;
        validate_locale(target_locale)?;
        let driver = self.driver(driver_name)?;

        info!(
            driver = driver_name,
            source = source_locale,
            target = target_locale,
            strings = texts.len(),
            "Translating"
        );

        debug!("Masking placeholders");
        let masked = mask(texts);

        // Blank values have nothing to translate and are copied through as-is
        let (blank, to_send): (StringSet, StringSet) = masked
            .texts
            .iter()
            .map(|(key, text)| (key.clone(), text.clone()))
            .partition(|(_, text)| text.trim().is_empty());

        let budget = budget_for(driver.max_output(), self.options.buffer_factor);
        let unit = driver.size_unit();
        let batches = plan(
            &to_send,
            |candidate| {
                driver
                    .render_request(candidate, source_locale, target_locale)
                    .map(|request| unit.estimate(&request))
            },
            budget,
        );
        debug!(
            batches = batches.len(),
            blank = blank.len(),
            budget,
            ?unit,
            "Planned batches"
        );

        let translated = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MtError::Cancelled),
            result = self.dispatch(&driver, batches, source_locale, target_locale) => result,
        };
        let mut translated = match translated {
            Ok(translated) => translated,
            Err(err) => {
                warn!(driver = driver_name, error = %err, "Translation failed");
                return Err(err);
            }
        };

        translated.extend(blank);

        debug!("Restoring placeholders");
        let (translations, warnings) = unmask(&translated, &masked.placeholders);
        for warning in &warnings {
            warn!(key = %warning.key, "{}", warning);
        }

        info!(
            translated = translations.len(),
            warnings = warnings.len(),
            "Translation finished"
        );
        Ok(EngineOutput {
            translations,
            warnings,
        })
    }

    /// Translate `texts` and merge the result into `existing`
    pub async fn translate_and_merge(
        &self,
        texts: &StringSet,
        source_locale: &str,
        target_locale: &str,
        driver_name: &str,
        existing: &StringSet,
        overwrite: bool,
    ) -> MtResult<TranslationOutcome> {
        let output = self
            .translate(texts, source_locale, target_locale, driver_name)
            .await?;
        let merged = merge(existing, &output.translations, overwrite);
        debug!(entries = merged.len(), overwrite, "Merged translations");

        Ok(TranslationOutcome {
            merged,
            translated: output.translations,
            warnings: output.warnings,
        })
    }

    async fn dispatch(
        &self,
        driver: &Arc<dyn TranslationDriver>,
        batches: Vec<StringSet>,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<StringSet> {
        let total = batches.len();

        let results: Vec<StringSet> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| {
                let driver = Arc::clone(driver);
                async move {
                    debug!(batch = index + 1, total, keys = batch.len(), "Sending batch");
                    let result = self
                        .request(&*driver, &batch, source_locale, target_locale)
                        .await?;
                    ensure_same_keys(driver.provider_name(), &batch, &result)?;
                    Ok::<_, MtError>(result)
                }
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        Ok(results.into_iter().flatten().collect())
    }

    async fn request(
        &self,
        driver: &dyn TranslationDriver,
        batch: &StringSet,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<StringSet> {
        let call = driver.translate(batch, source_locale, target_locale);
        match self.options.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                MtError::upstream(
                    driver.provider_name(),
                    format!("request timed out after {:?}", limit),
                )
            })?,
            None => call.await,
        }
    }
}

impl std::fmt::Debug for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationEngine")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}

/// A driver result must carry exactly the keys of the batch it answers
fn ensure_same_keys(provider: &str, batch: &StringSet, result: &StringSet) -> MtResult<()> {
    if result.len() != batch.len() {
        return Err(MtError::CountMismatchError {
            provider: provider.to_string(),
            expected: batch.len(),
            actual: result.len(),
        });
    }
    if let Some(stray) = result.keys().find(|key| !batch.contains_key(key)) {
        return Err(MtError::response_format(
            provider,
            format!("unexpected key '{}' in result", stray),
        ));
    }
    Ok(())
}
