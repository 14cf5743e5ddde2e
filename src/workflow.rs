//! Scan then translate
//!
//! `scan_language_files` snapshots the source language into
//! `texts_to_translate.json`; `translate` works from that snapshot, skips keys
//! the target already has (unless overwriting), runs the engine and writes the
//! merged target catalog.
//!
//! With [`TranslationWorkflow::with_in_memory_texts`] the snapshot file is
//! bypassed and the merged catalog is returned instead of written.

use crate::StringSet;
use crate::catalog::CatalogStore;
use crate::mt::engine::TranslationEngine;
use crate::mt::error::MtResult;
use crate::mt::masking::Warning;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowReport {
    /// Number of strings the driver translated
    pub translated: usize,
    pub warnings: Vec<Warning>,
    /// The merged catalog, only in in-memory mode
    pub output: Option<StringSet>,
}

#[derive(Debug)]
pub struct TranslationWorkflow {
    engine: TranslationEngine,
    store: CatalogStore,
    in_memory: Option<StringSet>,
}

impl TranslationWorkflow {
    pub fn new(engine: TranslationEngine, store: CatalogStore) -> Self {
        Self {
            engine,
            store,
            in_memory: None,
        }
    }

    /// Translate `texts` instead of the scanned snapshot and keep the result in memory
    pub fn with_in_memory_texts(mut self, texts: StringSet) -> Self {
        self.in_memory = Some(texts);
        self
    }

    pub fn engine(&self) -> &TranslationEngine {
        &self.engine
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Snapshot every string of `lang`; returns how many were found
    pub fn scan_language_files(&self, lang: &str) -> MtResult<usize> {
        let texts = self.store.load_language(lang)?;
        self.store.store_pending(&texts)?;
        info!(lang, strings = texts.len(), path = %self.store.pending_path().display(), "Scanned language files");
        Ok(texts.len())
    }

    pub async fn translate(
        &self,
        source_lang: &str,
        target_lang: &str,
        driver: &str,
        overwrite: bool,
    ) -> MtResult<WorkflowReport> {
        let texts = match &self.in_memory {
            Some(texts) => texts.clone(),
            None => self.store.load_pending()?,
        };
        let existing = self.store.load_target(target_lang)?;

        let texts = if overwrite {
            texts
        } else {
            texts.without_keys_of(&existing)
        };

        if texts.is_empty() {
            info!(target = target_lang, "Everything is already translated");
            return Ok(WorkflowReport {
                output: self.in_memory.as_ref().map(|_| existing),
                ..WorkflowReport::default()
            });
        }

        let outcome = self
            .engine
            .translate_and_merge(&texts, source_lang, target_lang, driver, &existing, overwrite)
            .await?;

        let output = if self.in_memory.is_some() {
            Some(outcome.merged)
        } else {
            self.store.save_target(target_lang, &outcome.merged)?;
            info!(
                target = target_lang,
                path = %self.store.target_path(target_lang).display(),
                "Saved translations"
            );
            None
        };

        Ok(WorkflowReport {
            translated: outcome.translated.len(),
            warnings: outcome.warnings,
            output,
        })
    }
}
