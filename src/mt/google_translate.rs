//! Google Translate API provider
//!
//! Talks to the Google Translate v2 REST API. Every batch value goes out as its
//! own repeated `q` form field and comes back as one entry of
//! `data.translations`, so values may contain newlines. A reply with a
//! different entry count is rejected.
//!
//! # Authentication
//!
//! The API key comes from `drivers.google.api_key` or the
//! `GOOGLE_TRANSLATE_API_KEY` environment variable. Obtain a key from:
//! https://console.cloud.google.com/

use crate::StringSet;
use crate::config::DriverConfig;
use crate::mt::batching::SizeUnit;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{
    TranslationDriver, collect_texts, normalize_locale, rekey, upstream_message, validate_locale,
};
use async_trait::async_trait;
use std::time::Duration;

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Endpoint for Google Translate API
    base_url: String,
    max_chars: usize,
    size_unit: SizeUnit,
}

impl GoogleTranslateProvider {
    const NAME: &'static str = "Google Translate";

    pub const API_KEY_ENV: &'static str = "GOOGLE_TRANSLATE_API_KEY";

    const DEFAULT_BASE_URL: &'static str =
        "https://translation.googleapis.com/language/translate/v2";

    /// Google recommends keeping a request under 30K characters
    const DEFAULT_MAX_CHARS: usize = 30_000;

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new GoogleTranslateProvider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String) -> MtResult<Self> {
        Self::from_config(&DriverConfig {
            api_key: Some(api_key),
            ..DriverConfig::default()
        })
    }

    /// Create a provider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        Self::from_config(&DriverConfig::default())
    }

    pub fn from_config(config: &DriverConfig) -> MtResult<Self> {
        let api_key = config.require_api_key("google", Self::API_KEY_ENV)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout_or(Self::DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| MtError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: config.api_url_or(Self::DEFAULT_BASE_URL),
            max_chars: config.max_tokens.unwrap_or(Self::DEFAULT_MAX_CHARS),
            size_unit: config.size_unit.unwrap_or(SizeUnit::Chars),
        })
    }

    /// One `q` field per value, followed by the request options
    fn form_params(
        &self,
        batch: &StringSet,
        source: &str,
        target: &str,
    ) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> =
            batch.values().map(|text| ("q", text.clone())).collect();
        params.extend([
            ("source", normalize_locale(source)),
            ("target", normalize_locale(target)),
            ("key", self.api_key.clone()),
            ("format", "text".to_string()),
        ]);
        params
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("max_chars", &self.max_chars)
            .finish()
    }
}

#[async_trait]
impl TranslationDriver for GoogleTranslateProvider {
    async fn translate(
        &self,
        batch: &StringSet,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<StringSet> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if batch.is_empty() {
            return Ok(StringSet::new());
        }

        let params = self.form_params(batch, source_locale, target_locale);

        let response = self
            .client
            .post(&self.base_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| MtError::upstream(Self::NAME, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MtError::upstream(Self::NAME, e.to_string()))?;

        if !status.is_success() {
            return Err(MtError::upstream(Self::NAME, upstream_message(&body)));
        }

        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            MtError::response_format(Self::NAME, format!("Failed to parse API response: {}", e))
        })?;

        let translated = collect_texts(Self::NAME, &json, "/data/translations", "translatedText")?;
        rekey(Self::NAME, batch, translated)
    }

    fn render_request(
        &self,
        batch: &StringSet,
        _source_locale: &str,
        _target_locale: &str,
    ) -> MtResult<String> {
        // Sized as the `q` payload; each value is a separate field on the wire
        Ok(batch.values().cloned().collect::<Vec<_>>().join("\n"))
    }

    fn size_unit(&self) -> SizeUnit {
        self.size_unit
    }

    fn max_output(&self) -> usize {
        self.max_chars
    }

    fn provider_name(&self) -> &str {
        Self::NAME
    }
}
