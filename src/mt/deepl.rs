//! DeepL API provider
//!
//! Like the Google provider, every batch value travels as its own repeated
//! `text` form field and comes back as one entry of `translations`, in order.
//!
//! Free-tier keys use `https://api-free.deepl.com/v2/translate` (the default);
//! Pro keys need `drivers.deepl.api_url = "https://api.deepl.com/v2/translate"`.

use crate::StringSet;
use crate::config::DriverConfig;
use crate::mt::batching::SizeUnit;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{
    TranslationDriver, collect_texts, normalize_locale, rekey, upstream_message, validate_locale,
};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Clone)]
pub struct DeepLProvider {
    api_key: String,
    client: reqwest::Client,
    api_url: String,
    max_chars: usize,
    size_unit: SizeUnit,
}

impl DeepLProvider {
    const NAME: &'static str = "DeepL";

    pub const API_KEY_ENV: &'static str = "DEEPL_API_KEY";

    const DEFAULT_API_URL: &'static str = "https://api-free.deepl.com/v2/translate";

    /// DeepL caps request bodies at 128 KiB; stay well below it
    const DEFAULT_MAX_CHARS: usize = 60_000;

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn from_config(config: &DriverConfig) -> MtResult<Self> {
        let api_key = config.require_api_key("deepl", Self::API_KEY_ENV)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout_or(Self::DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| MtError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            api_url: config.api_url_or(Self::DEFAULT_API_URL),
            max_chars: config.max_tokens.unwrap_or(Self::DEFAULT_MAX_CHARS),
            size_unit: config.size_unit.unwrap_or(SizeUnit::Chars),
        })
    }

    /// DeepL wants `EN` as a source but accepts regional targets like `PT-BR`
    fn target_code(locale: &str) -> String {
        locale.replace('_', "-").to_uppercase()
    }
}

impl std::fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("api_key", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[async_trait]
impl TranslationDriver for DeepLProvider {
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

        let mut params: Vec<(&str, String)> =
            batch.values().map(|text| ("text", text.clone())).collect();
        params.push(("source_lang", normalize_locale(source_locale).to_uppercase()));
        params.push(("target_lang", Self::target_code(target_locale)));

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
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

        let translated = collect_texts(Self::NAME, &json, "/translations", "text")?;
        rekey(Self::NAME, batch, translated)
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
        self.max_chars
    }

    fn provider_name(&self) -> &str {
        Self::NAME
    }
}
