//! Chat-completion providers (ChatGPT, OpenAI, DeepSeek, Ollama)
//!
//! All four speak the OpenAI `/chat/completions` dialect and differ only in
//! endpoint, authentication, defaults and how the batch is wrapped:
//!
//! - [`Envelope::Lines`]: values go out one per line and must come back one
//!   per line, in order (`chatgpt`). Line breaks inside a value travel as
//!   [`LINE_BREAK`].
//! - [`Envelope::JsonObject`]: the batch goes out as a JSON object and the
//!   model must answer with a JSON object holding the same keys (`openai`,
//!   `deepseek`, `ollama`).
//!
//! `api_url` is a base URL; `/chat/completions` is appended to it.

use crate::StringSet;
use crate::config::DriverConfig;
use crate::mt::batching::SizeUnit;
use crate::mt::error::{MtError, MtResult};
use crate::mt::masking::MARKER_LEN;
use crate::mt::translator::{
    TranslationDriver, rekey, split_lines, upstream_message, validate_locale,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Stands in for a line break inside a single value of a lines batch
pub const LINE_BREAK: &str = "<nl/>";

/// How a batch is wrapped into the chat messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Lines,
    JsonObject,
}

/// Static description of one chat-completion provider
#[derive(Debug, Clone, Copy)]
pub struct ChatFlavor {
    /// Display name used in errors and logs
    pub name: &'static str,
    /// Registry and config section name
    pub driver: &'static str,
    pub base_url: &'static str,
    /// Environment variable holding the key; `None` means no auth is required
    pub api_key_env: Option<&'static str>,
    pub envelope: Envelope,
    pub model: &'static str,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout: Duration,
}

pub const CHATGPT: ChatFlavor = ChatFlavor {
    name: "ChatGPT",
    driver: "chatgpt",
    base_url: "https://api.openai.com/v1",
    api_key_env: Some("OPENAI_API_KEY"),
    envelope: Envelope::Lines,
    model: "gpt-3.5-turbo",
    temperature: 0.7,
    max_tokens: 1000,
    timeout: Duration::from_secs(30),
};

pub const OPENAI: ChatFlavor = ChatFlavor {
    name: "OpenAI",
    driver: "openai",
    base_url: "https://api.openai.com/v1",
    api_key_env: Some("OPENAI_API_KEY"),
    envelope: Envelope::JsonObject,
    model: "gpt-4o-mini",
    temperature: 0.0,
    max_tokens: 4096,
    timeout: Duration::from_secs(60),
};

pub const DEEPSEEK: ChatFlavor = ChatFlavor {
    name: "DeepSeek",
    driver: "deepseek",
    base_url: "https://api.deepseek.com",
    api_key_env: Some("DEEPSEEK_API_KEY"),
    envelope: Envelope::JsonObject,
    model: "deepseek-chat",
    temperature: 0.0,
    max_tokens: 4096,
    timeout: Duration::from_secs(60),
};

/// Local models often have larger contexts but are slow to answer
pub const OLLAMA: ChatFlavor = ChatFlavor {
    name: "Ollama",
    driver: "ollama",
    base_url: "http://localhost:11434/v1",
    api_key_env: None,
    envelope: Envelope::JsonObject,
    model: "llama3",
    temperature: 0.0,
    max_tokens: 2048,
    timeout: Duration::from_secs(60),
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Clone)]
pub struct ChatCompletionsDriver {
    flavor: ChatFlavor,
    api_key: Option<String>,
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    size_unit: SizeUnit,
}

impl ChatCompletionsDriver {
    pub fn from_config(flavor: ChatFlavor, config: &DriverConfig) -> MtResult<Self> {
        let api_key = match flavor.api_key_env {
            Some(env_var) => Some(config.require_api_key(flavor.driver, env_var)?),
            None => config.api_key.clone().filter(|key| !key.trim().is_empty()),
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout_or(flavor.timeout))
            .build()
            .map_err(|e| MtError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            flavor,
            api_key,
            client,
            endpoint: format!("{}/chat/completions", config.api_url_or(flavor.base_url)),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| flavor.model.to_string()),
            temperature: config.temperature.unwrap_or(flavor.temperature),
            max_tokens: config.max_tokens.unwrap_or(flavor.max_tokens),
            size_unit: config.size_unit.unwrap_or(SizeUnit::Tokens),
        })
    }

    pub fn envelope(&self) -> Envelope {
        self.flavor.envelope
    }

    fn system_prompt(&self, source_locale: &str, target_locale: &str) -> String {
        match self.flavor.envelope {
            Envelope::Lines => format!(
                "You are a professional translator specializing in software localization.
Translate every line of the user's message from {source} to {target}.

IMPORTANT INSTRUCTIONS:
- Reply with exactly one translated line per input line, in the same order.
- Do NOT add numbering, quotes, explanations or blank lines.
- Keep every {br} tag; it marks a line break inside one line.
- Leave {len}-character hexadecimal codes exactly as they are.",
                source = source_locale,
                target = target_locale,
                br = LINE_BREAK,
                len = MARKER_LEN,
            ),
            Envelope::JsonObject => format!(
                "You are a professional translator specializing in software localization.
Your task is to translate text from {source} to {target}.

IMPORTANT INSTRUCTIONS:
- The input will always be a JSON object.
- Do NOT alter or translate any of the keys in the JSON object.
- Only translate the values associated with the keys.
- Leave {len}-character hexadecimal codes exactly as they are.
- Return ONLY a valid JSON object.",
                source = source_locale,
                target = target_locale,
                len = MARKER_LEN,
            ),
        }
    }

    fn messages(
        &self,
        batch: &StringSet,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<Message>> {
        let user_content = match self.flavor.envelope {
            Envelope::Lines => encode_lines(batch),
            Envelope::JsonObject => serde_json::to_string(batch).map_err(|e| {
                MtError::response_format(self.flavor.name, format!("Failed to encode batch: {}", e))
            })?,
        };

        Ok(vec![
            Message {
                role: "system".to_string(),
                content: self.system_prompt(source_locale, target_locale),
            },
            Message {
                role: "user".to_string(),
                content: user_content,
            },
        ])
    }

    fn parse_content(&self, batch: &StringSet, content: &str) -> MtResult<StringSet> {
        match self.flavor.envelope {
            Envelope::Lines => rekey(self.flavor.name, batch, decode_lines(content)),
            Envelope::JsonObject => {
                let object: Map<String, Value> = serde_json::from_str(strip_code_fence(content))
                    .map_err(|_| {
                        MtError::response_format(
                            self.flavor.name,
                            format!("Invalid JSON returned by {}", self.flavor.name),
                        )
                    })?;
                values_from_object(self.flavor.name, batch, object)
            }
        }
    }
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("provider", &self.flavor.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

/// One value per line, inner line breaks replaced by [`LINE_BREAK`]
fn encode_lines(batch: &StringSet) -> String {
    batch
        .values()
        .map(|text| text.replace('\n', LINE_BREAK))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a lines reply back into values
///
/// Only trailing line breaks are dropped; a leading empty line is an empty
/// first value.
fn decode_lines(content: &str) -> Vec<String> {
    split_lines(content.trim_end_matches(['\r', '\n']))
        .into_iter()
        .map(|line| line.replace(LINE_BREAK, "\n"))
        .collect()
}

/// Strip a Markdown code fence some models wrap around JSON answers
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Map a JSON object reply back onto the batch keys
///
/// Values are taken by key when the model kept every key; otherwise they
/// are paired positionally in the order the model returned them.
fn values_from_object(
    provider: &str,
    batch: &StringSet,
    object: Map<String, Value>,
) -> MtResult<StringSet> {
    if object.len() != batch.len() {
        return Err(MtError::CountMismatchError {
            provider: provider.to_string(),
            expected: batch.len(),
            actual: object.len(),
        });
    }

    let as_text = |key: &str, value: &Value| -> MtResult<String> {
        value.as_str().map(str::to_string).ok_or_else(|| {
            MtError::response_format(provider, format!("value for '{}' is not a string", key))
        })
    };

    if batch.keys().all(|key| object.contains_key(key)) {
        return batch
            .keys()
            .map(|key| Ok((key.clone(), as_text(key, &object[key.as_str()])?)))
            .collect();
    }

    let values = object
        .iter()
        .map(|(key, value)| as_text(key, value))
        .collect::<MtResult<Vec<String>>>()?;
    rekey(provider, batch, values)
}

#[async_trait]
impl TranslationDriver for ChatCompletionsDriver {
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

        let request = ChatRequest {
            model: &self.model,
            messages: self.messages(batch, source_locale, target_locale)?,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: match self.flavor.envelope {
                Envelope::JsonObject => Some(ResponseFormat {
                    kind: "json_object",
                }),
                Envelope::Lines => None,
            },
            stream: false,
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MtError::upstream(self.flavor.name, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MtError::upstream(self.flavor.name, e.to_string()))?;

        if !status.is_success() {
            return Err(MtError::upstream(self.flavor.name, upstream_message(&body)));
        }

        let chat: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            MtError::response_format(self.flavor.name, format!("Failed to parse API response: {}", e))
        })?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| MtError::response_format(self.flavor.name, "response contained no choices"))?;

        self.parse_content(batch, content)
    }

    fn render_request(
        &self,
        batch: &StringSet,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let messages = self.messages(batch, source_locale, target_locale)?;
        serde_json::to_string(&messages).map_err(|e| {
            MtError::response_format(self.flavor.name, format!("Failed to encode request: {}", e))
        })
    }

    fn size_unit(&self) -> SizeUnit {
        self.size_unit
    }

    fn max_output(&self) -> usize {
        self.max_tokens
    }

    fn provider_name(&self) -> &str {
        self.flavor.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, body_string_contains, header, method, path},
    };

    fn driver_for(flavor: ChatFlavor, server: &MockServer) -> ChatCompletionsDriver {
        ChatCompletionsDriver::from_config(
            flavor,
            &DriverConfig {
                api_key: Some("test-key".to_string()),
                api_url: Some(server.uri()),
                ..DriverConfig::default()
            },
        )
        .unwrap()
    }

    fn chat_response(content: &str) -> Value {
        json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
    }

    fn greetings() -> StringSet {
        let mut batch = StringSet::new();
        batch.with_entry("hello", "Hello").with_entry("bye", "Goodbye");
        batch
    }

    fn expected_greetings() -> StringSet {
        let mut expected = StringSet::new();
        expected.with_entry("hello", "Hola").with_entry("bye", "Adiós");
        expected
    }

    // ========== Configuration ==========

    #[test]
    fn test_defaults_per_flavor() {
        let driver = ChatCompletionsDriver::from_config(OLLAMA, &DriverConfig::default()).unwrap();
        assert_eq!(driver.endpoint, "http://localhost:11434/v1/chat/completions");
        assert_eq!(driver.model, "llama3");
        assert_eq!(driver.max_output(), 2048);
        assert_eq!(driver.size_unit(), SizeUnit::Tokens);
        assert!(driver.api_key.is_none());
    }

    #[test]
    fn test_config_overrides_defaults() {
        let driver = ChatCompletionsDriver::from_config(
            OPENAI,
            &DriverConfig {
                api_key: Some("k".to_string()),
                model: Some("gpt-4o".to_string()),
                max_tokens: Some(16000),
                temperature: Some(0.3),
                ..DriverConfig::default()
            },
        )
        .unwrap();
        assert_eq!(driver.model, "gpt-4o");
        assert_eq!(driver.max_output(), 16000);
        assert_eq!(driver.temperature, 0.3);
    }

    #[test]
    fn test_debug_hides_key() {
        let driver = ChatCompletionsDriver::from_config(
            DEEPSEEK,
            &DriverConfig {
                api_key: Some("sk-secret".to_string()),
                ..DriverConfig::default()
            },
        )
        .unwrap();
        let debug_str = format!("{:?}", driver);
        assert!(!debug_str.contains("sk-secret"));
        assert!(debug_str.contains("***"));
    }

    #[test]
    fn test_render_request_includes_prompt_overhead() {
        let driver = ChatCompletionsDriver::from_config(OLLAMA, &DriverConfig::default()).unwrap();
        let rendered = driver.render_request(&greetings(), "en", "es").unwrap();
        assert!(rendered.contains("Return ONLY a valid JSON object"));
        assert!(rendered.contains(r#"\"hello\":\"Hello\""#));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":\"b\"}\n```"), "{\"a\":\"b\"}");
        assert_eq!(strip_code_fence("  {\"a\":\"b\"} "), "{\"a\":\"b\"}");
    }

    #[test]
    fn test_values_by_key_ignore_response_order() {
        let object: Map<String, Value> =
            serde_json::from_str(r#"{"hello": "Hola", "bye": "Adiós"}"#).unwrap();
        let result = values_from_object("Test", &greetings(), object).unwrap();
        assert_eq!(result, expected_greetings());
    }

    #[test]
    fn test_values_fall_back_to_position() {
        // Keys were translated too; pair by position (bye, hello)
        let object: Map<String, Value> =
            serde_json::from_str(r#"{"adios": "Adiós", "hola": "Hola"}"#).unwrap();
        let result = values_from_object("Test", &greetings(), object).unwrap();
        assert_eq!(result, expected_greetings());
    }

    #[test]
    fn test_non_string_value_is_format_error() {
        let object: Map<String, Value> =
            serde_json::from_str(r#"{"hello": 1, "bye": "Adiós"}"#).unwrap();
        let err = values_from_object("Test", &greetings(), object).unwrap_err();
        assert!(matches!(err, MtError::ResponseFormatError { .. }));
    }

    // ========== ChatGPT (lines) ==========

    #[tokio::test]
    async fn test_chatgpt_translates_lines() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "gpt-3.5-turbo", "max_tokens": 1000 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Adiós\nHola\n")))
            .expect(1)
            .mount(&server)
            .await;

        let result = driver_for(CHATGPT, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap();
        assert_eq!(result, expected_greetings());
    }

    #[tokio::test]
    async fn test_chatgpt_keeps_line_breaks_inside_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Line one<nl/>Line two"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response("Adiós\nLigne un<nl/>Ligne deux\n")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut batch = StringSet::new();
        batch
            .with_entry("bye", "Goodbye")
            .with_entry("intro", "Line one\nLine two");
        let result = driver_for(CHATGPT, &server)
            .translate(&batch, "en", "fr")
            .await
            .unwrap();

        assert_eq!(result.get("bye").unwrap(), "Adiós");
        assert_eq!(result.get("intro").unwrap(), "Ligne un\nLigne deux");
    }

    #[tokio::test]
    async fn test_chatgpt_keeps_empty_first_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("\nHola\n")))
            .expect(1)
            .mount(&server)
            .await;

        let mut batch = StringSet::new();
        batch.with_entry("a.blank", "").with_entry("b.hello", "Hello");
        let result = driver_for(CHATGPT, &server)
            .translate(&batch, "en", "es")
            .await
            .unwrap();

        assert_eq!(result.get("a.blank").unwrap(), "");
        assert_eq!(result.get("b.hello").unwrap(), "Hola");
    }

    #[test]
    fn test_decode_lines() {
        assert_eq!(decode_lines("a\r\nb<nl/>c\r\n"), vec!["a", "b\nc"]);
        assert_eq!(decode_lines("\nb"), vec!["", "b"]);
    }

    #[tokio::test]
    async fn test_chatgpt_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid API key" }
            })))
            .mount(&server)
            .await;

        let err = driver_for(CHATGPT, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ChatGPT API error: Invalid API key");
    }

    #[tokio::test]
    async fn test_chatgpt_line_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Adiós, Hola")))
            .mount(&server)
            .await;

        let err = driver_for(CHATGPT, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap_err();
        assert!(matches!(err, MtError::CountMismatchError { .. }));
    }

    // ========== JSON object flavors ==========

    #[tokio::test]
    async fn test_openai_translates_json_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_object" },
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
                &json!({ "hello": "Hola", "bye": "Adiós" }).to_string(),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let result = driver_for(OPENAI, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap();
        assert_eq!(result, expected_greetings());
    }

    #[tokio::test]
    async fn test_json_object_keeps_line_breaks_inside_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(r#"Line one\\nLine two"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
                &json!({ "bye": "Adiós", "intro": "Ligne un\nLigne deux" }).to_string(),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let mut batch = StringSet::new();
        batch
            .with_entry("bye", "Goodbye")
            .with_entry("intro", "Line one\nLine two");
        let result = driver_for(OPENAI, &server)
            .translate(&batch, "en", "fr")
            .await
            .unwrap();

        assert_eq!(result.get("intro").unwrap(), "Ligne un\nLigne deux");
    }

    #[tokio::test]
    async fn test_deepseek_uses_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "deepseek-chat" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
                "```json\n{\"hello\": \"Hola\", \"bye\": \"Adiós\"}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let result = driver_for(DEEPSEEK, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap();
        assert_eq!(result, expected_greetings());
    }

    #[tokio::test]
    async fn test_ollama_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "message": "Model not found" }
            })))
            .mount(&server)
            .await;

        let err = driver_for(OLLAMA, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Ollama API error: Model not found");
    }

    #[tokio::test]
    async fn test_ollama_invalid_json_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Not a JSON string")))
            .mount(&server)
            .await;

        let err = driver_for(OLLAMA, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MtError::response_format("Ollama", "Invalid JSON returned by Ollama")
        );
    }

    #[tokio::test]
    async fn test_ollama_count_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
                &json!({ "only_one_key": "Value" }).to_string(),
            )))
            .mount(&server)
            .await;

        let err = driver_for(OLLAMA, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MtError::CountMismatchError {
                provider: "Ollama".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = driver_for(OPENAI, &server)
            .translate(&greetings(), "en", "es")
            .await
            .unwrap_err();
        assert!(matches!(err, MtError::ResponseFormatError { .. }));
    }
}
