//! Machine Translation Module
//!
//! This module turns a flat set of application strings into translated
//! strings through a pluggable provider, without damaging the `:placeholder`
//! tokens the application substitutes at runtime.
//!
//! # Overview
//!
//! The MT module consists of several components working together:
//!
//! 1. **Masking** - Swaps placeholder tokens for opaque markers and back
//! 2. **Batching** - Splits a string set into requests that fit a provider budget
//! 3. **Driver Trait & Providers** - `TranslationDriver` with Google Translate,
//!    DeepL, chat-completion and mock implementations
//! 4. **Registry** - Builds drivers by name from their config section
//! 5. **Engine** - Orchestrates mask → plan → dispatch → unmask → merge
//!
//! # Example
//!
//! ```ignore
//! use auto_translations::StringSet;
//! use auto_translations::mt::{DriverRegistry, TranslationEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut texts = StringSet::new();
//!     texts.with_entry("welcome", "Welcome back, :name!");
//!
//!     let engine = TranslationEngine::new(DriverRegistry::builtin(), Default::default());
//!     let output = engine.translate(&texts, "en", "fr", "deepl").await?;
//!
//!     println!("{:?}", output.translations);
//!     Ok(())
//! }
//! ```
pub mod batching;
pub mod chat_completions;
pub mod deepl;
pub mod engine;
pub mod error;
pub mod google_translate;
pub mod masking;
pub mod mock;
pub mod registry;
pub mod translator;


pub use batching::{DEFAULT_BUFFER_FACTOR, SizeUnit, approximate_tokens, budget_for, plan};
pub use chat_completions::{ChatCompletionsDriver, ChatFlavor, Envelope};
pub use deepl::DeepLProvider;
pub use engine::{
    CancelToken, EngineOptions, EngineOutput, TranslationEngine, TranslationOutcome, merge,
};
pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use masking::{MaskedStrings, PlaceholderMap, Warning, WarningKind, mask, unmask};
pub use mock::{MockDriver, MockMode};
pub use registry::{DriverFactory, DriverRegistry};
pub use translator::{TranslationDriver, normalize_locale, validate_locale};
