//! Named driver factories
//!
//! The engine never names a concrete provider. It asks the registry to build
//! a driver from its name and that driver's config section.

use crate::config::DriverConfig;
use crate::mt::chat_completions::{self, ChatCompletionsDriver, ChatFlavor};
use crate::mt::deepl::DeepLProvider;
use crate::mt::error::{MtError, MtResult};
use crate::mt::google_translate::GoogleTranslateProvider;
use crate::mt::mock::MockDriver;
use crate::mt::translator::TranslationDriver;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a driver from its config section
pub type DriverFactory =
    Arc<dyn Fn(&DriverConfig) -> MtResult<Arc<dyn TranslationDriver>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// A registry with no drivers at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every driver shipped with the crate
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register("google", |config| {
            Ok(Arc::new(GoogleTranslateProvider::from_config(config)?))
        });
        registry.register("deepl", |config| Ok(Arc::new(DeepLProvider::from_config(config)?)));
        for flavor in [
            chat_completions::CHATGPT,
            chat_completions::OPENAI,
            chat_completions::DEEPSEEK,
            chat_completions::OLLAMA,
        ] {
            registry.register_chat(flavor);
        }
        registry.register("mock", |config| Ok(Arc::new(MockDriver::from_config(config))));

        registry
    }

    fn register_chat(&mut self, flavor: ChatFlavor) {
        self.register(flavor.driver, move |config| {
            Ok(Arc::new(ChatCompletionsDriver::from_config(flavor, config)?))
        });
    }

    /// Add or replace the factory for `name`
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&DriverConfig) -> MtResult<Arc<dyn TranslationDriver>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered driver names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the driver registered as `name`
    pub fn resolve(&self, name: &str, config: &DriverConfig) -> MtResult<Arc<dyn TranslationDriver>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| MtError::UnsupportedDriverError(name.to_string()))?;
        factory(config)
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
