//! Drop-in surface for callers of the richer generative-AI client library.

use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::{GOOGLE_API_KEY_ENV, GeminiConfig, GeminiModel, GenerationConfig};
use crate::response::GenerateResponse;

/// Model identifier used when callers do not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Maps legacy model names to currently supported identifiers.
///
/// Unrecognized names pass through unchanged, so newly released model
/// identifiers work without a shim update.
#[must_use]
pub fn resolve_model_alias(name: &str) -> &str {
    match name {
        "gemini-pro" => "gemini-1.5-flash",
        "gemini-2.5-pro" => "gemini-2.0-flash",
        other => other,
    }
}

/// Imperatively configured credential cell.
///
/// Stands in for the richer library's `configure` entry point. Rather than
/// writing the key back into the process environment, the cell keeps the
/// mutation local so concurrent callers and tests cannot interfere through
/// ambient global state. Clones share the same underlying slot.
#[derive(Clone, Debug, Default)]
pub struct ApiKeyStore {
    key: Arc<RwLock<Option<String>>>,
}

impl ApiKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the supplied credential; `None` leaves the store untouched.
    pub fn configure(&self, api_key: Option<&str>) {
        if let Some(key) = api_key {
            *self.key.write().expect("api key lock poisoned") = Some(key.to_owned());
        }
    }

    /// Returns the stored credential, falling back to `GOOGLE_API_KEY`.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        let stored = self.key.read().expect("api key lock poisoned").clone();
        stored.or_else(|| std::env::var(GOOGLE_API_KEY_ENV).ok())
    }
}

/// Drop-in replacement for the richer library's generative model type.
///
/// Resolves legacy model-name aliases at construction and accepts the loose
/// dictionary shape its callers pass for generation options.
#[derive(Debug)]
pub struct GenerativeModel {
    inner: GeminiModel,
}

impl GenerativeModel {
    /// Constructs a model by name, taking the credential from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when the store holds no
    /// credential and `GOOGLE_API_KEY` is unset.
    pub fn new(model_name: &str, store: &ApiKeyStore) -> Result<Self> {
        let mut config = GeminiConfig::new(resolve_model_alias(model_name));
        if let Some(key) = store.resolve() {
            config = config.with_api_key(key);
        }
        Ok(Self {
            inner: GeminiModel::new(config)?,
        })
    }

    /// Constructs a model by name using only the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when `GOOGLE_API_KEY` is
    /// unset.
    pub fn from_env(model_name: &str) -> Result<Self> {
        Self::new(model_name, &ApiKeyStore::new())
    }

    /// Returns the resolved model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        self.inner.model()
    }

    /// Generates content for the prompt.
    ///
    /// `generation_config` takes the dictionary shape the richer library
    /// accepts. Only `temperature` and `max_output_tokens` are forwarded;
    /// every other key is silently dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Request`] when the underlying call fails.
    pub async fn generate_content(
        &self,
        prompt: &str,
        generation_config: Option<&Map<String, Value>>,
    ) -> Result<GenerateResponse> {
        let config = generation_config.and_then(recognized_options);
        self.inner.generate(prompt, config.as_ref()).await
    }
}

fn recognized_options(options: &Map<String, Value>) -> Option<GenerationConfig> {
    let mut config = GenerationConfig::new();
    if let Some(temperature) = options.get("temperature").and_then(Value::as_f64) {
        config = config.with_temperature(temperature);
    }
    if let Some(tokens) = options.get("max_output_tokens").and_then(Value::as_u64) {
        config = config.with_max_output_tokens(u32::try_from(tokens).unwrap_or(u32::MAX));
    }
    if config.is_empty() { None } else { Some(config) }
}
