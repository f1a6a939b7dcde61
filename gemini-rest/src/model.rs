//! Core client for the Gemini `generateContent` endpoint.

use std::sync::Arc;
use std::{env, fmt, time::Duration};

use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Request, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use serde::Serialize;
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::error::{Error, Result};
use crate::response::GenerateResponse;

/// Environment variable supplying the API credential.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Configuration for [`GeminiModel`].
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiConfig {
    /// Creates a configuration for the supplied model identifier.
    ///
    /// No credential is attached; supply one with
    /// [`GeminiConfig::with_api_key`] or use [`GeminiConfig::from_env`].
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Loads the API key from the `GOOGLE_API_KEY` environment variable.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut cfg = Self::new(model);
        cfg.api_key = env::var(GOOGLE_API_KEY_ENV).ok();
        cfg
    }

    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let sanitized = sanitize_base_url(base_url.as_ref())?;
        self.base_url = sanitized;
        Ok(self)
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Recognized generation options forwarded to the backend.
///
/// Only sampling temperature and the output-token bound exist on this type;
/// anything else a caller might know about the backend is intentionally not
/// representable here. Fields left unset are omitted from the wire body, so
/// partial configurations carry exactly the keys present.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum number of output tokens.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Returns the configured sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Returns the configured output-token bound.
    #[must_use]
    pub const fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    /// Returns `true` when no option is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none()
    }
}

/// REST client bound to one model identifier and one credential.
///
/// Immutable after construction; each [`GeminiModel::generate`] call is an
/// independent single-shot POST with no state carried between calls.
pub struct GeminiModel {
    client: HyperClient,
    base_endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("model", &self.model)
            .field("base_endpoint", &self.base_endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiModel {
    /// Constructs a new client from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is missing or empty.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::configuration(format!(
                    "an API key is required; set {GOOGLE_API_KEY_ENV} or supply one explicitly"
                ))
            })?;

        let base_endpoint = format!(
            "{}v1beta/models/{}:generateContent",
            config.base_url, config.model
        );

        Ok(Self {
            client: build_https_client(),
            base_endpoint,
            model: config.model,
            api_key,
            timeout: config.timeout,
        })
    }

    /// Returns the model identifier this client is bound to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the parsed response.
    ///
    /// The prompt becomes a single content part; `config` is attached as
    /// `generationConfig` only when it carries at least one option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] on transport failure, timeout, a non-2xx
    /// status, or a success body that is not valid JSON. Never retries.
    pub async fn generate(
        &self,
        prompt: &str,
        config: Option<&GenerationConfig>,
    ) -> Result<GenerateResponse> {
        let payload = build_payload(prompt, config);
        let body = serde_json::to_vec(&payload)
            .map_err(|err| Error::request(format!("failed to encode request body: {err}")))?;

        let req = Request::post(self.build_uri()?)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|err| Error::request(format!("failed to build request: {err}")))?;

        let response = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| {
                tracing::error!(model = %self.model, "generateContent request timed out");
                Error::request(format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|err| {
                tracing::error!(model = %self.model, error = %err, "generateContent request failed");
                Error::request(format!("transport error: {err}"))
            })?;

        let status = response.status();
        let bytes = to_bytes(response.into_body())
            .await
            .map_err(|err| Error::request(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes);
            tracing::error!(model = %self.model, %status, "generateContent returned an error status");
            return Err(Error::request(format!("server returned {status}: {reason}")));
        }

        let raw: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|err| Error::request(format!("response was not valid JSON: {err}")))?;

        Ok(GenerateResponse::new(raw))
    }

    fn build_uri(&self) -> Result<Uri> {
        format!("{}?key={}", self.base_endpoint, self.api_key)
            .parse::<Uri>()
            .map_err(|err| Error::configuration(format!("invalid endpoint: {err}")))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

fn build_payload(prompt: &str, config: Option<&GenerationConfig>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_owned(),
            }],
        }],
        generation_config: config.filter(|cfg| !cfg.is_empty()).cloned(),
    }
}

fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let tls = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    Client::builder().build::<_, Body>(HttpsConnector::from((http, Arc::new(tls))))
}

fn sanitize_base_url(input: &str) -> Result<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(Error::configuration(
            "base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>()
        .map_err(|err| Error::configuration(format!("invalid base URL: {err}")))?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn construction_requires_an_api_key() {
        let err = GeminiModel::new(GeminiConfig::new("gemini-2.0-flash"))
            .expect_err("missing key should error");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn construction_rejects_an_empty_api_key() {
        let err = GeminiModel::new(GeminiConfig::new("gemini-2.0-flash").with_api_key(""))
            .expect_err("empty key should error");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn endpoint_embeds_the_model_identifier() {
        let model = GeminiModel::new(GeminiConfig::new("gemini-2.0-flash").with_api_key("k"))
            .expect("model");
        assert_eq!(
            model.base_endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn credential_travels_as_a_query_parameter() {
        let model = GeminiModel::new(GeminiConfig::new("gemini-2.0-flash").with_api_key("secret"))
            .expect("model");
        let uri = model.build_uri().expect("uri");
        assert_eq!(uri.query(), Some("key=secret"));
    }

    #[test]
    fn debug_output_redacts_the_credential() {
        let model = GeminiModel::new(GeminiConfig::new("gemini-2.0-flash").with_api_key("secret"))
            .expect("model");
        assert!(!format!("{model:?}").contains("secret"));
    }

    #[test]
    fn base_url_requires_scheme() {
        let err = GeminiConfig::new("gemini-2.0-flash")
            .with_base_url("generativelanguage.googleapis.com")
            .expect_err("missing scheme should error");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn sanitize_appends_trailing_slash() {
        let cfg = GeminiConfig::new("gemini-2.0-flash")
            .with_base_url("https://example.com/upstream")
            .expect("valid URL");
        assert_eq!(cfg.base_url, "https://example.com/upstream/");
    }

    #[test]
    fn payload_without_config_has_no_generation_config_key() {
        let payload = build_payload("why is the sky blue?", None);
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"parts": [{"text": "why is the sky blue?"}]}]})
        );
    }

    #[test]
    fn payload_carries_both_recognized_options() {
        let config = GenerationConfig::new()
            .with_temperature(0.7)
            .with_max_output_tokens(256);
        let payload = build_payload("p", Some(&config));
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            body["generationConfig"],
            json!({"temperature": 0.7, "maxOutputTokens": 256})
        );
    }

    #[test]
    fn partial_config_serializes_only_present_keys() {
        let config = GenerationConfig::new().with_max_output_tokens(64);
        let payload = build_payload("p", Some(&config));
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["generationConfig"], json!({"maxOutputTokens": 64}));
    }

    #[test]
    fn empty_config_is_dropped_from_the_payload() {
        let config = GenerationConfig::new();
        let payload = build_payload("p", Some(&config));
        let body = serde_json::to_value(&payload).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn empty_prompt_is_forwarded_verbatim() {
        let payload = build_payload("", None);
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], json!(""));
    }
}
