//! Drop-in REST shim for the Gemini `generateContent` API.
//!
//! Callers written against the richer generative-AI client library keep
//! their three call shapes — construct a model by name, invoke it with a
//! prompt and optional generation options, read back the generated text —
//! while this crate speaks plain HTTPS to the text-generation endpoint.
//! One invocation maps to one POST and one parsed result; there are no
//! retries, no streaming, and no state carried between calls.
//!
//! ```no_run
//! use gemini_rest::{DEFAULT_MODEL, GenerativeModel};
//!
//! # async fn run() -> gemini_rest::Result<()> {
//! let model = GenerativeModel::from_env(DEFAULT_MODEL)?;
//! let response = model.generate_content("Say hello.", None).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod compat;
mod error;
mod model;
mod response;

/// Drop-in surface: legacy-name resolution, credential cell, wrapper model.
pub use compat::{ApiKeyStore, DEFAULT_MODEL, GenerativeModel, resolve_model_alias};
/// Error type and result alias shared across the crate.
pub use error::{Error, Result};
/// Core client and its configuration types.
pub use model::{GOOGLE_API_KEY_ENV, GeminiConfig, GeminiModel, GenerationConfig};
/// Response wrapper with tolerant text extraction.
pub use response::GenerateResponse;
