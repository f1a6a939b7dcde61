//! Minimal demo of the drop-in surface: one prompt, one POST, one answer.
//!
//! Requires `GOOGLE_API_KEY` in the environment.

use anyhow::Result;
use gemini_rest::{ApiKeyStore, DEFAULT_MODEL, GenerativeModel};
use serde_json::{Map, json};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // The store mirrors the richer library's `configure` call shape; with
    // no explicit key it falls back to GOOGLE_API_KEY.
    let store = ApiKeyStore::new();
    store.configure(None);

    let model = GenerativeModel::new(DEFAULT_MODEL, &store)?;
    info!("using model {}", model.model());

    let mut options = Map::new();
    options.insert("temperature".to_owned(), json!(0.7));
    options.insert("max_output_tokens".to_owned(), json!(256));

    let response = model
        .generate_content(
            "Explain what a compatibility shim is in one sentence.",
            Some(&options),
        )
        .await?;

    info!("response: {}", response.text());
    Ok(())
}
