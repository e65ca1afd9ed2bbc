//! Loading the render style from a URL or a local file.

use std::time::Duration;

use anyhow::{Context, Result};
use renderer::{StyleDefinition, StyleFormat};
use reqwest::Client;
use tracing::info;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Whether `source` should be fetched over HTTP.
pub fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read and validate a style, choosing JSON or YAML by the source's suffix.
pub async fn load_style(source: &str) -> Result<StyleDefinition> {
    let content = if is_remote(source) {
        fetch(source).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read style file {}", source))?
    };

    let style = StyleDefinition::parse(&content, StyleFormat::from_name(source))
        .with_context(|| format!("Invalid style at {}", source))?;
    info!(source = %source, style = %style.name, "Loaded style");
    Ok(style)
}

async fn fetch(url: &str) -> Result<String> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch style from {}", url))?
        .error_for_status()
        .with_context(|| format!("Style server rejected {}", url))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read style body from {}", url))
}
