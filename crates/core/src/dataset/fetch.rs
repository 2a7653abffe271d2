//! Remote dataset retrieval.

use anyhow::{Context, Result};
use tracing::info;

use super::loader::parse_dataset;
use crate::models::Card;

/// Fetch and parse a dataset document from `url`.
///
/// Awaited to completion before any rendering happens; a failure here is
/// fatal to startup.
pub async fn fetch_dataset(url: &str) -> Result<Vec<Card>> {
    info!("Fetching card dataset from {url}");
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("dataset request to {url} failed"))?;
    let body = response
        .text()
        .await
        .with_context(|| format!("failed to read dataset body from {url}"))?;
    parse_dataset(&body).with_context(|| format!("failed to load dataset from {url}"))
}
