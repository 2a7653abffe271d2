use std::{collections::HashSet, fs, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{config::AppConfig, models::Card};

/// Wire shape of a dataset document.
#[derive(Debug, Deserialize)]
struct DatasetDocument {
    cards: Vec<Card>,
}

static BUILTIN: Lazy<Vec<Card>> = Lazy::new(|| {
    parse_dataset(include_str!("cards.json")).expect("built-in dataset is valid")
});

/// The value card set compiled into the binary, used when no dataset
/// source is configured.
pub fn builtin_cards() -> Vec<Card> {
    BUILTIN.clone()
}

/// Parse a dataset document.
///
/// Card names are the identity used for every membership test, so
/// duplicates are skipped with a warning rather than allowed to alias
/// each other. An empty card list is an error.
pub fn parse_dataset(input: &str) -> Result<Vec<Card>> {
    let document: DatasetDocument =
        serde_json::from_str(input).context("failed to parse card dataset")?;

    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(document.cards.len());
    for card in document.cards {
        if !seen.insert(card.name.clone()) {
            warn!("Skipping duplicate card {:?}", card.name);
            continue;
        }
        cards.push(card);
    }

    if cards.is_empty() {
        anyhow::bail!("card dataset contains no cards");
    }
    Ok(cards)
}

/// Where the card dataset comes from, resolved from configuration.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// Card set compiled into the binary.
    Builtin,
    /// Local JSON file.
    File(PathBuf),
    /// Remote JSON document fetched once at startup.
    Url(String),
}

impl DatasetSource {
    /// Pick the source for the given configuration. A URL wins over a
    /// local path; with neither the built-in set is used.
    pub fn from_config(config: &AppConfig) -> Self {
        if let Some(url) = &config.dataset_url {
            DatasetSource::Url(url.clone())
        } else if let Some(path) = &config.dataset_path {
            DatasetSource::File(path.clone())
        } else {
            DatasetSource::Builtin
        }
    }

    /// Acquire the dataset. Any failure here is fatal to startup; there
    /// is no fallback from a configured source to the built-in set.
    pub async fn load(&self) -> Result<Vec<Card>> {
        match self {
            DatasetSource::Builtin => Ok(builtin_cards()),
            DatasetSource::File(path) => {
                info!("Loading card dataset from {}", path.display());
                let content = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                parse_dataset(&content)
                    .with_context(|| format!("failed to load dataset {}", path.display()))
            }
            DatasetSource::Url(url) => super::fetch::fetch_dataset(url).await,
        }
    }
}
