//! Card dataset acquisition.

/// Dataset parsing and the built-in card set.
pub mod loader;
/// HTTP retrieval of remote datasets.
pub mod fetch;

pub use fetch::fetch_dataset;
pub use loader::{builtin_cards, parse_dataset, DatasetSource};
