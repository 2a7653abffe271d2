#![warn(clippy::all, missing_docs)]

//! Core domain logic for the valuesort TUI.
//!
//! This crate hosts the card data models, configuration handling,
//! dataset acquisition, the sort-state store, and persistence layers
//! used by the terminal UI and any future frontends.

pub mod config;
pub mod dataset;
pub mod models;
pub mod persist;
pub mod store;

pub use config::AppConfig;
pub use dataset::DatasetSource;
pub use models::{BinId, Bins, Card};
pub use persist::{PersistedState, StateFile};
pub use store::{SortState, StoreError};
