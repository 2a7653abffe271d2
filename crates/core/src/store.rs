//! In-memory sort state: the pool of unsorted cards plus the three bins.

use thiserror::Error;
use tracing::debug;

use crate::models::{BinId, Bins, Card};
use crate::persist::PersistedState;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Removal target was not present in the named bin.
    #[error("card {name:?} not found in bin {bin}")]
    CardNotFound {
        /// Bin the removal was attempted on.
        bin: BinId,
        /// Name of the card that was looked up.
        name: String,
    },
}

/// Authoritative card placement, owned by the application controller and
/// mutated only through the operations below.
///
/// Every card lives in exactly one place: the pool or one of the bins.
/// The pool is never persisted; it is rebuilt from the dataset on load.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    pool: Vec<Card>,
    bins: Bins,
}

impl SortState {
    /// Build state from the dataset and an optional persisted snapshot.
    ///
    /// Bin contents are copied verbatim from the snapshot; the pool is the
    /// dataset minus every name that appears in a bin, in dataset order.
    /// With no snapshot the pool is the full dataset and all bins are empty.
    pub fn hydrate(dataset: Vec<Card>, persisted: Option<PersistedState>) -> Self {
        let Some(persisted) = persisted else {
            return Self {
                pool: dataset,
                bins: Bins::default(),
            };
        };

        let bins = persisted.bins;
        let pool: Vec<Card> = dataset
            .into_iter()
            .filter(|card| !bins.contains(&card.name))
            .collect();
        debug!(
            pool = pool.len(),
            binned = bins.total(),
            "Hydrated sort state from saved snapshot"
        );
        Self { pool, bins }
    }

    /// Cards not yet sorted into any bin, in dataset order with sorted
    /// cards removed in place.
    pub fn pool(&self) -> &[Card] {
        &self.pool
    }

    /// Current bin contents.
    pub fn bins(&self) -> &Bins {
        &self.bins
    }

    /// Cards in a single bin, in drop order.
    pub fn bin(&self, bin: BinId) -> &[Card] {
        self.bins.get(bin)
    }

    /// Whether every card has been sorted out of the pool.
    pub fn is_complete(&self) -> bool {
        self.pool.is_empty() && self.bins.total() > 0
    }

    /// Append the card to the named bin and drop it from the pool if it is
    /// there. Dropping a card that is already in a bin appends a duplicate
    /// entry; only hydration deduplicates.
    pub fn move_to_bin(&mut self, card: Card, bin: BinId) {
        if let Some(pos) = self.pool.iter().position(|c| c.name == card.name) {
            self.pool.remove(pos);
        }
        self.bins.get_mut(bin).push(card);
    }

    /// Remove the first card matching `name` from the named bin and append
    /// it back to the pool. A name with no match leaves the state untouched
    /// and reports [`StoreError::CardNotFound`].
    pub fn move_to_pool(&mut self, bin: BinId, name: &str) -> Result<Card, StoreError> {
        let cards = self.bins.get_mut(bin);
        let pos = cards
            .iter()
            .position(|card| card.name == name)
            .ok_or_else(|| StoreError::CardNotFound {
                bin,
                name: name.to_string(),
            })?;
        let card = cards.remove(pos);
        self.pool.push(card.clone());
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_dataset() -> Vec<Card> {
        vec![
            Card::new("Honesty", "Being truthful"),
            Card::new("Family", "Caring for relatives"),
            Card::new("Wealth", "Having money"),
        ]
    }

    fn assert_partition(state: &SortState, dataset: &[Card]) {
        let mut seen = Vec::new();
        seen.extend(state.pool().iter().map(|card| card.name.clone()));
        for bin in BinId::ALL {
            seen.extend(state.bin(bin).iter().map(|card| card.name.clone()));
        }
        let unique: HashSet<_> = seen.iter().cloned().collect();
        assert_eq!(seen.len(), dataset.len(), "no omissions or duplicates");
        assert_eq!(unique.len(), dataset.len());
        for card in dataset {
            assert!(unique.contains(&card.name));
        }
    }

    #[test]
    fn fresh_session_pools_everything() {
        let dataset = sample_dataset();
        let state = SortState::hydrate(dataset.clone(), None);
        assert_eq!(state.pool().len(), 3);
        for bin in BinId::ALL {
            assert!(state.bin(bin).is_empty());
            assert_eq!(state.bins().count(bin), 0);
        }
        assert_partition(&state, &dataset);
    }

    #[test]
    fn drop_moves_card_out_of_pool() {
        let dataset = sample_dataset();
        let mut state = SortState::hydrate(dataset.clone(), None);
        let honesty = state.pool()[0].clone();

        state.move_to_bin(honesty, BinId::VeryImportant);

        let pool_names: Vec<_> = state.pool().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pool_names, ["Family", "Wealth"]);
        assert_eq!(state.bin(BinId::VeryImportant)[0].name, "Honesty");
        assert_eq!(state.bins().count(BinId::VeryImportant), 1);
        assert_partition(&state, &dataset);
    }

    #[test]
    fn removal_appends_back_to_pool() {
        let dataset = sample_dataset();
        let mut state = SortState::hydrate(dataset.clone(), None);
        let honesty = state.pool()[0].clone();
        state.move_to_bin(honesty, BinId::VeryImportant);

        let returned = state
            .move_to_pool(BinId::VeryImportant, "Honesty")
            .expect("card present");
        assert_eq!(returned.name, "Honesty");
        assert!(state.bin(BinId::VeryImportant).is_empty());

        // Re-pooled card goes to the end, not its original position.
        let pool_names: Vec<_> = state.pool().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pool_names, ["Family", "Wealth", "Honesty"]);
        assert_partition(&state, &dataset);
    }

    #[test]
    fn removal_of_missing_card_is_reported_not_applied() {
        let mut state = SortState::hydrate(sample_dataset(), None);
        let before = state.clone();

        let err = state
            .move_to_pool(BinId::SomewhatImportant, "Honesty")
            .expect_err("nothing in the bin");
        match err {
            StoreError::CardNotFound { bin, name } => {
                assert_eq!(bin, BinId::SomewhatImportant);
                assert_eq!(name, "Honesty");
            }
        }
        assert_eq!(state.pool().len(), before.pool().len());
        assert_eq!(state.bins(), before.bins());
    }

    #[test]
    fn hydrate_subtracts_binned_names_from_pool() {
        let dataset = sample_dataset();
        let mut bins = Bins::default();
        bins.get_mut(BinId::VeryImportant)
            .push(Card::new("Honesty", "Being truthful"));
        let persisted = PersistedState::new(bins);

        let state = SortState::hydrate(dataset.clone(), Some(persisted));
        let pool_names: Vec<_> = state.pool().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pool_names, ["Family", "Wealth"]);
        assert_eq!(state.bin(BinId::VeryImportant)[0].name, "Honesty");
        assert_partition(&state, &dataset);
    }

    #[test]
    fn hydrate_keeps_binned_cards_unknown_to_dataset() {
        let mut bins = Bins::default();
        bins.get_mut(BinId::NotImportant)
            .push(Card::new("Retired Value", "No longer in the dataset"));
        let persisted = PersistedState::new(bins);

        let state = SortState::hydrate(sample_dataset(), Some(persisted));
        assert_eq!(state.pool().len(), 3);
        assert_eq!(state.bin(BinId::NotImportant)[0].name, "Retired Value");
    }

    #[test]
    fn duplicate_drop_is_permitted() {
        let mut state = SortState::hydrate(sample_dataset(), None);
        let honesty = state.pool()[0].clone();
        state.move_to_bin(honesty.clone(), BinId::VeryImportant);
        state.move_to_bin(honesty, BinId::VeryImportant);
        assert_eq!(state.bins().count(BinId::VeryImportant), 2);
    }

    #[test]
    fn round_trip_preserves_bin_contents_and_order() {
        let mut state = SortState::hydrate(sample_dataset(), None);
        let honesty = state.pool()[0].clone();
        let family = state.pool()[1].clone();
        state.move_to_bin(family, BinId::VeryImportant);
        state.move_to_bin(honesty, BinId::VeryImportant);

        let snapshot = PersistedState::new(state.bins().clone());
        let serialized = serde_json::to_string(&snapshot).unwrap();
        let parsed: PersistedState = serde_json::from_str(&serialized).unwrap();
        let rehydrated = SortState::hydrate(sample_dataset(), Some(parsed));

        assert_eq!(rehydrated.bins(), state.bins());
        let names: Vec<_> = rehydrated
            .bin(BinId::VeryImportant)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["Family", "Honesty"]);
    }
}
