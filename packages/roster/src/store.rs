//! Repository interface over the roster snapshot.
//!
//! Resolution and filtering only ever read a [`Roster`]. Where that
//! snapshot comes from is hidden behind [`RosterStore`], so the mapper
//! logic can run against the remote API or an injected in-memory list.

use async_trait::async_trait;
use place_mapper_place_models::Place;
use thiserror::Error;

use crate::Roster;

/// Errors from refreshing a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The source of truth could not be read.
    #[error("Roster refresh failed: {0}")]
    Refresh(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Holds the current roster snapshot and knows how to re-fetch it.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// The current snapshot.
    fn roster(&self) -> &Roster;

    /// Replaces the snapshot with a fresh copy from the source of truth.
    ///
    /// On failure the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the source cannot be read.
    async fn refresh(&mut self) -> Result<&Roster, RosterError>;
}

/// A [`RosterStore`] backed by a fixed list of places.
///
/// `refresh` re-reads the list, which callers may edit in between through
/// [`MemoryRosterStore::set_places`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRosterStore {
    source: Vec<Place>,
    snapshot: Roster,
}

impl MemoryRosterStore {
    /// Creates a store whose snapshot already holds `places`.
    #[must_use]
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            snapshot: Roster::new(places.clone()),
            source: places,
        }
    }

    /// Replaces the backing list. The snapshot is unchanged until the next
    /// refresh.
    pub fn set_places(&mut self, places: Vec<Place>) {
        self.source = places;
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    fn roster(&self) -> &Roster {
        &self.snapshot
    }

    async fn refresh(&mut self) -> Result<&Roster, RosterError> {
        self.snapshot = Roster::new(self.source.clone());
        Ok(&self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_changes_only_on_refresh() {
        let mut store = MemoryRosterStore::new(vec![Place::new(1, "Harem")]);
        store.set_places(vec![Place::new(1, "Harem"), Place::new(2, "Gate")]);
        assert_eq!(store.roster().len(), 1);

        let roster = store.refresh().await.unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.find_by_name("gate").is_some());
    }
}
