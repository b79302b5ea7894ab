//! [`RosterStore`] backed by a [`PlacesApi`].

use std::sync::Arc;

use async_trait::async_trait;
use place_mapper_roster::Roster;
use place_mapper_roster::store::{RosterError, RosterStore};

use crate::PlacesApi;

/// Roster snapshot re-fetched from the admin API on every refresh.
pub struct ApiRosterStore {
    api: Arc<dyn PlacesApi>,
    snapshot: Roster,
}

impl ApiRosterStore {
    /// Creates a store with an empty snapshot. Call
    /// [`RosterStore::refresh`] to populate it.
    #[must_use]
    pub fn new(api: Arc<dyn PlacesApi>) -> Self {
        Self {
            api,
            snapshot: Roster::default(),
        }
    }

    /// Creates a store and populates it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the initial listing fails.
    pub async fn load(api: Arc<dyn PlacesApi>) -> Result<Self, RosterError> {
        let mut store = Self::new(api);
        store.refresh().await?;
        Ok(store)
    }
}

#[async_trait]
impl RosterStore for ApiRosterStore {
    fn roster(&self) -> &Roster {
        &self.snapshot
    }

    async fn refresh(&mut self) -> Result<&Roster, RosterError> {
        let places = self
            .api
            .list_places()
            .await
            .map_err(|e| RosterError::Refresh(Box::new(e)))?;

        log::info!("Roster refreshed: {} places", places.len());
        self.snapshot = Roster::new(places);
        Ok(&self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use place_mapper_place_models::{Place, PlaceId};

    use super::*;
    use crate::memory::MemoryPlacesApi;

    #[tokio::test]
    async fn load_populates_snapshot() {
        let api = Arc::new(MemoryPlacesApi::new(vec![
            Place::new(1, "Harem"),
            Place::new(2, "Gate"),
        ]));
        let store = ApiRosterStore::load(api).await.unwrap();
        assert_eq!(store.roster().len(), 2);
        assert_eq!(store.roster().find_by_name("gate").unwrap().id, PlaceId(2));
    }

    #[tokio::test]
    async fn refresh_picks_up_remote_changes() {
        let api = Arc::new(MemoryPlacesApi::new(vec![Place::new(1, "Harem")]));
        let mut store = ApiRosterStore::load(api.clone()).await.unwrap();

        crate::PlacesApi::delete_place(api.as_ref(), PlaceId(1))
            .await
            .unwrap();
        assert_eq!(store.roster().len(), 1);

        store.refresh().await.unwrap();
        assert!(store.roster().is_empty());
    }
}
