//! In-process [`PlacesApi`] that behaves like the admin API.
//!
//! Assigns increasing identifiers on create, applies updates in place,
//! cascades deletes to direct children, and records every request so
//! callers can assert on exactly what was sent.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use place_mapper_place_models::{NewPlace, Place, PlaceId, PlaceUpdate};

use crate::{ApiError, PlacesApi};

/// A request received by [`MemoryPlacesApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// `GET /admin/places`
    List,
    /// `POST /admin/places`
    Create(NewPlace),
    /// `PUT /admin/places/{id}`
    Update(PlaceId, PlaceUpdate),
    /// `DELETE /admin/places/{id}`
    Delete(PlaceId),
}

#[derive(Debug, Default)]
struct State {
    places: Vec<Place>,
    next_id: i64,
    requests: Vec<ApiRequest>,
    fail_next: Option<(u16, Option<String>)>,
}

/// Admin API backed by a `Vec<Place>`.
#[derive(Debug, Default)]
pub struct MemoryPlacesApi {
    state: Mutex<State>,
}

impl MemoryPlacesApi {
    /// Creates an API holding `places`. New identifiers start above the
    /// highest existing one.
    #[must_use]
    pub fn new(places: Vec<Place>) -> Self {
        let next_id = places.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(State {
                places,
                next_id,
                ..State::default()
            }),
        }
    }

    /// Makes the next mutating request fail with `status` and `detail`.
    pub fn fail_next(&self, status: u16, detail: Option<&str>) {
        self.lock().fail_next = Some((status, detail.map(ToString::to_string)));
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Requests other than listings.
    #[must_use]
    pub fn mutations(&self) -> Vec<ApiRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| !matches!(r, ApiRequest::List))
            .cloned()
            .collect()
    }

    /// Current server-side places.
    #[must_use]
    pub fn places(&self) -> Vec<Place> {
        self.lock().places.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn take_failure(&mut self) -> Result<(), ApiError> {
        match self.fail_next.take() {
            Some((status, detail)) => Err(ApiError::Status { status, detail }),
            None => Ok(()),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        detail: Some("Place not found".to_string()),
    }
}

#[async_trait]
impl PlacesApi for MemoryPlacesApi {
    async fn list_places(&self) -> Result<Vec<Place>, ApiError> {
        let mut state = self.lock();
        state.requests.push(ApiRequest::List);
        Ok(state.places.clone())
    }

    async fn create_place(&self, body: &NewPlace) -> Result<Place, ApiError> {
        let mut state = self.lock();
        state.requests.push(ApiRequest::Create(body.clone()));
        state.take_failure()?;

        let id = state.next_id;
        state.next_id += 1;

        let place = Place {
            id: PlaceId(id),
            name: body.name.clone(),
            boundary_points: Some(body.boundary_points.clone()),
            short_desc: Some(body.short_desc.clone()),
            description: Some(body.description.clone()),
            long_desc: Some(body.long_desc.clone()),
            parent_id: body.parent_id,
            latitude: Some(body.latitude),
            longitude: Some(body.longitude),
            kind: Some(body.kind.clone()),
            is_active: Some(body.is_active),
        };
        state.places.push(place.clone());

        Ok(place)
    }

    async fn update_place(&self, id: PlaceId, body: &PlaceUpdate) -> Result<Place, ApiError> {
        let mut state = self.lock();
        state.requests.push(ApiRequest::Update(id, body.clone()));
        state.take_failure()?;

        let place = state
            .places
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(not_found)?;

        place.boundary_points = Some(body.boundary_points.clone());
        place.short_desc = Some(body.short_desc.clone());
        place.description = Some(body.description.clone());
        place.parent_id = body.parent_id;

        Ok(place.clone())
    }

    async fn delete_place(&self, id: PlaceId) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.requests.push(ApiRequest::Delete(id));
        state.take_failure()?;

        state
            .places
            .retain(|p| p.id != id && p.parent_id != Some(id));

        Ok(())
    }
}
