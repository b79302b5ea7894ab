#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Decides between updating an existing place and creating a new one.
//!
//! [`PlaceResolver::save`] matches the typed name against the roster
//! snapshot it is given (case-insensitive, exact after trimming) and
//! issues exactly one upsert through the [`PlacesApi`]. The resolver keeps
//! no roster of its own; callers refresh their snapshot after a success.

use std::sync::Arc;

use place_mapper_api::{ApiError, PlacesApi};
use place_mapper_place_models::{BoundaryPath, NewPlace, PlaceId, PlaceUpdate};
use place_mapper_roster::Roster;
use strum_macros::Display;
use thiserror::Error;

/// The remote operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    /// `POST /admin/places`
    #[strum(serialize = "create place")]
    Create,
    /// `PUT /admin/places/{id}`
    #[strum(serialize = "update boundary")]
    Update,
    /// `DELETE /admin/places/{id}`
    #[strum(serialize = "delete place")]
    Delete,
}

/// Errors from saving or deleting a place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The input was rejected before any request was made.
    #[error("{message}")]
    Validation {
        /// What the user needs to fix.
        message: String,
    },

    /// The admin API rejected the request or could not be reached.
    #[error("Failed to {operation}: {message}")]
    Remote {
        /// Which request failed.
        operation: Operation,
        /// Server-provided detail, or a generic description.
        message: String,
    },
}

impl ResolveError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    fn remote(operation: Operation, error: &ApiError) -> Self {
        let message = error
            .detail()
            .map_or_else(|| error.to_string(), ToString::to_string);
        log::error!("Failed to {operation}: {error}");
        Self::Remote { operation, message }
    }
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new place was created.
    Created {
        /// Identifier assigned by the server.
        id: PlaceId,
        /// Name as sent.
        name: String,
    },
    /// An existing place was updated.
    Updated {
        /// Identifier of the updated place.
        id: PlaceId,
        /// Name as stored in the roster.
        name: String,
    },
}

impl SaveOutcome {
    /// Identifier of the saved place.
    #[must_use]
    pub const fn id(&self) -> PlaceId {
        match self {
            Self::Created { id, .. } | Self::Updated { id, .. } => *id,
        }
    }

    /// Status line describing the outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Created { name, .. } => format!("Created NEW place '{name}' with boundary!"),
            Self::Updated { name, .. } => {
                format!("Successfully updated boundary for '{name}'!")
            }
        }
    }
}

/// Resolves typed names against a roster and performs the upsert.
#[derive(Clone)]
pub struct PlaceResolver {
    api: Arc<dyn PlacesApi>,
}

impl PlaceResolver {
    /// Creates a resolver that writes through `api`.
    #[must_use]
    pub fn new(api: Arc<dyn PlacesApi>) -> Self {
        Self { api }
    }

    /// Saves `path` under `typed_name`.
    ///
    /// The parent is resolved by name; a miss silently yields no parent.
    /// A name already in `roster` is updated in place, otherwise a place
    /// is created at the first point of `path`.
    ///
    /// # Errors
    ///
    /// * [`ResolveError::Validation`] if the name is blank, or if a create
    ///   is needed and `path` is empty. No request is made.
    /// * [`ResolveError::Remote`] if the request fails.
    pub async fn save(
        &self,
        roster: &Roster,
        typed_name: &str,
        typed_parent_name: &str,
        description: &str,
        path: &BoundaryPath,
    ) -> Result<SaveOutcome, ResolveError> {
        let name = typed_name.trim();
        if name.is_empty() {
            return Err(ResolveError::validation("Please enter a name."));
        }

        let parent_id = roster.resolve_parent_id(typed_parent_name);

        if let Some(existing) = roster.find_by_name(name) {
            let id = existing.id;
            log::info!(
                "Updating place {id} ('{}') with {} points",
                existing.name,
                path.len()
            );

            let body = PlaceUpdate::new(path, description, parent_id);
            self.api
                .update_place(id, &body)
                .await
                .map_err(|e| ResolveError::remote(Operation::Update, &e))?;

            return Ok(SaveOutcome::Updated {
                id,
                name: existing.name.clone(),
            });
        }

        let body = NewPlace::from_boundary(name, description, path, parent_id).ok_or_else(|| {
            ResolveError::validation("At least one point is required to create a place.")
        })?;

        log::info!("Creating place '{name}' with {} points", path.len());

        let created = self
            .api
            .create_place(&body)
            .await
            .map_err(|e| ResolveError::remote(Operation::Create, &e))?;

        log::info!("Created place {} ('{}')", created.id, created.name);

        Ok(SaveOutcome::Created {
            id: created.id,
            name: body.name,
        })
    }

    /// Deletes the place with identifier `id`.
    ///
    /// The server also removes its children.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Remote`] if the request fails, typically
    /// because another record still references the place.
    pub async fn delete(&self, id: PlaceId) -> Result<(), ResolveError> {
        log::info!("Deleting place {id}");
        self.api
            .delete_place(id)
            .await
            .map_err(|e| ResolveError::remote(Operation::Delete, &e))
    }
}
