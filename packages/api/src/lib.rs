#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the admin places API.
//!
//! All persistence is remote: the mapper lists, creates, updates, and
//! deletes places through the `/admin/places` endpoints with a bearer
//! token. The [`PlacesApi`] trait is the seam the resolver and session
//! depend on; [`client::HttpPlacesApi`] is the `reqwest` implementation
//! and [`memory::MemoryPlacesApi`] an in-process stand-in.
//!
//! Requests are single-shot: no retry, no deduplication.

pub mod client;
pub mod config;
pub mod memory;
pub mod roster;

use async_trait::async_trait;
use place_mapper_place_models::{NewPlace, Place, PlaceId, PlaceUpdate};
use thiserror::Error;

/// Errors from admin API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-2xx status.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("request failed"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided `detail`, if the body carried one.
        detail: Option<String>,
    },

    /// Client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl ApiError {
    /// Server-provided detail message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Admin operations on places.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Lists every place, children included.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    async fn list_places(&self) -> Result<Vec<Place>, ApiError>;

    /// Creates a place and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    async fn create_place(&self, body: &NewPlace) -> Result<Place, ApiError>;

    /// Updates the boundary, descriptions, and parent of a place.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the place is unknown.
    async fn update_place(&self, id: PlaceId, body: &PlaceUpdate) -> Result<Place, ApiError>;

    /// Deletes a place.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails, typically because
    /// something else still references the place.
    async fn delete_place(&self, id: PlaceId) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_uses_detail() {
        let err = ApiError::Status {
            status: 404,
            detail: Some("Place not found".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 404: Place not found");
        assert_eq!(err.detail(), Some("Place not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn status_error_display_without_detail() {
        let err = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP 500: request failed");
        assert!(err.detail().is_none());
    }
}
