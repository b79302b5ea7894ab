#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Boundary recording for the location mapper.
//!
//! A [`recorder::BoundaryRecorder`] subscribes to a push-based stream of
//! position samples (a [`source::PositionSource`]) and appends each sample
//! to a [`BoundaryPath`](place_mapper_place_models::BoundaryPath) while the
//! user walks the perimeter of a place. At most one subscription is live
//! at a time; dropping it unsubscribes.
//!
//! [`projection`] turns a path into the 100×100 preview used to check the
//! walk before saving.

pub mod progress;
pub mod projection;
pub mod recorder;
pub mod source;
pub mod track;

use std::fmt;

use thiserror::Error;

/// Why a position sample could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorCode {
    /// The user or OS refused access to positioning.
    PermissionDenied,
    /// No fix could be obtained.
    PositionUnavailable,
    /// No sample arrived within the per-update timeout.
    Timeout,
}

impl fmt::Display for PositionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PermissionDenied => "permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "timeout",
        })
    }
}

/// An error reported by an active position stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PositionError {
    /// Error category.
    pub code: PositionErrorCode,
    /// Human-readable description from the source.
    pub message: String,
}

impl PositionError {
    /// Creates a position error.
    #[must_use]
    pub fn new(code: PositionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors from subscribing to or reading a position stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The positioning capability is not available at all.
    #[error("Geolocation is not supported: {message}")]
    Unavailable {
        /// Why the source cannot be used.
        message: String,
    },

    /// The active stream reported an error; recording has stopped.
    #[error("Error getting location: {0}")]
    Position(#[from] PositionError),
}

/// Errors from editing the recorded path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    /// The path cannot change while a recording is active.
    #[error("Cannot modify the path while recording")]
    Recording,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_error_messages() {
        let err = StreamError::from(PositionError::new(
            PositionErrorCode::Timeout,
            "Timeout expired",
        ));
        assert_eq!(err.to_string(), "Error getting location: Timeout expired");

        let err = StreamError::Unavailable {
            message: "no GPS".to_string(),
        };
        assert_eq!(err.to_string(), "Geolocation is not supported: no GPS");
    }
}
