#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Editing session for the location mapper.
//!
//! A [`MapperSession`] owns everything the mapper screen holds at once:
//! the typed place name, parent name, and description, the status line,
//! the roster snapshot, and the boundary recorder. It wires the recorder
//! to the resolver and refreshes the roster after every mutation.
//!
//! The session is single-owner. Position samples are pulled in with
//! [`MapperSession::pump`] or [`MapperSession::drain_pending`]; nothing
//! runs in the background.

use std::sync::Arc;

use place_mapper_place_models::{BoundaryPath, Coordinate, Place, PlaceId};
use place_mapper_recorder::progress::ProgressCallback;
use place_mapper_recorder::projection::{self, PreviewMarker};
use place_mapper_recorder::recorder::{BoundaryRecorder, StartOutcome};
use place_mapper_recorder::source::{PositionSource, WatchOptions};
use place_mapper_recorder::{RecorderError, StreamError};
use place_mapper_resolver::{PlaceResolver, ResolveError, SaveOutcome};
use place_mapper_roster::store::{RosterError, RosterStore};
use place_mapper_roster::{Roster, filter};
use thiserror::Error;

/// Status line shown before anything has happened.
pub const READY_STATUS: &str = "Ready";

/// Errors from session actions. The status line always carries the same
/// text.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Recording needs a place name to record for.
    #[error("Please enter a name.")]
    NameRequired,

    /// The action is not allowed while recording.
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    /// The position stream could not be started or failed.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Saving or deleting failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The roster could not be refreshed.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// The identifier is not in the roster.
    #[error("Unknown place {0}")]
    UnknownPlace(PlaceId),

    /// A delete was requested without confirmation.
    #[error("Delete not confirmed")]
    NotConfirmed,
}

/// Confirmation prompt shown before deleting `name`.
#[must_use]
pub fn delete_prompt(name: &str) -> String {
    format!("Are you sure you want to delete '{name}'? This action cannot be undone.")
}

/// The mapper's editing state.
pub struct MapperSession {
    store: Box<dyn RosterStore>,
    resolver: PlaceResolver,
    source: Arc<dyn PositionSource>,
    recorder: BoundaryRecorder,
    place_name: String,
    parent_name: String,
    description: String,
    status: String,
}

impl MapperSession {
    /// Creates a session over `store`, saving through `resolver` and
    /// recording from `source`.
    #[must_use]
    pub fn new(
        store: Box<dyn RosterStore>,
        resolver: PlaceResolver,
        source: Arc<dyn PositionSource>,
    ) -> Self {
        Self {
            store,
            resolver,
            source,
            recorder: BoundaryRecorder::default(),
            place_name: String::new(),
            parent_name: String::new(),
            description: String::new(),
            status: READY_STATUS.to_string(),
        }
    }

    /// Uses `options` for every subscription.
    #[must_use]
    pub fn with_watch_options(mut self, options: WatchOptions) -> Self {
        self.recorder = BoundaryRecorder::new(options);
        self
    }

    /// Reports recording progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.recorder = std::mem::take(&mut self.recorder).with_progress(progress);
        self
    }

    /// Fetches the roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Roster`] if the listing fails; the previous
    /// snapshot is kept.
    pub async fn refresh(&mut self) -> Result<&Roster, SessionError> {
        if let Err(e) = self.store.refresh().await {
            log::error!("{e}");
            return Err(self.fail(e.into()));
        }
        Ok(self.store.roster())
    }

    /// Current roster snapshot.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        self.store.roster()
    }

    /// Current status line.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Typed place name.
    #[must_use]
    pub fn place_name(&self) -> &str {
        &self.place_name
    }

    /// Typed parent name, also the list filter.
    #[must_use]
    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    /// Typed description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The recorded or loaded path.
    #[must_use]
    pub const fn path(&self) -> &BoundaryPath {
        self.recorder.path()
    }

    /// Whether a recording is active.
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// `Last: lat, lng` for the most recent sample.
    #[must_use]
    pub fn last_point_label(&self) -> Option<String> {
        self.recorder.last_point().map(|p| format!("Last: {p}"))
    }

    /// SVG path data for the preview.
    #[must_use]
    pub fn svg_path(&self) -> String {
        projection::svg_path(self.path())
    }

    /// Projected sample markers for the preview.
    #[must_use]
    pub fn preview_markers(&self) -> Vec<PreviewMarker> {
        projection::preview_markers(self.path())
    }

    /// Sets the place name. If it names a known place (ignoring case) that
    /// place's description, parent, and boundary are loaded.
    ///
    /// A top-level match leaves the parent name alone so an active filter
    /// is not dropped. While recording only the name changes.
    pub fn set_place_name(&mut self, name: impl Into<String>) {
        self.place_name = name.into();

        if self.place_name.is_empty() || self.recorder.is_recording() {
            return;
        }

        let roster = self.store.roster();
        let Some(place) = roster.find_by_name(&self.place_name) else {
            return;
        };

        let parent_name = roster.parent_name(place).map(ToString::to_string);
        let place = place.clone();

        self.description = place.display_description().to_string();
        if let Some(parent_name) = parent_name {
            self.parent_name = parent_name;
        }
        self.load_boundary(&place);

        self.status = if place.is_mapped() {
            format!("Loaded details for {}", place.name)
        } else {
            format!("Loaded details for {} (No path)", place.name)
        };
    }

    /// Sets the parent name.
    pub fn set_parent_name(&mut self, name: impl Into<String>) {
        self.parent_name = name.into();
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Clears the parent filter.
    pub fn clear_parent_filter(&mut self) {
        self.parent_name.clear();
    }

    /// Places listed under the current parent filter.
    #[must_use]
    pub fn visible_places(&self) -> Vec<&Place> {
        filter::visible_set(self.store.roster(), &self.parent_name)
    }

    /// Heading for [`Self::visible_places`].
    #[must_use]
    pub fn visible_heading(&self) -> String {
        filter::visible_heading(self.store.roster(), &self.parent_name)
    }

    /// Parent suggestions for the place being edited.
    #[must_use]
    pub fn parent_candidates(&self) -> Vec<&Place> {
        filter::top_level_candidates(self.store.roster(), &self.place_name)
    }

    /// Loads place `id` into the editor.
    ///
    /// # Errors
    ///
    /// * [`SessionError::Recorder`] while recording.
    /// * [`SessionError::UnknownPlace`] if `id` is not in the roster.
    pub fn select_place(&mut self, id: PlaceId) -> Result<(), SessionError> {
        if self.recorder.is_recording() {
            return Err(self.fail(RecorderError::Recording.into()));
        }

        let roster = self.store.roster();
        let Some(place) = roster.find_by_id(id) else {
            return Err(SessionError::UnknownPlace(id));
        };
        let parent_name = roster.parent_name(place).unwrap_or_default().to_string();
        let place = place.clone();

        self.place_name.clone_from(&place.name);
        self.description = place.display_description().to_string();
        self.parent_name = parent_name;
        self.load_boundary(&place);

        self.status = if place.is_mapped() {
            format!("Loaded boundary for {}", place.name)
        } else {
            format!("Selected {}", place.name)
        };

        Ok(())
    }

    fn load_boundary(&mut self, place: &Place) {
        let path = place.boundary_points.clone().unwrap_or_default();
        if let Err(e) = self.recorder.load(path) {
            log::debug!("Not loading boundary of '{}': {e}", place.name);
        }
    }

    /// Starts recording a fresh path for the typed place name.
    ///
    /// # Errors
    ///
    /// * [`SessionError::NameRequired`] if no name is typed.
    /// * [`SessionError::Stream`] if positioning is unavailable.
    pub fn start_recording(&mut self) -> Result<StartOutcome, SessionError> {
        if self.place_name.trim().is_empty() {
            return Err(self.fail(SessionError::NameRequired));
        }

        let result = self.recorder.start(self.source.as_ref());
        self.status = self.recorder.status().to_string();
        Ok(result?)
    }

    /// Stops recording and returns the number of captured points.
    pub fn stop_recording(&mut self) -> usize {
        let was_recording = self.recorder.is_recording();
        let count = self.recorder.stop();
        if was_recording {
            self.status = self.recorder.status().to_string();
        }
        count
    }

    /// Empties the path.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Recorder`] while recording.
    pub fn clear_points(&mut self) -> Result<(), SessionError> {
        self.recorder.clear().map_err(|e| self.fail(e.into()))
    }

    /// Waits for the next position sample.
    ///
    /// Returns `None` when not recording or when the stream ends.
    pub async fn pump(&mut self) -> Option<Result<Coordinate, SessionError>> {
        let result = self.recorder.pump().await;
        self.sync_recorder_status();
        result.map(|r| r.map_err(SessionError::from))
    }

    /// Appends every sample already available without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stream`] if the stream failed; recording
    /// has stopped.
    pub fn drain_pending(&mut self) -> Result<usize, SessionError> {
        let result = self.recorder.drain_pending();
        self.sync_recorder_status();
        Ok(result?)
    }

    fn sync_recorder_status(&mut self) {
        if !self.recorder.is_recording() && !self.recorder.status().is_empty() {
            self.status = self.recorder.status().to_string();
        }
    }

    /// Saves the current path under the typed name, then refreshes the
    /// roster.
    ///
    /// # Errors
    ///
    /// * [`SessionError::Recorder`] while recording.
    /// * [`SessionError::Resolve`] if validation or the request fails.
    pub async fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        if self.recorder.is_recording() {
            return Err(self.fail(RecorderError::Recording.into()));
        }

        self.status = "Saving...".to_string();

        let result = self
            .resolver
            .save(
                self.store.roster(),
                &self.place_name,
                &self.parent_name,
                &self.description,
                self.recorder.path(),
            )
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.status = outcome.message();
        self.refresh_after_mutation().await;

        Ok(outcome)
    }

    /// Deletes place `id` once `confirmed`, clearing the editor if it
    /// holds that place, then refreshes the roster.
    ///
    /// # Errors
    ///
    /// * [`SessionError::NotConfirmed`] if `confirmed` is false.
    /// * [`SessionError::UnknownPlace`] if `id` is not in the roster.
    /// * [`SessionError::Resolve`] if the request fails.
    pub async fn delete(&mut self, id: PlaceId, confirmed: bool) -> Result<(), SessionError> {
        let name = self
            .store
            .roster()
            .find_by_id(id)
            .map(|p| p.name.clone())
            .ok_or(SessionError::UnknownPlace(id))?;

        if !confirmed {
            log::debug!("Delete of '{name}' not confirmed");
            return Err(SessionError::NotConfirmed);
        }

        if let Err(e) = self.resolver.delete(id).await {
            return Err(self.fail(e.into()));
        }

        self.status = format!("Deleted '{name}'.");

        if self.place_name == name {
            self.recorder.stop();
            self.place_name.clear();
            self.description.clear();
            self.parent_name.clear();
            self.recorder.load(BoundaryPath::new())?;
        }

        self.refresh_after_mutation().await;

        Ok(())
    }

    async fn refresh_after_mutation(&mut self) {
        if let Err(e) = self.store.refresh().await {
            log::warn!("Roster is stale until the next refresh: {e}");
        }
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        self.status = error.to_string();
        error
    }
}

impl Drop for MapperSession {
    fn drop(&mut self) {
        if self.recorder.is_recording() {
            let count = self.recorder.stop();
            log::info!("Session closed while recording; kept {count} points unsaved");
        }
    }
}
