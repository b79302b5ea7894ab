//! The boundary recorder state machine.
//!
//! ```text
//! Idle --start--> Recording --stop | stream error | stream end--> Idle
//! ```
//!
//! Starting resets the path; a second `start` while recording is a no-op,
//! so there is never more than one live subscription. The subscription is
//! dropped on `stop`, on any stream error, and when the recorder itself is
//! dropped.

use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use place_mapper_place_models::{BoundaryPath, Coordinate};

use crate::progress::{ProgressCallback, null_progress};
use crate::projection::{self, ProjectedPoint};
use crate::source::{PositionSource, PositionStream, WatchOptions};
use crate::{PositionError, PositionErrorCode, RecorderError, StreamError};

/// Recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// No subscription.
    Idle,
    /// Subscribed and appending samples.
    Recording,
}

/// Result of a [`BoundaryRecorder::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new subscription was opened and the path reset.
    Started,
    /// A recording was already active; nothing changed.
    AlreadyRecording,
}

/// Records a walked boundary from a position stream.
pub struct BoundaryRecorder {
    path: BoundaryPath,
    subscription: Option<PositionStream>,
    options: WatchOptions,
    status: String,
    progress: Arc<dyn ProgressCallback>,
}

impl Default for BoundaryRecorder {
    fn default() -> Self {
        Self::new(WatchOptions::default())
    }
}

impl BoundaryRecorder {
    /// Creates an idle recorder with an empty path.
    #[must_use]
    pub fn new(options: WatchOptions) -> Self {
        Self {
            path: BoundaryPath::new(),
            subscription: None,
            options,
            status: String::new(),
            progress: null_progress(),
        }
    }

    /// Reports captured point counts to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RecorderState {
        if self.subscription.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    /// Whether a subscription is active.
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        self.subscription.is_some()
    }

    /// The recorded path.
    #[must_use]
    pub const fn path(&self) -> &BoundaryPath {
        &self.path
    }

    /// Number of recorded samples.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.path.len()
    }

    /// Most recent sample.
    #[must_use]
    pub fn last_point(&self) -> Option<Coordinate> {
        self.path.last()
    }

    /// Last status message produced by the recorder.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Subscribes to `source` and starts a fresh path.
    ///
    /// Calling this while already recording does nothing and returns
    /// [`StartOutcome::AlreadyRecording`].
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] if the source cannot be subscribed to; the
    /// recorder stays idle and the path is untouched.
    pub fn start(&mut self, source: &dyn PositionSource) -> Result<StartOutcome, StreamError> {
        if self.is_recording() {
            log::debug!("Recording already active, ignoring start");
            return Ok(StartOutcome::AlreadyRecording);
        }

        let stream = source.watch(&self.options).inspect_err(|e| {
            log::warn!("Cannot start recording: {e}");
            self.status = e.to_string();
        })?;

        self.path.clear();
        self.subscription = Some(stream);
        self.status = "Recording path... Walk around the area.".to_string();
        self.progress.set_position(0);
        self.progress.set_message("Recording path".to_string());
        log::info!("Recording started");

        Ok(StartOutcome::Started)
    }

    /// Unsubscribes and reports the number of captured points.
    ///
    /// Stopping an idle recorder is a no-op.
    pub fn stop(&mut self) -> usize {
        if self.subscription.take().is_some() {
            let count = self.path.len();
            self.status = format!("Recording stopped. Captured {count} points.");
            self.progress.finish(self.status.clone());
            log::info!("Recording stopped with {count} points");
        }
        self.path.len()
    }

    /// Empties the path.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Recording`] while a recording is active.
    pub fn clear(&mut self) -> Result<(), RecorderError> {
        if self.is_recording() {
            return Err(RecorderError::Recording);
        }
        self.path.clear();
        Ok(())
    }

    /// Replaces the path, e.g. with an existing place's stored boundary.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Recording`] while a recording is active.
    pub fn load(&mut self, path: BoundaryPath) -> Result<(), RecorderError> {
        if self.is_recording() {
            return Err(RecorderError::Recording);
        }
        self.path = path;
        Ok(())
    }

    /// Waits for the next sample and appends it.
    ///
    /// Returns `None` when idle or when the source ends the stream (which
    /// also stops the recording). A stream error, or no sample within the
    /// watch timeout, stops the recording and is returned.
    pub async fn pump(&mut self) -> Option<Result<Coordinate, StreamError>> {
        let timeout = self.options.timeout;
        let next = {
            let stream = self.subscription.as_mut()?;
            tokio::time::timeout(timeout, stream.next()).await
        };

        match next {
            Ok(Some(sample)) => Some(self.accept(sample)),
            Ok(None) => {
                log::debug!("Position stream ended");
                self.stop();
                None
            }
            Err(_) => Some(self.accept(Err(PositionError::new(
                PositionErrorCode::Timeout,
                format!("no position within {timeout:?}"),
            )))),
        }
    }

    /// Appends every sample that is already available without waiting.
    ///
    /// Returns the number of samples appended.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] if a pending item was a stream error;
    /// samples before it are kept and recording stops.
    pub fn drain_pending(&mut self) -> Result<usize, StreamError> {
        let mut appended = 0;

        loop {
            let next = match self.subscription.as_mut() {
                Some(stream) => stream.next().now_or_never(),
                None => return Ok(appended),
            };

            match next {
                Some(Some(sample)) => {
                    self.accept(sample)?;
                    appended += 1;
                }
                Some(None) => {
                    self.stop();
                    return Ok(appended);
                }
                None => return Ok(appended),
            }
        }
    }

    /// Runs [`Self::pump`] until the stream ends or fails.
    ///
    /// # Errors
    ///
    /// Returns the [`StreamError`] that ended the recording, if any.
    pub async fn record_to_end(&mut self) -> Result<usize, StreamError> {
        while let Some(sample) = self.pump().await {
            sample?;
        }
        Ok(self.path.len())
    }

    /// Normalized preview projection of the current path.
    #[must_use]
    pub fn project(&self) -> Vec<ProjectedPoint> {
        projection::project(&self.path)
    }

    fn accept(
        &mut self,
        sample: Result<Coordinate, PositionError>,
    ) -> Result<Coordinate, StreamError> {
        match sample {
            Ok(point) => {
                self.path.push(point);
                self.progress.set_position(self.path.len() as u64);
                log::trace!("Sample {}: {point}", self.path.len());
                Ok(point)
            }
            Err(e) => {
                let err = StreamError::from(e);
                log::warn!("{err}");
                self.subscription = None;
                self.status = err.to_string();
                self.progress.finish(self.status.clone());
                Err(err)
            }
        }
    }
}

impl Drop for BoundaryRecorder {
    fn drop(&mut self) {
        if self.subscription.take().is_some() {
            log::debug!(
                "Recorder dropped while recording; unsubscribed after {} points",
                self.path.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::source::{ChannelPositionSource, UnavailablePositionSource};

    fn quick() -> WatchOptions {
        WatchOptions {
            timeout: Duration::from_millis(50),
            ..WatchOptions::default()
        }
    }

    #[tokio::test]
    async fn records_samples_in_order() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        assert_eq!(recorder.start(&source).unwrap(), StartOutcome::Started);
        assert_eq!(recorder.state(), RecorderState::Recording);

        feed.push(Coordinate::new(1.0, 2.0));
        feed.push(Coordinate::new(3.0, 4.0));
        assert!(recorder.pump().await.unwrap().is_ok());
        assert!(recorder.pump().await.unwrap().is_ok());

        assert_eq!(
            recorder.path().points(),
            &[Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)]
        );
        assert_eq!(recorder.last_point(), Some(Coordinate::new(3.0, 4.0)));

        assert_eq!(recorder.stop(), 2);
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(recorder.status(), "Recording stopped. Captured 2 points.");
        assert!(!feed.is_subscribed());
    }

    #[tokio::test]
    async fn second_start_is_a_noop() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        recorder.start(&source).unwrap();
        feed.push(Coordinate::new(1.0, 2.0));
        assert_eq!(recorder.drain_pending().unwrap(), 1);

        assert_eq!(
            recorder.start(&source).unwrap(),
            StartOutcome::AlreadyRecording
        );
        assert_eq!(feed.subscriptions(), 1);
        assert_eq!(recorder.point_count(), 1);

        feed.push(Coordinate::new(3.0, 4.0));
        assert_eq!(recorder.drain_pending().unwrap(), 1);
        assert_eq!(recorder.point_count(), 2);
    }

    #[tokio::test]
    async fn start_resets_previous_session() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        recorder.start(&source).unwrap();
        feed.push(Coordinate::new(1.0, 2.0));
        recorder.drain_pending().unwrap();
        recorder.stop();

        recorder.start(&source).unwrap();
        assert_eq!(recorder.point_count(), 0);
    }

    #[test]
    fn unavailable_source_keeps_recorder_idle() {
        let mut recorder = BoundaryRecorder::default();
        recorder
            .load(vec![Coordinate::new(1.0, 2.0)].into())
            .unwrap();

        let err = recorder.start(&UnavailablePositionSource).unwrap_err();
        assert!(matches!(err, StreamError::Unavailable { .. }));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(recorder.point_count(), 1);
        assert!(recorder.status().starts_with("Geolocation is not supported"));
    }

    #[tokio::test]
    async fn stream_error_stops_recording() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        recorder.start(&source).unwrap();
        feed.push(Coordinate::new(1.0, 2.0));
        feed.fail(PositionError::new(
            PositionErrorCode::PermissionDenied,
            "User denied Geolocation",
        ));

        assert!(recorder.pump().await.unwrap().is_ok());
        let err = recorder.pump().await.unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Position(_)));
        assert!(!recorder.is_recording());
        assert_eq!(recorder.point_count(), 1);
        assert_eq!(
            recorder.status(),
            "Error getting location: User denied Geolocation"
        );
        assert!(!feed.is_subscribed());
    }

    #[tokio::test]
    async fn silent_stream_times_out() {
        let (_feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        recorder.start(&source).unwrap();
        let err = recorder.pump().await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            StreamError::Position(PositionError {
                code: PositionErrorCode::Timeout,
                ..
            })
        ));
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn stream_end_stops_recording() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        recorder.start(&source).unwrap();
        feed.push(Coordinate::new(1.0, 2.0));
        feed.close();

        assert_eq!(recorder.record_to_end().await.unwrap(), 1);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let mut recorder = BoundaryRecorder::default();
        assert_eq!(recorder.stop(), 0);
        assert_eq!(recorder.status(), "");
    }

    #[tokio::test]
    async fn clear_is_refused_while_recording() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::new(quick());

        recorder.start(&source).unwrap();
        feed.push(Coordinate::new(1.0, 2.0));
        recorder.drain_pending().unwrap();

        assert_eq!(recorder.clear(), Err(RecorderError::Recording));
        recorder.stop();
        recorder.clear().unwrap();
        assert_eq!(recorder.point_count(), 0);
    }

    #[tokio::test]
    async fn drop_unsubscribes() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut recorder = BoundaryRecorder::default();
        recorder.start(&source).unwrap();
        assert!(feed.is_subscribed());

        drop(recorder);
        assert!(!feed.is_subscribed());
    }
}
