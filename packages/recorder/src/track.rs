//! Replays a recorded GPS track as a position source.
//!
//! Field teams often walk a perimeter with a standalone GPS logger and
//! export the track as CSV. [`TrackFilePositionSource`] feeds such a file
//! through the same subscription interface as a live receiver, one sample
//! per row, optionally paced at a fixed interval.
//!
//! The first two columns are latitude and longitude. A header row is
//! detected and skipped; rows whose coordinates do not parse are skipped
//! with a warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use place_mapper_place_models::Coordinate;

use crate::StreamError;
use crate::source::{PositionSource, PositionStream, WatchOptions};

/// Position source that replays a CSV track file.
#[derive(Debug, Clone)]
pub struct TrackFilePositionSource {
    path: PathBuf,
    interval: Option<Duration>,
}

impl TrackFilePositionSource {
    /// Creates a source for the track at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: None,
        }
    }

    /// Delays each sample by `interval` to mimic a live receiver.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// The track file being replayed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PositionSource for TrackFilePositionSource {
    fn watch(&self, _options: &WatchOptions) -> Result<PositionStream, StreamError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StreamError::Unavailable {
                message: format!("cannot open track {}: {e}", self.path.display()),
            })?;

        let samples = parse_track(&contents);
        log::info!(
            "Replaying {} samples from {}",
            samples.len(),
            self.path.display()
        );

        let samples = futures::stream::iter(samples.into_iter().map(Ok));

        Ok(match self.interval {
            Some(interval) => samples
                .then(move |sample| async move {
                    tokio::time::sleep(interval).await;
                    sample
                })
                .boxed(),
            None => samples.boxed(),
        })
    }
}

/// Parses `lat,lng` rows from CSV text.
#[must_use]
pub fn parse_track(contents: &str) -> Vec<Coordinate> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut points = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping unreadable track row {}: {e}", index + 1);
                continue;
            }
        };

        let lat = record.get(0).and_then(|s| s.parse::<f64>().ok());
        let lng = record.get(1).and_then(|s| s.parse::<f64>().ok());

        match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                points.push(Coordinate::new(lat, lng));
            }
            // Header row
            _ if index == 0 => {}
            _ => log::warn!("Skipping malformed track row {}", index + 1),
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_header() {
        let points = parse_track("lat,lng\n41.378, 60.358\n41.379,60.359\n");
        assert_eq!(
            points,
            vec![Coordinate::new(41.378, 60.358), Coordinate::new(41.379, 60.359)]
        );
    }

    #[test]
    fn parses_headerless_tracks_with_extra_columns() {
        let points = parse_track("41.378,60.358,2024-05-01T10:00:00Z\n41.379,60.359,\n");
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn skips_malformed_rows() {
        let points = parse_track("41.378,60.358\nnope,60.0\n41.380\n41.381,60.361\n");
        assert_eq!(
            points,
            vec![Coordinate::new(41.378, 60.358), Coordinate::new(41.381, 60.361)]
        );
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = TrackFilePositionSource::new("/nonexistent/track.csv");
        assert!(matches!(
            source.watch(&WatchOptions::default()),
            Err(StreamError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn replays_file_in_order() {
        let path = std::env::temp_dir().join("place_mapper_track_replay.csv");
        std::fs::write(&path, "lat,lng\n1.0,2.0\n3.0,4.0\n").unwrap();

        let source = TrackFilePositionSource::new(&path);
        let samples: Vec<_> = source
            .watch(&WatchOptions::default())
            .unwrap()
            .collect()
            .await;

        assert_eq!(
            samples,
            vec![Ok(Coordinate::new(1.0, 2.0)), Ok(Coordinate::new(3.0, 4.0))]
        );

        let _ = std::fs::remove_file(&path);
    }
}
