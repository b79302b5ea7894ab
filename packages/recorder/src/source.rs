//! Position sources.
//!
//! A [`PositionSource`] hands out a [`PositionStream`] per subscription.
//! Samples are pushed by the source at whatever cadence the underlying
//! hardware provides; the stream is the only long-lived resource and
//! dropping it is how a subscriber unsubscribes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use place_mapper_place_models::Coordinate;
use tokio::sync::mpsc;

use crate::{PositionError, StreamError};

/// A live subscription: one item per position sample or stream error.
pub type PositionStream = BoxStream<'static, Result<Coordinate, PositionError>>;

/// Subscription options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Ask the source for its most accurate fix.
    pub high_accuracy: bool,
    /// Oldest cached reading the source may return. Zero means fresh
    /// readings only.
    pub maximum_age: Duration,
    /// Longest wait for any single sample before the stream is treated as
    /// failed.
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Something that can produce a continuous stream of positions.
pub trait PositionSource: Send + Sync {
    /// Starts a new subscription.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Unavailable`] if positioning is not
    /// available.
    fn watch(&self, options: &WatchOptions) -> Result<PositionStream, StreamError>;
}

/// A source that never has positioning available.
pub struct UnavailablePositionSource;

impl PositionSource for UnavailablePositionSource {
    fn watch(&self, _options: &WatchOptions) -> Result<PositionStream, StreamError> {
        Err(StreamError::Unavailable {
            message: "no positioning capability".to_string(),
        })
    }
}

type Sample = Result<Coordinate, PositionError>;

#[derive(Default)]
struct ChannelState {
    sender: Option<mpsc::UnboundedSender<Sample>>,
    subscriptions: usize,
}

/// A source fed by hand through a [`PositionFeed`].
///
/// Each `watch` opens a fresh channel and replaces any previous one, so
/// the feed always delivers to the latest subscriber.
#[derive(Clone, Default)]
pub struct ChannelPositionSource {
    state: Arc<Mutex<ChannelState>>,
}

/// Sending half of a [`ChannelPositionSource`].
#[derive(Clone)]
pub struct PositionFeed {
    state: Arc<Mutex<ChannelState>>,
}

impl ChannelPositionSource {
    /// Creates a source and the feed that pushes samples into it.
    #[must_use]
    pub fn channel() -> (PositionFeed, Self) {
        let source = Self::default();
        let feed = PositionFeed {
            state: source.state.clone(),
        };
        (feed, source)
    }
}

fn lock(state: &Mutex<ChannelState>) -> MutexGuard<'_, ChannelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PositionSource for ChannelPositionSource {
    fn watch(&self, _options: &WatchOptions) -> Result<PositionStream, StreamError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut state = lock(&self.state);
        state.sender = Some(tx);
        state.subscriptions += 1;

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|sample| (sample, rx))
        });

        Ok(stream.boxed())
    }
}

impl PositionFeed {
    /// Pushes a sample. Returns `false` if nobody is subscribed.
    pub fn push(&self, point: Coordinate) -> bool {
        self.send(Ok(point))
    }

    /// Pushes a stream error. Returns `false` if nobody is subscribed.
    pub fn fail(&self, error: PositionError) -> bool {
        self.send(Err(error))
    }

    /// Ends the current subscription from the source side.
    pub fn close(&self) {
        lock(&self.state).sender = None;
    }

    /// Whether a subscriber is currently listening.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        lock(&self.state)
            .sender
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Total number of subscriptions opened so far.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        lock(&self.state).subscriptions
    }

    fn send(&self, sample: Sample) -> bool {
        lock(&self.state)
            .sender
            .as_ref()
            .is_some_and(|tx| tx.send(sample).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PositionErrorCode;

    #[test]
    fn default_options_match_field_survey_settings() {
        let options = WatchOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.maximum_age, Duration::ZERO);
        assert_eq!(options.timeout, Duration::from_secs(30));
    }

    #[test]
    fn unavailable_source_refuses_to_watch() {
        let result = UnavailablePositionSource.watch(&WatchOptions::default());
        assert!(matches!(result, Err(StreamError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn feed_delivers_to_subscriber() {
        let (feed, source) = ChannelPositionSource::channel();
        assert!(!feed.push(Coordinate::new(1.0, 2.0)));

        let mut stream = source.watch(&WatchOptions::default()).unwrap();
        assert!(feed.is_subscribed());
        assert!(feed.push(Coordinate::new(1.0, 2.0)));
        assert!(feed.fail(PositionError::new(PositionErrorCode::Timeout, "slow")));

        assert_eq!(stream.next().await, Some(Ok(Coordinate::new(1.0, 2.0))));
        assert!(matches!(stream.next().await, Some(Err(_))));

        drop(stream);
        assert!(!feed.is_subscribed());
        assert_eq!(feed.subscriptions(), 1);
    }

    #[tokio::test]
    async fn close_ends_stream() {
        let (feed, source) = ChannelPositionSource::channel();
        let mut stream = source.watch(&WatchOptions::default()).unwrap();
        feed.close();
        assert_eq!(stream.next().await, None);
    }
}
