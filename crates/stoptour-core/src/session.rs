//! Page-view lifetime for geofence monitoring.
//!
//! A [`GeofenceSession`] is created when a visitor opens a stop page and
//! consumed by [`GeofenceSession::run`]. Samples from the [`LocationSource`]
//! are handled one at a time on the running task, in arrival order, so a burst
//! of inside-radius samples still plays the audio cue once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

use crate::geofence::{Coordinate, Geofence};
use crate::trigger::{EnterEvent, GeofenceTrigger, TriggerState};

/// A device or service that yields position fixes.
///
/// Having no fix is not an error: the receiver simply stays quiet.
pub trait LocationSource {
    fn subscribe(&mut self) -> mpsc::Receiver<Coordinate>;
    fn unsubscribe(&mut self);
}

/// The audio player that reacts to the enter event.
pub trait AudioCue {
    fn play(&self, track: &AudioTrack, event: &EnterEvent);
}

/// What to play when the visitor arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub url: String,
    pub title: String,
    pub graphic_url: Option<String>,
}

type SenderSlot = Arc<Mutex<Option<mpsc::Sender<Coordinate>>>>;

fn lock_slot(slot: &SenderSlot) -> MutexGuard<'_, Option<mpsc::Sender<Coordinate>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process [`LocationSource`] backed by a bounded channel.
#[derive(Debug)]
pub struct ChannelLocationSource {
    buffer: usize,
    slot: SenderSlot,
}

/// Producer side of a [`ChannelLocationSource`].
#[derive(Debug, Clone)]
pub struct PositionFeed {
    slot: SenderSlot,
}

impl ChannelLocationSource {
    /// `buffer` is the channel capacity; values below 1 are raised to 1.
    #[must_use]
    pub fn new(buffer: usize) -> (Self, PositionFeed) {
        let slot: SenderSlot = Arc::new(Mutex::new(None));
        (
            Self {
                buffer: buffer.max(1),
                slot: Arc::clone(&slot),
            },
            PositionFeed { slot },
        )
    }
}

impl LocationSource for ChannelLocationSource {
    fn subscribe(&mut self) -> mpsc::Receiver<Coordinate> {
        let (tx, rx) = mpsc::channel(self.buffer);
        *lock_slot(&self.slot) = Some(tx);
        rx
    }

    fn unsubscribe(&mut self) {
        lock_slot(&self.slot).take();
    }
}

impl PositionFeed {
    /// Deliver a sample to the current subscriber, waiting for buffer space.
    ///
    /// Returns `false` when nobody is subscribed; the sample is dropped.
    pub async fn push(&self, sample: Coordinate) -> bool {
        let sender = lock_slot(&self.slot).clone();
        match sender {
            Some(tx) => tx.send(sample).await.is_ok(),
            None => false,
        }
    }

    /// Stop delivering samples. The subscriber sees the stream end once the
    /// buffer drains.
    pub fn close(&self) {
        lock_slot(&self.slot).take();
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The visitor entered the fence and the cue was played.
    Triggered {
        event: EnterEvent,
        triggered_at: DateTime<Utc>,
    },
    /// The page was closed before the visitor arrived.
    Closed { last_position: Option<Coordinate> },
    /// The location source stopped producing samples.
    SourceEnded { last_position: Option<Coordinate> },
}

pub struct GeofenceSession {
    page_id: String,
    trigger: GeofenceTrigger,
    track: AudioTrack,
}

impl GeofenceSession {
    #[must_use]
    pub fn new(page_id: impl Into<String>, fence: Geofence, track: AudioTrack) -> Self {
        Self {
            page_id: page_id.into(),
            trigger: GeofenceTrigger::new(fence),
            track,
        }
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.trigger.state()
    }

    /// Monitor positions until the visitor enters, the page closes
    /// (`shutdown` fires or its sender is dropped), or the source ends.
    ///
    /// Always unsubscribes from `source` before returning.
    pub async fn run<S, C>(
        mut self,
        source: &mut S,
        cue: &C,
        mut shutdown: oneshot::Receiver<()>,
    ) -> SessionOutcome
    where
        S: LocationSource,
        C: AudioCue,
    {
        tracing::debug!(page_id = %self.page_id, "geofence session started");
        let mut samples = source.subscribe();

        let outcome = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    break SessionOutcome::Closed {
                        last_position: self.trigger.last_position(),
                    };
                }
                sample = samples.recv() => {
                    let Some(sample) = sample else {
                        break SessionOutcome::SourceEnded {
                            last_position: self.trigger.last_position(),
                        };
                    };
                    if let Some(event) = self.trigger.observe(sample) {
                        cue.play(&self.track, &event);
                        break SessionOutcome::Triggered {
                            event,
                            triggered_at: Utc::now(),
                        };
                    }
                }
            }
        };

        source.unsubscribe();
        tracing::debug!(page_id = %self.page_id, ?outcome, "geofence session ended");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    #[derive(Default)]
    struct RecordingCue {
        plays: StdMutex<Vec<(String, EnterEvent)>>,
    }

    impl AudioCue for RecordingCue {
        fn play(&self, track: &AudioTrack, event: &EnterEvent) {
            self.plays.lock().unwrap().push((track.url.clone(), *event));
        }
    }

    fn session() -> GeofenceSession {
        GeofenceSession::new(
            "stop-1",
            Geofence::new(Coordinate::new(40.0, -74.0), 50.0),
            AudioTrack {
                url: "https://cdn.example.com/stop-1.mp3".to_string(),
                title: "Welcome".to_string(),
                graphic_url: None,
            },
        )
    }

    #[tokio::test]
    async fn burst_of_inside_samples_plays_once() {
        let (mut source, feed) = ChannelLocationSource::new(16);
        let cue = RecordingCue::default();
        let (_close_tx, close_rx) = oneshot::channel();

        let producer = {
            let feed = feed.clone();
            async move {
                // Let the session subscribe before pushing.
                tokio::task::yield_now().await;
                while !feed.push(Coordinate::new(40.01, -74.0)).await {
                    tokio::task::yield_now().await;
                }
                for _ in 0..10 {
                    feed.push(Coordinate::new(40.000_1, -74.0)).await;
                }
            }
        };

        let (outcome, ()) = tokio::join!(session().run(&mut source, &cue, close_rx), producer);

        match outcome {
            SessionOutcome::Triggered { event, .. } => assert_eq!(event.sample_number, 2),
            other => panic!("expected trigger, got {other:?}"),
        }
        let plays = cue.plays.lock().unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].0, "https://cdn.example.com/stop-1.mp3");
        assert!(!feed_is_subscribed(&feed));
    }

    #[tokio::test]
    async fn closing_the_page_ends_without_playing() {
        let (mut source, _feed) = ChannelLocationSource::new(4);
        let cue = RecordingCue::default();
        let (close_tx, close_rx) = oneshot::channel();
        close_tx.send(()).unwrap();

        let outcome = session().run(&mut source, &cue, close_rx).await;
        assert_eq!(
            outcome,
            SessionOutcome::Closed {
                last_position: None
            }
        );
        assert!(cue.plays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn source_ending_reports_last_position() {
        let (mut source, feed) = ChannelLocationSource::new(4);
        let cue = RecordingCue::default();
        let (_close_tx, close_rx) = oneshot::channel();

        let producer = async {
            tokio::task::yield_now().await;
            while !feed.push(Coordinate::new(40.01, -74.0)).await {
                tokio::task::yield_now().await;
            }
            feed.close();
        };

        let (outcome, ()) = tokio::join!(session().run(&mut source, &cue, close_rx), producer);
        assert_eq!(
            outcome,
            SessionOutcome::SourceEnded {
                last_position: Some(Coordinate::new(40.01, -74.0))
            }
        );
        assert!(cue.plays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn push_without_subscriber_is_dropped() {
        let (_source, feed) = ChannelLocationSource::new(4);
        assert!(!feed.push(Coordinate::new(0.0, 0.0)).await);
    }

    fn feed_is_subscribed(feed: &PositionFeed) -> bool {
        lock_slot(&feed.slot).is_some()
    }
}
