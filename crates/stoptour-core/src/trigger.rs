//! One-shot "visitor entered the stop" detection.
//!
//! A [`GeofenceTrigger`] lives for exactly one page view. It starts `Idle`,
//! becomes `Monitoring` once a position arrives, and moves to `Triggered` on
//! the first sample strictly inside the fence. `Triggered` is terminal: later
//! samples, including exit and re-entry, are ignored.

use serde::Serialize;

use crate::geofence::{Coordinate, Geofence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerState {
    Idle,
    Monitoring,
    Triggered,
}

/// Emitted once per session when the visitor first enters the fence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterEvent {
    pub position: Coordinate,
    pub distance_meters: f64,
    /// 1-based count of samples processed up to and including this one.
    pub sample_number: u64,
}

/// Per-session trigger state. Never persisted.
#[derive(Debug, Clone)]
pub struct GeofenceTrigger {
    fence: Geofence,
    state: TriggerState,
    last_position: Option<Coordinate>,
    samples_seen: u64,
}

impl GeofenceTrigger {
    #[must_use]
    pub fn new(fence: Geofence) -> Self {
        Self {
            fence,
            state: TriggerState::Idle,
            last_position: None,
            samples_seen: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    #[must_use]
    pub fn has_triggered(&self) -> bool {
        self.state == TriggerState::Triggered
    }

    #[must_use]
    pub fn last_position(&self) -> Option<Coordinate> {
        self.last_position
    }

    #[must_use]
    pub fn fence(&self) -> &Geofence {
        &self.fence
    }

    /// Feed one position sample. Returns the enter event the first time a
    /// sample lands inside the fence and `None` otherwise.
    ///
    /// Samples with out-of-range or non-finite coordinates are dropped without
    /// changing state.
    pub fn observe(&mut self, sample: Coordinate) -> Option<EnterEvent> {
        if self.state == TriggerState::Triggered {
            return None;
        }
        if !sample.is_valid() {
            tracing::warn!(
                latitude = sample.latitude,
                longitude = sample.longitude,
                "ignoring invalid position sample"
            );
            return None;
        }

        self.samples_seen += 1;
        self.last_position = Some(sample);

        let distance = self.fence.distance_from_center(&sample);
        if self.fence.contains(&sample) {
            self.state = TriggerState::Triggered;
            tracing::info!(
                distance_meters = distance,
                radius_meters = self.fence.radius_meters,
                sample = self.samples_seen,
                "visitor entered geofence"
            );
            return Some(EnterEvent {
                position: sample,
                distance_meters: distance,
                sample_number: self.samples_seen,
            });
        }

        self.state = TriggerState::Monitoring;
        tracing::trace!(distance_meters = distance, "position outside geofence");
        None
    }
}
