//! Great-circle distance and circular geofence membership.

use serde::{Deserialize, Serialize};

use crate::validation::{is_latitude, is_longitude};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_latitude(self.latitude) && is_longitude(self.longitude)
    }

    #[must_use]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Haversine great-circle distance in meters.
#[must_use]
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Strictly inside: a point exactly on the boundary is outside.
#[must_use]
pub fn is_inside(position: &Coordinate, center: &Coordinate, radius_meters: f64) -> bool {
    position.distance_to(center) < radius_meters
}

/// A circle around a stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl Geofence {
    #[must_use]
    pub fn new(center: Coordinate, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    #[must_use]
    pub fn contains(&self, position: &Coordinate) -> bool {
        is_inside(position, &self.center, self.radius_meters)
    }

    #[must_use]
    pub fn distance_from_center(&self, position: &Coordinate) -> f64 {
        position.distance_to(&self.center)
    }
}
