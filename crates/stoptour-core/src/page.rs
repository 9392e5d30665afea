//! The stop page aggregate: scalar page fields, the geofence around the stop,
//! and the page's ordered content blocks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::blocks::{BlockKind, BlockPayload, ContentBlock};
use crate::collection::BlockCollection;
use crate::error::CollectionError;
use crate::geofence::{Coordinate, Geofence};
use crate::session::{AudioTrack, GeofenceSession};
use crate::trigger::GeofenceTrigger;
use crate::validation::{is_latitude, is_longitude, is_web_url, ValidationErrors};

/// Document keys that may be patched without touching the block list.
pub const EDITABLE_FIELDS: [&str; 9] = [
    "title",
    "description",
    "heroImageUrl",
    "audioFileUrl",
    "audioFileTitle",
    "audioGraphicUrl",
    "latitude",
    "longitude",
    "geoFenceRadius",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hero_image_url: String,
    #[serde(default)]
    pub audio_file_url: String,
    #[serde(default)]
    pub audio_file_title: String,
    /// Artwork shown behind the play button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_graphic_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Trigger radius in meters.
    pub geo_fence_radius: f64,
    #[serde(default)]
    content_blocks: BlockCollection,
}

impl StopPage {
    /// A fresh page with a generated id and no blocks.
    #[must_use]
    pub fn new(title: impl Into<String>, center: Coordinate, radius_meters: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            hero_image_url: String::new(),
            audio_file_url: String::new(),
            audio_file_title: String::new(),
            audio_graphic_url: None,
            latitude: center.latitude,
            longitude: center.longitude,
            geo_fence_radius: radius_meters,
            content_blocks: BlockCollection::new(),
        }
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn set_center(&mut self, center: Coordinate) {
        self.latitude = center.latitude;
        self.longitude = center.longitude;
    }

    #[must_use]
    pub fn geofence(&self) -> Geofence {
        Geofence::new(self.center(), self.geo_fence_radius)
    }

    /// The track to play on arrival, if the page has one.
    #[must_use]
    pub fn audio_track(&self) -> Option<AudioTrack> {
        if self.audio_file_url.trim().is_empty() {
            return None;
        }
        Some(AudioTrack {
            url: self.audio_file_url.clone(),
            title: self.audio_file_title.clone(),
            graphic_url: self.audio_graphic_url.clone(),
        })
    }

    /// Fresh trigger state for one page view.
    #[must_use]
    pub fn start_trigger(&self) -> GeofenceTrigger {
        GeofenceTrigger::new(self.geofence())
    }

    /// A session for one page view, or `None` when there is no audio to play.
    #[must_use]
    pub fn start_session(&self) -> Option<GeofenceSession> {
        self.audio_track()
            .map(|track| GeofenceSession::new(self.id.clone(), self.geofence(), track))
    }

    // -- blocks -------------------------------------------------------------

    #[must_use]
    pub fn blocks(&self) -> &BlockCollection {
        &self.content_blocks
    }

    pub fn add_block(&mut self, kind: BlockKind) -> &ContentBlock {
        self.content_blocks.add(kind)
    }

    /// # Errors
    ///
    /// See [`BlockCollection::insert`].
    pub fn insert_block(&mut self, block: ContentBlock) -> Result<&ContentBlock, CollectionError> {
        self.content_blocks.insert(block)
    }

    /// # Errors
    ///
    /// See [`BlockCollection::update`].
    pub fn update_block(&mut self, id: &str, payload: BlockPayload) -> Result<(), CollectionError> {
        self.content_blocks.update(id, payload)
    }

    /// # Errors
    ///
    /// See [`BlockCollection::remove`].
    pub fn remove_block(&mut self, id: &str) -> Result<ContentBlock, CollectionError> {
        self.content_blocks.remove(id)
    }

    /// # Errors
    ///
    /// See [`BlockCollection::reorder`].
    pub fn reorder_block(&mut self, id: &str, new_index: usize) -> Result<(), CollectionError> {
        self.content_blocks.reorder(id, new_index)
    }

    // -- persistence --------------------------------------------------------

    /// Check page-level fields and every block before the page is stored.
    ///
    /// # Errors
    ///
    /// Returns every page-level error followed by every block error in
    /// display order. Block errors carry the block's id and position.
    pub fn validate_for_save(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.id.trim().is_empty() {
            errors.field("id", "page id must be non-empty");
        }
        if self.title.trim().is_empty() {
            errors.field("title", "title must be non-empty");
        }
        if !is_latitude(self.latitude) {
            errors.field("latitude", "latitude must be between -90 and 90");
        }
        if !is_longitude(self.longitude) {
            errors.field("longitude", "longitude must be between -180 and 180");
        }
        if !(self.geo_fence_radius.is_finite() && self.geo_fence_radius > 0.0) {
            errors.field("geoFenceRadius", "geofence radius must be greater than 0");
        }
        check_optional_url(&mut errors, "heroImageUrl", &self.hero_image_url);
        check_optional_url(&mut errors, "audioFileUrl", &self.audio_file_url);
        if let Some(url) = &self.audio_graphic_url {
            check_optional_url(&mut errors, "audioGraphicUrl", url);
        }

        for block in &self.content_blocks {
            if let Err(block_errors) = block.validate() {
                errors.extend_for_block(block.id(), block.order(), block_errors);
            }
        }

        errors.into_result()
    }

    /// Flat JSON document as handed to the document store.
    ///
    /// # Errors
    ///
    /// Propagates any `serde_json` serialization failure.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// # Errors
    ///
    /// Returns a deserialization error for missing required fields, unknown
    /// block types, wrong field types, or duplicate block ids.
    pub fn from_document(document: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document)
    }
}

fn check_optional_url(errors: &mut ValidationErrors, field: &str, url: &str) {
    if !url.is_empty() && !is_web_url(url) {
        errors.field(field, "must be an absolute http(s) URL");
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
