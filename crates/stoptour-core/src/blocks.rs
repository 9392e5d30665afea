//! Content block kinds for stop pages.
//!
//! A [`ContentBlock`] is an `id` and `order` plus one [`BlockPayload`] variant.
//! On the wire the payload is flattened next to `id`/`order` and discriminated
//! by `type`:
//!
//! ```json
//! { "id": "…", "order": 0, "type": "text", "content": "<p>Hello</p>" }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{
    has_visible_text, is_latitude, is_link_target, is_longitude, is_web_url, parse_clock_time,
    ValidationErrors,
};

/// The closed set of block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Text,
    Media,
    Location,
    HowToGetFrom,
    #[serde(rename = "links")]
    LinkButton,
    #[serde(rename = "social")]
    SocialMedia,
    OpeningTimes,
    ImageSlider,
}

impl BlockKind {
    pub const ALL: [BlockKind; 8] = [
        BlockKind::Text,
        BlockKind::Media,
        BlockKind::Location,
        BlockKind::HowToGetFrom,
        BlockKind::LinkButton,
        BlockKind::SocialMedia,
        BlockKind::OpeningTimes,
        BlockKind::ImageSlider,
    ];

    /// Wire name used as the `type` discriminant.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Media => "media",
            BlockKind::Location => "location",
            BlockKind::HowToGetFrom => "howToGetFrom",
            BlockKind::LinkButton => "links",
            BlockKind::SocialMedia => "social",
            BlockKind::OpeningTimes => "openingTimes",
            BlockKind::ImageSlider => "imageSlider",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = BlockKind::ALL.into_iter().map(BlockKind::as_str).collect();
                format!(
                    "unknown block type '{s}'; expected one of {}",
                    known.join(", ")
                )
            })
    }
}

/// One unit of page content.
///
/// `id` is assigned at creation and never changes. `order` is owned by the
/// page's [`BlockCollection`](crate::collection::BlockCollection), which keeps
/// it contiguous; it is not a stable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    id: String,
    order: usize,
    #[serde(flatten)]
    payload: BlockPayload,
}

impl ContentBlock {
    /// Build a structurally valid empty block of `kind` with a fresh id.
    ///
    /// Never fails. The skeleton has every required field present but may not
    /// pass [`ContentBlock::validate`] until an editor fills it in.
    #[must_use]
    pub fn empty(kind: BlockKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order: 0,
            payload: BlockPayload::empty(kind),
        }
    }

    /// Build a block with a caller-chosen id, mainly for fixtures and imports.
    #[must_use]
    pub fn with_id(id: impl Into<String>, payload: BlockPayload) -> Self {
        Self {
            id: id.into(),
            order: 0,
            payload,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.payload.kind()
    }

    #[must_use]
    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut BlockPayload {
        &mut self.payload
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    pub(crate) fn replace_payload(&mut self, payload: BlockPayload) {
        self.payload = payload;
    }

    /// Check every invariant for this block's kind.
    ///
    /// # Errors
    ///
    /// Returns every failing field, in field order. List fields report one
    /// error per offending row, carrying the row index.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.id.trim().is_empty() {
            errors.field("id", "block id must be non-empty");
        }
        self.payload.collect_errors(&mut errors);
        errors.into_result()
    }
}

/// Per-kind payload, discriminated by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockPayload {
    Text(TextBlock),
    Media(MediaBlock),
    Location(LocationBlock),
    HowToGetFrom(HowToGetFromBlock),
    #[serde(rename = "links")]
    LinkButton(LinkButtonBlock),
    #[serde(rename = "social")]
    SocialMedia(SocialMediaBlock),
    OpeningTimes(OpeningTimesBlock),
    ImageSlider(ImageSliderBlock),
}

impl BlockPayload {
    #[must_use]
    pub fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => BlockPayload::Text(TextBlock::default()),
            BlockKind::Media => BlockPayload::Media(MediaBlock::default()),
            BlockKind::Location => BlockPayload::Location(LocationBlock::default()),
            BlockKind::HowToGetFrom => BlockPayload::HowToGetFrom(HowToGetFromBlock::default()),
            BlockKind::LinkButton => BlockPayload::LinkButton(LinkButtonBlock::default()),
            BlockKind::SocialMedia => BlockPayload::SocialMedia(SocialMediaBlock::default()),
            BlockKind::OpeningTimes => BlockPayload::OpeningTimes(OpeningTimesBlock::default()),
            BlockKind::ImageSlider => BlockPayload::ImageSlider(ImageSliderBlock::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockPayload::Text(_) => BlockKind::Text,
            BlockPayload::Media(_) => BlockKind::Media,
            BlockPayload::Location(_) => BlockKind::Location,
            BlockPayload::HowToGetFrom(_) => BlockKind::HowToGetFrom,
            BlockPayload::LinkButton(_) => BlockKind::LinkButton,
            BlockPayload::SocialMedia(_) => BlockKind::SocialMedia,
            BlockPayload::OpeningTimes(_) => BlockKind::OpeningTimes,
            BlockPayload::ImageSlider(_) => BlockKind::ImageSlider,
        }
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        match self {
            BlockPayload::Text(b) => b.collect_errors(errors),
            BlockPayload::Media(b) => b.collect_errors(errors),
            BlockPayload::Location(b) => b.collect_errors(errors),
            BlockPayload::HowToGetFrom(b) => b.collect_errors(errors),
            BlockPayload::LinkButton(b) => b.collect_errors(errors),
            BlockPayload::SocialMedia(b) => b.collect_errors(errors),
            BlockPayload::OpeningTimes(b) => b.collect_errors(errors),
            BlockPayload::ImageSlider(b) => b.collect_errors(errors),
        }
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Rich-text markup from the editor.
    pub content: String,
}

impl TextBlock {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        if !has_visible_text(&self.content) {
            errors.field("content", "text content must not be empty");
        }
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    Audio,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBlock {
    pub items: Vec<MediaItem>,
}

impl MediaBlock {
    /// Append a blank image row for the editor to fill in.
    pub fn push_item(&mut self) -> &mut MediaItem {
        self.items.push(MediaItem::default());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn remove_item(&mut self, index: usize) -> Option<MediaItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        for (i, item) in self.items.iter().enumerate() {
            if !is_web_url(&item.url) {
                errors.item("items", i, "url must be an absolute http(s) URL");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapType {
    #[default]
    #[serde(rename = "Start Point")]
    StartPoint,
    #[serde(rename = "End Point")]
    EndPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBlock {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub map_type: MapType,
}

impl LocationBlock {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        if !is_latitude(self.latitude) {
            errors.field("latitude", "latitude must be within [-90, 90]");
        }
        if !is_longitude(self.longitude) {
            errors.field("longitude", "longitude must be within [-180, 180]");
        }
    }
}

// ---------------------------------------------------------------------------
// How to get from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinColor {
    #[default]
    Blue,
    Yellow,
    Green,
    Red,
    Purple,
    Orange,
}

/// A map marker owned by one [`HowToGetFromBlock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: PinColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Route geometry drawn by the editor: `null` or a JSON object (normally a
/// `GeoJSON` `FeatureCollection`). Anything else is rejected on load.
pub type RouteData = Option<serde_json::Map<String, serde_json::Value>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HowToGetFromBlock {
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    pub pins: Vec<Pin>,
    #[serde(default)]
    pub route_data: RouteData,
}

impl HowToGetFromBlock {
    /// Drop a new blue pin at the given position and return its id.
    pub fn add_pin(&mut self, latitude: f64, longitude: f64) -> String {
        let id = Uuid::new_v4().to_string();
        self.pins.push(Pin {
            id: id.clone(),
            latitude,
            longitude,
            color: PinColor::default(),
            label: None,
        });
        id
    }

    pub fn remove_pin(&mut self, index: usize) -> Option<Pin> {
        (index < self.pins.len()).then(|| self.pins.remove(index))
    }

    /// Returns `false` if there is no pin at `index`.
    pub fn set_pin_color(&mut self, index: usize, color: PinColor) -> bool {
        match self.pins.get_mut(index) {
            Some(pin) => {
                pin.color = color;
                true
            }
            None => false,
        }
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        for (i, pin) in self.pins.iter().enumerate() {
            if pin.id.trim().is_empty() {
                errors.item("pins", i, "pin id must be non-empty");
            }
            if !is_latitude(pin.latitude) {
                errors.item("pins", i, "pin latitude must be within [-90, 90]");
            }
            if !is_longitude(pin.longitude) {
                errors.item("pins", i, "pin longitude must be within [-180, 180]");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Link buttons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButtonBlock {
    pub title: String,
    pub buttons: Vec<LinkButton>,
}

impl LinkButtonBlock {
    pub fn push_button(&mut self, text: impl Into<String>, url: impl Into<String>) {
        self.buttons.push(LinkButton {
            text: text.into(),
            url: url.into(),
        });
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        for (i, button) in self.buttons.iter().enumerate() {
            if button.text.trim().is_empty() {
                errors.item("buttons", i, "button text must be non-empty");
            }
            if !is_link_target(&button.url) {
                errors.item(
                    "buttons",
                    i,
                    "button url must be an absolute http(s) URL or a site path starting with '/'",
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Social media
// ---------------------------------------------------------------------------

/// Platforms the editor offers. New rows start as `Website`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialPlatform {
    Facebook,
    Twitter,
    Instagram,
    #[default]
    Website,
}

impl SocialPlatform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::Website => "Website",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: SocialPlatform,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMediaBlock {
    pub links: Vec<SocialLink>,
}

impl SocialMediaBlock {
    pub fn push_link(&mut self) -> &mut SocialLink {
        self.links.push(SocialLink::default());
        let last = self.links.len() - 1;
        &mut self.links[last]
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        for (i, link) in self.links.iter().enumerate() {
            if !is_web_url(&link.url) {
                errors.item("links", i, "url must be an absolute http(s) URL");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Opening times
// ---------------------------------------------------------------------------

pub const WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningTime {
    pub day: String,
    /// `HH:MM`, 24-hour.
    #[serde(alias = "opens")]
    pub open: String,
    /// `HH:MM`, 24-hour.
    #[serde(alias = "closes")]
    pub close: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningTimesBlock {
    pub times: Vec<OpeningTime>,
}

impl OpeningTimesBlock {
    /// Append an entry for the next weekday (cycling Monday..Sunday by entry
    /// count) with blank times.
    pub fn push_entry(&mut self) -> &mut OpeningTime {
        let day = WEEK_DAYS[self.times.len() % WEEK_DAYS.len()];
        self.times.push(OpeningTime {
            day: day.to_string(),
            open: String::new(),
            close: String::new(),
        });
        let last = self.times.len() - 1;
        &mut self.times[last]
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) {
        for (i, entry) in self.times.iter().enumerate() {
            if entry.day.trim().is_empty() {
                errors.item("times", i, "day must be non-empty");
            }
            let open = parse_clock_time(&entry.open);
            let close = parse_clock_time(&entry.close);
            if open.is_none() {
                errors.item("times", i, "open must be a 24-hour HH:MM time");
            }
            if close.is_none() {
                errors.item("times", i, "close must be a 24-hour HH:MM time");
            }
            // Well-formed HH:MM strings order lexicographically.
            if open.is_some() && close.is_some() && entry.open >= entry.close {
                errors.item(
                    "times",
                    i,
                    format!(
                        "{}: open ({}) must be before close ({})",
                        entry.day, entry.open, entry.close
                    ),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Image slider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ImageSliderRepr")]
pub struct ImageSliderBlock {
    pub images: Vec<String>,
}

/// Accepted on load: the `images` list, or the older fixed pair of
/// `imageUrl1`/`imageUrl2`. Blank slots in the pair are dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImageSliderRepr {
    List {
        images: Vec<String>,
    },
    Pair {
        #[serde(rename = "imageUrl1")]
        first: String,
        #[serde(rename = "imageUrl2")]
        second: String,
    },
}

impl From<ImageSliderRepr> for ImageSliderBlock {
    fn from(repr: ImageSliderRepr) -> Self {
        let images = match repr {
            ImageSliderRepr::List { images } => images,
            ImageSliderRepr::Pair { first, second } => [first, second]
                .into_iter()
                .filter(|url| !url.trim().is_empty())
                .collect(),
        };
        Self { images }
    }
}

impl ImageSliderBlock {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        for (i, url) in self.images.iter().enumerate() {
            if url.trim().is_empty() {
                errors.item("images", i, "image url must be non-empty");
            }
        }
    }
}

#[cfg(test)]
#[path = "blocks_test.rs"]
mod tests;
