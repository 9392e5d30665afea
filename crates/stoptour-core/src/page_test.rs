use serde_json::json;

use super::*;
use crate::blocks::{
    LinkButtonBlock, LocationBlock, MediaBlock, MediaKind, OpeningTimesBlock, TextBlock,
};
use crate::trigger::TriggerState;

fn stop() -> StopPage {
    StopPage::new("Town Square", Coordinate::new(40.0, -74.0), 50.0)
}

/// A page where every block and page field is valid.
fn populated_stop() -> StopPage {
    let mut page = stop();
    page.description = "Where the market used to be.".to_string();
    page.hero_image_url = "https://cdn.example.com/square.jpg".to_string();
    page.audio_file_url = "https://cdn.example.com/square.mp3".to_string();
    page.audio_file_title = "The square".to_string();

    let text = page.add_block(BlockKind::Text).id().to_string();
    page.update_block(
        &text,
        BlockPayload::Text(TextBlock {
            content: "<p>Built in 1820.</p>".to_string(),
        }),
    )
    .unwrap();

    let media = page.add_block(BlockKind::Media).id().to_string();
    let mut media_payload = MediaBlock::default();
    let item = media_payload.push_item();
    item.kind = MediaKind::Video;
    item.url = "https://cdn.example.com/tour.mp4".to_string();
    page.update_block(&media, BlockPayload::Media(media_payload))
        .unwrap();

    let location = page.add_block(BlockKind::Location).id().to_string();
    page.update_block(
        &location,
        BlockPayload::Location(LocationBlock {
            latitude: 40.0,
            longitude: -74.0,
            address: "1 Main St".to_string(),
            ..LocationBlock::default()
        }),
    )
    .unwrap();

    let links = page.add_block(BlockKind::LinkButton).id().to_string();
    let mut link_payload = LinkButtonBlock::default();
    link_payload.push_button("Next stop", "/stops/harbour");
    page.update_block(&links, BlockPayload::LinkButton(link_payload))
        .unwrap();

    page
}

#[test]
fn new_page_is_empty_and_valid() {
    let page = stop();
    assert!(!page.id.is_empty());
    assert!(page.blocks().is_empty());
    assert!(page.audio_graphic_url.is_none());
    assert!(page.validate_for_save().is_ok());
}

#[test]
fn populated_page_is_valid() {
    let page = populated_stop();
    assert_eq!(page.blocks().len(), 4);
    assert!(page.validate_for_save().is_ok());
}

#[test]
fn validate_for_save_aggregates_page_and_block_errors() {
    let mut page = stop();
    page.title = "  ".to_string();
    page.geo_fence_radius = 0.0;
    page.latitude = 91.0;
    page.hero_image_url = "not a url".to_string();

    page.add_block(BlockKind::Text);
    let hours = page.add_block(BlockKind::OpeningTimes).id().to_string();
    let mut times = OpeningTimesBlock::default();
    let entry = times.push_entry();
    entry.open = "09:00".to_string();
    entry.close = "05:00".to_string();
    page.update_block(&hours, BlockPayload::OpeningTimes(times))
        .unwrap();

    let errors = page.validate_for_save().unwrap_err();
    let fields: Vec<(Option<usize>, &str)> = errors
        .errors()
        .iter()
        .map(|e| (e.block_position, e.field.as_str()))
        .collect();

    assert_eq!(
        fields,
        vec![
            (None, "title"),
            (None, "latitude"),
            (None, "geoFenceRadius"),
            (None, "heroImageUrl"),
            (Some(0), "content"),
            (Some(1), "times"),
        ]
    );
    let hours_error = &errors.errors()[5];
    assert_eq!(hours_error.block_id.as_deref(), Some(hours.as_str()));
    assert_eq!(hours_error.index, Some(0));
}

#[test]
fn negative_radius_is_rejected() {
    let mut page = stop();
    page.geo_fence_radius = -5.0;
    let errors = page.validate_for_save().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].field, "geoFenceRadius");
}

#[test]
fn document_is_flat_with_camel_case_keys() {
    let page = populated_stop();
    let doc = page.to_document().unwrap();

    for key in [
        "id",
        "title",
        "heroImageUrl",
        "audioFileUrl",
        "audioFileTitle",
        "latitude",
        "longitude",
        "geoFenceRadius",
        "contentBlocks",
    ] {
        assert!(doc.get(key).is_some(), "missing {key}");
    }
    assert!(doc.get("audioGraphicUrl").is_none());

    let first = &doc["contentBlocks"][0];
    assert_eq!(first["type"], "text");
    assert_eq!(first["order"], 0);
    assert_eq!(first["content"], "<p>Built in 1820.</p>");
    assert!(first.get("payload").is_none());
    assert_eq!(doc["contentBlocks"][3]["type"], "links");
}

#[test]
fn document_round_trip_is_identical() {
    let mut page = populated_stop();
    page.audio_graphic_url = Some("https://cdn.example.com/art.png".to_string());
    let doc = page.to_document().unwrap();
    let restored = StopPage::from_document(doc).unwrap();
    assert_eq!(restored, page);
    assert_eq!(restored.blocks().ids(), page.blocks().ids());
}

#[test]
fn from_document_fills_optional_fields() {
    let doc = json!({
        "id": "stop-7",
        "title": "Harbour",
        "latitude": 51.5,
        "longitude": -0.12,
        "geoFenceRadius": 25,
        "contentBlocks": [
            { "id": "b", "order": 3, "type": "text", "content": "second" },
            { "id": "a", "order": 1, "type": "text", "content": "first" }
        ]
    });
    let page = StopPage::from_document(doc).unwrap();
    assert_eq!(page.description, "");
    assert_eq!(page.hero_image_url, "");
    assert!(page.audio_track().is_none());
    assert_eq!(page.blocks().ids(), vec!["a", "b"]);
    assert!(page.blocks().orders_are_contiguous());
}

#[test]
fn from_document_rejects_unknown_block_type() {
    let doc = json!({
        "id": "stop-7",
        "title": "Harbour",
        "latitude": 51.5,
        "longitude": -0.12,
        "geoFenceRadius": 25,
        "contentBlocks": [{ "id": "a", "order": 0, "type": "carousel" }]
    });
    assert!(StopPage::from_document(doc).is_err());
}

#[test]
fn fifty_meter_fence_fires_on_second_sample() {
    let page = stop();
    let mut trigger = page.start_trigger();

    assert!(trigger.observe(Coordinate::new(40.01, -74.0)).is_none());
    assert_eq!(trigger.state(), TriggerState::Monitoring);

    let event = trigger.observe(Coordinate::new(40.000_1, -74.0)).unwrap();
    assert_eq!(event.sample_number, 2);
    assert!(trigger.observe(Coordinate::new(40.0, -74.0)).is_none());
}

#[test]
fn session_requires_audio() {
    let mut page = stop();
    assert!(page.start_session().is_none());
    page.audio_file_url = "https://cdn.example.com/a.mp3".to_string();
    let session = page.start_session().unwrap();
    assert_eq!(session.state(), TriggerState::Idle);
}

#[test]
fn block_operations_delegate_to_collection() {
    let mut page = populated_stop();
    let ids: Vec<String> = page
        .blocks()
        .ids()
        .iter()
        .map(ToString::to_string)
        .collect();

    page.reorder_block(&ids[3], 0).unwrap();
    assert_eq!(page.blocks().ids()[0], ids[3]);

    page.remove_block(&ids[1]).unwrap();
    assert_eq!(page.blocks().len(), 3);
    assert!(page.blocks().orders_are_contiguous());

    assert!(matches!(
        page.remove_block(&ids[1]),
        Err(CollectionError::BlockNotFound { .. })
    ));
}
