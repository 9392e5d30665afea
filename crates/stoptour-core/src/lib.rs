pub mod app_config;
pub mod blocks;
pub mod collection;
pub mod config;
pub mod error;
pub mod geofence;
pub mod page;
pub mod page_file;
pub mod session;
pub mod trigger;
pub mod validation;

pub use app_config::{AppConfig, Environment};
pub use blocks::{
    BlockKind, BlockPayload, ContentBlock, HowToGetFromBlock, ImageSliderBlock, LinkButton,
    LinkButtonBlock, LocationBlock, MapType, MediaBlock, MediaItem, MediaKind, OpeningTime,
    OpeningTimesBlock, Pin, PinColor, SocialLink, SocialMediaBlock, SocialPlatform, TextBlock,
};
pub use collection::BlockCollection;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{CollectionError, ConfigError};
pub use geofence::{distance_meters, is_inside, Coordinate, Geofence, EARTH_RADIUS_METERS};
pub use page::{StopPage, EDITABLE_FIELDS};
pub use page_file::{load_page, save_page, PageFormat};
pub use session::{
    AudioCue, AudioTrack, ChannelLocationSource, GeofenceSession, LocationSource, PositionFeed,
    SessionOutcome,
};
pub use trigger::{EnterEvent, GeofenceTrigger, TriggerState};
pub use validation::{FieldError, ValidationErrors};
