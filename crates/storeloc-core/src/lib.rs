//! Domain types shared by the store locator widget and its hosts.
//!
//! Nothing in this crate performs network I/O: it holds the location and
//! configuration model, the field-level merge rules for configuration
//! patches, and the environment-driven [`AppConfig`] for host processes.

pub mod app_config;
pub mod attributes;
pub mod config;
pub mod error;
pub mod hours;
pub mod location;
pub mod widget_config;

pub use app_config::{AppConfig, Environment};
pub use attributes::{load_attributes, AttributeEntry, AttributesFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use hours::BusinessHours;
pub use location::{Category, Location, LocationId};
pub use widget_config::{
    AccentColor, ConfigField, ConfigPatch, ExecutionContext, PlanTier, ViewMode,
    WidgetConfiguration, ZoomLevel,
};
