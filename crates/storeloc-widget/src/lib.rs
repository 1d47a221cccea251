//! The store locator widget engine.
//!
//! A host element ([`HostAdapter`]) is mounted with [`mount`], which starts a
//! single runtime task. That task fetches configuration and locations once,
//! gates rendering on the plan tier, drives the map/list view state machine
//! and publishes a [`Frame`] after every event.

pub mod client;
pub mod directory;
pub mod entitlement;
pub mod error;
pub mod host;
pub mod loader;
pub mod map;
pub mod platform;
pub mod render;
pub mod resolver;
pub mod runtime;
pub mod view;
pub mod widget;

pub use client::{DataClient, DataSource, WidgetPayload};
pub use directory::LocationDirectory;
pub use entitlement::{Entitlement, NoticeTimer, DEFAULT_NOTICE_DURATION};
pub use error::{ViewError, WidgetError};
pub use host::{patch_for_attribute, patch_from_attributes, HostAdapter, HostAttribute, HostEvent};
pub use loader::{manifest_url, resolve_bundle, BundleAssets, Manifest, FALLBACK_VERSION};
pub use map::{
    MapFocus, MapLoadState, MapLoader, MapOptions, MapProvider, MapSurface, Marker,
    FOCUS_ZOOM_LEVEL,
};
pub use platform::HostPlatform;
pub use render::{Frame, HeaderFrame, ListItem, MapFrame, EMPTY_MESSAGE, NO_MATCHES_MESSAGE};
pub use resolver::{ConfigResolver, LoadTicket, ServerLoad};
pub use runtime::{mount, WidgetDeps, WidgetHandle};
pub use view::{ViewCoordinator, ViewPhase};
pub use widget::{Directive, Widget};
