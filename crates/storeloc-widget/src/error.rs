use storeloc_core::LocationId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("host platform initialization failed: {0}")]
    PlatformInit(String),

    #[error("map provider failed to load: {0}")]
    MapProvider(String),
}

/// An interaction the widget refused in its current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("widget is still loading")]
    NotSettled,

    #[error("widget is hidden")]
    Hidden,

    #[error("view toggle is not available while the header is hidden")]
    ToggleUnavailable,

    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    #[error("widget has been torn down")]
    Detached,
}
