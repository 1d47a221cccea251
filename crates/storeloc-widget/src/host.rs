//! Bridge between the embedding page and the widget.
//!
//! The adapter reads the host attributes once at mount, then forwards later
//! attribute changes to whoever subscribed. It never triggers a remount or a
//! re-fetch.

use storeloc_core::{AttributeEntry, ConfigField, ConfigPatch, ExecutionContext};
use tokio::sync::mpsc;

use crate::platform::HostPlatform;

/// What a host attribute name refers to, after alias folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAttribute {
    /// JSON-encoded partial configuration. Merged after all field attributes.
    Config,
    Instance,
    CompId,
    /// The host platform's execution context (`editor`, `preview`, `site`).
    ViewMode,
    Field(ConfigField),
}

impl HostAttribute {
    /// Resolve an attribute name. `map-zoom-level`, `mapzoomlevel`,
    /// `map_zoom_level` and `mapZoomLevel` all name the same field.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        let folded: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "config" => return Some(Self::Config),
            "instance" => return Some(Self::Instance),
            "compid" => return Some(Self::CompId),
            "viewmode" | "context" => return Some(Self::ViewMode),
            _ => {}
        }
        ConfigField::ALL
            .into_iter()
            .find(|field| field.json_key().eq_ignore_ascii_case(&folded))
            .map(Self::Field)
    }
}

/// Build the mount-time configuration patch. Field attributes apply in
/// document order (last write wins per field); the `config` JSON attribute
/// is merged last. Invalid values and malformed JSON are ignored.
#[must_use]
pub fn patch_from_attributes(attributes: &[AttributeEntry]) -> ConfigPatch {
    let mut patch = ConfigPatch::default();
    let mut config_json: Option<&str> = None;

    for attr in attributes {
        match HostAttribute::resolve(&attr.name) {
            Some(HostAttribute::Field(field)) => set_field(&mut patch, field, &attr.value),
            Some(HostAttribute::Config) => config_json = Some(attr.value.as_str()),
            _ => {}
        }
    }

    if let Some(json) = config_json.and_then(parse_config_json) {
        patch.merge(&json);
    }
    patch
}

/// The patch produced by one attribute change, if it touches configuration.
#[must_use]
pub fn patch_for_attribute(name: &str, value: &str) -> Option<ConfigPatch> {
    let patch = match HostAttribute::resolve(name)? {
        HostAttribute::Field(field) => {
            let mut patch = ConfigPatch::default();
            set_field(&mut patch, field, value);
            patch
        }
        HostAttribute::Config => parse_config_json(value)?,
        HostAttribute::Instance | HostAttribute::CompId | HostAttribute::ViewMode => return None,
    };
    (!patch.is_empty()).then_some(patch)
}

fn set_field(patch: &mut ConfigPatch, field: ConfigField, value: &str) {
    if let Err(e) = patch.set(field, value) {
        tracing::debug!(error = %e, "ignoring invalid attribute value");
    }
}

fn parse_config_json(raw: &str) -> Option<ConfigPatch> {
    match ConfigPatch::from_json(raw) {
        Ok(patch) => Some(patch),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed config attribute");
            None
        }
    }
}

/// Everything the widget needs from the host at mount.
#[derive(Debug, Clone)]
pub struct MountRequest {
    pub patch: ConfigPatch,
    pub context: ExecutionContext,
    pub platform: HostPlatform,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    LiveUpdate(ConfigPatch),
    Teardown,
}

/// The host element. Holds the current attribute set and at most one
/// subscriber.
#[derive(Debug, Default)]
pub struct HostAdapter {
    attributes: Vec<AttributeEntry>,
    page_url: Option<String>,
    mounted: bool,
    detached: bool,
    listener: Option<mpsc::UnboundedSender<HostEvent>>,
}

impl HostAdapter {
    #[must_use]
    pub fn new(page_url: Option<String>) -> Self {
        Self {
            page_url,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attributes(page_url: Option<String>, attributes: Vec<AttributeEntry>) -> Self {
        let mut host = Self::new(page_url);
        for attr in attributes {
            host.record(attr.name, attr.value);
        }
        host
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted && !self.detached
    }

    /// First attachment: read all recognised attributes once. Later calls
    /// return `None` so the load sequence is triggered exactly once.
    pub fn connect(&mut self) -> Option<MountRequest> {
        if self.mounted {
            return None;
        }
        self.mounted = true;

        let mut instance = None;
        let mut comp_id = None;
        let mut context = None;
        for attr in &self.attributes {
            match HostAttribute::resolve(&attr.name) {
                Some(HostAttribute::Instance) => instance = Some(attr.value.as_str()),
                Some(HostAttribute::CompId) => comp_id = Some(attr.value.as_str()),
                Some(HostAttribute::ViewMode) => {
                    context = ExecutionContext::parse(&attr.value).or(context);
                }
                _ => {}
            }
        }

        let request = MountRequest {
            patch: patch_from_attributes(&self.attributes),
            context: context.unwrap_or_default(),
            platform: HostPlatform::from_sources(instance, comp_id, self.page_url.as_deref()),
        };
        tracing::debug!(
            attributes = self.attributes.len(),
            context = %request.context,
            "host element connected"
        );
        Some(request)
    }

    /// Register the single listener for attribute changes and teardown.
    pub fn subscribe(&mut self, listener: mpsc::UnboundedSender<HostEvent>) {
        if self.listener.replace(listener).is_some() {
            tracing::warn!("replacing existing host listener");
        }
    }

    pub fn unsubscribe(&mut self) {
        self.listener = None;
    }

    /// An attribute was set on the host element. Before mount this only
    /// records the value; after mount configuration changes are forwarded as
    /// live updates.
    pub fn attribute_changed(&mut self, name: &str, value: &str) {
        self.record(name.to_string(), value.to_string());
        if !self.is_mounted() {
            return;
        }
        match HostAttribute::resolve(name) {
            Some(HostAttribute::Instance | HostAttribute::CompId | HostAttribute::ViewMode) => {
                tracing::debug!(name, "identity and context attributes are read at mount only");
            }
            Some(_) => {
                if let Some(patch) = patch_for_attribute(name, value) {
                    self.notify(HostEvent::LiveUpdate(patch));
                }
            }
            None => tracing::debug!(name, "ignoring unrecognised attribute"),
        }
    }

    /// Detach from the page: tell the listener to release everything, then
    /// drop it. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        if self.mounted {
            self.notify(HostEvent::Teardown);
        }
        self.unsubscribe();
    }

    /// Keep the attribute list in write order so that, across aliases, the
    /// most recently written spelling is applied last.
    fn record(&mut self, name: String, value: String) {
        self.attributes.retain(|a| a.name != name);
        self.attributes.push(AttributeEntry { name, value });
    }

    fn notify(&mut self, event: HostEvent) {
        let Some(listener) = self.listener.as_ref() else {
            return;
        };
        if listener.send(event).is_err() {
            tracing::debug!("host listener gone, unsubscribing");
            self.listener = None;
        }
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
