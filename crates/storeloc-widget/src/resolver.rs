//! Produces the single effective configuration and the current location set.
//!
//! Before the server load completes, host attributes merge into the
//! built-in defaults. The server load then replaces configuration and
//! locations wholesale. Anything arriving afterwards is a live update:
//! a field-level merge with no re-fetch.

use storeloc_core::{ConfigField, ConfigPatch, WidgetConfiguration};

use crate::client::{DataSource, WidgetPayload};
use crate::directory::LocationDirectory;
use crate::error::WidgetError;
use crate::platform::HostPlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerLoad {
    NotStarted,
    InFlight,
    Loaded,
    Failed,
}

/// Proof that a server load was started. Only one is ever issued per
/// resolver.
#[derive(Debug)]
pub struct LoadTicket {
    _private: (),
}

#[derive(Debug)]
pub struct ConfigResolver {
    active: WidgetConfiguration,
    directory: LocationDirectory,
    load: ServerLoad,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self {
            active: WidgetConfiguration::default(),
            directory: LocationDirectory::default(),
            load: ServerLoad::NotStarted,
        }
    }
}

impl ConfigResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the attributes read at mount.
    #[must_use]
    pub fn with_host_attributes(patch: &ConfigPatch) -> Self {
        let mut resolver = Self::default();
        resolver.apply_host_attributes(patch);
        resolver
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfiguration {
        &self.active
    }

    #[must_use]
    pub fn directory(&self) -> &LocationDirectory {
        &self.directory
    }

    #[must_use]
    pub fn load_state(&self) -> ServerLoad {
        self.load
    }

    #[must_use]
    pub fn has_server_config(&self) -> bool {
        self.load == ServerLoad::Loaded
    }

    /// The server load has resolved one way or the other.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self.load, ServerLoad::Loaded | ServerLoad::Failed)
    }

    /// Merge host attributes. Once server config is active this is the
    /// live-update path.
    pub fn apply_host_attributes(&mut self, patch: &ConfigPatch) -> Vec<ConfigField> {
        if self.has_server_config() {
            return self.apply_live_update(patch);
        }
        let changed = self.active.apply(patch);
        if !changed.is_empty() {
            tracing::debug!(fields = ?changed, "host attributes merged into pre-load config");
        }
        changed
    }

    /// Field-level merge into the current configuration. Returns the fields
    /// whose value changed.
    pub fn apply_live_update(&mut self, patch: &ConfigPatch) -> Vec<ConfigField> {
        let changed = self.active.apply(patch);
        if !changed.is_empty() {
            tracing::debug!(fields = ?changed, "live update applied");
        }
        changed
    }

    /// Start the server load. Returns `None` if one was already started.
    pub fn begin_server_load(&mut self) -> Option<LoadTicket> {
        if self.load != ServerLoad::NotStarted {
            return None;
        }
        self.load = ServerLoad::InFlight;
        Some(LoadTicket { _private: () })
    }

    /// Complete the server load. On success the configuration and location
    /// set are replaced wholesale; on failure both are left untouched and the
    /// error is handed back.
    ///
    /// # Errors
    ///
    /// Returns the load error unchanged.
    pub fn finish_server_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<WidgetPayload, WidgetError>,
    ) -> Result<(), WidgetError> {
        let LoadTicket { _private: () } = ticket;
        match result {
            Ok(payload) => {
                self.active = payload.config;
                self.directory = LocationDirectory::new(payload.locations);
                self.load = ServerLoad::Loaded;
                tracing::debug!(
                    locations = self.directory.len(),
                    plan = %self.active.premium_plan_name,
                    "server config loaded"
                );
                Ok(())
            }
            Err(e) => {
                self.load = ServerLoad::Failed;
                Err(e)
            }
        }
    }

    /// Run the whole load against `source`. A second call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; state is left as it was before the call.
    pub async fn load_from_server<D: DataSource>(
        &mut self,
        source: &D,
        platform: &HostPlatform,
    ) -> Result<(), WidgetError> {
        let Some(ticket) = self.begin_server_load() else {
            return Ok(());
        };
        let result = source.fetch_widget_data(platform).await;
        self.finish_server_load(ticket, result)
    }
}
