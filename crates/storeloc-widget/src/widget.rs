//! The widget controller: owns the resolver, the view coordinator and the
//! entitlement decision, and turns events into state changes plus
//! [`Directive`]s for the runtime to carry out.
//!
//! Nothing in here awaits. Map loads and the notice timer are requested as
//! directives and come back as completion calls.

use storeloc_core::{ConfigField, ConfigPatch, ExecutionContext, Location, LocationId, ViewMode};

use crate::client::WidgetPayload;
use crate::entitlement::Entitlement;
use crate::error::{ViewError, WidgetError};
use crate::map::{MapLoadState, MapOptions, MapSurface};
use crate::render::{
    today, Frame, HeaderFrame, ListItem, MapFrame, EMPTY_MESSAGE, NO_MATCHES_MESSAGE,
};
use crate::resolver::{ConfigResolver, LoadTicket};
use crate::view::{ViewCoordinator, ViewPhase};

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    LoadMap { attempt: u64, options: MapOptions },
    ArmNoticeTimer { generation: u64 },
    CancelNoticeTimer,
}

pub struct Widget<S> {
    resolver: ConfigResolver,
    view: ViewCoordinator<S>,
    context: ExecutionContext,
    entitlement: Entitlement,
    notice_visible: bool,
    notice_generation: u64,
    search: String,
    last_error: Option<String>,
    torn_down: bool,
}

impl<S: MapSurface> Widget<S> {
    #[must_use]
    pub fn new(patch: &ConfigPatch, context: ExecutionContext) -> Self {
        Self {
            resolver: ConfigResolver::with_host_attributes(patch),
            view: ViewCoordinator::default(),
            context,
            entitlement: Entitlement::default(),
            notice_visible: false,
            notice_generation: 0,
            search: String::new(),
            last_error: None,
            torn_down: false,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    #[must_use]
    pub fn phase(&self) -> ViewPhase {
        if self.torn_down {
            ViewPhase::Hidden
        } else {
            self.view.phase()
        }
    }

    #[must_use]
    pub fn entitlement(&self) -> Entitlement {
        self.entitlement
    }

    #[must_use]
    pub fn notice_visible(&self) -> bool {
        self.notice_visible
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Start the single server load for this mount.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.torn_down {
            return None;
        }
        self.resolver.begin_server_load()
    }

    /// Host attribute change or live editor update.
    pub fn on_host_patch(&mut self, patch: &ConfigPatch) -> Vec<Directive> {
        if self.torn_down {
            return Vec::new();
        }
        let changed = self.resolver.apply_host_attributes(patch);
        let mut directives = Vec::new();
        if changed.contains(&ConfigField::DefaultView) {
            let mode = self.resolver.config().default_view;
            if let Some(attempt) = self.view.follow_default(mode) {
                directives.push(self.load_map(attempt));
            }
        }
        directives
    }

    /// The combined fetch resolved. The view always leaves `Loading` here,
    /// whatever the outcome.
    pub fn on_data_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<WidgetPayload, WidgetError>,
    ) -> Vec<Directive> {
        if self.torn_down {
            return Vec::new();
        }
        match self.resolver.finish_server_load(ticket, result) {
            Ok(()) => {
                let plan = self.resolver.config().premium_plan_name;
                self.entitlement = Entitlement::evaluate(plan, self.context);
                self.last_error = None;
                tracing::info!(
                    %plan,
                    context = %self.context,
                    suppressed = self.entitlement.suppressed,
                    notice = self.entitlement.show_notice,
                    "entitlement evaluated"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "widget data load failed, using last known config");
                self.entitlement = Entitlement::default();
                self.last_error = Some(e.to_string());
            }
        }

        let mut directives = Vec::new();
        let mode = self.resolver.config().default_view;
        if let Some(attempt) = self.view.settle(mode, self.entitlement.suppressed) {
            directives.push(self.load_map(attempt));
        }
        self.view.refresh_markers(self.resolver.directory());

        if self.entitlement.show_notice && self.view.phase() != ViewPhase::Hidden {
            self.notice_visible = true;
            self.notice_generation += 1;
            directives.push(Directive::ArmNoticeTimer {
                generation: self.notice_generation,
            });
        }
        directives
    }

    /// The map provider finished loading. A failure is contained: markers do
    /// not render and the list stays usable.
    pub fn on_map_loaded(&mut self, attempt: u64, result: Result<S, WidgetError>) {
        if self.torn_down {
            if let Ok(mut surface) = result {
                surface.release();
            }
            return;
        }
        let outcome = self.view.attach_surface(
            attempt,
            result,
            self.resolver.directory(),
            self.resolver.config(),
        );
        if let Err(e) = outcome {
            tracing::warn!(attempt, error = %e, "map provider failed, markers unavailable");
        }
    }

    /// Select a location by identity. Returns whether the map was focused.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] when the widget is not interactive or the id is
    /// unknown.
    pub fn select(&mut self, id: &LocationId) -> Result<bool, ViewError> {
        if self.torn_down {
            return Err(ViewError::Detached);
        }
        self.view
            .select(id, self.resolver.directory(), self.resolver.config())
    }

    /// # Errors
    ///
    /// Returns [`ViewError`] when the widget is not interactive or the header
    /// toggle is hidden.
    pub fn switch_view(&mut self, mode: ViewMode) -> Result<Vec<Directive>, ViewError> {
        if self.torn_down {
            return Err(ViewError::Detached);
        }
        let attempt = self.view.switch_view(mode, self.resolver.config())?;
        Ok(attempt
            .map(|attempt| self.load_map(attempt))
            .into_iter()
            .collect())
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.trim().to_string();
    }

    /// Manual dismissal. Cancels the auto-dismiss timer.
    pub fn dismiss_notice(&mut self) -> Vec<Directive> {
        if !self.notice_visible {
            return Vec::new();
        }
        self.notice_visible = false;
        vec![Directive::CancelNoticeTimer]
    }

    /// Timer expiry. Ignored unless it belongs to the current notice.
    pub fn expire_notice(&mut self, generation: u64) {
        if generation == self.notice_generation {
            self.notice_visible = false;
        }
    }

    /// Release the map surface and stop the notice. Later completions are
    /// no-ops.
    pub fn teardown(&mut self) -> Vec<Directive> {
        if self.torn_down {
            return Vec::new();
        }
        self.torn_down = true;
        self.notice_visible = false;
        self.view.release();
        tracing::debug!("widget torn down");
        vec![Directive::CancelNoticeTimer]
    }

    #[must_use]
    pub fn frame(&self) -> Frame {
        let config = self.resolver.config();
        match self.phase() {
            ViewPhase::Hidden => return Frame::hidden(),
            ViewPhase::Loading => return Frame::loading(config.primary_color.as_str().to_string()),
            ViewPhase::Map | ViewPhase::List => {}
        }

        let directory = self.resolver.directory();
        let day = today();
        let list: Vec<ListItem> = directory
            .search(&self.search)
            .into_iter()
            .filter_map(|location| {
                ListItem::from_location(location, day, self.view.is_selected(location))
            })
            .collect();

        let map = (self.view.phase() == ViewPhase::Map).then(|| MapFrame {
            markers: self.view.markers_shown(directory),
            zoom: config.map_zoom_level.get(),
            ready: self.view.map_state() == MapLoadState::Ready,
            failed: self.view.map_state() == MapLoadState::Failed,
        });

        Frame {
            phase: self.view.phase(),
            header: config.show_header.then(|| HeaderFrame {
                title: config.header_title.clone(),
                toggle_available: true,
            }),
            banner: config
                .show_widget_name
                .then(|| config.widget_name.clone()),
            accent: config.primary_color.as_str().to_string(),
            notice: self.notice_visible,
            empty_message: if directory.is_empty() {
                Some(EMPTY_MESSAGE)
            } else {
                list.is_empty().then_some(NO_MATCHES_MESSAGE)
            },
            list,
            map,
            selected: self.view.selected().cloned(),
            error: self.last_error.clone(),
        }
    }

    fn load_map(&self, attempt: u64) -> Directive {
        let config = self.resolver.config();
        Directive::LoadMap {
            attempt,
            options: MapOptions {
                zoom: config.map_zoom_level,
                center: self
                    .resolver
                    .directory()
                    .plottable()
                    .find_map(Location::coordinates),
                accent: config.primary_color.clone(),
            },
        }
    }
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
