//! View state machine: `Loading`, `Map`, `List`, `Hidden`.
//!
//! Selection is held by identity and survives view switches, so the same
//! location is highlighted in the list and focused on the map.

use serde::Serialize;
use storeloc_core::{Location, LocationId, ViewMode, WidgetConfiguration};

use crate::directory::LocationDirectory;
use crate::error::{ViewError, WidgetError};
use crate::map::{markers_for, MapFocus, MapLoadState, MapLoader, MapSurface, FOCUS_ZOOM_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPhase {
    Loading,
    Map,
    List,
    Hidden,
}

impl From<ViewMode> for ViewPhase {
    fn from(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Map => Self::Map,
            ViewMode::List => Self::List,
        }
    }
}

impl std::fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Map => write!(f, "map"),
            Self::List => write!(f, "list"),
            Self::Hidden => write!(f, "hidden"),
        }
    }
}

pub struct ViewCoordinator<S> {
    phase: ViewPhase,
    selected: Option<LocationId>,
    user_switched: bool,
    surface: Option<S>,
    loader: MapLoader,
}

impl<S> Default for ViewCoordinator<S> {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Loading,
            selected: None,
            user_switched: false,
            surface: None,
            loader: MapLoader::default(),
        }
    }
}

impl<S: MapSurface> ViewCoordinator<S> {
    #[must_use]
    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    #[must_use]
    pub fn selected(&self) -> Option<&LocationId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn is_selected(&self, location: &Location) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|id| location.has_identity(id))
    }

    #[must_use]
    pub fn user_switched(&self) -> bool {
        self.user_switched
    }

    #[must_use]
    pub fn map_state(&self) -> MapLoadState {
        self.loader.state()
    }

    #[must_use]
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Markers currently placed on the viewport. Zero while the map is
    /// loading, after it failed, and outside the map view.
    #[must_use]
    pub fn markers_shown(&self, directory: &LocationDirectory) -> usize {
        if self.surface.is_some() {
            markers_for(directory).len()
        } else {
            0
        }
    }

    /// Leave `Loading`. Returns a map load attempt when the settled view is
    /// the map.
    pub fn settle(&mut self, mode: ViewMode, suppressed: bool) -> Option<u64> {
        if self.phase != ViewPhase::Loading {
            return None;
        }
        if suppressed {
            self.transition(ViewPhase::Hidden);
            return None;
        }
        self.enter(mode)
    }

    /// User-triggered switch. Keeps the selection.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] while loading, when hidden, or when the header
    /// (and with it the toggle) is not shown.
    pub fn switch_view(
        &mut self,
        mode: ViewMode,
        config: &WidgetConfiguration,
    ) -> Result<Option<u64>, ViewError> {
        self.ensure_interactive()?;
        if !config.show_header {
            return Err(ViewError::ToggleUnavailable);
        }
        self.user_switched = true;
        Ok(self.enter(mode))
    }

    /// Follow a changed default view, unless the user has already switched.
    pub fn follow_default(&mut self, mode: ViewMode) -> Option<u64> {
        if self.user_switched || !matches!(self.phase, ViewPhase::Map | ViewPhase::List) {
            return None;
        }
        self.enter(mode)
    }

    /// Select a location. In the map view this focuses the viewport once,
    /// provided the location has coordinates and the map is ready. Returns
    /// whether a focus action was issued.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] while loading, when hidden, or for an id that
    /// is not in the directory.
    pub fn select(
        &mut self,
        id: &LocationId,
        directory: &LocationDirectory,
        config: &WidgetConfiguration,
    ) -> Result<bool, ViewError> {
        self.ensure_interactive()?;
        let location = directory
            .get(id)
            .ok_or_else(|| ViewError::UnknownLocation(id.clone()))?;
        self.selected = Some(id.clone());
        if self.phase != ViewPhase::Map {
            return Ok(false);
        }
        Ok(self.focus(location, config))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Take a completed map load. The surface is kept only if it belongs to
    /// the current attempt and the map view is still active; otherwise it is
    /// released on the spot.
    pub fn attach_surface(
        &mut self,
        attempt: u64,
        result: Result<S, WidgetError>,
        directory: &LocationDirectory,
        config: &WidgetConfiguration,
    ) -> Result<(), WidgetError> {
        let accepted = self.loader.complete(attempt, result.is_ok());
        let mut surface = match result {
            Ok(surface) => surface,
            Err(e) => return if accepted { Err(e) } else { Ok(()) },
        };
        if !accepted || self.phase != ViewPhase::Map {
            tracing::debug!(attempt, "discarding stale map surface");
            surface.release();
            if accepted {
                self.loader.reset();
            }
            return Ok(());
        }

        surface.show_markers(&markers_for(directory));
        self.surface = Some(surface);

        let pending = self.selected.as_ref().and_then(|id| directory.get(id));
        if let Some(location) = pending {
            self.focus(location, config);
        }
        Ok(())
    }

    /// Re-place markers after the directory was replaced.
    pub fn refresh_markers(&mut self, directory: &LocationDirectory) {
        if let Some(surface) = self.surface.as_mut() {
            surface.show_markers(&markers_for(directory));
        }
        let stale = self
            .selected
            .as_ref()
            .is_some_and(|id| !directory.contains(id));
        if stale {
            self.selected = None;
        }
    }

    /// Release the viewport and markers. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        self.loader.reset();
    }

    fn ensure_interactive(&self) -> Result<(), ViewError> {
        match self.phase {
            ViewPhase::Loading => Err(ViewError::NotSettled),
            ViewPhase::Hidden => Err(ViewError::Hidden),
            ViewPhase::Map | ViewPhase::List => Ok(()),
        }
    }

    fn enter(&mut self, mode: ViewMode) -> Option<u64> {
        let next = ViewPhase::from(mode);
        if next == self.phase {
            return None;
        }
        if self.phase == ViewPhase::Map {
            self.release();
        }
        self.transition(next);
        if next == ViewPhase::Map {
            self.loader.request()
        } else {
            None
        }
    }

    fn transition(&mut self, next: ViewPhase) {
        tracing::debug!(from = %self.phase, to = %next, "view transition");
        self.phase = next;
    }

    fn focus(&mut self, location: &Location, config: &WidgetConfiguration) -> bool {
        let (Some(surface), Some((latitude, longitude)), Some(id)) = (
            self.surface.as_mut(),
            location.coordinates(),
            location.identity(),
        ) else {
            return false;
        };
        surface.focus(&MapFocus {
            location_id: id.clone(),
            latitude,
            longitude,
            zoom: config.map_zoom_level.get().max(FOCUS_ZOOM_LEVEL),
        });
        true
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
