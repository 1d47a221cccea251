//! Seam to the third-party map provider.
//!
//! The widget never draws a map itself. A [`MapProvider`] produces a
//! [`MapSurface`] asynchronously; the view coordinator owns that surface while
//! the map view is active and releases it when leaving.

use std::future::Future;

use storeloc_core::{AccentColor, Location, LocationId, ZoomLevel};

use crate::directory::LocationDirectory;
use crate::error::WidgetError;

/// Zoom used when focusing a selected location, unless the configured zoom
/// is already closer.
pub const FOCUS_ZOOM_LEVEL: u8 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location_id: LocationId,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Marker {
    #[must_use]
    pub fn for_location(location: &Location) -> Option<Self> {
        let (latitude, longitude) = location.coordinates()?;
        Some(Self {
            location_id: location.identity()?.clone(),
            title: location.name.clone(),
            latitude,
            longitude,
        })
    }
}

/// Markers for every plottable location in the directory.
#[must_use]
pub fn markers_for(directory: &LocationDirectory) -> Vec<Marker> {
    directory.plottable().filter_map(Marker::for_location).collect()
}

/// Pan/zoom to a location and activate its marker, as one action.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFocus {
    pub location_id: LocationId,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub zoom: ZoomLevel,
    /// First plottable location, if any.
    pub center: Option<(f64, f64)>,
    pub accent: AccentColor,
}

/// A live map viewport with its marker collection.
pub trait MapSurface: Send + 'static {
    /// Replace all markers.
    fn show_markers(&mut self, markers: &[Marker]);

    fn focus(&mut self, focus: &MapFocus);

    /// Tear down the viewport and its markers. Called exactly once.
    fn release(&mut self);
}

pub trait MapProvider: Send + Sync + 'static {
    type Surface: MapSurface;

    /// Load the provider script and create a viewport.
    fn load(
        &self,
        options: MapOptions,
    ) -> impl Future<Output = Result<Self::Surface, WidgetError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLoadState {
    Idle,
    Loading { attempt: u64 },
    Ready,
    Failed,
}

/// Guards map initialisation so that repeated triggers start at most one load.
#[derive(Debug)]
pub struct MapLoader {
    state: MapLoadState,
    attempts: u64,
}

impl Default for MapLoader {
    fn default() -> Self {
        Self {
            state: MapLoadState::Idle,
            attempts: 0,
        }
    }
}

impl MapLoader {
    #[must_use]
    pub fn state(&self) -> MapLoadState {
        self.state
    }

    /// Start a load unless one is in flight or a surface is already ready.
    /// Returns the attempt number to tag the completion with.
    pub fn request(&mut self) -> Option<u64> {
        match self.state {
            MapLoadState::Loading { .. } | MapLoadState::Ready => None,
            MapLoadState::Idle | MapLoadState::Failed => {
                self.attempts += 1;
                self.state = MapLoadState::Loading {
                    attempt: self.attempts,
                };
                Some(self.attempts)
            }
        }
    }

    /// Record a completion. Returns `false` for a stale attempt, which the
    /// caller must discard.
    pub fn complete(&mut self, attempt: u64, succeeded: bool) -> bool {
        if self.state != (MapLoadState::Loading { attempt }) {
            return false;
        }
        self.state = if succeeded {
            MapLoadState::Ready
        } else {
            MapLoadState::Failed
        };
        true
    }

    /// Forget the current surface or in-flight attempt.
    pub fn reset(&mut self) {
        self.state = MapLoadState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_request_while_loading_is_ignored() {
        let mut loader = MapLoader::default();
        assert_eq!(loader.request(), Some(1));
        assert_eq!(loader.request(), None);
        assert!(loader.complete(1, true));
        assert_eq!(loader.state(), MapLoadState::Ready);
        assert_eq!(loader.request(), None);
    }

    #[test]
    fn failed_load_can_be_retried() {
        let mut loader = MapLoader::default();
        let attempt = loader.request().unwrap();
        assert!(loader.complete(attempt, false));
        assert_eq!(loader.state(), MapLoadState::Failed);
        assert_eq!(loader.request(), Some(2));
    }

    #[test]
    fn stale_completion_is_rejected() {
        let mut loader = MapLoader::default();
        let first = loader.request().unwrap();
        loader.reset();
        let second = loader.request().unwrap();
        assert!(!loader.complete(first, true));
        assert!(loader.complete(second, true));
    }

    #[test]
    fn markers_skip_unplottable_locations() {
        let locations: Vec<Location> = serde_json::from_value(serde_json::json!([
            {"id": "a", "name": "A", "latitude": 1.0, "longitude": 2.0},
            {"id": "b", "name": "B"}
        ]))
        .unwrap();
        let markers = markers_for(&LocationDirectory::new(locations));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].location_id, LocationId::new("a"));
    }
}
