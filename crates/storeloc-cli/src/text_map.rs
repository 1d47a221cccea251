//! A map provider with no viewport: every action is written to the log.

use std::future::Future;

use storeloc_widget::{MapFocus, MapOptions, MapProvider, MapSurface, Marker, WidgetError};

pub(crate) struct TextMapProvider;

pub(crate) struct TextSurface {
    markers: usize,
}

impl MapProvider for TextMapProvider {
    type Surface = TextSurface;

    fn load(
        &self,
        options: MapOptions,
    ) -> impl Future<Output = Result<TextSurface, WidgetError>> + Send {
        tracing::info!(
            zoom = options.zoom.get(),
            center = ?options.center,
            accent = options.accent.as_str(),
            "map: viewport created"
        );
        async { Ok(TextSurface { markers: 0 }) }
    }
}

impl MapSurface for TextSurface {
    fn show_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.len();
        for marker in markers {
            tracing::info!(
                id = %marker.location_id,
                title = %marker.title,
                lat = marker.latitude,
                lng = marker.longitude,
                "map: marker"
            );
        }
    }

    fn focus(&mut self, focus: &MapFocus) {
        tracing::info!(
            id = %focus.location_id,
            lat = focus.latitude,
            lng = focus.longitude,
            zoom = focus.zoom,
            "map: focus"
        );
    }

    fn release(&mut self) {
        tracing::info!(markers = self.markers, "map: viewport released");
        self.markers = 0;
    }
}
