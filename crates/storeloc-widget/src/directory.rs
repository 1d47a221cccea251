//! The read-only location snapshot for one load cycle.

use std::collections::HashSet;

use storeloc_core::{Category, Location, LocationId};

/// Locations from the most recent successful load. Replaced wholesale on
/// each load, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    locations: Vec<Location>,
}

impl LocationDirectory {
    /// Build a directory from a fetched collection.
    ///
    /// Records with no identity get a positional one so they can still be
    /// selected. A record whose identity was already seen is dropped, so
    /// every identity names exactly one location.
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        let mut seen = HashSet::new();
        let locations = locations
            .into_iter()
            .enumerate()
            .filter_map(|(index, mut location)| {
                let id = match location.identity() {
                    Some(id) => id.clone(),
                    None => {
                        let id = LocationId::positional(index);
                        location.id = Some(id.clone());
                        id
                    }
                };
                if seen.insert(id.clone()) {
                    Some(location)
                } else {
                    tracing::warn!(id = %id, "dropping duplicate location identity");
                    None
                }
            })
            .collect();
        Self { locations }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    #[must_use]
    pub fn get(&self, id: &LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.has_identity(id))
    }

    #[must_use]
    pub fn contains(&self, id: &LocationId) -> bool {
        self.get(id).is_some()
    }

    /// Locations that can be placed on the map.
    pub fn plottable(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|l| l.is_plottable())
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(move |l| l.category == category)
    }

    /// Case-insensitive substring match over name, address and category.
    /// A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Location> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.locations.iter().collect();
        }
        self.locations
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&needle)
                    || l.address.to_lowercase().contains(&needle)
                    || l.category.label().contains(&needle)
            })
            .collect()
    }
}
