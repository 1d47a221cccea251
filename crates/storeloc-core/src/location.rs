//! Location records served by the combined data endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use crate::hours::BusinessHours;

/// Identity of a location, normalised to a string.
///
/// The endpoint sends identifiers as either JSON strings or numbers; numbers
/// are kept as their decimal text so `42` and `"42"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLocationId", into = "String")]
pub struct LocationId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocationId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawLocationId> for LocationId {
    fn from(raw: RawLocationId) -> Self {
        match raw {
            RawLocationId::Text(s) => Self(s.trim().to_string()),
            RawLocationId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<LocationId> for String {
    fn from(id: LocationId) -> Self {
        id.0
    }
}

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Identity for a record that arrived with neither id field set.
    #[must_use]
    pub fn positional(index: usize) -> Self {
        Self(format!("#{index}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Restaurant,
    Store,
    Office,
    Service,
    #[default]
    Other,
}

impl Category {
    /// Parse a category label; anything unrecognised is `Other`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "restaurant" => Self::Restaurant,
            "store" => Self::Store,
            "office" => Self::Office,
            "service" => Self::Service,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Store => "store",
            Self::Office => "office",
            Self::Service => "service",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Other, Self::from_label))
    }
}

/// A single point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LocationId>,
    /// Collection-level identifier; interchangeable with `id`.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<LocationId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hours: BusinessHours,
    #[serde(default)]
    pub category: Category,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub longitude: Option<f64>,
}

impl Location {
    /// The single logical identity of this record: the first non-empty of
    /// `id` and `_id`. All identity comparisons go through here.
    #[must_use]
    pub fn identity(&self) -> Option<&LocationId> {
        self.id
            .as_ref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.record_id.as_ref().filter(|id| !id.is_empty()))
    }

    #[must_use]
    pub fn has_identity(&self, id: &LocationId) -> bool {
        self.identity() == Some(id)
    }

    /// Coordinates when both are present and within range.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.filter(|v| v.is_finite() && (-90.0..=90.0).contains(v))?;
        let lng = self
            .longitude
            .filter(|v| v.is_finite() && (-180.0..=180.0).contains(v))?;
        Some((lat, lng))
    }

    /// Whether the location can be placed on the map. Unplottable locations
    /// still appear in the list view.
    #[must_use]
    pub fn is_plottable(&self) -> bool {
        self.coordinates().is_some()
    }
}

/// Treats an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a JSON number, a numeric string, or null/absent.
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
    }))
}
