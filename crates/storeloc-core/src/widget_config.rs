//! Widget presentation settings and the partial patches that update them.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid regex")
});
static FUNCTIONAL_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:rgba?|hsla?)\([0-9.,%\s/+-]*\)$").expect("valid regex")
});
static NAMED_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]{3,32}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

impl ViewMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "map" => Some(Self::Map),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Subscription level of the site owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanTier {
    #[default]
    Free,
    Light,
    Business,
    BusinessPro,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [Self::Free, Self::Light, Self::Business, Self::BusinessPro];

    /// Case-insensitive parse. Unrecognised plan names are treated as free.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let folded: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "light" => Self::Light,
            "business" => Self::Business,
            "businesspro" => Self::BusinessPro,
            _ => Self::Free,
        }
    }

    #[must_use]
    pub fn is_free(self) -> bool {
        self == Self::Free
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Light => write!(f, "light"),
            Self::Business => write!(f, "business"),
            Self::BusinessPro => write!(f, "business-pro"),
        }
    }
}

/// Where the widget is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    Editor,
    Preview,
    #[default]
    Published,
}

impl ExecutionContext {
    pub const ALL: [ExecutionContext; 3] = [Self::Editor, Self::Preview, Self::Published];

    /// Accepts the host platform's `viewMode` values (`editor`, `preview`,
    /// `site`) plus `published`/`live`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "editor" => Some(Self::Editor),
            "preview" => Some(Self::Preview),
            "site" | "published" | "live" => Some(Self::Published),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authoring(self) -> bool {
        matches!(self, Self::Editor | Self::Preview)
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Editor => write!(f, "editor"),
            Self::Preview => write!(f, "preview"),
            Self::Published => write!(f, "published"),
        }
    }
}

/// Map zoom level, 1..=22.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 22;

    #[must_use]
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(12)
    }
}

impl From<ZoomLevel> for u8 {
    fn from(z: ZoomLevel) -> Self {
        z.0
    }
}

/// A CSS color value: hex, `rgb()`/`hsl()` functional form, or a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct AccentColor(String);

impl AccentColor {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let valid = HEX_COLOR.is_match(trimmed)
            || FUNCTIONAL_COLOR.is_match(trimmed)
            || NAMED_COLOR.is_match(trimmed);
        valid.then(|| Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        Self("#2563eb".to_string())
    }
}

impl From<AccentColor> for String {
    fn from(c: AccentColor) -> Self {
        c.0
    }
}

/// The canonical configuration fields. Host attributes and JSON patches are
/// both resolved onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    DefaultView,
    ShowHeader,
    HeaderTitle,
    MapZoomLevel,
    PrimaryColor,
    ShowWidgetName,
    WidgetName,
    PremiumPlanName,
}

impl ConfigField {
    pub const ALL: [ConfigField; 8] = [
        Self::DefaultView,
        Self::ShowHeader,
        Self::HeaderTitle,
        Self::MapZoomLevel,
        Self::PrimaryColor,
        Self::ShowWidgetName,
        Self::WidgetName,
        Self::PremiumPlanName,
    ];

    /// camelCase key used in JSON payloads.
    #[must_use]
    pub fn json_key(self) -> &'static str {
        match self {
            Self::DefaultView => "defaultView",
            Self::ShowHeader => "showHeader",
            Self::HeaderTitle => "headerTitle",
            Self::MapZoomLevel => "mapZoomLevel",
            Self::PrimaryColor => "primaryColor",
            Self::ShowWidgetName => "showWidgetName",
            Self::WidgetName => "widgetName",
            Self::PremiumPlanName => "premiumPlanName",
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.json_key())
    }
}

/// The effective configuration driving rendering.
///
/// Deserialising goes through [`ConfigPatch`] and fills every absent field
/// with its built-in default, so a server response is always a complete
/// replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ConfigPatch")]
pub struct WidgetConfiguration {
    pub default_view: ViewMode,
    pub show_header: bool,
    pub header_title: String,
    pub map_zoom_level: ZoomLevel,
    pub primary_color: AccentColor,
    pub show_widget_name: bool,
    pub widget_name: String,
    pub premium_plan_name: PlanTier,
}

impl Default for WidgetConfiguration {
    fn default() -> Self {
        Self {
            default_view: ViewMode::Map,
            show_header: true,
            header_title: "Our Locations".to_string(),
            map_zoom_level: ZoomLevel::default(),
            primary_color: AccentColor::default(),
            show_widget_name: false,
            widget_name: "Store Locator".to_string(),
            premium_plan_name: PlanTier::Free,
        }
    }
}

impl From<ConfigPatch> for WidgetConfiguration {
    fn from(patch: ConfigPatch) -> Self {
        let mut config = Self::default();
        config.apply(&patch);
        config
    }
}

impl WidgetConfiguration {
    /// Field-level merge: every field set in `patch` overwrites, every unset
    /// field keeps its current value. Returns the fields whose value changed.
    pub fn apply(&mut self, patch: &ConfigPatch) -> Vec<ConfigField> {
        let mut changed = Vec::new();
        let p = patch;
        merge_field(&mut self.default_view, p.default_view, ConfigField::DefaultView, &mut changed);
        merge_field(&mut self.show_header, p.show_header, ConfigField::ShowHeader, &mut changed);
        merge_field(
            &mut self.header_title,
            p.header_title.clone(),
            ConfigField::HeaderTitle,
            &mut changed,
        );
        merge_field(
            &mut self.map_zoom_level,
            p.map_zoom_level,
            ConfigField::MapZoomLevel,
            &mut changed,
        );
        merge_field(
            &mut self.primary_color,
            p.primary_color.clone(),
            ConfigField::PrimaryColor,
            &mut changed,
        );
        merge_field(
            &mut self.show_widget_name,
            p.show_widget_name,
            ConfigField::ShowWidgetName,
            &mut changed,
        );
        merge_field(
            &mut self.widget_name,
            p.widget_name.clone(),
            ConfigField::WidgetName,
            &mut changed,
        );
        merge_field(
            &mut self.premium_plan_name,
            p.premium_plan_name,
            ConfigField::PremiumPlanName,
            &mut changed,
        );
        changed
    }
}

fn merge_field<T: PartialEq>(
    slot: &mut T,
    value: Option<T>,
    field: ConfigField,
    changed: &mut Vec<ConfigField>,
) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            changed.push(field);
        }
    }
}

/// A partial configuration. Unset fields leave the target untouched.
///
/// Deserialisation is lenient per field: a value of the wrong shape is
/// dropped rather than failing the whole patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    #[serde(deserialize_with = "lenient::view_mode")]
    pub default_view: Option<ViewMode>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub show_header: Option<bool>,
    #[serde(deserialize_with = "lenient::text")]
    pub header_title: Option<String>,
    #[serde(deserialize_with = "lenient::zoom")]
    pub map_zoom_level: Option<ZoomLevel>,
    #[serde(deserialize_with = "lenient::color")]
    pub primary_color: Option<AccentColor>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub show_widget_name: Option<bool>,
    #[serde(deserialize_with = "lenient::text")]
    pub widget_name: Option<String>,
    #[serde(deserialize_with = "lenient::plan")]
    pub premium_plan_name: Option<PlanTier>,
}

impl ConfigPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parse a JSON object patch (the host `config` attribute).
    ///
    /// # Errors
    ///
    /// Returns the JSON error when `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Set one field from its textual attribute form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `raw` is not a valid value
    /// for `field`; the patch is left unchanged.
    pub fn set(&mut self, field: ConfigField, raw: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            field: field.json_key(),
            value: raw.to_string(),
        };
        match field {
            ConfigField::DefaultView => {
                self.default_view = Some(ViewMode::parse(raw).ok_or_else(invalid)?);
            }
            ConfigField::ShowHeader => {
                self.show_header = Some(parse_flag(raw).ok_or_else(invalid)?);
            }
            ConfigField::HeaderTitle => self.header_title = Some(raw.trim().to_string()),
            ConfigField::MapZoomLevel => {
                let level = raw
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(ZoomLevel::new)
                    .ok_or_else(invalid)?;
                self.map_zoom_level = Some(level);
            }
            ConfigField::PrimaryColor => {
                self.primary_color = Some(AccentColor::parse(raw).ok_or_else(invalid)?);
            }
            ConfigField::ShowWidgetName => {
                self.show_widget_name = Some(parse_flag(raw).ok_or_else(invalid)?);
            }
            ConfigField::WidgetName => self.widget_name = Some(raw.trim().to_string()),
            ConfigField::PremiumPlanName => self.premium_plan_name = Some(PlanTier::parse(raw)),
        }
        Ok(())
    }

    /// Overlay `other` onto `self`: fields set in `other` win.
    pub fn merge(&mut self, other: &ConfigPatch) {
        fn take<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }
        take(&mut self.default_view, other.default_view.as_ref());
        take(&mut self.show_header, other.show_header.as_ref());
        take(&mut self.header_title, other.header_title.as_ref());
        take(&mut self.map_zoom_level, other.map_zoom_level.as_ref());
        take(&mut self.primary_color, other.primary_color.as_ref());
        take(&mut self.show_widget_name, other.show_widget_name.as_ref());
        take(&mut self.widget_name, other.widget_name.as_ref());
        take(&mut self.premium_plan_name, other.premium_plan_name.as_ref());
    }
}

/// Boolean attribute forms. An attribute present with an empty value counts
/// as `true`, as with HTML boolean attributes.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

mod lenient {
    use super::{
        parse_flag, AccentColor, Deserialize, Deserializer, PlanTier, ViewMode, ZoomLevel,
    };

    fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub(super) fn view_mode<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ViewMode>, D::Error> {
        Ok(scalar(d)?.as_deref().and_then(ViewMode::parse))
    }

    pub(super) fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(scalar(d)?.as_deref().and_then(parse_flag))
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar(d)?.map(|s| s.trim().to_string()))
    }

    pub(super) fn zoom<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ZoomLevel>, D::Error> {
        Ok(scalar(d)?
            .and_then(|s| s.trim().parse::<u8>().ok())
            .and_then(ZoomLevel::new))
    }

    pub(super) fn color<'de, D: Deserializer<'de>>(d: D) -> Result<Option<AccentColor>, D::Error> {
        Ok(scalar(d)?.as_deref().and_then(AccentColor::parse))
    }

    pub(super) fn plan<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PlanTier>, D::Error> {
        Ok(scalar(d)?.as_deref().map(PlanTier::parse))
    }
}

#[cfg(test)]
#[path = "widget_config_test.rs"]
mod tests;
