use serde_json::json;

use super::*;

#[test]
fn defaults_match_built_in_values() {
    let cfg = WidgetConfiguration::default();
    assert_eq!(cfg.default_view, ViewMode::Map);
    assert!(cfg.show_header);
    assert_eq!(cfg.header_title, "Our Locations");
    assert_eq!(cfg.map_zoom_level.get(), 12);
    assert_eq!(cfg.primary_color.as_str(), "#2563eb");
    assert!(!cfg.show_widget_name);
    assert_eq!(cfg.widget_name, "Store Locator");
    assert_eq!(cfg.premium_plan_name, PlanTier::Free);
}

#[test]
fn apply_keeps_fields_absent_from_patch() {
    let mut cfg = WidgetConfiguration {
        header_title: "Find us".to_string(),
        show_widget_name: true,
        ..WidgetConfiguration::default()
    };
    let patch = ConfigPatch {
        map_zoom_level: ZoomLevel::new(5),
        ..ConfigPatch::default()
    };
    let changed = cfg.apply(&patch);
    assert_eq!(changed, vec![ConfigField::MapZoomLevel]);
    assert_eq!(cfg.map_zoom_level.get(), 5);
    assert_eq!(cfg.header_title, "Find us");
    assert!(cfg.show_widget_name);
}

#[test]
fn apply_reports_only_real_changes() {
    let mut cfg = WidgetConfiguration::default();
    let patch = ConfigPatch {
        default_view: Some(ViewMode::Map),
        show_header: Some(false),
        ..ConfigPatch::default()
    };
    assert_eq!(cfg.apply(&patch), vec![ConfigField::ShowHeader]);
}

#[test]
fn server_config_missing_fields_fall_back_to_defaults() {
    let cfg: WidgetConfiguration =
        serde_json::from_value(json!({"defaultView": "list", "premiumPlanName": "free"})).unwrap();
    assert_eq!(cfg.default_view, ViewMode::List);
    assert_eq!(cfg.premium_plan_name, PlanTier::Free);
    assert_eq!(cfg.header_title, "Our Locations");
    assert_eq!(cfg.map_zoom_level.get(), 12);
}

#[test]
fn server_config_tolerates_wrong_shapes() {
    let cfg: WidgetConfiguration = serde_json::from_value(json!({
        "mapZoomLevel": "14",
        "showHeader": "false",
        "primaryColor": "not a color!",
        "defaultView": 7
    }))
    .unwrap();
    assert_eq!(cfg.map_zoom_level.get(), 14);
    assert!(!cfg.show_header);
    assert_eq!(cfg.primary_color, AccentColor::default());
    assert_eq!(cfg.default_view, ViewMode::Map);
}

#[test]
fn configuration_serializes_camel_case() {
    let value = serde_json::to_value(WidgetConfiguration::default()).unwrap();
    assert_eq!(value["defaultView"], "map");
    assert_eq!(value["mapZoomLevel"], 12);
    assert_eq!(value["premiumPlanName"], "free");
}

#[test]
fn plan_tier_parse_accepts_spellings() {
    assert_eq!(PlanTier::parse("business-pro"), PlanTier::BusinessPro);
    assert_eq!(PlanTier::parse("businessPro"), PlanTier::BusinessPro);
    assert_eq!(PlanTier::parse("Business_Pro"), PlanTier::BusinessPro);
    assert_eq!(PlanTier::parse("LIGHT"), PlanTier::Light);
    assert_eq!(PlanTier::parse("business"), PlanTier::Business);
    assert_eq!(PlanTier::parse("free"), PlanTier::Free);
}

#[test]
fn unknown_plan_tier_is_free() {
    assert_eq!(PlanTier::parse("platinum"), PlanTier::Free);
    assert_eq!(PlanTier::parse(""), PlanTier::Free);
}

#[test]
fn execution_context_parse() {
    assert_eq!(ExecutionContext::parse("Editor"), Some(ExecutionContext::Editor));
    assert_eq!(ExecutionContext::parse("preview"), Some(ExecutionContext::Preview));
    assert_eq!(ExecutionContext::parse("site"), Some(ExecutionContext::Published));
    assert_eq!(ExecutionContext::parse("live"), Some(ExecutionContext::Published));
    assert_eq!(ExecutionContext::parse("kiosk"), None);
}

#[test]
fn zoom_level_bounds() {
    assert!(ZoomLevel::new(0).is_none());
    assert!(ZoomLevel::new(1).is_some());
    assert!(ZoomLevel::new(22).is_some());
    assert!(ZoomLevel::new(23).is_none());
}

#[test]
fn accent_color_forms() {
    let accepted = [
        "#fff",
        "#FFAA00",
        "#ffaa0080",
        "rgb(10, 20, 30)",
        "hsla(120, 50%, 50%, 0.3)",
        "teal",
    ];
    for ok in accepted {
        assert!(AccentColor::parse(ok).is_some(), "{ok} should be accepted");
    }
    let rejected = ["", "#ggg", "#12345", "url(javascript:x)", "red; background: url(x)"];
    for bad in rejected {
        assert!(AccentColor::parse(bad).is_none(), "{bad} should be rejected");
    }
}

#[test]
fn set_parses_attribute_text() {
    let mut patch = ConfigPatch::default();
    patch.set(ConfigField::DefaultView, "LIST").unwrap();
    patch.set(ConfigField::ShowHeader, "").unwrap();
    patch.set(ConfigField::MapZoomLevel, " 9 ").unwrap();
    patch.set(ConfigField::HeaderTitle, "  Visit us  ").unwrap();
    patch.set(ConfigField::PremiumPlanName, "business").unwrap();
    assert_eq!(patch.default_view, Some(ViewMode::List));
    assert_eq!(patch.show_header, Some(true));
    assert_eq!(patch.map_zoom_level.map(ZoomLevel::get), Some(9));
    assert_eq!(patch.header_title.as_deref(), Some("Visit us"));
    assert_eq!(patch.premium_plan_name, Some(PlanTier::Business));
}

#[test]
fn set_rejects_invalid_values_without_touching_patch() {
    let mut patch = ConfigPatch::default();
    let err = patch.set(ConfigField::MapZoomLevel, "0").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "mapZoomLevel", .. }));
    assert!(patch.set(ConfigField::ShowHeader, "maybe").is_err());
    assert!(patch.set(ConfigField::DefaultView, "grid").is_err());
    assert!(patch.is_empty());
}

#[test]
fn from_json_rejects_non_objects() {
    assert!(ConfigPatch::from_json("{not json").is_err());
    assert!(ConfigPatch::from_json("42").is_err());
    let patch = ConfigPatch::from_json(r#"{"widgetName": "Shops", "unknown": 1}"#).unwrap();
    assert_eq!(patch.widget_name.as_deref(), Some("Shops"));
}

#[test]
fn merge_overlays_set_fields() {
    let mut base = ConfigPatch {
        header_title: Some("A".to_string()),
        show_header: Some(false),
        ..ConfigPatch::default()
    };
    let over = ConfigPatch {
        header_title: Some("B".to_string()),
        ..ConfigPatch::default()
    };
    base.merge(&over);
    assert_eq!(base.header_title.as_deref(), Some("B"));
    assert_eq!(base.show_header, Some(false));
}
