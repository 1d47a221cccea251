//! Bundle resolution for the loader script: fetch `manifest.json`, pick the
//! versioned script/stylesheet pair, fall back to `latest`.

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::parse_http_url;
use crate::error::WidgetError;

pub const FALLBACK_VERSION: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    /// Build tools emit either an ISO string or epoch millis.
    #[serde(default, deserialize_with = "string_or_number")]
    pub build_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleAssets {
    pub version: String,
    pub script_url: String,
    pub stylesheet_url: String,
    pub build_time: Option<String>,
}

impl BundleAssets {
    fn for_version(base: &Url, version: &str, build_time: Option<String>) -> Self {
        let root = base.as_str().trim_end_matches('/');
        Self {
            version: version.to_string(),
            script_url: format!("{root}/widget.{version}.min.js"),
            stylesheet_url: format!("{root}/widget.{version}.min.css"),
            build_time,
        }
    }
}

/// `<base>/manifest.json?v=<unix-millis>`.
///
/// # Errors
///
/// Returns [`WidgetError::InvalidUrl`] if `base` is not an http(s) URL.
pub fn manifest_url(base: &str, now: DateTime<Utc>) -> Result<Url, WidgetError> {
    let normalised = format!("{}/", base.trim().trim_end_matches('/'));
    let base = parse_http_url(&normalised)?;
    let mut url = base
        .join("manifest.json")
        .map_err(|e| WidgetError::InvalidUrl {
            url: normalised.clone(),
            reason: e.to_string(),
        })?;
    url.query_pairs_mut()
        .append_pair("v", &now.timestamp_millis().to_string());
    Ok(url)
}

/// Resolve the versioned bundle. Any failure past URL validation (network,
/// status, body, unusable version) falls back to [`FALLBACK_VERSION`].
///
/// # Errors
///
/// Returns [`WidgetError::InvalidUrl`] only when `base` itself is unusable.
pub async fn resolve_bundle(
    client: &Client,
    base: &str,
    now: DateTime<Utc>,
) -> Result<BundleAssets, WidgetError> {
    let url = manifest_url(base, now)?;
    let asset_base = parse_http_url(&format!("{}/", base.trim().trim_end_matches('/')))?;

    match fetch_manifest(client, &url).await {
        Ok(manifest) => match sanitize_version(&manifest.version) {
            Some(version) => {
                tracing::debug!(version, "resolved widget bundle");
                Ok(BundleAssets::for_version(&asset_base, version, manifest.build_time))
            }
            None => {
                tracing::warn!(
                    version = %manifest.version,
                    "manifest version unusable, falling back to latest"
                );
                Ok(BundleAssets::for_version(&asset_base, FALLBACK_VERSION, None))
            }
        },
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "manifest fetch failed, falling back to latest");
            Ok(BundleAssets::for_version(&asset_base, FALLBACK_VERSION, None))
        }
    }
}

async fn fetch_manifest(client: &Client, url: &Url) -> Result<Manifest, WidgetError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(WidgetError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| WidgetError::Deserialize {
        context: url.to_string(),
        source,
    })
}

/// Versions end up in file names, so only `[A-Za-z0-9._-]` is allowed.
fn sanitize_version(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let ok = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    ok.then_some(trimmed)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn manifest_url_is_cache_busted() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let url = manifest_url("https://cdn.example.com/widget/", now).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cdn.example.com/widget/manifest.json?v=1700000000123"
        );
    }

    #[test]
    fn manifest_url_rejects_non_http_base() {
        assert!(manifest_url("file:///tmp", Utc::now()).is_err());
    }

    #[test]
    fn sanitize_version_rejects_path_characters() {
        assert_eq!(sanitize_version(" 1.4.2 "), Some("1.4.2"));
        assert_eq!(sanitize_version("../evil"), None);
        assert_eq!(sanitize_version(""), None);
    }

    #[test]
    fn build_time_accepts_number_or_string() {
        let m: Manifest =
            serde_json::from_str(r#"{"version": "1.0.0", "buildTime": 1700000000000}"#).unwrap();
        assert_eq!(m.build_time.as_deref(), Some("1700000000000"));
        let m: Manifest = serde_json::from_str(r#"{"version": "1.0.0"}"#).unwrap();
        assert!(m.build_time.is_none());
    }
}
