//! HTTP client for the combined `{config, locations}` endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer};
use storeloc_core::{Location, WidgetConfiguration};

use crate::error::WidgetError;
use crate::platform::HostPlatform;

/// One response from the combined endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WidgetPayload {
    #[serde(default)]
    pub config: WidgetConfiguration,
    #[serde(default, deserialize_with = "lenient_locations")]
    pub locations: Vec<Location>,
}

/// Skips individual records that do not parse instead of failing the whole
/// payload. A non-array `locations` value yields an empty list.
fn lenient_locations<'de, D>(deserializer: D) -> Result<Vec<Location>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };
    let locations = items
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, item)| match serde_json::from_value::<Location>(item) {
                Ok(location) => Some(location),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed location record");
                    None
                }
            },
        )
        .collect();
    Ok(locations)
}

/// Source of widget data. The runtime is generic over this so tests can
/// substitute a canned payload.
pub trait DataSource: Send + Sync + 'static {
    fn fetch_widget_data(
        &self,
        platform: &HostPlatform,
    ) -> impl Future<Output = Result<WidgetPayload, WidgetError>> + Send;
}

/// Client for the combined data endpoint.
///
/// One `GET` per call; the host-platform identity is forwarded as request
/// headers when present.
pub struct DataClient {
    client: Client,
    url: Url,
}

impl DataClient {
    /// # Errors
    ///
    /// Returns [`WidgetError::InvalidUrl`] if `api_url` is not an absolute
    /// http(s) URL, or [`WidgetError::Http`] if the `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, WidgetError> {
        let url = parse_http_url(api_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the effective server configuration and the location set.
    ///
    /// # Errors
    ///
    /// - [`WidgetError::UnexpectedStatus`] on any non-2xx response.
    /// - [`WidgetError::Http`] on network or TLS failure.
    /// - [`WidgetError::Deserialize`] when the body is not a valid payload.
    pub async fn fetch(&self, platform: &HostPlatform) -> Result<WidgetPayload, WidgetError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .headers(platform.request_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let payload: WidgetPayload =
            serde_json::from_slice(&body).map_err(|source| WidgetError::Deserialize {
                context: self.url.to_string(),
                source,
            })?;

        tracing::debug!(
            url = %self.url,
            locations = payload.locations.len(),
            authenticated = platform.is_authenticated(),
            "fetched widget data"
        );
        Ok(payload)
    }
}

impl DataSource for DataClient {
    fn fetch_widget_data(
        &self,
        platform: &HostPlatform,
    ) -> impl Future<Output = Result<WidgetPayload, WidgetError>> + Send {
        self.fetch(platform)
    }
}

pub(crate) fn parse_http_url(raw: &str) -> Result<Url, WidgetError> {
    let invalid = |reason: String| WidgetError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storeloc_core::{LocationId, PlanTier, ViewMode};

    use super::*;

    #[test]
    fn payload_without_locations_is_empty() {
        let payload: WidgetPayload =
            serde_json::from_value(json!({"config": {"defaultView": "list"}})).unwrap();
        assert!(payload.locations.is_empty());
        assert_eq!(payload.config.default_view, ViewMode::List);
    }

    #[test]
    fn payload_config_is_complete_replacement() {
        let payload: WidgetPayload = serde_json::from_value(json!({
            "config": {"premiumPlanName": "business"},
            "locations": []
        }))
        .unwrap();
        assert_eq!(payload.config.premium_plan_name, PlanTier::Business);
        assert_eq!(payload.config.header_title, "Our Locations");
    }

    #[test]
    fn malformed_location_records_are_skipped() {
        let payload: WidgetPayload = serde_json::from_value(json!({
            "locations": [
                {"id": "a", "name": "A"},
                "not an object",
                {"id": "b", "name": "B"}
            ]
        }))
        .unwrap();
        assert_eq!(payload.locations.len(), 2);
    }

    #[test]
    fn records_with_null_fields_are_kept() {
        let payload: WidgetPayload = serde_json::from_value(json!({
            "locations": [
                {"id": "a", "hours": null},
                {"id": "b", "name": null},
                {"id": "c", "name": "C", "hours": {"monday": "9-5"}}
            ]
        }))
        .unwrap();
        let ids: Vec<&str> = payload
            .locations
            .iter()
            .filter_map(|loc| loc.identity().map(LocationId::as_str))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(payload.locations[0].hours.is_empty());
        assert_eq!(payload.locations[1].name, "");
    }

    #[test]
    fn rejects_non_http_url() {
        let err = DataClient::new("ftp://example.com/data", 5, "test").err().unwrap();
        assert!(matches!(err, WidgetError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_relative_url() {
        assert!(DataClient::new("/api/widget", 5, "test").is_err());
    }
}
