//! Host-platform identity, passed explicitly to whatever issues requests.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Url;

use crate::error::WidgetError;

pub const COMP_ID_HEADER: &str = "x-wix-comp-id";

/// The instance credential and component id supplied by the host.
///
/// Missing identity is not an error: requests go out unauthenticated.
#[derive(Clone, Default)]
pub struct HostPlatform {
    instance: Option<String>,
    comp_id: Option<String>,
}

impl std::fmt::Debug for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostPlatform")
            .field("instance", &self.instance.as_ref().map(|_| "[redacted]"))
            .field("comp_id", &self.comp_id)
            .finish()
    }
}

impl HostPlatform {
    #[must_use]
    pub fn new(instance: Option<String>, comp_id: Option<String>) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            instance: clean(instance),
            comp_id: clean(comp_id),
        }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Attributes win; the host page's `instance` / `compId` query
    /// parameters fill whatever the attributes left out.
    #[must_use]
    pub fn from_sources(
        instance_attr: Option<&str>,
        comp_id_attr: Option<&str>,
        page_url: Option<&str>,
    ) -> Self {
        let query = page_url.and_then(|raw| Url::parse(raw).ok());
        let from_query = |key: &str| {
            query.as_ref().and_then(|url| {
                url.query_pairs()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v.into_owned())
            })
        };

        let pick = |attr: Option<&str>, key: &str| {
            attr.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| from_query(key))
        };

        Self::new(
            pick(instance_attr, "instance"),
            pick(comp_id_attr, "compId"),
        )
    }

    /// Validate the identity. On failure the credentials are dropped so the
    /// platform degrades to unauthenticated, and the error is returned for
    /// the caller to log.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::PlatformInit`] when a value cannot be sent as
    /// an HTTP header.
    pub fn init(&mut self) -> Result<(), WidgetError> {
        let invalid = [("instance", &self.instance), ("compId", &self.comp_id)]
            .into_iter()
            .find_map(|(name, value)| {
                value
                    .as_deref()
                    .filter(|v| HeaderValue::from_str(v).is_err())
                    .map(|_| name)
            });
        if let Some(name) = invalid {
            self.teardown();
            return Err(WidgetError::PlatformInit(format!(
                "{name} contains characters not allowed in a request header"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.instance.is_some()
    }

    /// Headers to attach to the combined data request.
    #[must_use]
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = self
            .instance
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(value) = self
            .comp_id
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            headers.insert(HeaderName::from_static(COMP_ID_HEADER), value);
        }
        headers
    }

    pub fn teardown(&mut self) {
        self.instance = None;
        self.comp_id = None;
    }
}
