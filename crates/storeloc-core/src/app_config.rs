#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level settings for a widget host (the CLI, or any embedding binary).
///
/// Widget presentation settings are not here: those arrive as host attributes
/// and from the combined data endpoint. See [`crate::WidgetConfiguration`].
#[derive(Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub asset_base_url: Option<String>,
    pub notice_duration_ms: u64,
    pub instance: Option<String>,
    pub comp_id: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("asset_base_url", &self.asset_base_url)
            .field("notice_duration_ms", &self.notice_duration_ms)
            .field("instance", &self.instance.as_ref().map(|_| "[redacted]"))
            .field("comp_id", &self.comp_id)
            .finish()
    }
}
