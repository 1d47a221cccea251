//! `storeloc manifest`: resolve the versioned loader bundle.

use std::time::Duration;

use anyhow::Context;
use storeloc_core::AppConfig;
use storeloc_widget::resolve_bundle;

/// # Errors
///
/// Returns an error if no asset base URL is configured or it is not a valid
/// http(s) URL. A missing or broken manifest is not an error: the bundle
/// falls back to `latest`.
pub(crate) async fn run_manifest(config: &AppConfig, base_url: Option<&str>) -> anyhow::Result<()> {
    let base = base_url
        .or(config.asset_base_url.as_deref())
        .context("no asset base URL: pass --base-url or set STORELOC_ASSET_BASE_URL")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&config.user_agent)
        .build()?;

    let bundle = resolve_bundle(&client, base, chrono::Utc::now()).await?;
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}
