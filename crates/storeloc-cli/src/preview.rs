//! `storeloc preview`: mount the widget headlessly and print what it renders.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use storeloc_core::{load_attributes, AppConfig, AttributeEntry, LocationId, ViewMode};
use storeloc_widget::{mount, DataClient, HostAdapter, WidgetDeps};

use crate::text_map::TextMapProvider;
use crate::ContextArg;

#[derive(Debug)]
pub(crate) struct PreviewRequest {
    pub context: ContextArg,
    pub attrs: Vec<String>,
    pub attrs_file: Option<PathBuf>,
    pub page_url: Option<String>,
    pub view: Option<ViewMode>,
    pub select: Vec<String>,
    pub search: Option<String>,
}

/// Host attributes in application order: identity from the environment,
/// then the attributes file, then `--attr` flags, then the context flag.
pub(crate) fn collect_attributes(
    config: &AppConfig,
    request: &PreviewRequest,
) -> anyhow::Result<Vec<AttributeEntry>> {
    let mut attributes = Vec::new();
    if let Some(instance) = &config.instance {
        attributes.push(AttributeEntry::new("instance", instance.as_str()));
    }
    if let Some(comp_id) = &config.comp_id {
        attributes.push(AttributeEntry::new("comp-id", comp_id.as_str()));
    }

    if let Some(path) = &request.attrs_file {
        let file = load_attributes(path)
            .with_context(|| format!("failed to load attributes from {}", path.display()))?;
        attributes.extend(file.attributes);
    }

    for raw in &request.attrs {
        let entry = AttributeEntry::parse_pair(raw)
            .ok_or_else(|| anyhow::anyhow!("invalid --attr '{raw}', expected NAME=VALUE"))?;
        attributes.push(entry);
    }

    attributes.push(AttributeEntry::new(
        "viewmode",
        request.context.as_attribute(),
    ));
    Ok(attributes)
}

/// Mount, wait for the widget to settle, replay the requested interactions,
/// print the resulting frame as JSON, then detach.
///
/// # Errors
///
/// Returns an error if the attributes cannot be loaded, the data client
/// cannot be built, or the frame cannot be serialised. Widget-level failures
/// (load errors, rejected interactions) are logged and reflected in the
/// printed frame instead.
pub(crate) async fn run_preview(config: &AppConfig, request: PreviewRequest) -> anyhow::Result<()> {
    let attributes = collect_attributes(config, &request)?;
    let mut host = HostAdapter::with_attributes(request.page_url.clone(), attributes);

    let client = DataClient::new(
        &config.api_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build data client: {e}"))?;
    let deps = WidgetDeps::new(Arc::new(client), Arc::new(TextMapProvider))
        .with_notice_duration(Duration::from_millis(config.notice_duration_ms));

    let handle = mount(&mut host, deps).context("host element was already mounted")?;
    let settled = handle.settled().await;
    tracing::info!(phase = %settled.phase, "widget settled");

    if settled.is_visible() {
        if let Some(query) = &request.search {
            handle.search(query.as_str());
        }
        if let Some(mode) = request.view {
            if let Err(e) = handle.switch_view(mode).await {
                tracing::warn!(view = %mode, error = %e, "view switch rejected");
            }
        }
        for id in &request.select {
            match handle.select(LocationId::new(id.as_str())).await {
                Ok(focused) => tracing::info!(id = %id, focused, "location selected"),
                Err(e) => tracing::warn!(id = %id, error = %e, "selection rejected"),
            }
        }
    }

    let frame = handle.snapshot().await.unwrap_or(settled);
    println!("{}", serde_json::to_string_pretty(&frame)?);

    host.disconnect();
    handle.join().await.context("widget runtime failed")?;
    Ok(())
}
