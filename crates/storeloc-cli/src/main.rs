mod manifest;
mod preview;
mod text_map;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use storeloc_core::Environment;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storeloc")]
#[command(about = "Headless host for the store locator widget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Mount the widget against `STORELOC_API_URL` and print the settled frame
    Preview {
        /// Execution context reported by the host platform
        #[arg(long, value_enum, default_value_t = ContextArg::Site)]
        context: ContextArg,
        /// Host attribute as NAME=VALUE (repeatable, applied in order)
        #[arg(long = "attr", value_name = "NAME=VALUE")]
        attrs: Vec<String>,
        /// YAML file with `attributes: [{name, value}]`, applied before --attr
        #[arg(long)]
        attrs_file: Option<PathBuf>,
        /// Host page URL; its `instance`/`compId` query parameters are used as
        /// identity fallback
        #[arg(long)]
        page_url: Option<String>,
        /// Switch to this view after the widget settles
        #[arg(long, value_enum)]
        view: Option<ViewArg>,
        /// Select a location by id (repeatable, applied in order)
        #[arg(long = "select", value_name = "ID")]
        select: Vec<String>,
        /// Filter the list by name, address or category
        #[arg(long)]
        search: Option<String>,
    },
    /// Resolve the loader manifest and print the versioned bundle URLs
    Manifest {
        /// Asset base URL; defaults to `STORELOC_ASSET_BASE_URL`
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ContextArg {
    Editor,
    Preview,
    Site,
}

impl ContextArg {
    fn as_attribute(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Preview => "preview",
            Self::Site => "site",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ViewArg {
    Map,
    List,
}

impl From<ViewArg> for storeloc_core::ViewMode {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Map => Self::Map,
            ViewArg::List => Self::List,
        }
    }
}

/// Log layout per environment. Development gets colour and module targets;
/// test and production write plain lines for collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogStyle {
    ansi: bool,
    target: bool,
}

impl LogStyle {
    fn for_env(env: &Environment) -> Self {
        match env {
            Environment::Development => Self {
                ansi: true,
                target: true,
            },
            Environment::Test | Environment::Production => Self {
                ansi: false,
                target: false,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = storeloc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    let style = LogStyle::for_env(&config.env);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(style.ansi)
        .with_target(style.target)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Preview {
            context,
            attrs,
            attrs_file,
            page_url,
            view,
            select,
            search,
        } => {
            let request = preview::PreviewRequest {
                context,
                attrs,
                attrs_file,
                page_url,
                view: view.map(Into::into),
                select,
                search,
            };
            preview::run_preview(&config, request).await?;
        }
        Commands::Manifest { base_url } => {
            manifest::run_manifest(&config, base_url.as_deref()).await?;
        }
    }

    Ok(())
}
