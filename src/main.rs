//! plantwatch: soil-moisture telemetry viewer
//!
//! Lists the most recent telemetry CSV objects in a bucket, merges their
//! readings into two moisture series and renders them as wet/dry threshold
//! charts next to a records table.
//!
//! Surfaces:
//! - MCP server over stdio (default): list, series, table, classify, report tools
//! - `plantwatch report`: one fetch cycle written to an HTML report
//! - `plantwatch config`: edit ~/.config/plantwatch/config.toml

use clap::{Parser, Subcommand};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::*,
    ErrorData as McpError,
    ServiceExt,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// === Modules ===

mod config;
mod error;
mod render;
mod shared;
mod store;
mod telemetry;
mod tools;

use config::Config;
use render::report::HtmlReport;
use store::ObjectStore;
use telemetry::{refresh, CycleOptions};

// === CLI ===

#[derive(Parser)]
#[command(name = "plantwatch")]
#[command(about = "Soil-moisture telemetry viewer with wet/dry threshold charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the config file in your editor
    Config,
    /// Fetch the most recent readings once and write an HTML report
    Report {
        /// Bucket to read instead of the configured one
        #[arg(long)]
        bucket: Option<String>,
        /// Number of most recent objects to aggregate
        #[arg(long)]
        max_keys: Option<usize>,
        /// Output directory for index.html and the chart SVGs
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also print the records table to stdout
        #[arg(long)]
        print: bool,
    },
}

// === Server ===

#[derive(Debug)]
pub struct PlantwatchServer {
    pub tool_router: ToolRouter<Self>,
    pub store: Arc<dyn ObjectStore>,
    pub config: Config,
}

impl PlantwatchServer {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        let mut tool_router = Self::tool_router();

        for tool_name in config::all_tool_names() {
            if !config.is_enabled(tool_name) {
                tool_router.remove_route(tool_name);
                tracing::info!("Disabled tool: {}", tool_name);
            }
        }

        for tool_name in &config.disabled {
            if !config::all_tool_names().contains(&tool_name.as_str()) {
                tracing::warn!("Config disables unknown tool: {}", tool_name);
            }
        }

        if !config.disabled.is_empty() {
            tracing::info!(
                "Loaded config: {} tools disabled, {} tools active",
                config.disabled.len(),
                tool_router.map.len()
            );
        }

        Self {
            tool_router,
            store,
            config,
        }
    }
}

// Tool implementations
#[rmcp::tool_router]
impl PlantwatchServer {
    #[rmcp::tool(description = "List the most recently modified telemetry CSV objects in the bucket (newest first, single listing page of up to 1000 objects)")]
    pub async fn list_recent_objects(
        &self,
        Parameters(params): Parameters<tools::moisture::RecentParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::moisture::list_recent_objects(self.store.as_ref(), &self.config, params).await
    }

    #[rmcp::tool(description = "Get both plants' moisture series, oldest first, with Wet/Dry classification per reading (dry above 20000)")]
    pub async fn get_moisture_series(
        &self,
        Parameters(params): Parameters<tools::moisture::RecentParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::moisture::get_moisture_series(self.store.as_ref(), &self.config, params).await
    }

    #[rmcp::tool(description = "Get every raw telemetry record as a text table, newest object first")]
    pub async fn get_records_table(
        &self,
        Parameters(params): Parameters<tools::moisture::RecentParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::moisture::get_records_table(self.store.as_ref(), &self.config, params).await
    }

    #[rmcp::tool(description = "Classify a single moisture reading as Wet or Dry")]
    pub async fn classify_moisture(
        &self,
        Parameters(params): Parameters<tools::moisture::ClassifyParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::moisture::classify_moisture(params).await
    }

    #[rmcp::tool(description = "Render the records table and both moisture charts to an HTML report on disk")]
    pub async fn render_report(
        &self,
        Parameters(params): Parameters<tools::moisture::ReportParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::moisture::render_report(self.store.as_ref(), &self.config, params).await
    }
}

#[rmcp::tool_handler]
impl ServerHandler for PlantwatchServer {
    fn get_info(&self) -> ServerInfo {
        let description = format!(
            "plantwatch: soil-moisture telemetry for bucket '{}' ({} backend).\n\
             - readings above 20000 are Dry, the rest Wet\n\
             - series are built from the {} most recent objects\n",
            self.config.bucket,
            self.store.backend_name(),
            self.config.max_keys
        );

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(description),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config) => {
            run_config_command()?;
        }
        Some(Commands::Report {
            bucket,
            max_keys,
            output,
            print,
        }) => {
            init_tracing();
            run_report(bucket, max_keys, output, print).await?;
        }
        None => {
            init_tracing();
            run_server().await?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout belongs to the MCP transport
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open config file in user's editor
fn run_config_command() -> anyhow::Result<()> {
    let config_path = Config::path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !config_path.exists() {
        let template = include_str!("../config.toml.example");
        std::fs::write(&config_path, template)?;
        println!("Created config file: {}", config_path.display());
    }

    let config = Config::load();
    println!("Tools:");
    for tool_name in config::all_tool_names() {
        let state = if config.is_enabled(tool_name) { "enabled" } else { "disabled" };
        println!("  {} ({})", tool_name, state);
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            { "notepad".to_string() }
            #[cfg(not(target_os = "windows"))]
            { "nano".to_string() }
        });

    println!("Opening {} with {}", config_path.display(), editor);

    std::process::Command::new(&editor)
        .arg(&config_path)
        .status()?;

    Ok(())
}

/// Run one fetch cycle and write the HTML report
async fn run_report(
    bucket: Option<String>,
    max_keys: Option<usize>,
    output: Option<PathBuf>,
    print: bool,
) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(bucket) = bucket {
        config.bucket = bucket;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }

    let store = store::connect(&config).await?;
    let opts = CycleOptions::from_config(&config).with_max_keys(max_keys);

    let mut report = HtmlReport::new(format!("Soil moisture - {}", config.bucket));
    let agg = refresh(store.as_ref(), &opts, &mut report).await?;

    if print {
        if report.table().is_empty() {
            println!("No records");
        } else {
            print!("{}", report.table().to_text());
        }
    }

    let written = report.write_to(&config.output_dir)?;
    println!(
        "Aggregated {} readings from {} object(s) ({} malformed rows)",
        agg.series.len(),
        agg.objects,
        agg.issues
    );
    for path in written {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Run the MCP server
async fn run_server() -> anyhow::Result<()> {
    tracing::info!("Starting plantwatch server");

    let config = Config::load();
    let store = store::connect(&config).await?;
    let server = PlantwatchServer::new(config, store);
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;

    tracing::info!("plantwatch server stopped");
    Ok(())
}
