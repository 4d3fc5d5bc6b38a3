use crate::discovery::InventorySource;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::runtime_config::DispatchConfig;
use crate::server::{HttpRequest, HttpResponse};
use crate::view::DefaultViewResolver;
use anyhow::Context;
use clap::{Parser, Subcommand};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line interface for the dispatch core
#[derive(Debug, Parser)]
#[command(name = "dispatch-core")]
#[command(about = "Inspect and exercise the controllers linked into this binary", long_about = None)]
pub struct Cli {
    /// YAML dispatch configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Module path scanned for controllers (repeatable; replaces the configured list)
    #[arg(long = "base-package", global = true)]
    pub base_packages: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the route table in lookup order
    Routes,
    /// Run a single request through the dispatcher and print the response
    Dispatch {
        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, optionally with a query string
        #[arg(short, long)]
        path: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

impl Cli {
    /// File configuration, then environment, then command-line overrides.
    pub fn dispatch_config(&self) -> anyhow::Result<DispatchConfig> {
        let mut config = match &self.config {
            Some(path) => DispatchConfig::load(path)?,
            None => DispatchConfig::default(),
        };
        config.apply_env();
        if !self.base_packages.is_empty() {
            config.base_packages = self.base_packages.clone();
        }
        Ok(config)
    }
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}

/// Execute `cli` against the controllers linked into the current binary.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = cli.dispatch_config()?;
    let dispatcher = Dispatcher::bootstrap(&config, Arc::new(InventorySource), Arc::new(DefaultViewResolver))?;

    match &cli.command {
        Commands::Routes => write_routes(&dispatcher, out),
        Commands::Dispatch { method, path, body } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method `{method}`"))?;
            let mut request = HttpRequest::from_uri(method, path)?;
            if let Some(body) = body {
                request = request
                    .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .with_body(body.as_bytes());
            }

            let mut response = HttpResponse::new();
            let outcome = dispatcher.service(&request, &mut response);
            write_response(&response, out)?;
            match outcome {
                DispatchOutcome::Failed(err) => Err(anyhow::Error::new(err)),
                DispatchOutcome::Completed | DispatchOutcome::NotFound => Ok(()),
            }
        }
    }
}

fn write_routes(dispatcher: &Dispatcher, out: &mut impl Write) -> anyhow::Result<()> {
    let routes = dispatcher.routes();
    if routes.is_empty() {
        writeln!(out, "no routes registered")?;
        return Ok(());
    }
    for (mapping, route) in routes {
        writeln!(out, "{:<10} {:<8} {:<24} {}", mapping, route.key.method().as_str(), route.key.path(), route.handler)?;
    }
    Ok(())
}

fn write_response(response: &HttpResponse, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "HTTP {}", response.status())?;
    for (name, value) in response.headers() {
        writeln!(out, "{}: {}", name, value.to_str().unwrap_or("<binary>"))?;
    }
    if !response.body().is_empty() {
        writeln!(out)?;
        out.write_all(response.body())?;
        writeln!(out)?;
    }
    Ok(())
}
