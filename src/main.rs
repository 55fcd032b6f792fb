//! graphroute - Command line entry point
//!
//! Loads a JSON graph, builds a route over its vertices or edges, optionally
//! filters it with a Rhai expression and prints the inspector preview.

use anyhow::Context;
use clap::Parser;
use graphroute::{
    config::{self, Settings},
    route::{GraphRoutes, Inspector},
    MemoryGraph,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "graphroute", version, about = "Preview lazy routes over a JSON graph")]
struct Cli {
    /// Graph document to load
    #[arg(short, long)]
    graph: PathBuf,

    /// Settings file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Route over edges instead of vertices
    #[arg(short, long)]
    edges: bool,

    /// Rhai expression each element must satisfy, e.g. `it.age >= 18`
    #[arg(short = 'w', long = "where")]
    filter: Option<String>,

    /// Maximum number of matches to preview
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print the route description only
    #[arg(long)]
    hide: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load_or_default(),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    config::install(settings)?;

    let graph = MemoryGraph::load_json(&cli.graph)
        .with_context(|| format!("Failed to load graph from {}", cli.graph.display()))?;

    let mut route = if cli.edges { graph.e() } else { graph.v() };
    if let Some(expression) = &cli.filter {
        graphroute::ScriptEngine::default()
            .validate(expression)
            .with_context(|| format!("Invalid filter expression `{}`", expression))?;
        route = route.filter_script(expression);
    }
    if cli.hide {
        route.hide();
    }

    tracing::info!("Inspecting {}", route);
    let stdout = std::io::stdout();
    let description = Inspector::new(&config::current().inspect)
        .inspect(&route, cli.limit, &mut stdout.lock())?;
    println!("{}", description);

    Ok(())
}
