//! GrugTok server - Entry Point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use grugtok::{Config, GrugServer, PaperPipeline};

#[derive(Parser, Debug)]
#[command(name = "grugtok")]
#[command(about = "arXiv flashcard feed with grug summaries")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Completion model (overrides LLM_MODEL)
    #[arg(long)]
    llm_model: Option<String>,

    /// Maximum simultaneous completion calls per page (overrides ENRICH_CONCURRENCY)
    #[arg(long)]
    enrich_concurrency: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(model) = cli.llm_model {
        config.llm_model = model;
    }
    if let Some(n) = cli.enrich_concurrency {
        anyhow::ensure!(n > 0, "--enrich-concurrency must be at least 1");
        config.enrich_concurrency = n;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.llm_model,
        has_llm_key = config.has_llm_key(),
        "Starting GrugTok server"
    );
    if !config.has_llm_key() {
        tracing::warn!("No LLM_API_KEY or OPENAI_API_KEY set; every paper gets default summaries");
    }

    let pipeline = PaperPipeline::new(&config)?;
    GrugServer::new(pipeline).run(cli.port).await
}
