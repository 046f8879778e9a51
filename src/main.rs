use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use johnny_reports::config::{ReportConfig, DEFAULT_FONT_PATH};
use johnny_reports::http;
use johnny_reports::model::ReportKind;
use johnny_reports::pipeline::{ExportOutcome, ReportPipeline};

/// Serves and exports the Johnny Portal PDF reports.
///
/// Settings are read from the command line, the environment, or a `.env`
/// file in the working directory.
#[derive(Parser)]
#[command(author, version, about = "Johnny Portal report exporter")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Base URL of the hosted database.
    #[arg(long, env = "JOHNNY_STORE_URL")]
    store_url: String,

    /// API key for the hosted database.
    #[arg(long, env = "JOHNNY_STORE_KEY", hide_env_values = true)]
    store_key: String,

    /// Base URL serving `/fonts/RobotoMono-Regular.ttf`.
    #[arg(long, env = "JOHNNY_FONT_BASE_URL")]
    font_base_url: Option<String>,

    /// Local path of the report font.
    #[arg(long, env = "JOHNNY_FONT_PATH", default_value = DEFAULT_FONT_PATH)]
    font_path: PathBuf,
}

impl StoreArgs {
    fn into_config(self) -> ReportConfig {
        ReportConfig::new(self.store_url, self.store_key)
            .with_font_base_url(self.font_base_url)
            .with_font_path(self.font_path)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the export endpoints over HTTP.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "JOHNNY_LISTEN", default_value = "0.0.0.0:4000")]
        listen: SocketAddr,
    },

    /// Render one report to a file.
    Export {
        #[arg(value_enum)]
        kind: KindArg,

        /// Output path; defaults to the report's download name.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Wellness,
    Trust,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Wellness => ReportKind::Wellness,
            KindArg::Trust => ReportKind::Trust,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "johnny_reports=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.store.into_config();
    config.validate()?;
    let pipeline = ReportPipeline::from_config(&config)?;

    match cli.command {
        Commands::Serve { listen } => serve(pipeline, listen).await,
        Commands::Export { kind, output } => export(pipeline, kind.into(), output).await,
    }
}

async fn serve(pipeline: ReportPipeline, listen: SocketAddr) -> Result<(), Box<dyn Error>> {
    let app = http::router(pipeline).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Johnny Portal reports listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn export(
    pipeline: ReportPipeline,
    kind: ReportKind,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    match pipeline.export(kind).await? {
        ExportOutcome::NoData => {
            println!("No {} data available; nothing written.", kind);
        }
        ExportOutcome::Rendered(report) => {
            let path = output.unwrap_or_else(|| PathBuf::from(report.file_name()));
            tokio::fs::write(&path, &report.bytes).await?;
            println!(
                "Generated {} ({} bytes, {} font)",
                path.display(),
                report.bytes.len(),
                if report.custom_font { "custom" } else { "built-in" }
            );
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
