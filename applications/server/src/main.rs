/// Onair Server - mastering service and command-line tool
use clap::{Parser, Subcommand};
use onair_core::OutputFormat;
use onair_server::{cli, config::ServerConfig, router, state::AppState};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "onair-server")]
#[command(about = "Radio-ready mastering: loudness normalization, rumble filter and peak control", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ONAIR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Master a single file
    Master {
        /// Input audio file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Output format (wav or mp3); defaults to the output extension
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Integrated loudness target in LUFS
        #[arg(short, long, allow_hyphen_values = true)]
        target_lufs: Option<f64>,
    },
    /// Print loudness and peak of a file
    Analyze {
        /// Input audio file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onair_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => {
            serve(config).await?;
        }
        Commands::Master {
            input,
            output,
            format,
            target_lufs,
        } => {
            let result = tokio::task::spawn_blocking(move || {
                cli::master_file(&input, &output, format, target_lufs, &config)
            })
            .await??;
            println!("{}", cli::summarize(&result));
        }
        Commands::Analyze { input } => {
            let report = tokio::task::spawn_blocking(move || cli::analyze_file(&input)).await??;
            println!("{}", report);
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Onair Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Upload limit: {} MiB", config.limits.max_upload_mb);
    tracing::info!("Default target: {} LUFS", config.mastering.target_lufs);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let app_state = AppState::new(config);
    let formats = app_state.encoders.available_formats();
    tracing::info!("Output formats available: {:?}", formats);

    let app = router(app_state);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
