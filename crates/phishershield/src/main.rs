mod cli;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "phishershield",
    version,
    about = "URL trust scoring and phishing interception"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a URL locally by running the signal collectors
    Score {
        /// URL to score
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a URL through a running scan server
    Scan {
        /// URL to scan
        url: String,

        /// Scan server base URL (default: PHISHERSHIELD_GATEWAY_URL or localhost)
        #[arg(long)]
        server: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Score { url, json } => cli::score::run(&url, json).await,
        Commands::Scan { url, server, json } => cli::scan::run(&url, server.as_deref(), json).await,
    };

    std::process::exit(exit_code);
}
