use std::path::PathBuf;

use clap::Parser;

/// Edge proxy for the ticketing API.
#[derive(Parser)]
#[command(name = "ticket-edge", version)]
struct Cli {
    /// Path to a TOML config file. Watched for changes when given.
    #[arg(short, long, env = "TICKET_EDGE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = ticket_edge::lifecycle::startup::run(cli.config).await {
        eprintln!("ticket-edge: {}", e);
        std::process::exit(1);
    }
}
