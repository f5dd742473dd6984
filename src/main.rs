use anyhow::Result;
use authcheck::commands::{config, verify};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "authcheck")]
#[command(about = "VNTANA authentication API verification CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the authentication verification sequence against the live API
    Verify {
        /// Path to the credentials file
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,

        /// Override the API base URL (takes precedence over VNTANA_API_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Inspect the credentials file without making network calls
    Config {
        /// Path to the credentials file
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify { env_file, base_url } => verify::execute(&env_file, base_url),
        Commands::Config { env_file } => config::execute(&env_file),
    }
}
