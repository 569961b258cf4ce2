use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod serve;
pub mod vapid_key;

#[derive(Subcommand)]
enum Command {
    /// Run the push relay server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Set the server port (defaults to $PORT or 3000)
        #[arg(long)]
        port: Option<String>,
    },
    /// Verify the configured VAPID key pair and print the public key
    VapidKey {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::VapidKey {}) => {
            vapid_key::run().await?;
        }
        None => {}
    }

    Ok(())
}
