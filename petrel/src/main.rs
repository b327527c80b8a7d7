use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::{dev::DevArgs, error::Result};

mod dev;
mod error;

#[derive(Parser)]
#[command(name = "petrel")]
#[command(about = "Tenant-scoped event and upload materialization service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the petrel service in development mode
    Dev {
        #[clap(flatten)]
        inner: DevArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    petrel_observability::init_observability(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .map_err(|source| error::PetrelError::Observability { source })?;

    let cli = Cli::parse();

    let ct = CancellationToken::new();

    let ct_clone = ct.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ct_clone.cancel();
    });

    match cli.command {
        Commands::Dev { inner } => inner.run(ct).await,
    }
}
