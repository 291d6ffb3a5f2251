//! `airdrop-claimer`: submit airdrop claims read from stdin.
//!
//! Configuration comes from the environment (`NETWORK`, `TOKEN` or
//! `RPC_URL`, `AIRDROP_CONTRACT`, `PRIVATE_KEY`, `DEDUP_CACHE_SIZE`,
//! `AIRDROP_PREFLIGHT`). The settlement handle is built once and shared by
//! every event.

use std::process::ExitCode;
use std::sync::Arc;

use airdrop_cli::{init_tracing, run_lines};
use airdrop_settlement::{ClaimSubmitter, EvmSettlement, ReplayGuard};
use airdrop_types::{constants, ClaimerConfig, Result};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Claimer stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = ClaimerConfig::from_env()?;
    tracing::info!(version = constants::VERSION, config = ?config, "Claimer starting");

    let evm = Arc::new(EvmSettlement::connect(&config)?);
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    if config.dedup_enabled() {
        let guarded = ReplayGuard::new(Arc::clone(&evm), config.dedup_cache_size);
        let submitter = ClaimSubmitter::new(Arc::new(guarded));
        run_lines(&submitter, input, output).await?;
    } else {
        let submitter = ClaimSubmitter::new(Arc::clone(&evm));
        run_lines(&submitter, input, output).await?;
    }
    Ok(())
}
