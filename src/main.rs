// src/main.rs

//! # Cold-Chain Registry - Operation Runner
//!
//! Replays a JSON operation script against a fresh registry and prints the
//! per-operation outcomes and the resulting event log.
//!
//! ## Usage
//! ```text
//! coldchain <script.json>
//! ```
//!
//! ## Environment Variables
//! - `COLDCHAIN_OWNER`: registry owner address
//! - `COLDCHAIN_LOG_LEVEL`: (Optional) log filter (default: info)
//! - `COLDCHAIN_EVENT_CHANNEL_CAPACITY`: (Optional) event feed buffer (default: 1024)

use anyhow::Context;
use coldchain_registry::services::operations::OperationScript;
use coldchain_registry::services::verifier::EcdsaVerifier;
use coldchain_registry::settings::Settings;
use coldchain_registry::utils::serialization::serialize_pretty;
use coldchain_registry::ColdChain;
use dotenv::dotenv;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::from_env().context("failed to load COLDCHAIN_* settings")?;
    env_logger::Builder::new()
        .parse_filters(&settings.log_level)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: coldchain <script.json>")?;
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read operation script {path}"))?;
    let script = OperationScript::parse(&source)
        .with_context(|| format!("malformed operation script {path}"))?;

    let registry = ColdChain::with_verifier(
        settings.owner,
        EcdsaVerifier,
        settings.event_channel_capacity,
    );
    info!(
        "replaying {} operations as owner {}",
        script.operations.len(),
        settings.owner
    );

    let report = script.run(&registry).await;
    let rejected = report.outcomes.iter().filter(|o| o.error.is_some()).count();
    info!(
        "{} operations applied, {} rejected, {} events",
        report.outcomes.len() - rejected,
        rejected,
        report.events.len()
    );

    println!("{}", serialize_pretty(&report)?);
    Ok(())
}
