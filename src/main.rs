//! carprice: used-car fair price estimator.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! loads both specialist models once, then either prices a single record
//! given on the command line or serves the JSON API until Ctrl+C.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use carprice::config::{self, AppConfig};
use carprice::features::tiers::TierTable;
use carprice::features::FeatureEngineer;
use carprice::model::ModelSlot;
use carprice::predictor::{PricePredictor, PricingPipeline};
use carprice::server;
use carprice::server::routes::ServerState;
use carprice::types::RawCarRecord;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::resolve_path();
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        service = %cfg.service.name,
        config = %config_path,
        currency = %cfg.service.currency,
        "carprice starting up"
    );

    let pipeline = build_pipeline(&cfg)?;

    // One-shot mode: price the record in the given JSON file and exit.
    if let Some(record_path) = std::env::args().nth(1) {
        return price_file(&pipeline, &record_path, &cfg.service.currency);
    }

    if !cfg.server.enabled {
        warn!("Server disabled in config and no record file given; nothing to do");
        return Ok(());
    }

    let state = Arc::new(ServerState::new(
        pipeline,
        cfg.service.name.clone(),
        cfg.service.currency.clone(),
    ));

    server::serve(state, cfg.server.port, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received.");
    })
    .await?;

    info!("carprice shut down cleanly.");
    Ok(())
}

/// Build the feature engineer and load both specialists.
///
/// Runs to completion before any request is accepted.
fn build_pipeline(cfg: &config::AppConfig) -> Result<PricingPipeline> {
    let tiers = match &cfg.features.tiers_path {
        Some(path) => TierTable::load(path)?,
        None => TierTable::builtin()?,
    };
    info!(version = %tiers.version(), "Tier table ready");

    let low = load_model("model_low", &cfg.models.low_path, cfg.models.require_at_startup)?;
    let high = load_model("model_high", &cfg.models.high_path, cfg.models.require_at_startup)?;

    Ok(PricingPipeline::new(
        FeatureEngineer::new(tiers),
        PricePredictor::new(low, high),
    ))
}

fn load_model(role: &str, path: &Path, required: bool) -> Result<ModelSlot> {
    let slot = ModelSlot::load(path);
    if let ModelSlot::Unavailable { reason } = &slot {
        if required {
            bail!("{role} failed to load: {reason}");
        }
        warn!(role, %reason, "Model unavailable; predictions will fail until restart");
    }
    Ok(slot)
}

/// Price one JSON record and print the result.
fn price_file(pipeline: &PricingPipeline, path: &str, currency: &str) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {path}"))?;
    let raw: RawCarRecord = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse record file: {path}"))?;

    let result = pipeline.estimate_now(&raw)?;
    info!(
        price = format!("{:.0}", result.price),
        model_used = %result.model_used,
        "Prediction complete"
    );
    println!("Estimated price: {:.0} {currency}", result.price);
    println!("Model used: {}", result.model_used);
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("carprice=info"));

    let json_logging = std::env::var("CARPRICE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
