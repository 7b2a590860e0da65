//! Storehouse demo CLI.
//!
//! Builds the demo base, runs one crafting session and logs what the
//! aggregator saw.
//!
//! # Usage
//!
//! ```bash
//! storehouse-demo [config.json] [--json]
//! ```
//!
//! Log filtering follows `STOREHOUSE_LOG` (e.g. `STOREHOUSE_LOG=storehouse=trace`).

use std::process::ExitCode;
use std::sync::Arc;
use storehouse_aggregate::Aggregator;
use storehouse_core::{TracingFormat, TracingSetup};
use storehouse_demo::{build_world, catalog, run_session};
use storehouse_world::StorageConfig;
use tracing::Level;

const WOOD_NEEDED: u32 = 50;

fn main() -> ExitCode {
    let mut config_path = None;
    let mut format = TracingFormat::Pretty;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => format = TracingFormat::Json,
            _ => config_path = Some(arg),
        }
    }

    let mut setup = TracingSetup::new()
        .with_level(Level::INFO)
        .with_format(format);
    if let Ok(filter) = std::env::var("STOREHOUSE_LOG") {
        setup = setup.with_env_filter(filter);
    }
    setup.init();

    let config = match config_path {
        Some(path) => match StorageConfig::load(&path) {
            Ok(config) => config,
            Err(error) => {
                tracing::error!(%path, %error, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => StorageConfig::default(),
    };

    let aggregator = match Aggregator::builder(build_world())
        .with_catalog(Arc::new(catalog()))
        .with_config(config)
        .build()
    {
        Ok(aggregator) => aggregator,
        Err(error) => {
            tracing::error!(%error, "invalid config");
            return ExitCode::FAILURE;
        }
    };

    let Some(report) = run_session(&aggregator, WOOD_NEEDED) else {
        tracing::error!("no reference point, nothing to aggregate");
        return ExitCode::FAILURE;
    };

    match serde_json::to_string(&report) {
        Ok(json) => tracing::info!(report = %json, "session finished"),
        Err(error) => tracing::warn!(%error, ?report, "could not serialize report"),
    }
    ExitCode::SUCCESS
}
