use std::collections::BTreeMap;
use std::process::ExitCode;

use crosspromo_match::config::{LoggingSettings, Settings};
use crosspromo_match::models::{BatchEntry, BatchRequest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr; stdout carries the results
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings.logging);

    let Some(path) = std::env::args().nth(1) else {
        error!("Usage: crosspromo-match <batch.json>");
        return ExitCode::FAILURE;
    };

    let request: BatchRequest = match std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to read batch request from {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let batch = settings.batch_matcher();
    info!(
        "Matcher initialized with criteria: {:?} (policy {:?})",
        batch.matcher().default_criteria(),
        batch.matcher().weight_policy()
    );

    let results = match batch
        .batch_find_matches(request.sources, request.candidates, request.criteria)
        .await
    {
        Ok(results) => results,
        Err(e) => {
            error!("Batch rejected: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let entries: BTreeMap<String, BatchEntry> = results
        .into_iter()
        .map(|(source_id, result)| (source_id, BatchEntry::from(result)))
        .collect();

    match serde_json::to_string_pretty(&entries) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize results: {}", e);
            ExitCode::FAILURE
        }
    }
}
