//! Holdout Dataset Generator
//!
//! Generates a labeled synthetic passenger dataset for fairness auditing and
//! writes it as a JSON file the pipeline can load.

use anyhow::{Context, Result};
use titanic_fairness_pipeline::dataset::HoldoutDataset;
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_holdout=info".parse()?)
                .add_directive("titanic_fairness_pipeline=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("data/holdout.json");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(891);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);

    info!(output = %output, count = count, seed = seed, "Generating holdout dataset");

    let dataset = HoldoutDataset::synthetic(count, seed);
    let survivors = dataset
        .passengers
        .iter()
        .filter(|p| p.survived())
        .count();

    if let Some(parent) = std::path::Path::new(output).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&dataset.passengers)?;
    std::fs::write(output, json).with_context(|| format!("Failed to write {output}"))?;

    info!(
        records = dataset.len(),
        survivors = survivors,
        survival_rate = format!("{:.1}%", survivors as f64 / dataset.len() as f64 * 100.0),
        "Holdout dataset written"
    );

    Ok(())
}
