//! Fairness Pipeline - Main Entry Point
//!
//! Loads the model artifact and held-out dataset, runs demo predictions with
//! explanations, then audits the predictor for bias across sex and ticket
//! class with parallel workers.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use titanic_fairness_pipeline::{
    config::AppConfig,
    dataset::HoldoutDataset,
    metrics::AuditMetrics,
    model::ModelArtifact,
    pipeline::SurvivalPipeline,
    types::passenger::{PassengerRecord, Sex},
};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("titanic_fairness_pipeline=info".parse()?)
                .add_directive("fairness_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Fairness Pipeline");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, using defaults");
            AppConfig::default()
        }
    };

    // Load the model artifact
    let artifact = if Path::new(&config.model.artifact_path).exists() {
        ModelArtifact::load_from_path(&config.model.artifact_path)?
    } else {
        warn!(
            path = %config.model.artifact_path,
            "Model artifact not found, using built-in coefficients"
        );
        ModelArtifact::default()
    };
    info!(
        version = %artifact.version,
        features = artifact.feature_names.len(),
        "Model ready"
    );

    let pipeline = Arc::new(SurvivalPipeline::new(artifact)?);
    let metrics = Arc::new(AuditMetrics::new());

    // Demo predictions with explanations
    let examples = [
        PassengerRecord::new(1, Sex::Female, 29.0)
            .with_fare(211.34)
            .with_name("Ms. Test Passenger")
            .with_cabin("C85"),
        PassengerRecord::new(3, Sex::Male, 22.0)
            .with_fare(7.25)
            .with_family(1, 0)
            .with_name("Mr. Test Passenger"),
    ];

    for (i, passenger) in examples.iter().enumerate() {
        let explanation = pipeline.explain(passenger)?;
        info!(
            passenger = i + 1,
            survived = explanation.prediction.survived,
            probability = format!("{:.2}%", explanation.prediction.probability.survived * 100.0),
            confidence = format!("{:.2}", explanation.prediction.confidence),
            "Demo prediction"
        );
        for scenario in &explanation.counterfactuals {
            info!(
                change = %scenario.change,
                new_probability = format!("{:.2}%", scenario.new_probability * 100.0),
                difference = format!("{:+.2}%", scenario.difference * 100.0),
                "Counterfactual"
            );
        }
    }

    // Load the held-out dataset for auditing
    let dataset = if Path::new(&config.audit.holdout_path).exists() {
        HoldoutDataset::load_from_path(&config.audit.holdout_path)?
    } else {
        warn!(
            path = %config.audit.holdout_path,
            "Holdout dataset not found, generating a synthetic one"
        );
        HoldoutDataset::synthetic(config.audit.synthetic_size, config.audit.seed)
    };
    info!(records = dataset.len(), "Holdout dataset ready");

    // Audit the dataset in parallel: per-record encode+predict fans out
    // across workers, the merged rows reduce to one report
    let num_workers = config.pipeline.workers;
    info!(workers = num_workers, "Starting fairness audit");

    let semaphore = Arc::new(Semaphore::new(num_workers));
    let mut handles = Vec::with_capacity(dataset.len());

    // One snapshot for the whole audit; a model swap mid-run never mixes
    // versions within the report
    let model = pipeline.service().current()?;

    for passenger in dataset.passengers.iter().cloned() {
        let permit = semaphore.clone().acquire_owned().await?;
        let model = model.clone();
        let metrics = metrics.clone();

        handles.push(tokio::spawn(async move {
            let start_time = Instant::now();
            let scored = SurvivalPipeline::score_labeled_with(&model, &passenger);
            if let Ok((_, output)) = &scored {
                metrics.record_prediction(start_time.elapsed(), output.probability_survived);
            }
            drop(permit);
            scored.map(|(row, _)| row)
        }));
    }

    let mut rows = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await? {
            Ok(row) => rows.push(row),
            Err(e) => error!(error = %e, "Audit row failed, skipping record"),
        }
    }

    let report = pipeline.fairness_from_rows(&rows)?;
    info!(
        total = report.overall.total_predictions,
        accuracy = format!("{:.3}", report.overall.accuracy),
        balanced_accuracy = format!("{:.3}", report.overall.balanced_accuracy),
        "Audit complete"
    );
    info!(
        bias_detected = report.bias_analysis.bias_detected,
        severity = ?report.bias_analysis.severity,
        disparate_impact_sex = format!("{:.3}", report.by_sex.metrics.disparate_impact),
        disparate_impact_class = format!("{:.3}", report.by_class.metrics.disparate_impact),
        "Bias analysis"
    );
    for recommendation in &report.bias_analysis.recommendations {
        info!(recommendation = %recommendation, "Recommendation");
    }
    info!(
        report = %serde_json::to_string_pretty(&report)?,
        "Fairness report"
    );

    // Dataset-level importance
    let importance = pipeline.feature_importance(&dataset.passengers)?;
    for entry in importance.global_importance.iter().take(5) {
        info!(
            feature = %entry.feature,
            importance = format!("{:.3}", entry.importance),
            "Global importance"
        );
    }
    info!(
        report = %serde_json::to_string_pretty(&importance)?,
        "Feature importance report"
    );

    metrics.print_summary();

    Ok(())
}
