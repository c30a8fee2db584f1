//! Engine facade exposing the four external operations.
//!
//! An HTTP collaborator maps each operation to an endpoint; everything here
//! is a pure, synchronous computation over one model snapshot per call.

use crate::dataset::LabeledPassenger;
use crate::encoder::FeatureEncoder;
use crate::error::EngineError;
use crate::explain::attribution::attribute;
use crate::explain::counterfactual::counterfactuals;
use crate::explain::importance::{
    column_medians, global_importance, partial_dependence, AGE_GRID, FARE_GRID,
};
use crate::fairness::bias::BiasClassifier;
use crate::fairness::calculator::{AuditRow, FairnessCalculator};
use crate::model::artifact::ModelArtifact;
use crate::model::inference::{ModelHandle, PredictionOutput, PredictionService};
use crate::types::passenger::PassengerRecord;
use crate::types::response::{
    ExplanationResponse, FairnessResponse, FeatureImportanceResponse, PartialDependence,
    PredictionResponse, ProbabilityPair,
};
use std::sync::Arc;

/// Number of attributions reported in prediction responses.
const TOP_ATTRIBUTIONS: usize = 10;

/// Fairness-aware survival prediction and explanation engine.
pub struct SurvivalPipeline {
    service: PredictionService,
}

impl SurvivalPipeline {
    /// Build a pipeline around an artifact's own scorer.
    pub fn new(artifact: ModelArtifact) -> Result<Self, EngineError> {
        Ok(Self {
            service: PredictionService::with_model(ModelHandle::new(artifact)?),
        })
    }

    /// Build a pipeline around an already configured prediction service,
    /// e.g. one wrapping an externally injected scorer.
    pub fn with_service(service: PredictionService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &PredictionService {
        &self.service
    }

    fn snapshot(&self) -> Result<Arc<ModelHandle>, EngineError> {
        self.service.current()
    }

    fn predict_with_handle(
        handle: &ModelHandle,
        record: &PassengerRecord,
    ) -> Result<PredictionResponse, EngineError> {
        record.validate()?;
        let encoder = FeatureEncoder::new(handle.artifact().age_median);
        let vector = encoder.encode(record)?;
        let output = PredictionService::predict_with(handle, &vector)?;

        let mut feature_importance = attribute(handle, &vector, output.probability_survived)?;
        feature_importance.truncate(TOP_ATTRIBUTIONS);

        Ok(PredictionResponse {
            survived: output.predicted_label,
            probability: ProbabilityPair {
                died: output.probability_died,
                survived: output.probability_survived,
            },
            feature_importance,
            confidence: output.confidence(),
        })
    }

    /// Predict survival for one passenger.
    pub fn predict(&self, record: &PassengerRecord) -> Result<PredictionResponse, EngineError> {
        let handle = self.snapshot()?;
        Self::predict_with_handle(&handle, record)
    }

    /// Predict for multiple passengers against one model snapshot.
    pub fn batch_predict(
        &self,
        records: &[PassengerRecord],
    ) -> Result<Vec<PredictionResponse>, EngineError> {
        let handle = self.snapshot()?;
        records
            .iter()
            .map(|record| Self::predict_with_handle(&handle, record))
            .collect()
    }

    /// Predict plus counterfactual what-if scenarios.
    pub fn explain(&self, record: &PassengerRecord) -> Result<ExplanationResponse, EngineError> {
        let handle = self.snapshot()?;
        let prediction = Self::predict_with_handle(&handle, record)?;
        let counterfactuals =
            counterfactuals(&handle, record, prediction.probability.survived)?;

        Ok(ExplanationResponse {
            prediction,
            counterfactuals,
        })
    }

    /// Encode and predict one labeled passenger against a specific model
    /// snapshot, returning the audit row along with the raw model output.
    /// Audit runners acquire one handle up front and pass it for every row,
    /// so a model swap mid-audit never mixes versions within one report.
    pub fn score_labeled_with(
        handle: &ModelHandle,
        passenger: &LabeledPassenger,
    ) -> Result<(AuditRow, PredictionOutput), EngineError> {
        passenger.record.validate()?;
        let encoder = FeatureEncoder::new(handle.artifact().age_median);
        let vector = encoder.encode(&passenger.record)?;
        let output = PredictionService::predict_with(handle, &vector)?;

        let row = AuditRow::new(
            &passenger.record,
            passenger.survived(),
            output.predicted_label == 1,
        );
        Ok((row, output))
    }

    /// Encode and predict one labeled passenger against the current snapshot.
    pub fn score_labeled(
        &self,
        passenger: &LabeledPassenger,
    ) -> Result<(AuditRow, PredictionOutput), EngineError> {
        let handle = self.snapshot()?;
        Self::score_labeled_with(&handle, passenger)
    }

    /// Encode and predict one labeled passenger into an audit row.
    pub fn audit_row(&self, passenger: &LabeledPassenger) -> Result<AuditRow, EngineError> {
        self.score_labeled(passenger).map(|(row, _)| row)
    }

    /// Full fairness audit over a labeled dataset. All rows are scored
    /// against one model snapshot.
    pub fn fairness(
        &self,
        dataset: &[LabeledPassenger],
    ) -> Result<FairnessResponse, EngineError> {
        let handle = self.snapshot()?;
        let rows = dataset
            .iter()
            .map(|passenger| Self::score_labeled_with(&handle, passenger).map(|(row, _)| row))
            .collect::<Result<Vec<_>, _>>()?;
        self.fairness_from_rows(&rows)
    }

    /// Assemble a fairness report from already computed audit rows. Parallel
    /// callers produce rows concurrently and hand them over here; row order
    /// does not affect the result.
    pub fn fairness_from_rows(&self, rows: &[AuditRow]) -> Result<FairnessResponse, EngineError> {
        let audit = FairnessCalculator::audit(rows)?;
        let analysis = BiasClassifier::analyze(&audit.by_sex.metrics, &audit.by_class.metrics);

        Ok(FairnessResponse::new(
            audit.overall,
            audit.by_sex,
            audit.by_class,
            analysis,
        ))
    }

    /// Dataset-level global importance and partial dependence sweeps.
    pub fn feature_importance(
        &self,
        dataset: &[LabeledPassenger],
    ) -> Result<FeatureImportanceResponse, EngineError> {
        let handle = self.snapshot()?;
        let encoder = FeatureEncoder::new(handle.artifact().age_median);

        let vectors = dataset
            .iter()
            .map(|passenger| {
                passenger.record.validate()?;
                encoder.encode(&passenger.record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let global_importance = global_importance(&handle, &vectors)?;
        let medians = column_medians(&vectors);

        Ok(FeatureImportanceResponse {
            global_importance,
            partial_dependence: PartialDependence {
                age: partial_dependence(&handle, &medians, "age", AGE_GRID)?,
                fare: partial_dependence(&handle, &medians, "fare", FARE_GRID)?,
            },
        })
    }
}
