//! Response shapes for the four engine operations.
//!
//! These are the JSON surfaces an HTTP collaborator serializes verbatim.

use crate::explain::attribution::FeatureContribution;
use crate::explain::counterfactual::CounterfactualScenario;
use crate::explain::importance::{FeatureImportanceEntry, PartialDependencePoint};
use crate::fairness::bias::BiasAnalysis;
use crate::fairness::calculator::{ClassBreakdown, OverallStats, SexBreakdown};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Probability pair for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityPair {
    pub died: f64,
    pub survived: f64,
}

/// Response of the `predict` operation.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    /// Predicted label: 1 = survived
    pub survived: u8,
    pub probability: ProbabilityPair,
    /// Top per-feature attributions, strongest first
    pub feature_importance: Vec<FeatureContribution>,
    /// Probability of the predicted outcome
    pub confidence: f64,
}

/// Response of the `explain` operation: prediction plus what-if scenarios.
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationResponse {
    #[serde(flatten)]
    pub prediction: PredictionResponse,
    pub counterfactuals: Vec<CounterfactualScenario>,
}

/// Response of the `fairness` operation.
#[derive(Debug, Clone, Serialize)]
pub struct FairnessResponse {
    /// Unique report identifier
    pub report_id: String,
    /// Report generation timestamp
    pub generated_at: DateTime<Utc>,
    pub overall: OverallStats,
    pub by_sex: SexBreakdown,
    pub by_class: ClassBreakdown,
    pub bias_analysis: BiasAnalysis,
}

impl FairnessResponse {
    /// Stamp a fresh report from audit aggregates and the bias verdict.
    pub fn new(
        overall: OverallStats,
        by_sex: SexBreakdown,
        by_class: ClassBreakdown,
        bias_analysis: BiasAnalysis,
    ) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            overall,
            by_sex,
            by_class,
            bias_analysis,
        }
    }
}

/// Partial dependence sweeps keyed by the raw feature they vary.
#[derive(Debug, Clone, Serialize)]
pub struct PartialDependence {
    #[serde(rename = "Age")]
    pub age: Vec<PartialDependencePoint>,
    #[serde(rename = "Fare")]
    pub fare: Vec<PartialDependencePoint>,
}

/// Response of the `feature-importance` operation.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportanceResponse {
    pub global_importance: Vec<FeatureImportanceEntry>,
    pub partial_dependence: PartialDependence,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fairness::bias::Severity;
    use crate::fairness::calculator::{GroupStats, ParityMetrics};

    fn stats() -> GroupStats {
        GroupStats {
            count: 10,
            actual_survival_rate: 0.4,
            predicted_survival_rate: 0.5,
            accuracy: 0.8,
        }
    }

    fn parity() -> ParityMetrics {
        ParityMetrics {
            disparate_impact: 0.9,
            equal_opportunity_diff: 0.05,
            demographic_parity_diff: 0.05,
            low_support: false,
        }
    }

    #[test]
    fn test_prediction_response_shape() {
        let response = PredictionResponse {
            survived: 1,
            probability: ProbabilityPair {
                died: 0.17,
                survived: 0.83,
            },
            feature_importance: vec![FeatureContribution {
                feature: "sex_female".to_string(),
                value: 0.3,
            }],
            confidence: 0.83,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["survived"], 1);
        assert_eq!(json["probability"]["survived"], 0.83);
        assert_eq!(json["confidence"], 0.83);
        assert_eq!(json["feature_importance"][0]["feature"], "sex_female");
    }

    #[test]
    fn test_explanation_flattens_prediction_fields() {
        let response = ExplanationResponse {
            prediction: PredictionResponse {
                survived: 0,
                probability: ProbabilityPair {
                    died: 0.96,
                    survived: 0.04,
                },
                feature_importance: vec![],
                confidence: 0.96,
            },
            counterfactuals: vec![CounterfactualScenario {
                change: "If female".to_string(),
                new_probability: 0.33,
                difference: 0.29,
            }],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["survived"], 0);
        assert_eq!(json["counterfactuals"][0]["change"], "If female");
    }

    #[test]
    fn test_fairness_response_shape() {
        let response = FairnessResponse::new(
            OverallStats {
                total_predictions: 20,
                accuracy: 0.85,
                balanced_accuracy: 0.82,
            },
            SexBreakdown {
                male: stats(),
                female: stats(),
                metrics: parity(),
            },
            ClassBreakdown {
                first: stats(),
                second: stats(),
                third: stats(),
                metrics: parity(),
            },
            BiasAnalysis {
                protected_groups: vec!["sex".to_string(), "class".to_string()],
                bias_detected: false,
                severity: Severity::Fair,
                recommendations: vec![],
            },
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["overall"]["total_predictions"], 20);
        assert!(json["by_sex"]["male"]["accuracy"].is_number());
        assert_eq!(json["bias_analysis"]["severity"], "fair");
        assert_eq!(json["bias_analysis"]["bias_detected"], false);
        assert!(json["report_id"].is_string());
    }
}
