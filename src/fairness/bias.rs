//! Table-driven bias severity classification and mitigation recommendations.
//!
//! The thresholds live here and nowhere else; any presentation layer consumes
//! the classified result instead of re-deriving bands.

use crate::fairness::calculator::ParityMetrics;
use serde::Serialize;

/// Bias severity band. Ordering follows declaration, so the overall severity
/// of a report is simply the maximum across metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fair,
    Moderate,
    High,
}

/// Protected attribute under audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedAttribute {
    Sex,
    Class,
}

impl ProtectedAttribute {
    pub fn group_label(self) -> &'static str {
        match self {
            ProtectedAttribute::Sex => "sex",
            ProtectedAttribute::Class => "class",
        }
    }
}

/// The three parity metrics evaluated per attribute, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    DisparateImpact,
    EqualOpportunity,
    DemographicParity,
}

const ATTRIBUTES: [ProtectedAttribute; 2] = [ProtectedAttribute::Sex, ProtectedAttribute::Class];
const METRICS: [MetricKind; 3] = [
    MetricKind::DisparateImpact,
    MetricKind::EqualOpportunity,
    MetricKind::DemographicParity,
];

/// Severity bands. Disparate impact uses the symmetric min/max ratio, so the
/// upper fairness window bound is implied by ratio <= 1.
const DISPARATE_IMPACT_FAIR: f64 = 0.80;
const DISPARATE_IMPACT_MODERATE: f64 = 0.60;
const DIFFERENCE_FAIR: f64 = 0.10;
const DIFFERENCE_MODERATE: f64 = 0.20;

/// Aggregated bias verdict across all audited attributes.
#[derive(Debug, Clone, Serialize)]
pub struct BiasAnalysis {
    pub protected_groups: Vec<String>,
    pub bias_detected: bool,
    pub severity: Severity,
    pub recommendations: Vec<String>,
}

/// Classifies parity metrics into severity bands and emits the fixed
/// recommendation per (attribute, metric, severity).
pub struct BiasClassifier;

impl BiasClassifier {
    /// Band a min/max disparate impact ratio.
    pub fn classify_disparate_impact(ratio: f64) -> Severity {
        if ratio >= DISPARATE_IMPACT_FAIR {
            Severity::Fair
        } else if ratio >= DISPARATE_IMPACT_MODERATE {
            Severity::Moderate
        } else {
            Severity::High
        }
    }

    /// Band an absolute rate difference (equal opportunity or demographic
    /// parity).
    pub fn classify_difference(difference: f64) -> Severity {
        if difference <= DIFFERENCE_FAIR {
            Severity::Fair
        } else if difference <= DIFFERENCE_MODERATE {
            Severity::Moderate
        } else {
            Severity::High
        }
    }

    fn classify_metric(metrics: &ParityMetrics, kind: MetricKind) -> Severity {
        match kind {
            MetricKind::DisparateImpact => {
                Self::classify_disparate_impact(metrics.disparate_impact)
            }
            MetricKind::EqualOpportunity => {
                Self::classify_difference(metrics.equal_opportunity_diff)
            }
            MetricKind::DemographicParity => {
                Self::classify_difference(metrics.demographic_parity_diff)
            }
        }
    }

    /// Evaluate both protected attributes. Overall severity is the maximum
    /// across all six (attribute, metric) cells; recommendations follow
    /// attribute-then-metric declaration order.
    pub fn analyze(sex: &ParityMetrics, class: &ParityMetrics) -> BiasAnalysis {
        let mut severity = Severity::Fair;
        let mut recommendations = Vec::new();

        for attribute in ATTRIBUTES {
            let metrics = match attribute {
                ProtectedAttribute::Sex => sex,
                ProtectedAttribute::Class => class,
            };
            for kind in METRICS {
                let cell = Self::classify_metric(metrics, kind);
                severity = severity.max(cell);
                if let Some(text) = recommendation(attribute, kind, cell) {
                    recommendations.push(text.to_string());
                }
            }
        }

        BiasAnalysis {
            protected_groups: ATTRIBUTES
                .iter()
                .map(|a| a.group_label().to_string())
                .collect(),
            bias_detected: severity != Severity::Fair,
            severity,
            recommendations,
        }
    }
}

/// Fixed recommendation strings keyed by (attribute, metric, severity).
fn recommendation(
    attribute: ProtectedAttribute,
    metric: MetricKind,
    severity: Severity,
) -> Option<&'static str> {
    use MetricKind::*;
    use ProtectedAttribute::*;
    use Severity::*;

    match (attribute, metric, severity) {
        (_, _, Fair) => None,
        (Sex, DisparateImpact, Moderate) => Some(
            "Moderate disparate impact between male and female passengers: audit sex-correlated features and consider reweighing training samples",
        ),
        (Sex, DisparateImpact, High) => Some(
            "High disparate impact between male and female passengers: apply per-sex threshold adjustment in post-processing",
        ),
        (Sex, EqualOpportunity, Moderate) => Some(
            "Moderate equal-opportunity gap between male and female passengers: compare per-sex true-positive rates and rebalance positive training examples",
        ),
        (Sex, EqualOpportunity, High) => Some(
            "High equal-opportunity gap between male and female passengers: equalize true-positive rates with per-sex decision thresholds",
        ),
        (Sex, DemographicParity, Moderate) => Some(
            "Moderate demographic parity gap between male and female passengers: monitor positive-prediction rates per sex on each model release",
        ),
        (Sex, DemographicParity, High) => Some(
            "High demographic parity gap between male and female passengers: constrain positive-prediction rates per sex in post-processing",
        ),
        (Class, DisparateImpact, Moderate) => Some(
            "Moderate disparate impact between 1st-class and other passengers: audit class-correlated features such as fare and cabin",
        ),
        (Class, DisparateImpact, High) => Some(
            "High disparate impact between 1st-class and other passengers: apply per-class threshold adjustment in post-processing",
        ),
        (Class, EqualOpportunity, Moderate) => Some(
            "Moderate equal-opportunity gap between 1st-class and other passengers: compare per-class true-positive rates and rebalance positive training examples",
        ),
        (Class, EqualOpportunity, High) => Some(
            "High equal-opportunity gap between 1st-class and other passengers: equalize true-positive rates with per-class decision thresholds",
        ),
        (Class, DemographicParity, Moderate) => Some(
            "Moderate demographic parity gap between 1st-class and other passengers: monitor positive-prediction rates per class on each model release",
        ),
        (Class, DemographicParity, High) => Some(
            "High demographic parity gap between 1st-class and other passengers: constrain positive-prediction rates per class in post-processing",
        ),
    }
}
