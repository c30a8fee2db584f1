//! Additive per-feature attribution.
//!
//! Each feature's contribution approximates its marginal effect: hold every
//! other feature at its encoded value, move this one to its population
//! reference value, and measure the prediction change. Raw estimates are then
//! renormalized so the contributions sum exactly to
//! `probability_survived - baseline_probability` (the efficiency invariant).

use crate::encoder::{FeatureVector, FEATURE_NAMES};
use crate::error::EngineError;
use crate::model::inference::ModelHandle;
use serde::Serialize;
use std::cmp::Ordering;

/// Absolute tolerance on the efficiency invariant.
pub const EFFICIENCY_TOLERANCE: f64 = 1e-6;

/// Signed attribution of one feature to one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
}

/// Decompose a prediction into per-feature contributions.
///
/// Returned contributions are sorted by descending absolute magnitude; ties
/// keep canonical feature order. Errors with `Computation` if any estimate is
/// non-finite or the renormalized sum still misses the target beyond
/// tolerance.
pub fn attribute(
    handle: &ModelHandle,
    vector: &FeatureVector,
    probability_survived: f64,
) -> Result<Vec<FeatureContribution>, EngineError> {
    let artifact = handle.artifact();
    let n = vector.len();

    let mut raw = Vec::with_capacity(n);
    for i in 0..n {
        let mut perturbed = vector.values().to_vec();
        perturbed[i] = artifact.reference_values[i];
        let reference_probability = handle.score(&perturbed)?;
        raw.push(probability_survived - reference_probability);
    }

    let target = probability_survived - artifact.baseline_probability;
    let raw_sum: f64 = raw.iter().sum();
    let residual = target - raw_sum;
    let magnitude_sum: f64 = raw.iter().map(|c| c.abs()).sum();

    // Distribute the residual proportionally to each raw magnitude so the
    // efficiency invariant holds exactly. A degenerate all-zero estimate
    // spreads the residual evenly.
    let mut contributions: Vec<FeatureContribution> = raw
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let value = if magnitude_sum > f64::EPSILON {
                c + residual * (c.abs() / magnitude_sum)
            } else {
                c + residual / n as f64
            };
            FeatureContribution {
                feature: FEATURE_NAMES[i].to_string(),
                value,
            }
        })
        .collect();

    if contributions.iter().any(|c| !c.value.is_finite()) {
        return Err(EngineError::computation(
            "attribution produced a non-finite contribution",
        ));
    }

    let total: f64 = contributions.iter().map(|c| c.value).sum();
    if (total - target).abs() > EFFICIENCY_TOLERANCE {
        return Err(EngineError::computation(format!(
            "attribution sum {total} misses target {target} beyond tolerance"
        )));
    }

    // Stable sort keeps canonical order among equal magnitudes
    contributions.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(Ordering::Equal)
    });

    Ok(contributions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FeatureEncoder;
    use crate::model::artifact::ModelArtifact;
    use crate::model::inference::PredictionService;
    use crate::types::passenger::{PassengerRecord, Sex};

    fn explain(record: &PassengerRecord) -> (Vec<FeatureContribution>, f64, f64) {
        let artifact = ModelArtifact::default();
        let baseline = artifact.baseline_probability;
        let handle = ModelHandle::new(artifact).unwrap();
        let encoder = FeatureEncoder::new(handle.artifact().age_median);

        let vector = encoder.encode(record).unwrap();
        let output = PredictionService::predict_with(&handle, &vector).unwrap();
        let contributions = attribute(&handle, &vector, output.probability_survived).unwrap();
        (contributions, output.probability_survived, baseline)
    }

    #[test]
    fn test_efficiency_invariant() {
        let records = [
            PassengerRecord::new(1, Sex::Female, 29.0)
                .with_fare(211.34)
                .with_name("Ms. Test Passenger")
                .with_cabin("C85"),
            PassengerRecord::new(3, Sex::Male, 22.0)
                .with_fare(7.25)
                .with_family(1, 0)
                .with_name("Mr. Test Passenger"),
            PassengerRecord::new(2, Sex::Female, 8.0)
                .with_fare(26.0)
                .with_family(1, 2)
                .with_name("Miss. Test Passenger"),
        ];

        for record in &records {
            let (contributions, probability, baseline) = explain(record);
            let sum: f64 = contributions.iter().map(|c| c.value).sum();
            assert!(
                (sum - (probability - baseline)).abs() < EFFICIENCY_TOLERANCE,
                "efficiency violated for {record:?}: sum={sum}"
            );
        }
    }

    #[test]
    fn test_sorted_by_descending_magnitude() {
        let record = PassengerRecord::new(1, Sex::Female, 29.0)
            .with_fare(211.34)
            .with_name("Mrs. Test Passenger");
        let (contributions, _, _) = explain(&record);

        assert_eq!(contributions.len(), FEATURE_NAMES.len());
        for pair in contributions.windows(2) {
            assert!(pair[0].value.abs() >= pair[1].value.abs());
        }
    }

    #[test]
    fn test_class_and_sex_dominate_for_first_class_female() {
        // A 1st-class female differs from the reference passenger mostly in
        // class and sex, so those marginals lead the ranking. The two sex
        // indicators produce identical raw marginals; the stable sort keeps
        // them in canonical order.
        let record = PassengerRecord::new(1, Sex::Female, 29.0).with_fare(211.34);
        let (contributions, _, _) = explain(&record);

        assert_eq!(contributions[0].feature, "pclass");
        assert_eq!(contributions[1].feature, "sex_male");
        assert_eq!(contributions[2].feature, "sex_female");
        assert!(contributions[0].value > 0.0);
        assert!(contributions[1].value > 0.0);
    }

    #[test]
    fn test_reference_passenger_attributions_are_balanced() {
        // The reference passenger matches every reference value, so all raw
        // marginals are zero and the residual is spread evenly.
        let record = PassengerRecord::new(3, Sex::Male, 28.0)
            .with_fare(14.45)
            .with_name("Mr. Reference");
        let (contributions, probability, baseline) = explain(&record);

        let expected = (probability - baseline) / FEATURE_NAMES.len() as f64;
        for contribution in &contributions {
            assert!((contribution.value - expected).abs() < 1e-12);
        }
    }
}
