//! Dataset-level importance: global attributions and partial dependence.

use crate::encoder::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::error::EngineError;
use crate::explain::attribution::attribute;
use crate::model::inference::{ModelHandle, PredictionService};
use serde::Serialize;
use std::cmp::Ordering;

/// Grid swept for Age partial dependence (years).
pub const AGE_GRID: (f64, f64, f64) = (0.0, 80.0, 5.0);
/// Grid swept for Fare partial dependence.
pub const FARE_GRID: (f64, f64, f64) = (0.0, 500.0, 25.0);

/// One feature's share of the model's overall attribution mass.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportanceEntry {
    pub feature: String,
    /// Mean absolute attribution over the dataset, normalized to sum to 1
    pub importance: f64,
    pub description: String,
}

/// Predicted probability at one grid point of a feature sweep.
#[derive(Debug, Clone, Serialize)]
pub struct PartialDependencePoint {
    pub value: f64,
    pub effect: f64,
}

fn describe(feature: &str) -> &'static str {
    match feature {
        "pclass" => "Ticket class (1st, 2nd, 3rd)",
        "age" => "Age in years",
        "sibsp" => "Siblings/spouses aboard",
        "parch" => "Parents/children aboard",
        "fare" => "Ticket fare paid",
        "family_size" => "Total family members aboard including the passenger",
        "is_alone" => "Travelling without family",
        "fare_per_person" => "Fare split across the family group",
        "has_cabin" => "Cabin number recorded",
        "sex_male" => "Passenger is male",
        "sex_female" => "Passenger is female",
        "embarked_c" => "Embarked at Cherbourg",
        "embarked_q" => "Embarked at Queenstown",
        "embarked_s" => "Embarked at Southampton",
        "title_mr" => "Honorific title Mr",
        "title_mrs" => "Honorific title Mrs",
        "title_miss" => "Honorific title Miss",
        "title_master" => "Honorific title Master",
        _ => "Honorific title outside the common set",
    }
}

/// Average absolute attribution per feature over an evaluation dataset,
/// normalized to sum to 1, sorted by descending importance.
pub fn global_importance(
    handle: &ModelHandle,
    vectors: &[FeatureVector],
) -> Result<Vec<FeatureImportanceEntry>, EngineError> {
    if vectors.is_empty() {
        return Err(EngineError::computation(
            "global importance requires a non-empty evaluation dataset",
        ));
    }

    let mut totals = vec![0.0_f64; FEATURE_COUNT];
    for vector in vectors {
        let output = PredictionService::predict_with(handle, vector)?;
        let contributions = attribute(handle, vector, output.probability_survived)?;
        for contribution in contributions {
            let index = FEATURE_NAMES
                .iter()
                .position(|&n| n == contribution.feature)
                .ok_or_else(|| {
                    EngineError::computation(format!(
                        "attribution returned unknown feature `{}`",
                        contribution.feature
                    ))
                })?;
            totals[index] += contribution.value.abs();
        }
    }

    let mass: f64 = totals.iter().sum();
    let mut entries: Vec<FeatureImportanceEntry> = FEATURE_NAMES
        .iter()
        .zip(totals.iter())
        .map(|(&feature, &total)| FeatureImportanceEntry {
            feature: feature.to_string(),
            importance: if mass > 0.0 { total / mass } else { 0.0 },
            description: describe(feature).to_string(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });

    Ok(entries)
}

/// Per-column medians over the encoded dataset, used as the held-fixed
/// context for partial dependence sweeps.
pub fn column_medians(vectors: &[FeatureVector]) -> Vec<f64> {
    let mut medians = Vec::with_capacity(FEATURE_COUNT);
    for column in 0..FEATURE_COUNT {
        let mut values: Vec<f64> = vectors.iter().map(|v| v.values()[column]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let median = if values.is_empty() {
            0.0
        } else {
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        };
        medians.push(median);
    }
    medians
}

/// Sweep one feature over a (start, end, step) grid while holding every other
/// feature at its dataset median, recording the predicted probability.
pub fn partial_dependence(
    handle: &ModelHandle,
    medians: &[f64],
    feature: &str,
    grid: (f64, f64, f64),
) -> Result<Vec<PartialDependencePoint>, EngineError> {
    let index = FEATURE_NAMES
        .iter()
        .position(|&n| n == feature)
        .ok_or_else(|| EngineError::computation(format!("unknown feature `{feature}`")))?;

    let (start, end, step) = grid;
    let steps = ((end - start) / step).round() as usize;
    let mut points = Vec::with_capacity(steps + 1);

    for i in 0..=steps {
        let value = start + step * i as f64;
        let mut features = medians.to_vec();
        features[index] = value;
        let effect = handle.score(&features)?;
        points.push(PartialDependencePoint { value, effect });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FeatureEncoder;
    use crate::model::artifact::ModelArtifact;
    use crate::types::passenger::{PassengerRecord, Sex};

    fn sample_vectors() -> (ModelHandle, Vec<FeatureVector>) {
        let handle = ModelHandle::new(ModelArtifact::default()).unwrap();
        let encoder = FeatureEncoder::new(handle.artifact().age_median);

        let records = [
            PassengerRecord::new(1, Sex::Female, 29.0).with_fare(211.34),
            PassengerRecord::new(3, Sex::Male, 22.0).with_fare(7.25).with_family(1, 0),
            PassengerRecord::new(2, Sex::Female, 40.0).with_fare(26.0),
            PassengerRecord::new(3, Sex::Male, 55.0).with_fare(8.05),
            PassengerRecord::new(1, Sex::Male, 35.0).with_fare(82.17).with_cabin("B20"),
        ];
        let vectors = records
            .iter()
            .map(|r| encoder.encode(r).unwrap())
            .collect();
        (handle, vectors)
    }

    #[test]
    fn test_global_importance_normalized() {
        let (handle, vectors) = sample_vectors();
        let entries = global_importance(&handle, &vectors).unwrap();

        assert_eq!(entries.len(), FEATURE_COUNT);
        let total: f64 = entries.iter().map(|e| e.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for pair in entries.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }

    #[test]
    fn test_global_importance_rejects_empty_dataset() {
        let (handle, _) = sample_vectors();
        assert!(global_importance(&handle, &[]).is_err());
    }

    #[test]
    fn test_column_medians_odd_count() {
        let (_, vectors) = sample_vectors();
        let medians = column_medians(&vectors);

        assert_eq!(medians.len(), FEATURE_COUNT);
        // Median pclass of [1, 3, 2, 3, 1] is 2
        assert_eq!(medians[0], 2.0);
    }

    #[test]
    fn test_partial_dependence_grid_shape() {
        let (handle, vectors) = sample_vectors();
        let medians = column_medians(&vectors);

        let age = partial_dependence(&handle, &medians, "age", AGE_GRID).unwrap();
        assert_eq!(age.len(), 17);
        assert_eq!(age.first().unwrap().value, 0.0);
        assert_eq!(age.last().unwrap().value, 80.0);

        let fare = partial_dependence(&handle, &medians, "fare", FARE_GRID).unwrap();
        assert_eq!(fare.len(), 21);
        assert_eq!(fare.last().unwrap().value, 500.0);

        for point in age.iter().chain(fare.iter()) {
            assert!((0.0..=1.0).contains(&point.effect));
        }
    }

    #[test]
    fn test_age_sweep_is_monotonically_decreasing() {
        // The age coefficient is negative, so survival probability should
        // fall as the sweep advances.
        let (handle, vectors) = sample_vectors();
        let medians = column_medians(&vectors);
        let age = partial_dependence(&handle, &medians, "age", AGE_GRID).unwrap();

        for pair in age.windows(2) {
            assert!(pair[0].effect > pair[1].effect);
        }
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let (handle, vectors) = sample_vectors();
        let medians = column_medians(&vectors);
        assert!(partial_dependence(&handle, &medians, "deck", AGE_GRID).is_err());
    }
}
