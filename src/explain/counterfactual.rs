//! Counterfactual "what-if" scenario generation.
//!
//! Perturbations come from a fixed, versioned catalog and run in declaration
//! order so consumers see a stable narrative ordering. Every entry executes
//! for every record; a perturbation that happens to reproduce the original
//! record simply reports a zero difference.

use crate::encoder::FeatureEncoder;
use crate::error::EngineError;
use crate::model::inference::{ModelHandle, PredictionService};
use crate::types::passenger::{Embarked, PassengerRecord, Sex};
use serde::Serialize;

/// Effect of one hypothetical perturbation on the survival probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterfactualScenario {
    /// Human-readable description of the change
    pub change: String,
    pub new_probability: f64,
    /// new_probability - original_probability, recomputed fresh per call
    pub difference: f64,
}

/// One entry in the perturbation catalog.
#[derive(Debug, Clone, Copy)]
enum Perturbation {
    SetClass(u8),
    FlipSex,
    SetAge(f64),
    ZeroFare,
    SetEmbarked(Embarked),
}

/// The catalog, in declaration order. Versioned with the engine, not derived
/// from the record.
const CATALOG: [Perturbation; 7] = [
    Perturbation::SetClass(1),
    Perturbation::SetClass(2),
    Perturbation::SetClass(3),
    Perturbation::FlipSex,
    Perturbation::SetAge(10.0),
    Perturbation::ZeroFare,
    Perturbation::SetEmbarked(Embarked::C),
];

impl Perturbation {
    /// Produce the perturbed record. The original is never mutated.
    fn apply(self, record: &PassengerRecord) -> PassengerRecord {
        let mut perturbed = record.clone();
        match self {
            Perturbation::SetClass(class) => perturbed.pclass = class,
            Perturbation::FlipSex => perturbed.sex = record.sex.flipped(),
            Perturbation::SetAge(age) => perturbed.age = Some(age),
            Perturbation::ZeroFare => perturbed.fare = 0.0,
            Perturbation::SetEmbarked(port) => perturbed.embarked = port,
        }
        perturbed
    }

    fn describe(self, record: &PassengerRecord) -> String {
        match self {
            Perturbation::SetClass(class) => format!("Passenger in Class {class}"),
            Perturbation::FlipSex => match record.sex.flipped() {
                Sex::Female => "If female".to_string(),
                Sex::Male => "If male".to_string(),
            },
            Perturbation::SetAge(age) => format!("Age set to {age:.0}"),
            Perturbation::ZeroFare => "Fare set to 0".to_string(),
            Perturbation::SetEmbarked(port) => format!("Embarked at {}", port.port_name()),
        }
    }
}

/// Run the full catalog against one record.
///
/// Each scenario re-encodes and re-predicts the perturbed record against the
/// same model snapshot, so every difference is comparable to
/// `original_probability`.
pub fn counterfactuals(
    handle: &ModelHandle,
    record: &PassengerRecord,
    original_probability: f64,
) -> Result<Vec<CounterfactualScenario>, EngineError> {
    let encoder = FeatureEncoder::new(handle.artifact().age_median);
    let mut scenarios = Vec::with_capacity(CATALOG.len());

    for perturbation in CATALOG {
        let perturbed = perturbation.apply(record);
        let vector = encoder.encode(&perturbed)?;
        let output = PredictionService::predict_with(handle, &vector)?;

        scenarios.push(CounterfactualScenario {
            change: perturbation.describe(record),
            new_probability: output.probability_survived,
            difference: output.probability_survived - original_probability,
        });
    }

    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::ModelArtifact;

    fn run(record: &PassengerRecord) -> (Vec<CounterfactualScenario>, f64) {
        let handle = ModelHandle::new(ModelArtifact::default()).unwrap();
        let encoder = FeatureEncoder::new(handle.artifact().age_median);
        let vector = encoder.encode(record).unwrap();
        let output = PredictionService::predict_with(&handle, &vector).unwrap();
        let scenarios = counterfactuals(&handle, record, output.probability_survived).unwrap();
        (scenarios, output.probability_survived)
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let record = PassengerRecord::new(3, Sex::Male, 30.0).with_fare(15.0);
        let (scenarios, _) = run(&record);

        let changes: Vec<&str> = scenarios.iter().map(|s| s.change.as_str()).collect();
        assert_eq!(
            changes,
            vec![
                "Passenger in Class 1",
                "Passenger in Class 2",
                "Passenger in Class 3",
                "If female",
                "Age set to 10",
                "Fare set to 0",
                "Embarked at Cherbourg",
            ]
        );
    }

    #[test]
    fn test_flip_sex_raises_male_third_class_probability() {
        let record = PassengerRecord::new(3, Sex::Male, 30.0).with_fare(15.0);
        let (scenarios, _) = run(&record);

        let flip = scenarios.iter().find(|s| s.change == "If female").unwrap();
        assert!(flip.difference > 0.0);
    }

    #[test]
    fn test_identity_perturbation_reports_zero_difference() {
        // "Passenger in Class 3" on a 3rd-class record still executes and
        // reproduces the original probability.
        let record = PassengerRecord::new(3, Sex::Male, 30.0).with_fare(15.0);
        let (scenarios, original) = run(&record);

        let same_class = &scenarios[2];
        assert_eq!(same_class.change, "Passenger in Class 3");
        assert!((same_class.new_probability - original).abs() < 1e-12);
        assert!(same_class.difference.abs() < 1e-12);
    }

    #[test]
    fn test_original_record_is_never_mutated() {
        let record = PassengerRecord::new(2, Sex::Female, 35.0).with_fare(30.0);
        let snapshot = record.clone();
        let _ = run(&record);
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_class_upgrade_helps_third_class_male() {
        let record = PassengerRecord::new(3, Sex::Male, 30.0).with_fare(15.0);
        let (scenarios, _) = run(&record);

        let first_class = &scenarios[0];
        assert!(first_class.difference > 0.0);
    }
}
