//! Held-out dataset used for fairness auditing.
//!
//! Production deployments point the config at a labeled JSON file produced by
//! the training pipeline; the synthetic generator reproduces the historical
//! survival patterns for demos and tests.

use crate::types::passenger::{Embarked, PassengerRecord, Sex};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One held-out passenger with the known outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledPassenger {
    #[serde(flatten)]
    pub record: PassengerRecord,
    /// Actual outcome: 1 = survived
    #[serde(alias = "Survived")]
    pub survived: u8,
}

impl LabeledPassenger {
    pub fn survived(&self) -> bool {
        self.survived == 1
    }
}

/// Labeled evaluation dataset.
#[derive(Debug, Clone)]
pub struct HoldoutDataset {
    pub passengers: Vec<LabeledPassenger>,
}

impl HoldoutDataset {
    /// Load a labeled dataset from a JSON array file, validating every record
    /// at the boundary.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read holdout dataset from {}", path.display()))?;
        let passengers: Vec<LabeledPassenger> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse holdout dataset from {}", path.display()))?;

        for (index, passenger) in passengers.iter().enumerate() {
            passenger
                .record
                .validate()
                .with_context(|| format!("Invalid record at index {index}"))?;
        }

        info!(
            path = %path.display(),
            records = passengers.len(),
            "Holdout dataset loaded"
        );

        Ok(Self { passengers })
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    /// Generate a synthetic dataset following the historical survival
    /// patterns: women, upper classes and children survived more often.
    /// Deterministic for a given seed.
    pub fn synthetic(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut passengers = Vec::with_capacity(size);

        for index in 0..size {
            let pclass = weighted_choice(&mut rng, &[(1, 0.24), (2, 0.21), (3, 0.55)]);
            let sex = if rng.gen_bool(0.65) { Sex::Male } else { Sex::Female };
            // Sum of 12 uniforms approximates the training age distribution
            let normal: f64 = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
            let age = (29.7 + 14.5 * normal).clamp(0.42, 80.0);
            let sibsp = weighted_choice(&mut rng, &[(0, 0.68), (1, 0.23), (2, 0.05), (3, 0.04)]);
            let parch = weighted_choice(&mut rng, &[(0, 0.76), (1, 0.13), (2, 0.08), (3, 0.03)]);
            let normal: f64 = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
            let fare = (3.2 + normal).exp().clamp(0.0, 512.0);
            let embarked = weighted_choice(
                &mut rng,
                &[(Embarked::C, 0.19), (Embarked::Q, 0.09), (Embarked::S, 0.72)],
            );

            let title = match (sex, age < 16.0, sibsp > 0) {
                (Sex::Male, true, _) => "Master",
                (Sex::Male, false, _) => "Mr",
                (Sex::Female, _, true) => "Mrs",
                (Sex::Female, _, false) => "Miss",
            };
            let name = format!("Passenger {index}, {title}. Synthetic");

            let mut record = PassengerRecord::new(pclass, sex, age)
                .with_fare(fare)
                .with_embarked(embarked)
                .with_family(sibsp, parch)
                .with_name(name);
            if rng.gen_bool(0.23) {
                record = record.with_cabin(format!("C{}", rng.gen_range(1..100)));
            }

            // Historical survival odds: female +0.5, 1st class +0.4,
            // 2nd class +0.2, child +0.3, scaled and clamped
            let mut odds: f64 = 0.0;
            if sex == Sex::Female {
                odds += 0.5;
            }
            match pclass {
                1 => odds += 0.4,
                2 => odds += 0.2,
                _ => {}
            }
            if age < 16.0 {
                odds += 0.3;
            }
            let survival_probability = (odds / 1.2).clamp(0.05, 0.95);

            passengers.push(LabeledPassenger {
                record,
                survived: u8::from(rng.gen_bool(survival_probability)),
            });
        }

        Self { passengers }
    }
}

fn weighted_choice<T: Copy>(rng: &mut StdRng, choices: &[(T, f64)]) -> T {
    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    let mut draw = rng.gen::<f64>() * total;
    for &(value, weight) in choices {
        if draw < weight {
            return value;
        }
        draw -= weight;
    }
    choices[choices.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = HoldoutDataset::synthetic(50, 42);
        let b = HoldoutDataset::synthetic(50, 42);

        assert_eq!(a.len(), 50);
        for (x, y) in a.passengers.iter().zip(b.passengers.iter()) {
            assert_eq!(x.record, y.record);
            assert_eq!(x.survived, y.survived);
        }
    }

    #[test]
    fn test_synthetic_records_are_valid() {
        let dataset = HoldoutDataset::synthetic(200, 7);
        for passenger in &dataset.passengers {
            assert!(passenger.record.validate().is_ok());
            assert!(passenger.survived <= 1);
        }
    }

    #[test]
    fn test_synthetic_reflects_survival_patterns() {
        let dataset = HoldoutDataset::synthetic(2000, 42);

        let rate = |filter: &dyn Fn(&LabeledPassenger) -> bool| {
            let group: Vec<_> = dataset.passengers.iter().filter(|p| filter(p)).collect();
            group.iter().filter(|p| p.survived()).count() as f64 / group.len() as f64
        };

        let female = rate(&|p| p.record.sex == Sex::Female);
        let male = rate(&|p| p.record.sex == Sex::Male);
        let first = rate(&|p| p.record.pclass == 1);
        let third = rate(&|p| p.record.pclass == 3);

        assert!(female > male);
        assert!(first > third);
    }

    #[test]
    fn test_labeled_passenger_deserializes_dataset_columns() {
        let json = r#"{
            "Pclass": 2, "Sex": "female", "Age": 30.0, "SibSp": 0, "Parch": 1,
            "Fare": 26.0, "Embarked": "C", "Name": "Mrs. Example", "Survived": 1
        }"#;

        let passenger: LabeledPassenger = serde_json::from_str(json).unwrap();
        assert!(passenger.survived());
        assert_eq!(passenger.record.pclass, 2);
    }
}
