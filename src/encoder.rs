//! Feature encoding for survival model inference.
//!
//! Transforms raw passenger records into the numeric feature vector the
//! model was trained on. The feature order is canonical and versioned with
//! the model artifact; attribution and importance reporting map positions
//! back to names through this order.

use crate::error::EngineError;
use crate::types::passenger::{Embarked, PassengerRecord, Sex};

/// Canonical feature order. Must match `ModelArtifact::feature_names`.
pub const FEATURE_NAMES: [&str; 19] = [
    "pclass",
    "age",
    "sibsp",
    "parch",
    "fare",
    "family_size",
    "is_alone",
    "fare_per_person",
    "has_cabin",
    "sex_male",
    "sex_female",
    "embarked_c",
    "embarked_q",
    "embarked_s",
    "title_mr",
    "title_mrs",
    "title_miss",
    "title_master",
    "title_other",
];

/// Number of features produced by the encoder.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Encoded numeric form of a passenger record.
///
/// Values are stored in canonical order; `FEATURE_NAMES[i]` names `values[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a feature value by canonical name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.values[i])
    }

    /// Iterate (name, value) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

/// Honorific title extracted from the passenger name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Title {
    Mr,
    Mrs,
    Miss,
    Master,
    Other,
}

/// Extract the honorific title from a name like "Braund, Mr. Owen Harris".
///
/// The title is the first dotted token after the surname comma, so surnames
/// that themselves contain a period ("St. John") never shadow it. Folds
/// historical variants the way the training preprocessor did:
/// Mlle/Ms -> Miss, Mme -> Mrs, rare titles -> Other.
fn extract_title(name: &str) -> Title {
    let after_surname = name.split_once(',').map_or(name, |(_, rest)| rest);
    let token = after_surname
        .split_whitespace()
        .find_map(|t| t.strip_suffix('.'))
        .unwrap_or("");

    match token {
        "Mr" => Title::Mr,
        "Mrs" | "Mme" => Title::Mrs,
        "Miss" | "Mlle" | "Ms" => Title::Miss,
        "Master" => Title::Master,
        _ => Title::Other,
    }
}

/// Feature encoder that transforms passenger records into model input.
///
/// Pure and deterministic: the same record always encodes to the same
/// vector. The age imputation median comes from the model artifact, never
/// recomputed per call.
pub struct FeatureEncoder {
    age_median: f64,
}

impl FeatureEncoder {
    /// Create an encoder with the artifact-supplied age imputation median.
    pub fn new(age_median: f64) -> Self {
        Self { age_median }
    }

    /// Encode a validated passenger record into the canonical feature vector.
    pub fn encode(&self, record: &PassengerRecord) -> Result<FeatureVector, EngineError> {
        let age = record.age.unwrap_or(self.age_median);
        let family_size = f64::from(record.sibsp + record.parch + 1);
        let is_alone = if record.sibsp + record.parch == 0 { 1.0 } else { 0.0 };
        let fare_per_person = record.fare / family_size;
        let has_cabin = if record.cabin.is_some() { 1.0 } else { 0.0 };
        let title = extract_title(&record.name);

        let mut values = Vec::with_capacity(FEATURE_COUNT);
        values.push(f64::from(record.pclass));
        values.push(age);
        values.push(f64::from(record.sibsp));
        values.push(f64::from(record.parch));
        values.push(record.fare);
        values.push(family_size);
        values.push(is_alone);
        values.push(fare_per_person);
        values.push(has_cabin);

        // One active indicator per categorical group
        values.push(if record.sex == Sex::Male { 1.0 } else { 0.0 });
        values.push(if record.sex == Sex::Female { 1.0 } else { 0.0 });
        values.push(if record.embarked == Embarked::C { 1.0 } else { 0.0 });
        values.push(if record.embarked == Embarked::Q { 1.0 } else { 0.0 });
        values.push(if record.embarked == Embarked::S { 1.0 } else { 0.0 });
        values.push(if title == Title::Mr { 1.0 } else { 0.0 });
        values.push(if title == Title::Mrs { 1.0 } else { 0.0 });
        values.push(if title == Title::Miss { 1.0 } else { 0.0 });
        values.push(if title == Title::Master { 1.0 } else { 0.0 });
        values.push(if title == Title::Other { 1.0 } else { 0.0 });

        if values.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::computation(
                "encoding produced a non-finite feature value",
            ));
        }

        Ok(FeatureVector { values })
    }
}
