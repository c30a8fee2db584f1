//! Passenger data structures for survival prediction

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Passenger sex, one of the protected attributes audited for bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// The opposite sex, used by the counterfactual catalog.
    pub fn flipped(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

/// Port of embarkation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Embarked {
    C,
    Q,
    S,
}

impl Embarked {
    /// Human-readable port name for counterfactual descriptions.
    pub fn port_name(self) -> &'static str {
        match self {
            Embarked::C => "Cherbourg",
            Embarked::Q => "Queenstown",
            Embarked::S => "Southampton",
        }
    }
}

/// A passenger's raw attributes as supplied by the validated request boundary.
///
/// Serde aliases accept the original dataset column names (`Pclass`, `Sex`,
/// ...) so held-out data files deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    /// Ticket class (1 = first, 2 = second, 3 = third)
    #[serde(alias = "Pclass")]
    pub pclass: u8,

    #[serde(alias = "Sex")]
    pub sex: Sex,

    /// Age in years; absent values are imputed by the encoder
    #[serde(alias = "Age", default)]
    pub age: Option<f64>,

    /// Number of siblings/spouses aboard
    #[serde(alias = "SibSp", default)]
    pub sibsp: u32,

    /// Number of parents/children aboard
    #[serde(alias = "Parch", default)]
    pub parch: u32,

    #[serde(alias = "Fare", default)]
    pub fare: f64,

    #[serde(alias = "Embarked")]
    pub embarked: Embarked,

    /// Full name, used for honorific title extraction
    #[serde(alias = "Name", default)]
    pub name: String,

    #[serde(alias = "Cabin", default)]
    pub cabin: Option<String>,
}

impl PassengerRecord {
    /// Create a record with required fields and neutral defaults.
    pub fn new(pclass: u8, sex: Sex, age: f64) -> Self {
        Self {
            pclass,
            sex,
            age: Some(age),
            sibsp: 0,
            parch: 0,
            fare: 0.0,
            embarked: Embarked::S,
            name: String::new(),
            cabin: None,
        }
    }

    pub fn with_fare(mut self, fare: f64) -> Self {
        self.fare = fare;
        self
    }

    pub fn with_embarked(mut self, embarked: Embarked) -> Self {
        self.embarked = embarked;
        self
    }

    pub fn with_family(mut self, sibsp: u32, parch: u32) -> Self {
        self.sibsp = sibsp;
        self.parch = parch;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cabin(mut self, cabin: impl Into<String>) -> Self {
        self.cabin = Some(cabin.into());
        self
    }

    /// Boundary validation. The engine assumes records have passed this check.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=3).contains(&self.pclass) {
            return Err(EngineError::validation(
                "pclass",
                format!("expected 1, 2 or 3, got {}", self.pclass),
            ));
        }
        if let Some(age) = self.age {
            if !age.is_finite() || age < 0.0 {
                return Err(EngineError::validation(
                    "age",
                    format!("expected a non-negative number, got {age}"),
                ));
            }
        }
        if !self.fare.is_finite() || self.fare < 0.0 {
            return Err(EngineError::validation(
                "fare",
                format!("expected a non-negative number, got {}", self.fare),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let record = PassengerRecord::new(1, Sex::Female, 29.0)
            .with_fare(211.34)
            .with_name("Ms. Test Passenger")
            .with_cabin("C85");

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: PassengerRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_dataset_column_aliases() {
        let json = r#"{
            "Pclass": 3, "Sex": "male", "Age": 22.0, "SibSp": 1, "Parch": 0,
            "Fare": 7.25, "Embarked": "S", "Name": "Mr. Test Passenger"
        }"#;

        let record: PassengerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.pclass, 3);
        assert_eq!(record.sex, Sex::Male);
        assert_eq!(record.age, Some(22.0));
        assert_eq!(record.cabin, None);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let bad_class = PassengerRecord::new(4, Sex::Male, 30.0);
        assert!(matches!(
            bad_class.validate(),
            Err(EngineError::Validation { field: "pclass", .. })
        ));

        let bad_fare = PassengerRecord::new(3, Sex::Male, 30.0).with_fare(-1.0);
        assert!(matches!(
            bad_fare.validate(),
            Err(EngineError::Validation { field: "fare", .. })
        ));

        let mut bad_age = PassengerRecord::new(3, Sex::Male, 30.0);
        bad_age.age = Some(f64::NAN);
        assert!(bad_age.validate().is_err());
    }

    #[test]
    fn test_sex_flip() {
        assert_eq!(Sex::Male.flipped(), Sex::Female);
        assert_eq!(Sex::Female.flipped(), Sex::Male);
    }
}
