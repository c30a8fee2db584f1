//! Per-group statistics and pairwise parity metrics.
//!
//! Aggregation reduces each row into additive group counters, so per-record
//! processing order never affects the result and parallel producers can be
//! merged by summation before ratios are taken.

use crate::error::EngineError;
use crate::types::passenger::{PassengerRecord, Sex};
use serde::Serialize;

/// One audited record: protected attributes plus actual and predicted labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditRow {
    pub sex: Sex,
    pub pclass: u8,
    pub actual: bool,
    pub predicted: bool,
}

impl AuditRow {
    pub fn new(record: &PassengerRecord, actual: bool, predicted: bool) -> Self {
        Self {
            sex: record.sex,
            pclass: record.pclass,
            actual,
            predicted,
        }
    }
}

/// Additive counters for one group. Merging two counter sets is plain
/// summation.
#[derive(Debug, Clone, Copy, Default)]
struct GroupCounts {
    count: u64,
    actual_positive: u64,
    predicted_positive: u64,
    correct: u64,
    true_positive: u64,
}

impl GroupCounts {
    fn add(&mut self, row: &AuditRow) {
        self.count += 1;
        if row.actual {
            self.actual_positive += 1;
        }
        if row.predicted {
            self.predicted_positive += 1;
        }
        if row.actual == row.predicted {
            self.correct += 1;
        }
        if row.actual && row.predicted {
            self.true_positive += 1;
        }
    }

    fn rate(numerator: u64, denominator: u64) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            numerator as f64 / denominator as f64
        }
    }

    fn predicted_rate(&self) -> f64 {
        Self::rate(self.predicted_positive, self.count)
    }

    fn true_positive_rate(&self) -> f64 {
        Self::rate(self.true_positive, self.actual_positive)
    }

    fn stats(&self) -> GroupStats {
        GroupStats {
            count: self.count,
            actual_survival_rate: Self::rate(self.actual_positive, self.count),
            predicted_survival_rate: self.predicted_rate(),
            accuracy: Self::rate(self.correct, self.count),
        }
    }
}

/// Aggregate statistics for one protected-group value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: u64,
    pub actual_survival_rate: f64,
    pub predicted_survival_rate: f64,
    pub accuracy: f64,
}

/// Pairwise fairness comparison for one protected attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParityMetrics {
    /// min(predicted rates) / max(predicted rates); 1.0 when both rates are 0
    pub disparate_impact: f64,
    /// |TPR_A - TPR_B|; a group with zero actual positives contributes TPR 0
    pub equal_opportunity_diff: f64,
    /// |predicted rate A - predicted rate B|
    pub demographic_parity_diff: f64,
    /// Set when either group has zero actual positives, making the
    /// equal-opportunity difference unreliable
    pub low_support: bool,
}

/// Whole-dataset accuracy statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_predictions: u64,
    pub accuracy: f64,
    /// Mean of true-positive and true-negative rates
    pub balanced_accuracy: f64,
}

/// Per-sex audit breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct SexBreakdown {
    pub male: GroupStats,
    pub female: GroupStats,
    pub metrics: ParityMetrics,
}

/// Per-class audit breakdown. Parity compares 1st class against the pooled
/// 2nd and 3rd classes; all three classes are reported individually.
#[derive(Debug, Clone, Serialize)]
pub struct ClassBreakdown {
    pub first: GroupStats,
    pub second: GroupStats,
    pub third: GroupStats,
    pub metrics: ParityMetrics,
}

/// Full audit aggregate over one evaluation dataset.
#[derive(Debug, Clone, Serialize)]
pub struct FairnessAudit {
    pub overall: OverallStats,
    pub by_sex: SexBreakdown,
    pub by_class: ClassBreakdown,
}

fn parity(a: &GroupCounts, b: &GroupCounts) -> ParityMetrics {
    let rate_a = a.predicted_rate();
    let rate_b = b.predicted_rate();
    let max = rate_a.max(rate_b);

    let disparate_impact = if max == 0.0 {
        1.0
    } else {
        rate_a.min(rate_b) / max
    };

    ParityMetrics {
        disparate_impact,
        equal_opportunity_diff: (a.true_positive_rate() - b.true_positive_rate()).abs(),
        demographic_parity_diff: (rate_a - rate_b).abs(),
        low_support: a.actual_positive == 0 || b.actual_positive == 0,
    }
}

/// Computes per-group statistics and parity metrics from audited rows.
pub struct FairnessCalculator;

impl FairnessCalculator {
    pub fn audit(rows: &[AuditRow]) -> Result<FairnessAudit, EngineError> {
        if rows.is_empty() {
            return Err(EngineError::computation(
                "fairness audit requires a non-empty dataset",
            ));
        }

        let mut total = GroupCounts::default();
        let mut male = GroupCounts::default();
        let mut female = GroupCounts::default();
        let mut classes = [GroupCounts::default(); 3];
        let mut first = GroupCounts::default();
        let mut non_first = GroupCounts::default();

        for row in rows {
            total.add(row);
            match row.sex {
                Sex::Male => male.add(row),
                Sex::Female => female.add(row),
            }
            classes[usize::from(row.pclass.clamp(1, 3)) - 1].add(row);
            if row.pclass == 1 {
                first.add(row);
            } else {
                non_first.add(row);
            }
        }

        let negatives = total.count - total.actual_positive;
        let true_negative = total.correct - total.true_positive;
        let tpr = GroupCounts::rate(total.true_positive, total.actual_positive);
        let tnr = GroupCounts::rate(true_negative, negatives);

        Ok(FairnessAudit {
            overall: OverallStats {
                total_predictions: total.count,
                accuracy: GroupCounts::rate(total.correct, total.count),
                balanced_accuracy: (tpr + tnr) / 2.0,
            },
            by_sex: SexBreakdown {
                male: male.stats(),
                female: female.stats(),
                metrics: parity(&male, &female),
            },
            by_class: ClassBreakdown {
                first: classes[0].stats(),
                second: classes[1].stats(),
                third: classes[2].stats(),
                metrics: parity(&first, &non_first),
            },
        })
    }
}
