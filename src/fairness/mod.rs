//! Fairness auditing components

pub mod bias;
pub mod calculator;

pub use bias::{BiasAnalysis, BiasClassifier, MetricKind, ProtectedAttribute, Severity};
pub use calculator::{
    AuditRow, ClassBreakdown, FairnessAudit, FairnessCalculator, GroupStats, OverallStats,
    ParityMetrics, SexBreakdown,
};
