//! Stress estimation from blood pressure
//!
//! When the profile carries no explicit stress value, stress is derived from the
//! deviation of a blood pressure reading from the 120/80 mmHg optimum:
//!
//! ```text
//! stress = ((systolic - 120) + (diastolic - 80)) / 2, clamped to [0, 100]
//! ```
//!
//! Readings outside the plausible range (systolic 70-200, diastolic 40-130) are
//! treated as measurement errors and yield 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::VitalsSample;

const SYSTOLIC_RANGE: (f64, f64) = (70.0, 200.0);
const DIASTOLIC_RANGE: (f64, f64) = (40.0, 130.0);
const OPTIMAL_SYSTOLIC: f64 = 120.0;
const OPTIMAL_DIASTOLIC: f64 = 80.0;

/// Derives a stress percentage from vitals
pub struct StressEstimator;

impl StressEstimator {
    /// Stress from a complete blood pressure reading.
    ///
    /// Out-of-range readings return 0.
    pub fn from_blood_pressure(systolic: f64, diastolic: f64) -> f64 {
        if !(SYSTOLIC_RANGE.0..=SYSTOLIC_RANGE.1).contains(&systolic)
            || !(DIASTOLIC_RANGE.0..=DIASTOLIC_RANGE.1).contains(&diastolic)
        {
            return 0.0;
        }

        let stress = ((systolic - OPTIMAL_SYSTOLIC) + (diastolic - OPTIMAL_DIASTOLIC)) / 2.0;
        stress.clamp(0.0, 100.0)
    }

    /// Stress from a possibly partial sample.
    ///
    /// Returns `None` (unknown) when either reading is missing.
    pub fn estimate(sample: &VitalsSample) -> Option<f64> {
        match (sample.systolic, sample.diastolic) {
            (Some(systolic), Some(diastolic)) => {
                Some(Self::from_blood_pressure(systolic, diastolic))
            }
            _ => None,
        }
    }

    /// Resolve the stress value for a profile.
    ///
    /// An explicit value wins; otherwise the vitals estimate is used. Only when
    /// there is no stress source at all does unknown become 0.
    pub fn resolve(explicit: Option<f64>, vitals: Option<&VitalsSample>) -> f64 {
        if let Some(stress) = explicit.filter(|s| s.is_finite()) {
            return stress.clamp(0.0, 100.0);
        }

        vitals.and_then(Self::estimate).unwrap_or(0.0)
    }
}

/// Display band for a stress percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressBand {
    Low,
    Moderate,
    High,
}

impl StressBand {
    pub fn from_percent(stress: f64) -> Self {
        if stress < 30.0 {
            StressBand::Low
        } else if stress < 60.0 {
            StressBand::Moderate
        } else {
            StressBand::High
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StressBand::Low => "Low - Healthy range",
            StressBand::Moderate => "Moderate - Monitor closely",
            StressBand::High => "High - Consult healthcare provider",
        }
    }
}

impl fmt::Display for StressBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressBand::Low => write!(f, "Low"),
            StressBand::Moderate => write!(f, "Moderate"),
            StressBand::High => write!(f, "High"),
        }
    }
}
