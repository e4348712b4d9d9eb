//! Lifestyle-driven disease risk estimates
//!
//! Three independent additive models (cardiac, hepatic, renal). Each starts from
//! a base risk, adds increments for smoking, alcohol, diet and stress, and is
//! capped at 95% so that no estimate ever reads as certain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{AlcoholConsumption, Diet, LifestyleProfile, SmokingStatus};

const RISK_CEILING: i32 = 95;

/// Per-condition risk percentages (0-95)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRisk {
    pub cardiac: u8,
    pub hepatic: u8,
    pub renal: u8,
}

/// Condition categories covered by the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Cardiac,
    Hepatic,
    Renal,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [
        RiskCategory::Cardiac,
        RiskCategory::Hepatic,
        RiskCategory::Renal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Cardiac => "Heart Failure Risk",
            RiskCategory::Hepatic => "Liver Failure Risk",
            RiskCategory::Renal => "Kidney Disease Risk",
        }
    }
}

impl DiseaseRisk {
    pub fn get(&self, category: RiskCategory) -> u8 {
        match category {
            RiskCategory::Cardiac => self.cardiac,
            RiskCategory::Hepatic => self.hepatic,
            RiskCategory::Renal => self.renal,
        }
    }
}

/// Disease risk estimator
pub struct DiseaseRiskEstimator;

impl DiseaseRiskEstimator {
    /// Run all three models against the current profile
    pub fn estimate(profile: &LifestyleProfile) -> DiseaseRisk {
        DiseaseRisk {
            cardiac: Self::cardiac(profile),
            hepatic: Self::hepatic(profile),
            renal: Self::renal(profile),
        }
    }

    pub fn cardiac(profile: &LifestyleProfile) -> u8 {
        let smoking = match profile.smoking {
            SmokingStatus::Heavy => 40,
            SmokingStatus::Regular => 25,
            SmokingStatus::Occasional => 10,
            SmokingStatus::NonSmoker => 0,
        };
        let alcohol = match profile.alcohol {
            AlcoholConsumption::Heavy => 15,
            AlcoholConsumption::Moderate => 8,
            _ => 0,
        };
        let stress = if profile.stress_percent > 60.0 {
            20
        } else if profile.stress_percent > 30.0 {
            10
        } else {
            0
        };

        Self::cap(10 + smoking + alcohol + stress)
    }

    pub fn hepatic(profile: &LifestyleProfile) -> u8 {
        let alcohol = match profile.alcohol {
            AlcoholConsumption::Heavy => 50,
            AlcoholConsumption::Moderate => 25,
            AlcoholConsumption::Occasional => 10,
            AlcoholConsumption::None => 0,
        };
        let smoking = match profile.smoking {
            SmokingStatus::Heavy => 15,
            SmokingStatus::Regular => 10,
            _ => 0,
        };
        let diet = if profile.diet == Diet::NonVegetarian { 5 } else { 0 };

        Self::cap(15 + alcohol + smoking + diet)
    }

    pub fn renal(profile: &LifestyleProfile) -> u8 {
        let smoking = match profile.smoking {
            SmokingStatus::Heavy => 25,
            SmokingStatus::Regular => 15,
            _ => 0,
        };
        let alcohol = match profile.alcohol {
            AlcoholConsumption::Heavy => 20,
            AlcoholConsumption::Moderate => 10,
            _ => 0,
        };
        let stress = if profile.stress_percent > 60.0 { 15 } else { 0 };

        Self::cap(12 + smoking + alcohol + stress)
    }

    fn cap(risk: i32) -> u8 {
        risk.clamp(0, RISK_CEILING) as u8
    }
}

/// Risk label shared by all three categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn classify(risk: u8) -> Self {
        if risk < 30 {
            RiskLevel::Low
        } else if risk < 60 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}
