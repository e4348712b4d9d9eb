//! Composite wellness score
//!
//! The score starts at 100 and each lifestyle factor subtracts an independent
//! penalty. The sum is clamped to `[0, 100]`.
//!
//! | Factor  | Penalties                                                        |
//! |---------|------------------------------------------------------------------|
//! | Diet    | vegetarian/vegan 0, pescatarian 2, keto/paleo 3, gluten/dairy free 2, non-vegetarian 5 |
//! | Smoking | non-smoker 0, occasional 10, regular 20, heavy 30                |
//! | Alcohol | none 0, occasional 5, moderate 10, heavy 20                      |
//! | Stress  | below 30% 0, below 60% 15, otherwise 30                          |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{AlcoholConsumption, Diet, LifestyleProfile, SmokingStatus};

const BASE_SCORE: i32 = 100;

/// Derived wellness score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessScore {
    pub score: u8,
}

impl WellnessScore {
    pub fn standing(&self) -> HealthStanding {
        HealthStanding::from_score(self.score)
    }
}

/// Wellness score calculator
pub struct WellnessScoreCalculator;

impl WellnessScoreCalculator {
    /// Score the current profile
    pub fn calculate(profile: &LifestyleProfile) -> WellnessScore {
        let score = BASE_SCORE
            - Self::diet_penalty(profile.diet)
            - Self::smoking_penalty(profile.smoking)
            - Self::alcohol_penalty(profile.alcohol)
            - Self::stress_penalty(profile.stress_percent);

        WellnessScore {
            score: score.clamp(0, 100) as u8,
        }
    }

    pub fn diet_penalty(diet: Diet) -> i32 {
        match diet {
            Diet::Vegetarian | Diet::Vegan => 0,
            Diet::Pescatarian => 2,
            Diet::Keto | Diet::Paleo => 3,
            Diet::GlutenFree | Diet::DairyFree => 2,
            Diet::NonVegetarian => 5,
            Diet::Unknown => 0,
        }
    }

    pub fn smoking_penalty(smoking: SmokingStatus) -> i32 {
        match smoking {
            SmokingStatus::NonSmoker => 0,
            SmokingStatus::Occasional => 10,
            SmokingStatus::Regular => 20,
            SmokingStatus::Heavy => 30,
        }
    }

    pub fn alcohol_penalty(alcohol: AlcoholConsumption) -> i32 {
        match alcohol {
            AlcoholConsumption::None => 0,
            AlcoholConsumption::Occasional => 5,
            AlcoholConsumption::Moderate => 10,
            AlcoholConsumption::Heavy => 20,
        }
    }

    pub fn stress_penalty(stress_percent: f64) -> i32 {
        if stress_percent < 30.0 {
            0
        } else if stress_percent < 60.0 {
            15
        } else {
            30
        }
    }
}

/// Display band for a wellness score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStanding {
    Healthy,
    Good,
    NeedsImprovement,
    NeedsAttention,
}

impl HealthStanding {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => HealthStanding::Healthy,
            70..=84 => HealthStanding::Good,
            50..=69 => HealthStanding::NeedsImprovement,
            _ => HealthStanding::NeedsAttention,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            HealthStanding::Healthy => "You are a healthy individual",
            HealthStanding::Good => "Your health is good, but could be improved",
            HealthStanding::NeedsImprovement => "Consider improving your lifestyle habits",
            HealthStanding::NeedsAttention => {
                "Your health needs attention - consult a healthcare provider"
            }
        }
    }
}

impl fmt::Display for HealthStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStanding::Healthy => write!(f, "Healthy"),
            HealthStanding::Good => write!(f, "Good"),
            HealthStanding::NeedsImprovement => write!(f, "Needs Improvement"),
            HealthStanding::NeedsAttention => write!(f, "Needs Attention"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_worst_case_scenario() {
        let profile = LifestyleProfile::new(
            Diet::NonVegetarian,
            SmokingStatus::Heavy,
            AlcoholConsumption::Heavy,
            70.0,
        );
        // 100 - 5 - 30 - 20 - 30
        assert_eq!(WellnessScoreCalculator::calculate(&profile).score, 15);
    }

    #[test]
    fn test_default_profile_is_perfect() {
        let score = WellnessScoreCalculator::calculate(&LifestyleProfile::default());
        assert_eq!(score.score, 100);
        assert_eq!(score.standing(), HealthStanding::Healthy);
    }

    #[test]
    fn test_unknown_diet_has_no_penalty() {
        let profile = LifestyleProfile::new(
            Diet::Unknown,
            SmokingStatus::Occasional,
            AlcoholConsumption::None,
            0.0,
        );
        assert_eq!(WellnessScoreCalculator::calculate(&profile).score, 90);
    }

    #[test]
    fn test_stress_penalty_boundaries() {
        assert_eq!(WellnessScoreCalculator::stress_penalty(29.99), 0);
        assert_eq!(WellnessScoreCalculator::stress_penalty(30.0), 15);
        assert_eq!(WellnessScoreCalculator::stress_penalty(59.99), 15);
        assert_eq!(WellnessScoreCalculator::stress_penalty(60.0), 30);
    }

    #[test]
    fn test_recomputed_from_current_profile() {
        let mut profile = LifestyleProfile::default();
        assert_eq!(WellnessScoreCalculator::calculate(&profile).score, 100);

        profile.diet = Diet::Keto;
        profile.alcohol = AlcoholConsumption::Moderate;
        assert_eq!(WellnessScoreCalculator::calculate(&profile).score, 87);
    }

    #[test]
    fn test_health_standing_bands() {
        assert_eq!(HealthStanding::from_score(85), HealthStanding::Healthy);
        assert_eq!(HealthStanding::from_score(84), HealthStanding::Good);
        assert_eq!(HealthStanding::from_score(70), HealthStanding::Good);
        assert_eq!(HealthStanding::from_score(50), HealthStanding::NeedsImprovement);
        assert_eq!(HealthStanding::from_score(15), HealthStanding::NeedsAttention);
    }

    proptest! {
        #[test]
        fn test_score_always_in_range(
            diet in prop::sample::select(Diet::ALL.to_vec()),
            smoking in prop::sample::select(SmokingStatus::ALL.to_vec()),
            alcohol in prop::sample::select(AlcoholConsumption::ALL.to_vec()),
            stress in 0.0f64..=100.0
        ) {
            let profile = LifestyleProfile::new(diet, smoking, alcohol, stress);
            let score = WellnessScoreCalculator::calculate(&profile).score;
            prop_assert!(score <= 100);
            prop_assert!(score >= 15);
        }
    }
}
