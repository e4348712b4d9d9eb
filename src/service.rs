//! Boundary to the remote plan backend
//!
//! The transport (HTTP, auth, timeouts, retries) lives outside this crate and
//! implements [`PlanService`]. The lifecycle manager only ever talks to the
//! backend through this trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::feedback::{Feedback, RegenerationHint};
use crate::models::PlanKind;
use crate::plan::{ItemId, TrainingPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutGoal {
    #[default]
    MuscleGain,
    WeightLoss,
    Endurance,
    Flexibility,
}

/// Inputs for a workout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutParams {
    pub experience_level: ExperienceLevel,
    pub days_per_week: u8,
    pub equipment: Vec<String>,
    pub goal: WorkoutGoal,
    pub avg_steps: Option<u32>,
    pub avg_sleep_hours: Option<f64>,
    pub spo2: Option<u8>,
}

impl Default for WorkoutParams {
    fn default() -> Self {
        Self {
            experience_level: ExperienceLevel::Beginner,
            days_per_week: 3,
            equipment: Vec::new(),
            goal: WorkoutGoal::MuscleGain,
            avg_steps: None,
            avg_sleep_hours: None,
            spo2: None,
        }
    }
}

/// Inputs for a race-training schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceParams {
    pub current_distance_km: f64,
    pub target_date: NaiveDate,
    pub experience_level: ExperienceLevel,
    pub goal_time_hours: Option<f64>,
    pub resting_heart_rate: Option<u16>,
    pub avg_steps: Option<u32>,
    pub avg_sleep_hours: Option<f64>,
    pub spo2: Option<u8>,
}

/// Generation parameters, one variant per plan kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationParams {
    Workout(WorkoutParams),
    RaceTraining(RaceParams),
}

impl GenerationParams {
    pub fn kind(&self) -> PlanKind {
        match self {
            GenerationParams::Workout(_) => PlanKind::Workout,
            GenerationParams::RaceTraining(_) => PlanKind::RaceTraining,
        }
    }

    /// Reject malformed parameters before anything is sent
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        match self {
            GenerationParams::Workout(params) => {
                if !(1..=7).contains(&params.days_per_week) {
                    return Err(EngineError::Validation(format!(
                        "days_per_week must be between 1 and 7, got {}",
                        params.days_per_week
                    )));
                }
                validate_vitals(params.avg_sleep_hours, params.spo2)?;
            }
            GenerationParams::RaceTraining(params) => {
                if !(params.current_distance_km > 0.0) {
                    return Err(EngineError::Validation(format!(
                        "current_distance_km must be positive, got {}",
                        params.current_distance_km
                    )));
                }
                if params.target_date <= today {
                    return Err(EngineError::Validation(format!(
                        "target_date {} must be in the future",
                        params.target_date
                    )));
                }
                if let Some(hours) = params.goal_time_hours {
                    if !(hours > 0.0) {
                        return Err(EngineError::Validation(format!(
                            "goal_time_hours must be positive, got {}",
                            hours
                        )));
                    }
                }
                validate_vitals(params.avg_sleep_hours, params.spo2)?;
            }
        }
        Ok(())
    }
}

/// Wearable averages shared by both parameter sets
fn validate_vitals(avg_sleep_hours: Option<f64>, spo2: Option<u8>) -> Result<()> {
    if let Some(sleep) = avg_sleep_hours {
        if !(0.0..=24.0).contains(&sleep) {
            return Err(EngineError::Validation(format!(
                "avg_sleep_hours must be between 0 and 24, got {}",
                sleep
            )));
        }
    }
    if let Some(spo2) = spo2 {
        if spo2 > 100 {
            return Err(EngineError::Validation(format!(
                "spo2 must be a percentage, got {}",
                spo2
            )));
        }
    }
    Ok(())
}

/// Everything the generator receives for one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub params: GenerationParams,
    /// Replace an existing active plan on the backend
    pub force: bool,
    /// Feedback from the previous plan of the same kind
    pub hint: Option<RegenerationHint>,
}

impl GenerationRequest {
    pub fn kind(&self) -> PlanKind {
        self.params.kind()
    }
}

/// Backend acknowledgement of a tracked item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackAck {
    pub all_completed: bool,
}

/// Remote plan backend
#[async_trait]
pub trait PlanService: Send + Sync {
    /// Generate a new plan.
    ///
    /// Returns `EngineError::ActivePlanExists` when the backend already holds an
    /// active plan of this kind and `force` is not set.
    async fn generate_plan(&self, request: &GenerationRequest) -> Result<TrainingPlan>;

    /// Record the completed flag of one item
    async fn track_item(&self, plan_id: &str, item: ItemId, completed: bool) -> Result<TrackAck>;

    /// Finalize a plan with the user's feedback
    async fn complete_plan(&self, plan_id: &str, feedback: &Feedback) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_workout_days_validated() {
        let mut params = WorkoutParams::default();
        assert!(GenerationParams::Workout(params.clone()).validate(today()).is_ok());

        params.days_per_week = 0;
        assert!(GenerationParams::Workout(params.clone()).validate(today()).is_err());

        params.days_per_week = 8;
        assert!(GenerationParams::Workout(params).validate(today()).is_err());
    }

    #[test]
    fn test_race_params_validated() {
        let params = RaceParams {
            current_distance_km: 5.0,
            target_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            experience_level: ExperienceLevel::Intermediate,
            goal_time_hours: Some(4.0),
            resting_heart_rate: Some(60),
            avg_steps: Some(9000),
            avg_sleep_hours: Some(7.5),
            spo2: Some(97),
        };
        let request = GenerationParams::RaceTraining(params.clone());
        assert_eq!(request.kind(), PlanKind::RaceTraining);
        assert!(request.validate(today()).is_ok());

        let past = RaceParams {
            target_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            ..params.clone()
        };
        assert!(GenerationParams::RaceTraining(past).validate(today()).is_err());

        let no_distance = RaceParams {
            current_distance_km: 0.0,
            ..params.clone()
        };
        assert!(GenerationParams::RaceTraining(no_distance).validate(today()).is_err());

        let bad_spo2 = RaceParams {
            spo2: Some(120),
            ..params.clone()
        };
        assert!(GenerationParams::RaceTraining(bad_spo2).validate(today()).is_err());

        let bad_sleep = RaceParams {
            avg_sleep_hours: Some(30.0),
            ..params
        };
        assert!(GenerationParams::RaceTraining(bad_sleep).validate(today()).is_err());
    }

    #[test]
    fn test_race_params_without_vitals_accepted() {
        let json = r#"{
            "kind": "race_training",
            "current_distance_km": 5.0,
            "target_date": "2025-06-01",
            "experience_level": "beginner"
        }"#;
        let params: GenerationParams = serde_json::from_str(json).unwrap();
        assert!(params.validate(today()).is_ok());
        match params {
            GenerationParams::RaceTraining(race) => {
                assert!(race.avg_steps.is_none());
                assert!(race.spo2.is_none());
            }
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn test_params_wire_format() {
        let params = GenerationParams::Workout(WorkoutParams {
            equipment: vec!["dumbbells".to_string()],
            ..WorkoutParams::default()
        });
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["kind"], "workout");
        assert_eq!(json["experience_level"], "beginner");
        assert_eq!(json["goal"], "muscle_gain");
    }
}
