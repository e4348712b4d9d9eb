// Library interface for FitWell modules
// Scoring is pure and synchronous; the plan lifecycle is async over a PlanService

pub mod completion;
pub mod config;
pub mod error;
pub mod feedback;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod plan;
pub mod risk;
pub mod service;
pub mod stress;
pub mod wellness;

// Re-export commonly used types for convenience
pub use models::*;
pub use completion::{CompletionTracker, Progress, ToggleOutcome};
pub use feedback::{Feedback, FeedbackCollector, FeedbackDraft, IntensityShift, RegenerationHint};
pub use lifecycle::{PlanLifecycleManager, PlanPhase, PlanSnapshot, ToggleMode, ToggleReport};
pub use plan::{Day, Exercise, ItemId, PlanLayout, ScheduleDay, TrainingPlan};
pub use risk::{DiseaseRisk, DiseaseRiskEstimator, RiskLevel};
pub use service::{GenerationParams, GenerationRequest, PlanService, TrackAck};
pub use stress::{StressBand, StressEstimator};
pub use wellness::{HealthStanding, WellnessScore, WellnessScoreCalculator};
pub use error::{EngineError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
