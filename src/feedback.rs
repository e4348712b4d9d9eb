//! Subjective feedback on a completed plan
//!
//! Feedback is the only signal the external generator receives for adapting
//! the next plan. Nothing here changes plan content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{Difficulty, PlanKind, Preference};

/// Complete feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub difficulty: Difficulty,
    pub preference: Preference,
}

/// Feedback being filled in; submittable only once both fields are set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackDraft {
    pub difficulty: Option<Difficulty>,
    pub preference: Option<Preference>,
}

impl FeedbackDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preference = Some(preference);
        self
    }

    pub fn is_submittable(&self) -> bool {
        self.difficulty.is_some() && self.preference.is_some()
    }
}

impl From<Feedback> for FeedbackDraft {
    fn from(feedback: Feedback) -> Self {
        Self {
            difficulty: Some(feedback.difficulty),
            preference: Some(feedback.preference),
        }
    }
}

/// Direction the next plan's intensity should move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityShift {
    Decrease,
    Maintain,
    Increase,
}

/// Hint attached to the next generation request for the same plan kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationHint {
    pub kind: PlanKind,
    pub difficulty: Difficulty,
    pub preference: Preference,
    pub intensity_shift: IntensityShift,
}

/// Archived feedback for a finished plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub plan_id: String,
    pub kind: PlanKind,
    pub feedback: Feedback,
    pub submitted_at: DateTime<Utc>,
}

/// Feedback validation and hint derivation
pub struct FeedbackCollector;

impl FeedbackCollector {
    /// Turn a draft into submittable feedback
    pub fn finalize(draft: &FeedbackDraft) -> Result<Feedback> {
        match (draft.difficulty, draft.preference) {
            (Some(difficulty), Some(preference)) => Ok(Feedback {
                difficulty,
                preference,
            }),
            (None, _) => Err(EngineError::Validation(
                "feedback requires a difficulty rating".to_string(),
            )),
            (_, None) => Err(EngineError::Validation(
                "feedback requires a preference for the next plan".to_string(),
            )),
        }
    }

    pub fn hint(kind: PlanKind, feedback: &Feedback) -> RegenerationHint {
        let intensity_shift = match feedback.preference {
            Preference::Easier => IntensityShift::Decrease,
            Preference::Same => IntensityShift::Maintain,
            Preference::Harder => IntensityShift::Increase,
        };

        RegenerationHint {
            kind,
            difficulty: feedback.difficulty,
            preference: feedback.preference,
            intensity_shift,
        }
    }
}

/// Append-only log of submitted feedback
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackHistory {
    records: Vec<FeedbackRecord>,
}

impl FeedbackHistory {
    pub fn record(&mut self, record: FeedbackRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn latest(&self, kind: PlanKind) -> Option<&FeedbackRecord> {
        self.records.iter().rev().find(|r| r.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_feedback_rejected() {
        let draft = FeedbackDraft::new().with_difficulty(Difficulty::Easy);
        assert!(!draft.is_submittable());
        assert!(matches!(
            FeedbackCollector::finalize(&draft),
            Err(EngineError::Validation(_))
        ));

        let draft = FeedbackDraft::new().with_preference(Preference::Same);
        assert!(FeedbackCollector::finalize(&draft).is_err());
    }

    #[test]
    fn test_complete_feedback_accepted() {
        let draft = FeedbackDraft::new()
            .with_difficulty(Difficulty::Difficult)
            .with_preference(Preference::Easier);
        assert!(draft.is_submittable());

        let feedback = FeedbackCollector::finalize(&draft).unwrap();
        assert_eq!(feedback.difficulty, Difficulty::Difficult);
        assert_eq!(feedback.preference, Preference::Easier);
    }

    #[test]
    fn test_hint_follows_preference() {
        let feedback = Feedback {
            difficulty: Difficulty::Easy,
            preference: Preference::Harder,
        };
        let hint = FeedbackCollector::hint(PlanKind::Workout, &feedback);
        assert_eq!(hint.intensity_shift, IntensityShift::Increase);
        assert_eq!(hint.kind, PlanKind::Workout);

        let feedback = Feedback {
            difficulty: Difficulty::JustRight,
            preference: Preference::Same,
        };
        assert_eq!(
            FeedbackCollector::hint(PlanKind::RaceTraining, &feedback).intensity_shift,
            IntensityShift::Maintain
        );
    }

    #[test]
    fn test_history_latest_per_kind() {
        let mut history = FeedbackHistory::default();
        let feedback = Feedback {
            difficulty: Difficulty::JustRight,
            preference: Preference::Same,
        };
        for (plan_id, kind) in [
            ("w-1", PlanKind::Workout),
            ("r-1", PlanKind::RaceTraining),
            ("w-2", PlanKind::Workout),
        ] {
            history.record(FeedbackRecord {
                plan_id: plan_id.to_string(),
                kind,
                feedback,
                submitted_at: Utc::now(),
            });
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.latest(PlanKind::Workout).unwrap().plan_id, "w-2");
        assert_eq!(history.latest(PlanKind::RaceTraining).unwrap().plan_id, "r-1");
    }
}
