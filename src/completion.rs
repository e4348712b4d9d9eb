use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::plan::{ItemId, ItemLookup, TrainingPlan};

/// Aggregate completion over countable items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Strict completion: every countable item done, and there is at least one
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// Whole-number completion percentage for display
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

/// Result of a single toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub item: ItemId,
    /// The item's completed flag after the flip
    pub completed: bool,
    pub progress: Progress,
    pub all_completed: bool,
}

/// Per-item completion tracking over any plan layout
pub struct CompletionTracker;

impl CompletionTracker {
    /// Aggregate progress, rest days excluded
    pub fn progress(plan: &TrainingPlan) -> Progress {
        plan.countable_items().fold(Progress::default(), |mut acc, item| {
            acc.total += 1;
            if item.completed {
                acc.completed += 1;
            }
            acc
        })
    }

    /// Flip one item's completed flag.
    ///
    /// Calling this twice for the same item restores the original state.
    pub fn toggle(plan: &mut TrainingPlan, item: ItemId) -> Result<ToggleOutcome> {
        let plan_id = plan.id.clone();
        let flag = plan
            .layout
            .completion_flag_mut(item)
            .map_err(|lookup| match lookup {
                ItemLookup::Missing => EngineError::NotFound {
                    plan_id: plan_id.clone(),
                    item: item.0,
                },
                ItemLookup::RestDay => EngineError::Validation(format!(
                    "item {} of plan {} is a rest day and cannot be completed",
                    item, plan_id
                )),
            })?;

        *flag = !*flag;
        let completed = *flag;

        let progress = Self::progress(plan);
        Ok(ToggleOutcome {
            item,
            completed,
            progress,
            all_completed: progress.is_complete(),
        })
    }

    /// Check that an item can be toggled without changing anything
    pub fn check(plan: &TrainingPlan, item: ItemId) -> Result<bool> {
        let mut scratch = plan.clone();
        let outcome = Self::toggle(&mut scratch, item)?;
        Ok(outcome.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanKind;
    use crate::plan::{Day, Exercise, PlanLayout, ScheduleDay};

    fn flat_plan(size: u32, completed: u32) -> TrainingPlan {
        let exercises = (1..=size)
            .map(|i| {
                let mut exercise = Exercise::new(i, format!("Exercise {}", i));
                exercise.completed = i <= completed;
                exercise
            })
            .collect();
        TrainingPlan::new(PlanKind::Workout, "Full body", PlanLayout::Flat(exercises))
    }

    #[test]
    fn test_last_item_completes_plan() {
        let mut plan = flat_plan(5, 4);
        assert_eq!(
            CompletionTracker::progress(&plan),
            Progress {
                completed: 4,
                total: 5
            }
        );

        let outcome = CompletionTracker::toggle(&mut plan, ItemId(5)).unwrap();
        assert!(outcome.completed);
        assert!(outcome.all_completed);
        assert_eq!(
            outcome.progress,
            Progress {
                completed: 5,
                total: 5
            }
        );
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut plan = flat_plan(3, 1);
        let before = CompletionTracker::progress(&plan);

        let first = CompletionTracker::toggle(&mut plan, ItemId(1)).unwrap();
        assert!(!first.completed);
        let second = CompletionTracker::toggle(&mut plan, ItemId(1)).unwrap();
        assert!(second.completed);

        assert_eq!(CompletionTracker::progress(&plan), before);
    }

    #[test]
    fn test_unknown_item_not_found() {
        let mut plan = flat_plan(2, 0);
        let err = CompletionTracker::toggle(&mut plan, ItemId(42)).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { item: 42, .. }));
    }

    #[test]
    fn test_empty_plan_never_complete() {
        let plan = flat_plan(0, 0);
        let progress = CompletionTracker::progress(&plan);
        assert_eq!(progress.total, 0);
        assert!(!progress.is_complete());
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_rest_days_excluded() {
        let mut plan = TrainingPlan::new(
            PlanKind::RaceTraining,
            "Half marathon",
            PlanLayout::Schedule(vec![
                ScheduleDay::run("Easy", 5.0),
                ScheduleDay::rest(),
                ScheduleDay::run("Long", 12.0),
            ]),
        );

        CompletionTracker::toggle(&mut plan, ItemId(0)).unwrap();
        let outcome = CompletionTracker::toggle(&mut plan, ItemId(2)).unwrap();
        assert!(outcome.all_completed);
        assert_eq!(outcome.progress.total, 2);

        let err = CompletionTracker::toggle(&mut plan, ItemId(1)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_multi_day_global_indices() {
        let mut plan = TrainingPlan::new(
            PlanKind::Workout,
            "Split",
            PlanLayout::MultiDay(vec![
                Day {
                    day_number: 1,
                    focus: "Push".to_string(),
                    is_rest_day: false,
                    exercises: vec![Exercise::new(0, "Bench"), Exercise::new(1, "Dips")],
                },
                Day {
                    day_number: 2,
                    focus: "Pull".to_string(),
                    is_rest_day: false,
                    exercises: vec![Exercise::new(2, "Rows")],
                },
            ]),
        );

        let outcome = CompletionTracker::toggle(&mut plan, ItemId(2)).unwrap();
        assert_eq!(outcome.progress.completed, 1);
        assert_eq!(outcome.progress.total, 3);
        assert_eq!(outcome.progress.percent(), 33);
    }

    #[test]
    fn test_check_does_not_mutate() {
        let plan = flat_plan(2, 1);
        assert!(!CompletionTracker::check(&plan, ItemId(1)).unwrap());
        assert!(CompletionTracker::check(&plan, ItemId(2)).unwrap());
        assert_eq!(CompletionTracker::progress(&plan).completed, 1);
        assert!(CompletionTracker::check(&plan, ItemId(3)).is_err());
    }
}
