//! Training plan shapes
//!
//! Every generated plan is one of three layouts sharing one lifecycle:
//!
//! - **Flat**: an ordered list of exercises, each keyed by its `index`
//! - **Multi-day**: days of exercises; `index` is unique across the whole plan,
//!   not reset per day
//! - **Schedule**: race-training days keyed by their position
//!
//! Item identity is assigned by the generator and never recomputed from content.
//! Rest days (and every exercise under a rest day) are not countable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{EngineError, Result};
use crate::models::PlanKind;

/// Stable identity of a completable item within one plan instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single exercise within a workout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

impl Exercise {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            sets: None,
            reps: None,
            duration_minutes: None,
            completed: false,
        }
    }
}

/// One day of a multi-day workout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub day_number: u32,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// One day of a race-training schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub description: String,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub completed: bool,
}

impl ScheduleDay {
    pub fn run(description: impl Into<String>, distance_km: f64) -> Self {
        Self {
            description: description.into(),
            distance_km: Some(distance_km),
            is_rest_day: false,
            completed: false,
        }
    }

    pub fn rest() -> Self {
        Self {
            description: "Rest".to_string(),
            distance_km: None,
            is_rest_day: true,
            completed: false,
        }
    }
}

/// Tagged plan layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "entries", rename_all = "snake_case")]
pub enum PlanLayout {
    Flat(Vec<Exercise>),
    MultiDay(Vec<Day>),
    Schedule(Vec<ScheduleDay>),
}

/// Completion view of one countable item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountableItem {
    pub id: ItemId,
    pub completed: bool,
}

/// Why an item could not be addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemLookup {
    Missing,
    RestDay,
}

impl PlanLayout {
    /// Iterate over every countable (non-rest) item
    pub fn countable_items(&self) -> Box<dyn Iterator<Item = CountableItem> + '_> {
        match self {
            PlanLayout::Flat(exercises) => Box::new(exercises.iter().map(|e| CountableItem {
                id: ItemId(e.index),
                completed: e.completed,
            })),
            PlanLayout::MultiDay(days) => Box::new(
                days.iter()
                    .filter(|d| !d.is_rest_day)
                    .flat_map(|d| d.exercises.iter())
                    .map(|e| CountableItem {
                        id: ItemId(e.index),
                        completed: e.completed,
                    }),
            ),
            PlanLayout::Schedule(days) => Box::new(
                days.iter()
                    .enumerate()
                    .filter(|(_, d)| !d.is_rest_day)
                    .map(|(position, d)| CountableItem {
                        id: ItemId(position as u32),
                        completed: d.completed,
                    }),
            ),
        }
    }

    /// Mutable access to the completion flag of a countable item
    pub(crate) fn completion_flag_mut(
        &mut self,
        id: ItemId,
    ) -> std::result::Result<&mut bool, ItemLookup> {
        match self {
            PlanLayout::Flat(exercises) => exercises
                .iter_mut()
                .find(|e| e.index == id.0)
                .map(|e| &mut e.completed)
                .ok_or(ItemLookup::Missing),
            PlanLayout::MultiDay(days) => {
                for day in days.iter_mut() {
                    if let Some(exercise) = day.exercises.iter_mut().find(|e| e.index == id.0) {
                        if day.is_rest_day {
                            return Err(ItemLookup::RestDay);
                        }
                        return Ok(&mut exercise.completed);
                    }
                }
                Err(ItemLookup::Missing)
            }
            PlanLayout::Schedule(days) => match days.get_mut(id.0 as usize) {
                Some(day) if day.is_rest_day => Err(ItemLookup::RestDay),
                Some(day) => Ok(&mut day.completed),
                None => Err(ItemLookup::Missing),
            },
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            PlanLayout::Flat(_) => "flat",
            PlanLayout::MultiDay(_) => "multi-day",
            PlanLayout::Schedule(_) => "schedule",
        }
    }

    fn exercise_indices(&self) -> Vec<u32> {
        match self {
            PlanLayout::Flat(exercises) => exercises.iter().map(|e| e.index).collect(),
            PlanLayout::MultiDay(days) => days
                .iter()
                .flat_map(|d| d.exercises.iter().map(|e| e.index))
                .collect(),
            PlanLayout::Schedule(_) => Vec::new(),
        }
    }
}

/// A generated training plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub id: String,
    pub kind: PlanKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub layout: PlanLayout,
}

impl TrainingPlan {
    pub fn new(kind: PlanKind, title: impl Into<String>, layout: PlanLayout) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            created_at: Utc::now(),
            layout,
        }
    }

    pub fn countable_items(&self) -> Box<dyn Iterator<Item = CountableItem> + '_> {
        self.layout.countable_items()
    }

    /// Check structural invariants before the plan is adopted
    pub fn validate(&self) -> Result<()> {
        let shape_matches = matches!(
            (self.kind, &self.layout),
            (PlanKind::Workout, PlanLayout::Flat(_))
                | (PlanKind::Workout, PlanLayout::MultiDay(_))
                | (PlanKind::RaceTraining, PlanLayout::Schedule(_))
        );
        if !shape_matches {
            return Err(EngineError::Validation(format!(
                "{} plan {} cannot use the {} layout",
                self.kind,
                self.id,
                self.layout.shape_name()
            )));
        }

        let mut seen = HashSet::new();
        for index in self.layout.exercise_indices() {
            if !seen.insert(index) {
                return Err(EngineError::Validation(format!(
                    "plan {} repeats exercise index {}",
                    self.id, index
                )));
            }
        }

        Ok(())
    }
}
