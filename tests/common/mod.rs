//! Shared fixtures for the lifecycle integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use fitwell::error::{Endpoint, RemoteError};
use fitwell::service::{ExperienceLevel, RaceParams, WorkoutParams};
use fitwell::{
    Day, EngineError, Exercise, Feedback, GenerationParams, GenerationRequest, ItemId, PlanKind,
    PlanLayout, PlanService, Result, ScheduleDay, TrackAck, TrainingPlan,
};

/// A backend call as the scripted service received it
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Generate(GenerationRequest),
    Track {
        plan_id: String,
        item: ItemId,
        completed: bool,
    },
    Complete {
        plan_id: String,
        feedback: Feedback,
    },
}

#[derive(Default)]
struct Script {
    plans: VecDeque<TrainingPlan>,
    generate_errors: VecDeque<EngineError>,
    track_errors: VecDeque<EngineError>,
    complete_errors: VecDeque<EngineError>,
    calls: Vec<Call>,
}

/// In-memory backend with queued responses and failure injection
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<Script>,
    track_delay_ms: u64,
    complete_delay_ms: u64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every track call open for a while
    pub fn with_track_delay(mut self, millis: u64) -> Self {
        self.track_delay_ms = millis;
        self
    }

    /// Hold every completion call open for a while
    pub fn with_complete_delay(mut self, millis: u64) -> Self {
        self.complete_delay_ms = millis;
        self
    }

    pub fn queue_plan(&self, plan: TrainingPlan) {
        self.script.lock().unwrap().plans.push_back(plan);
    }

    pub fn fail_next_generate(&self, err: EngineError) {
        self.script.lock().unwrap().generate_errors.push_back(err);
    }

    pub fn fail_next_track(&self, err: EngineError) {
        self.script.lock().unwrap().track_errors.push_back(err);
    }

    pub fn fail_next_complete(&self, err: EngineError) {
        self.script.lock().unwrap().complete_errors.push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn generate_calls(&self) -> Vec<GenerationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Generate(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn track_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Track { .. }))
            .count()
    }

    pub fn complete_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Complete { .. }))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanService for ScriptedService {
    async fn generate_plan(&self, request: &GenerationRequest) -> Result<TrainingPlan> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Generate(request.clone()));
        if let Some(err) = script.generate_errors.pop_front() {
            return Err(err);
        }
        Ok(script
            .plans
            .pop_front()
            .unwrap_or_else(|| default_plan(request.kind())))
    }

    async fn track_item(&self, plan_id: &str, item: ItemId, completed: bool) -> Result<TrackAck> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.track_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.track_delay_ms)).await;
        }

        let result = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call::Track {
                plan_id: plan_id.to_string(),
                item,
                completed,
            });
            match script.track_errors.pop_front() {
                Some(err) => Err(err),
                None => Ok(TrackAck {
                    all_completed: false,
                }),
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn complete_plan(&self, plan_id: &str, feedback: &Feedback) -> Result<()> {
        if self.complete_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.complete_delay_ms)).await;
        }

        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Complete {
            plan_id: plan_id.to_string(),
            feedback: *feedback,
        });
        match script.complete_errors.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn unavailable(endpoint: Endpoint) -> EngineError {
    EngineError::Remote(RemoteError::Unavailable {
        endpoint,
        reason: "connection reset".to_string(),
    })
}

pub fn flat_plan(size: u32) -> TrainingPlan {
    let exercises = (0..size)
        .map(|i| Exercise::new(i, format!("Exercise {}", i)))
        .collect();
    TrainingPlan::new(PlanKind::Workout, "Full body", PlanLayout::Flat(exercises))
}

pub fn multi_day_plan() -> TrainingPlan {
    let days = vec![
        Day {
            day_number: 1,
            focus: "Upper body".to_string(),
            is_rest_day: false,
            exercises: vec![Exercise::new(0, "Push-ups"), Exercise::new(1, "Rows")],
        },
        Day {
            day_number: 2,
            focus: "Rest".to_string(),
            is_rest_day: true,
            exercises: vec![Exercise::new(2, "Stretching")],
        },
        Day {
            day_number: 3,
            focus: "Lower body".to_string(),
            is_rest_day: false,
            exercises: vec![Exercise::new(3, "Squats")],
        },
    ];
    TrainingPlan::new(PlanKind::Workout, "Split week", PlanLayout::MultiDay(days))
}

pub fn schedule_plan() -> TrainingPlan {
    let days = vec![
        ScheduleDay::run("Easy run", 5.0),
        ScheduleDay::rest(),
        ScheduleDay::run("Tempo run", 8.0),
    ];
    TrainingPlan::new(PlanKind::RaceTraining, "Half marathon build", PlanLayout::Schedule(days))
}

pub fn default_plan(kind: PlanKind) -> TrainingPlan {
    match kind {
        PlanKind::Workout => flat_plan(3),
        PlanKind::RaceTraining => schedule_plan(),
    }
}

pub fn workout_params() -> GenerationParams {
    GenerationParams::Workout(WorkoutParams {
        days_per_week: 4,
        equipment: vec!["dumbbells".to_string()],
        ..WorkoutParams::default()
    })
}

pub fn race_params() -> GenerationParams {
    GenerationParams::RaceTraining(RaceParams {
        current_distance_km: 10.0,
        target_date: Utc::now().date_naive() + Duration::days(90),
        experience_level: ExperienceLevel::Intermediate,
        goal_time_hours: Some(2.0),
        resting_heart_rate: Some(55),
        avg_steps: Some(8500),
        avg_sleep_hours: Some(7.0),
        spo2: Some(98),
    })
}
