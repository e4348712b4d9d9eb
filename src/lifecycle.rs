//! Active plan lifecycle
//!
//! Each plan kind runs its own state machine:
//!
//! ```text
//! NoPlan --request--> Active --toggle (completing edge)--> PendingFeedback --submit--> NoPlan
//!                       |
//!                       +--request without force--> ReplaceRequested --confirm--> Active (new plan)
//!                                                                    --cancel---> previous state
//! ```
//!
//! All operations on one kind are serialized through that kind's mutex, which is
//! held across the remote call. A toggle therefore waits for the previous
//! toggle's settlement before it is applied. The two kinds never block each
//! other.
//!
//! Once the lock is taken, the remote call and the local update run on a
//! spawned task that owns the guard. A caller that stops waiting (timeout,
//! `select!`) does not cancel the operation: the task still settles the local
//! state with the backend's answer, and the next operation on that kind waits
//! for it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::completion::{CompletionTracker, Progress, ToggleOutcome};
use crate::error::{Endpoint, EngineError, ErrorSeverity, RemoteError, Result};
use crate::feedback::{
    Feedback, FeedbackCollector, FeedbackDraft, FeedbackHistory, FeedbackRecord, RegenerationHint,
};
use crate::models::PlanKind;
use crate::plan::{ItemId, TrainingPlan};
use crate::service::{GenerationParams, GenerationRequest, PlanService};

/// Lifecycle state of one plan kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    NoPlan,
    Active,
    PendingFeedback,
    /// A new plan was requested while one is held; waiting for confirmation
    ReplaceRequested,
}

impl fmt::Display for PlanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanPhase::NoPlan => write!(f, "no plan"),
            PlanPhase::Active => write!(f, "active"),
            PlanPhase::PendingFeedback => write!(f, "pending feedback"),
            PlanPhase::ReplaceRequested => write!(f, "replace requested"),
        }
    }
}

/// When local completion state changes relative to the remote acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    /// Apply only after the backend acknowledges
    #[default]
    Confirmed,
    /// Apply immediately, roll back if the backend call fails
    Optimistic,
}

/// Point-in-time view of one plan kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSnapshot {
    pub kind: PlanKind,
    pub phase: PlanPhase,
    pub plan: Option<TrainingPlan>,
    pub progress: Progress,
}

impl PlanSnapshot {
    fn empty(kind: PlanKind) -> Self {
        Self {
            kind,
            phase: PlanPhase::NoPlan,
            plan: None,
            progress: Progress::default(),
        }
    }
}

/// Result of a toggle as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleReport {
    pub outcome: ToggleOutcome,
    pub phase: PlanPhase,
    /// True only on the call that completed the plan
    pub feedback_requested: bool,
}

#[derive(Debug, Clone)]
struct PendingReplace {
    params: GenerationParams,
    resume: PlanPhase,
}

#[derive(Debug)]
struct Slot {
    kind: PlanKind,
    phase: PlanPhase,
    plan: Option<TrainingPlan>,
    pending_replace: Option<PendingReplace>,
}

impl Slot {
    fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            phase: PlanPhase::NoPlan,
            plan: None,
            pending_replace: None,
        }
    }

    fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            kind: self.kind,
            phase: self.phase,
            progress: self
                .plan
                .as_ref()
                .map(CompletionTracker::progress)
                .unwrap_or_default(),
            plan: self.plan.clone(),
        }
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidState {
            kind: self.kind,
            state: self.phase.to_string(),
            operation,
        }
    }

    fn plan_mut(&mut self, operation: &'static str) -> Result<&mut TrainingPlan> {
        match self.plan {
            Some(ref mut plan) => Ok(plan),
            None => Err(self.invalid(operation)),
        }
    }
}

struct KindChannel {
    slot: Arc<Mutex<Slot>>,
    updates: watch::Sender<PlanSnapshot>,
}

impl KindChannel {
    fn new(kind: PlanKind) -> Self {
        let (updates, _) = watch::channel(PlanSnapshot::empty(kind));
        Self {
            slot: Arc::new(Mutex::new(Slot::new(kind))),
            updates,
        }
    }

    /// Queue behind earlier operations on this kind
    async fn lock(&self) -> OwnedMutexGuard<Slot> {
        self.slot.clone().lock_owned().await
    }

    fn publish(&self, slot: &Slot) {
        self.updates.send_replace(slot.snapshot());
    }
}

const TOGGLE: &str = "toggle an item";
const SUBMIT: &str = "submit feedback";

/// Owns the active plan of each kind and drives its transitions
pub struct PlanLifecycleManager {
    service: Arc<dyn PlanService>,
    toggle_mode: ToggleMode,
    workout: Arc<KindChannel>,
    race_training: Arc<KindChannel>,
    history: Arc<RwLock<FeedbackHistory>>,
}

impl PlanLifecycleManager {
    pub fn new(service: Arc<dyn PlanService>) -> Self {
        Self {
            service,
            toggle_mode: ToggleMode::default(),
            workout: Arc::new(KindChannel::new(PlanKind::Workout)),
            race_training: Arc::new(KindChannel::new(PlanKind::RaceTraining)),
            history: Arc::new(RwLock::new(FeedbackHistory::default())),
        }
    }

    pub fn with_toggle_mode(mut self, mode: ToggleMode) -> Self {
        self.toggle_mode = mode;
        self
    }

    /// Seed previously submitted feedback, e.g. loaded from storage
    pub fn with_history(mut self, history: FeedbackHistory) -> Self {
        self.history = Arc::new(RwLock::new(history));
        self
    }

    pub fn toggle_mode(&self) -> ToggleMode {
        self.toggle_mode
    }

    fn channel(&self, kind: PlanKind) -> &Arc<KindChannel> {
        match kind {
            PlanKind::Workout => &self.workout,
            PlanKind::RaceTraining => &self.race_training,
        }
    }

    /// Current state of one plan kind, after any operation still settling
    pub async fn snapshot(&self, kind: PlanKind) -> PlanSnapshot {
        self.channel(kind).lock().await.snapshot()
    }

    /// Observe every state change of one plan kind
    pub fn subscribe(&self, kind: PlanKind) -> watch::Receiver<PlanSnapshot> {
        self.channel(kind).updates.subscribe()
    }

    pub async fn phase(&self, kind: PlanKind) -> PlanPhase {
        self.channel(kind).lock().await.phase
    }

    pub async fn feedback_history(&self) -> Vec<FeedbackRecord> {
        self.history.read().await.records().to_vec()
    }

    /// Hint that the next generation request of this kind will carry
    pub async fn pending_hint(&self, kind: PlanKind) -> Option<RegenerationHint> {
        latest_hint(&self.history, kind).await
    }

    /// Take over a plan fetched from the backend (e.g. after a restart).
    ///
    /// A plan that is already fully completed goes straight to feedback.
    pub async fn adopt_plan(&self, plan: TrainingPlan) -> Result<PlanPhase> {
        plan.validate()?;
        let channel = self.channel(plan.kind);
        let mut slot = channel.lock().await;
        if slot.phase != PlanPhase::NoPlan {
            return Err(slot.invalid("adopt a plan"));
        }

        let progress = CompletionTracker::progress(&plan);
        slot.phase = if progress.is_complete() {
            PlanPhase::PendingFeedback
        } else {
            PlanPhase::Active
        };
        info!(
            kind = %plan.kind,
            plan_id = %plan.id,
            completed = progress.completed,
            total = progress.total,
            "Adopted existing plan"
        );
        slot.plan = Some(plan);
        channel.publish(&slot);
        Ok(slot.phase)
    }

    /// Request a new plan.
    ///
    /// With a plan already held and `force` unset, nothing is sent: the kind
    /// moves to `ReplaceRequested` and `ActivePlanExists` is returned so the
    /// caller can ask the user to confirm. This applies while feedback is
    /// pending as well as while the plan is active, so a finished plan can be
    /// replaced without rating it; cancelling returns to `PendingFeedback`.
    pub async fn request_plan(&self, params: GenerationParams, force: bool) -> Result<TrainingPlan> {
        params.validate(Utc::now().date_naive())?;
        let kind = params.kind();
        let channel = self.channel(kind);
        let mut slot = channel.lock().await;

        if slot.phase != PlanPhase::NoPlan && !force {
            let resume = match &slot.pending_replace {
                Some(pending) => pending.resume,
                None => slot.phase,
            };
            slot.pending_replace = Some(PendingReplace { params, resume });
            slot.phase = PlanPhase::ReplaceRequested;
            channel.publish(&slot);

            let plan_id = slot.plan.as_ref().map(|p| p.id.clone());
            info!(kind = %kind, plan_id = ?plan_id, "Replacement requires confirmation");
            return Err(EngineError::ActivePlanExists { kind, plan_id });
        }

        self.spawn_generation(slot, params, force).await
    }

    /// Proceed with a replacement the user confirmed
    pub async fn confirm_replace(&self, kind: PlanKind) -> Result<TrainingPlan> {
        let slot = self.channel(kind).lock().await;
        let params = match (&slot.phase, &slot.pending_replace) {
            (PlanPhase::ReplaceRequested, Some(pending)) => pending.params.clone(),
            _ => return Err(slot.invalid("confirm a replacement")),
        };

        self.spawn_generation(slot, params, true).await
    }

    /// Keep the current plan and drop the replacement request
    pub async fn cancel_replace(&self, kind: PlanKind) -> Result<PlanPhase> {
        let channel = self.channel(kind);
        let mut slot = channel.lock().await;
        if slot.phase != PlanPhase::ReplaceRequested {
            return Err(slot.invalid("cancel a replacement"));
        }

        let resume = slot
            .pending_replace
            .take()
            .map(|pending| pending.resume)
            .unwrap_or(PlanPhase::Active);
        slot.phase = resume;
        channel.publish(&slot);
        debug!(kind = %kind, phase = %resume, "Replacement cancelled");
        Ok(resume)
    }

    async fn spawn_generation(
        &self,
        slot: OwnedMutexGuard<Slot>,
        params: GenerationParams,
        force: bool,
    ) -> Result<TrainingPlan> {
        let task = tokio::spawn(generate_into(
            self.service.clone(),
            self.history.clone(),
            self.channel(slot.kind).clone(),
            slot,
            params,
            force,
        ));
        join_settled(Endpoint::GeneratePlan, task).await
    }

    /// Flip one item's completion.
    ///
    /// The toggle that completes the plan moves it to `PendingFeedback` and is
    /// the only call reporting `feedback_requested`. Un-completing an item while
    /// feedback is pending returns the plan to `Active`.
    pub async fn toggle_item(&self, kind: PlanKind, item: ItemId) -> Result<ToggleReport> {
        let channel = self.channel(kind);
        let mut slot = channel.lock().await;
        if !matches!(slot.phase, PlanPhase::Active | PlanPhase::PendingFeedback) {
            return Err(slot.invalid(TOGGLE));
        }
        let target = CompletionTracker::check(slot.plan_mut(TOGGLE)?, item)?;

        let task = tokio::spawn(settle_toggle(
            self.service.clone(),
            channel.clone(),
            slot,
            item,
            target,
            self.toggle_mode,
        ));
        join_settled(Endpoint::TrackItem, task).await
    }

    /// Submit feedback for a completed plan.
    ///
    /// The plan is cleared only once the backend acknowledges; on failure it
    /// stays in `PendingFeedback` so the submission can be retried.
    pub async fn submit_feedback(
        &self,
        kind: PlanKind,
        draft: &FeedbackDraft,
    ) -> Result<RegenerationHint> {
        let feedback = FeedbackCollector::finalize(draft)?;
        let channel = self.channel(kind);
        let mut slot = channel.lock().await;
        if slot.phase != PlanPhase::PendingFeedback {
            return Err(slot.invalid(SUBMIT));
        }
        slot.plan_mut(SUBMIT)?;

        let task = tokio::spawn(settle_feedback(
            self.service.clone(),
            self.history.clone(),
            channel.clone(),
            slot,
            feedback,
        ));
        join_settled(Endpoint::CompletePlan, task).await
    }
}

async fn latest_hint(
    history: &RwLock<FeedbackHistory>,
    kind: PlanKind,
) -> Option<RegenerationHint> {
    history
        .read()
        .await
        .latest(kind)
        .map(|record| FeedbackCollector::hint(kind, &record.feedback))
}

/// Wait for a settlement task; panics inside it are re-raised here
async fn join_settled<T>(endpoint: Endpoint, task: JoinHandle<Result<T>>) -> Result<T> {
    match task.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(EngineError::Remote(RemoteError::Unavailable {
            endpoint,
            reason: err.to_string(),
        })),
    }
}

fn log_failure(kind: PlanKind, plan_id: Option<&str>, message: &str, err: &EngineError) {
    let retryable = err.is_retryable();
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => {
            error!(kind = %kind, plan_id = ?plan_id, retryable, error = %err, "{}", message)
        }
        ErrorSeverity::Warning => {
            warn!(kind = %kind, plan_id = ?plan_id, retryable, error = %err, "{}", message)
        }
        ErrorSeverity::Info => {
            info!(kind = %kind, plan_id = ?plan_id, retryable, error = %err, "{}", message)
        }
    }
}

/// Call the generator and adopt its plan. State changes only on success.
async fn generate_into(
    service: Arc<dyn PlanService>,
    history: Arc<RwLock<FeedbackHistory>>,
    channel: Arc<KindChannel>,
    mut slot: OwnedMutexGuard<Slot>,
    params: GenerationParams,
    force: bool,
) -> Result<TrainingPlan> {
    let kind = slot.kind;
    let request = GenerationRequest {
        params,
        force,
        hint: latest_hint(&history, kind).await,
    };

    let plan = match service.generate_plan(&request).await {
        Ok(plan) => plan,
        Err(err) => {
            log_failure(kind, None, "Plan generation failed", &err);
            return Err(err);
        }
    };

    if plan.kind != kind {
        return Err(EngineError::Validation(format!(
            "generator returned a {} plan for a {} request",
            plan.kind, kind
        )));
    }
    plan.validate()?;

    if let Some(previous) = slot.plan.as_ref() {
        let progress = CompletionTracker::progress(previous);
        info!(
            kind = %kind,
            previous_plan = %previous.id,
            discarded_completed = progress.completed,
            "Replacing active plan"
        );
    }

    info!(kind = %kind, plan_id = %plan.id, hinted = request.hint.is_some(), "Plan activated");
    slot.plan = Some(plan.clone());
    slot.phase = PlanPhase::Active;
    slot.pending_replace = None;
    channel.publish(&slot);
    Ok(plan)
}

async fn settle_toggle(
    service: Arc<dyn PlanService>,
    channel: Arc<KindChannel>,
    mut slot: OwnedMutexGuard<Slot>,
    item: ItemId,
    target: bool,
    mode: ToggleMode,
) -> Result<ToggleReport> {
    let kind = slot.kind;
    let plan = slot.plan_mut(TOGGLE)?;
    let plan_id = plan.id.clone();
    let was_complete = CompletionTracker::progress(plan).is_complete();

    let (outcome, ack) = match mode {
        ToggleMode::Confirmed => {
            let ack = match service.track_item(&plan_id, item, target).await {
                Ok(ack) => ack,
                Err(err) => {
                    log_failure(kind, Some(&plan_id), "Toggle not acknowledged", &err);
                    return Err(err);
                }
            };
            let outcome = CompletionTracker::toggle(slot.plan_mut(TOGGLE)?, item)?;
            (outcome, ack)
        }
        ToggleMode::Optimistic => {
            let outcome = CompletionTracker::toggle(plan, item)?;
            channel.publish(&slot);
            match service.track_item(&plan_id, item, target).await {
                Ok(ack) => (outcome, ack),
                Err(err) => {
                    CompletionTracker::toggle(slot.plan_mut(TOGGLE)?, item)?;
                    channel.publish(&slot);
                    log_failure(kind, Some(&plan_id), "Rolled back optimistic toggle", &err);
                    return Err(err);
                }
            }
        }
    };

    if ack.all_completed != outcome.all_completed {
        warn!(
            plan_id = %plan_id,
            local = outcome.all_completed,
            remote = ack.all_completed,
            "Backend completion disagrees with local count, keeping local"
        );
    }

    let mut feedback_requested = false;
    if !was_complete && outcome.all_completed {
        slot.phase = PlanPhase::PendingFeedback;
        feedback_requested = true;
        info!(kind = %kind, plan_id = %plan_id, "All items completed, awaiting feedback");
    } else if was_complete && !outcome.all_completed && slot.phase == PlanPhase::PendingFeedback {
        slot.phase = PlanPhase::Active;
        debug!(kind = %kind, plan_id = %plan_id, "Plan reopened before feedback");
    }

    debug!(
        kind = %kind,
        plan_id = %plan_id,
        item = %item,
        completed = outcome.completed,
        progress = %format!("{}/{}", outcome.progress.completed, outcome.progress.total),
        "Item toggled"
    );
    channel.publish(&slot);

    Ok(ToggleReport {
        outcome,
        phase: slot.phase,
        feedback_requested,
    })
}

async fn settle_feedback(
    service: Arc<dyn PlanService>,
    history: Arc<RwLock<FeedbackHistory>>,
    channel: Arc<KindChannel>,
    mut slot: OwnedMutexGuard<Slot>,
    feedback: Feedback,
) -> Result<RegenerationHint> {
    let kind = slot.kind;
    let plan_id = slot.plan_mut(SUBMIT)?.id.clone();
    if let Err(err) = service.complete_plan(&plan_id, &feedback).await {
        log_failure(kind, Some(&plan_id), "Feedback submission failed, plan kept", &err);
        return Err(err);
    }

    history.write().await.record(FeedbackRecord {
        plan_id: plan_id.clone(),
        kind,
        feedback,
        submitted_at: Utc::now(),
    });
    slot.plan = None;
    slot.phase = PlanPhase::NoPlan;
    slot.pending_replace = None;
    channel.publish(&slot);

    info!(
        kind = %kind,
        plan_id = %plan_id,
        difficulty = %feedback.difficulty,
        preference = %feedback.preference,
        "Plan completed with feedback"
    );
    Ok(FeedbackCollector::hint(kind, &feedback))
}
