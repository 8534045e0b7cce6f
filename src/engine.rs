//! The host-facing facade. Every public operation loads the registry, runs
//! to completion, and persists, serialized by one operation gate so at most
//! one mutation of the registry is ever in flight.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::config::catalogue::Catalogue;
use crate::config::{self, PlannerConfig};
use crate::error::SchedError;
use crate::plan::store::DayPlanStore;
use crate::plan::{Session, SessionKind, SessionStatus};
use crate::planner::{DayPlanGenerator, GenerationSummary};
use crate::priority;
use crate::quota::{self, QuotaSummary};
use crate::rebalance::{self, RebalanceOutcome};
use crate::report::{self, ProgressReport};
use crate::revision;
use crate::workload::{store as registry_store, ScheduleState, EPSILON_HOURS};

/// Everything one planning operation needs, passed in explicitly. No
/// process-wide configuration exists.
#[derive(Debug, Clone)]
pub struct SchedulerContext {
    pub config: PlannerConfig,
    pub catalogue: Catalogue,
    /// Location of the persisted workload registry.
    pub state_path: PathBuf,
    /// Root directory for per-day plan documents.
    pub plan_root: PathBuf,
}

impl SchedulerContext {
    /// Context with stores under the platform application data directory.
    pub fn new(config: PlannerConfig, catalogue: Catalogue) -> SchedulerContext {
        let data_dir = config::app_data_dir();
        SchedulerContext {
            config,
            catalogue,
            state_path: data_dir.join("schedule_state.json"),
            plan_root: DayPlanStore::default_root(),
        }
    }

    /// Context with both stores rooted under one directory. Handy for tests
    /// and embedded hosts.
    pub fn rooted_at(
        config: PlannerConfig,
        catalogue: Catalogue,
        root: impl Into<PathBuf>,
    ) -> SchedulerContext {
        let root = root.into();
        SchedulerContext {
            config,
            catalogue,
            state_path: root.join("schedule_state.json"),
            plan_root: root.join("plans"),
        }
    }
}

/// The adaptive scheduling engine.
pub struct Scheduler {
    ctx: SchedulerContext,
    plans: DayPlanStore,
    /// Serializes load, mutate, persist: at most one in-flight mutation.
    op_gate: Mutex<()>,
    /// Last persisted registry state, for cheap host reads between ops.
    snapshot: Arc<RwLock<Option<ScheduleState>>>,
}

impl Scheduler {
    pub fn new(ctx: SchedulerContext) -> Scheduler {
        let plans = DayPlanStore::new(ctx.plan_root.clone());
        Scheduler {
            ctx,
            plans,
            op_gate: Mutex::new(()),
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.ctx.config
    }

    pub fn plans(&self) -> &DayPlanStore {
        &self.plans
    }

    /// Registry state as of the last persisted operation, without touching
    /// disk. `None` until the first operation runs.
    pub fn snapshot(&self) -> Option<ScheduleState> {
        self.snapshot.read().clone()
    }

    async fn load_state(&self, today: NaiveDate) -> ScheduleState {
        registry_store::load_state(&self.ctx.state_path, &self.ctx.catalogue, today).await
    }

    async fn persist(&self, state: &ScheduleState) -> Result<(), SchedError> {
        registry_store::save_state(&self.ctx.state_path, state).await?;
        *self.snapshot.write() = Some(state.clone());
        Ok(())
    }

    /// Refresh priorities and the daily quota without planning anything.
    pub async fn recompute_quota(&self, today: NaiveDate) -> Result<QuotaSummary, SchedError> {
        let _gate = self.op_gate.lock().await;
        let mut state = self.load_state(today).await;
        let summary = quota::recompute(&mut state, &self.ctx.config);
        self.persist(&state).await?;
        Ok(summary)
    }

    /// Plan every day from `from` through the deadline, overwriting whatever
    /// the plan store holds for those dates.
    pub async fn generate_from(&self, from: NaiveDate) -> Result<GenerationSummary, SchedError> {
        let _gate = self.op_gate.lock().await;
        let mut state = self.load_state(from).await;
        let summary = DayPlanGenerator::new(&self.ctx.config, &self.plans)
            .generate_from(&mut state, from)
            .await?;
        self.persist(&state).await?;
        Ok(summary)
    }

    /// Fold missed sessions back into the registry and regenerate from the
    /// day after the audit.
    pub async fn rebalance(
        &self,
        missed: &[Session],
        audit_date: NaiveDate,
    ) -> Result<RebalanceOutcome, SchedError> {
        let _gate = self.op_gate.lock().await;
        let mut state = self.load_state(audit_date).await;

        let outcome = rebalance::apply_missed(&mut state, &self.ctx.config, missed, audit_date);
        // Adjustments are durable even if regeneration below fails.
        self.persist(&state).await?;

        let replan_from = audit_date + Duration::days(1);
        DayPlanGenerator::new(&self.ctx.config, &self.plans)
            .generate_from(&mut state, replan_from)
            .await?;
        self.persist(&state).await?;

        Ok(outcome)
    }

    /// Success path of the outcome callback surface. Deducts the planned
    /// duration for study blocks (the actual elapsed time is logged only),
    /// advances the revision machine for revision blocks, and marks the
    /// stored session Completed.
    pub async fn on_completed(
        &self,
        session: &Session,
        date: NaiveDate,
        actual_elapsed_hours: f64,
    ) -> Result<(), SchedError> {
        let _gate = self.op_gate.lock().await;

        let Some(topic_id) = session.topic_id.as_deref() else {
            // Rest/Buffer completions carry no topic progress.
            return Ok(());
        };

        let mut state = self.load_state(date).await;
        let topic = state
            .workload
            .get_mut(topic_id)
            .ok_or_else(|| SchedError::TopicNotFound(topic_id.to_string()))?;

        priority::apply_outcome(topic, true);
        tracing::debug!(
            topic = %topic_id,
            planned_hours = session.duration_hours,
            actual_hours = actual_elapsed_hours,
            "Session completed"
        );

        match session.kind {
            SessionKind::Study => {
                topic.remaining_time =
                    (topic.remaining_time - session.duration_hours).max(0.0);
                if topic.remaining_time <= EPSILON_HOURS {
                    topic.remaining_time = 0.0;
                    topic.is_study_completed = true;
                    revision::schedule_first(topic, date);
                    tracing::info!(
                        topic = %topic_id,
                        next_revision = ?topic.next_revision_date,
                        "Initial study complete"
                    );
                }
            }
            SessionKind::Revision => {
                revision::record_success(topic, date);
            }
            _ => {}
        }

        self.persist(&state).await?;
        self.mark_session(date, session, SessionStatus::Completed).await;
        Ok(())
    }

    /// Miss path of the outcome callback surface: a one-session rebalance.
    pub async fn on_missed(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> Result<RebalanceOutcome, SchedError> {
        self.mark_session(date, session, SessionStatus::Missed).await;
        self.rebalance(std::slice::from_ref(session), date).await
    }

    /// Audit unlived past days inside the bounded catch-up window, rebalance
    /// any misses, and make sure today is planned.
    pub async fn catch_up(&self, today: NaiveDate) -> Result<Option<RebalanceOutcome>, SchedError> {
        let missed = rebalance::sweep_window(&self.plans, today).await?;
        if !missed.is_empty() {
            tracing::info!(count = missed.len(), "Rebalancing after catch-up audit");
            let outcome = self.rebalance(&missed, today - Duration::days(1)).await?;
            return Ok(Some(outcome));
        }

        let cursor = self.load_state(today).await.cursor_date;
        if cursor <= today {
            tracing::info!(cursor = %cursor, "Schedule is behind, regenerating from today");
            self.generate_from(today).await?;
        }
        Ok(None)
    }

    /// Aggregate progress for display.
    pub async fn progress_report(&self, today: NaiveDate) -> Result<ProgressReport, SchedError> {
        let _gate = self.op_gate.lock().await;
        let mut state = self.load_state(today).await;
        Ok(report::compute_report(&mut state, &self.ctx.config, today))
    }

    /// Flip the matching stored session's status. A vanished or never-stored
    /// plan is not an error here: the registry already holds the truth.
    async fn mark_session(&self, date: NaiveDate, session: &Session, status: SessionStatus) {
        let mut sessions = match self.plans.read(date).await {
            Ok(sessions) => sessions,
            Err(SchedError::MissingPlan(_)) => return,
            Err(e) => {
                tracing::warn!(date = %date, error = %e, "Could not read day plan to mark session");
                return;
            }
        };

        let target = sessions.iter_mut().find(|s| {
            s.topic_id == session.topic_id
                && s.kind == session.kind
                && s.status == SessionStatus::Pending
        });
        let Some(target) = target else {
            return;
        };
        target.status = status;

        if let Err(e) = self.plans.write(date, &sessions).await {
            tracing::warn!(date = %date, error = %e, "Could not write back day plan status");
        }
    }
}
