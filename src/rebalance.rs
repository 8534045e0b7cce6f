//! Recovery after missed sessions: restore lost progress, penalize
//! performance, move the cursor, and let the generator overwrite every
//! not-yet-lived day plan.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::PlannerConfig;
use crate::error::SchedError;
use crate::plan::store::DayPlanStore;
use crate::plan::{Session, SessionKind, SessionStatus};
use crate::priority;
use crate::revision;
use crate::workload::ScheduleState;

/// Misses above this count in a single audit trigger the reduced-hours
/// recommendation.
pub const MISS_ALERT_THRESHOLD: usize = 2;

/// Floor for the recommended daily study hours.
pub const MIN_DAILY_STUDY_HOURS: f64 = 4.0;

/// Step the recommendation reduces daily hours by.
pub const DAILY_HOURS_REDUCTION_STEP: f64 = 0.5;

/// How far back the catch-up audit looks. Older unlived plans are not
/// replayed.
pub const MAX_AUDIT_DAYS: i64 = 14;

/// What a rebalance pass changed and what it recommends.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RebalanceOutcome {
    pub adjusted_topics: u32,
    /// Topic ids of missed sessions that referenced no known topic. One bad
    /// record never aborts the batch.
    pub skipped_topics: Vec<String>,
    /// Set when the miss batch was large enough that the configuration
    /// collaborator should consider easing the schedule. The engine never
    /// mutates configuration itself.
    pub recommended_daily_study_hours: Option<f64>,
    /// First date the regenerated plan covers.
    pub replan_from: Option<NaiveDate>,
}

/// Fold a batch of missed sessions back into the registry and position the
/// cursor for regeneration. Pure state transform; persistence and the
/// regeneration call sit with the engine facade.
pub fn apply_missed(
    state: &mut ScheduleState,
    config: &PlannerConfig,
    missed: &[Session],
    audit_date: NaiveDate,
) -> RebalanceOutcome {
    let mut outcome = RebalanceOutcome::default();

    for session in missed {
        let Some(id) = session.topic_id.as_deref() else {
            // Rest and Buffer blocks carry no topic.
            continue;
        };
        let Some(topic) = state.workload.get_mut(id) else {
            tracing::warn!(topic = %id, "Missed session references unknown topic, skipping");
            outcome.skipped_topics.push(id.to_string());
            continue;
        };

        priority::apply_outcome(topic, false);

        match session.kind {
            SessionKind::Revision => {
                revision::record_miss(topic, audit_date);
                tracing::info!(
                    topic = %id,
                    next = ?topic.next_revision_date,
                    "Missed revision pushed back"
                );
            }
            SessionKind::Study => {
                // The work is considered entirely unbanked.
                topic.remaining_time += session.duration_hours;
                if topic.is_study_completed {
                    // Back into the study pool; the revision schedule is
                    // re-seeded when study completes again.
                    topic.is_study_completed = false;
                    topic.next_revision_date = None;
                }
                tracing::info!(
                    topic = %id,
                    restored_hours = session.duration_hours,
                    "Missed study time restored"
                );
            }
            _ => {}
        }
        outcome.adjusted_topics += 1;
    }

    if missed.len() > MISS_ALERT_THRESHOLD && config.daily_study_hours > MIN_DAILY_STUDY_HOURS {
        let reduced =
            (config.daily_study_hours - DAILY_HOURS_REDUCTION_STEP).max(MIN_DAILY_STUDY_HOURS);
        tracing::warn!(
            missed = missed.len(),
            recommended_hours = reduced,
            "Large miss batch, recommending reduced daily hours"
        );
        outcome.recommended_daily_study_hours = Some(reduced);
    }

    let replan_from = audit_date + Duration::days(1);
    state.cursor_date = replan_from;
    outcome.replan_from = Some(replan_from);
    outcome
}

/// Mark every still-pending study/revision session of `date` as missed,
/// write the day back, and return the missed batch.
pub async fn sweep_day(
    store: &DayPlanStore,
    date: NaiveDate,
) -> Result<Vec<Session>, SchedError> {
    let mut sessions = store.read(date).await?;
    let mut missed = Vec::new();

    for session in sessions.iter_mut() {
        if session.status == SessionStatus::Pending && session.is_workable() {
            session.status = SessionStatus::Missed;
            missed.push(session.clone());
        }
    }

    if !missed.is_empty() {
        store.write(date, &sessions).await?;
    }
    Ok(missed)
}

/// Sweep every past day inside the bounded catch-up window
/// `[today - MAX_AUDIT_DAYS, today)`. Days that were never planned are
/// skipped; already-audited days hold no pending sessions and are no-ops.
pub async fn sweep_window(
    store: &DayPlanStore,
    today: NaiveDate,
) -> Result<Vec<Session>, SchedError> {
    let mut date = today - Duration::days(MAX_AUDIT_DAYS);
    let mut all = Vec::new();

    while date < today {
        match sweep_day(store, date).await {
            Ok(mut missed) => {
                if !missed.is_empty() {
                    tracing::info!(date = %date, count = missed.len(), "Found missed sessions");
                }
                all.append(&mut missed);
            }
            Err(SchedError::MissingPlan(_)) => {}
            Err(e) => return Err(e),
        }
        date += Duration::days(1);
    }
    Ok(all)
}
