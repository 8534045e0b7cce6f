//! Day-plan generation: walks calendar days from a cursor to the deadline
//! and emits an ordered session list per day: due revisions first, then
//! quota-bounded study blocks under the subject-rotation constraint, then
//! the fixed buffer block.
//!
//! The walk plans against a cloned snapshot of the topic map. Topic state in
//! the registry is only ever changed by reported outcomes, so regenerating
//! the same range any number of times before a session is lived through
//! leaves the registry untouched apart from the cursor and quota aggregates.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::config::PlannerConfig;
use crate::error::SchedError;
use crate::plan::store::DayPlanStore;
use crate::plan::{Session, SessionKind};
use crate::priority;
use crate::quota;
use crate::revision::{self, REVISION_SLOT_HOURS};
use crate::workload::{ScheduleState, TopicWorkload, EPSILON_HOURS};

/// What one generation pass produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    pub days_planned: u32,
    pub study_sessions: u32,
    pub revision_sessions: u32,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Everything is studied and revised; no plan was produced.
    pub retired: bool,
}

pub struct DayPlanGenerator<'a> {
    config: &'a PlannerConfig,
    store: &'a DayPlanStore,
}

impl<'a> DayPlanGenerator<'a> {
    pub fn new(config: &'a PlannerConfig, store: &'a DayPlanStore) -> Self {
        DayPlanGenerator { config, store }
    }

    /// Plan every day in `[from, deadline]`, whole-day replacing anything the
    /// store already holds for those dates, and advance the cursor.
    pub async fn generate_from(
        &self,
        state: &mut ScheduleState,
        from: NaiveDate,
    ) -> Result<GenerationSummary, SchedError> {
        self.config.validate()?;

        state.cursor_date = from;
        quota::recompute(state, self.config);

        let any_due = state.workload.values().any(|t| revision::is_due(t, from));
        if from > self.config.deadline {
            if state.total_remaining_time <= EPSILON_HOURS && !any_due {
                tracing::info!("Curriculum fully retired, nothing left to plan");
                return Ok(GenerationSummary {
                    retired: true,
                    ..GenerationSummary::default()
                });
            }
            return Err(SchedError::InvalidConfiguration(format!(
                "deadline {} is before the planning cursor {}",
                self.config.deadline, from
            )));
        }

        tracing::info!(
            daily_quota = state.daily_quota,
            net_study_days = state.net_study_days,
            from = %from,
            "Generating day plans"
        );

        // Plan-time mutations are provisional and stay on this snapshot;
        // outcome reports are what move the registry.
        let mut scratch: BTreeMap<String, TopicWorkload> = state.workload.clone();
        let daily_quota = state.daily_quota;

        let mut summary = GenerationSummary {
            first_date: Some(from),
            ..GenerationSummary::default()
        };

        let mut date = from;
        while date <= self.config.deadline {
            let sessions = self.plan_day(&mut scratch, daily_quota, date);
            for s in &sessions {
                match s.kind {
                    SessionKind::Study => summary.study_sessions += 1,
                    SessionKind::Revision => summary.revision_sessions += 1,
                    _ => {}
                }
            }
            self.store.write(date, &sessions).await?;

            summary.days_planned += 1;
            summary.last_date = Some(date);
            date += Duration::days(1);
            state.cursor_date = date;
        }

        Ok(summary)
    }

    fn plan_day(
        &self,
        scratch: &mut BTreeMap<String, TopicWorkload>,
        daily_quota: f64,
        date: NaiveDate,
    ) -> Vec<Session> {
        if date.weekday() == self.config.weekly_rest_day {
            return vec![Session::rest(
                &self.config.rest_day_activity,
                self.config.daily_study_hours,
            )];
        }

        let daily_budget = self.config.daily_budget_hours();
        let mut sessions = Vec::new();
        let mut hours_assigned = 0.0;
        let mut last_subject = String::new();

        // Due revisions first, highest priority first.
        let due = ids_sorted_by_priority(scratch, |t| revision::is_due(t, date));
        for id in due {
            let slot = REVISION_SLOT_HOURS.min(daily_budget - hours_assigned);
            if slot <= EPSILON_HOURS {
                break;
            }
            if let Some(topic) = scratch.get_mut(&id) {
                sessions.push(Session::revision(topic, slot));
                hours_assigned += slot;
                last_subject = topic.subject.clone();
                // Provisional: later days of this walk must see the pushed-out
                // due date, not schedule the same revision again.
                revision::record_success(topic, date);
            }
        }

        // Study blocks: fill toward the quota under the subject-rotation
        // constraint.
        let mut active = ids_sorted_by_priority(scratch, TopicWorkload::is_active);
        let mut daily_progress_cost = 0.0;

        while daily_progress_cost < daily_quota
            && hours_assigned < daily_budget
            && !active.is_empty()
        {
            // Prefer a subject change; never block progress over it.
            let pick = active
                .iter()
                .position(|id| {
                    scratch
                        .get(id)
                        .map_or(false, |t| t.subject != last_subject)
                })
                .unwrap_or(0);
            let id = active[pick].clone();

            let Some(topic) = scratch.get_mut(&id) else {
                active.remove(pick);
                continue;
            };

            let duration = self
                .config
                .max_session_hours
                .min(topic.remaining_time)
                .min(daily_budget - hours_assigned);
            if duration <= EPSILON_HOURS {
                break;
            }

            sessions.push(Session::study(topic, duration));
            daily_progress_cost += priority::weighted_cost_for(duration, topic);
            hours_assigned += duration;
            last_subject = topic.subject.clone();
            topic.remaining_time -= duration;

            if topic.remaining_time <= EPSILON_HOURS {
                topic.remaining_time = 0.0;
                topic.is_study_completed = true;
                revision::schedule_first(topic, date);
                active.remove(pick);
                sort_by_priority(scratch, &mut active);
            }
        }

        sessions.push(Session::buffer(
            f64::from(self.config.daily_buffer_minutes) / 60.0,
        ));
        sessions
    }
}

/// Topic ids matching `filter`, ordered by descending priority score with the
/// id itself as the deterministic tie-break.
fn ids_sorted_by_priority(
    topics: &BTreeMap<String, TopicWorkload>,
    filter: impl Fn(&TopicWorkload) -> bool,
) -> Vec<String> {
    let mut ids: Vec<String> = topics
        .values()
        .filter(|t| filter(t))
        .map(|t| t.id.clone())
        .collect();
    sort_by_priority(topics, &mut ids);
    ids
}

fn sort_by_priority(topics: &BTreeMap<String, TopicWorkload>, ids: &mut [String]) {
    ids.sort_by(|a, b| {
        let pa = topics.get(a).map(|t| t.priority_score).unwrap_or(0.0);
        let pb = topics.get(b).map(|t| t.priority_score).unwrap_or(0.0);
        pb.partial_cmp(&pa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });
}
