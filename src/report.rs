//! Progress reporting: a pure aggregation over the registry for hosts to
//! render however they like.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PlannerConfig;
use crate::quota::{self, QuotaSummary};
use crate::revision::{self, RevisionPhase};
use crate::workload::{ScheduleState, TopicWorkload, MAX_REVISIONS};

#[derive(Debug, Clone, Serialize)]
pub struct TopicBrief {
    pub id: String,
    pub subject: String,
    pub label: String,
    pub priority_score: f64,
    pub remaining_time: f64,
    pub difficulty: f64,
    pub success_rate: f64,
    pub revision_count: u32,
    pub max_revisions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_revision_date: Option<NaiveDate>,
}

impl TopicBrief {
    fn of(topic: &TopicWorkload) -> TopicBrief {
        TopicBrief {
            id: topic.id.clone(),
            subject: topic.subject.clone(),
            label: topic.label.clone(),
            priority_score: topic.priority_score,
            remaining_time: topic.remaining_time,
            difficulty: topic.difficulty,
            success_rate: topic.success_rate,
            revision_count: topic.revision_count,
            max_revisions: MAX_REVISIONS,
            next_revision_date: topic.next_revision_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub generated_for: NaiveDate,
    pub deadline: NaiveDate,
    pub totals: QuotaSummary,
    /// Topics still in initial study, highest priority first.
    pub pending_study: Vec<TopicBrief>,
    /// Revisions due on the report date, highest priority first.
    pub due_revisions: Vec<TopicBrief>,
    /// Future revisions, earliest first.
    pub upcoming_revisions: Vec<TopicBrief>,
    /// Topics that graduated the whole pipeline.
    pub completed_topics: u32,
    pub total_topics: u32,
    pub completion_percent: f64,
}

/// Build the report. Recomputes quota figures first so the numbers reflect
/// current performance, which is also why the state is taken mutably.
pub fn compute_report(
    state: &mut ScheduleState,
    config: &PlannerConfig,
    today: NaiveDate,
) -> ProgressReport {
    let totals = quota::recompute(state, config);

    let mut pending_study = Vec::new();
    let mut due_revisions = Vec::new();
    let mut upcoming_revisions = Vec::new();
    let mut completed = 0u32;

    for topic in state.workload.values() {
        if topic.is_active() {
            pending_study.push(TopicBrief::of(topic));
            continue;
        }
        match revision::phase(topic, today) {
            Some(RevisionPhase::Due) => due_revisions.push(TopicBrief::of(topic)),
            Some(RevisionPhase::NotYetDue) => upcoming_revisions.push(TopicBrief::of(topic)),
            _ => completed += 1,
        }
    }

    by_priority(&mut pending_study);
    by_priority(&mut due_revisions);
    upcoming_revisions.sort_by(|a, b| {
        a.next_revision_date
            .cmp(&b.next_revision_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    let total_topics = state.workload.len() as u32;
    let completion_percent = if total_topics > 0 {
        f64::from(completed) / f64::from(total_topics) * 100.0
    } else {
        100.0
    };

    ProgressReport {
        generated_for: today,
        deadline: config.deadline,
        totals,
        pending_study,
        due_revisions,
        upcoming_revisions,
        completed_topics: completed,
        total_topics,
        completion_percent,
    }
}

fn by_priority(briefs: &mut [TopicBrief]) {
    briefs.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}
