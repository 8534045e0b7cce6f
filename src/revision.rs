//! Spaced-repetition sub-machine attached to each completed topic.
//!
//! Intervals grow linearly with the repetition count from a per-topic base
//! fixed at creation; a topic graduates once it has banked
//! [`MAX_REVISIONS`](crate::workload::MAX_REVISIONS) successful passes.

use chrono::{Duration, NaiveDate};

use crate::workload::{TopicWorkload, MAX_REVISIONS};

/// Fixed slot length for one revision session, clipped to whatever is left
/// of the daily budget.
pub const REVISION_SLOT_HOURS: f64 = 1.5;

/// Observable state of the revision sub-machine for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionPhase {
    NotYetDue,
    Due,
    Graduated,
}

/// First spacing interval from initial difficulty: harder topics come back
/// sooner.
pub fn initial_interval_days(difficulty: f64) -> i64 {
    7 + ((5.0 - difficulty) * 3.0).round() as i64
}

/// Where the topic's revision schedule stands on `today`. `None` while the
/// topic is still in initial study.
pub fn phase(topic: &TopicWorkload, today: NaiveDate) -> Option<RevisionPhase> {
    if !topic.is_study_completed {
        return None;
    }
    if topic.revision_count >= MAX_REVISIONS {
        return Some(RevisionPhase::Graduated);
    }
    match topic.next_revision_date {
        Some(due) if due <= today => Some(RevisionPhase::Due),
        Some(_) => Some(RevisionPhase::NotYetDue),
        // Completed but never seeded; treat as retired rather than due.
        None => Some(RevisionPhase::Graduated),
    }
}

pub fn is_due(topic: &TopicWorkload, today: NaiveDate) -> bool {
    phase(topic, today) == Some(RevisionPhase::Due)
}

/// Seed the schedule when initial study completes.
pub fn schedule_first(topic: &mut TopicWorkload, completion_date: NaiveDate) {
    topic.revision_count = 0;
    topic.next_revision_date =
        Some(completion_date + Duration::days(topic.initial_revision_interval_days));
}

/// Bank a successful revision pass and push the next one out, or graduate.
pub fn record_success(topic: &mut TopicWorkload, event_date: NaiveDate) {
    if topic.revision_count >= MAX_REVISIONS {
        return;
    }
    topic.revision_count += 1;
    if topic.revision_count < MAX_REVISIONS {
        let days = topic.initial_revision_interval_days * i64::from(topic.revision_count + 1);
        topic.next_revision_date = Some(event_date + Duration::days(days));
    } else {
        topic.next_revision_date = None;
    }
}

/// A missed revision costs one banked pass and retries the next day.
pub fn record_miss(topic: &mut TopicWorkload, missed_date: NaiveDate) {
    topic.revision_count = topic.revision_count.saturating_sub(1);
    topic.next_revision_date = Some(missed_date + Duration::days(1));
}
