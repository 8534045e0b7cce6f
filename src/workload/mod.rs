pub mod store;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::catalogue::{Catalogue, TopicSpec};
use crate::revision;

/// Revision passes a topic gets before it graduates out of the rotation.
pub const MAX_REVISIONS: u32 = 3;

/// Hours below which remaining work is treated as finished.
pub const EPSILON_HOURS: f64 = 0.001;

/// Inflation applied to raw catalogue estimates when a topic is first seeded,
/// absorbing the usual underestimation of study time.
pub const TIME_BUFFER_FACTOR: f64 = 1.45;

fn default_success_rate() -> f64 {
    0.5
}

/// Per-topic scheduling state. One record per syllabus topic, keyed by the
/// stable topic id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicWorkload {
    pub id: String,
    pub subject: String,
    pub label: String,
    /// Relative exam importance in (0, 1]. Immutable.
    pub weight: f64,
    /// Current hardness in [1.0, 5.0]; nudged by outcomes.
    pub difficulty: f64,
    /// Study hours still owed. Clamped to 0 once it drops under epsilon.
    pub remaining_time: f64,
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    #[serde(default)]
    pub attempts: u32,
    pub is_study_completed: bool,
    pub revision_count: u32,
    /// Present only while study is complete and revisions remain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_revision_date: Option<NaiveDate>,
    /// Base unit of the spacing sequence, fixed at topic creation.
    pub initial_revision_interval_days: i64,
    /// Derived caches, recomputed on every planning pass.
    #[serde(default)]
    pub priority_score: f64,
    #[serde(default)]
    pub weighted_cost: f64,
}

impl TopicWorkload {
    pub fn from_spec(spec: &TopicSpec) -> Self {
        let difficulty = spec.difficulty.clamp(1.0, 5.0);
        TopicWorkload {
            id: spec.id(),
            subject: spec.subject.clone(),
            label: spec.label.clone(),
            weight: spec.weight,
            difficulty,
            remaining_time: spec.time_est_hours * TIME_BUFFER_FACTOR,
            success_rate: default_success_rate(),
            attempts: 0,
            is_study_completed: false,
            revision_count: 0,
            next_revision_date: None,
            initial_revision_interval_days: revision::initial_interval_days(difficulty),
            priority_score: 0.0,
            weighted_cost: 0.0,
        }
    }

    /// Still in the initial study pool.
    pub fn is_active(&self) -> bool {
        !self.is_study_completed && self.remaining_time > EPSILON_HOURS
    }

    /// Study complete with revision passes still owed.
    pub fn is_revision_eligible(&self) -> bool {
        self.is_study_completed
            && self.revision_count < MAX_REVISIONS
            && self.next_revision_date.is_some()
    }
}

/// The persisted workload registry: the single source of truth for topic
/// progress. Day plans are derived from it, never the other way around
/// (outcome events excepted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Ordered by topic id so every scan and priority tie-break is
    /// deterministic.
    pub workload: BTreeMap<String, TopicWorkload>,
    /// First date no plan has been emitted for.
    pub cursor_date: NaiveDate,
    #[serde(default)]
    pub total_weighted_cost: f64,
    #[serde(default)]
    pub total_remaining_time: f64,
    #[serde(default)]
    pub net_study_days: i64,
    #[serde(default)]
    pub daily_quota: f64,
}

impl ScheduleState {
    /// Fresh state with every catalogue topic seeded.
    pub fn seeded(catalogue: &Catalogue, cursor_date: NaiveDate) -> Self {
        let mut state = ScheduleState {
            workload: BTreeMap::new(),
            cursor_date,
            total_weighted_cost: 0.0,
            total_remaining_time: 0.0,
            net_study_days: 0,
            daily_quota: 0.0,
        };
        state.sync_catalogue(catalogue);
        state
    }

    /// Seed any catalogue topic the registry does not know yet. Existing
    /// records keep their progress untouched. Returns how many were added.
    pub fn sync_catalogue(&mut self, catalogue: &Catalogue) -> usize {
        let mut added = 0;
        for spec in &catalogue.topics {
            let id = spec.id();
            if !self.workload.contains_key(&id) {
                self.workload.insert(id, TopicWorkload::from_spec(spec));
                added += 1;
            }
        }
        added
    }
}
