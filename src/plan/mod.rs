pub mod store;

use serde::{Deserialize, Serialize};

use crate::workload::TopicWorkload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    Study,
    Revision,
    Rest,
    Buffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Pending,
    Completed,
    Missed,
}

/// One scheduled block within a day plan. Ephemeral: produced fresh by the
/// generator and mutated in place as the day is lived through; never the
/// source of truth for topic progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub subject: String,
    pub label: String,
    pub duration_hours: f64,
    /// Absent for Rest and Buffer blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub kind: SessionKind,
    pub status: SessionStatus,
}

impl Session {
    pub fn study(topic: &TopicWorkload, duration_hours: f64) -> Session {
        Session {
            subject: topic.subject.clone(),
            label: topic.label.clone(),
            duration_hours,
            topic_id: Some(topic.id.clone()),
            kind: SessionKind::Study,
            status: SessionStatus::Pending,
        }
    }

    pub fn revision(topic: &TopicWorkload, duration_hours: f64) -> Session {
        Session {
            subject: topic.subject.clone(),
            label: format!("{} (revision #{})", topic.label, topic.revision_count + 1),
            duration_hours,
            topic_id: Some(topic.id.clone()),
            kind: SessionKind::Revision,
            status: SessionStatus::Pending,
        }
    }

    pub fn rest(activity: &str, duration_hours: f64) -> Session {
        Session {
            subject: "Rest".to_string(),
            label: activity.to_string(),
            duration_hours,
            topic_id: None,
            kind: SessionKind::Rest,
            status: SessionStatus::Pending,
        }
    }

    pub fn buffer(duration_hours: f64) -> Session {
        Session {
            subject: "Buffer".to_string(),
            label: "Recovery/Review".to_string(),
            duration_hours,
            topic_id: None,
            kind: SessionKind::Buffer,
            status: SessionStatus::Pending,
        }
    }

    /// Study and Revision blocks are the ones a learner can complete or miss.
    pub fn is_workable(&self) -> bool {
        matches!(self.kind, SessionKind::Study | SessionKind::Revision)
    }
}
