//! Priority and capacity model: maps a topic's importance, hardness, and
//! observed performance to a dimensionless priority score and the weighted
//! cost consumed from the daily quota.

use crate::workload::TopicWorkload;

/// Difficulty relief after a successful session.
pub const SUCCESS_DIFFICULTY_STEP: f64 = 0.1;

/// Difficulty penalty after a miss. Double the reward: recovering trust in a
/// topic takes twice as long as losing it.
pub const FAILURE_DIFFICULTY_STEP: f64 = 2.0 * SUCCESS_DIFFICULTY_STEP;

/// Priority score for scheduling order.
///
/// Before any outcome is recorded, importance and intrinsic hardness drive
/// the ranking. Once the learner's own results exist, struggling topics are
/// pushed up regardless of nominal difficulty.
pub fn score(topic: &TopicWorkload) -> f64 {
    if topic.attempts == 0 {
        topic.weight * 0.6 + topic.difficulty * 0.4
    } else {
        topic.weight * 0.4 + topic.difficulty * 0.3 + (1.0 - topic.success_rate) * 0.3
    }
}

/// Weighted cost of `hours` spent on this topic. Not wall-clock time: harder
/// and heavier topics inflate so the quota allocates proportionally more
/// calendar time to them even though session lengths are capped uniformly.
pub fn weighted_cost_for(hours: f64, topic: &TopicWorkload) -> f64 {
    hours * (1.0 + topic.difficulty / 5.0) * (topic.weight * 2.0)
}

/// Weighted cost of everything the topic still owes.
pub fn weighted_cost(topic: &TopicWorkload) -> f64 {
    weighted_cost_for(topic.remaining_time, topic)
}

/// Fold one session outcome into the topic's performance metrics and refresh
/// its priority score.
pub fn apply_outcome(topic: &mut TopicWorkload, success: bool) {
    if success {
        topic.difficulty = (topic.difficulty - SUCCESS_DIFFICULTY_STEP).max(1.0);
    } else {
        topic.difficulty = (topic.difficulty + FAILURE_DIFFICULTY_STEP).min(5.0);
    }

    let outcome = if success { 1.0 } else { 0.0 };
    let old_sum = topic.success_rate * f64::from(topic.attempts);
    topic.attempts += 1;
    topic.success_rate = (old_sum + outcome) / f64::from(topic.attempts);

    topic.priority_score = score(topic);
}
