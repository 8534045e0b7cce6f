//! Daily capacity calculation: total outstanding weighted cost spread over
//! the study days left before the deadline.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::priority;
use crate::workload::ScheduleState;

/// Aggregate quota figures from one recompute pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaSummary {
    pub total_weighted_cost: f64,
    pub total_remaining_time: f64,
    pub net_study_days: i64,
    pub daily_quota: f64,
}

/// Calendar days in `[from, until]` that are not the weekly rest day.
pub fn net_study_days(from: NaiveDate, until: NaiveDate, rest_day: Weekday) -> i64 {
    let mut days = 0;
    let mut date = from;
    while date <= until {
        if date.weekday() != rest_day {
            days += 1;
        }
        date += Duration::days(1);
    }
    days
}

/// Refresh every topic's derived scores and the state's aggregate quota
/// figures. Idempotent: with no intervening mutation, a second call yields
/// identical numbers.
pub fn recompute(state: &mut ScheduleState, config: &PlannerConfig) -> QuotaSummary {
    let mut total_weighted_cost = 0.0;
    let mut total_remaining_time = 0.0;

    for topic in state.workload.values_mut() {
        topic.priority_score = priority::score(topic);
        if topic.is_active() {
            topic.weighted_cost = priority::weighted_cost(topic);
            total_weighted_cost += topic.weighted_cost;
            total_remaining_time += topic.remaining_time;
        } else {
            topic.weighted_cost = 0.0;
        }
    }

    let days = net_study_days(state.cursor_date, config.deadline, config.weekly_rest_day);
    // No study days left: dump the whole load on whatever remains rather
    // than divide by zero.
    let daily_quota = if days > 0 {
        total_weighted_cost / days as f64
    } else {
        total_weighted_cost
    };

    state.total_weighted_cost = total_weighted_cost;
    state.total_remaining_time = total_remaining_time;
    state.net_study_days = days;
    state.daily_quota = daily_quota;

    QuotaSummary {
        total_weighted_cost,
        total_remaining_time,
        net_study_days: days,
        daily_quota,
    }
}
