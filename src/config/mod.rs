pub mod catalogue;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::SchedError;

/// Global scheduling parameters supplied by the host per planning run.
///
/// There is deliberately no process-wide cached instance: the config travels
/// inside a [`crate::engine::SchedulerContext`] so tests can inject their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Last date the syllabus walk may plan, inclusive.
    pub deadline: NaiveDate,
    /// Exam date, kept for reporting; the planner only targets `deadline`.
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default = "default_daily_study_hours")]
    pub daily_study_hours: f64,
    #[serde(default = "default_max_session_hours")]
    pub max_session_hours: f64,
    #[serde(default = "default_weekly_rest_day")]
    pub weekly_rest_day: Weekday,
    #[serde(default = "default_daily_buffer_minutes")]
    pub daily_buffer_minutes: u32,
    #[serde(default = "default_rest_day_activity")]
    pub rest_day_activity: String,
}

fn default_daily_study_hours() -> f64 {
    6.0
}

fn default_max_session_hours() -> f64 {
    1.0
}

fn default_weekly_rest_day() -> Weekday {
    Weekday::Sun
}

fn default_daily_buffer_minutes() -> u32 {
    30
}

fn default_rest_day_activity() -> String {
    "Recovery".to_string()
}

impl PlannerConfig {
    /// Defaults for everything except the deadline, which has no sensible
    /// universal value.
    pub fn with_deadline(deadline: NaiveDate) -> Self {
        PlannerConfig {
            deadline,
            exam_date: None,
            daily_study_hours: default_daily_study_hours(),
            max_session_hours: default_max_session_hours(),
            weekly_rest_day: default_weekly_rest_day(),
            daily_buffer_minutes: default_daily_buffer_minutes(),
            rest_day_activity: default_rest_day_activity(),
        }
    }

    /// Load from a TOML file, falling back to `fallback` when the file is
    /// missing or unparseable.
    pub fn load_or(path: &Path, fallback: PlannerConfig) -> PlannerConfig {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<PlannerConfig>(&content) {
                Ok(config) => {
                    tracing::debug!(path = ?path, "Loaded planner config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Failed to parse planner config, using fallback");
                    fallback
                }
            },
            Err(e) => {
                tracing::debug!(path = ?path, error = %e, "No planner config file, using fallback");
                fallback
            }
        }
    }

    /// Net hours available for revision and study on a non-rest day.
    pub fn daily_budget_hours(&self) -> f64 {
        self.daily_study_hours - f64::from(self.daily_buffer_minutes) / 60.0
    }

    /// Reject configurations that would make a planning pass divide by zero
    /// or walk forever. Reported, never silently clamped.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.daily_study_hours <= 0.0 {
            return Err(SchedError::InvalidConfiguration(format!(
                "daily_study_hours must be positive, got {}",
                self.daily_study_hours
            )));
        }
        if self.max_session_hours <= 0.0 {
            return Err(SchedError::InvalidConfiguration(format!(
                "max_session_hours must be positive, got {}",
                self.max_session_hours
            )));
        }
        if self.daily_budget_hours() <= 0.0 {
            return Err(SchedError::InvalidConfiguration(format!(
                "daily buffer ({} min) consumes the whole daily budget of {} h",
                self.daily_buffer_minutes, self.daily_study_hours
            )));
        }
        Ok(())
    }
}

/// Platform-specific application data directory for default store locations.
pub fn app_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/studypath");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("studypath");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/studypath");
            return dir;
        }
    }

    // Fallback
    PathBuf::from("studypath-data")
}
