use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config;
use crate::error::SchedError;
use crate::plan::Session;

/// Durable per-day session storage: one pretty-printed JSON document per
/// calendar date, whole-day replace on write.
#[derive(Debug, Clone)]
pub struct DayPlanStore {
    root: PathBuf,
}

impl DayPlanStore {
    pub fn new(root: impl Into<PathBuf>) -> DayPlanStore {
        DayPlanStore { root: root.into() }
    }

    pub fn default_root() -> PathBuf {
        config::app_data_dir().join("plans")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{date}.json"))
    }

    /// All sessions planned for `date`, in plan order.
    pub async fn read(&self, date: NaiveDate) -> Result<Vec<Session>, SchedError> {
        let path = self.path_for(date);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SchedError::MissingPlan(date))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the whole day.
    pub async fn write(&self, date: NaiveDate, sessions: &[Session]) -> Result<(), SchedError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(sessions)?;
        tokio::fs::write(self.path_for(date), json).await?;
        Ok(())
    }

    pub async fn exists(&self, date: NaiveDate) -> bool {
        tokio::fs::try_exists(self.path_for(date)).await.unwrap_or(false)
    }
}
