use std::path::Path;

use chrono::NaiveDate;

use crate::config::catalogue::Catalogue;
use crate::error::SchedError;
use crate::workload::ScheduleState;

/// Load the workload registry from disk.
///
/// A missing file starts a fresh curriculum; an unreadable one is reported,
/// abandoned, and reinitialized from the catalogue (data loss is accepted
/// over refusing to plan).
pub async fn load_state(path: &Path, catalogue: &Catalogue, today: NaiveDate) -> ScheduleState {
    match tokio::fs::read_to_string(path).await {
        Ok(data) => match serde_json::from_str::<ScheduleState>(&data) {
            Ok(mut state) => {
                let added = state.sync_catalogue(catalogue);
                if added > 0 {
                    tracing::info!(added, "Seeded new catalogue topics into registry");
                }
                state
            }
            Err(e) => {
                let err = SchedError::CorruptState(e.to_string());
                tracing::warn!(
                    path = ?path,
                    error = %err,
                    "Reinitializing registry from catalogue"
                );
                ScheduleState::seeded(catalogue, today)
            }
        },
        Err(e) => {
            tracing::debug!(
                path = ?path,
                error = %e,
                "No registry on disk, starting fresh"
            );
            ScheduleState::seeded(catalogue, today)
        }
    }
}

/// Persist the registry. The JSON document is staged next to the target and
/// renamed into place so readers never observe a half-written state file.
pub async fn save_state(path: &Path, state: &ScheduleState) -> Result<(), SchedError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(state)?;

    let mut tmp = path.to_path_buf();
    tmp.set_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    Ok(())
}
