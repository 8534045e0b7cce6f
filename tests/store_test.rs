use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use studypath::config::catalogue::Catalogue;
use studypath::config::PlannerConfig;
use studypath::error::SchedError;
use studypath::plan::store::DayPlanStore;
use studypath::plan::{Session, SessionKind, SessionStatus};
use studypath::workload::{store as registry_store, ScheduleState, TIME_BUFFER_FACTOR};

fn temp_root(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("studypath-{tag}-{}-{nanos}", std::process::id()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_day_plan_round_trip() {
    let store = DayPlanStore::new(temp_root("plan-rt"));
    let day = date(2026, 1, 5);

    let sessions = vec![
        Session {
            subject: "Physics".to_string(),
            label: "Kinematics".to_string(),
            duration_hours: 1.0,
            topic_id: Some("Physics.Kinematics".to_string()),
            kind: SessionKind::Study,
            status: SessionStatus::Pending,
        },
        Session::buffer(0.5),
    ];

    assert!(!store.exists(day).await);
    store.write(day, &sessions).await.expect("write should succeed");
    assert!(store.exists(day).await);

    let read_back = store.read(day).await.expect("read should succeed");
    assert_eq!(read_back.len(), 2);
    assert_eq!(read_back[0].topic_id.as_deref(), Some("Physics.Kinematics"));
    assert_eq!(read_back[0].kind, SessionKind::Study);
    assert_eq!(read_back[1].kind, SessionKind::Buffer);
    assert_eq!(read_back[1].topic_id, None);
}

#[tokio::test]
async fn test_missing_day_plan_is_reported_as_such() {
    let store = DayPlanStore::new(temp_root("plan-missing"));
    let err = store
        .read(date(2026, 1, 5))
        .await
        .expect_err("absent plan must not read as empty");
    assert!(matches!(err, SchedError::MissingPlan(d) if d == date(2026, 1, 5)));
}

#[tokio::test]
async fn test_day_plan_write_is_whole_day_replace() {
    let store = DayPlanStore::new(temp_root("plan-replace"));
    let day = date(2026, 1, 5);

    store.write(day, &[Session::buffer(0.5)]).await.unwrap();
    store.write(day, &[Session::rest("Recovery", 6.0)]).await.unwrap();

    let read_back = store.read(day).await.unwrap();
    assert_eq!(read_back.len(), 1, "second write replaced the first");
    assert_eq!(read_back[0].kind, SessionKind::Rest);
}

#[tokio::test]
async fn test_registry_round_trip() {
    let root = temp_root("state-rt");
    let path = root.join("schedule_state.json");
    let catalogue = Catalogue::builtin();
    let today = date(2026, 1, 5);

    let mut state = ScheduleState::seeded(&catalogue, today);
    state
        .workload
        .get_mut("Physics.Kinematics")
        .unwrap()
        .remaining_time = 3.25;

    registry_store::save_state(&path, &state).await.expect("save");
    let loaded = registry_store::load_state(&path, &catalogue, today).await;

    assert_eq!(loaded.cursor_date, today);
    assert_eq!(loaded.workload.len(), catalogue.topics.len());
    assert!((loaded.workload["Physics.Kinematics"].remaining_time - 3.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_missing_registry_seeds_from_catalogue() {
    let root = temp_root("state-fresh");
    let catalogue = Catalogue::builtin();
    let today = date(2026, 1, 5);

    let state = registry_store::load_state(&root.join("nope.json"), &catalogue, today).await;
    assert_eq!(state.workload.len(), catalogue.topics.len());
    assert_eq!(state.cursor_date, today);

    let kin = &state.workload["Physics.Kinematics"];
    assert!(
        (kin.remaining_time - 18.0 * TIME_BUFFER_FACTOR).abs() < 1e-9,
        "estimates are inflated by the planning buffer factor"
    );
    assert!(!kin.is_study_completed);
}

#[tokio::test]
async fn test_corrupt_registry_reinitializes_from_catalogue() {
    let root = temp_root("state-corrupt");
    let path = root.join("schedule_state.json");
    let catalogue = Catalogue::builtin();
    let today = date(2026, 1, 5);

    tokio::fs::create_dir_all(&root).await.unwrap();
    tokio::fs::write(&path, "this is not json{{{").await.unwrap();

    let state = registry_store::load_state(&path, &catalogue, today).await;
    assert_eq!(
        state.workload.len(),
        catalogue.topics.len(),
        "corrupt state is abandoned for a fresh catalogue seed"
    );
    assert_eq!(state.cursor_date, today);
}

#[tokio::test]
async fn test_registry_picks_up_new_catalogue_topics() {
    let root = temp_root("state-sync");
    let path = root.join("schedule_state.json");
    let today = date(2026, 1, 5);

    let mut small = Catalogue::builtin();
    let extra = small.topics.pop().unwrap();

    let state = registry_store::load_state(&path, &small, today).await;
    registry_store::save_state(&path, &state).await.unwrap();

    let mut grown = small.clone();
    grown.topics.push(extra.clone());
    let reloaded = registry_store::load_state(&path, &grown, today).await;

    assert_eq!(reloaded.workload.len(), grown.topics.len());
    assert!(
        reloaded.workload.contains_key(&extra.id()),
        "topics added to the catalogue are seeded on load"
    );
}

#[test]
fn test_config_validation_rejects_degenerate_setups() {
    let mut config = PlannerConfig::with_deadline(date(2026, 1, 5));
    assert!(config.validate().is_ok());

    config.daily_study_hours = 0.0;
    assert!(matches!(
        config.validate(),
        Err(SchedError::InvalidConfiguration(_))
    ));

    config.daily_study_hours = 2.0;
    config.daily_buffer_minutes = 120;
    assert!(
        matches!(config.validate(), Err(SchedError::InvalidConfiguration(_))),
        "buffer eating the whole day leaves no budget"
    );

    config.daily_buffer_minutes = 30;
    config.max_session_hours = 0.0;
    assert!(matches!(
        config.validate(),
        Err(SchedError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_config_load_falls_back_on_garbage() {
    let root = temp_root("config");
    std::fs::create_dir_all(&root).unwrap();
    let path = root.join("planner.toml");
    std::fs::write(&path, "deadline = \"not a date\"").unwrap();

    let fallback = PlannerConfig::with_deadline(date(2026, 6, 30));
    let loaded = PlannerConfig::load_or(&path, fallback.clone());
    assert_eq!(loaded.deadline, fallback.deadline);
    assert_eq!(loaded.daily_study_hours, fallback.daily_study_hours);
}

#[test]
fn test_config_parses_from_toml() {
    let root = temp_root("config-ok");
    std::fs::create_dir_all(&root).unwrap();
    let path = root.join("planner.toml");
    std::fs::write(
        &path,
        r#"
deadline = "2026-06-30"
exam_date = "2026-07-28"
daily_study_hours = 5.0
weekly_rest_day = "Sat"
"#,
    )
    .unwrap();

    let fallback = PlannerConfig::with_deadline(date(2026, 1, 1));
    let loaded = PlannerConfig::load_or(&path, fallback);
    assert_eq!(loaded.deadline, date(2026, 6, 30));
    assert_eq!(loaded.exam_date, Some(date(2026, 7, 28)));
    assert_eq!(loaded.daily_study_hours, 5.0);
    assert_eq!(loaded.weekly_rest_day, Weekday::Sat);
    assert_eq!(loaded.daily_buffer_minutes, 30, "unset fields take defaults");
}

#[test]
fn test_catalogue_parses_from_toml() {
    let catalogue = Catalogue::from_toml(
        r#"
[[topics]]
subject = "Physics"
label = "Kinematics"
time_est_hours = 18.0
weight = 0.08
difficulty = 3.0
"#,
    )
    .expect("parse should succeed");

    assert_eq!(catalogue.topics.len(), 1);
    assert_eq!(catalogue.topics[0].id(), "Physics.Kinematics");
}
