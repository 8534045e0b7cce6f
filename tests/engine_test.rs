use std::path::PathBuf;

use chrono::NaiveDate;
use studypath::config::catalogue::{Catalogue, TopicSpec};
use studypath::config::PlannerConfig;
use studypath::error::SchedError;
use studypath::plan::{Session, SessionKind, SessionStatus};
use studypath::{Scheduler, SchedulerContext};

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

fn one_topic_catalogue() -> Catalogue {
    Catalogue {
        topics: vec![TopicSpec {
            subject: "Physics".to_string(),
            label: "Kinematics".to_string(),
            time_est_hours: 1.0,
            weight: 0.5,
            difficulty: 3.0,
        }],
    }
}

fn session(kind: SessionKind, hours: f64) -> Session {
    Session {
        subject: "Physics".to_string(),
        label: "Kinematics".to_string(),
        duration_hours: hours,
        topic_id: Some("Physics.Kinematics".to_string()),
        kind,
        status: SessionStatus::Pending,
    }
}

#[tokio::test]
async fn test_completed_study_deducts_planned_time_and_seeds_revision() {
    let config = PlannerConfig::with_deadline(date(2026, 3, 1));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("complete"));
    let scheduler = Scheduler::new(ctx);

    // Seeded remaining time is 1.0 * 1.45; one session of that length
    // finishes the topic. Difficulty 3.0 fixes a 13-day first interval.
    scheduler
        .on_completed(&session(SessionKind::Study, 1.45), date(2026, 1, 5), 1.6)
        .await
        .expect("completion should succeed");

    let state = scheduler.snapshot().expect("snapshot after completion");
    let t = &state.workload["Physics.Kinematics"];
    assert_eq!(t.remaining_time, 0.0);
    assert!(t.is_study_completed);
    assert_eq!(t.revision_count, 0);
    assert_eq!(t.next_revision_date, Some(date(2026, 1, 18)));
    assert!((t.difficulty - 2.9).abs() < 1e-9, "success eases difficulty");
    assert_eq!(t.attempts, 1);
}

#[tokio::test]
async fn test_completed_revision_advances_the_spacing_machine() {
    let config = PlannerConfig::with_deadline(date(2026, 3, 1));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("rev-complete"));
    let scheduler = Scheduler::new(ctx);

    scheduler
        .on_completed(&session(SessionKind::Study, 1.45), date(2026, 1, 5), 1.45)
        .await
        .expect("study completion");
    scheduler
        .on_completed(&session(SessionKind::Revision, 1.5), date(2026, 1, 18), 1.5)
        .await
        .expect("revision completion");

    let state = scheduler.snapshot().unwrap();
    let t = &state.workload["Physics.Kinematics"];
    assert_eq!(t.revision_count, 1);
    assert_eq!(
        t.next_revision_date,
        Some(date(2026, 2, 13)),
        "next pass lands 13*2 days after the event"
    );
}

#[tokio::test]
async fn test_partial_study_leaves_topic_active() {
    let config = PlannerConfig::with_deadline(date(2026, 3, 1));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("partial"));
    let scheduler = Scheduler::new(ctx);

    scheduler
        .on_completed(&session(SessionKind::Study, 1.0), date(2026, 1, 5), 0.9)
        .await
        .expect("completion should succeed");

    let state = scheduler.snapshot().unwrap();
    let t = &state.workload["Physics.Kinematics"];
    assert!((t.remaining_time - 0.45).abs() < 1e-9, "planned hours deducted");
    assert!(!t.is_study_completed);
    assert_eq!(t.next_revision_date, None);
}

#[tokio::test]
async fn test_completion_for_unknown_topic_errors() {
    let config = PlannerConfig::with_deadline(date(2026, 3, 1));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("unknown"));
    let scheduler = Scheduler::new(ctx);

    let mut ghost = session(SessionKind::Study, 1.0);
    ghost.topic_id = Some("Ghost.Topic".to_string());

    let err = scheduler
        .on_completed(&ghost, date(2026, 1, 5), 1.0)
        .await
        .expect_err("unknown topic must be reported");
    assert!(matches!(err, SchedError::TopicNotFound(_)));
}

#[tokio::test]
async fn test_completion_marks_the_stored_session() {
    let start = date(2026, 1, 5);
    let config = PlannerConfig::with_deadline(date(2026, 1, 9));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("mark"));
    let scheduler = Scheduler::new(ctx);

    scheduler.generate_from(start).await.expect("generation");
    let planned = scheduler.plans().read(start).await.unwrap();
    let study = planned
        .iter()
        .find(|s| s.kind == SessionKind::Study)
        .expect("day one should hold a study block")
        .clone();

    scheduler
        .on_completed(&study, start, study.duration_hours)
        .await
        .expect("completion");

    let stored = scheduler.plans().read(start).await.unwrap();
    let marked = stored
        .iter()
        .find(|s| s.topic_id == study.topic_id && s.kind == SessionKind::Study)
        .unwrap();
    assert_eq!(marked.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_on_missed_runs_a_single_session_rebalance() {
    let start = date(2026, 1, 5);
    let config = PlannerConfig::with_deadline(date(2026, 1, 16));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("miss-one"));
    let scheduler = Scheduler::new(ctx);

    scheduler.generate_from(start).await.expect("generation");
    let outcome = scheduler
        .on_missed(&session(SessionKind::Study, 1.0), start)
        .await
        .expect("miss handling");

    assert_eq!(outcome.adjusted_topics, 1);
    assert_eq!(outcome.replan_from, Some(date(2026, 1, 6)));

    let state = scheduler.snapshot().unwrap();
    let t = &state.workload["Physics.Kinematics"];
    assert!((t.remaining_time - 2.45).abs() < 1e-9, "1.45 seeded + 1.0 restored");
    assert!((t.difficulty - 3.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_recompute_quota_is_idempotent_through_the_facade() {
    let config = PlannerConfig::with_deadline(date(2026, 1, 16));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("requota"));
    let scheduler = Scheduler::new(ctx);

    let first = scheduler.recompute_quota(date(2026, 1, 5)).await.unwrap();
    let second = scheduler.recompute_quota(date(2026, 1, 5)).await.unwrap();

    assert_eq!(first.daily_quota, second.daily_quota);
    assert_eq!(first.total_weighted_cost, second.total_weighted_cost);
    assert_eq!(first.net_study_days, second.net_study_days);
}

#[tokio::test]
async fn test_progress_report_classifies_topics() {
    let start = date(2026, 1, 5);
    let config = PlannerConfig::with_deadline(date(2026, 1, 16));
    let ctx = SchedulerContext::rooted_at(config, one_topic_catalogue(), temp_root("report"));
    let scheduler = Scheduler::new(ctx);

    let before = scheduler.progress_report(start).await.unwrap();
    assert_eq!(before.pending_study.len(), 1);
    assert_eq!(before.total_topics, 1);
    assert_eq!(before.completed_topics, 0);
    assert_eq!(before.completion_percent, 0.0);

    scheduler
        .on_completed(&session(SessionKind::Study, 1.45), start, 1.45)
        .await
        .expect("completion");

    let after = scheduler.progress_report(date(2026, 1, 18)).await.unwrap();
    assert!(after.pending_study.is_empty());
    assert_eq!(after.due_revisions.len(), 1, "first revision is due on day 13");
    assert_eq!(after.due_revisions[0].id, "Physics.Kinematics");
}
