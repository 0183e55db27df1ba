//! Integration tests for the daily digest job.
//!
//! Chores and users are stored in SQLite, the job runs over the stored
//! snapshot, and digests land in an outbox directory.

use chrono::{DateTime, Duration, TimeZone, Utc};
use choreplanner_core::mailer::OutboxMessage;
use choreplanner_core::notify::DeliveryStatus;
use choreplanner_core::{
    Branding, ChoreDb, ChoreDraft, ChoreService, NotificationJob, OutboxMailer, RecurrenceRule,
};
use std::path::Path;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn job() -> NotificationJob {
    NotificationJob::new(Branding {
        product_name: "Choreplanner".into(),
        product_link: "https://chores.example.com".into(),
    })
}

fn outbox_messages(dir: &Path) -> Vec<OutboxMessage> {
    if !dir.exists() {
        return Vec::new();
    }
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| serde_json::from_slice(&std::fs::read(entry.unwrap().path()).unwrap()).unwrap())
        .collect()
}

#[test]
fn test_daily_chore_digest_at_day_three() {
    let dir = tempfile::tempdir().unwrap();
    let service = ChoreService::new(ChoreDb::open_at(&dir.path().join("chores.db")).unwrap());
    let user = service.add_user("jo@example.com", true).unwrap();
    service
        .create_chore(
            &user.id,
            ChoreDraft::new("Feed cat", RecurrenceRule::days(1).unwrap())
                .with_location("Kitchen")
                .with_duration_secs(120),
            day(0),
        )
        .unwrap();

    let outbox = dir.path().join("outbox");
    let mailer = OutboxMailer::new(&outbox, "noreply@example.com");
    let report = service.run_notifications(&job(), day(3), &mailer).unwrap();

    assert_eq!(report.sent_count(), 1);
    let messages = outbox_messages(&outbox);
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.recipient, "jo@example.com");
    assert_eq!(message.subject, "Your Tasks For Today");

    let digest = &message.digest;
    assert_eq!(digest.intro, "Here are your chores for today!");
    assert_eq!(digest.tables[0].title.as_deref(), Some("Today's Tasks"));
    assert_eq!(digest.tables[0].rows[0].task, "Feed cat");
    assert_eq!(digest.tables[0].rows[0].duration_minutes, 2.0);
    assert_eq!(digest.tables[1].title.as_deref(), Some("Overdue Tasks"));
    assert_eq!(digest.tables[1].rows[0].from.as_deref(), Some("2024-01-02"));
    assert_eq!(digest.action.button_text, "Open Choreplanner");
    assert!(message.text.contains("Feed cat @ Kitchen (2 min)"));
}

#[test]
fn test_weekly_chore_is_due_one_interval_past_due_date() {
    let dir = tempfile::tempdir().unwrap();
    let service = ChoreService::new(ChoreDb::open_at(&dir.path().join("chores.db")).unwrap());
    let user = service.add_user("jo@example.com", true).unwrap();
    service
        .create_chore(
            &user.id,
            ChoreDraft::new("Change sheets", RecurrenceRule::weeks(1).unwrap()),
            day(0),
        )
        .unwrap();

    let on_day_ten = service.preview(&user.id, day(10)).unwrap();
    assert!(on_day_ten.due_today.is_empty());
    assert_eq!(on_day_ten.overdue.len(), 1);

    let on_day_fourteen = service.preview(&user.id, day(14) + Duration::hours(9)).unwrap();
    assert_eq!(on_day_fourteen.due_today.len(), 1);
    assert_eq!(on_day_fourteen.overdue.len(), 1);
}

#[test]
fn test_opted_out_and_empty_users() {
    let dir = tempfile::tempdir().unwrap();
    let service = ChoreService::new(ChoreDb::open_at(&dir.path().join("chores.db")).unwrap());
    let quiet = service.add_user("quiet@example.com", false).unwrap();
    service.add_user("idle@example.com", true).unwrap();
    service
        .create_chore(
            &quiet.id,
            ChoreDraft::new("Feed cat", RecurrenceRule::days(1).unwrap()),
            day(0),
        )
        .unwrap();

    let outbox = dir.path().join("outbox");
    let mailer = OutboxMailer::new(&outbox, "noreply@example.com");
    let report = service.run_notifications(&job(), day(1), &mailer).unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(report.outcomes[0].status, DeliveryStatus::Skipped { .. }));
    assert_eq!(report.outcomes[1].status, DeliveryStatus::Sent);

    let messages = outbox_messages(&outbox);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipient, "idle@example.com");
    assert_eq!(messages[0].digest.intro, "You have no chores to do today!");
    assert_eq!(messages[0].digest.action.instructions, "Click here to create new chores");
    assert!(messages[0].digest.tables.iter().all(|t| t.title.is_none()));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let service = ChoreService::new(ChoreDb::open_at(&dir.path().join("chores.db")).unwrap());
    let user = service.add_user("jo@example.com", true).unwrap();
    service
        .create_chore(
            &user.id,
            ChoreDraft::new("Feed cat", RecurrenceRule::days(1).unwrap()),
            day(0),
        )
        .unwrap();

    let outbox = dir.path().join("outbox");
    let mailer = OutboxMailer::new(&outbox, "noreply@example.com");
    let report = service
        .run_notifications(&job().dry_run(), day(1), &mailer)
        .unwrap();

    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.outcomes[0].due_today, 1);
    assert!(outbox_messages(&outbox).is_empty());
}
