//! Daily digest job.
//!
//! One invocation takes the current time and a snapshot of every user and
//! chore, and mails each opted-in user their digest. A delivery failure is
//! recorded for that user and the job moves on to the next one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::digest::{Branding, Digest, DEFAULT_SUBJECT};
use super::selector::select_notifications;
use crate::chore::Chore;
use crate::ports::Mailer;
use crate::user::User;

/// What happened for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Digest handed to the mailer
    Sent,
    /// Nothing was sent
    Skipped { reason: String },
    /// Mailer rejected the digest
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOutcome {
    pub user_id: String,
    pub email: String,
    pub due_today: usize,
    pub overdue: usize,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

/// Result of one job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub ran_at: DateTime<Utc>,
    pub outcomes: Vec<UserOutcome>,
}

impl JobReport {
    pub fn sent_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Sent))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Skipped { .. }))
    }

    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&DeliveryStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Builds and sends the daily digests.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    subject: String,
    branding: Branding,
    dry_run: bool,
}

impl NotificationJob {
    pub fn new(branding: Branding) -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            branding,
            dry_run: false,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Compose digests without sending them.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Digest for one user at `now`, built from whichever of the user's
    /// chores are present in `chores`.
    pub fn digest_for(&self, now: DateTime<Utc>, user: &User, chores: &[Chore]) -> Digest {
        let index = index_by_id(chores);
        let owned = owned_chores(user, &index);
        Digest::compose(&select_notifications(now, owned), &self.branding)
    }

    /// Run over the snapshot. Users are processed in the given order.
    pub fn run<M: Mailer>(
        &self,
        now: DateTime<Utc>,
        users: &[User],
        chores: &[Chore],
        mailer: &M,
    ) -> JobReport {
        let index = index_by_id(chores);
        let mut outcomes = Vec::with_capacity(users.len());

        for user in users {
            if !user.receive_notifications {
                tracing::debug!(user_id = %user.id, "notifications disabled, skipping");
                outcomes.push(UserOutcome {
                    user_id: user.id.clone(),
                    email: user.email.clone(),
                    due_today: 0,
                    overdue: 0,
                    status: DeliveryStatus::Skipped {
                        reason: "notifications disabled".to_string(),
                    },
                });
                continue;
            }

            let selection = select_notifications(now, owned_chores(user, &index));
            let digest = Digest::compose(&selection, &self.branding);

            let status = if self.dry_run {
                DeliveryStatus::Skipped {
                    reason: "dry-run mode".to_string(),
                }
            } else {
                match mailer.send(&user.email, &self.subject, &digest) {
                    Ok(()) => DeliveryStatus::Sent,
                    Err(e) => {
                        tracing::warn!(user_id = %user.id, error = %e, "failed to send digest");
                        DeliveryStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            };

            outcomes.push(UserOutcome {
                user_id: user.id.clone(),
                email: user.email.clone(),
                due_today: selection.due_today.len(),
                overdue: selection.overdue.len(),
                status,
            });
        }

        let report = JobReport {
            ran_at: now,
            outcomes,
        };
        tracing::info!(
            sent = report.sent_count(),
            skipped = report.skipped_count(),
            failed = report.failure_count(),
            "digest job finished"
        );
        report
    }
}

fn index_by_id(chores: &[Chore]) -> HashMap<&str, &Chore> {
    chores.iter().map(|c| (c.id.as_str(), c)).collect()
}

/// The user's chores in ownership order; ids missing from the snapshot are skipped.
fn owned_chores<'a>(
    user: &'a User,
    index: &'a HashMap<&'a str, &'a Chore>,
) -> impl Iterator<Item = &'a Chore> + 'a {
    user.chores.iter().filter_map(move |id| index.get(id.as_str()).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chore::ChoreDraft;
    use crate::error::MailError;
    use crate::interval::RecurrenceRule;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingMailer {
        sent: RefCell<Vec<(String, String, Digest)>>,
        reject: Vec<String>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, recipient: &str, subject: &str, digest: &Digest) -> Result<(), MailError> {
            if self.reject.iter().any(|r| r == recipient) {
                return Err(MailError::Transport {
                    recipient: recipient.to_string(),
                    message: "mailbox unavailable".to_string(),
                });
            }
            self.sent
                .borrow_mut()
                .push((recipient.to_string(), subject.to_string(), digest.clone()));
            Ok(())
        }
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn job() -> NotificationJob {
        NotificationJob::new(Branding {
            product_name: "Choreplanner".into(),
            product_link: "http://localhost:3000".into(),
        })
    }

    fn fixture() -> (Vec<User>, Vec<Chore>) {
        let daily = Chore::new(ChoreDraft::new("Feed fish", RecurrenceRule::days(1).unwrap()), day(0)).unwrap();
        let weekly = Chore::new(ChoreDraft::new("Mop", RecurrenceRule::weeks(1).unwrap()), day(0)).unwrap();

        let mut alice = User::new("alice@example.com");
        alice.chores = vec![daily.id.clone(), weekly.id.clone()];
        let mut bob = User::new("bob@example.com");
        bob.chores = vec![weekly.id.clone(), "deleted-chore".into()];
        let mut carol = User::new("carol@example.com");
        carol.receive_notifications = false;
        carol.chores = vec![daily.id.clone()];

        (vec![alice, bob, carol], vec![daily, weekly])
    }

    #[test]
    fn sends_to_opted_in_users_only() {
        let (users, chores) = fixture();
        let mailer = RecordingMailer::default();

        let report = job().run(day(3), &users, &chores, &mailer);

        assert_eq!(report.sent_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(report.ran_at, day(3));

        let sent = mailer.sent.borrow();
        let recipients: Vec<_> = sent.iter().map(|(r, _, _)| r.as_str()).collect();
        assert_eq!(recipients, vec!["alice@example.com", "bob@example.com"]);
        assert!(sent.iter().all(|(_, s, _)| s == DEFAULT_SUBJECT));
    }

    #[test]
    fn counts_reflect_each_users_chores() {
        let (users, chores) = fixture();
        let report = job().run(day(3), &users, &chores, &RecordingMailer::default());

        // Daily chore due day 1: overdue and due today on day 3. Weekly due day 7: neither.
        assert_eq!(report.outcomes[0].due_today, 1);
        assert_eq!(report.outcomes[0].overdue, 1);
        assert_eq!(report.outcomes[1].due_today, 0);
        assert_eq!(report.outcomes[1].overdue, 0);
    }

    #[test]
    fn transport_failure_does_not_abort_the_batch() {
        let (users, chores) = fixture();
        let mailer = RecordingMailer {
            reject: vec!["alice@example.com".into()],
            ..RecordingMailer::default()
        };

        let report = job().run(day(3), &users, &chores, &mailer);

        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.sent_count(), 1);
        assert!(matches!(
            &report.outcomes[0].status,
            DeliveryStatus::Failed { reason } if reason.contains("mailbox unavailable")
        ));
        assert_eq!(mailer.sent.borrow()[0].0, "bob@example.com");
    }

    #[test]
    fn dry_run_sends_nothing() {
        let (users, chores) = fixture();
        let mailer = RecordingMailer::default();

        let report = job().dry_run().run(day(3), &users, &chores, &mailer);

        assert!(mailer.sent.borrow().is_empty());
        assert_eq!(report.skipped_count(), 3);
        assert_eq!(report.outcomes[0].due_today, 1);
    }

    #[test]
    fn custom_subject() {
        let (users, chores) = fixture();
        let mailer = RecordingMailer::default();
        job()
            .with_subject("Chores!")
            .run(day(3), &users[..1], &chores, &mailer);
        assert_eq!(mailer.sent.borrow()[0].1, "Chores!");
    }

    #[test]
    fn digest_for_single_user() {
        let (users, chores) = fixture();
        let digest = job().digest_for(day(3), &users[0], &chores);
        assert_eq!(digest.tables[0].rows[0].task, "Feed fish");
        assert_eq!(digest.tables[1].rows[0].from.as_deref(), Some("2024-04-02"));
    }

    #[test]
    fn report_serializes_status_inline() {
        let (users, chores) = fixture();
        let report = job().dry_run().run(day(3), &users[2..], &chores, &RecordingMailer::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "skipped");
        assert_eq!(json["outcomes"][0]["reason"], "notifications disabled");
    }
}
