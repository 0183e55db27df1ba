//! Daily digest body.
//!
//! Mail transports receive this model rather than pre-rendered markup, so
//! an HTML mailer and the plain-text outbox can share one composition.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::selector::{DueItem, NotificationSelection};

pub const DEFAULT_SUBJECT: &str = "Your Tasks For Today";

const INTRO_EMPTY: &str = "You have no chores to do today!";
const INTRO_BUSY: &str = "Here are your chores for today!";
const TITLE_TODAY: &str = "Today's Tasks";
const TITLE_OVERDUE: &str = "Overdue Tasks";
const ACTION_START: &str = "To get started, please click here:";
const ACTION_CREATE: &str = "Click here to create new chores";
const OUTRO: &str = "Need help, or have questions? Just reply to this email, we'd love to help.";

/// Product name and link shown in the call to action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub product_name: String,
    pub product_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestRow {
    pub task: String,
    pub location: Option<String>,
    pub duration_minutes: f64,
    /// Date the chore fell due (overdue rows only)
    pub from: Option<String>,
}

impl From<&DueItem> for DigestRow {
    fn from(item: &DueItem) -> Self {
        Self {
            task: item.name.clone(),
            location: item.location.clone(),
            duration_minutes: item.expected_duration_minutes,
            from: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestTable {
    /// Omitted for an empty table
    pub title: Option<String>,
    pub rows: Vec<DigestRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestAction {
    pub instructions: String,
    pub button_text: String,
    pub link: String,
}

/// Body of one user's daily email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub greeting: String,
    pub intro: String,
    /// Today's chores first, then overdue chores
    pub tables: Vec<DigestTable>,
    pub action: DigestAction,
    pub outro: String,
}

impl Digest {
    pub fn compose(selection: &NotificationSelection, branding: &Branding) -> Self {
        let intro = if selection.is_empty() { INTRO_EMPTY } else { INTRO_BUSY };

        let today = DigestTable {
            title: (!selection.due_today.is_empty()).then(|| TITLE_TODAY.to_string()),
            rows: selection.due_today.iter().map(DigestRow::from).collect(),
        };
        let overdue = DigestTable {
            title: (!selection.overdue.is_empty()).then(|| TITLE_OVERDUE.to_string()),
            rows: selection
                .overdue
                .iter()
                .map(|o| DigestRow {
                    from: Some(o.due_since.clone()),
                    ..DigestRow::from(&o.item)
                })
                .collect(),
        };

        let instructions = if selection.due_today.is_empty() {
            ACTION_CREATE
        } else {
            ACTION_START
        };

        Self {
            greeting: "Hello".to_string(),
            intro: intro.to_string(),
            tables: vec![today, overdue],
            action: DigestAction {
                instructions: instructions.to_string(),
                button_text: format!("Open {}", branding.product_name),
                link: branding.product_link.clone(),
            },
            outro: OUTRO.to_string(),
        }
    }

    /// Number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    /// Plain-text rendering, same as the `Display` output.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{},", self.greeting)?;
        writeln!(f)?;
        writeln!(f, "{}", self.intro)?;

        for table in &self.tables {
            let Some(title) = &table.title else { continue };
            writeln!(f)?;
            writeln!(f, "{title}")?;
            for row in &table.rows {
                write!(f, "  - {}", row.task)?;
                if let Some(location) = &row.location {
                    write!(f, " @ {location}")?;
                }
                write!(f, " ({} min)", row.duration_minutes)?;
                if let Some(from) = &row.from {
                    write!(f, ", due since {from}")?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "{} {} <{}>",
            self.action.instructions, self.action.button_text, self.action.link
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.outro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::selector::OverdueItem;
    use chrono::{TimeZone, Utc};

    fn branding() -> Branding {
        Branding {
            product_name: "Choreplanner".into(),
            product_link: "https://chores.example.com".into(),
        }
    }

    fn item(name: &str) -> DueItem {
        DueItem {
            chore_id: format!("id-{name}"),
            name: name.into(),
            location: Some("Kitchen".into()),
            expected_duration_minutes: 15.0,
        }
    }

    #[test]
    fn empty_selection() {
        let digest = Digest::compose(&NotificationSelection::default(), &branding());
        assert_eq!(digest.intro, INTRO_EMPTY);
        assert!(digest.tables.iter().all(|t| t.title.is_none()));
        assert_eq!(digest.action.instructions, ACTION_CREATE);
        assert_eq!(digest.row_count(), 0);
    }

    #[test]
    fn due_today_only() {
        let selection = NotificationSelection {
            due_today: vec![item("Dishes")],
            overdue: vec![],
        };
        let digest = Digest::compose(&selection, &branding());
        assert_eq!(digest.intro, INTRO_BUSY);
        assert_eq!(digest.tables[0].title.as_deref(), Some(TITLE_TODAY));
        assert_eq!(digest.tables[1].title, None);
        assert_eq!(digest.action.instructions, ACTION_START);
        assert_eq!(digest.action.button_text, "Open Choreplanner");
        assert_eq!(digest.action.link, "https://chores.example.com");
    }

    #[test]
    fn overdue_rows_carry_due_date() {
        let selection = NotificationSelection {
            due_today: vec![],
            overdue: vec![OverdueItem {
                item: item("Mop"),
                due_since: "2024-02-03".into(),
                next_due_at: Utc.with_ymd_and_hms(2024, 2, 3, 10, 0, 0).unwrap(),
            }],
        };
        let digest = Digest::compose(&selection, &branding());
        assert_eq!(digest.intro, INTRO_BUSY);
        assert_eq!(digest.tables[1].title.as_deref(), Some(TITLE_OVERDUE));
        assert_eq!(digest.tables[1].rows[0].from.as_deref(), Some("2024-02-03"));
        assert_eq!(digest.action.instructions, ACTION_CREATE);

        let text = digest.render_text();
        assert!(text.contains("Overdue Tasks"));
        assert!(text.contains("  - Mop @ Kitchen (15 min), due since 2024-02-03"));
        assert!(!text.contains("Today's Tasks"));
    }

    #[test]
    fn display_renders_full_empty_digest() {
        let digest = Digest::compose(&NotificationSelection::default(), &branding());
        let expected = format!(
            "Hello,\n\n{INTRO_EMPTY}\n\n{ACTION_CREATE} Open Choreplanner <https://chores.example.com>\n\n{OUTRO}\n"
        );
        assert_eq!(format!("{digest}"), expected);
        assert_eq!(digest.render_text(), expected);
    }
}
