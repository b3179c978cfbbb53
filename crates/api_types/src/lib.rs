//! Documents stored in the SI2G Assistant remote collections.
//!
//! Every struct maps 1:1 to a document: field names on the wire are the
//! attribute names below. Identifiers are assigned by the store on first
//! write, so they are `None` on records that were never submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body of a document creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCreated {
    pub id: String,
}

/// Error body returned by the document store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    /// The signed-in user, as stored in the `users` collection.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        pub id: Option<String>,
        pub mail: String,
        pub academy: Option<String>,
        pub firstname: Option<String>,
        pub lastname: Option<String>,
    }

    impl User {
        pub fn display_name(&self) -> String {
            match (self.firstname.as_deref(), self.lastname.as_deref()) {
                (Some(first), Some(last)) => format!("{first} {last}"),
                (Some(name), None) | (None, Some(name)) => name.to_string(),
                (None, None) => self.mail.clone(),
            }
        }
    }
}

pub mod bug_ticket {
    use std::{fmt, str::FromStr};

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum BugTicketCategory {
        Interface,
        Functional,
        Performance,
        Data,
        Other,
    }

    impl BugTicketCategory {
        pub const ALL: [Self; 5] = [
            Self::Interface,
            Self::Functional,
            Self::Performance,
            Self::Data,
            Self::Other,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Interface => "interface",
                Self::Functional => "functional",
                Self::Performance => "performance",
                Self::Data => "data",
                Self::Other => "other",
            }
        }
    }

    impl fmt::Display for BugTicketCategory {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for BugTicketCategory {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
                .ok_or_else(|| format!("unknown bug category: {s}"))
        }
    }

    /// Priority, lowest first so that `Ord` sorts by urgency.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum BugTicketPriority {
        Low,
        Medium,
        High,
        Critical,
    }

    impl BugTicketPriority {
        pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Low => "low",
                Self::Medium => "medium",
                Self::High => "high",
                Self::Critical => "critical",
            }
        }
    }

    impl fmt::Display for BugTicketPriority {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for BugTicketPriority {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
                .ok_or_else(|| format!("unknown bug priority: {s}"))
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BugTicket {
        pub id: Option<String>,
        pub category: Option<BugTicketCategory>,
        pub priority: Option<BugTicketPriority>,
        pub short_description: Option<String>,
        pub description: Option<String>,
        /// Mail of the reporter.
        pub submitted_by: Option<String>,
        pub submitted_at: Option<DateTime<Utc>>,
        pub academy: Option<String>,
        #[serde(default)]
        pub is_resolved: bool,
        pub resolved_at: Option<DateTime<Utc>>,
        pub resolved_comment: Option<String>,
    }
}

pub mod person {
    use std::{fmt, str::FromStr};

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PersonRole {
        Student,
        Trainee,
        Tutor,
        Staff,
    }

    impl PersonRole {
        pub const ALL: [Self; 4] = [Self::Student, Self::Trainee, Self::Tutor, Self::Staff];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Student => "student",
                Self::Trainee => "trainee",
                Self::Tutor => "tutor",
                Self::Staff => "staff",
            }
        }
    }

    impl fmt::Display for PersonRole {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for PersonRole {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
                .ok_or_else(|| format!("unknown role: {s}"))
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Person {
        pub id: Option<String>,
        pub firstname: Option<String>,
        pub lastname: Option<String>,
        pub role: Option<PersonRole>,
        /// Training modules the person has validated, ascending and unique.
        #[serde(default)]
        pub validated_modules: Vec<u32>,
        /// Id of the user who tracks this person.
        pub user_id: Option<String>,
        pub submitted_by: Option<String>,
        pub submitted_at: Option<DateTime<Utc>>,
        pub academy: Option<String>,
    }
}

pub mod suggestion {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Suggestion {
        pub id: Option<String>,
        pub subject: Option<String>,
        pub body: Option<String>,
        pub submitted_by: Option<String>,
        pub submitted_at: Option<DateTime<Utc>>,
        pub academy: Option<String>,
    }
}

pub mod announcement {
    use super::*;

    /// Read-only feed item shown on the greetings screen.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Announcement {
        pub id: Option<String>,
        pub title: Option<String>,
        pub content: Option<String>,
        pub published_at: Option<DateTime<Utc>>,
    }
}

#[cfg(test)]
mod tests {
    use super::{bug_ticket::*, person::*};

    #[test]
    fn bug_ticket_document_uses_upper_case_enums() {
        let json = r#"{
            "id": "t1",
            "category": "PERFORMANCE",
            "priority": "CRITICAL",
            "short_description": "slow",
            "description": "list takes 10s",
            "submitted_by": "a@b.fr",
            "submitted_at": "2024-03-01T10:00:00Z",
            "academy": "Lyon",
            "resolved_at": null,
            "resolved_comment": null
        }"#;
        let ticket: BugTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.category, Some(BugTicketCategory::Performance));
        assert_eq!(ticket.priority, Some(BugTicketPriority::Critical));
        assert!(!ticket.is_resolved);
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("High".parse::<BugTicketPriority>(), Ok(BugTicketPriority::High));
        assert_eq!(" tutor ".parse::<PersonRole>(), Ok(PersonRole::Tutor));
        assert!("urgent".parse::<BugTicketPriority>().is_err());
    }
}
