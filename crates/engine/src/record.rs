//! Records are the persisted documents the holders list, select and write.

use std::fmt;

use api_types::{
    announcement::Announcement, bug_ticket::BugTicket, person::Person, suggestion::Suggestion,
    user::User,
};
use chrono::{DateTime, Utc};

/// A document living in a remote collection.
pub trait Record: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Name of the remote collection holding these documents.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;

    /// Only called by stores, on first write.
    fn assign_id(&mut self, id: String);

    fn submitted_at(&self) -> Option<DateTime<Utc>>;

    /// Fields matched by a search filter.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether `user` is the owner of the record.
    fn is_owned_by(&self, user: &User) -> bool;
}

impl Record for BugTicket {
    const COLLECTION: &'static str = "bug_tickets";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            self.academy.as_deref(),
            self.description.as_deref(),
            self.short_description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn is_owned_by(&self, user: &User) -> bool {
        self.submitted_by.as_deref() == Some(user.mail.as_str())
    }
}

impl Record for Person {
    const COLLECTION: &'static str = "persons";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            self.firstname.as_deref(),
            self.lastname.as_deref(),
            self.academy.as_deref(),
            self.role.map(|role| role.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn is_owned_by(&self, user: &User) -> bool {
        user.id.is_some() && self.user_id == user.id
    }
}

impl Record for Suggestion {
    const COLLECTION: &'static str = "suggestions";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            self.subject.as_deref(),
            self.body.as_deref(),
            self.academy.as_deref(),
            self.submitted_by.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn is_owned_by(&self, user: &User) -> bool {
        self.submitted_by.as_deref() == Some(user.mail.as_str())
    }
}

impl Record for Announcement {
    const COLLECTION: &'static str = "announcements";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    fn search_fields(&self) -> Vec<&str> {
        [self.title.as_deref(), self.content.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }

    fn is_owned_by(&self, _user: &User) -> bool {
        false
    }
}
