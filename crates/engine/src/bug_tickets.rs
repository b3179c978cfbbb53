//! Bug tickets: reporting a new ticket and resolving an existing one.

use api_types::bug_ticket::{BugTicket, BugTicketCategory, BugTicketPriority};

use crate::{
    gateway::UpdateGateway,
    holder::{Draft, Holder, Submission},
    session::Audit,
    validate::{self, ValidationReport},
};

pub const SHORT_DESCRIPTION_MAX: usize = 80;
pub const RESOLVED_COMMENT_MIN: usize = 5;
pub const RESOLVED_COMMENT_MAX: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BugTicketField {
    Category,
    Priority,
    ShortDescription,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BugTicketEdit {
    Category(BugTicketCategory),
    Priority(BugTicketPriority),
    ShortDescription(String),
    Description(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugTicketDraft {
    pub category: Option<BugTicketCategory>,
    pub priority: Option<BugTicketPriority>,
    pub short_description: String,
    pub description: String,
}

/// Resolution form of the ticket detail sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionForm {
    pub comment: String,
    pub is_comment_error: bool,
    pub comment_error: Option<String>,
}

impl Draft for BugTicketDraft {
    type Record = BugTicket;
    type Field = BugTicketField;
    type Edit = BugTicketEdit;
    type Detail = ResolutionForm;

    fn apply(&mut self, edit: BugTicketEdit) {
        match edit {
            BugTicketEdit::Category(category) => self.category = Some(category),
            BugTicketEdit::Priority(priority) => self.priority = Some(priority),
            BugTicketEdit::ShortDescription(text) => self.short_description = text,
            BugTicketEdit::Description(text) => self.description = text,
        }
    }

    fn validate(&self) -> ValidationReport<BugTicketField> {
        let mut report = ValidationReport::new();
        report
            .check(
                BugTicketField::Category,
                validate::required(self.category, "category"),
            )
            .check(
                BugTicketField::Priority,
                validate::required(self.priority, "priority"),
            )
            .check(
                BugTicketField::ShortDescription,
                validate::not_blank(Some(self.short_description.as_str()), "short description").and_then(
                    |()| {
                        validate::length_between(
                            Some(self.short_description.as_str()),
                            "short description",
                            1,
                            SHORT_DESCRIPTION_MAX,
                        )
                    },
                ),
            )
            .check(
                BugTicketField::Description,
                validate::not_blank(Some(self.description.as_str()), "description"),
            );
        report
    }

    fn finalize(&self, audit: &Audit) -> BugTicket {
        BugTicket {
            id: None,
            category: self.category,
            priority: self.priority,
            short_description: Some(self.short_description.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            submitted_by: Some(audit.mail.clone()),
            submitted_at: Some(audit.at),
            academy: audit.academy.clone(),
            is_resolved: false,
            resolved_at: None,
            resolved_comment: None,
        }
    }
}

/// Check a resolution comment: non-blank, with a bounded length.
pub fn validate_resolved_comment(comment: &str) -> Result<(), String> {
    validate::not_blank(Some(comment), "resolution comment")?;
    validate::length_between(
        Some(comment),
        "resolution comment",
        RESOLVED_COMMENT_MIN,
        RESOLVED_COMMENT_MAX,
    )
}

impl<G: UpdateGateway<BugTicket>> Holder<BugTicketDraft, G> {
    pub fn on_resolved_comment_change(&mut self, comment: &str) {
        let comment = comment.to_string();
        self.modify(|s| s.detail.comment = comment);
    }

    /// Mark the selected ticket as resolved with the typed comment.
    pub fn on_resolve(&mut self) -> Submission {
        let state = self.snapshot();
        let (comment, selected) = (state.detail.comment, state.list.selected);

        self.modify(|s| {
            s.detail.is_comment_error = false;
            s.detail.comment_error = None;
        });
        if let Err(message) = validate_resolved_comment(&comment) {
            tracing::debug!("resolution rejected: {message}");
            self.modify(|s| {
                s.detail.is_comment_error = true;
                s.detail.comment_error = Some(message);
            });
            return Submission::Invalid;
        }

        let Some(ticket) = selected else {
            return Submission::NothingSelected;
        };
        if ticket.is_resolved {
            tracing::debug!(id = ?ticket.id, "ticket already resolved, keeping its resolution");
            return Submission::Unchanged;
        }
        let resolved = BugTicket {
            is_resolved: true,
            resolved_at: Some(self.session().now()),
            resolved_comment: Some(comment.trim().to_string()),
            ..ticket
        };
        self.start_update(resolved)
    }
}
