//! Suggestions sent to the SI2G team.

use api_types::suggestion::Suggestion;

use crate::{
    holder::Draft,
    session::Audit,
    validate::{self, ValidationReport},
};

pub const SUBJECT_MAX: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuggestionField {
    Subject,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionEdit {
    Subject(String),
    Body(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionDraft {
    pub subject: String,
    pub body: String,
}

impl Draft for SuggestionDraft {
    type Record = Suggestion;
    type Field = SuggestionField;
    type Edit = SuggestionEdit;
    type Detail = ();

    fn apply(&mut self, edit: SuggestionEdit) {
        match edit {
            SuggestionEdit::Subject(text) => self.subject = text,
            SuggestionEdit::Body(text) => self.body = text,
        }
    }

    fn validate(&self) -> ValidationReport<SuggestionField> {
        let subject = Some(self.subject.as_str());
        let mut report = ValidationReport::new();
        report
            .check(
                SuggestionField::Subject,
                validate::not_blank(subject, "subject")
                    .and_then(|()| validate::length_between(subject, "subject", 1, SUBJECT_MAX)),
            )
            .check(
                SuggestionField::Body,
                validate::not_blank(Some(self.body.as_str()), "body"),
            );
        report
    }

    fn finalize(&self, audit: &Audit) -> Suggestion {
        Suggestion {
            id: None,
            subject: Some(self.subject.trim().to_string()),
            body: Some(self.body.trim().to_string()),
            submitted_by: Some(audit.mail.clone()),
            submitted_at: Some(audit.at),
            academy: audit.academy.clone(),
        }
    }
}
