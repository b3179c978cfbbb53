//! Persons tracked by the signed-in user, and their validated modules.

use api_types::person::{Person, PersonRole};

use crate::{
    gateway::UpdateGateway,
    holder::{Draft, Holder, Submission},
    session::Audit,
    validate::{self, ValidationReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PersonField {
    Role,
    Firstname,
    Lastname,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonEdit {
    Role(PersonRole),
    Firstname(String),
    Lastname(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub role: Option<PersonRole>,
    pub firstname: String,
    pub lastname: String,
}

impl Draft for PersonDraft {
    type Record = Person;
    type Field = PersonField;
    type Edit = PersonEdit;
    type Detail = ();

    fn apply(&mut self, edit: PersonEdit) {
        match edit {
            PersonEdit::Role(role) => self.role = Some(role),
            PersonEdit::Firstname(name) => self.firstname = name,
            PersonEdit::Lastname(name) => self.lastname = name,
        }
    }

    fn validate(&self) -> ValidationReport<PersonField> {
        let mut report = ValidationReport::new();
        report
            .check(PersonField::Role, validate::required(self.role, "role"))
            .check(
                PersonField::Firstname,
                validate::not_blank(Some(self.firstname.as_str()), "first name"),
            )
            .check(
                PersonField::Lastname,
                validate::not_blank(Some(self.lastname.as_str()), "last name"),
            );
        report
    }

    fn finalize(&self, audit: &Audit) -> Person {
        Person {
            id: None,
            firstname: Some(self.firstname.trim().to_string()),
            lastname: Some(self.lastname.trim().to_string()),
            role: self.role,
            validated_modules: Vec::new(),
            user_id: audit.user_id.clone(),
            submitted_by: Some(audit.mail.clone()),
            submitted_at: Some(audit.at),
            academy: audit.academy.clone(),
        }
    }
}

/// Add or remove `module`, keeping the list ascending and without duplicates.
pub fn toggle_module(modules: &[u32], module: u32, checked: bool) -> Vec<u32> {
    let mut modules: Vec<u32> = modules.iter().copied().filter(|m| *m != module).collect();
    if checked {
        modules.push(module);
    }
    modules.sort_unstable();
    modules.dedup();
    modules
}

impl<G: UpdateGateway<Person>> Holder<PersonDraft, G> {
    /// Mark `module` as validated (or not) for the selected person.
    pub fn on_module_toggle(&mut self, module: u32, checked: bool) -> Submission {
        let Some(person) = self.snapshot().list.selected else {
            return Submission::NothingSelected;
        };
        let validated_modules = toggle_module(&person.validated_modules, module, checked);
        tracing::debug!(module, checked, "module toggle");
        self.start_update(Person {
            validated_modules,
            ..person
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn names_must_not_be_blank() {
        let draft = PersonDraft {
            role: Some(PersonRole::Student),
            firstname: "  ".to_string(),
            lastname: "Curie".to_string(),
        };
        let report = draft.validate();
        assert!(report.error(PersonField::Firstname).is_some());
        assert!(report.error(PersonField::Lastname).is_none());
        assert!(report.error(PersonField::Role).is_none());
    }

    #[test]
    fn finalize_attaches_owner() {
        let draft = PersonDraft {
            role: Some(PersonRole::Trainee),
            firstname: "Marie ".to_string(),
            lastname: " Curie".to_string(),
        };
        let person = draft.finalize(&Audit {
            mail: "tutor@si2g.fr".to_string(),
            academy: Some("Paris".to_string()),
            user_id: Some("u42".to_string()),
            at: Utc.with_ymd_and_hms(2024, 1, 8, 14, 0, 0).unwrap(),
        });
        assert_eq!(person.firstname.as_deref(), Some("Marie"));
        assert_eq!(person.lastname.as_deref(), Some("Curie"));
        assert_eq!(person.user_id.as_deref(), Some("u42"));
        assert_eq!(person.submitted_by.as_deref(), Some("tutor@si2g.fr"));
        assert!(person.validated_modules.is_empty());
    }

    #[test]
    fn toggling_modules_keeps_them_sorted_and_unique() {
        assert_eq!(toggle_module(&[1, 3], 2, true), vec![1, 2, 3]);
        assert_eq!(toggle_module(&[1, 2, 3], 2, true), vec![1, 2, 3]);
        assert_eq!(toggle_module(&[1, 2, 3], 2, false), vec![1, 3]);
        assert_eq!(toggle_module(&[], 4, false), Vec::<u32>::new());
    }
}
