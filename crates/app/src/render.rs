//! Plain-text rendering of holder snapshots.

use std::{
    collections::BTreeMap,
    fmt::{Debug, Write},
};

use api_types::{bug_ticket::BugTicket, person::Person, suggestion::Suggestion};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{GreetingsState, ListState, Record};

fn timestamp(at: Option<DateTime<Utc>>, tz: Tz) -> String {
    at.map(|at| at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Render the visible records, one per line, behind the failure banner.
fn list<R: Record>(state: &ListState<R>, line: impl Fn(&R) -> String) -> String {
    let mut out = String::new();
    if let Some(failure) = &state.failure {
        let _ = writeln!(out, "! failed to load {}: {failure}", R::COLLECTION);
    }
    if state.visible.is_empty() {
        let _ = writeln!(out, "(nothing to show)");
    }
    for record in &state.visible {
        let _ = writeln!(out, "{}", line(record));
    }
    out
}

pub fn bug_tickets(state: &ListState<BugTicket>, tz: Tz) -> String {
    list(state, |ticket| {
        let status = if ticket.is_resolved {
            format!("resolved {}", timestamp(ticket.resolved_at, tz))
        } else {
            "open".to_string()
        };
        format!(
            "{}  [{}] {} | {} | {} {} | {status}",
            text(ticket.id.as_deref()),
            ticket.priority.map_or("-", |p| p.as_str()),
            ticket.category.map_or("-", |c| c.as_str()),
            text(ticket.short_description.as_deref()),
            text(ticket.submitted_by.as_deref()),
            timestamp(ticket.submitted_at, tz),
        )
    })
}

pub fn bug_ticket_detail(ticket: &BugTicket, tz: Tz) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", text(ticket.short_description.as_deref()));
    let _ = writeln!(out, "{}", text(ticket.description.as_deref()));
    if ticket.is_resolved {
        let _ = writeln!(
            out,
            "resolved {}: {}",
            timestamp(ticket.resolved_at, tz),
            text(ticket.resolved_comment.as_deref())
        );
    }
    out
}

pub fn persons(state: &ListState<Person>, tz: Tz) -> String {
    list(state, |person| {
        let modules = person
            .validated_modules
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        format!(
            "{}  {} {} ({}) | modules: {} | {}",
            text(person.id.as_deref()),
            text(person.firstname.as_deref()),
            text(person.lastname.as_deref()),
            person.role.map_or("-", |r| r.as_str()),
            if modules.is_empty() { "-" } else { modules.as_str() },
            timestamp(person.submitted_at, tz),
        )
    })
}

pub fn suggestions(state: &ListState<Suggestion>, tz: Tz) -> String {
    list(state, |suggestion| {
        format!(
            "{}  {} | {} {}",
            text(suggestion.id.as_deref()),
            text(suggestion.subject.as_deref()),
            text(suggestion.submitted_by.as_deref()),
            timestamp(suggestion.submitted_at, tz),
        )
    })
}

pub fn greetings(state: &GreetingsState, tz: Tz) -> String {
    let greeting = &state.greeting;
    let mut out = String::new();
    let _ = writeln!(out, "{}", greeting.headline);
    let _ = writeln!(
        out,
        "{} | {} | {}",
        greeting.mail,
        text(greeting.academy.as_deref()),
        greeting.today.with_timezone(&tz).format("%A %d %B %Y")
    );
    let _ = writeln!(out);
    out.push_str(&list(&state.feed, |announcement| {
        format!(
            "{}  {}\n    {}",
            timestamp(announcement.published_at, tz),
            text(announcement.title.as_deref()),
            text(announcement.content.as_deref()),
        )
    }));
    out
}

pub fn field_errors<F: Debug>(errors: &BTreeMap<F, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field:?}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::BugTicketField;

    use super::*;

    #[test]
    fn timestamps_use_the_configured_timezone() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 22, 30, 0).unwrap();
        assert_eq!(timestamp(Some(at), chrono_tz::Europe::Paris), "2024-07-02 00:30");
        assert_eq!(timestamp(None, chrono_tz::UTC), "-");
    }

    #[test]
    fn empty_list_says_so() {
        let state = ListState::<Suggestion>::default();
        assert_eq!(suggestions(&state, chrono_tz::UTC), "(nothing to show)\n");
    }

    #[test]
    fn field_errors_are_listed_per_line() {
        let errors = BTreeMap::from([
            (BugTicketField::Category, "category is required".to_string()),
            (BugTicketField::Description, "description must not be blank".to_string()),
        ]);
        assert_eq!(
            field_errors(&errors),
            "Category: category is required\nDescription: description must not be blank"
        );
    }
}
