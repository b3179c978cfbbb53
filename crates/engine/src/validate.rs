//! Field validation shared by every draft.
//!
//! A validator checks every field on every call and records the outcome in a
//! [`ValidationReport`], so the whole set of errors is available in one pass.

use std::collections::BTreeMap;

/// Outcome of one validation pass: field → optional error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport<F: Ord> {
    entries: BTreeMap<F, Option<String>>,
}

impl<F: Ord + Copy> ValidationReport<F> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record the outcome of the rule for `field`.
    pub fn check(&mut self, field: F, outcome: Result<(), String>) -> &mut Self {
        self.entries.insert(field, outcome.err());
        self
    }

    /// True iff no checked field carries an error.
    pub fn is_clean(&self) -> bool {
        self.entries.values().all(Option::is_none)
    }

    pub fn error(&self, field: F) -> Option<&str> {
        self.entries.get(&field).and_then(|e| e.as_deref())
    }

    /// Failing fields with their message, in field order.
    pub fn errors(&self) -> impl Iterator<Item = (F, &str)> {
        self.entries
            .iter()
            .filter_map(|(field, error)| error.as_deref().map(|e| (*field, e)))
    }
}

impl<F: Ord + Copy> Default for ValidationReport<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// The value must be chosen.
pub(crate) fn required<T>(value: Option<T>, label: &str) -> Result<(), String> {
    match value {
        Some(_) => Ok(()),
        None => Err(format!("{label} is required")),
    }
}

/// The text must contain something other than whitespace.
pub(crate) fn not_blank(value: Option<&str>, label: &str) -> Result<(), String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(format!("{label} must not be empty")),
    }
}

/// The trimmed text length, in characters, must be within `min..=max`.
pub(crate) fn length_between(
    value: Option<&str>,
    label: &str,
    min: usize,
    max: usize,
) -> Result<(), String> {
    let len = value.map(|text| text.trim().chars().count()).unwrap_or(0);
    if len < min {
        return Err(format!("{label} must be at least {min} characters"));
    }
    if len > max {
        return Err(format!("{label} must be at most {max} characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    enum Field {
        A,
        B,
    }

    #[test]
    fn report_is_clean_only_without_errors() {
        let mut report = ValidationReport::new();
        report.check(Field::A, Ok(())).check(Field::B, Ok(()));
        assert!(report.is_clean());

        report.check(Field::B, Err("bad".to_string()));
        assert!(!report.is_clean());
        assert_eq!(report.error(Field::B), Some("bad"));
        assert_eq!(report.error(Field::A), None);
        assert_eq!(report.errors().collect::<Vec<_>>(), vec![(Field::B, "bad")]);
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank(None, "x").is_err());
        assert!(not_blank(Some("   "), "x").is_err());
        assert!(not_blank(Some(" a "), "x").is_ok());
    }

    #[test]
    fn length_counts_trimmed_characters() {
        assert!(length_between(Some("  abcd  "), "x", 5, 10).is_err());
        assert!(length_between(Some("abcde"), "x", 5, 10).is_ok());
        assert!(length_between(Some("ééééé"), "x", 5, 5).is_ok());
        assert!(length_between(Some("abcdefghijk"), "x", 5, 10).is_err());
    }
}
