//! Loaded list, filter and selection of one collection.

use std::{sync::Arc, time::Duration};

use api_types::user::User;
use tokio::{sync::watch, task::JoinSet};

use crate::{
    gateway::{LoadResult, LoadStream},
    record::Record,
};

/// How the loaded list is narrowed and ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    /// Everything, newest submission first.
    #[default]
    Default,
    /// Case-insensitive substring match over the searchable fields.
    Search(String),
}

impl Filter {
    pub fn search(text: &str) -> Self {
        Self::Search(text.to_string())
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Self::Default => true,
            Self::Search(text) => {
                let needle = text.trim().to_lowercase();
                needle.is_empty()
                    || record
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Phase of the list, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ListState<R> {
    /// Last list received from the gateway, as delivered.
    pub loaded: Vec<R>,
    /// `loaded` after filter and ordering.
    pub visible: Vec<R>,
    pub filter: Filter,
    /// Identifier picked by the user.
    pub selection: Option<String>,
    /// The selected record, resolved against `loaded`.
    pub selected: Option<R>,
    pub is_details_open: bool,
    pub is_loading: bool,
    pub failure: Option<String>,
    has_loaded: bool,
}

impl<R> Default for ListState<R> {
    fn default() -> Self {
        Self {
            loaded: Vec::new(),
            visible: Vec::new(),
            filter: Filter::Default,
            selection: None,
            selected: None,
            is_details_open: false,
            is_loading: false,
            failure: None,
            has_loaded: false,
        }
    }
}

impl<R: Record> ListState<R> {
    pub fn phase(&self) -> ListPhase {
        if self.is_loading {
            ListPhase::Loading
        } else if self.failure.is_some() {
            ListPhase::Failed
        } else if self.has_loaded {
            ListPhase::Loaded
        } else {
            ListPhase::Loading
        }
    }

    pub(crate) fn fold(&mut self, result: LoadResult<Vec<R>>) {
        match result {
            LoadResult::Loading => self.is_loading = true,
            LoadResult::Success(list) => {
                self.loaded = list;
                self.has_loaded = true;
                self.is_loading = false;
                self.failure = None;
                self.recombine();
            }
            LoadResult::Failed(message) => {
                self.is_loading = false;
                self.failure = Some(message);
            }
        }
    }

    pub(crate) fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.recombine();
    }

    pub(crate) fn select(&mut self, id: Option<String>) {
        self.selection = id;
        self.recombine();
    }

    fn recombine(&mut self) {
        let mut visible: Vec<R> = self
            .loaded
            .iter()
            .filter(|record| self.filter.matches(*record))
            .cloned()
            .collect();
        // Newest first, undated records last.
        visible.sort_by(|a, b| b.submitted_at().cmp(&a.submitted_at()));
        self.visible = visible;

        self.selected = self.selection.as_deref().and_then(|id| {
            self.loaded
                .iter()
                .find(|record| record.id() == Some(id))
                .cloned()
        });
        self.is_details_open = self.selection.is_some();
    }
}

/// Fold a collection observation into the list found by `lens`, holding every
/// `Loading` on screen for at least `loading_delay`. With an `owner`, only
/// the records owned by that user are kept.
pub(crate) fn spawn_subscription<S, R>(
    tasks: &mut JoinSet<()>,
    mut stream: LoadStream<Vec<R>>,
    state: Arc<watch::Sender<S>>,
    lens: fn(&mut S) -> &mut ListState<R>,
    loading_delay: Duration,
    owner: Option<User>,
) where
    S: Send + Sync + 'static,
    R: Record,
{
    tasks.spawn(async move {
        tracing::debug!(collection = R::COLLECTION, "subscribed");
        while let Some(mut result) = stream.recv().await {
            if let (LoadResult::Success(list), Some(owner)) = (&mut result, &owner) {
                list.retain(|record| record.is_owned_by(owner));
            }
            let is_loading = matches!(result, LoadResult::Loading);
            if let LoadResult::Failed(message) = &result {
                tracing::warn!(collection = R::COLLECTION, "load failed: {message}");
            }
            state.send_modify(|s| lens(s).fold(result));
            if is_loading {
                tokio::time::sleep(loading_delay).await;
            }
        }
        tracing::debug!(collection = R::COLLECTION, "observation ended");
    });
}

#[cfg(test)]
mod tests {
    use api_types::bug_ticket::BugTicket;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn ticket(id: &str, day: u32, short: &str, academy: &str) -> BugTicket {
        BugTicket {
            id: Some(id.to_string()),
            short_description: Some(short.to_string()),
            academy: Some(academy.to_string()),
            submitted_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn loaded(records: Vec<BugTicket>) -> ListState<BugTicket> {
        let mut list = ListState::default();
        list.fold(LoadResult::Success(records));
        list
    }

    fn ids(list: &ListState<BugTicket>) -> Vec<&str> {
        list.visible.iter().filter_map(|t| t.id.as_deref()).collect()
    }

    #[test]
    fn default_filter_sorts_newest_first() {
        let mut undated = ticket("u", 1, "no date", "Paris");
        undated.submitted_at = None;
        let list = loaded(vec![
            ticket("a", 1, "login", "Lyon"),
            undated,
            ticket("c", 3, "crash", "Paris"),
            ticket("b", 2, "slow", "Lyon"),
        ]);
        assert_eq!(ids(&list), vec!["c", "b", "a", "u"]);
    }

    #[test]
    fn search_matches_any_field_ignoring_case() {
        let mut list = loaded(vec![
            ticket("a", 1, "Crash on login", "Lyon"),
            ticket("b", 2, "slow list", "Paris"),
            ticket("c", 3, "typo", "lyon-est"),
        ]);
        list.set_filter(Filter::search("LYON"));
        assert_eq!(ids(&list), vec!["c", "a"]);

        list.set_filter(Filter::search("crash"));
        assert_eq!(ids(&list), vec!["a"]);
    }

    #[test]
    fn applying_a_filter_twice_is_idempotent() {
        let mut list = loaded(vec![
            ticket("a", 1, "Crash on login", "Lyon"),
            ticket("b", 2, "slow list", "Paris"),
        ]);
        list.set_filter(Filter::search("s"));
        let once = list.visible.clone();
        list.set_filter(Filter::search("s"));
        assert_eq!(list.visible, once);
    }

    #[test]
    fn blank_search_keeps_everything() {
        let mut list = loaded(vec![ticket("a", 1, "x", "Lyon"), ticket("b", 2, "y", "Nice")]);
        list.set_filter(Filter::search("   "));
        assert_eq!(ids(&list), vec!["b", "a"]);
    }

    #[test]
    fn selection_follows_the_latest_list() {
        let mut list = loaded(vec![ticket("a", 1, "before", "Lyon")]);
        list.select(Some("a".to_string()));
        assert!(list.is_details_open);

        let mut changed = ticket("a", 1, "after", "Lyon");
        changed.is_resolved = true;
        list.fold(LoadResult::Success(vec![changed]));

        let selected = list.selected.as_ref().unwrap();
        assert_eq!(selected.short_description.as_deref(), Some("after"));
        assert!(selected.is_resolved);
    }

    #[test]
    fn selection_of_a_vanished_record_resolves_to_none() {
        let mut list = loaded(vec![ticket("a", 1, "x", "Lyon")]);
        list.select(Some("a".to_string()));
        list.fold(LoadResult::Success(Vec::new()));
        assert!(list.selected.is_none());
        assert!(list.is_details_open);

        list.select(None);
        assert!(!list.is_details_open);
    }

    #[test]
    fn failure_keeps_last_good_list() {
        let mut list = loaded(vec![ticket("a", 1, "x", "Lyon")]);
        list.fold(LoadResult::Loading);
        assert_eq!(list.phase(), ListPhase::Loading);

        list.fold(LoadResult::Failed("offline".to_string()));
        assert_eq!(list.phase(), ListPhase::Failed);
        assert_eq!(list.failure.as_deref(), Some("offline"));
        assert_eq!(list.loaded.len(), 1);

        list.fold(LoadResult::Success(Vec::new()));
        assert_eq!(list.phase(), ListPhase::Loaded);
        assert!(list.failure.is_none());
    }

    #[test]
    fn fresh_list_is_loading() {
        let list = ListState::<BugTicket>::default();
        assert_eq!(list.phase(), ListPhase::Loading);
    }
}
