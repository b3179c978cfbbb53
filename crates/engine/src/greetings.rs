//! Greetings screen: welcome header and the announcement feed.

use std::sync::Arc;

use api_types::announcement::Announcement;
use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinSet};

use crate::{
    gateway::Gateway,
    holder::{Filter, HolderOptions, ListState},
    session::Session,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub headline: String,
    pub mail: String,
    pub academy: Option<String>,
    pub today: DateTime<Utc>,
}

impl Greeting {
    pub fn for_session(session: &Session) -> Self {
        let user = session.user();
        Self {
            headline: format!("Welcome, {}", user.display_name()),
            mail: user.mail.clone(),
            academy: user.academy.clone(),
            today: session.now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GreetingsState {
    pub greeting: Greeting,
    pub feed: ListState<Announcement>,
}

fn feed_of(state: &mut GreetingsState) -> &mut ListState<Announcement> {
    &mut state.feed
}

/// Read-only holder of the greetings screen.
pub struct GreetingsHolder {
    state: Arc<watch::Sender<GreetingsState>>,
    _tasks: JoinSet<()>,
}

impl GreetingsHolder {
    /// Must be called from within a Tokio runtime.
    pub fn new<G: Gateway<Announcement>>(
        gateway: &G,
        session: &Session,
        options: HolderOptions,
    ) -> Self {
        let (state, _) = watch::channel(GreetingsState {
            greeting: Greeting::for_session(session),
            feed: ListState::default(),
        });
        let state = Arc::new(state);
        let mut tasks = JoinSet::new();
        crate::holder::list::spawn_subscription(
            &mut tasks,
            gateway.observe_all(),
            Arc::clone(&state),
            feed_of,
            options.loading_delay,
            None,
        );
        Self {
            state,
            _tasks: tasks,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GreetingsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> GreetingsState {
        self.state.borrow().clone()
    }

    pub async fn wait_for(&self, done: impl FnMut(&GreetingsState) -> bool) -> GreetingsState {
        let mut rx = self.subscribe();
        match rx.wait_for(done).await {
            Ok(state) => GreetingsState::clone(&state),
            Err(_) => self.snapshot(),
        }
    }

    pub fn on_filter_change(&mut self, filter: Filter) {
        self.state.send_modify(|s| s.feed.set_filter(filter));
    }
}
