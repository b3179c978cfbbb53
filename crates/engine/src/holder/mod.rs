//! The per-screen state holder.
//!
//! A [`Holder`] owns the [`UiState`] of one entity screen and is the only
//! writer of it: it folds the gateway observation into the loaded list,
//! applies user intents to the draft, filter and selection, validates on
//! submit and runs writes. Renderers read snapshots through a `watch`
//! receiver and dispatch intents back as method calls.
//!
//! Nothing fails past the holder: validation errors, transport failures and
//! interrupted writes all end up as fields of the state.
//!
//! The observation and every write run in a [`JoinSet`] owned by the holder,
//! so dropping the holder tears all of them down together.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinSet};

use crate::{
    error::GatewayError,
    gateway::{Gateway, SubmitGateway, UpdateGateway},
    record::Record,
    session::Session,
};

pub mod form;
pub mod list;

pub use form::{Draft, FormState, Submission, WriteStatus};
pub use list::{Filter, ListPhase, ListState};

use form::WriteGuard;

/// Minimum time a loading indicator stays up, so fast answers do not flash it.
pub const DEFAULT_LOADING_DELAY: Duration = Duration::from_millis(500);

/// Which records of the collection a screen lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    All,
    /// Only the records owned by the session user.
    Mine,
}

#[derive(Debug, Clone, Copy)]
pub struct HolderOptions {
    pub loading_delay: Duration,
    pub scope: Scope,
}

impl HolderOptions {
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

impl Default for HolderOptions {
    fn default() -> Self {
        Self {
            loading_delay: DEFAULT_LOADING_DELAY,
            scope: Scope::All,
        }
    }
}

/// Everything a renderer needs to draw an entity screen.
#[derive(Debug, Clone)]
pub struct UiState<D: Draft> {
    pub list: ListState<D::Record>,
    pub form: FormState<D>,
    /// Status of updates to existing records.
    pub update: WriteStatus,
    pub detail: D::Detail,
}

impl<D: Draft> Default for UiState<D> {
    fn default() -> Self {
        Self {
            list: ListState::default(),
            form: FormState::default(),
            update: WriteStatus::default(),
            detail: D::Detail::default(),
        }
    }
}

fn list_of<D: Draft>(state: &mut UiState<D>) -> &mut ListState<D::Record> {
    &mut state.list
}

fn submit_status<D: Draft>(state: &mut UiState<D>) -> &mut WriteStatus {
    &mut state.form.submit
}

fn update_status<D: Draft>(state: &mut UiState<D>) -> &mut WriteStatus {
    &mut state.update
}

pub struct Holder<D: Draft, G> {
    gateway: Arc<G>,
    session: Session,
    options: HolderOptions,
    state: Arc<watch::Sender<UiState<D>>>,
    tasks: JoinSet<()>,
}

impl<D, G> Holder<D, G>
where
    D: Draft,
    G: Gateway<D::Record>,
{
    /// Create the holder and start observing the collection.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(gateway: Arc<G>, session: Session, options: HolderOptions) -> Self {
        let (state, _) = watch::channel(UiState::default());
        let state = Arc::new(state);
        let mut tasks = JoinSet::new();

        let owner = match options.scope {
            Scope::All => None,
            Scope::Mine => Some(session.user().clone()),
        };
        list::spawn_subscription(
            &mut tasks,
            gateway.observe_all(),
            Arc::clone(&state),
            list_of::<D>,
            options.loading_delay,
            owner,
        );

        Self {
            gateway,
            session,
            options,
            state,
            tasks,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<D>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UiState<D> {
        self.state.borrow().clone()
    }

    /// Wait until the state satisfies `done`, and return that state.
    pub async fn wait_for(&self, done: impl FnMut(&UiState<D>) -> bool) -> UiState<D> {
        let mut rx = self.subscribe();
        match rx.wait_for(done).await {
            Ok(state) => UiState::clone(&state),
            // The sender lives as long as `self`.
            Err(_) => self.snapshot(),
        }
    }

    pub fn on_field_change(&mut self, edit: D::Edit) {
        tracing::trace!(?edit, "field change");
        self.state.send_modify(|s| s.form.draft.apply(edit));
    }

    pub fn on_filter_change(&mut self, filter: Filter) {
        self.state.send_modify(|s| s.list.set_filter(filter));
    }

    pub fn on_select(&mut self, id: Option<&str>) {
        let id = id.map(str::to_string);
        self.state.send_modify(|s| s.list.select(id));
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut UiState<D>)) {
        self.state.send_modify(f);
    }

    /// Run `write` in the background, reporting into the status picked by
    /// `status`. `on_success` runs on the state once the write succeeded.
    fn spawn_write<F>(
        &mut self,
        status: fn(&mut UiState<D>) -> &mut WriteStatus,
        write: F,
        on_success: fn(&mut UiState<D>),
    ) where
        F: Future<Output = Result<String, GatewayError>> + Send + 'static,
    {
        // Reap finished writes so the set only tracks live tasks.
        while self.tasks.try_join_next().is_some() {}

        let state = Arc::clone(&self.state);
        let loading_delay = self.options.loading_delay;
        self.tasks.spawn(async move {
            let mut guard = WriteGuard::new(Arc::clone(&state), status);
            tokio::time::sleep(loading_delay).await;
            let outcome = write.await;
            guard.disarm();

            match outcome {
                Ok(id) => {
                    tracing::info!(%id, "write succeeded");
                    state.send_modify(|s| {
                        status(s).succeed(id);
                        on_success(s);
                    });
                }
                Err(err) => {
                    tracing::warn!("write failed: {err}");
                    state.send_modify(|s| status(s).fail(err.message()));
                }
            }
        });
    }
}

impl<D, G> Holder<D, G>
where
    D: Draft,
    G: SubmitGateway<D::Record>,
{
    /// Validate the draft and, when clean, send it to the store stamped with
    /// the session audit values.
    pub fn on_submit(&mut self) -> Submission {
        if self.state.borrow().form.submit.is_loading {
            tracing::warn!("submit ignored: previous submit still running");
            return Submission::InFlight;
        }

        let draft = self.state.borrow().form.draft.clone();
        let report = draft.validate();
        self.state.send_modify(|s| s.form.apply_report(&report));
        if !report.is_clean() {
            let errors: Vec<_> = report.errors().collect();
            tracing::debug!(?errors, "draft rejected");
            return Submission::Invalid;
        }

        let record = draft.finalize(&self.session.audit());
        self.state.send_modify(|s| s.form.submit.start());

        let gateway = Arc::clone(&self.gateway);
        self.spawn_write(
            submit_status::<D>,
            async move { gateway.submit(record).await },
            |s| s.form.reset(),
        );
        Submission::Started
    }
}

impl<D, G> Holder<D, G>
where
    D: Draft,
    G: UpdateGateway<D::Record>,
{
    /// Send `record` as a replacement of the stored document.
    pub(crate) fn start_update(&mut self, record: D::Record) -> Submission {
        if self.state.borrow().update.is_loading {
            tracing::warn!("update ignored: previous update still running");
            return Submission::InFlight;
        }
        self.state.send_modify(|s| s.update.start());

        let gateway = Arc::clone(&self.gateway);
        self.spawn_write(
            update_status::<D>,
            async move {
                let id = record
                    .id()
                    .map(str::to_string)
                    .ok_or(GatewayError::MissingId)?;
                gateway.update(record).await?;
                Ok(id)
            },
            |_| {},
        );
        Submission::Started
    }
}
