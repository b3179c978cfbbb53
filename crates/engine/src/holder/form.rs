//! Draft editing and write bookkeeping.

use std::{collections::BTreeMap, fmt, sync::Arc};

use tokio::sync::watch;

use crate::{error::GatewayError, record::Record, session::Audit, validate::ValidationReport};

/// In-progress edit buffer of a record.
///
/// A draft has no identity: it becomes a record only through [`finalize`]
/// once the store accepted it.
///
///  [`finalize`]: Draft::finalize
pub trait Draft: Clone + Default + fmt::Debug + Send + Sync + 'static {
    type Record: Record;
    /// Fields that can carry a validation error.
    type Field: Copy + Ord + fmt::Debug + Send + Sync + 'static;
    /// One user edit of one field.
    type Edit: fmt::Debug;
    /// Screen-local state of the detail sheet.
    type Detail: Clone + Default + fmt::Debug + Send + Sync + 'static;

    fn apply(&mut self, edit: Self::Edit);

    /// Run every field rule, without short-circuit.
    fn validate(&self) -> ValidationReport<Self::Field>;

    /// Build the record to write, stamped with the session audit values.
    fn finalize(&self, audit: &Audit) -> Self::Record;
}

/// Outcome of a write intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Validation passed and the write was handed to the gateway.
    Started,
    /// Validation failed, field errors are set, nothing was written.
    Invalid,
    /// A write of the same kind is still running; nothing was written.
    InFlight,
    /// The intent needs a selected record and there is none.
    NothingSelected,
    /// The record already is in the requested state; nothing was written.
    Unchanged,
}

/// Loading flag and outcome of one kind of write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStatus {
    pub is_loading: bool,
    pub failure: Option<String>,
    /// Identifier of the last document written successfully.
    pub last_written: Option<String>,
}

impl WriteStatus {
    pub(crate) fn start(&mut self) {
        self.is_loading = true;
        self.failure = None;
    }

    pub(crate) fn succeed(&mut self, id: String) {
        self.is_loading = false;
        self.failure = None;
        self.last_written = Some(id);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.failure = Some(message);
    }
}

#[derive(Debug, Clone)]
pub struct FormState<D: Draft> {
    pub draft: D,
    /// Failing fields of the last validation pass.
    pub field_errors: BTreeMap<D::Field, String>,
    pub submit: WriteStatus,
}

impl<D: Draft> Default for FormState<D> {
    fn default() -> Self {
        Self {
            draft: D::default(),
            field_errors: BTreeMap::new(),
            submit: WriteStatus::default(),
        }
    }
}

impl<D: Draft> FormState<D> {
    pub fn has_error(&self, field: D::Field) -> bool {
        self.field_errors.contains_key(&field)
    }

    /// Clear every flag, then raise only the failing ones.
    pub(crate) fn apply_report(&mut self, report: &ValidationReport<D::Field>) {
        self.field_errors.clear();
        for (field, message) in report.errors() {
            self.field_errors.insert(field, message.to_string());
        }
    }

    pub(crate) fn reset(&mut self) {
        self.draft = D::default();
        self.field_errors.clear();
    }
}

/// Marks a write as failed if its task stops before reporting an outcome,
/// whether it panicked or was aborted.
pub(crate) struct WriteGuard<S: Send + Sync + 'static> {
    state: Arc<watch::Sender<S>>,
    status: fn(&mut S) -> &mut WriteStatus,
    armed: bool,
}

impl<S: Send + Sync + 'static> WriteGuard<S> {
    pub(crate) fn new(state: Arc<watch::Sender<S>>, status: fn(&mut S) -> &mut WriteStatus) -> Self {
        Self {
            state,
            status,
            armed: true,
        }
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<S: Send + Sync + 'static> Drop for WriteGuard<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let message = if std::thread::panicking() {
            "write failed unexpectedly"
        } else {
            "write interrupted"
        };
        let err = GatewayError::Interrupted(message.to_string());
        tracing::warn!("{err}");
        let status = self.status;
        self.state.send_modify(|s| status(s).fail(err.message()));
    }
}
