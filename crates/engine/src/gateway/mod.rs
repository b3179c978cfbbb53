//! Read/write contract towards the remote document store.
//!
//! Every entity type goes through the same shape: a long-lived observation
//! stream of [`LoadResult`]s and plain async `Result`s for writes. Each
//! capability is its own trait so read-only feeds only implement [`Gateway`].

use std::future::Future;

use tokio::sync::mpsc;

use crate::{error::GatewayError, record::Record};

pub mod memory;

/// Buffer of an observation channel.
pub const STREAM_BUFFER: usize = 16;

/// Transport-level outcome of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult<T> {
    Loading,
    Success(T),
    Failed(String),
}

/// Receiving half of an observation. Dropping it cancels the observation.
#[derive(Debug)]
pub struct LoadStream<T> {
    rx: mpsc::Receiver<LoadResult<T>>,
}

/// Sending half of an observation, held by the gateway.
#[derive(Debug, Clone)]
pub struct LoadSender<T> {
    tx: mpsc::Sender<LoadResult<T>>,
}

impl<T> LoadStream<T> {
    pub fn channel() -> (LoadSender<T>, LoadStream<T>) {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        (LoadSender { tx }, LoadStream { rx })
    }

    /// Next emission, `None` once the gateway stopped observing.
    pub async fn recv(&mut self) -> Option<LoadResult<T>> {
        self.rx.recv().await
    }
}

impl<T> LoadSender<T> {
    /// Returns `false` once the observer went away.
    pub async fn send(&self, result: LoadResult<T>) -> bool {
        self.tx.send(result).await.is_ok()
    }

    /// Resolves when the observer went away.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Observation of a whole collection.
pub trait Gateway<R: Record>: Send + Sync + 'static {
    /// Yields `Loading` first, then `Success` on every change of the
    /// collection or `Failed` on an error, until the stream is dropped.
    fn observe_all(&self) -> LoadStream<Vec<R>>;
}

/// Creation of new documents.
pub trait SubmitGateway<R: Record>: Gateway<R> {
    /// Store a new document, returns the identifier assigned by the store.
    fn submit(&self, record: R) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// Replacement of existing documents.
pub trait UpdateGateway<R: Record>: Gateway<R> {
    fn update(&self, record: R) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
