//! In-process document store.
//!
//! Keeps one collection in a `watch` channel: every write notifies the open
//! observations, which re-emit the whole collection. Used by the offline
//! mode of the client and by tests.

use std::sync::Mutex;

use tokio::sync::watch;
use uuid::Uuid;

use super::{Gateway, LoadResult, LoadStream, SubmitGateway, UpdateGateway};
use crate::{error::GatewayError, record::Record};

#[derive(Debug)]
pub struct MemoryStore<R> {
    documents: watch::Sender<Vec<R>>,
    pending_failure: Mutex<Option<String>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    /// Seed the collection. Documents without identifier get one.
    pub fn with_documents(mut documents: Vec<R>) -> Self {
        for document in documents.iter_mut().filter(|d| d.id().is_none()) {
            document.assign_id(Uuid::new_v4().to_string());
        }
        let (documents, _) = watch::channel(documents);
        Self {
            documents,
            pending_failure: Mutex::new(None),
        }
    }

    pub fn documents(&self) -> Vec<R> {
        self.documents.borrow().clone()
    }

    /// Make the next write fail with `message`.
    pub fn fail_next_write(&self, message: &str) {
        if let Ok(mut pending) = self.pending_failure.lock() {
            *pending = Some(message.to_string());
        }
    }

    fn take_failure(&self) -> Option<String> {
        self.pending_failure
            .lock()
            .ok()
            .and_then(|mut pending| pending.take())
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Gateway<R> for MemoryStore<R> {
    fn observe_all(&self) -> LoadStream<Vec<R>> {
        let (tx, stream) = LoadStream::channel();
        let mut rx = self.documents.subscribe();

        tokio::spawn(async move {
            if !tx.send(LoadResult::Loading).await {
                return;
            }
            loop {
                let documents = rx.borrow_and_update().clone();
                if !tx.send(LoadResult::Success(documents)).await {
                    return;
                }
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            let _ = tx
                                .send(LoadResult::Failed("document store closed".to_string()))
                                .await;
                            return;
                        }
                    }
                    _ = tx.closed() => return,
                }
            }
        });

        stream
    }
}

impl<R: Record> SubmitGateway<R> for MemoryStore<R> {
    async fn submit(&self, mut record: R) -> Result<String, GatewayError> {
        if let Some(message) = self.take_failure() {
            return Err(GatewayError::Transport(message));
        }
        let id = Uuid::new_v4().to_string();
        record.assign_id(id.clone());
        self.documents.send_modify(|documents| documents.push(record));
        tracing::debug!(collection = R::COLLECTION, %id, "document created");
        Ok(id)
    }
}

impl<R: Record> UpdateGateway<R> for MemoryStore<R> {
    async fn update(&self, record: R) -> Result<(), GatewayError> {
        if let Some(message) = self.take_failure() {
            return Err(GatewayError::Transport(message));
        }
        let id = record.id().ok_or(GatewayError::MissingId)?.to_string();

        let mut found = false;
        self.documents.send_if_modified(|documents| {
            match documents.iter_mut().find(|d| d.id() == Some(id.as_str())) {
                Some(document) => {
                    *document = record;
                    found = true;
                    true
                }
                None => false,
            }
        });

        if !found {
            return Err(GatewayError::NotFound(id));
        }
        tracing::debug!(collection = R::COLLECTION, %id, "document updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use api_types::suggestion::Suggestion;

    use super::*;

    fn suggestion(subject: &str) -> Suggestion {
        Suggestion {
            subject: Some(subject.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn observation_starts_loading_then_follows_writes() {
        let store = MemoryStore::with_documents(vec![suggestion("a")]);
        let mut stream = store.observe_all();

        assert_eq!(stream.recv().await, Some(LoadResult::Loading));
        match stream.recv().await {
            Some(LoadResult::Success(list)) => assert_eq!(list.len(), 1),
            other => panic!("unexpected emission: {other:?}"),
        }

        store.submit(suggestion("b")).await.unwrap();
        match stream.recv().await {
            Some(LoadResult::Success(list)) => assert_eq!(list.len(), 2),
            other => panic!("unexpected emission: {other:?}"),
        }
    }

    #[tokio::test]
    async fn seeded_documents_get_identifiers() {
        let store = MemoryStore::with_documents(vec![suggestion("a"), suggestion("b")]);
        assert!(store.documents().iter().all(|d| d.id.is_some()));
    }

    #[tokio::test]
    async fn update_requires_existing_id() {
        let store = MemoryStore::<Suggestion>::new();
        assert_eq!(
            store.update(suggestion("x")).await,
            Err(GatewayError::MissingId)
        );

        let mut ghost = suggestion("x");
        ghost.id = Some("ghost".to_string());
        assert_eq!(
            store.update(ghost).await,
            Err(GatewayError::NotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn injected_failure_hits_only_next_write() {
        let store = MemoryStore::<Suggestion>::new();
        store.fail_next_write("offline");

        assert_eq!(
            store.submit(suggestion("a")).await,
            Err(GatewayError::Transport("offline".to_string()))
        );
        assert!(store.submit(suggestion("a")).await.is_ok());
        assert_eq!(store.documents().len(), 1);
    }
}
