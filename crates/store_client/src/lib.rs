//! HTTP client of the remote document store.
//!
//! The store exposes every collection under
//! `{base}/collections/{name}/documents`: `GET` lists the documents, `POST`
//! creates one and answers `{"id": ..}`, `PUT .../{id}` replaces one. Errors
//! come back as `{"error": ..}` with a meaningful status code.
//!
//! The store has no push channel, so [`Collection::observe_all`] polls it and
//! only emits when the answer changed.
//!
//!  [`Collection::observe_all`]: engine::Gateway::observe_all

use std::{marker::PhantomData, time::Duration};

use api_types::{DocumentCreated, ErrorBody};
use engine::{
    Gateway, GatewayError, LoadResult, LoadStream, Record, SubmitGateway, UpdateGateway,
};
use reqwest::{Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DocumentStoreClient {
    base_url: Url,
    http: reqwest::Client,
    poll_interval: Duration,
}

impl DocumentStoreClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // `Url::join` replaces the last segment of a base without trailing slash.
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Typed handle on the collection holding `R` documents.
    pub fn collection<R: Record>(&self) -> Collection<R> {
        Collection {
            client: self.clone(),
            _record: PhantomData,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))
    }

    /// Endpoint of one document; the id is percent-encoded as a single segment.
    fn document_endpoint(&self, collection: &str, id: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint(&format!("collections/{collection}/documents"))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .push(id);
        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct Collection<R> {
    client: DocumentStoreClient,
    _record: PhantomData<fn() -> R>,
}

impl<R> Collection<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub async fn list(&self) -> Result<Vec<R>, ClientError> {
        let endpoint = self
            .client
            .endpoint(&format!("collections/{}/documents", R::COLLECTION))?;
        let res = self.client.http.get(endpoint).send().await?;
        read_json(res).await
    }

    pub async fn create(&self, record: &R) -> Result<String, ClientError> {
        let endpoint = self
            .client
            .endpoint(&format!("collections/{}/documents", R::COLLECTION))?;
        let res = self.client.http.post(endpoint).json(record).send().await?;
        Ok(read_json::<DocumentCreated>(res).await?.id)
    }

    pub async fn replace(&self, id: &str, record: &R) -> Result<(), ClientError> {
        let endpoint = self.client.document_endpoint(R::COLLECTION, id)?;
        let res = self.client.http.put(endpoint).json(record).send().await?;
        check_status(res).await.map(|_| ())
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let res = check_status(res).await?;
    Ok(res.json::<T>().await?)
}

async fn check_status(res: Response) -> Result<Response, ClientError> {
    if res.status().is_success() {
        return Ok(res);
    }

    let status = res.status();
    let body = res
        .json::<ErrorBody>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    let err = match status.as_u16() {
        401 => ClientError::Unauthorized,
        403 => ClientError::Forbidden,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(body),
        422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    };
    Err(err)
}

impl<R> Gateway<R> for Collection<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    fn observe_all(&self) -> LoadStream<Vec<R>> {
        let (tx, stream) = LoadStream::channel();
        let collection = self.clone();

        tokio::spawn(async move {
            if !tx.send(LoadResult::Loading).await {
                return;
            }
            let mut ticker = tokio::time::interval(collection.client.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<LoadResult<Vec<R>>> = None;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => break,
                }
                let result = match collection.list().await {
                    Ok(documents) => LoadResult::Success(documents),
                    Err(err) => {
                        tracing::warn!(collection = R::COLLECTION, "poll failed: {err}");
                        LoadResult::Failed(err.to_string())
                    }
                };
                if last.as_ref() == Some(&result) {
                    continue;
                }
                last = Some(result.clone());
                if !tx.send(result).await {
                    break;
                }
            }
            tracing::debug!(collection = R::COLLECTION, "polling stopped");
        });

        stream
    }
}

impl<R> SubmitGateway<R> for Collection<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    async fn submit(&self, record: R) -> Result<String, GatewayError> {
        let id = self.create(&record).await?;
        tracing::debug!(collection = R::COLLECTION, %id, "document created");
        Ok(id)
    }
}

impl<R> UpdateGateway<R> for Collection<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    async fn update(&self, record: R) -> Result<(), GatewayError> {
        let id = record.id().ok_or(GatewayError::MissingId)?.to_string();
        match self.replace(&id, &record).await {
            Ok(()) => {
                tracing::debug!(collection = R::COLLECTION, %id, "document updated");
                Ok(())
            }
            Err(ClientError::NotFound) => Err(GatewayError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let client = DocumentStoreClient::new("http://localhost:8080/api").unwrap();
        let url = client.endpoint("collections/persons/documents").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/collections/persons/documents"
        );
    }

    #[test]
    fn document_id_stays_one_path_segment() {
        let client = DocumentStoreClient::new("http://localhost:8080/api").unwrap();
        let url = client.document_endpoint("bug_tickets", "a/b?c#d").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/collections/bug_tickets/documents/a%2Fb%3Fc%23d"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            DocumentStoreClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let client = DocumentStoreClient::new("http://localhost")
            .unwrap()
            .with_poll_interval(Duration::ZERO);
        assert_eq!(client.poll_interval, MIN_POLL_INTERVAL);
    }
}
