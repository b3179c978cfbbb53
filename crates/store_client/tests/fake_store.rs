use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use api_types::suggestion::Suggestion;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use engine::{
    Clock, Gateway, GatewayError, Holder, HolderOptions, LoadResult, LoadStream, Session,
    Submission, SubmitGateway, SuggestionDraft, SuggestionEdit, UpdateGateway, User,
};
use serde_json::{Value, json};
use store_client::DocumentStoreClient;

#[derive(Default)]
struct FakeStore {
    collections: HashMap<String, Vec<Value>>,
    next_id: u32,
    failing: bool,
}

type Shared = Arc<Mutex<FakeStore>>;
type ErrorReply = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> ErrorReply {
    (status, Json(json!({ "error": message })))
}

async fn list(
    State(store): State<Shared>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<Value>>, ErrorReply> {
    let store = store.lock().unwrap();
    if store.failing {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "database offline"));
    }
    Ok(Json(
        store.collections.get(&collection).cloned().unwrap_or_default(),
    ))
}

async fn create(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    Json(mut document): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut store = store.lock().unwrap();
    store.next_id += 1;
    let id = format!("doc-{}", store.next_id);
    document["id"] = json!(id);
    store
        .collections
        .entry(collection)
        .or_default()
        .push(document);
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

async fn replace(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    Json(document): Json<Value>,
) -> Result<StatusCode, ErrorReply> {
    let mut store = store.lock().unwrap();
    let slot = store
        .collections
        .get_mut(&collection)
        .and_then(|documents| documents.iter_mut().find(|d| d["id"] == json!(id)));
    match slot {
        Some(slot) => {
            *slot = document;
            Ok(StatusCode::OK)
        }
        None => Err(error(StatusCode::NOT_FOUND, "no such document")),
    }
}

async fn spawn_store() -> (DocumentStoreClient, Shared) {
    let store = Shared::default();
    let app = Router::new()
        .route(
            "/collections/{collection}/documents",
            get(list).post(create),
        )
        .route("/collections/{collection}/documents/{id}", put(replace))
        .with_state(Arc::clone(&store));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let client = DocumentStoreClient::new(&format!("http://{addr}"))
        .unwrap()
        .with_poll_interval(Duration::from_millis(20));
    (client, store)
}

fn suggestion(subject: &str) -> Suggestion {
    Suggestion {
        subject: Some(subject.to_string()),
        body: Some("more details".to_string()),
        submitted_by: Some("jane@si2g.fr".to_string()),
        ..Default::default()
    }
}

async fn next<T>(stream: &mut LoadStream<T>) -> LoadResult<T> {
    tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn created_documents_are_listed_with_their_id() {
    let (client, _store) = spawn_store().await;
    let suggestions = client.collection::<Suggestion>();

    let id = suggestions.submit(suggestion("Dark mode")).await.unwrap();
    assert_eq!(id, "doc-1");

    let listed = suggestions.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id.as_deref(), Some("doc-1"));
    assert_eq!(listed[0].subject.as_deref(), Some("Dark mode"));
}

#[tokio::test]
async fn updates_replace_the_stored_document() {
    let (client, _store) = spawn_store().await;
    let suggestions = client.collection::<Suggestion>();
    let id = suggestions.submit(suggestion("Dark mode")).await.unwrap();

    let mut changed = suggestion("Dark mode everywhere");
    changed.id = Some(id);
    suggestions.update(changed).await.unwrap();

    let listed = suggestions.list().await.unwrap();
    assert_eq!(listed[0].subject.as_deref(), Some("Dark mode everywhere"));
}

#[tokio::test]
async fn updating_an_unknown_document_reports_not_found() {
    let (client, _store) = spawn_store().await;
    let suggestions = client.collection::<Suggestion>();

    let mut ghost = suggestion("ghost");
    ghost.id = Some("missing".to_string());
    assert_eq!(
        suggestions.update(ghost).await,
        Err(GatewayError::NotFound("missing".to_string()))
    );
    assert_eq!(
        suggestions.update(suggestion("no id")).await,
        Err(GatewayError::MissingId)
    );
}

#[tokio::test]
async fn observation_emits_only_changes() {
    let (client, _store) = spawn_store().await;
    let suggestions = client.collection::<Suggestion>();
    let mut stream = suggestions.observe_all();

    assert_eq!(next(&mut stream).await, LoadResult::Loading);
    assert_eq!(next(&mut stream).await, LoadResult::Success(Vec::new()));

    suggestions.submit(suggestion("Dark mode")).await.unwrap();
    match next(&mut stream).await {
        LoadResult::Success(list) => assert_eq!(list.len(), 1),
        other => panic!("unexpected emission: {other:?}"),
    }
}

#[tokio::test]
async fn observation_reports_failures_and_recovers() {
    let (client, store) = spawn_store().await;
    store.lock().unwrap().failing = true;
    let mut stream = client.collection::<Suggestion>().observe_all();

    assert_eq!(next(&mut stream).await, LoadResult::Loading);
    match next(&mut stream).await {
        LoadResult::Failed(message) => assert!(message.contains("database offline")),
        other => panic!("unexpected emission: {other:?}"),
    }

    store.lock().unwrap().failing = false;
    assert_eq!(next(&mut stream).await, LoadResult::Success(Vec::new()));
}

#[tokio::test]
async fn holder_submits_through_the_http_store() {
    let (client, _store) = spawn_store().await;
    let session = Session::new(User {
        id: Some("u1".to_string()),
        mail: "jane@si2g.fr".to_string(),
        academy: Some("Lyon".to_string()),
        ..Default::default()
    })
    .with_clock(Clock::System);
    let mut holder = Holder::<SuggestionDraft, _>::new(
        Arc::new(client.collection::<Suggestion>()),
        session,
        HolderOptions {
            loading_delay: Duration::ZERO,
            ..Default::default()
        },
    );

    holder.on_field_change(SuggestionEdit::Subject("Offline mode".to_string()));
    holder.on_field_change(SuggestionEdit::Body("Cache the lists".to_string()));
    assert_eq!(holder.on_submit(), Submission::Started);

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        holder.wait_for(|s| s.list.loaded.len() == 1 && !s.form.submit.is_loading),
    )
    .await
    .unwrap();
    assert_eq!(state.form.submit.last_written.as_deref(), Some("doc-1"));
    assert_eq!(
        state.list.loaded[0].academy.as_deref(),
        Some("Lyon")
    );
}
