//! End-to-end tests against an in-process stub of the query engine backend

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nlqe::api::HttpTransport;
use nlqe::model::{ConnectOutcome, JobId, JobState, StatusOutcome, UploadOutcome, DEMO_CONNECTION};
use nlqe::orchestrator::{Action, Orchestrator, Update};
use nlqe::session::IngestStatus;
use nlqe::shape::{RenderModel, ResultShaper};
use nlqe::{ConnectionClient, IngestionClient, QueryClient};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// One multipart part as the stub saw it
#[derive(Debug, Clone, PartialEq)]
struct ReceivedPart {
    field: String,
    file_name: String,
    len: usize,
}

#[derive(Default)]
struct Stub {
    parts: Mutex<Vec<ReceivedPart>>,
}

async fn schema(Json(body): Json<Value>) -> Json<Value> {
    let conn = body["connection_string"].as_str().unwrap_or_default();
    if conn.starts_with("sqlite") {
        Json(json!({
            "ok": true,
            "schema": {"tables": {"employees": {"columns": ["name", "skill", "department"]}}}
        }))
    } else {
        Json(json!({"ok": false, "error": format!("unsupported connection string: {}", conn)}))
    }
}

async fn upload(State(stub): State<Arc<Stub>>, mut multipart: Multipart) -> Json<Value> {
    let mut count = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        stub.parts.lock().unwrap().push(ReceivedPart {
            field: name,
            file_name,
            len: bytes.len(),
        });
        count += 1;
    }
    Json(json!({"job_id": "job-1", "files_processed": count}))
}

async fn status(Path(job_id): Path<String>) -> Json<Value> {
    Json(json!({
        "job_id": job_id,
        "status": {"total": 2, "processed": 2, "vectors": 14, "errors": 0, "done": true}
    }))
}

async fn query(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let text = body["query"].as_str().unwrap_or_default().to_string();
    if text == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "engine exploded"})));
    }
    if text.contains("Python") {
        return (
            StatusCode::OK,
            Json(json!({
                "query": text,
                "type": "sql",
                "results": [{"name": "Ann", "skill": "Python"}],
                "metrics": {"count": 1}
            })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "query": text,
            "type": "document",
            "docs": [{"score": 0.87, "source": "resume_ann.pdf", "text": "x".repeat(500)}]
        })),
    )
}

async fn history() -> Json<Value> {
    Json(json!([{"q": "count employees", "type": "sql", "time": 0.02}]))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn spawn_stub() -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub::default());
    let app = Router::new()
        .route("/api/schema/database", post(schema))
        .route("/api/ingest/documents", post(upload))
        .route("/api/ingest/status/{job_id}", get(status))
        .route("/api/query", post(query))
        .route("/api/query/history", get(history))
        .route("/health", get(health))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), stub)
}

fn transport(base_url: &str) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(base_url).unwrap())
}

/// A base URL nothing listens on
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_connect_discovers_schema() {
    let (base, _) = spawn_stub().await;
    let client = ConnectionClient::new(transport(&base));

    let outcome = client.connect(DEMO_CONNECTION).await;
    let schema = outcome.schema().expect("schema");
    assert!(schema["tables"]["employees"].is_object());
    assert_eq!(outcome.message(), "Schema discovered");
}

#[tokio::test]
async fn test_connect_without_schema_carries_reason() {
    let (base, _) = spawn_stub().await;
    let client = ConnectionClient::new(transport(&base));

    let outcome = client.connect("oracle://nowhere").await;
    assert_eq!(
        outcome,
        ConnectOutcome::NoSchema {
            reason: Some("unsupported connection string: oracle://nowhere".to_string())
        }
    );
}

#[tokio::test]
async fn test_upload_sends_every_file_under_files_field() {
    let (base, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.csv");
    std::fs::write(&a, "Ann knows Python").unwrap();
    std::fs::write(&b, "name,skill\nAnn,Python\n").unwrap();

    let client = IngestionClient::new(transport(&base));
    let outcome = client.upload_paths(&[a, b]).await;

    assert_eq!(
        outcome,
        UploadOutcome::Created {
            job: JobId::new("job-1"),
            files_processed: Some(2)
        }
    );

    let parts = stub.parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|p| p.field == "files"));
    assert_eq!(parts[0].file_name, "a.txt");
    assert_eq!(parts[0].len, "Ann knows Python".len());
    assert_eq!(parts[1].file_name, "b.csv");
}

#[tokio::test]
async fn test_poll_status_decodes_counters() {
    let (base, _) = spawn_stub().await;
    let client = IngestionClient::new(transport(&base));

    let StatusOutcome::Report { report } = client.poll_status(&JobId::new("job-1")).await else {
        panic!("expected a status report");
    };
    assert_eq!(report.state, JobState::Completed);
    let progress = report.progress.expect("progress counters");
    assert_eq!(progress.processed, 2);
    assert_eq!(progress.vectors, 14);
}

#[tokio::test]
async fn test_job_id_is_sent_as_one_path_segment() {
    let (base, _) = spawn_stub().await;
    let client = IngestionClient::new(transport(&base));

    let StatusOutcome::Report { report } = client.poll_status(&JobId::new("a/b c")).await else {
        panic!("expected a status report");
    };
    assert_eq!(report.raw["job_id"], "a/b c");
}

#[tokio::test]
async fn test_structured_query_scenario() {
    let (base, _) = spawn_stub().await;
    let client = QueryClient::new(transport(&base));

    let result = client.run("Show me all Python developers in Engineering").await;
    assert!(!result.is_error());

    let RenderModel::Normal(view) = ResultShaper::shape(&result) else {
        panic!("expected a normal view");
    };
    assert_eq!(view.query.as_deref(), Some("Show me all Python developers in Engineering"));
    assert_eq!(view.kind.as_deref(), Some("sql"));
    assert_eq!(view.metrics.as_deref(), Some(r#"{"count":1}"#));
    assert_eq!(view.columns, vec!["name", "skill"]);
    assert_eq!(view.rows, vec![vec!["Ann".to_string(), "Python".to_string()]]);
    assert!(view.doc_hits.is_empty());
}

#[tokio::test]
async fn test_document_query_truncates_text() {
    let (base, _) = spawn_stub().await;
    let client = QueryClient::new(transport(&base));

    let result = client.run("who has worked with vector stores").await;
    let RenderModel::Normal(view) = ResultShaper::shape(&result) else {
        panic!("expected a normal view");
    };
    assert!(!view.has_table());
    assert_eq!(view.doc_hits.len(), 1);

    let hit = &view.doc_hits[0];
    assert_eq!(hit.score, "0.870");
    assert_eq!(hit.source, "resume_ann.pdf");
    assert!(hit.truncated);
    assert_eq!(hit.text.chars().count(), 403);
    assert!(hit.text.ends_with("..."));
}

#[tokio::test]
async fn test_error_body_on_server_error_is_shown() {
    let (base, _) = spawn_stub().await;
    let client = QueryClient::new(transport(&base));

    let result = client.run("boom").await;
    assert_eq!(result.error.as_deref(), Some("engine exploded"));
    assert_eq!(
        ResultShaper::shape(&result),
        RenderModel::Error {
            message: "engine exploded".to_string()
        }
    );
}

#[tokio::test]
async fn test_orchestrator_full_session() {
    let (base, _) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("resume.txt");
    std::fs::write(&doc, "Ann, Python, Engineering").unwrap();

    let mut orch = Orchestrator::new(transport(&base));

    let update = orch.perform(Action::Connect(DEMO_CONNECTION.to_string())).await;
    assert!(matches!(update, Update::Schema(ConnectOutcome::Schema { .. })));

    let update = orch.perform(Action::Upload(vec![doc])).await;
    assert!(matches!(update, Update::Uploaded(UploadOutcome::Created { .. })));
    assert_eq!(orch.session().job, Some(JobId::new("job-1")));

    let update = orch.perform(Action::PollStatus).await;
    let Update::Status(IngestStatus::Polled(outcome)) = update else {
        panic!("expected a polled status, got {:?}", update);
    };
    assert!(!outcome.is_active());

    let update = orch
        .perform(Action::Query {
            text: "Show me all Python developers in Engineering".to_string(),
            replace: false,
        })
        .await;
    let Update::Result(RenderModel::Normal(view)) = update else {
        panic!("expected a result, got {:?}", update);
    };
    assert_eq!(view.columns, vec!["name", "skill"]);
    assert!(orch.session().connection.get().is_some());
    assert!(orch.session().render_model().is_some());

    let update = orch.perform(Action::History).await;
    let Update::History(entries) = update else {
        panic!("expected history, got {:?}", update);
    };
    assert_eq!(entries[0].q, "count employees");

    let update = orch.perform(Action::Health).await;
    assert_eq!(update, Update::Health(json!({"status": "ok"})));
}

#[tokio::test]
async fn test_unreachable_backend_degrades_gracefully() {
    let base = closed_port().await;
    let transport = transport(&base);

    let outcome = ConnectionClient::new(transport.clone()).connect(DEMO_CONNECTION).await;
    assert!(outcome.is_failure());
    assert!(outcome.message().starts_with("Error: "));

    let result = QueryClient::new(transport.clone()).run("anything").await;
    assert!(result.is_error());
    assert!(ResultShaper::shape(&result).is_error());

    let mut orch = Orchestrator::new(transport);
    let update = orch.perform(Action::Health).await;
    assert!(matches!(update, Update::Failed { .. }));
    assert_eq!(orch.outstanding(), 0);
}
