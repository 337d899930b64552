use super::*;
use anyhow::Result;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

async fn spawn_backend(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

#[derive(Clone)]
struct CaptureState<T> {
    tx: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> CaptureState<T> {
    fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    async fn capture(&self, value: T) {
        if let Some(tx) = self.tx.lock().await.take() {
            let _ = tx.send(value);
        }
    }
}

#[tokio::test]
async fn search_decodes_hits_in_backend_order() {
    let router = Router::new().route(
        "/api/search",
        post(|| async {
            Json(json!({
                "question": "what is entropy",
                "results": [
                    {"score": 0.91, "payload": {"text": "A", "source": "thermo", "page": "page_1", "chunk_id": 0}},
                    {"score": 0.77, "payload": {"text": "B", "source": "thermo", "page": "page_2", "chunk_id": 3}}
                ]
            }))
        }),
    );
    let server_url = spawn_backend(router).await.expect("spawn server");

    let client = CoachClient::new(server_url);
    let response = client.search("what is entropy", 3).await.expect("search");

    assert_eq!(response.question.as_deref(), Some("what is entropy"));
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].payload.text, "A");
    assert_eq!(response.results[1].payload.text, "B");
}

#[tokio::test]
async fn search_posts_question_and_top_k() {
    let (state, payload_rx) = CaptureState::<SearchRequest>::new();
    let router = Router::new()
        .route(
            "/api/search",
            post(
                |State(state): State<CaptureState<SearchRequest>>, Json(body): Json<SearchRequest>| async move {
                    state.capture(body).await;
                    Json(json!({"question": "q", "results": []}))
                },
            ),
        )
        .with_state(state);
    let server_url = spawn_backend(router).await.expect("spawn server");

    let client = CoachClient::new(server_url);
    client.search("what is entropy", 7).await.expect("search");

    let payload = payload_rx.await.expect("payload");
    assert_eq!(payload.question, "what is entropy");
    assert_eq!(payload.top_k, 7);
}

#[tokio::test]
async fn grade_surfaces_detail_from_unprocessable_entity() {
    let router = Router::new().route(
        "/api/grade",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": "answer too short"})),
            )
        }),
    );
    let server_url = spawn_backend(router).await.expect("spawn server");

    let client = CoachClient::new(server_url);
    let request = GradeRequest {
        question: "Q".to_string(),
        student_answer: "A".to_string(),
        lecture_snippet: None,
    };
    let err = client.grade(&request).await.expect_err("must fail");

    assert!(err.is_remote());
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.to_string(), "answer too short");
}

#[tokio::test]
async fn remote_message_falls_back_to_message_field() {
    let router = Router::new().route(
        "/api/evaluate",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "model not loaded"})),
            )
        }),
    );
    let server_url = spawn_backend(router).await.expect("spawn server");

    let err = CoachClient::new(server_url)
        .evaluate("p")
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "model not loaded");
}

#[tokio::test]
async fn remote_message_uses_raw_body_for_non_json_errors() {
    let router = Router::new().route(
        "/api/evaluate",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream gateway unavailable") }),
    );
    let server_url = spawn_backend(router).await.expect("spawn server");

    let err = CoachClient::new(server_url)
        .evaluate("p")
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "upstream gateway unavailable");
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn remote_message_formats_status_for_empty_body() {
    let router = Router::new().route(
        "/api/grade",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let server_url = spawn_backend(router).await.expect("spawn server");

    let request = GradeRequest {
        question: "Q".to_string(),
        student_answer: "A".to_string(),
        lecture_snippet: Some("snippet".to_string()),
    };
    let err = CoachClient::new(server_url)
        .grade(&request)
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "status 500");
}

#[tokio::test]
async fn mismatched_success_body_is_a_decode_error_not_remote() {
    let router = Router::new().route("/api/search", post(|| async { "ready" }));
    let server_url = spawn_backend(router).await.expect("spawn server");

    let err = CoachClient::new(server_url)
        .search("q", 1)
        .await
        .expect_err("must fail");
    assert!(!err.is_remote());
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[derive(Clone, Debug, Default)]
struct ReceivedUpload {
    filename: String,
    content_type: Option<String>,
    size: usize,
    collection: Option<String>,
}

#[tokio::test]
async fn upload_sends_multipart_file_and_collection() {
    let (state, payload_rx) = CaptureState::<ReceivedUpload>::new();
    let router = Router::new()
        .route(
            "/api/upload_pdf",
            post(
                |State(state): State<CaptureState<ReceivedUpload>>, mut multipart: Multipart| async move {
                    let mut received = ReceivedUpload::default();
                    while let Some(field) = multipart.next_field().await.expect("field") {
                        match field.name().unwrap_or_default().to_string().as_str() {
                            "file" => {
                                received.filename =
                                    field.file_name().unwrap_or_default().to_string();
                                received.content_type =
                                    field.content_type().map(|mime| mime.to_string());
                                received.size = field.bytes().await.expect("bytes").len();
                            }
                            "collection" => {
                                received.collection = Some(field.text().await.expect("text"));
                            }
                            _ => {}
                        }
                    }
                    state.capture(received).await;
                    Json(json!({
                        "inserted": 12,
                        "collection": "lectures",
                        "json_path": "data/json/lecture01.json"
                    }))
                },
            ),
        )
        .with_state(state);
    let server_url = spawn_backend(router).await.expect("spawn server");

    let client = CoachClient::new(server_url);
    let response = client
        .upload_pdf(PdfUpload {
            filename: "lecture01.pdf".to_string(),
            mime_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4 fake".to_vec(),
            collection: Some("lectures".to_string()),
        })
        .await
        .expect("upload");

    assert_eq!(response.inserted, 12);
    assert_eq!(response.collection, "lectures");
    assert_eq!(response.json_path, "data/json/lecture01.json");

    let received = payload_rx.await.expect("payload");
    assert_eq!(received.filename, "lecture01.pdf");
    assert_eq!(received.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(received.size, b"%PDF-1.4 fake".len());
    assert_eq!(received.collection.as_deref(), Some("lectures"));
}

#[tokio::test]
async fn evaluate_defaults_missing_result_to_empty() {
    let router = Router::new().route("/api/evaluate", post(|| async { Json(json!({})) }));
    let server_url = spawn_backend(router).await.expect("spawn server");

    let response = CoachClient::new(server_url)
        .evaluate("prompt")
        .await
        .expect("evaluate");
    assert_eq!(response.result, "");
}

#[test]
fn new_trims_trailing_slashes_from_server_url() {
    let client = CoachClient::new("http://127.0.0.1:8000//");
    assert_eq!(client.server_url(), "http://127.0.0.1:8000");
}
