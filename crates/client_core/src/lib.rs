use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::remote_error_message,
    protocol::{
        EvaluateRequest, EvaluateResponse, GradeRequest, GradeResponse, SearchRequest,
        SearchResponse, UploadResponse,
    },
};
use tracing::debug;

pub mod error;
pub use error::ClientError;

/// A PDF selected for ingestion, read into memory by the caller.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Optional target collection name; the backend falls back to its
    /// configured default when absent.
    pub collection: Option<String>,
}

/// The four backend operations the UI drives. A seam so the GUI bridge can
/// run against a stub in tests.
#[async_trait]
pub trait CoachApi: Send + Sync {
    async fn upload_pdf(&self, upload: PdfUpload) -> Result<UploadResponse, ClientError>;
    async fn search(&self, question: &str, top_k: u32) -> Result<SearchResponse, ClientError>;
    async fn grade(&self, request: &GradeRequest) -> Result<GradeResponse, ClientError>;
    async fn evaluate(&self, prompt: &str) -> Result<EvaluateResponse, ClientError>;
}

/// HTTP client for the RAG coach backend. Every call is a single attempt:
/// no retries, no timeouts, no cancellation.
pub struct CoachClient {
    http: Client,
    server_url: String,
}

impl CoachClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let mut server_url = server_url.into();
        while server_url.ends_with('/') {
            server_url.pop();
        }
        Self {
            http: Client::new(),
            server_url,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "posting json request");
        let response = self
            .http
            .post(format!("{}{path}", self.server_url))
            .json(body)
            .send()
            .await?;
        decode_response(response).await
    }
}

#[async_trait]
impl CoachApi for CoachClient {
    async fn upload_pdf(&self, upload: PdfUpload) -> Result<UploadResponse, ClientError> {
        let PdfUpload {
            filename,
            mime_type,
            bytes,
            collection,
        } = upload;
        debug!(filename, size = bytes.len(), "uploading pdf");

        let mut file_part = multipart::Part::bytes(bytes).file_name(filename);
        if let Some(mime) = &mime_type {
            file_part = file_part.mime_str(mime)?;
        }
        let mut form = multipart::Form::new().part("file", file_part);
        if let Some(collection) = collection {
            form = form.text("collection", collection);
        }

        let response = self
            .http
            .post(format!("{}/api/upload_pdf", self.server_url))
            .multipart(form)
            .send()
            .await?;
        decode_response(response).await
    }

    async fn search(&self, question: &str, top_k: u32) -> Result<SearchResponse, ClientError> {
        self.post_json(
            "/api/search",
            &SearchRequest {
                question: question.to_string(),
                top_k,
            },
        )
        .await
    }

    async fn grade(&self, request: &GradeRequest) -> Result<GradeResponse, ClientError> {
        self.post_json("/api/grade", request).await
    }

    async fn evaluate(&self, prompt: &str) -> Result<EvaluateResponse, ClientError> {
        self.post_json(
            "/api/evaluate",
            &EvaluateRequest {
                prompt: prompt.to_string(),
            },
        )
        .await
    }
}

/// Normalizes a response: non-2xx becomes `Remote` with the message resolved
/// from the body, 2xx is parsed into the endpoint's schema, and a body that
/// does not match the schema is `Decode` rather than `Remote`.
async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Remote {
            status: status.as_u16(),
            message: remote_error_message(status.as_u16(), &body),
        });
    }
    serde_json::from_str(&body).map_err(|err| ClientError::Decode {
        reason: err.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
