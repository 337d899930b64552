use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One retrieval hit from `/api/search`. The backend is trusted to have
/// ordered hits by relevance; position is the only identity a hit has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Kept as a raw JSON value: the backend has shipped both numeric and
    /// string scores, and the UI renders whatever arrives.
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub payload: HitPayload,
}

/// Chunk metadata stored alongside each indexed unit of lecture text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Page keys come back as strings ("page_3"), older collections used
    /// plain numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub inserted: u64,
    pub collection: String,
    pub json_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub question: String,
    pub top_k: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    pub question: String,
    pub student_answer: String,
    /// Serialized as an explicit `null` when absent; the grader treats
    /// missing context differently from empty context.
    pub lecture_snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResponse {
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    #[serde(default)]
    pub result: String,
}
