//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

pub enum BackendCommand {
    UploadPdf {
        path: PathBuf,
        collection: Option<String>,
    },
    Search {
        question: String,
        top_k: u32,
    },
    Grade {
        question: String,
        student_answer: String,
        lecture_snippet: Option<String>,
    },
    Evaluate {
        prompt: String,
    },
}
