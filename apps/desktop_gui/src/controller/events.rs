//! UI/backend events and error modeling for the desktop app.

use client_core::ClientError;
use shared::protocol::{SearchHit, UploadResponse};

pub enum UiEvent {
    Info(String),
    UploadFinished(UploadResponse),
    SearchFinished {
        /// The echoed question when the backend returned one, otherwise the
        /// question the user submitted.
        question: String,
        hits: Vec<SearchHit>,
    },
    GradeFinished {
        result: String,
    },
    EvaluateFinished {
        result: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Remote,
    Decode,
    Unknown,
}

/// Which form (or startup phase) an error belongs to; decides which result
/// area shows it and which submit control to release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Upload,
    Search,
    Grade,
    Evaluate,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Categories come straight from the typed client error, not from
    /// message sniffing.
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Remote { .. } => UiErrorCategory::Remote,
            ClientError::Decode { .. } => UiErrorCategory::Decode,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            message: message.into(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
