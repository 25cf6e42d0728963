//! JSON bodies exchanged with the `/ask` endpoint.

use serde::{Deserialize, Serialize};

/// Path of the question-answering endpoint, relative to the base URL.
pub const ASK_PATH: &str = "ask";

/// Client → server: `{"question": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

impl<'a> AskRequest<'a> {
    pub fn new(question: &'a str) -> Self {
        Self { question }
    }
}

/// Server → client: `{"response": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

impl AskResponse {
    /// Parse a response body. Anything other than an object with a string
    /// `response` field is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
