use serde::{Deserialize, Serialize};

/// Body of a POST to `<base>/apps/<app_id>/completion`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub input: CompletionInput,
    pub parameters: CompletionParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionInput {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionParameters {
    pub incremental_output: bool,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            input: CompletionInput { prompt: prompt.into(), session_id },
            parameters: CompletionParameters { incremental_output: false },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub output: CompletionOutput,
}

#[derive(Debug, Deserialize)]
pub struct CompletionOutput {
    pub text: String,
    // Anything but a string here is ignored rather than failing the decode.
    #[serde(default)]
    session_id: Option<serde_json::Value>,
}

impl CompletionOutput {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_ref().and_then(|v| v.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
