use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Remove every markdown code-fence marker (```` ```json ```` and ```` ``` ````) and trim.
///
/// Markers are removed wherever they occur, not just at the ends of the text.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Decode `text` as a JSON array of `T`, falling back to a single `T`.
///
/// The array attempt always runs first. Its error is dropped once the
/// fallback is tried; only the single-object error is returned.
#[instrument(target = "vocab_tutor::quiz", skip(text), fields(text_len = text.len()))]
pub fn decode_one_or_many<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, serde_json::Error> {
    match serde_json::from_str::<Vec<T>>(text) {
        Ok(items) => {
            debug!(target: "vocab_tutor::quiz", count = items.len(), "decoded array form");
            Ok(items)
        }
        Err(array_err) => {
            debug!(target: "vocab_tutor::quiz", error = %array_err, "array decode failed, trying single object");
            let item = serde_json::from_str::<T>(text)?;
            Ok(vec![item])
        }
    }
}

/// Strip fences, then decode one-or-many.
pub fn extract_all<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, serde_json::Error> {
    decode_one_or_many(&strip_code_fences(text))
}
