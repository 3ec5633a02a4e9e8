use std::thread;

use futures::channel::oneshot;
use log::{debug, info, warn};
use reqwest::blocking::{Client, multipart};
use serde_json::Value;

use crate::error::SuggestionError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/layout-suggestions";

/// Advisory layout data returned by the suggestion service.
///
/// Kept opaque: the editor only displays it, it never feeds back into the
/// layer model.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSuggestions(Value);

impl LayoutSuggestions {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// Extracts `layout_suggestions` from a response body.
pub fn parse_response(body: &str) -> Result<LayoutSuggestions, SuggestionError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SuggestionError::Malformed(format!("not JSON: {e}")))?;
    match value.get("layout_suggestions") {
        Some(Value::Null) | None => Err(SuggestionError::Malformed(
            "missing `layout_suggestions`".to_owned(),
        )),
        Some(found) => Ok(LayoutSuggestions(found.clone())),
    }
}

/// Uploads auxiliary images to the layout suggestion service.
#[derive(Debug, Clone)]
pub struct SuggestionClient {
    endpoint: String,
}

impl Default for SuggestionClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl SuggestionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Sends the image on a worker thread. The receiver resolves once the
    /// service answered or the call failed; it never blocks the caller.
    pub fn request(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> oneshot::Receiver<Result<LayoutSuggestions, SuggestionError>> {
        let (tx, rx) = oneshot::channel();
        let endpoint = self.endpoint.clone();
        thread::spawn(move || {
            let result = post_image(&endpoint, file_name, bytes);
            if tx.send(result).is_err() {
                debug!("Suggestion result dropped, session no longer listening");
            }
        });
        rx
    }
}

fn post_image(
    endpoint: &str,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<LayoutSuggestions, SuggestionError> {
    info!("Requesting layout suggestions for {file_name} ({} bytes)", bytes.len());
    let part = multipart::Part::bytes(bytes).file_name(file_name);
    let form = multipart::Form::new().part("image", part);
    let response = Client::new().post(endpoint).multipart(form).send()?;
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        warn!("Suggestion service answered {status}");
    }
    parse_response(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, SuggestionError::Malformed(_)));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        assert!(parse_response(r#"{"other": 1}"#).is_err());
        assert!(parse_response(r#"{"layout_suggestions": null}"#).is_err());
        assert!(parse_response("[1, 2]").is_err());
    }

    #[test]
    fn test_suggestions_kept_verbatim() {
        let parsed =
            parse_response(r#"{"layout_suggestions": [{"x": 10, "note": "move left"}]}"#).unwrap();
        assert_eq!(parsed.raw()[0]["x"], 10);
        assert!(parsed.pretty().contains("move left"));
    }
}
