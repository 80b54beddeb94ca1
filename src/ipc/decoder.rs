//! Best-effort decoding of editor replies.
//!
//! The plugin's replies are not reliably well-formed: they may be wrapped in
//! extra quotes, carry stray `\'` escapes, be cut short by the single read,
//! or contain invalid UTF-8. Decoding never fails; anything that cannot be
//! recovered becomes a [`BridgeError::MalformedReply`] carrying the most
//! useful text available.

use serde_json::Value;

use crate::reply::{BridgeError, Reply};

/// Characters trimmed from both ends of a reply.
const WRAPPING_CHARS: &[char] = &['\'', '"', '\n', '\r'];

/// Escape sequence dropped from the reply body.
const ESCAPED_SINGLE_QUOTE: &str = "\\'";

/// Intermediate texts of the normalization pipeline, kept for diagnostics.
struct Stages<'a> {
    decoded: &'a str,
    stripped: &'a str,
    unescaped: String,
}

impl<'a> Stages<'a> {
    fn new(decoded: &'a str) -> Self {
        let stripped = decoded.trim_matches(WRAPPING_CHARS);
        Self {
            decoded,
            stripped,
            unescaped: stripped.replace(ESCAPED_SINGLE_QUOTE, ""),
        }
    }

    /// First non-empty stage, latest first, else the parser's own message.
    fn diagnostic(&self, parse_error: &serde_json::Error) -> String {
        if !self.unescaped.is_empty() {
            self.unescaped.clone()
        } else if !self.stripped.is_empty() {
            self.stripped.to_string()
        } else if !self.decoded.is_empty() {
            self.decoded.to_string()
        } else {
            parse_error.to_string()
        }
    }
}

/// Apply the reply normalization to already-decoded text.
///
/// Trims `'`, `"`, `\n` and `\r` from both ends, then removes every `\'`.
pub fn normalize(decoded: &str) -> String {
    Stages::new(decoded).unescaped
}

/// Decode raw reply bytes into a [`Reply`].
///
/// Pure: the same bytes always give the same reply.
pub fn decode(raw: &[u8]) -> Reply {
    let decoded = String::from_utf8_lossy(raw);
    let stages = Stages::new(&decoded);

    match serde_json::from_str::<Value>(&stages.unescaped) {
        Ok(value) => Reply::from_value(value),
        Err(e) => match parse_escaped_body(&stages.unescaped) {
            Some(value) => Reply::from_value(value),
            None => {
                tracing::debug!("Reply failed to parse ({} bytes): {}", raw.len(), e);
                Reply::Error(BridgeError::MalformedReply {
                    diagnostic: stages.diagnostic(&e),
                })
            }
        },
    }
}

/// Parse text that is the body of a JSON string literal holding a document,
/// e.g. `{\"status\": \"success\"}` once its outer quotes were trimmed.
fn parse_escaped_body(text: &str) -> Option<Value> {
    if !text.contains("\\\"") {
        return None;
    }
    let inner: String = serde_json::from_str(&format!("\"{text}\"")).ok()?;
    serde_json::from_str(&inner).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plain_success() {
        let reply = decode(br#"{"status":"success","result":[]}"#);
        assert_eq!(reply, Reply::Success(json!([])));
    }

    #[test]
    fn test_wrapped_in_quotes_and_newlines() {
        let reply = decode(b"'{\"status\": \"success\", \"result\": \"ok\"}'\r\n");
        assert_eq!(reply, Reply::Success(json!("ok")));
    }

    #[test]
    fn test_escaped_single_quotes_removed() {
        let reply = decode(br#""{"status": "success", "result": "Actor\'s mesh"}""#);
        assert_eq!(reply, Reply::Success(json!("Actors mesh")));
    }

    #[test]
    fn test_string_literal_wrapped_document() {
        let raw = br#""{\"status\": \"success\", \"result\": \"ok\"}""#;
        assert_eq!(decode(raw), Reply::Success(json!("ok")));
    }

    #[test]
    fn test_truncated_reply_reports_decoded_text() {
        let raw = br#"{"status": "success", "result": [{"name": "Flo"#;
        let reply = decode(raw);
        assert_eq!(
            reply,
            Reply::Error(BridgeError::MalformedReply {
                diagnostic: String::from_utf8_lossy(raw).into_owned(),
            })
        );
    }

    #[test]
    fn test_diagnostic_prefers_unescaped_text() {
        let reply = decode(b"\"not json\\' at all\"");
        assert_eq!(reply.message().as_deref(), Some("not json at all"));
    }

    #[test]
    fn test_quotes_only_falls_back_to_decoded_text() {
        // Everything is stripped, so the raw decoded text is the best we have.
        let reply = decode(b"\"\"\r\n");
        assert_eq!(reply.message().as_deref(), Some("\"\"\r\n"));
    }

    #[test]
    fn test_empty_reply_uses_parser_message() {
        let reply = decode(b"");
        let message = reply.message().unwrap();
        assert!(
            message.contains("EOF"),
            "Expected parser EOF message, got: {}",
            message
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut raw = br#"{"status": "success", "result": "a"#.to_vec();
        raw.push(0xFF);
        raw.extend_from_slice(br#"b"}"#);
        assert_eq!(decode(&raw), Reply::Success(json!("a\u{FFFD}b")));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let raw = b"{\"status\": \"err";
        assert_eq!(decode(raw), decode(raw));
    }

    #[test]
    fn test_remote_error_passes_through() {
        let reply = decode(br#"{"status": "error", "message": "No actor named Cube"}"#);
        match reply {
            Reply::Error(BridgeError::Remote { message, payload, .. }) => {
                assert_eq!(message, "No actor named Cube");
                assert_eq!(payload["status"], "error");
            }
            other => panic!("Expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("'\"{}\"'\n"), "{}");
        assert_eq!(normalize(r#"{"a": "b\'c"}"#), r#"{"a": "bc"}"#);
        // interior whitespace and quotes are untouched
        assert_eq!(normalize(" \"x\" "), " \"x\" ");
    }
}
