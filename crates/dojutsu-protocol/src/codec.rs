//! Tokio codec for request/response envelopes
//!
//! Framing is delegated to the connection lifecycle: the encoder emits the
//! bare JSON object and the decoder only produces a response once the peer
//! has signalled end-of-stream.

use bytes::BytesMut;
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder};

use crate::envelope::{Request, Response, ERROR_FIELD};
use crate::error::ProtocolError;

/// How much of an undecodable payload is echoed back in the error message
const PREVIEW_LEN: usize = 200;

/// Codec for encoding requests and decoding responses
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeCodec;

impl EnvelopeCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self
    }
}

impl<'a> Encoder<&'a Request> for EnvelopeCodec {
    type Error = ProtocolError;

    fn encode(&mut self, request: &'a Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = serde_json::to_vec(request)?;
        dst.reserve(payload.len());
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

impl Decoder for EnvelopeCodec {
    type Item = Response;
    type Error = ProtocolError;

    fn decode(&mut self, _src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // A response is only complete once the peer closes its side
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let payload = src.split();
        decode_response(&payload).map(Some)
    }
}

/// Decode a complete response payload
///
/// Fails with [`ProtocolError::MalformedResponse`] if the payload is empty,
/// is not a JSON object, carries a non-string `error`, or has neither result
/// fields nor an error.
pub fn decode_response(bytes: &[u8]) -> Result<Response, ProtocolError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::malformed("empty response from daemon"));
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        ProtocolError::malformed(format!("{} (raw: {})", e, preview(bytes)))
    })?;

    let mut fields = match value {
        Value::Object(map) => map,
        other => {
            return Err(ProtocolError::malformed(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    let error = match fields.remove(ERROR_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(message)) if message.is_empty() => None,
        Some(Value::String(message)) => Some(message),
        Some(other) => {
            return Err(ProtocolError::malformed(format!(
                "`{}` field must be a string, got {}",
                ERROR_FIELD,
                json_type(&other)
            )))
        }
    };

    if fields.is_empty() && error.is_none() {
        return Err(ProtocolError::malformed(
            "response carries neither result fields nor an error",
        ));
    }

    tracing::trace!(
        fields = fields.len(),
        has_error = error.is_some(),
        "Decoded response envelope"
    );

    Ok(Response::new(fields, error))
}

fn preview(bytes: &[u8]) -> String {
    let end = bytes.len().min(PREVIEW_LEN);
    let mut text = String::from_utf8_lossy(&bytes[..end]).into_owned();
    if bytes.len() > PREVIEW_LEN {
        text.push_str("...");
    }
    text
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn malformed(bytes: &[u8]) -> String {
        match decode_response(bytes) {
            Err(ProtocolError::MalformedResponse(reason)) => reason,
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_writes_bare_object() {
        let mut codec = EnvelopeCodec::new();
        let req = Request::new("dojutsu-agent", "version", Vec::<String>::new()).unwrap();

        let mut buf = BytesMut::new();
        codec.encode(&req, &mut buf).unwrap();

        assert_eq!(buf.as_ref(), req.to_bytes().as_slice());
        assert_eq!(buf.first(), Some(&b'{'));
        assert_eq!(buf.last(), Some(&b'}'));
    }

    #[test]
    fn test_decode_waits_for_eof() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::from(&br#"{"count": 42}"#[..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(!buf.is_empty());

        let resp = codec.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(resp.get_u64("count"), Some(42));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_on_empty_buffer_is_malformed() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::new();
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(ProtocolError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_preserves_result_fields() {
        let service_reply = json!({
            "byakugan": "1. Router\n2. Auth middleware",
            "mode_sage": "plan",
            "jougan": "review",
            "execution": "fn main() {}",
            "skills_used": ["rust-axum", "jwt"],
            "timing": {"byakugan": 1.5, "execution": 8.25},
            "total_time": 9.75,
        });
        let bytes = serde_json::to_vec(&service_reply).unwrap();

        let resp = decode_response(&bytes).unwrap();
        assert!(!resp.is_error());
        assert_eq!(
            serde_json::to_value(resp.fields()).unwrap(),
            service_reply
        );
    }

    #[test]
    fn test_decode_extracts_error() {
        let resp =
            decode_response(br#"{"error": "provider unreachable", "execution": "partial"}"#)
                .unwrap();
        assert_eq!(resp.error(), Some("provider unreachable"));
        assert!(resp.get("error").is_none());
        assert_eq!(resp.get_str("execution"), Some("partial"));
    }

    #[test]
    fn test_decode_tolerates_trailing_newline() {
        let resp = decode_response(b"{\"count\": 7}\n").unwrap();
        assert_eq!(resp.get_u64("count"), Some(7));
    }

    #[test]
    fn test_decode_rejects_empty_and_whitespace() {
        assert!(malformed(b"").contains("empty"));
        assert!(malformed(b" \n\t").contains("empty"));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let reason = malformed(br#"{"byakugan": "struct"#);
        assert!(reason.contains("raw:"));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(malformed(b"[1, 2, 3]").contains("an array"));
        assert!(malformed(b"\"ok\"").contains("a string"));
    }

    #[test]
    fn test_decode_rejects_object_without_content() {
        assert!(malformed(b"{}").contains("neither"));
        assert!(malformed(br#"{"error": ""}"#).contains("neither"));
        assert!(malformed(br#"{"error": null}"#).contains("neither"));
    }

    #[test]
    fn test_decode_rejects_non_string_error() {
        assert!(malformed(br#"{"error": 500}"#).contains("a number"));
    }

    #[test]
    fn test_preview_is_bounded() {
        let long = vec![b'x'; PREVIEW_LEN * 2];
        let text = preview(&long);
        assert_eq!(text.len(), PREVIEW_LEN + 3);
        assert!(text.ends_with("..."));
    }
}
