use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::divar::widgets::FieldExt;

const PERMISSIVE_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("token payload is not a JSON object: {0}")]
    InvalidPayload(String),
}

/// Decodes the claims segment of a `header.payload.signature` token. The
/// signature is not checked; the token only carries routing metadata.
pub fn decode_token(token: &str) -> Result<Map<String, Value>, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return Err(TokenError::MalformedToken(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    };

    // standard-alphabet characters are accepted as their URL-safe twins
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = PERMISSIVE_URL_SAFE
        .decode(normalized)
        .map_err(|err| TokenError::MalformedToken(err.to_string()))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TokenError::InvalidPayload(format!(
            "expected object, found {}",
            kind(&other)
        ))),
        Err(err) => Err(TokenError::InvalidPayload(err.to_string())),
    }
}

pub fn external_url(payload: &Map<String, Value>) -> String {
    let record = payload.get("externalUrl").cloned().unwrap_or(Value::Null);
    let scheme = record.str_field("Scheme").unwrap_or("http");
    let host = record.str_field("Host").unwrap_or_default();
    let path = record.str_field("Path").unwrap_or_default();
    let raw_query = record.str_field("RawQuery").unwrap_or_default();

    let mut url = format!("{scheme}://{host}{path}");
    if !raw_query.is_empty() {
        url.push('?');
        url.push_str(raw_query);
    }
    url
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    use super::*;

    pub(crate) fn sign(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn rebuilds_external_url_with_query() {
        let token = sign(&json!({
            "externalUrl": {
                "Scheme": "https",
                "Host": "landing.tapsi.food",
                "Path": "/ld",
                "RawQuery": "utm_source=yektanet&utm_medium=dvr-display"
            }
        }));
        let payload = decode_token(&token).unwrap();
        assert_eq!(
            external_url(&payload),
            "https://landing.tapsi.food/ld?utm_source=yektanet&utm_medium=dvr-display"
        );
    }

    #[test]
    fn omits_question_mark_without_query() {
        let token = sign(&json!({
            "externalUrl": { "Host": "shop.example", "Path": "/p/1", "RawQuery": "" }
        }));
        let payload = decode_token(&token).unwrap();
        assert_eq!(external_url(&payload), "http://shop.example/p/1");
    }

    #[test]
    fn empty_host_is_propagated() {
        let payload = decode_token(&sign(&json!({ "other": 1 }))).unwrap();
        assert_eq!(external_url(&payload), "http://");
    }

    #[test]
    fn accepts_padded_payload_segments() {
        let body = base64::engine::general_purpose::URL_SAFE.encode(r#"{"a":1}"#);
        assert!(body.ends_with('='));
        let token = format!("x.{body}==.y");
        assert!(decode_token(&token).is_ok());
    }

    #[test]
    fn accepts_standard_alphabet_payloads() {
        let payload = json!({ "externalUrl": { "Host": "x.example", "Path": "/?>>>" } });
        let standard = base64::engine::general_purpose::STANDARD.encode(payload.to_string());
        assert!(standard.contains('+') || standard.contains('/'));

        let decoded = decode_token(&format!("h.{standard}.s")).unwrap();
        assert_eq!(external_url(&decoded), "http://x.example/?>>>");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(matches!(
            decode_token("only.two"),
            Err(TokenError::MalformedToken(_))
        ));
        assert!(matches!(
            decode_token("a.b.c.d"),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn rejects_undecodable_or_unstructured_payloads() {
        assert!(matches!(
            decode_token("a.!!!!.c"),
            Err(TokenError::MalformedToken(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        assert!(matches!(
            decode_token(&format!("a.{not_json}.c")),
            Err(TokenError::InvalidPayload(_))
        ));

        let array = URL_SAFE_NO_PAD.encode("[1,2]");
        assert!(matches!(
            decode_token(&format!("a.{array}.c")),
            Err(TokenError::InvalidPayload(_))
        ));
    }
}
