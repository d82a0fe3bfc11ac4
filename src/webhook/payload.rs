//! Inbound webhook payload.

use serde::Deserialize;

/// Webhook body. `Body` holds the URL-encoded text the user sent.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Pull the email address out of a raw webhook payload.
///
/// `None` when the payload is empty or malformed, the field is missing or
/// blank, or the field is not valid percent-encoding. `+` is left as is.
pub fn extract_email(payload: &[u8]) -> Option<String> {
    if payload.is_empty() {
        return None;
    }

    let message: InboundMessage = match serde_json::from_slice(payload) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(error = %e, "Undecodable webhook payload");
            return None;
        }
    };

    let decoded = match urlencoding::decode(&message.body) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, "Webhook body is not valid percent-encoding");
            return None;
        }
    };

    let email = decoded.trim();
    if email.is_empty() {
        None
    } else {
        Some(email.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_percent_encoded_address() {
        assert_eq!(
            extract_email(br#"{"Body": "bob%40example.com"}"#),
            Some("bob@example.com".to_string())
        );
        assert_eq!(
            extract_email(br#"{"Body": "  alice@example.com \n"}"#),
            Some("alice@example.com".to_string())
        );
    }

    #[test]
    fn test_plus_is_not_a_space() {
        assert_eq!(
            extract_email(br#"{"Body": "bob+tag%40example.com"}"#),
            Some("bob+tag@example.com".to_string())
        );
    }

    #[test]
    fn test_missing_or_malformed_yields_none() {
        assert_eq!(extract_email(b""), None);
        assert_eq!(extract_email(b"not json"), None);
        assert_eq!(extract_email(br#"{}"#), None);
        assert_eq!(extract_email(br#"{"Body": "   "}"#), None);
        assert_eq!(extract_email(br#"{"Body": "%E0%A4%A"}"#), None);
        assert_eq!(extract_email(br#"{"Body": "%FF"}"#), None);
    }
}
