//! Provider wire types and the domain verdict.

use serde::{Deserialize, Serialize};

/// Validation request body.
#[derive(Debug, Serialize)]
pub struct ValidationRequest<'a> {
    pub email: &'a str,
}

/// Validation response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailValidationResponse {
    pub result: EmailValidationResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailValidationResult {
    pub email: String,
    pub result: String,
    pub score: f64,
    #[serde(default)]
    pub local: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub reasons: Option<Vec<String>>,
}

/// Contact upsert body.
#[derive(Debug, Serialize)]
pub struct ContactRequest<'a> {
    pub list_ids: Vec<&'a str>,
    pub contacts: Vec<Contact<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Contact<'a> {
    pub email: &'a str,
}

/// Provider's classification of an address.
///
/// Categories the service does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultCategory {
    Valid,
    Risky,
    Invalid,
    Other(String),
}

impl From<String> for ResultCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Valid" => ResultCategory::Valid,
            "Risky" => ResultCategory::Risky,
            "Invalid" => ResultCategory::Invalid,
            _ => ResultCategory::Other(value),
        }
    }
}

impl std::fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultCategory::Valid => write!(f, "Valid"),
            ResultCategory::Risky => write!(f, "Risky"),
            ResultCategory::Invalid => write!(f, "Invalid"),
            ResultCategory::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Result of one validation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationVerdict {
    pub email: String,
    pub category: ResultCategory,
    /// Confidence between 0.0 and 1.0.
    pub score: f64,
    pub local: Option<String>,
    pub host: Option<String>,
    pub suggested_domain: Option<String>,
    pub reason_codes: Vec<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<EmailValidationResult> for ValidationVerdict {
    fn from(result: EmailValidationResult) -> Self {
        Self {
            email: result.email,
            category: ResultCategory::from(result.result),
            score: result.score,
            local: non_empty(result.local),
            host: non_empty(result.host),
            suggested_domain: non_empty(result.suggestion),
            reason_codes: result.reasons.unwrap_or_default(),
        }
    }
}
