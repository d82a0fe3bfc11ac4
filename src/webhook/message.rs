//! User-facing message text.
//!
//! Users only ever see these fixed strings; provider errors stay in the logs.

use crate::providers::ValidationVerdict;

pub const PROVIDE_EMAIL: &str = "Please provide an email";
pub const COULD_NOT_VALIDATE: &str = "Could not validate email";
pub const COULD_NOT_REGISTER: &str = "Could not add email to contact list";

/// Reply for an address the provider judged invalid.
pub fn rejection(verdict: &ValidationVerdict) -> String {
    let mut text = String::from("Email likely invalid.");

    if let Some(domain) = &verdict.suggested_domain {
        let local = verdict
            .local
            .as_deref()
            .unwrap_or_else(|| verdict.email.split('@').next().unwrap_or_default());
        text.push_str(&format!(" Consider using {}@{}", local, domain));
    }

    if !verdict.reason_codes.is_empty() {
        text.push_str(" Reasons include: ");
        text.push_str(&verdict.reason_codes.join(", "));
    }

    text
}

pub fn registered(verdict: &ValidationVerdict) -> String {
    format!(
        "Email added to contact list. It was considered {} with a score of {:.6}",
        verdict.category, verdict.score
    )
}

pub fn score(verdict: &ValidationVerdict) -> String {
    format!("Email validation score: {:.6}", verdict.score)
}
