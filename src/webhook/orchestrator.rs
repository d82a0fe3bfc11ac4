//! Webhook request orchestration.
//!
//! # Flow
//! ```text
//! Received  → extract email        → missing: Responded
//! Validated → provider verdict     → failed:  Responded
//! Decided   → Invalid: rejection, validate_only: score, else register
//! Responded → terminal
//! ```

use std::time::Instant;
use thiserror::Error;

use crate::config::OrchestrationMode;
use crate::observability::metrics;
use crate::providers::{
    ContactAdder, ContactClient, EmailValidationClient, ResultCategory, ValidationVerdict,
    Validator,
};
use crate::resilience::CallError;
use crate::webhook::message;
use crate::webhook::payload::extract_email;

/// Text sent back to the webhook caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookMessage {
    pub text: String,
}

impl WebhookMessage {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Failures surfaced to the caller in `validate_only` mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("no email address in request")]
    MissingEmail,

    #[error("email validation failed: {0}")]
    Validation(CallError),
}

impl WebhookError {
    /// Fixed text safe to show the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            WebhookError::MissingEmail => message::PROVIDE_EMAIL,
            WebhookError::Validation(_) => message::COULD_NOT_VALIDATE,
        }
    }
}

enum Stage {
    Received,
    /// The submitted address travels with the verdict; the provider's echo
    /// of it is never registered.
    Validated(String, ValidationVerdict),
    Decided(String, ValidationVerdict),
    Responded {
        outcome: &'static str,
        result: Result<WebhookMessage, WebhookError>,
    },
}

/// Drives one webhook request through validation and registration.
pub struct Orchestrator<V, A> {
    validator: V,
    contacts: A,
    mode: OrchestrationMode,
}

/// Orchestrator wired to the real provider clients.
pub type WebhookOrchestrator = Orchestrator<EmailValidationClient, ContactClient>;

impl<V: Validator, A: ContactAdder> Orchestrator<V, A> {
    pub fn new(validator: V, contacts: A, mode: OrchestrationMode) -> Self {
        Self {
            validator,
            contacts,
            mode,
        }
    }

    pub fn mode(&self) -> OrchestrationMode {
        self.mode
    }

    /// Handle one raw webhook payload.
    pub async fn handle(&self, payload: &[u8]) -> Result<WebhookMessage, WebhookError> {
        let started = Instant::now();
        let mut stage = Stage::Received;

        loop {
            stage = match stage {
                Stage::Received => match extract_email(payload) {
                    Some(email) => match self.validator.validate(&email).await {
                        Ok(verdict) => Stage::Validated(email, verdict),
                        Err(err) => self.validation_failed(err),
                    },
                    None => self.missing_email(),
                },
                Stage::Validated(email, verdict) => self.decide(email, verdict),
                Stage::Decided(email, verdict) => match self.contacts.add(&email).await {
                    Ok(()) => {
                        tracing::info!(category = %verdict.category, score = verdict.score, "Email registered");
                        Stage::Responded {
                            outcome: "registered",
                            result: Ok(WebhookMessage::new(message::registered(&verdict))),
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, kind = err.kind(), "Contact registration failed");
                        Stage::Responded {
                            outcome: "registration_failed",
                            result: Ok(WebhookMessage::new(message::COULD_NOT_REGISTER)),
                        }
                    }
                },
                Stage::Responded { outcome, result } => {
                    metrics::record_webhook(outcome, started);
                    return result;
                }
            };
        }
    }

    fn missing_email(&self) -> Stage {
        tracing::info!(mode = ?self.mode, "Webhook request without an email address");
        let result = if self.mode.surfaces_errors() {
            Err(WebhookError::MissingEmail)
        } else {
            Ok(WebhookMessage::new(message::PROVIDE_EMAIL))
        };
        Stage::Responded {
            outcome: "missing_email",
            result,
        }
    }

    fn validation_failed(&self, err: CallError) -> Stage {
        tracing::error!(error = %err, kind = err.kind(), "Email validation failed");
        let result = if self.mode.surfaces_errors() {
            Err(WebhookError::Validation(err))
        } else {
            Ok(WebhookMessage::new(message::COULD_NOT_VALIDATE))
        };
        Stage::Responded {
            outcome: "validation_failed",
            result,
        }
    }

    fn decide(&self, email: String, verdict: ValidationVerdict) -> Stage {
        if !self.mode.registers_contacts() {
            return Stage::Responded {
                outcome: "scored",
                result: Ok(WebhookMessage::new(message::score(&verdict))),
            };
        }

        if verdict.category == ResultCategory::Invalid {
            tracing::info!(
                suggestion = verdict.suggested_domain.as_deref().unwrap_or(""),
                reasons = verdict.reason_codes.len(),
                "Email rejected as invalid"
            );
            return Stage::Responded {
                outcome: "rejected",
                result: Ok(WebhookMessage::new(message::rejection(&verdict))),
            };
        }

        Stage::Decided(email, verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct FakeValidator {
        result: Result<ValidationVerdict, CallError>,
        calls: AtomicUsize,
    }

    impl Validator for FakeValidator {
        async fn validate(&self, _email: &str) -> Result<ValidationVerdict, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[derive(Clone, Default)]
    struct FakeContacts {
        added: Arc<Mutex<Vec<String>>>,
        fail_with: Option<CallError>,
    }

    impl ContactAdder for FakeContacts {
        async fn add(&self, email: &str) -> Result<(), CallError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.added.lock().unwrap().push(email.to_string());
            Ok(())
        }
    }

    fn verdict(category: ResultCategory, score: f64) -> ValidationVerdict {
        ValidationVerdict {
            email: "bob@example.com".into(),
            category,
            score,
            local: Some("bob".into()),
            host: Some("example.com".into()),
            suggested_domain: None,
            reason_codes: Vec::new(),
        }
    }

    fn orchestrator(
        result: Result<ValidationVerdict, CallError>,
        contacts: FakeContacts,
        mode: OrchestrationMode,
    ) -> Orchestrator<FakeValidator, FakeContacts> {
        let validator = FakeValidator {
            result,
            calls: AtomicUsize::new(0),
        };
        Orchestrator::new(validator, contacts, mode)
    }

    const PAYLOAD: &[u8] = br#"{"Body": "bob%40example.com"}"#;

    #[tokio::test]
    async fn test_empty_body_asks_for_email() {
        let o = orchestrator(
            Ok(verdict(ResultCategory::Valid, 0.9)),
            FakeContacts::default(),
            OrchestrationMode::ValidateAndRegister,
        );
        let reply = o.handle(b"").await.unwrap();
        assert_eq!(reply.text, "Please provide an email");
        assert_eq!(o.validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_email_is_registered() {
        let contacts = FakeContacts::default();
        let o = orchestrator(
            Ok(verdict(ResultCategory::Valid, 0.95)),
            contacts.clone(),
            OrchestrationMode::ValidateAndRegister,
        );
        let reply = o.handle(PAYLOAD).await.unwrap();
        assert_eq!(
            reply.text,
            "Email added to contact list. It was considered Valid with a score of 0.950000"
        );
        assert_eq!(*contacts.added.lock().unwrap(), vec!["bob@example.com"]);
    }

    #[tokio::test]
    async fn test_submitted_address_is_registered_not_echo() {
        let contacts = FakeContacts::default();
        let mut echoed = verdict(ResultCategory::Valid, 0.9);
        echoed.email = String::new();
        let o = orchestrator(Ok(echoed), contacts.clone(), OrchestrationMode::ValidateAndRegister);

        let reply = o.handle(br#"{"Body": "Bob%40Example.com"}"#).await.unwrap();
        assert!(reply.text.starts_with("Email added to contact list."));
        assert_eq!(*contacts.added.lock().unwrap(), vec!["Bob@Example.com"]);
    }

    #[tokio::test]
    async fn test_risky_email_is_still_registered() {
        let contacts = FakeContacts::default();
        let o = orchestrator(
            Ok(verdict(ResultCategory::Risky, 0.4)),
            contacts.clone(),
            OrchestrationMode::ValidateAndRegister,
        );
        let reply = o.handle(PAYLOAD).await.unwrap();
        assert!(reply.text.contains("considered Risky with a score of 0.400000"));
        assert_eq!(contacts.added.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_is_not_registered() {
        let contacts = FakeContacts::default();
        let mut invalid = verdict(ResultCategory::Invalid, 0.1);
        invalid.suggested_domain = Some("gmail.com".into());
        let o = orchestrator(Ok(invalid), contacts.clone(), OrchestrationMode::ValidateAndRegister);

        let reply = o.handle(PAYLOAD).await.unwrap();
        assert_eq!(reply.text, "Email likely invalid. Consider using bob@gmail.com");
        assert!(contacts.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_collapse_to_fixed_messages() {
        let o = orchestrator(
            Err(CallError::Timeout(Duration::from_secs(5))),
            FakeContacts::default(),
            OrchestrationMode::ValidateAndRegister,
        );
        assert_eq!(o.handle(PAYLOAD).await.unwrap().text, "Could not validate email");

        let contacts = FakeContacts {
            fail_with: Some(CallError::ProviderServer { status: 503 }),
            ..FakeContacts::default()
        };
        let o = orchestrator(
            Ok(verdict(ResultCategory::Valid, 0.9)),
            contacts,
            OrchestrationMode::ValidateAndRegister,
        );
        assert_eq!(
            o.handle(PAYLOAD).await.unwrap().text,
            "Could not add email to contact list"
        );
    }

    #[tokio::test]
    async fn test_validate_only_reports_score_without_registering() {
        let contacts = FakeContacts::default();
        let o = orchestrator(
            Ok(verdict(ResultCategory::Invalid, 0.25)),
            contacts.clone(),
            OrchestrationMode::ValidateOnly,
        );
        let reply = o.handle(PAYLOAD).await.unwrap();
        assert_eq!(reply.text, "Email validation score: 0.250000");
        assert!(contacts.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_only_surfaces_errors() {
        let o = orchestrator(
            Err(CallError::ProviderClient { status: 401 }),
            FakeContacts::default(),
            OrchestrationMode::ValidateOnly,
        );
        assert_eq!(o.handle(b"").await, Err(WebhookError::MissingEmail));

        let err = o.handle(PAYLOAD).await.unwrap_err();
        assert_eq!(err, WebhookError::Validation(CallError::ProviderClient { status: 401 }));
        assert_eq!(err.user_message(), "Could not validate email");
    }
}
