//! Email validation client.

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

use crate::config::SendGridConfig;
use crate::providers::types::{EmailValidationResponse, ValidationRequest, ValidationVerdict};
use crate::resilience::{CallError, Executor, EMAIL_VALIDATION_CIRCUIT};

/// Scores an email address.
pub trait Validator: Send + Sync {
    fn validate(&self, email: &str) -> impl Future<Output = Result<ValidationVerdict, CallError>> + Send;
}

/// Validation API client. Every call runs under the `email_validation` circuit.
#[derive(Clone)]
pub struct EmailValidationClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    executor: Executor,
}

impl EmailValidationClient {
    pub fn new(config: &SendGridConfig, executor: Executor) -> Result<Self, reqwest::Error> {
        let timeout = executor
            .registry()
            .circuit(EMAIL_VALIDATION_CIRCUIT)
            .config()
            .timeout();
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: config.validation_endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout,
            executor,
        })
    }
}

impl Validator for EmailValidationClient {
    async fn validate(&self, email: &str) -> Result<ValidationVerdict, CallError> {
        let request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ValidationRequest { email });
        let timeout = self.timeout;

        self.executor
            .execute(
                EMAIL_VALIDATION_CIRCUIT,
                move || async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| CallError::from_reqwest(e, timeout))?;

                    let status = response.status();
                    if status != StatusCode::OK {
                        return Err(CallError::from_status(status.as_u16()));
                    }

                    let body: EmailValidationResponse = response
                        .json()
                        .await
                        .map_err(|e| CallError::from_reqwest(e, timeout))?;
                    Ok(ValidationVerdict::from(body.result))
                },
                |err| {
                    tracing::warn!(circuit = EMAIL_VALIDATION_CIRCUIT, error = %err, "Email validation fallback");
                    Err(err)
                },
            )
            .await
    }
}
