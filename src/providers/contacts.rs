//! Contact list registration client.

use std::future::Future;
use std::time::Duration;

use crate::config::SendGridConfig;
use crate::providers::types::{Contact, ContactRequest};
use crate::resilience::{CallError, Executor, CONTACTS_CIRCUIT};

/// Adds an address to the configured contact list.
///
/// Adding an address that is already on the list is a success.
pub trait ContactAdder: Send + Sync {
    fn add(&self, email: &str) -> impl Future<Output = Result<(), CallError>> + Send;
}

/// Contacts API client. Every call runs under the `contacts` circuit.
#[derive(Clone)]
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    list_id: String,
    timeout: Duration,
    executor: Executor,
}

impl ContactClient {
    pub fn new(config: &SendGridConfig, executor: Executor) -> Result<Self, reqwest::Error> {
        let timeout = executor.registry().circuit(CONTACTS_CIRCUIT).config().timeout();
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: config.contacts_endpoint.clone(),
            api_key: config.api_key.clone(),
            list_id: config.contact_list_id.clone(),
            timeout,
            executor,
        })
    }
}

impl ContactAdder for ContactClient {
    async fn add(&self, email: &str) -> Result<(), CallError> {
        let body = ContactRequest {
            list_ids: vec![self.list_id.as_str()],
            contacts: vec![Contact { email }],
        };
        let request = self
            .http
            .put(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        let timeout = self.timeout;

        self.executor
            .execute(
                CONTACTS_CIRCUIT,
                move || async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| CallError::from_reqwest(e, timeout))?;

                    // The provider answers 202; any 2xx means the upsert was taken.
                    let status = response.status();
                    if !status.is_success() {
                        return Err(CallError::from_status(status.as_u16()));
                    }
                    Ok(())
                },
                |err| {
                    tracing::warn!(circuit = CONTACTS_CIRCUIT, error = %err, "Contact registration fallback");
                    Err(err)
                },
            )
            .await
    }
}
