//! Reqwest-backed [`ResponseBackend`] speaking the aggregate wire format.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::InteractiveType,
    error::EndpointError,
    protocol::{AggregatePayload, AggregateEntry},
};
use url::Url;
use uuid::Uuid;

use crate::{BackendError, ResponseBackend};

/// Path segment appended to the base endpoint for vote submission.
const VOTE_PATH_SEGMENT: &str = "vote";

pub struct HttpResponseBackend {
    http: Client,
    endpoint: Url,
    interactive_type: InteractiveType,
    client_id: String,
}

impl HttpResponseBackend {
    /// Validates the endpoint eagerly: anything that is not an absolute
    /// http(s) URL is rejected here so the widget can degrade to
    /// local-only counting before any request is built.
    pub fn new(
        endpoint: &str,
        interactive_type: InteractiveType,
        client_id: impl Into<String>,
    ) -> Result<Self, EndpointError> {
        let endpoint = Url::parse(endpoint).map_err(|source| EndpointError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(EndpointError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        }
        Ok(Self {
            http: Client::new(),
            endpoint,
            interactive_type,
            client_id: client_id.into(),
        })
    }

    /// Convenience constructor for hosts without a durable client
    /// identifier of their own.
    pub fn with_generated_client_id(
        endpoint: &str,
        interactive_type: InteractiveType,
    ) -> Result<Self, EndpointError> {
        Self::new(endpoint, interactive_type, Uuid::new_v4().to_string())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn base_query(&self) -> [(&'static str, String); 2] {
        [
            (
                "interactiveType",
                self.interactive_type.wire_value().to_string(),
            ),
            ("client", self.client_id.clone()),
        ]
    }

    fn vote_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(VOTE_PATH_SEGMENT);
        }
        url
    }
}

#[async_trait]
impl ResponseBackend for HttpResponseBackend {
    async fn fetch_aggregates(&self) -> Result<Vec<AggregateEntry>, BackendError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&self.base_query())
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let payload: AggregatePayload = response
            .json()
            .await
            .map_err(|err| BackendError::MalformedPayload(err.to_string()))?;
        Ok(payload.options)
    }

    async fn submit_selection(&self, option_index: usize) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.vote_url())
            .query(&self.base_query())
            .query(&[("optionSelected", option_index.to_string())])
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_backend_tests.rs"]
mod tests;
