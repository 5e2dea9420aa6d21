use crate::core::error::LeetobError;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    auth_header: Option<(String, String)>,
}

impl HttpClient {
    pub fn new(endpoint: String, auth_header: Option<(String, String)>) -> Result<Self, LeetobError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `payload` as JSON to `{endpoint}/{path}`. Non-2xx statuses become [`LeetobError::Api`].
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, LeetobError> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%url, "POST");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some((key, value)) = &self.auth_header {
            request = request.header(key, value);
        }

        let response = request.json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LeetobError::Api(format!("{}: {}", status, body.trim())));
        }

        Ok(response)
    }
}
