use crate::core::error::AppError;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct BaseApiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl BaseApiClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), endpoint, api_key)
    }

    pub fn with_client(client: Client, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// Posts `payload` as JSON and returns the response once its status is 2xx.
    pub async fn send_request<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, AppError> {
        let url = self.url(path);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(%url, status = status.as_u16(), "backend returned error status");
            return Err(AppError::status(status.as_u16(), &body));
        }

        Ok(response)
    }
}
