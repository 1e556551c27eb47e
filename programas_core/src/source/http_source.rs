use async_trait::async_trait;
use reqwest::Client;

use super::program_source::ProgramSource;
use crate::config::ResolverConfig;
use crate::types::types::{BulkRequest, BulkResponse, ResolveError, SubjectRef};

/// Posts the batch to the portal's bulk endpoint.
pub struct HttpProgramSource {
    client: Client,
    endpoint: String,
}

impl HttpProgramSource {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .tcp_nodelay(true)
            .build()?;
        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ProgramSource for HttpProgramSource {
    async fn fetch_bulk(&self, subjects: &[SubjectRef]) -> Result<BulkResponse, ResolveError> {
        let body = BulkRequest {
            materia_ids: subjects.to_vec(),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // The portal reports its own failures as JSON with a message; keep
            // it for the logs when it is there.
            let message = serde_json::from_slice::<BulkResponse>(&bytes)
                .ok()
                .and_then(|r| r.message);
            return Err(ResolveError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
