//! HTTP implementation of the remote service seam.

use super::{
    AreaClosureSummary, BlockFinalizeRequest, BlockFinalizeResponse, ClosureUpload, PropertyUpload,
    RemoteApi, RemoteError, VisitUpload,
};
use crate::config::Config;
use async_trait::async_trait;
use campo_engine::{Block, Property};
use reqwest::StatusCode;

/// Reqwest-backed client for the field-data service.
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteApi {
    /// Build a client with the configured base URL and per-request timeout.
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success status into a rejection carrying the body text.
    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn fetch_blocks(&self, agent_id: &str) -> Result<Vec<Block>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/baixarQuarteiroesResponsavel/{agent_id}")))
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_properties(&self, agent_id: &str) -> Result<Vec<Property>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/baixarImoveisResponsavel/{agent_id}")))
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn create_visit(&self, visit: &VisitUpload) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url("/cadastrarVisita"))
            .json(visit)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn update_property(
        &self,
        property_id: &str,
        property: &PropertyUpload,
    ) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.url(&format!("/editarImovel/{property_id}")))
            .json(property)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn finalize_blocks(
        &self,
        request: &BlockFinalizeRequest,
    ) -> Result<BlockFinalizeResponse, RemoteError> {
        let response = self
            .client
            .put(self.url("/atualizarQuarteiroes"))
            .json(request)
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn pending_closures(
        &self,
        agent_id: &str,
        period: u32,
    ) -> Result<Vec<AreaClosureSummary>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/diariosPendentesFechamento/{agent_id}/{period}")))
            .send()
            .await?;

        // the service answers 404 when nothing is pending for the period
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn close_area(&self, closure: &ClosureUpload) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url("/cadastrarSemanal"))
            .json(closure)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}
