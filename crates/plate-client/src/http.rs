//! reqwest-backed [`ImpactService`]

use crate::error::ClientError;
use crate::service::{ImpactService, Registration};
use async_trait::async_trait;
use plate_core::{
    ApiConfig, HealthStatus, ImpactSummary, PayloadItem, RemoteIngredient, RemotePlate,
    ServiceError, SessionStarted, Stage,
};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the impact service
#[derive(Debug, Clone)]
pub struct HttpImpactService {
    client: Client,
    base_url: Url,
}

impl HttpImpactService {
    /// Create client from API configuration
    ///
    /// # Errors
    /// - `ClientError::InvalidBaseUrl` if `base_url` is not an absolute http(s) URL
    /// - `ClientError::Build` if reqwest rejects the client settings
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "expected an absolute http(s) url".to_string(),
            });
        }
        // Relative joins replace the last path segment unless it ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Service root all endpoints are resolved against
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, stage: Stage, path: &str) -> Result<Url, ServiceError> {
        self.base_url.join(path).map_err(|e| ServiceError::Transport {
            stage,
            message: format!("cannot resolve {path}: {e}"),
        })
    }

    async fn send(&self, stage: Stage, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().await.map_err(|e| ServiceError::Transport {
            stage,
            message: e.to_string(),
        })?;
        debug!("{} -> {}", stage, response.status());
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        stage: Stage,
        response: Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                stage,
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|e| ServiceError::Transport {
            stage,
            message: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|e| ServiceError::Decode {
            stage,
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(stage, path)?;
        let response = self.send(stage, self.client.get(url).query(query)).await?;
        Self::read_json(stage, response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(stage, path)?;
        let response = self.send(stage, self.client.post(url).query(query)).await?;
        Self::read_json(stage, response).await
    }
}

#[async_trait]
impl ImpactService for HttpImpactService {
    async fn start_session(&self) -> Result<SessionStarted, ServiceError> {
        self.post_json(Stage::StartSession, "session/start", &[]).await
    }

    async fn add_to_plate(
        &self,
        session_id: &str,
        item: PayloadItem,
    ) -> Result<Registration, ServiceError> {
        let stage = Stage::AddIngredient;
        let url = self.endpoint(stage, "plate/add")?;
        let query = [
            ("session_id", session_id.to_string()),
            ("ingredient_id", item.remote_id.to_string()),
            ("quantity_g", item.grams.to_string()),
        ];
        let response = self.send(stage, self.client.post(url).query(&query)).await?;

        let status = response.status();
        if status.is_success() {
            Ok(Registration::Accepted)
        } else {
            Ok(Registration::Rejected {
                status: status.as_u16(),
            })
        }
    }

    async fn remove_from_plate(
        &self,
        session_id: &str,
        remote_id: u32,
    ) -> Result<RemotePlate, ServiceError> {
        let query = [
            ("session_id", session_id.to_string()),
            ("ingredient_id", remote_id.to_string()),
        ];
        self.post_json(Stage::RemoveIngredient, "plate/remove", &query)
            .await
    }

    async fn fetch_plate(&self, session_id: &str) -> Result<RemotePlate, ServiceError> {
        self.get_json(Stage::FetchPlate, "plate", &[("session_id", session_id.to_string())])
            .await
    }

    async fn fetch_summary(&self, session_id: &str) -> Result<ImpactSummary, ServiceError> {
        self.get_json(
            Stage::FetchSummary,
            "impact/summary",
            &[("session_id", session_id.to_string())],
        )
        .await
    }

    async fn list_ingredients(&self) -> Result<Vec<RemoteIngredient>, ServiceError> {
        self.get_json(Stage::ListIngredients, "ingredients/", &[]).await
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        self.get_json(Stage::Health, "health", &[]).await
    }
}
