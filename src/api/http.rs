//! reqwest implementation of the chart service

use super::types::*;
use super::ChartApi;
use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

const GEN_SYNC_PATH: &str = "chart/gen";
const GEN_ASYNC_PATH: &str = "chart/gen/async";
const GEN_ASYNC_MQ_PATH: &str = "chart/gen/async/mq";
const LIST_MINE_PATH: &str = "chart/my/list/page";

/// HTTP client for the chart service
pub struct HttpChartApi {
    client: Client,
    base_url: String,
}

impl HttpChartApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| AppError::Config(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Upload the dataset as the `file` part, structured fields as query parameters
    async fn post_generation<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<T> {
        info!(
            "POST {} name={} file={} ({} bytes)",
            path,
            params.name,
            file.file_name,
            file.bytes.len()
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(path))
            .query(params)
            .multipart(form)
            .send()
            .await?;

        Self::read_envelope(response, path).await
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
        let response = response.error_for_status()?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(AppError::EmptyResponse(operation.to_string()));
        }
        debug!("{} responded with {} bytes", operation, body.len());

        let envelope: BaseResponse<T> = serde_json::from_str(&body)?;
        envelope.into_data(operation)
    }
}

#[async_trait]
impl ChartApi for HttpChartApi {
    async fn generate_sync(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<ChartResult> {
        self.post_generation(GEN_SYNC_PATH, params, file).await
    }

    async fn generate_async_direct(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<Acknowledgement> {
        self.post_generation(GEN_ASYNC_PATH, params, file).await
    }

    async fn generate_async_queued(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<Acknowledgement> {
        self.post_generation(GEN_ASYNC_MQ_PATH, params, file).await
    }

    async fn list_mine(&self, params: &SearchParams) -> Result<ChartPage> {
        debug!("POST {} {:?}", LIST_MINE_PATH, params);

        let response = self
            .client
            .post(self.url(LIST_MINE_PATH))
            .json(params)
            .send()
            .await?;

        Self::read_envelope(response, LIST_MINE_PATH).await
    }
}
