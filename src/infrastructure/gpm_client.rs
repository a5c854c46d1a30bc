// Monitoring platform HTTP client implementation
use crate::application::monitoring_repository::{DataListRequest, MonitoringRepository};
use crate::application::patterns::PatternCatalog;
use crate::domain::equipment::{ElementId, Equipment};
use crate::domain::plant::{Plant, PlantId};
use crate::domain::signal::DatasourceDescriptor;
use crate::domain::time_series::RawPoint;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub struct GpmClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
    catalog: Arc<PatternCatalog>,
    max_ids: usize,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlantDto {
    id: PlantId,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ElementDto {
    identifier: ElementId,
    name: String,
    #[serde(default)]
    type_string: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DatasourceDto {
    data_source_id: i64,
    #[serde(default)]
    data_source_name: String,
    #[serde(default)]
    units: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DataPointDto {
    date: String,
    data_source_id: i64,
    value: Option<f64>,
}

impl GpmClient {
    pub fn new(
        base_url: String,
        username: String,
        password: String,
        timeout: Duration,
        catalog: Arc<PatternCatalog>,
        max_ids: usize,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            client,
            token: RwLock::new(None),
            catalog,
            max_ids,
        })
    }

    /// Request a fresh access token and keep it for later calls.
    pub async fn login(&self) -> Result<()> {
        let url = format!("{}/api/Account/Token", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&Credentials {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .await
            .context("Failed to send login request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Login failed with status {}: {}", status, body);
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .context("Failed to login and get token")?;
        *self.token.write().await = Some(token.access_token);
        Ok(())
    }

    fn build_data_list_url(&self, request: &DataListRequest) -> String {
        let ids = request
            .datasource_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/api/DataList/v2?datasourceIds={}&startDate={}&endDate={}&grouping={}&granularity={}&aggregationType={}",
            self.base_url,
            urlencoding::encode(&ids),
            urlencoding::encode(&request.window.start_param()),
            urlencoding::encode(&request.window.end_param()),
            urlencoding::encode(&request.grouping),
            request.granularity,
            request.aggregation.code()
        )
    }

    async fn send_get(&self, url: &str) -> Result<Response> {
        let token = self.token.read().await.clone();
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.context("Failed to send request to GPM")
    }

    /// GET with one re-authentication on 401.
    async fn get(&self, url: &str) -> Result<Response> {
        let mut response = self.send_get(url).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("Token expired. Re-authenticating...");
            self.login().await?;
            tracing::info!("Re-authentication successful. Retrying request...");
            response = self.send_get(url).await?;
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GPM request failed with status {}: {}", status, body);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        self.get(&url)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse GPM response for {}", path))
    }
}

fn descriptors(sources: Vec<DatasourceDto>) -> Vec<DatasourceDescriptor> {
    sources
        .into_iter()
        .map(|s| DatasourceDescriptor::new(s.data_source_id, s.data_source_name, s.units.unwrap_or_default()))
        .collect()
}

#[async_trait]
impl MonitoringRepository for GpmClient {
    async fn ping(&self) -> Result<()> {
        let url = format!("{}/api/Account/Ping", self.base_url);
        self.get(&url).await?;
        tracing::info!("Authentication successful");
        Ok(())
    }

    async fn list_plants(&self) -> Result<Vec<Plant>> {
        let plants: Vec<PlantDto> = self.get_json("/api/Plant").await?;
        Ok(plants.into_iter().map(|p| Plant::new(p.id, p.name)).collect())
    }

    async fn plant_detail(&self, plant_id: PlantId) -> Result<serde_json::Value> {
        let detail = self.get_json(&format!("/api/Plant/{}", plant_id)).await?;
        tracing::info!("Plant details retrieved successfully for plant ID {}", plant_id);
        Ok(detail)
    }

    async fn element_detail(&self, plant_id: PlantId, element_id: ElementId) -> Result<serde_json::Value> {
        let detail = self
            .get_json(&format!("/api/Plant/{}/Element/{}", plant_id, element_id))
            .await?;
        tracing::info!(
            "Element details retrieved successfully for element ID {} in plant ID {}",
            element_id,
            plant_id
        );
        Ok(detail)
    }

    async fn list_equipment(&self, plant_id: PlantId) -> Result<Vec<Equipment>> {
        let elements: Vec<ElementDto> = self
            .get_json(&format!("/api/Plant/{}/Element", plant_id))
            .await?;

        tracing::debug!("Got {} elements for plant ID {}", elements.len(), plant_id);
        Ok(elements
            .into_iter()
            .map(|e| {
                let category = self.catalog.categorize(&e.type_string);
                Equipment::new(e.identifier, e.name, e.type_string, category)
            })
            .collect())
    }

    async fn list_datasources(&self, plant_id: PlantId, element_id: ElementId) -> Result<Vec<DatasourceDescriptor>> {
        let sources: Vec<DatasourceDto> = self
            .get_json(&format!("/api/Plant/{}/Element/{}/Datasource", plant_id, element_id))
            .await?;

        Ok(descriptors(sources))
    }

    async fn list_plant_datasources(&self, plant_id: PlantId) -> Result<Vec<DatasourceDescriptor>> {
        let sources: Vec<DatasourceDto> = self
            .get_json(&format!("/api/Plant/{}/Datasource", plant_id))
            .await?;

        tracing::debug!("Got {} datasources for plant ID {}", sources.len(), plant_id);
        Ok(descriptors(sources))
    }

    async fn fetch_data_list(&self, request: &DataListRequest) -> Result<Vec<RawPoint>> {
        if request.datasource_ids.len() > self.max_ids {
            anyhow::bail!(
                "Data list request with {} datasource ids exceeds the limit of {}",
                request.datasource_ids.len(),
                self.max_ids
            );
        }

        let url = self.build_data_list_url(request);
        tracing::debug!("Executing data list query: {}", url);
        let entries = self
            .get(&url)
            .await?
            .json::<Vec<DataPointDto>>()
            .await
            .context("Failed to parse data list response")?;

        let nulls = entries.iter().filter(|e| e.value.is_none()).count();
        if nulls > 0 {
            tracing::warn!("{} of {} data list entries have a null value", nulls, entries.len());
        }
        Ok(entries
            .into_iter()
            .map(|e| RawPoint::with_reading(e.date, e.data_source_id, e.value))
            .collect())
    }

    fn max_ids_per_request(&self) -> usize {
        self.max_ids
    }
}
