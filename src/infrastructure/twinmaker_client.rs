// TwinMaker HTTP client implementing the remote value port
use crate::application::remote_value_client::RemoteValueClient;
use crate::domain::binding::{DataBinding, DataPoint, TimeWindow, Value, ValueKind};
use crate::domain::error::{FetchError, TypeResolutionError};
use crate::infrastructure::config::TwinMakerSettings;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SECURITY_TOKEN_HEADER: &str = "X-Amz-Security-Token";

#[derive(Debug, Clone)]
pub struct TwinMakerClient {
    http: reqwest::Client,
    endpoint: String,
    workspace_id: String,
    session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityResponse {
    #[serde(default)]
    components: HashMap<String, ComponentSummary>,
}

#[derive(Debug, Deserialize)]
struct ComponentSummary {
    #[serde(default)]
    properties: HashMap<String, PropertySummary>,
}

#[derive(Debug, Deserialize)]
struct PropertySummary {
    definition: PropertyDefinition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyDefinition {
    data_type: DataType,
}

#[derive(Debug, Deserialize)]
struct DataType {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRequest<'a> {
    entity_id: &'a str,
    component_name: &'a str,
    selected_properties: [&'a str; 1],
    order_by_time: &'static str,
    start_time: String,
    end_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    #[serde(default)]
    property_values: Vec<PropertyValueHistory>,
}

#[derive(Debug, Deserialize)]
struct PropertyValueHistory {
    #[serde(default)]
    values: Vec<PropertyValueSample>,
}

#[derive(Debug, Deserialize)]
struct PropertyValueSample {
    value: HashMap<String, serde_json::Value>,
}

impl TwinMakerClient {
    pub fn new(settings: &TwinMakerSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: settings.endpoint(),
            workspace_id: settings.workspace_id.clone(),
            session_token: settings.session_token.clone(),
        })
    }

    fn workspace_url(&self, path: &str) -> String {
        format!(
            "{}/workspaces/{}/{}",
            self.endpoint,
            urlencoding::encode(&self.workspace_id),
            path
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => request.header(SECURITY_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, String> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("status {}: {}", status, body));
        }

        Ok(response)
    }
}

fn to_iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn property_kind(entity: &EntityResponse, binding: &DataBinding) -> Result<ValueKind, TypeResolutionError> {
    let declared = entity
        .components
        .get(&binding.component_name)
        .and_then(|c| c.properties.get(&binding.property_name))
        .map(|p| p.definition.data_type.kind.as_str())
        .ok_or_else(|| TypeResolutionError::MissingProperty(binding.clone()))?;

    Ok(declared.parse()?)
}

/// Take the newest sample (the response is ordered newest first).
fn latest_point(
    response: &HistoryResponse,
    kind: ValueKind,
    window: TimeWindow,
) -> Result<Option<DataPoint>, FetchError> {
    let Some(sample) = response
        .property_values
        .first()
        .and_then(|history| history.values.first())
    else {
        return Ok(None);
    };

    let raw = sample
        .value
        .get(kind.field_name())
        .ok_or_else(|| FetchError::Decode(format!("sample has no {}", kind.field_name())))?;
    let value = Value::decode(raw, kind)
        .ok_or_else(|| FetchError::Decode(format!("cannot decode {} as {:?}", raw, kind)))?;

    // Stamped with the window end so freshness follows cycle boundaries.
    Ok(Some(DataPoint::new(window.end, value)))
}

#[async_trait]
impl RemoteValueClient for TwinMakerClient {
    async fn resolve_value_kind(
        &self,
        binding: &DataBinding,
    ) -> Result<ValueKind, TypeResolutionError> {
        let url = self.workspace_url(&format!(
            "entities/{}",
            urlencoding::encode(&binding.entity_id)
        ));
        tracing::debug!(binding = %binding, "Fetching property data type");

        let entity = self
            .send(self.http.get(&url))
            .await
            .map_err(TypeResolutionError::Request)?
            .json::<EntityResponse>()
            .await
            .map_err(|e| TypeResolutionError::Request(e.to_string()))?;

        property_kind(&entity, binding)
    }

    async fn fetch_latest(
        &self,
        binding: &DataBinding,
        kind: ValueKind,
        window: TimeWindow,
    ) -> Result<Option<DataPoint>, FetchError> {
        let request = HistoryRequest {
            entity_id: &binding.entity_id,
            component_name: &binding.component_name,
            selected_properties: [&binding.property_name],
            order_by_time: "DESCENDING",
            start_time: to_iso(window.start),
            end_time: to_iso(window.end),
        };

        let url = self.workspace_url("entity-properties/history");
        let response = self
            .send(self.http.post(&url).json(&request))
            .await
            .map_err(FetchError::Request)?
            .json::<HistoryResponse>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        latest_point(&response, kind, window)
    }
}
