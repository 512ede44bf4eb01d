// HTTP request handlers
use crate::domain::binding::{DataBinding, DataPoint};
use crate::infrastructure::scene_store::MemoryNode;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct BindingStatus {
    #[serde(flatten)]
    pub binding: DataBinding,
    pub subscribers: usize,
    pub value_kind: Option<&'static str>,
    pub latest: Option<DataPoint>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub playing: bool,
    pub behaviors: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectedEntity {
    pub entity_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSelectedEntityResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Active bindings with their subscriber counts and cached values
pub async fn list_bindings(State(state): State<Arc<AppState>>) -> Json<Vec<BindingStatus>> {
    let context = &state.context;
    let bindings = context
        .registry()
        .subscriber_counts()
        .into_iter()
        .map(|(binding, subscribers)| BindingStatus {
            value_kind: context
                .scheduler()
                .value_kind(&binding)
                .map(|kind| kind.field_name()),
            latest: context.get_latest(&binding),
            binding,
            subscribers,
        })
        .collect();

    Json(bindings)
}

pub async fn latest_value(
    Query(binding): Query<DataBinding>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataPoint>, StatusCode> {
    state
        .context
        .get_latest(&binding)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn scene_nodes(State(state): State<Arc<AppState>>) -> Json<Vec<MemoryNode>> {
    Json(state.scene.snapshot())
}

pub async fn get_selected_entity(State(state): State<Arc<AppState>>) -> Json<SelectedEntity> {
    Json(SelectedEntity {
        entity_id: state.scene.selected_entity(),
    })
}

pub async fn set_selected_entity(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectedEntity>,
) -> Json<SetSelectedEntityResponse> {
    tracing::info!(entity_id = ?request.entity_id, "Selecting entity");

    let error_message = match request.entity_id.as_deref() {
        None | Some("") => Some("entity_id is required".to_string()),
        Some(entity_id) if !state.scene.select_entity(entity_id) => {
            Some(format!("no scene node is bound to entity {}", entity_id))
        }
        Some(_) => None,
    };

    Json(SetSelectedEntityResponse {
        success: error_message.is_none(),
        error_message,
    })
}

pub async fn play_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    let mut session = state.session.lock().await;
    session.play();

    Json(SessionStatus {
        playing: session.is_playing(),
        behaviors: session.behavior_count(),
    })
}

pub async fn stop_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    let mut session = state.session.lock().await;
    session.stop();

    Json(SessionStatus {
        playing: session.is_playing(),
        behaviors: session.behavior_count(),
    })
}
