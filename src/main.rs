// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::binding_context::BindingContext;
use crate::application::scene_session::SceneSession;
use crate::infrastructure::binding_loader::{apply_entry, load_binding_file};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::scene_store::SceneStore;
use crate::infrastructure::twinmaker_client::TwinMakerClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_selected_entity, health_check, latest_value, list_bindings, play_session, scene_nodes,
    set_selected_entity, stop_session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    let settings = config.scheduler.settings()?;
    if let Some(role_arn) = &config.twinmaker.role_arn {
        tracing::info!(role_arn = %role_arn, "Using credentials issued for role");
    }

    // Remote client and binding context (infrastructure + application layers)
    let client = Arc::new(TwinMakerClient::new(&config.twinmaker)?);
    tracing::info!(
        endpoint = %config.twinmaker.endpoint(),
        workspace = %config.twinmaker.workspace_id,
        "Connecting to TwinMaker"
    );
    let context = BindingContext::new(client, config.scheduler.subscription_mode, settings);

    // Scene and behaviors
    let scene = Arc::new(SceneStore::new());
    let mut session = SceneSession::new(context.clone(), scene.clone());
    if let Some(path) = &config.host.bindings_file {
        // Attach as each entry lands so later entries on the same node
        // do not overwrite the binding an earlier behavior reads.
        for entry in load_binding_file(path)? {
            let (node, kind) = apply_entry(&scene, &entry);
            if let Err(e) = session.attach(&node, kind) {
                tracing::error!(node = %node, error = %e, "Skipping misconfigured behavior");
            }
        }
        tracing::info!(file = %path, behaviors = session.behavior_count(), "Loaded data bindings");
    }
    let session = Arc::new(Mutex::new(session));

    // Host frame loop
    let frame_session = session.clone();
    let mut frames = tokio::time::interval(Duration::from_millis(config.host.frame_millis.max(1)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::spawn(async move {
        loop {
            frames.tick().await;
            frame_session.lock().await.tick(Utc::now());
        }
    });

    // Create application state
    let state = Arc::new(AppState {
        context,
        scene,
        session,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/bindings", get(list_bindings))
        .route("/bindings/latest", get(latest_value))
        .route("/scene/nodes", get(scene_nodes))
        .route("/selected_entity", get(get_selected_entity).post(set_selected_entity))
        .route("/session/play", post(play_session))
        .route("/session/stop", post(stop_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .host
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.host.listen_addr))?;
    tracing::info!(%addr, "Starting twinmaker-scene-bridge");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
