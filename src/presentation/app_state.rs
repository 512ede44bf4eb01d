// Application state for HTTP handlers
use crate::application::binding_context::BindingContext;
use crate::application::scene_session::SceneSession;
use crate::infrastructure::scene_store::SceneStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub context: BindingContext,
    pub scene: Arc<SceneStore>,
    pub session: Arc<Mutex<SceneSession>>,
}
