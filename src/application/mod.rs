// Application layer - Ports, the fetch pipeline and scene behaviors
pub mod behaviors;
pub mod binding_context;
pub mod binding_registry;
pub mod fetch_scheduler;
pub mod remote_value_client;
pub mod scene_graph;
pub mod scene_session;
pub mod value_cache;
