// Infrastructure layer - External dependencies and adapters
pub mod binding_loader;
pub mod config;
pub mod scene_store;
pub mod twinmaker_client;
