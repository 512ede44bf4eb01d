// Domain layer - Bindings, values, rules and scene attributes
pub mod binding;
pub mod bounds;
pub mod error;
pub mod rule;
pub mod scene;
