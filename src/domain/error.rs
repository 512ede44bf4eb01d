// Error taxonomy for binding setup and remote access
use super::binding::DataBinding;

/// Invalid binding or rule configuration. Fatal for the offending entity,
/// never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unsupported data type: {0}")]
    UnsupportedValueType(String),

    #[error("Unsupported rule operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid data bounds: max {max} must be greater than min {min}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("No scene node at {0}")]
    MissingNode(String),

    #[error("Node {node} is missing attribute {attribute}")]
    MissingAttribute { node: String, attribute: String },

    #[error("Rule attribute lists have different lengths on {0}")]
    MismatchedRuleLists(String),

    #[error("Invalid color hex: {0}")]
    InvalidColor(String),
}

/// Failure to learn a binding's value kind. Recovered by retrying next cycle.
#[derive(Debug, thiserror::Error)]
pub enum TypeResolutionError {
    #[error("Entity request failed: {0}")]
    Request(String),

    #[error("Property {0} not found on entity")]
    MissingProperty(DataBinding),

    #[error(transparent)]
    Unsupported(#[from] ConfigurationError),

    #[error("Type resolution timed out")]
    Timeout,
}

/// Failure to fetch a binding's latest value. Recovered by retrying next cycle.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("History request failed: {0}")]
    Request(String),

    #[error("Failed to decode history response: {0}")]
    Decode(String),

    #[error("Fetch timed out")]
    Timeout,
}
