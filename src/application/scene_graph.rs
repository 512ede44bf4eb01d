// Ports for the scene graph the behaviors read from and write to
use crate::domain::binding::DataBinding;
use crate::domain::error::ConfigurationError;
use crate::domain::rule::RuleExpression;
use crate::domain::scene::{
    AttributeValue, COMPONENT_ATTR, ENTITY_ATTR, PROPERTY_ATTR, RULE_OP_ATTR, RULE_VAL_ATTR,
};

pub trait SceneNode {
    fn path(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<AttributeValue>;
    fn set_attribute(&mut self, name: &str, value: AttributeValue);
}

pub trait SceneGraph: Send + Sync {
    /// Run `f` against the node at `path`. Returns false if there is no such node.
    fn with_node(&self, path: &str, f: &mut dyn FnMut(&mut dyn SceneNode)) -> bool;
}

fn missing(node: &dyn SceneNode, attribute: &str) -> ConfigurationError {
    ConfigurationError::MissingAttribute {
        node: node.path().to_string(),
        attribute: attribute.to_string(),
    }
}

pub fn required_text(node: &dyn SceneNode, attribute: &str) -> Result<String, ConfigurationError> {
    node.attribute(attribute)
        .and_then(|v| v.as_text().map(str::to_string))
        .ok_or_else(|| missing(node, attribute))
}

pub fn required_f64(node: &dyn SceneNode, attribute: &str) -> Result<f64, ConfigurationError> {
    node.attribute(attribute)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| missing(node, attribute))
}

/// Absent list attributes read as empty.
pub fn text_list(node: &dyn SceneNode, attribute: &str) -> Vec<String> {
    node.attribute(attribute)
        .and_then(|v| v.as_text_list().map(<[String]>::to_vec))
        .unwrap_or_default()
}

pub fn read_binding(node: &dyn SceneNode) -> Result<DataBinding, ConfigurationError> {
    Ok(DataBinding::new(
        required_text(node, ENTITY_ATTR)?,
        required_text(node, COMPONENT_ATTR)?,
        required_text(node, PROPERTY_ATTR)?,
    ))
}

/// Rebuild the ordered rule list from the parallel operator/value lists.
pub fn read_rules(node: &dyn SceneNode) -> Result<Vec<RuleExpression>, ConfigurationError> {
    let property_name = required_text(node, PROPERTY_ATTR)?;
    let operators = text_list(node, RULE_OP_ATTR);
    let thresholds = text_list(node, RULE_VAL_ATTR);

    if operators.len() != thresholds.len() {
        return Err(ConfigurationError::MismatchedRuleLists(node.path().to_string()));
    }

    operators
        .iter()
        .zip(&thresholds)
        .map(|(op, threshold)| RuleExpression::parse(&property_name, op, threshold))
        .collect()
}
