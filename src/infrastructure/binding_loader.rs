// Imports a data-binding file onto scene nodes
//
// Expected schema:
// [{
//   "primPath": "/World/Mixer",
//   "entityId": "...", "componentName": "...", "propertyName": "...",
//   "behavior": "shader" | "scaler" | "highlight",
//   "materialPath": "/World/Looks/Steel",
//   "dataMin": 0, "dataMax": 100,
//   "rules": [{ "ruleOperator": ">", "ruleValue": 100, "colorHex": "0xFF0000", "changeMaterialPath": "" }]
// }]
use crate::application::behaviors::BehaviorKind;
use crate::domain::scene::{
    AttributeValue, CHANGE_MAT_PATH_ATTR, COMPONENT_ATTR, DATA_MAX_ATTR, DATA_MIN_ATTR,
    ENTITY_ATTR, MATERIAL_BINDING_ATTR, MAT_COLOR_ATTR, NONE_MARKER, PROPERTY_ATTR, RULE_OP_ATTR,
    RULE_VAL_ATTR,
};
use crate::infrastructure::scene_store::SceneStore;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BindingEntry {
    pub prim_path: String,
    pub entity_id: String,
    pub component_name: String,
    pub property_name: String,
    #[serde(default)]
    pub behavior: BehaviorKind,
    #[serde(default)]
    pub material_path: Option<String>,
    #[serde(default)]
    pub data_min: Option<f64>,
    #[serde(default)]
    pub data_max: Option<f64>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub rule_operator: String,
    pub rule_value: serde_json::Value,
    #[serde(default)]
    pub color_hex: String,
    #[serde(default)]
    pub change_material_path: String,
}

pub fn load_binding_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<BindingEntry>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read binding file {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse binding file {}", path.display()))
}

fn or_none(value: &str) -> String {
    if value.is_empty() {
        NONE_MARKER.to_string()
    } else {
        value.to_string()
    }
}

fn threshold_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write an entry's binding, rules and bounds onto its node, replacing any
/// rule lists already there. Returns the behavior to attach to that node.
pub fn apply_entry(scene: &SceneStore, entry: &BindingEntry) -> (String, BehaviorKind) {
    let path = entry.prim_path.as_str();
    let text = |s: &str| AttributeValue::Text(s.to_string());
    let list = |f: &dyn Fn(&RuleEntry) -> String| {
        AttributeValue::TextList(entry.rules.iter().map(f).collect())
    };

    scene.set_attribute(path, ENTITY_ATTR, text(&entry.entity_id));
    scene.set_attribute(path, COMPONENT_ATTR, text(&entry.component_name));
    scene.set_attribute(path, PROPERTY_ATTR, text(&entry.property_name));

    scene.set_attribute(path, RULE_OP_ATTR, list(&|r| r.rule_operator.clone()));
    scene.set_attribute(path, RULE_VAL_ATTR, list(&|r| threshold_text(&r.rule_value)));
    scene.set_attribute(path, MAT_COLOR_ATTR, list(&|r| or_none(&r.color_hex)));
    scene.set_attribute(path, CHANGE_MAT_PATH_ATTR, list(&|r| or_none(&r.change_material_path)));

    if let Some(material) = &entry.material_path {
        scene.set_attribute(path, MATERIAL_BINDING_ATTR, text(material));
    }
    if let Some(min) = entry.data_min {
        scene.set_attribute(path, DATA_MIN_ATTR, AttributeValue::Float(min));
    }
    if let Some(max) = entry.data_max {
        scene.set_attribute(path, DATA_MAX_ATTR, AttributeValue::Float(max));
    }

    tracing::debug!(node = %path, rules = entry.rules.len(), "Applied data binding");
    (entry.prim_path.clone(), entry.behavior)
}
