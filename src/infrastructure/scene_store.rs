// In-memory scene graph
use crate::application::scene_graph::{SceneGraph, SceneNode};
use crate::domain::scene::{AttributeValue, ENTITY_ATTR};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Serialize)]
pub struct MemoryNode {
    path: String,
    attributes: BTreeMap<String, AttributeValue>,
}

impl MemoryNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }
}

impl SceneNode for MemoryNode {
    fn path(&self) -> &str {
        &self.path
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        self.attributes.insert(name.to_string(), value);
    }
}

#[derive(Default)]
pub struct SceneStore {
    nodes: RwLock<BTreeMap<String, MemoryNode>>,
    selected: RwLock<Option<String>>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, node: MemoryNode) {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node.path.clone(), node);
    }

    /// Set an attribute, creating the node if needed.
    pub fn set_attribute(&self, path: &str, name: &str, value: AttributeValue) {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_insert_with(|| MemoryNode::new(path))
            .set_attribute(name, value);
    }

    pub fn node(&self, path: &str) -> Option<MemoryNode> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn snapshot(&self) -> Vec<MemoryNode> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Select the node bound to `entity_id`. Returns false if no node is bound to it.
    pub fn select_entity(&self, entity_id: &str) -> bool {
        let path = self
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|n| n.attributes.get(ENTITY_ATTR).and_then(|v| v.as_text()) == Some(entity_id))
            .map(|n| n.path.clone());

        let found = path.is_some();
        *self.selected.write().unwrap_or_else(PoisonError::into_inner) = path;
        found
    }

    pub fn selected_entity(&self) -> Option<String> {
        let selected = self
            .selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        self.node(&selected)?
            .attribute(ENTITY_ATTR)
            .and_then(|v| v.as_text().map(str::to_string))
    }
}

impl SceneGraph for SceneStore {
    fn with_node(&self, path: &str, f: &mut dyn FnMut(&mut dyn SceneNode)) -> bool {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        match nodes.get_mut(path) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_node_mutates_in_place() {
        let store = SceneStore::new();
        store.insert(MemoryNode::new("/World/Mixer"));

        let found = store.with_node("/World/Mixer", &mut |node| {
            node.set_attribute("xformOp:scale", AttributeValue::Vec3([1.0, 1.0, 0.5]));
        });

        assert!(found);
        assert!(!store.with_node("/World/Missing", &mut |_| {}));
        assert_eq!(
            store.node("/World/Mixer").unwrap().attribute("xformOp:scale"),
            Some(AttributeValue::Vec3([1.0, 1.0, 0.5]))
        );
    }

    #[test]
    fn test_select_entity() {
        let store = SceneStore::new();
        store.set_attribute("/World/Mixer", ENTITY_ATTR, AttributeValue::Text("Mixer_0".into()));

        assert!(store.select_entity("Mixer_0"));
        assert_eq!(store.selected_entity(), Some("Mixer_0".to_string()));

        assert!(!store.select_entity("Unknown"));
        assert_eq!(store.selected_entity(), None);
    }
}
