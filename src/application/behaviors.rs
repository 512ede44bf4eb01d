// Visual behaviors driven by the latest bound value
use crate::application::binding_context::BindingContext;
use crate::application::scene_graph::{
    read_binding, read_rules, required_f64, required_text, text_list, SceneNode,
};
use crate::domain::binding::{DataBinding, DataPoint};
use crate::domain::bounds::DataBounds;
use crate::domain::error::ConfigurationError;
use crate::domain::rule::{evaluate, RuleExpression};
use crate::domain::scene::{
    hex_to_rgb, AttributeValue, Rgb, ALBEDO_ADD_ATTR, CHANGE_MAT_PATH_ATTR, DATA_MAX_ATTR,
    DATA_MIN_ATTR, DIFFUSE_TINT_ATTR, DISPLAY_COLOR_ATTR, MATERIAL_BINDING_ATTR, MAT_COLOR_ATTR,
    NONE_MARKER, SCALE_ATTR,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const RULE_ALBEDO_ADD: f64 = 0.5;
const HIGHLIGHT_COLOR: Rgb = [1.0, 0.0, 0.0];
const FALLBACK_COLOR: Rgb = [0.0, 0.0, 1.0];
const ALARM_ACTIVE: &str = "ACTIVE";

pub trait Behavior: Send {
    fn node_path(&self) -> &str;
    fn binding(&self) -> &DataBinding;
    fn on_play(&mut self, ctx: &BindingContext);
    fn on_stop(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode);
    fn on_update(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode);
    fn on_destroy(&mut self, ctx: &BindingContext);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    #[default]
    Shader,
    Scaler,
    Highlight,
}

/// Build the behavior of `kind` from the node's attributes.
pub fn attach(kind: BehaviorKind, node: &dyn SceneNode) -> Result<Box<dyn Behavior>, ConfigurationError> {
    Ok(match kind {
        BehaviorKind::Shader => Box::new(ModelShader::from_node(node)?),
        BehaviorKind::Scaler => Box::new(ModelScaler::from_node(node)?),
        BehaviorKind::Highlight => Box::new(AlarmHighlighter::from_node(node)?),
    })
}

/// Per-consumer subscription state: whether this consumer holds a
/// subscription, and the newest datapoint timestamp it has applied.
#[derive(Debug)]
struct Subscription {
    binding: DataBinding,
    subscribed: bool,
    last_seen: Option<DateTime<Utc>>,
}

impl Subscription {
    fn new(binding: DataBinding) -> Self {
        Self {
            binding,
            subscribed: false,
            last_seen: None,
        }
    }

    fn subscribe(&mut self, ctx: &BindingContext) {
        if !self.subscribed {
            ctx.subscribe(&self.binding);
            self.subscribed = true;
        }
    }

    fn unsubscribe(&mut self, ctx: &BindingContext) {
        if self.subscribed {
            ctx.unsubscribe(&self.binding);
            self.subscribed = false;
        }
    }

    /// The cached datapoint if it is newer than the last one returned.
    fn poll(&mut self, ctx: &BindingContext) -> Option<DataPoint> {
        if !self.subscribed {
            return None;
        }
        let latest = ctx.get_latest(&self.binding)?;
        if self.last_seen.is_some_and(|seen| latest.timestamp <= seen) {
            return None;
        }
        self.last_seen = Some(latest.timestamp);
        Some(latest)
    }
}

/// Per-rule visual change; `None` fields mean "leave unchanged".
#[derive(Debug, Clone, PartialEq)]
struct RuleVisual {
    color: Option<Rgb>,
    material_path: Option<String>,
}

fn marker(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty() && *v != NONE_MARKER)
}

/// Recolors or rebinds a node's material according to threshold rules.
pub struct ModelShader {
    node_path: String,
    subscription: Subscription,
    rules: Vec<RuleExpression>,
    visuals: Vec<RuleVisual>,
    default_tint: Rgb,
    default_albedo_add: f64,
    default_material: String,
}

impl ModelShader {
    pub fn from_node(node: &dyn SceneNode) -> Result<Self, ConfigurationError> {
        let binding = read_binding(node)?;
        let rules = read_rules(node)?;
        let colors = text_list(node, MAT_COLOR_ATTR);
        let materials = text_list(node, CHANGE_MAT_PATH_ATTR);

        if (!colors.is_empty() && colors.len() != rules.len())
            || (!materials.is_empty() && materials.len() != rules.len())
        {
            return Err(ConfigurationError::MismatchedRuleLists(node.path().to_string()));
        }

        let visuals = (0..rules.len())
            .map(|i| {
                let color = marker(colors.get(i)).map(hex_to_rgb).transpose()?;
                let material_path = marker(materials.get(i)).map(str::to_string);
                Ok(RuleVisual {
                    color,
                    material_path,
                })
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        Ok(Self {
            node_path: node.path().to_string(),
            subscription: Subscription::new(binding),
            rules,
            visuals,
            default_tint: node
                .attribute(DIFFUSE_TINT_ATTR)
                .and_then(|v| v.as_vec3())
                .unwrap_or([1.0, 1.0, 1.0]),
            default_albedo_add: node
                .attribute(ALBEDO_ADD_ATTR)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            default_material: required_text(node, MATERIAL_BINDING_ATTR)?,
        })
    }

    fn apply_rule(&self, index: usize, node: &mut dyn SceneNode) {
        let Some(visual) = self.visuals.get(index) else {
            return;
        };

        match (&visual.color, &visual.material_path) {
            (Some(color), _) => {
                node.set_attribute(DIFFUSE_TINT_ATTR, AttributeValue::Vec3(*color));
                node.set_attribute(ALBEDO_ADD_ATTR, AttributeValue::Float(RULE_ALBEDO_ADD));
            }
            (None, Some(path)) => {
                node.set_attribute(MATERIAL_BINDING_ATTR, AttributeValue::Text(path.clone()));
            }
            (None, None) => self.reset(node),
        }
    }

    fn reset(&self, node: &mut dyn SceneNode) {
        node.set_attribute(DIFFUSE_TINT_ATTR, AttributeValue::Vec3(self.default_tint));
        node.set_attribute(ALBEDO_ADD_ATTR, AttributeValue::Float(self.default_albedo_add));
        node.set_attribute(
            MATERIAL_BINDING_ATTR,
            AttributeValue::Text(self.default_material.clone()),
        );
    }
}

impl Behavior for ModelShader {
    fn node_path(&self) -> &str {
        &self.node_path
    }

    fn binding(&self) -> &DataBinding {
        &self.subscription.binding
    }

    fn on_play(&mut self, ctx: &BindingContext) {
        tracing::info!(node = %self.node_path, binding = %self.subscription.binding, "ModelShader playing");
        self.subscription.subscribe(ctx);
    }

    fn on_stop(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode) {
        self.reset(node);
        self.subscription.unsubscribe(ctx);
    }

    fn on_update(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode) {
        let Some(point) = self.subscription.poll(ctx) else {
            return;
        };
        let matched = evaluate(&self.rules, Some(&point.value));
        tracing::debug!(
            node = %self.node_path,
            value = %point.value,
            timestamp = %point.timestamp,
            matched = ?matched,
            "Evaluated rules"
        );
        if let Some(index) = matched {
            self.apply_rule(index, node);
        }
    }

    fn on_destroy(&mut self, ctx: &BindingContext) {
        self.subscription.unsubscribe(ctx);
    }
}

/// Drives the node's z scale from a value mapped through data bounds.
pub struct ModelScaler {
    node_path: String,
    subscription: Subscription,
    bounds: DataBounds,
    default_scale: Rgb,
}

impl ModelScaler {
    pub fn from_node(node: &dyn SceneNode) -> Result<Self, ConfigurationError> {
        let binding = read_binding(node)?;
        let bounds = DataBounds::new(
            required_f64(node, DATA_MIN_ATTR)?,
            required_f64(node, DATA_MAX_ATTR)?,
            0.0,
            1.0,
        )?;

        Ok(Self {
            node_path: node.path().to_string(),
            subscription: Subscription::new(binding),
            bounds,
            default_scale: node
                .attribute(SCALE_ATTR)
                .and_then(|v| v.as_vec3())
                .unwrap_or([1.0, 1.0, 1.0]),
        })
    }
}

impl Behavior for ModelScaler {
    fn node_path(&self) -> &str {
        &self.node_path
    }

    fn binding(&self) -> &DataBinding {
        &self.subscription.binding
    }

    fn on_play(&mut self, ctx: &BindingContext) {
        tracing::info!(node = %self.node_path, binding = %self.subscription.binding, "ModelScaler playing");
        self.subscription.subscribe(ctx);
    }

    fn on_stop(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode) {
        node.set_attribute(SCALE_ATTR, AttributeValue::Vec3(self.default_scale));
        self.subscription.unsubscribe(ctx);
    }

    fn on_update(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode) {
        let Some(point) = self.subscription.poll(ctx) else {
            return;
        };
        let Some(z) = point.value.as_f64().and_then(|v| self.bounds.normalize(v)) else {
            tracing::debug!(node = %self.node_path, value = %point.value, "Value outside data bounds");
            return;
        };

        let [x, y, _] = self.default_scale;
        node.set_attribute(SCALE_ATTR, AttributeValue::Vec3([x, y, z as f32]));
    }

    fn on_destroy(&mut self, ctx: &BindingContext) {
        self.subscription.unsubscribe(ctx);
    }
}

/// Paints the node red while its alarm property reads `ACTIVE`.
pub struct AlarmHighlighter {
    node_path: String,
    subscription: Subscription,
    default_color: Vec<Rgb>,
    alarm_active: bool,
    restored: bool,
}

impl AlarmHighlighter {
    pub fn from_node(node: &dyn SceneNode) -> Result<Self, ConfigurationError> {
        Ok(Self {
            node_path: node.path().to_string(),
            subscription: Subscription::new(read_binding(node)?),
            default_color: node
                .attribute(DISPLAY_COLOR_ATTR)
                .and_then(|v| v.as_vec3_list().map(<[Rgb]>::to_vec))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| vec![FALLBACK_COLOR]),
            alarm_active: false,
            restored: false,
        })
    }

    fn set_highlight(&mut self, node: &mut dyn SceneNode, highlight: bool) {
        if highlight {
            node.set_attribute(DISPLAY_COLOR_ATTR, AttributeValue::Vec3List(vec![HIGHLIGHT_COLOR]));
            self.restored = false;
        } else if !self.restored {
            node.set_attribute(DISPLAY_COLOR_ATTR, AttributeValue::Vec3List(self.default_color.clone()));
            self.restored = true;
        }
    }
}

impl Behavior for AlarmHighlighter {
    fn node_path(&self) -> &str {
        &self.node_path
    }

    fn binding(&self) -> &DataBinding {
        &self.subscription.binding
    }

    fn on_play(&mut self, ctx: &BindingContext) {
        tracing::info!(node = %self.node_path, binding = %self.subscription.binding, "AlarmHighlighter playing");
        self.subscription.subscribe(ctx);
    }

    fn on_stop(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode) {
        self.alarm_active = false;
        self.set_highlight(node, false);
        self.subscription.unsubscribe(ctx);
    }

    fn on_update(&mut self, ctx: &BindingContext, node: &mut dyn SceneNode) {
        if let Some(point) = self.subscription.poll(ctx) {
            self.alarm_active = point.value.as_str() == Some(ALARM_ACTIVE);
        }
        self.set_highlight(node, self.alarm_active);
    }

    fn on_destroy(&mut self, ctx: &BindingContext) {
        self.subscription.unsubscribe(ctx);
    }
}
