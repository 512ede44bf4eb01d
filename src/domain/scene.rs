// Scene node attribute model shared by behaviors and the scene store
use serde::Serialize;

use super::error::ConfigurationError;

pub const ENTITY_ATTR: &str = "entityId";
pub const COMPONENT_ATTR: &str = "componentName";
pub const PROPERTY_ATTR: &str = "propertyName";

pub const RULE_OP_ATTR: &str = "ruleOperator";
pub const RULE_VAL_ATTR: &str = "ruleValue";
pub const MAT_COLOR_ATTR: &str = "colorHex";
pub const CHANGE_MAT_PATH_ATTR: &str = "changeMaterialPath";

pub const DATA_MIN_ATTR: &str = "dataMin";
pub const DATA_MAX_ATTR: &str = "dataMax";

pub const DIFFUSE_TINT_ATTR: &str = "inputs:diffuse_tint";
pub const ALBEDO_ADD_ATTR: &str = "inputs:albedo_add";
pub const MATERIAL_BINDING_ATTR: &str = "material:binding";
pub const SCALE_ATTR: &str = "xformOp:scale";
pub const DISPLAY_COLOR_ATTR: &str = "primvars:displayColor";

/// Placeholder in per-rule attribute lists meaning "leave unchanged".
pub const NONE_MARKER: &str = "NONE";

pub type Rgb = [f32; 3];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    TextList(Vec<String>),
    Float(f64),
    Vec3(Rgb),
    Vec3List(Vec<Rgb>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::TextList(list) => Some(list),
            _ => None,
        }
    }

    /// Numeric attributes may be authored as floats or as numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Rgb> {
        match self {
            AttributeValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3_list(&self) -> Option<&[Rgb]> {
        match self {
            AttributeValue::Vec3List(v) => Some(v),
            _ => None,
        }
    }
}

/// Parse `#RRGGBB`, `0xRRGGBB` or `RRGGBB` into normalized RGB.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ConfigurationError> {
    let digits = hex
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");

    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ConfigurationError::InvalidColor(hex.to_string()));
    }

    let mut rgb = [0.0f32; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|_| ConfigurationError::InvalidColor(hex.to_string()))?;
        *channel = byte as f32 / 255.0;
    }

    Ok(rgb)
}
