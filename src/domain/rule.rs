// Threshold rules that select a visual state from a property value
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::binding::Value;
use super::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperator {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl RuleOperator {
    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            RuleOperator::Eq => ordering == Ordering::Equal,
            RuleOperator::Gt => ordering == Ordering::Greater,
            RuleOperator::Lt => ordering == Ordering::Less,
            RuleOperator::Ge => ordering != Ordering::Less,
            RuleOperator::Le => ordering != Ordering::Greater,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOperator::Eq => "==",
            RuleOperator::Gt => ">",
            RuleOperator::Lt => "<",
            RuleOperator::Ge => ">=",
            RuleOperator::Le => "<=",
        }
    }
}

impl FromStr for RuleOperator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(RuleOperator::Eq),
            ">" => Ok(RuleOperator::Gt),
            "<" => Ok(RuleOperator::Lt),
            ">=" => Ok(RuleOperator::Ge),
            "<=" => Ok(RuleOperator::Le),
            other => Err(ConfigurationError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single threshold comparison. The threshold is kept as written in the
/// scene and decoded into the value's own kind when compared.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExpression {
    pub property_name: String,
    pub operator: RuleOperator,
    pub threshold: String,
}

impl RuleExpression {
    pub fn new(
        property_name: impl Into<String>,
        operator: RuleOperator,
        threshold: impl Into<String>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            threshold: threshold.into(),
        }
    }

    /// Build a rule from scene attribute strings, rejecting unknown operators.
    pub fn parse(
        property_name: &str,
        operator: &str,
        threshold: &str,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(property_name, operator.parse()?, threshold))
    }
}

/// Compare `value` against a rule threshold. Numeric values compare as f64
/// (a threshold that is not a number never matches); text compares as text.
pub fn apply_operator(value: &Value, operator: RuleOperator, threshold: &str) -> bool {
    let ordering = match value {
        Value::Number(v) => match threshold.trim().parse::<f64>() {
            Ok(t) => v.partial_cmp(&t),
            Err(_) => None,
        },
        Value::Text(v) => Some(v.as_str().cmp(threshold)),
    };

    ordering.is_some_and(|o| operator.holds(o))
}

/// Index of the first rule matching `value`; order is priority.
pub fn evaluate(rules: &[RuleExpression], value: Option<&Value>) -> Option<usize> {
    let value = value?;
    rules
        .iter()
        .position(|rule| apply_operator(value, rule.operator, &rule.threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(op: &str, threshold: &str) -> RuleExpression {
        RuleExpression::parse("temperature", op, threshold).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![rule(">", "100"), rule(">", "50")];
        assert_eq!(evaluate(&rules, Some(&Value::Number(150.0))), Some(0));
        assert_eq!(evaluate(&rules, Some(&Value::Number(75.0))), Some(1));
        assert_eq!(evaluate(&rules, Some(&Value::Number(10.0))), None);
    }

    #[test]
    fn test_absent_value_matches_nothing() {
        let rules = vec![rule("<=", "0")];
        assert_eq!(evaluate(&rules, None), None);
    }

    #[test]
    fn test_all_operators_on_numbers() {
        let v = Value::Number(5.0);
        assert!(apply_operator(&v, RuleOperator::Eq, "5"));
        assert!(apply_operator(&v, RuleOperator::Ge, "5.0"));
        assert!(apply_operator(&v, RuleOperator::Le, "5"));
        assert!(!apply_operator(&v, RuleOperator::Gt, "5"));
        assert!(apply_operator(&v, RuleOperator::Lt, "5.5"));
    }

    #[test]
    fn test_string_values_compare_as_text() {
        let rules = vec![rule("==", "ACTIVE"), rule("==", "SNOOZE_DISABLED")];
        assert_eq!(evaluate(&rules, Some(&Value::Text("ACTIVE".into()))), Some(0));
        assert_eq!(evaluate(&rules, Some(&Value::Text("NORMAL".into()))), None);
    }

    #[test]
    fn test_non_numeric_threshold_never_matches_number() {
        let v = Value::Number(1.0);
        assert!(!apply_operator(&v, RuleOperator::Eq, "ACTIVE"));
        assert!(!apply_operator(&Value::Number(f64::NAN), RuleOperator::Le, "1"));
    }

    #[test]
    fn test_unsupported_operator_rejected_at_parse() {
        let err = RuleExpression::parse("temperature", "!=", "3").unwrap_err();
        assert_eq!(err, ConfigurationError::UnsupportedOperator("!=".to_string()));
    }
}
