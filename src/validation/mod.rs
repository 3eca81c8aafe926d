//! Rule-set validation for incoming resource payloads.
//!
//! A [`RuleSet`] names the required wire properties of a resource together
//! with the predicate that decides whether a supplied value is acceptable.
//! Validation never fails with an error type: it produces a
//! [`ValidationReport`] that handlers turn into a 400 response.

pub mod rules;

use serde_json::{Map, Value};

use crate::error::ErrorBody;

/// Result of running a single property predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid,
}

impl ValidationOutcome {
    pub fn from_bool(valid: bool) -> Self {
        if valid {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid
        }
    }
}

pub type Predicate = fn(&Value) -> ValidationOutcome;

/// A required property and the predicate its value must satisfy.
#[derive(Clone, Copy)]
pub struct Rule {
    pub property: &'static str,
    pub check: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("property", &self.property).finish()
    }
}

/// Ordered set of required properties for one resource type.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    rules: &'static [Rule],
}

impl RuleSet {
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Required property names in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &'static str> {
        self.rules.iter().map(|rule| rule.property)
    }
}

/// Override messages for invalid properties, keyed by wire property name.
#[derive(Debug, Clone, Copy)]
pub struct MessageTable {
    entries: &'static [(&'static str, &'static str)],
}

impl MessageTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    pub fn get(&self, property: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == property)
            .map(|(_, message)| *message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing_props: Vec<String>,
    pub invalid_props: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.missing_props.is_empty() && self.invalid_props.is_empty()
    }
}

/// A key mapped to JSON `null` counts as absent.
fn lookup<'a>(record: &'a Map<String, Value>, property: &str) -> Option<&'a Value> {
    record.get(property).filter(|value| !value.is_null())
}

/// Classify every rule-set property as missing, invalid, or fine.
///
/// Missing takes precedence over invalid, so the two lists are disjoint.
/// Both lists follow the rule set's declaration order.
pub fn validate_properties(record: &Map<String, Value>, rule_set: &RuleSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    for rule in rule_set.rules() {
        match lookup(record, rule.property) {
            None => report.missing_props.push(rule.property.to_string()),
            Some(value) => {
                if (rule.check)(value) == ValidationOutcome::Invalid {
                    report.invalid_props.push(rule.property.to_string());
                }
            }
        }
    }

    report
}

/// Validate only the rule-set properties present in `record`.
///
/// Used for partial updates, where absent properties keep their stored value.
pub fn validate_present(record: &Map<String, Value>, rule_set: &RuleSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    for rule in rule_set.rules() {
        if let Some(value) = lookup(record, rule.property) {
            if (rule.check)(value) == ValidationOutcome::Invalid {
                report.invalid_props.push(rule.property.to_string());
            }
        }
    }

    report
}

/// Count the rule-set properties present (and non-null) in `record`.
pub fn count_present(record: &Map<String, Value>, rule_set: &RuleSet) -> usize {
    rule_set
        .properties()
        .filter(|property| lookup(record, property).is_some())
        .count()
}

/// Build the user-facing error body for a failed validation.
///
/// Missing properties are reported first and exclusively. Otherwise each
/// invalid property contributes its custom message (or a generated one) and
/// the messages are joined with `"; "`.
pub fn create_validation_error_object(report: &ValidationReport, custom_messages: &MessageTable) -> ErrorBody {
    if !report.missing_props.is_empty() {
        return ErrorBody::new(format!(
            "Required properties are missing: {}",
            report.missing_props.join(", ")
        ));
    }

    let message = report
        .invalid_props
        .iter()
        .map(|prop| match custom_messages.get(prop) {
            Some(custom) => custom.to_string(),
            None => format!("Invalid property provided: {}", prop),
        })
        .collect::<Vec<_>>()
        .join("; ");

    ErrorBody::new(message)
}
