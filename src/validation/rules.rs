// Required-property rule sets for each resource

use serde_json::Value;

use super::{MessageTable, Rule, RuleSet, ValidationOutcome};

pub const FOLDER_RULES: RuleSet = RuleSet::new(&[Rule { property: "folderName", check: non_empty_text }]);

pub const NOTE_RULES: RuleSet = RuleSet::new(&[
    Rule { property: "noteName", check: non_empty_text },
    Rule { property: "content", check: non_empty_text },
    Rule { property: "folderId", check: positive_integer },
]);

pub const CUSTOM_INVALID_MESSAGES: MessageTable = MessageTable::new(&[(
    "folderId",
    "Invalid property provided: folderId -- must be a number",
)]);

pub fn non_empty_text(value: &Value) -> ValidationOutcome {
    ValidationOutcome::from_bool(value.as_str().is_some_and(|text| !text.is_empty()))
}

pub fn positive_integer(value: &Value) -> ValidationOutcome {
    ValidationOutcome::from_bool(value.as_i64().is_some_and(|n| n > 0))
}
