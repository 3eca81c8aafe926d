use serde_json::{Map, Value};

use crate::api::sanitize::sanitize;

/// How a field is treated when crossing the wire/storage boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Generated by storage, never written from the wire
    Id,
    /// Free text, sanitized on the way out
    Text,
    Integer,
    /// Set by storage on write, never written from the wire
    Timestamp,
}

impl FieldKind {
    pub fn is_writable(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Integer)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub external: &'static str,
    pub internal: &'static str,
    pub kind: FieldKind,
}

/// Explicit wire <-> storage field table for one resource.
///
/// Fields not listed here never cross the boundary in either direction.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    fields: &'static [Field],
}

pub const FOLDER_FIELDS: FieldMap = FieldMap::new(&[
    Field { external: "id", internal: "id", kind: FieldKind::Id },
    Field { external: "folderName", internal: "folder_name", kind: FieldKind::Text },
]);

pub const NOTE_FIELDS: FieldMap = FieldMap::new(&[
    Field { external: "id", internal: "id", kind: FieldKind::Id },
    Field { external: "noteName", internal: "note_name", kind: FieldKind::Text },
    Field { external: "content", internal: "content", kind: FieldKind::Text },
    Field { external: "folderId", internal: "folder_id", kind: FieldKind::Integer },
    Field { external: "modified", internal: "modified", kind: FieldKind::Timestamp },
]);

impl FieldMap {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Storage columns a client may write
    pub fn writable_columns(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|field| field.kind.is_writable())
            .map(|field| field.internal)
    }

    /// Translate a wire object into a storage row.
    ///
    /// Only writable fields are copied; unknown keys and explicit nulls are
    /// dropped.
    pub fn to_storage(&self, external: &Map<String, Value>) -> Map<String, Value> {
        let mut row = Map::new();
        for field in self.fields.iter().filter(|field| field.kind.is_writable()) {
            if let Some(value) = external.get(field.external).filter(|value| !value.is_null()) {
                row.insert(field.internal.to_string(), value.clone());
            }
        }
        row
    }

    /// Translate a storage row into the wire object returned to clients,
    /// sanitizing every text field.
    pub fn to_external(&self, internal: &Map<String, Value>) -> Map<String, Value> {
        let mut object = Map::new();
        for field in self.fields {
            let Some(value) = internal.get(field.internal) else {
                continue;
            };
            let value = match (field.kind, value) {
                (FieldKind::Text, Value::String(text)) => Value::String(sanitize(text)),
                _ => value.clone(),
            };
            object.insert(field.external.to_string(), value);
        }
        object
    }
}
