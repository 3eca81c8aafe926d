pub mod body;
pub mod format;
pub mod sanitize;

pub use body::WireBody;
pub use format::{Field, FieldKind, FieldMap, FOLDER_FIELDS, NOTE_FIELDS};
pub use sanitize::sanitize;
