use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;

/// A storage row: column name -> value
pub type Row = Map<String, Value>;

/// The relations the API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Folders,
    Notes,
}

impl Relation {
    pub fn table_name(&self) -> &'static str {
        match self {
            Relation::Folders => "noteful_folders",
            Relation::Notes => "noteful_notes",
        }
    }

    /// Columns that may appear in an insert or update
    pub fn writable_columns(&self) -> &'static [&'static str] {
        match self {
            Relation::Folders => &["folder_name"],
            Relation::Notes => &["note_name", "content", "folder_id"],
        }
    }

    /// Whether storage stamps a `modified` column on every write
    pub fn tracks_modified(&self) -> bool {
        matches!(self, Relation::Notes)
    }

    /// Reject any column outside the writable set before it reaches SQL
    pub fn check_columns(&self, row: &Row) -> Result<(), DatabaseError> {
        let allowed = self.writable_columns();
        match row.keys().find(|column| !allowed.contains(&column.as_str())) {
            Some(column) => Err(DatabaseError::UnknownColumn {
                relation: self.table_name(),
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Row-level CRUD capability used by the resource handlers
#[async_trait]
pub trait Store: Send + Sync {
    /// All rows of a relation in ascending id order
    async fn list(&self, relation: Relation) -> Result<Vec<Row>, DatabaseError>;

    async fn get_by_id(&self, relation: Relation, id: i64) -> Result<Option<Row>, DatabaseError>;

    /// Insert a row and return it as stored, including generated columns
    async fn insert(&self, relation: Relation, row: Row) -> Result<Row, DatabaseError>;

    /// Apply a partial update, returning the number of affected rows
    async fn update(&self, relation: Relation, id: i64, partial: Row) -> Result<u64, DatabaseError>;

    /// Delete a row, returning the number of affected rows
    async fn delete(&self, relation: Relation, id: i64) -> Result<u64, DatabaseError>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> Result<(), DatabaseError>;
}
