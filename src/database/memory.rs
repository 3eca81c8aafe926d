use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{Relation, Row, Store};

/// In-process store mirroring the PostgreSQL schema: serial ids, a
/// `modified` stamp on notes, and `ON DELETE CASCADE` from folders to notes.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<Relation, BTreeMap<i64, Row>>,
    next_ids: HashMap<Relation, i64>,
}

impl Tables {
    fn table(&self, relation: Relation) -> Option<&BTreeMap<i64, Row>> {
        self.rows.get(&relation)
    }

    fn table_mut(&mut self, relation: Relation) -> &mut BTreeMap<i64, Row> {
        self.rows.entry(relation).or_default()
    }

    fn next_id(&mut self, relation: Relation) -> i64 {
        let next = self.next_ids.entry(relation).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }

    fn check_references(&self, relation: Relation, row: &Row) -> Result<(), DatabaseError> {
        if relation != Relation::Notes {
            return Ok(());
        }
        let Some(folder_id) = row.get("folder_id") else {
            return Ok(());
        };
        let exists = folder_id
            .as_i64()
            .and_then(|id| self.table(Relation::Folders).map(|t| t.contains_key(&id)))
            .unwrap_or(false);
        if exists {
            Ok(())
        } else {
            Err(DatabaseError::QueryError(format!(
                "insert or update on table \"{}\" violates foreign key constraint on folder_id",
                relation.table_name()
            )))
        }
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixture rows with explicit ids, bypassing column checks.
    ///
    /// Later inserts continue after the highest seeded id.
    pub async fn seed(&self, relation: Relation, rows: Vec<Row>) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        for mut row in rows {
            let id = row
                .get("id")
                .and_then(Value::as_i64)
                .ok_or_else(|| DatabaseError::QueryError("seed rows require an integer id".into()))?;
            tables.check_references(relation, &row)?;
            if relation.tracks_modified() && !row.contains_key("modified") {
                row.insert("modified".into(), now());
            }
            tables.table_mut(relation).insert(id, row);
            let next = tables.next_ids.entry(relation).or_insert(1);
            *next = (*next).max(id + 1);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list(&self, relation: Relation) -> Result<Vec<Row>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .table(relation)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_by_id(&self, relation: Relation, id: i64) -> Result<Option<Row>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.table(relation).and_then(|t| t.get(&id)).cloned())
    }

    async fn insert(&self, relation: Relation, mut row: Row) -> Result<Row, DatabaseError> {
        relation.check_columns(&row)?;
        let mut tables = self.tables.write().await;
        tables.check_references(relation, &row)?;

        let id = tables.next_id(relation);
        row.insert("id".into(), json!(id));
        if relation.tracks_modified() {
            row.insert("modified".into(), now());
        }
        tables.table_mut(relation).insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, relation: Relation, id: i64, partial: Row) -> Result<u64, DatabaseError> {
        relation.check_columns(&partial)?;
        if partial.is_empty() {
            return Ok(0);
        }
        let mut tables = self.tables.write().await;
        tables.check_references(relation, &partial)?;

        let Some(row) = tables.table_mut(relation).get_mut(&id) else {
            return Ok(0);
        };
        row.extend(partial);
        if relation.tracks_modified() {
            row.insert("modified".into(), now());
        }
        Ok(1)
    }

    async fn delete(&self, relation: Relation, id: i64) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.table_mut(relation).remove(&id).is_none() {
            return Ok(0);
        }
        if relation == Relation::Folders {
            tables
                .table_mut(Relation::Notes)
                .retain(|_, note| note.get("folder_id").and_then(Value::as_i64) != Some(id));
        }
        Ok(1)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
