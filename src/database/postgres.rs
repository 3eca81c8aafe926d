use async_trait::async_trait;
use serde_json::Value;
use sqlx::{self, postgres::PgArguments, PgPool, Row as SqlxRow};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{Relation, Row, Store};

/// PostgreSQL-backed store. Rows come back through `row_to_json` so column
/// mapping stays in one place.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn table(relation: Relation) -> String {
    DatabaseManager::quote_identifier(relation.table_name())
}

fn decode_row(row: sqlx::postgres::PgRow) -> Result<Row, DatabaseError> {
    let value: Value = row.try_get("row")?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!(
            "unexpected row format: {}",
            other
        ))),
    }
}

fn insert_sql(relation: Relation, row: &Row) -> String {
    let columns: Vec<String> = row.keys().map(|c| DatabaseManager::quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "WITH inserted AS (INSERT INTO {} ({}) VALUES ({}) RETURNING *) \
         SELECT row_to_json(inserted) AS row FROM inserted",
        table(relation),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(relation: Relation, partial: &Row) -> String {
    let mut assignments: Vec<String> = partial
        .keys()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", DatabaseManager::quote_identifier(c), i + 1))
        .collect();
    if relation.tracks_modified() {
        assignments.push("\"modified\" = now()".to_string());
    }
    format!(
        "UPDATE {} SET {} WHERE id = ${}",
        table(relation),
        assignments.join(", "),
        partial.len() + 1
    )
}

#[async_trait]
impl Store for PgStore {
    async fn list(&self, relation: Relation) -> Result<Vec<Row>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} ORDER BY id) t",
            table(relation)
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn get_by_id(&self, relation: Relation, id: i64) -> Result<Option<Row>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE id = $1) t",
            table(relation)
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(decode_row).transpose()
    }

    async fn insert(&self, relation: Relation, row: Row) -> Result<Row, DatabaseError> {
        relation.check_columns(&row)?;
        let sql = insert_sql(relation, &row);

        let mut q = sqlx::query(&sql);
        for value in row.values() {
            q = bind_param_query(q, value);
        }
        let created = q.fetch_one(&self.pool).await?;
        decode_row(created)
    }

    async fn update(&self, relation: Relation, id: i64, partial: Row) -> Result<u64, DatabaseError> {
        relation.check_columns(&partial)?;
        if partial.is_empty() {
            return Ok(0);
        }
        let sql = update_sql(relation, &partial);

        let mut q = sqlx::query(&sql);
        for value in partial.values() {
            q = bind_param_query(q, value);
        }
        let result = q.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, relation: Relation, id: i64) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table(relation));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        other => q.bind(other.clone()),
    }
}
