// PostgreSQL implementation of DatabaseOperator
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::operator::DatabaseOperator;
use crate::table::Table;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Column, Executor, Row, TypeInfo};
use tracing::{debug, error};
use uuid::Uuid;

/// Executes raw statements against a pooled PostgreSQL connection and
/// marshals every result cell into a string.
#[derive(Clone)]
pub struct PgOperator {
    pool: DatabasePool,
}

impl PgOperator {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Column names for a statement that returned no rows
    async fn describe_columns(&self, sql: &str) -> DatabaseResult<Vec<String>> {
        let described = self.pool.pool().describe(sql).await.map_err(|e| {
            error!("Describe failed: {}", e);
            DatabaseError::QueryFailed(e.to_string())
        })?;
        Ok(described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }
}

#[async_trait]
impl DatabaseOperator for PgOperator {
    async fn custom_insertion(&self, sql: &str) -> DatabaseResult<bool> {
        debug!("Executing statement: {}", sql);

        let result = sqlx::query(sql)
            .execute(self.pool.pool())
            .await
            .map_err(|e| {
                error!("Statement failed: {}", e);
                DatabaseError::QueryFailed(e.to_string())
            })?;

        debug!(rows_affected = result.rows_affected(), "Statement completed");
        Ok(result.rows_affected() > 0)
    }

    async fn custom_selection(&self, sql: &str) -> DatabaseResult<Table> {
        debug!("Executing query: {}", sql);

        let rows = sqlx::query(sql)
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| {
                error!("Query failed: {}", e);
                DatabaseError::QueryFailed(e.to_string())
            })?;

        let Some(first) = rows.first() else {
            return Ok(Table::new(self.describe_columns(sql).await?));
        };

        let mut table = Table::new(first.columns().iter().map(|c| c.name().to_string()));
        for row in &rows {
            let cells = (0..row.len())
                .map(|idx| cell_to_string(row, idx))
                .collect::<DatabaseResult<Vec<_>>>()?;
            table.push_row(cells);
        }

        debug!(rows = table.len(), "Query completed");
        Ok(table)
    }
}

/// Render one cell as text; NULL becomes an empty string.
fn cell_to_string(row: &PgRow, idx: usize) -> DatabaseResult<String> {
    let column = row.try_column(idx)?;
    let type_name = column.type_info().name();

    let value = match type_name {
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" | "UNKNOWN" => {
            row.try_get::<Option<String>, _>(idx)?
        }
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| v.to_string()),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| v.to_string()),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(|v| v.to_string()),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| v.to_string()),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(|v| v.to_string()),
        "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx)?.map(|v| v.to_string()),
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(|v| v.to_string()),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(|v| v.to_string()),
        "TIME" => row.try_get::<Option<NaiveTime>, _>(idx)?.map(|v| v.to_string()),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(|v| v.to_string()),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| v.to_rfc3339()),
        "UUID" => row.try_get::<Option<Uuid>, _>(idx)?.map(|v| v.to_string()),
        other => {
            return Err(DatabaseError::UnsupportedColumnType {
                column: column.name().to_string(),
                type_name: other.to_string(),
            })
        }
    };

    Ok(value.unwrap_or_default())
}
