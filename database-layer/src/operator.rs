// The persistence capability consumed by role services
use crate::error::DatabaseResult;
use crate::query::select_sql;
use crate::table::Table;
use async_trait::async_trait;
use std::sync::Arc;

/// Thin statement executor. Role services build SQL text and hand it to an
/// operator; the operator owns connections and result marshaling.
#[async_trait]
pub trait DatabaseOperator: Send + Sync {
    /// Execute a mutating statement.
    ///
    /// Returns whether at least one row was affected.
    async fn custom_insertion(&self, sql: &str) -> DatabaseResult<bool>;

    /// Execute a query and return its rows as strings.
    async fn custom_selection(&self, sql: &str) -> DatabaseResult<Table>;

    /// Select `columns` from `table`, optionally filtered by `condition`.
    async fn show_table_data(
        &self,
        table: &str,
        columns: &[&str],
        condition: Option<&str>,
    ) -> DatabaseResult<Table> {
        let sql = select_sql(table, columns, condition)?;
        self.custom_selection(&sql).await
    }
}

#[async_trait]
impl<T: DatabaseOperator + ?Sized> DatabaseOperator for Arc<T> {
    async fn custom_insertion(&self, sql: &str) -> DatabaseResult<bool> {
        (**self).custom_insertion(sql).await
    }

    async fn custom_selection(&self, sql: &str) -> DatabaseResult<Table> {
        (**self).custom_selection(sql).await
    }

    async fn show_table_data(
        &self,
        table: &str,
        columns: &[&str],
        condition: Option<&str>,
    ) -> DatabaseResult<Table> {
        (**self).show_table_data(table, columns, condition).await
    }
}
