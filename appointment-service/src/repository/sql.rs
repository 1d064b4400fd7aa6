//! SQL-text appointment repository
//!
//! Every operation renders one statement and hands it to a
//! [`DatabaseOperator`]. Values are spliced in through
//! [`quote_literal`]; table and column names only ever come from the
//! static [`KindConfig`](crate::models::KindConfig) tables.

use crate::error::{AppointmentError, AppointmentResult};
use crate::models::*;
use crate::repository::AppointmentRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use database_layer::{quote_literal, DatabaseOperator, Table};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

const BILL_TABLE: &str = "bill";
const REFUND_TABLE: &str = "refund";
const REFUND_COLUMNS: [&str; 6] = ["refund_id", "bill_id", "payment_type", "reason", "amount", "date"];

/// Appointment repository backed by any statement executor
pub struct SqlAppointmentRepository {
    db: Arc<dyn DatabaseOperator>,
}

impl SqlAppointmentRepository {
    pub fn new(db: Arc<dyn DatabaseOperator>) -> Self {
        Self { db }
    }

    fn mark_cancelled_sql(kind: AppointmentKind, appointment_id: &str) -> String {
        let cfg = kind.config();
        format!(
            "UPDATE {} SET cancelled = true WHERE {} = {}",
            cfg.table,
            cfg.id_column,
            quote_literal(appointment_id)
        )
    }

    fn bill_lookup_sql(kind: AppointmentKind, appointment_id: &str) -> String {
        let cfg = kind.config();
        format!(
            "SELECT {t}.{bill_col} AS bill_id, {BILL_TABLE}.total AS total, {BILL_TABLE}.refund AS refund \
             FROM {t} INNER JOIN {BILL_TABLE} ON {t}.{bill_col} = {BILL_TABLE}.bill_id \
             WHERE {t}.{id_col} = {id}",
            t = cfg.table,
            bill_col = cfg.bill_column,
            id_col = cfg.id_column,
            id = quote_literal(appointment_id),
        )
    }

    fn insert_refund_sql(refund: &Refund) -> String {
        format!(
            "INSERT INTO {REFUND_TABLE} ({}) VALUES ({}, {}, {}, {}, {}, {})",
            REFUND_COLUMNS.join(", "),
            quote_literal(&refund.id),
            quote_literal(&refund.bill_id),
            quote_literal(refund.payment_type.as_str()),
            quote_literal(&refund.reason),
            refund.amount,
            quote_literal(&refund.created_at.to_rfc3339()),
        )
    }

    fn mark_bill_refunded_sql(bill_id: &str) -> String {
        format!(
            "UPDATE {BILL_TABLE} SET refund = true WHERE bill_id = {}",
            quote_literal(bill_id)
        )
    }

    // Longest first so r10000 outranks r9999
    fn highest_id_sql(table: &str, column: &str) -> String {
        format!("SELECT {column} FROM {table} ORDER BY length({column}) DESC, {column} DESC LIMIT 1")
    }

    async fn select_highest_id(&self, table: &str, column: &str) -> AppointmentResult<Option<String>> {
        let sql = Self::highest_id_sql(table, column);
        let result = self.db.custom_selection(&sql).await?;
        Ok(result.value(0, column).map(str::to_string))
    }
}

#[async_trait]
impl AppointmentRepository for SqlAppointmentRepository {
    async fn mark_cancelled(&self, kind: AppointmentKind, appointment_id: &str) -> AppointmentResult<bool> {
        let sql = Self::mark_cancelled_sql(kind, appointment_id);
        debug!(%kind, "Marking appointment cancelled");
        Ok(self.db.custom_insertion(&sql).await?)
    }

    async fn find_bill_for_appointment(
        &self,
        kind: AppointmentKind,
        appointment_id: &str,
    ) -> AppointmentResult<Option<BillReference>> {
        let sql = Self::bill_lookup_sql(kind, appointment_id);
        let result = self.db.custom_selection(&sql).await?;

        let Some(bill_id) = result.value(0, "bill_id") else {
            return Ok(None);
        };
        let total = result
            .value(0, "total")
            .ok_or_else(|| AppointmentError::InvalidData(format!("bill {bill_id} has no total")))?;

        Ok(Some(BillReference {
            bill_id: bill_id.to_string(),
            total: parse_amount(total)?,
            refunded: result.value(0, "refund").map_or(Ok(false), parse_flag)?,
        }))
    }

    async fn max_refund_id(&self) -> AppointmentResult<Option<String>> {
        self.select_highest_id(REFUND_TABLE, "refund_id").await
    }

    async fn insert_refund(&self, refund: &Refund) -> AppointmentResult<bool> {
        let sql = Self::insert_refund_sql(refund);
        debug!(refund_id = %refund.id, "Inserting refund");
        Ok(self.db.custom_insertion(&sql).await?)
    }

    async fn mark_bill_refunded(&self, bill_id: &str) -> AppointmentResult<bool> {
        let sql = Self::mark_bill_refunded_sql(bill_id);
        Ok(self.db.custom_insertion(&sql).await?)
    }

    async fn max_appointment_id(&self, kind: AppointmentKind) -> AppointmentResult<Option<String>> {
        let cfg = kind.config();
        self.select_highest_id(cfg.table, cfg.id_column).await
    }

    async fn refunds_for_bill(&self, bill_id: &str) -> AppointmentResult<Vec<Refund>> {
        let condition = format!("bill_id = {} ORDER BY refund_id", quote_literal(bill_id));
        let table = self
            .db
            .show_table_data(REFUND_TABLE, &REFUND_COLUMNS, Some(&condition))
            .await?;
        (0..table.len()).map(|row| refund_from_row(&table, row)).collect()
    }
}

fn refund_from_row(table: &Table, row: usize) -> AppointmentResult<Refund> {
    let field = |column: &str| {
        table
            .value(row, column)
            .ok_or_else(|| AppointmentError::InvalidData(format!("refund row {row} has no {column}")))
    };

    Ok(Refund {
        id: field("refund_id")?.to_string(),
        bill_id: field("bill_id")?.to_string(),
        payment_type: field("payment_type")?
            .parse()
            .map_err(AppointmentError::InvalidData)?,
        reason: table.value(row, "reason").unwrap_or(DEFAULT_REFUND_REASON).to_string(),
        amount: parse_amount(field("amount")?)?,
        created_at: parse_timestamp(field("date")?)?,
    })
}

fn parse_amount(value: &str) -> AppointmentResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| AppointmentError::InvalidData(format!("invalid amount {value:?}: {e}")))
}

/// Boolean columns arrive as `true`/`false` from PostgreSQL and `1`/`0`
/// from older MySQL dumps
fn parse_flag(value: &str) -> AppointmentResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        other => Err(AppointmentError::InvalidData(format!("invalid flag {other:?}"))),
    }
}

fn parse_timestamp(value: &str) -> AppointmentResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| AppointmentError::InvalidData(format!("invalid timestamp {value:?}: {e}")))
}
