// SQL text helpers for statements handed to a DatabaseOperator
use crate::error::{DatabaseError, DatabaseResult};

/// Render a string as a single-quoted SQL literal.
///
/// Embedded quotes are doubled and NUL bytes dropped, which is enough for
/// PostgreSQL with `standard_conforming_strings` on (the default since 9.1).
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\0' => {}
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Accepts plain or schema-qualified identifiers such as `refund` or
/// `public.lab_appointment`.
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Build the `SELECT` used by `show_table_data`.
///
/// Column entries are taken verbatim so callers may pass `*` or aggregate
/// expressions; an empty list selects every column. The condition is appended
/// as-is; literals inside it must already be quoted with [`quote_literal`].
pub fn select_sql(table: &str, columns: &[&str], condition: Option<&str>) -> DatabaseResult<String> {
    if !is_safe_identifier(table) {
        return Err(DatabaseError::QueryFailed(format!("Invalid table name: {table}")));
    }

    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    };

    let mut sql = format!("SELECT {projection} FROM {table}");
    if let Some(condition) = condition.map(str::trim).filter(|c| !c.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
    Ok(sql)
}
