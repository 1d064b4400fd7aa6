//! Database layer for RustCare role services
//!
//! Role services (cashier, pharmacist, receptionist) never talk to a driver
//! directly. They build SQL text and hand it to a [`DatabaseOperator`],
//! which owns connection management and marshals result sets into a
//! string [`Table`].
//!
//! # Key Features
//!
//! - **Operator capability**: `custom_insertion`, `custom_selection` and
//!   `show_table_data`, object safe and shareable behind `Arc`
//! - **Uniform results**: every cell rendered as text, header row always present
//! - **Literal quoting**: [`quote_literal`] for values spliced into statements
//! - **PostgreSQL**: [`PgOperator`] over a pooled `sqlx` connection
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use database_layer::{DatabaseConfig, DatabaseOperator, DatabasePool, PgOperator, quote_literal};
//!
//! # async fn run() -> Result<(), database_layer::DatabaseError> {
//! let pool = DatabasePool::connect(&DatabaseConfig::default()).await?;
//! let db = PgOperator::new(pool);
//!
//! let condition = format!("bill_id = {}", quote_literal("hms0009b"));
//! let refunds = db.show_table_data("refund", &["refund_id", "amount"], Some(&condition)).await?;
//! for row in 0..refunds.len() {
//!     println!("{:?}", refunds.value(row, "refund_id"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod executor;
pub mod operator;
pub mod query;
pub mod table;

pub use connection::*;
pub use error::*;
pub use executor::*;
pub use operator::*;
pub use query::*;
pub use table::*;
