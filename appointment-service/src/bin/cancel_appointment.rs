//! Appointment cancellation tool
//!
//! Cancels one doctor or lab appointment and refunds its bill, for front
//! desk staff working outside the main application.
//!
//! Usage:
//!   cargo run --bin cancel_appointment -- app036
//!   cargo run --bin cancel_appointment -- lapp004 --lab --strict
//!
//! Configuration is read from `--config`, then `RUSTCARE__*` variables;
//! `DATABASE_URL` or `--database-url` override the connection string.

use anyhow::{bail, Context};
use appointment_service::{AppointmentKind, CancellationPolicy, ServiceConfig, SqlAppointmentRepository};
use clap::Parser;
use database_layer::{DatabasePool, PgOperator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cancel_appointment")]
#[command(about = "Cancel an appointment and refund its bill")]
struct Args {
    /// Appointment id, e.g. app036 or lapp004
    appointment_id: String,

    /// Target the lab appointment book
    #[arg(long)]
    lab: bool,

    /// Report failure when the refund does not complete
    #[arg(long)]
    strict: bool,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the detailed outcome as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if args.strict {
        config.cancellation.policy = CancellationPolicy::Strict;
    }
    if args.verbose {
        config.logging.log_level = "debug".to_string();
    }

    logger_redacted::init(&config.logging)?;

    let kind = if args.lab {
        AppointmentKind::Lab
    } else {
        AppointmentKind::Clinical
    };

    let pool = DatabasePool::connect(&config.database).await?;
    info!("✅ Connected to database");

    let repository = Arc::new(SqlAppointmentRepository::new(Arc::new(PgOperator::new(pool.clone()))));
    let workflow = config.cancellation_workflow(repository);

    let cancelled = if args.json {
        let result = workflow.cancel_detailed(&args.appointment_id, kind).await;
        match &result {
            Ok(outcome) => println!("{}", serde_json::to_string_pretty(outcome)?),
            Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
        }
        workflow.succeeded(&result)
    } else {
        workflow.cancel(&args.appointment_id, kind).await
    };

    pool.close().await;

    if !cancelled {
        bail!("Cancellation of {} appointment {} failed", kind, args.appointment_id);
    }
    println!("Cancelled {} appointment {}", kind, args.appointment_id);
    Ok(())
}
