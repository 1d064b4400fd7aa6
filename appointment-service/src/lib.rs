//! Appointment Service for hospital front-desk roles
//!
//! Provides the receptionist and cashier operations around appointments:
//! - Doctor and lab appointment cancellation
//! - Full refunds of the attached bill
//! - Sequential `app###` / `lapp###` / `r####` identifier allocation
//! - Repository implementations over SQL text and in memory

pub mod allocator;
pub mod settings;
pub mod error;
pub mod ids;
pub mod models;
pub mod repository;
pub mod workflow;

pub use allocator::*;
pub use settings::*;
pub use error::*;
pub use ids::*;
pub use models::*;
pub use repository::{AppointmentRepository, InMemoryAppointmentRepository, SqlAppointmentRepository};
pub use workflow::*;
