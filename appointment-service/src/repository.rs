use crate::error::{AppointmentError, AppointmentResult};
use crate::ids::compare_ids;
use crate::models::*;
use async_trait::async_trait;
use dashmap::DashMap;
use database_layer::DatabaseError;
use std::sync::Arc;

pub mod sql;

pub use sql::SqlAppointmentRepository;

/// Persistence operations behind appointment cancellation
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Flag the appointment cancelled. `false` when no row matched.
    async fn mark_cancelled(&self, kind: AppointmentKind, appointment_id: &str) -> AppointmentResult<bool>;

    /// Bill attached to the appointment, if any (inner join semantics)
    async fn find_bill_for_appointment(
        &self,
        kind: AppointmentKind,
        appointment_id: &str,
    ) -> AppointmentResult<Option<BillReference>>;

    /// Highest refund id on record
    async fn max_refund_id(&self) -> AppointmentResult<Option<String>>;

    async fn insert_refund(&self, refund: &Refund) -> AppointmentResult<bool>;

    async fn mark_bill_refunded(&self, bill_id: &str) -> AppointmentResult<bool>;

    /// Highest appointment id of the given book
    async fn max_appointment_id(&self, kind: AppointmentKind) -> AppointmentResult<Option<String>>;

    async fn refunds_for_bill(&self, bill_id: &str) -> AppointmentResult<Vec<Refund>>;
}

/// In-memory appointment store for testing and development
pub struct InMemoryAppointmentRepository {
    appointments: Arc<DashMap<(AppointmentKind, String), Appointment>>,
    bills: Arc<DashMap<String, Bill>>,
    refunds: Arc<DashMap<String, Refund>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self {
            appointments: Arc::new(DashMap::new()),
            bills: Arc::new(DashMap::new()),
            refunds: Arc::new(DashMap::new()),
        }
    }

    pub fn insert_appointment(&self, appointment: Appointment) {
        self.appointments
            .insert((appointment.kind, appointment.id.clone()), appointment);
    }

    pub fn insert_bill(&self, bill: Bill) {
        self.bills.insert(bill.id.clone(), bill);
    }

    pub fn appointment(&self, kind: AppointmentKind, appointment_id: &str) -> Option<Appointment> {
        self.appointments
            .get(&(kind, appointment_id.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn bill(&self, bill_id: &str) -> Option<Bill> {
        self.bills.get(bill_id).map(|entry| entry.value().clone())
    }

    /// All refunds ordered by id
    pub fn refunds(&self) -> Vec<Refund> {
        let mut refunds: Vec<Refund> = self.refunds.iter().map(|entry| entry.value().clone()).collect();
        refunds.sort_by(|a, b| compare_ids(&a.id, &b.id));
        refunds
    }

    fn constraint_violation(message: String) -> AppointmentError {
        AppointmentError::Database(DatabaseError::QueryFailed(message))
    }
}

impl Default for InMemoryAppointmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn mark_cancelled(&self, kind: AppointmentKind, appointment_id: &str) -> AppointmentResult<bool> {
        match self.appointments.get_mut(&(kind, appointment_id.to_string())) {
            Some(mut entry) => {
                entry.cancelled = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_bill_for_appointment(
        &self,
        kind: AppointmentKind,
        appointment_id: &str,
    ) -> AppointmentResult<Option<BillReference>> {
        // Release the appointment shard before touching the bill map
        let bill_id = self
            .appointments
            .get(&(kind, appointment_id.to_string()))
            .and_then(|entry| entry.bill_id.clone());

        Ok(bill_id.and_then(|id| {
            self.bills.get(&id).map(|bill| BillReference {
                bill_id: bill.id.clone(),
                total: bill.total,
                refunded: bill.refunded,
            })
        }))
    }

    async fn max_refund_id(&self) -> AppointmentResult<Option<String>> {
        Ok(self
            .refunds
            .iter()
            .map(|entry| entry.key().clone())
            .max_by(|a, b| compare_ids(a, b)))
    }

    async fn insert_refund(&self, refund: &Refund) -> AppointmentResult<bool> {
        if !self.bills.contains_key(&refund.bill_id) {
            return Err(Self::constraint_violation(format!(
                "refund {} references unknown bill {}",
                refund.id, refund.bill_id
            )));
        }

        match self.refunds.entry(refund.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Self::constraint_violation(format!(
                "duplicate refund id {}",
                refund.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(refund.clone());
                Ok(true)
            }
        }
    }

    async fn mark_bill_refunded(&self, bill_id: &str) -> AppointmentResult<bool> {
        match self.bills.get_mut(bill_id) {
            Some(mut bill) => {
                bill.refunded = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn max_appointment_id(&self, kind: AppointmentKind) -> AppointmentResult<Option<String>> {
        Ok(self
            .appointments
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| entry.key().1.clone())
            .max_by(|a, b| compare_ids(a, b)))
    }

    async fn refunds_for_bill(&self, bill_id: &str) -> AppointmentResult<Vec<Refund>> {
        Ok(self
            .refunds()
            .into_iter()
            .filter(|refund| refund.bill_id == bill_id)
            .collect())
    }
}
