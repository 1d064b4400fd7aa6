//! Appointment cancellation and refund
//!
//! Cancelling is a fixed chain over three tables:
//!
//! 1. flag the appointment cancelled (the only fatal step)
//! 2. look up the bill joined to the appointment
//! 3. issue a full refund for the bill total and flag the bill refunded
//!
//! Failures after step 1 are logged and recorded in the
//! [`CancellationOutcome`]; whether they change the boolean reported by
//! [`AppointmentCancellationWorkflow::cancel`] depends on the
//! [`CancellationPolicy`]. Nothing is rolled back, so a refund row can exist
//! for a bill that is still flagged unrefunded.

use crate::error::{AppointmentError, AppointmentResult};
use crate::ids::next_refund_id;
use crate::models::*;
use crate::repository::AppointmentRepository;
use logger_redacted::{redacted_error, redacted_warn, PiiRedactor};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// How failures after the cancellation update are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationPolicy {
    /// Only the cancellation update decides the result
    #[default]
    LegacyCompatible,
    /// Any failed refund step makes the cancellation report failure
    Strict,
}

/// What happened to the bill after the appointment was cancelled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefundOutcome {
    /// The appointment carries no bill
    NoBill,
    /// The bill had been refunded before, nothing issued
    AlreadyRefunded { bill_id: String },
    Refunded {
        refund_id: String,
        bill_id: String,
        amount: Decimal,
    },
    /// The bill join failed; treated as no bill
    BillLookupFailed,
    /// No refund row was written
    RefundFailed { bill_id: String },
    /// Refund row written but the bill is still flagged unrefunded
    BillUpdateFailed { refund_id: String, bill_id: String },
}

impl RefundOutcome {
    /// True when the bill ended up in a consistent state
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            RefundOutcome::NoBill | RefundOutcome::AlreadyRefunded { .. } | RefundOutcome::Refunded { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationOutcome {
    pub appointment_id: String,
    pub kind: AppointmentKind,
    pub refund: RefundOutcome,
}

/// Cancels doctor and lab appointments and refunds their bills
pub struct AppointmentCancellationWorkflow {
    repository: Arc<dyn AppointmentRepository>,
    policy: CancellationPolicy,
    refund_reason: String,
    redactor: PiiRedactor,
}

impl AppointmentCancellationWorkflow {
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self {
            repository,
            policy: CancellationPolicy::default(),
            refund_reason: DEFAULT_REFUND_REASON.to_string(),
            redactor: PiiRedactor::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CancellationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_refund_reason(mut self, reason: impl Into<String>) -> Self {
        self.refund_reason = reason.into();
        self
    }

    #[must_use]
    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn policy(&self) -> CancellationPolicy {
        self.policy
    }

    /// Cancel a doctor appointment
    pub async fn cancel_appointment(&self, appointment_id: &str) -> bool {
        self.cancel(appointment_id, AppointmentKind::Clinical).await
    }

    /// Cancel a lab appointment
    pub async fn cancel_lab_appointment(&self, appointment_id: &str) -> bool {
        self.cancel(appointment_id, AppointmentKind::Lab).await
    }

    /// Cancel and refund, reporting only success or failure.
    ///
    /// Under [`CancellationPolicy::LegacyCompatible`] the result is `true`
    /// whenever the appointment row was flagged cancelled. Under
    /// [`CancellationPolicy::Strict`] the refund chain must also complete.
    pub async fn cancel(&self, appointment_id: &str, kind: AppointmentKind) -> bool {
        let result = self.cancel_detailed(appointment_id, kind).await;
        if let Err(e) = &result {
            redacted_error!(self.redactor, "Cancelling {} appointment {} failed: {}", kind, appointment_id, e);
        }
        self.succeeded(&result)
    }

    /// Boolean view of a detailed result under this workflow's policy
    pub fn succeeded(&self, result: &AppointmentResult<CancellationOutcome>) -> bool {
        match (result, self.policy) {
            (Ok(_), CancellationPolicy::LegacyCompatible) => true,
            (Ok(outcome), CancellationPolicy::Strict) => outcome.refund.is_complete(),
            (Err(_), _) => false,
        }
    }

    /// Cancel and refund, reporting what happened to the bill.
    ///
    /// # Errors
    ///
    /// Fails only when the cancellation update itself fails or matches no
    /// row; every later failure is folded into the returned outcome.
    #[instrument(skip(self))]
    pub async fn cancel_detailed(
        &self,
        appointment_id: &str,
        kind: AppointmentKind,
    ) -> AppointmentResult<CancellationOutcome> {
        if !self.repository.mark_cancelled(kind, appointment_id).await? {
            return Err(AppointmentError::NotCancelled(appointment_id.to_string()));
        }
        info!("Appointment {} cancelled", appointment_id);

        let refund = self.refund_bill(appointment_id, kind).await;
        Ok(CancellationOutcome {
            appointment_id: appointment_id.to_string(),
            kind,
            refund,
        })
    }

    async fn refund_bill(&self, appointment_id: &str, kind: AppointmentKind) -> RefundOutcome {
        let bill = match self.repository.find_bill_for_appointment(kind, appointment_id).await {
            Ok(Some(bill)) => bill,
            Ok(None) => {
                info!("Appointment {} has no bill, nothing to refund", appointment_id);
                return RefundOutcome::NoBill;
            }
            Err(e) => {
                redacted_warn!(self.redactor, "Bill lookup for appointment {} failed: {}", appointment_id, e);
                return RefundOutcome::BillLookupFailed;
            }
        };

        if bill.refunded {
            info!("Bill {} already refunded, skipping", bill.bill_id);
            return RefundOutcome::AlreadyRefunded { bill_id: bill.bill_id };
        }

        let refund_id = match self.allocate_refund_id().await {
            Ok(id) => id,
            Err(e) => {
                redacted_warn!(self.redactor, "Cannot allocate refund id for bill {}: {}", bill.bill_id, e);
                return RefundOutcome::RefundFailed { bill_id: bill.bill_id };
            }
        };

        let refund = Refund::full(
            refund_id,
            &bill,
            kind.config().payment_type,
            self.refund_reason.as_str(),
        );
        match self.repository.insert_refund(&refund).await {
            Ok(true) => info!(amount = %refund.amount, "Refund {} issued for bill {}", refund.id, bill.bill_id),
            Ok(false) => {
                redacted_warn!(self.redactor, "Refund {} for bill {} was not stored", refund.id, bill.bill_id);
                return RefundOutcome::RefundFailed { bill_id: bill.bill_id };
            }
            Err(e) => {
                redacted_warn!(self.redactor, "Refund {} for bill {} failed: {}", refund.id, bill.bill_id, e);
                return RefundOutcome::RefundFailed { bill_id: bill.bill_id };
            }
        }

        let bill_flagged = match self.repository.mark_bill_refunded(&bill.bill_id).await {
            Ok(updated) => updated,
            Err(e) => {
                redacted_warn!(self.redactor, "Flagging bill {} refunded failed: {}", bill.bill_id, e);
                false
            }
        };
        if !bill_flagged {
            redacted_warn!(
                self.redactor,
                "Refund {} exists but bill {} is still flagged unrefunded",
                refund.id,
                bill.bill_id
            );
            return RefundOutcome::BillUpdateFailed {
                refund_id: refund.id,
                bill_id: bill.bill_id,
            };
        }

        RefundOutcome::Refunded {
            refund_id: refund.id,
            bill_id: bill.bill_id,
            amount: refund.amount,
        }
    }

    // Not safe against a concurrent cancellation picking the same id
    async fn allocate_refund_id(&self) -> AppointmentResult<String> {
        let current_max = self.repository.max_refund_id().await?;
        Ok(next_refund_id(current_max.as_deref())?)
    }
}
