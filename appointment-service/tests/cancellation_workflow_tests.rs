//! Cancellation workflow tests
//!
//! These tests run the workflow against the in-memory repository, wrapped
//! in a fault injector for the failure paths:
//! 1. Billed appointment is cancelled and fully refunded
//! 2. Unbilled appointment is cancelled without a refund
//! 3. Failing cancellation update stops the chain
//! 4. Failures in the refund tail are swallowed (legacy) or reported (strict)
//! 5. Re-cancelling never issues a second refund

use appointment_service::*;
use async_trait::async_trait;
use database_layer::DatabaseError;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Default, Clone, Copy)]
struct Faults {
    cancel_errors: bool,
    bill_lookup_errors: bool,
    refund_insert_errors: bool,
    refund_insert_affects_nothing: bool,
    bill_update_errors: bool,
    bill_update_affects_nothing: bool,
}

/// Delegates to the in-memory store unless a fault is switched on
struct FaultyRepository {
    inner: Arc<InMemoryAppointmentRepository>,
    faults: Faults,
    max_refund_override: Option<String>,
}

fn db_down() -> AppointmentError {
    AppointmentError::Database(DatabaseError::QueryFailed("connection reset".to_string()))
}

#[async_trait]
impl AppointmentRepository for FaultyRepository {
    async fn mark_cancelled(&self, kind: AppointmentKind, appointment_id: &str) -> AppointmentResult<bool> {
        if self.faults.cancel_errors {
            return Err(db_down());
        }
        self.inner.mark_cancelled(kind, appointment_id).await
    }

    async fn find_bill_for_appointment(
        &self,
        kind: AppointmentKind,
        appointment_id: &str,
    ) -> AppointmentResult<Option<BillReference>> {
        if self.faults.bill_lookup_errors {
            return Err(db_down());
        }
        self.inner.find_bill_for_appointment(kind, appointment_id).await
    }

    async fn max_refund_id(&self) -> AppointmentResult<Option<String>> {
        match &self.max_refund_override {
            Some(id) => Ok(Some(id.clone())),
            None => self.inner.max_refund_id().await,
        }
    }

    async fn insert_refund(&self, refund: &Refund) -> AppointmentResult<bool> {
        if self.faults.refund_insert_errors {
            return Err(db_down());
        }
        if self.faults.refund_insert_affects_nothing {
            return Ok(false);
        }
        self.inner.insert_refund(refund).await
    }

    async fn mark_bill_refunded(&self, bill_id: &str) -> AppointmentResult<bool> {
        if self.faults.bill_update_errors {
            return Err(db_down());
        }
        if self.faults.bill_update_affects_nothing {
            return Ok(false);
        }
        self.inner.mark_bill_refunded(bill_id).await
    }

    async fn max_appointment_id(&self, kind: AppointmentKind) -> AppointmentResult<Option<String>> {
        self.inner.max_appointment_id(kind).await
    }

    async fn refunds_for_bill(&self, bill_id: &str) -> AppointmentResult<Vec<Refund>> {
        self.inner.refunds_for_bill(bill_id).await
    }
}

fn hospital() -> Arc<InMemoryAppointmentRepository> {
    let repo = Arc::new(InMemoryAppointmentRepository::new());
    repo.insert_bill(Bill::new("hms0009b", Decimal::from(100)));
    repo.insert_bill(Bill::new("hms0012b", Decimal::new(245_075, 2)));
    repo.insert_appointment(Appointment::new("app036", AppointmentKind::Clinical).with_bill("hms0009b"));
    repo.insert_appointment(Appointment::new("app040", AppointmentKind::Clinical));
    repo.insert_appointment(Appointment::new("lapp004", AppointmentKind::Lab).with_bill("hms0012b"));
    repo
}

fn faulty(repo: &Arc<InMemoryAppointmentRepository>, faults: Faults) -> Arc<FaultyRepository> {
    Arc::new(FaultyRepository {
        inner: repo.clone(),
        faults,
        max_refund_override: None,
    })
}

// ============================================================================
// Happy paths
// ============================================================================

#[tokio::test]
async fn test_cancel_billed_appointment_issues_full_refund() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(repo.clone());

    assert!(workflow.cancel_appointment("app036").await);

    assert!(repo.appointment(AppointmentKind::Clinical, "app036").unwrap().cancelled);
    let refunds = repo.refunds();
    assert_eq!(refunds.len(), 1);
    let refund = &refunds[0];
    assert_eq!(refund.id, "r0001");
    assert_eq!(refund.bill_id, "hms0009b");
    assert_eq!(refund.payment_type, PaymentType::DoctorAppointment);
    assert_eq!(refund.payment_type.as_str(), "docApp");
    assert_eq!(refund.reason, "no_reason");
    assert_eq!(refund.amount, Decimal::from(100));
    assert!(repo.bill("hms0009b").unwrap().refunded);
}

#[tokio::test]
async fn test_lab_refund_continues_refund_sequence() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(repo.clone());

    assert!(workflow.cancel_appointment("app036").await);
    let outcome = workflow
        .cancel_detailed("lapp004", AppointmentKind::Lab)
        .await
        .unwrap();

    assert_eq!(
        outcome.refund,
        RefundOutcome::Refunded {
            refund_id: "r0002".to_string(),
            bill_id: "hms0012b".to_string(),
            amount: Decimal::new(245_075, 2),
        }
    );
    let lab_refund = repo.refunds_for_bill("hms0012b").await.unwrap();
    assert_eq!(lab_refund.len(), 1);
    assert_eq!(lab_refund[0].payment_type.as_str(), "labApp");
    assert_eq!(lab_refund[0].amount, repo.bill("hms0012b").unwrap().total);
}

#[tokio::test]
async fn test_refund_id_follows_stored_maximum() {
    let repo = hospital();
    let faulty = Arc::new(FaultyRepository {
        inner: repo.clone(),
        faults: Faults::default(),
        max_refund_override: Some("r0006".to_string()),
    });
    let workflow = AppointmentCancellationWorkflow::new(faulty);

    assert!(workflow.cancel_appointment("app036").await);
    assert_eq!(repo.refunds()[0].id, "r0007");
}

#[tokio::test]
async fn test_unbilled_appointment_needs_no_refund() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(repo.clone()).with_policy(CancellationPolicy::Strict);

    let outcome = workflow
        .cancel_detailed("app040", AppointmentKind::Clinical)
        .await
        .unwrap();
    assert_eq!(outcome.refund, RefundOutcome::NoBill);
    assert!(workflow.succeeded(&Ok(outcome)));

    assert!(repo.refunds().is_empty());
    assert!(!repo.bill("hms0009b").unwrap().refunded);
}

#[tokio::test]
async fn test_custom_refund_reason() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(repo.clone()).with_refund_reason("doctor_unavailable");

    assert!(workflow.cancel_appointment("app036").await);
    assert_eq!(repo.refunds()[0].reason, "doctor_unavailable");
}

// ============================================================================
// Fatal path
// ============================================================================

#[tokio::test]
async fn test_unknown_appointment_fails_without_side_effects() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(repo.clone());

    assert!(!workflow.cancel_appointment("app999").await);
    // Lab ids do not live in the doctor book
    assert!(!workflow.cancel_appointment("lapp004").await);

    let err = workflow
        .cancel_detailed("app999", AppointmentKind::Clinical)
        .await
        .unwrap_err();
    assert!(matches!(err, AppointmentError::NotCancelled(id) if id == "app999"));
    assert!(repo.refunds().is_empty());
}

#[tokio::test]
async fn test_cancel_update_error_stops_chain() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(faulty(
        &repo,
        Faults {
            cancel_errors: true,
            ..Faults::default()
        },
    ));

    assert!(!workflow.cancel_appointment("app036").await);

    assert!(!repo.appointment(AppointmentKind::Clinical, "app036").unwrap().cancelled);
    assert!(repo.refunds().is_empty());
    assert!(!repo.bill("hms0009b").unwrap().refunded);
}

// ============================================================================
// Best-effort tail
// ============================================================================

#[tokio::test]
async fn test_bill_lookup_error_is_treated_as_no_bill() {
    let repo = hospital();
    let faults = Faults {
        bill_lookup_errors: true,
        ..Faults::default()
    };

    let legacy = AppointmentCancellationWorkflow::new(faulty(&repo, faults));
    assert!(legacy.cancel_appointment("app036").await);
    assert!(repo.appointment(AppointmentKind::Clinical, "app036").unwrap().cancelled);
    assert!(repo.refunds().is_empty());

    let strict = AppointmentCancellationWorkflow::new(faulty(&repo, faults)).with_policy(CancellationPolicy::Strict);
    assert!(!strict.cancel_appointment("app036").await);
}

#[tokio::test]
async fn test_refund_insert_failure_is_swallowed() {
    for faults in [
        Faults {
            refund_insert_errors: true,
            ..Faults::default()
        },
        Faults {
            refund_insert_affects_nothing: true,
            ..Faults::default()
        },
    ] {
        let repo = hospital();
        let workflow = AppointmentCancellationWorkflow::new(faulty(&repo, faults));

        let outcome = workflow
            .cancel_detailed("app036", AppointmentKind::Clinical)
            .await
            .unwrap();
        assert_eq!(
            outcome.refund,
            RefundOutcome::RefundFailed {
                bill_id: "hms0009b".to_string()
            }
        );
        assert!(workflow.succeeded(&Ok(outcome)));
        assert!(repo.refunds().is_empty());
        assert!(!repo.bill("hms0009b").unwrap().refunded);
    }
}

#[tokio::test]
async fn test_bill_update_failure_leaves_refund_in_place() {
    let repo = hospital();
    let faults = Faults {
        bill_update_errors: true,
        ..Faults::default()
    };
    let workflow = AppointmentCancellationWorkflow::new(faulty(&repo, faults));

    assert!(workflow.cancel_appointment("app036").await);

    let refunds = repo.refunds();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].bill_id, "hms0009b");
    assert!(!repo.bill("hms0009b").unwrap().refunded);
}

#[tokio::test]
async fn test_strict_policy_reports_bill_update_failure() {
    let repo = hospital();
    let faults = Faults {
        bill_update_errors: true,
        ..Faults::default()
    };
    let workflow = AppointmentCancellationWorkflow::new(faulty(&repo, faults)).with_policy(CancellationPolicy::Strict);
    assert_eq!(workflow.policy(), CancellationPolicy::Strict);

    let result = workflow.cancel_detailed("app036", AppointmentKind::Clinical).await;
    assert_eq!(
        result.as_ref().unwrap().refund,
        RefundOutcome::BillUpdateFailed {
            refund_id: "r0001".to_string(),
            bill_id: "hms0009b".to_string(),
        }
    );
    assert!(!workflow.succeeded(&result));
    // The appointment stays cancelled either way
    assert!(repo.appointment(AppointmentKind::Clinical, "app036").unwrap().cancelled);
}

#[tokio::test]
async fn test_bill_update_matching_no_row_is_a_failure() {
    let repo = hospital();
    let faults = Faults {
        bill_update_affects_nothing: true,
        ..Faults::default()
    };

    let legacy = AppointmentCancellationWorkflow::new(faulty(&repo, faults));
    let result = legacy.cancel_detailed("app036", AppointmentKind::Clinical).await;
    assert_eq!(
        result.as_ref().unwrap().refund,
        RefundOutcome::BillUpdateFailed {
            refund_id: "r0001".to_string(),
            bill_id: "hms0009b".to_string(),
        }
    );
    assert!(legacy.succeeded(&result));
    assert_eq!(repo.refunds().len(), 1);
    assert!(!repo.bill("hms0009b").unwrap().refunded);

    let strict = AppointmentCancellationWorkflow::new(faulty(&repo, faults)).with_policy(CancellationPolicy::Strict);
    assert!(!strict.succeeded(&result));
}

#[tokio::test]
async fn test_malformed_refund_id_skips_refund() {
    let repo = hospital();
    let malformed = || {
        Arc::new(FaultyRepository {
            inner: repo.clone(),
            faults: Faults::default(),
            max_refund_override: Some("r".to_string()),
        })
    };

    let legacy = AppointmentCancellationWorkflow::new(malformed());
    assert!(legacy.cancel_appointment("app036").await);
    assert!(repo.appointment(AppointmentKind::Clinical, "app036").unwrap().cancelled);
    assert!(repo.refunds().is_empty());
    assert!(!repo.bill("hms0009b").unwrap().refunded);

    let strict = AppointmentCancellationWorkflow::new(malformed()).with_policy(CancellationPolicy::Strict);
    assert!(!strict.cancel_appointment("app036").await);
}

// ============================================================================
// Repeated cancellation
// ============================================================================

#[tokio::test]
async fn test_recancel_does_not_refund_twice() {
    let repo = hospital();
    let workflow = AppointmentCancellationWorkflow::new(repo.clone());

    assert!(workflow.cancel_appointment("app036").await);
    let outcome = workflow
        .cancel_detailed("app036", AppointmentKind::Clinical)
        .await
        .unwrap();

    assert_eq!(
        outcome.refund,
        RefundOutcome::AlreadyRefunded {
            bill_id: "hms0009b".to_string()
        }
    );
    assert_eq!(repo.refunds().len(), 1);
    assert!(repo.appointment(AppointmentKind::Clinical, "app036").unwrap().cancelled);
    assert!(repo.bill("hms0009b").unwrap().refunded);
}
