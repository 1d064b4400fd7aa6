use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reason recorded on refunds issued by a cancellation
pub const DEFAULT_REFUND_REASON: &str = "no_reason";

/// Which appointment book a cancellation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentKind {
    /// Doctor consultation, `appointment` table
    Clinical,
    /// Lab test, `lab_appointment` table
    Lab,
}

/// Table layout and tags that differ between the two appointment books
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    pub table: &'static str,
    pub id_column: &'static str,
    pub bill_column: &'static str,
    pub payment_type: PaymentType,
    pub id_prefix: &'static str,
    pub id_seed: &'static str,
}

const CLINICAL: KindConfig = KindConfig {
    table: "appointment",
    id_column: "app_id",
    bill_column: "bill_id",
    payment_type: PaymentType::DoctorAppointment,
    id_prefix: "app",
    id_seed: "app001",
};

const LAB: KindConfig = KindConfig {
    table: "lab_appointment",
    id_column: "lab_appointment_id",
    bill_column: "bill_id",
    payment_type: PaymentType::LabAppointment,
    id_prefix: "lapp",
    id_seed: "lapp001",
};

impl AppointmentKind {
    pub fn config(self) -> &'static KindConfig {
        match self {
            AppointmentKind::Clinical => &CLINICAL,
            AppointmentKind::Lab => &LAB,
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentKind::Clinical => f.write_str("clinical"),
            AppointmentKind::Lab => f.write_str("lab"),
        }
    }
}

/// Refund payment-type tag, stored verbatim in `refund.payment_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "docApp")]
    DoctorAppointment,
    #[serde(rename = "labApp")]
    LabAppointment,
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::DoctorAppointment => "docApp",
            PaymentType::LabAppointment => "labApp",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docApp" => Ok(PaymentType::DoctorAppointment),
            "labApp" => Ok(PaymentType::LabAppointment),
            other => Err(format!("unknown payment type: {other}")),
        }
    }
}

/// Doctor or lab appointment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub kind: AppointmentKind,
    pub bill_id: Option<String>,
    pub cancelled: bool,
}

impl Appointment {
    pub fn new(id: impl Into<String>, kind: AppointmentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            bill_id: None,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn with_bill(mut self, bill_id: impl Into<String>) -> Self {
        self.bill_id = Some(bill_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub total: Decimal,
    pub refunded: bool,
}

impl Bill {
    pub fn new(id: impl Into<String>, total: Decimal) -> Self {
        Self {
            id: id.into(),
            total,
            refunded: false,
        }
    }
}

/// Bill joined to an appointment, as much as a refund needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillReference {
    pub bill_id: String,
    pub total: Decimal,
    pub refunded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub bill_id: String,
    pub payment_type: PaymentType,
    pub reason: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Refund {
    /// Refund of the whole bill total, stamped now. Partial refunds are
    /// never issued.
    pub fn full(
        id: impl Into<String>,
        bill: &BillReference,
        payment_type: PaymentType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            bill_id: bill.bill_id.clone(),
            payment_type,
            reason: reason.into(),
            amount: bill.total,
            created_at: Utc::now(),
        }
    }
}
