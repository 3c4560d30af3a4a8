use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }

    /// Interpret a status reported by the payment authority. Only a
    /// case-insensitive `SUCCESS` counts as success.
    pub fn from_gateway(status: &str) -> Self {
        if status.trim().eq_ignore_ascii_case("SUCCESS") {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::Internal(format!(
                "unknown payment status '{}'",
                other
            ))),
        }
    }
}

/// What the payment authority decided for one order. Transport failures are
/// already folded into a `Failed` outcome by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub message: Option<String>,
}

impl PaymentOutcome {
    pub const TRANSPORT_FAILURE_MESSAGE: &'static str = "something wrong!";

    pub fn transport_failure() -> Self {
        PaymentOutcome {
            status: PaymentStatus::Failed,
            transaction_id: None,
            message: Some(Self::TRANSPORT_FAILURE_MESSAGE.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

/// Stored payment record, one per finalized order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
