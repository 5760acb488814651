use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a credit application
pub type CreditId = Uuid;

/// unique identifier for a repayment installment
pub type InstallmentId = Uuid;

/// unique identifier for a customer
pub type CustomerId = Uuid;

/// know-your-customer verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KycStatus {
    Verified,
    NotVerified,
}

impl KycStatus {
    /// anything other than "verified" counts as not verified
    pub fn from_label(label: &str) -> Self {
        if label == "verified" {
            KycStatus::Verified
        } else {
            KycStatus::NotVerified
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, KycStatus::Verified)
    }
}

/// read-only view of a customer, supplied per decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub kyc_status: KycStatus,
    pub monthly_income: Option<Money>,
    pub credit_score: i32,
    pub is_premium: Option<bool>,
}

impl CustomerSnapshot {
    pub fn is_premium(&self) -> bool {
        self.is_premium.unwrap_or(false)
    }
}

/// outcome of scoring an applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
    /// needs manual review downstream
    PendingReview,
}

/// credit application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditStatus {
    /// set by the caller before scoring
    Pending,
    Approved,
    Rejected,
    PendingReview,
    /// funds disbursed, repayment in progress
    Active,
    /// fully repaid
    Completed,
    Defaulted,
}

impl From<Decision> for CreditStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => CreditStatus::Approved,
            Decision::Rejected => CreditStatus::Rejected,
            Decision::PendingReview => CreditStatus::PendingReview,
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// repayment installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepaymentStatus {
    Pending,
    Paid,
    Late,
    PartiallyPaid,
}

impl fmt::Display for RepaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
