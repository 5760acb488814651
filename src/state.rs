//! Status state machines.
//!
//! Statuses are never overwritten directly; every change goes through
//! `transition`, which rejects moves the lifecycle does not allow.

use tracing::warn;

use crate::errors::{DomainError, Result};
use crate::types::{CreditStatus, RepaymentStatus};

impl CreditStatus {
    /// check whether `next` is reachable from the current status
    pub fn can_transition_to(self, next: CreditStatus) -> bool {
        use CreditStatus::*;

        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, PendingReview)
                | (PendingReview, Approved)
                | (PendingReview, Rejected)
                | (Approved, Active)
                | (Active, Completed)
                | (Active, Defaulted)
        )
    }

    /// move to `next`, rejecting transitions outside the lifecycle
    pub fn transition(self, next: CreditStatus) -> Result<CreditStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            warn!(from = %self, to = %next, "rejected credit status transition");
            Err(DomainError::InvalidTransition {
                entity: "credit",
                from: self.to_string(),
                to: next.to_string(),
            }
            .into())
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CreditStatus::Rejected | CreditStatus::Completed | CreditStatus::Defaulted
        )
    }
}

impl RepaymentStatus {
    /// check whether `next` is reachable from the current status.
    /// Late -> Late is allowed: remediation re-applies it on every run.
    pub fn can_transition_to(self, next: RepaymentStatus) -> bool {
        use RepaymentStatus::*;

        match self {
            Paid => false,
            Pending => matches!(next, Paid | Late | PartiallyPaid),
            Late | PartiallyPaid => matches!(next, Paid | Late | PartiallyPaid),
        }
    }

    /// move to `next`, rejecting transitions outside the lifecycle
    pub fn transition(self, next: RepaymentStatus) -> Result<RepaymentStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            warn!(from = %self, to = %next, "rejected repayment status transition");
            Err(DomainError::InvalidTransition {
                entity: "repayment",
                from: self.to_string(),
                to: next.to_string(),
            }
            .into())
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RepaymentStatus::Paid)
    }
}
