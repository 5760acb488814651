use serde::Serialize;

use crate::application::RepaymentInstallment;
use crate::decimal::{Money, Rate};
use crate::errors::{DomainError, Result};

/// flat late penalty: a fixed share of the installment total, charged on
/// every remediation run that selects the installment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatePenaltyPolicy {
    rate: Rate,
}

impl Default for LatePenaltyPolicy {
    fn default() -> Self {
        Self {
            rate: Rate::from_percentage(5),
        }
    }
}

impl LatePenaltyPolicy {
    /// rejects a negative rate, which would credit the late fee
    pub fn new(rate: Rate) -> Result<Self> {
        if rate.is_negative() {
            return Err(DomainError::InvalidInterestRate { rate }.into());
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// penalty for one run; the total amount is the base, not the amount
    /// due, so earlier fees are not compounded into the base
    pub fn penalty_for(&self, installment: &RepaymentInstallment) -> Money {
        installment.total_amount.apply_rate(self.rate)
    }
}
