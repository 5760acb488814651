use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{round_half_up, Money, Rate, CURRENCY_SCALE};
use crate::errors::{DomainError, Result};
use crate::types::RepaymentStatus;

/// installment descriptor produced by the calculator, before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub total_amount: Money,
    pub late_fee: Money,
    pub status: RepaymentStatus,
}

/// flat-rate pricing of a credit, independent of dates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentQuote {
    pub principal: Money,
    pub interest_rate: Rate,
    pub duration_months: u32,
    pub total_interest: Money,
    pub total_to_repay: Money,
    pub monthly_payment: Money,
}

impl PaymentQuote {
    /// lay the quote out as monthly installments following `start_date`
    pub fn schedule(&self, start_date: NaiveDate) -> Result<Vec<ScheduledInstallment>> {
        (1..=self.duration_months)
            .map(|i| {
                let due_date = add_months(start_date, i).ok_or(DomainError::ScheduleOutOfRange {
                    start: start_date,
                    months: self.duration_months,
                })?;
                Ok(ScheduledInstallment {
                    installment_number: i,
                    due_date,
                    total_amount: self.monthly_payment,
                    late_fee: Money::ZERO,
                    status: RepaymentStatus::Pending,
                })
            })
            .collect()
    }

    /// sum of all installments minus the amount actually owed.
    /// Bounded by one cent per installment.
    pub fn rounding_drift(&self) -> Money {
        self.monthly_payment * Decimal::from(self.duration_months) - self.total_to_repay
    }
}

/// quote plus its dated installments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPlan {
    pub quote: PaymentQuote,
    pub installments: Vec<ScheduledInstallment>,
}

impl AmortizationPlan {
    pub fn monthly_payment(&self) -> Money {
        self.quote.monthly_payment
    }

    pub fn scheduled_total(&self) -> Money {
        self.installments.iter().map(|i| i.total_amount).sum()
    }
}

/// flat-rate calculator: interest on the full principal for the whole term,
/// spread evenly across every month
#[derive(Debug, Clone, Copy)]
pub struct AmortizationCalculator {
    scale: u32,
}

impl Default for AmortizationCalculator {
    fn default() -> Self {
        Self::new(CURRENCY_SCALE)
    }
}

impl AmortizationCalculator {
    /// `scale` is the number of decimals kept by each half-up rounding step
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// validate the inputs and price the credit
    pub fn quote(
        &self,
        amount: Money,
        interest_rate: Rate,
        duration_months: u32,
    ) -> Result<PaymentQuote> {
        validate(amount, interest_rate, duration_months)?;

        // amounts near the decimal range would overflow the total
        let too_large = || DomainError::InvalidAmount { amount };
        let interest = amount
            .as_decimal()
            .checked_mul(interest_rate.as_decimal())
            .ok_or_else(too_large)?;
        let total_interest = Money::from_decimal(round_half_up(interest, self.scale));
        let total = amount
            .as_decimal()
            .checked_add(total_interest.as_decimal())
            .ok_or_else(too_large)?;
        let total_to_repay = Money::from_decimal(total);
        let monthly_payment = Money::from_decimal(round_half_up(
            total / Decimal::from(duration_months),
            self.scale,
        ));

        Ok(PaymentQuote {
            principal: amount,
            interest_rate,
            duration_months,
            total_interest,
            total_to_repay,
            monthly_payment,
        })
    }

    /// compute the monthly payment and one installment per month after `start_date`
    pub fn build_schedule(
        &self,
        amount: Money,
        interest_rate: Rate,
        duration_months: u32,
        start_date: NaiveDate,
    ) -> Result<AmortizationPlan> {
        let quote = self.quote(amount, interest_rate, duration_months)?;
        let installments = quote.schedule(start_date)?;
        Ok(AmortizationPlan { quote, installments })
    }
}

fn validate(amount: Money, interest_rate: Rate, duration_months: u32) -> Result<()> {
    if duration_months < 1 {
        return Err(DomainError::InvalidDuration { months: duration_months }.into());
    }
    if amount.is_negative() {
        return Err(DomainError::InvalidAmount { amount }.into());
    }
    if interest_rate.is_negative() {
        return Err(DomainError::InvalidInterestRate { rate: interest_rate }.into());
    }
    Ok(())
}

/// calendar-month addition, clamped to the last day of shorter months
fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
