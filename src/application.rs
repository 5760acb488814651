use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{percentage, Money, Rate};
use crate::errors::Result;
use crate::payments::ScheduledInstallment;
use crate::types::{CreditId, CreditStatus, CustomerId, InstallmentId, RepaymentStatus};

/// credit application and the repayment schedule it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditApplication {
    /// assigned by the credit store on first save
    pub id: Option<CreditId>,
    pub customer_id: CustomerId,
    pub amount: Money,
    /// held as a fraction, persisted as a percentage (`12` for 12%)
    #[serde(with = "percentage")]
    pub interest_rate: Rate,
    pub duration_months: u32,
    /// set only once the approval path has run amortization
    pub monthly_payment: Option<Money>,
    pub status: CreditStatus,
    /// assigned by the credit store on first save, never changed afterwards
    pub created_at: Option<DateTime<Utc>>,
    /// ordered by due date
    pub installments: Vec<RepaymentInstallment>,
}

impl CreditApplication {
    /// create a new application awaiting a decision
    pub fn new(
        customer_id: CustomerId,
        amount: Money,
        interest_rate: Rate,
        duration_months: u32,
    ) -> Self {
        Self {
            id: None,
            customer_id,
            amount,
            interest_rate,
            duration_months,
            monthly_payment: None,
            status: CreditStatus::Pending,
            created_at: None,
            installments: Vec::new(),
        }
    }

    /// apply a status change through the credit state machine
    pub fn update_status(&mut self, next: CreditStatus) -> Result<()> {
        self.status = self.status.transition(next)?;
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// sum of installment totals, late fees excluded
    pub fn scheduled_total(&self) -> Money {
        self.installments.iter().map(|i| i.total_amount).sum()
    }

    /// sum of late fees accrued across the schedule
    pub fn accrued_late_fees(&self) -> Money {
        self.installments.iter().map(|i| i.late_fee).sum()
    }
}

/// one repayment installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentInstallment {
    pub id: InstallmentId,
    /// parent application, for lookup only
    pub credit_id: CreditId,
    pub due_date: NaiveDate,
    pub total_amount: Money,
    /// not computed by the flat-rate calculator
    pub principal_amount: Option<Money>,
    /// not computed by the flat-rate calculator
    pub interest_amount: Option<Money>,
    pub late_fee: Money,
    pub status: RepaymentStatus,
}

impl RepaymentInstallment {
    /// materialize a scheduled installment for a persisted credit
    pub fn from_schedule(credit_id: CreditId, scheduled: &ScheduledInstallment) -> Self {
        Self {
            id: Uuid::new_v4(),
            credit_id,
            due_date: scheduled.due_date,
            total_amount: scheduled.total_amount,
            principal_amount: None,
            interest_amount: None,
            late_fee: Money::ZERO,
            status: RepaymentStatus::Pending,
        }
    }

    /// overdue as of `as_of`: due strictly before it and not paid
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.due_date < as_of && self.status != RepaymentStatus::Paid
    }

    /// mark late and add `penalty` to the accrued fee; returns the fee
    /// actually charged, never negative
    pub fn mark_late(&mut self, penalty: Money) -> Result<Money> {
        self.status = self.status.transition(RepaymentStatus::Late)?;
        let charged = penalty.max(Money::ZERO);
        self.late_fee += charged;
        Ok(charged)
    }

    /// amount owed including accrued late fees
    pub fn amount_due(&self) -> Money {
        self.total_amount + self.late_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn installment(due: NaiveDate, status: RepaymentStatus) -> RepaymentInstallment {
        RepaymentInstallment {
            id: Uuid::new_v4(),
            credit_id: Uuid::new_v4(),
            due_date: due,
            total_amount: Money::from_major(100),
            principal_amount: None,
            interest_amount: None,
            late_fee: Money::ZERO,
            status,
        }
    }

    #[test]
    fn test_new_application_is_pending() {
        let app = CreditApplication::new(
            Uuid::new_v4(),
            Money::from_major(1_000),
            Rate::from_percentage(12),
            3,
        );
        assert_eq!(app.status, CreditStatus::Pending);
        assert!(!app.is_persisted());
        assert!(app.monthly_payment.is_none());
        assert!(app.installments.is_empty());
    }

    #[test]
    fn test_interest_rate_persisted_as_percentage() {
        let app = CreditApplication::new(
            Uuid::new_v4(),
            Money::from_major(1_000),
            Rate::from_percentage_decimal(dec!(12.5)),
            3,
        );

        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["interest_rate"], serde_json::json!("12.5"));

        let parsed: CreditApplication = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.interest_rate.as_decimal(), dec!(0.125));
        assert_eq!(parsed, app);
    }

    #[test]
    fn test_overdue_boundaries() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let pending = installment(due, RepaymentStatus::Pending);

        assert!(!pending.is_overdue(due));
        assert!(pending.is_overdue(due.succ_opt().unwrap()));
        assert!(!installment(due, RepaymentStatus::Paid).is_overdue(due.succ_opt().unwrap()));
    }

    #[test]
    fn test_mark_late_accumulates_fee() {
        let mut item = installment(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), RepaymentStatus::Pending);

        item.mark_late(Money::from_major(5)).unwrap();
        item.mark_late(Money::from_major(5)).unwrap();

        assert_eq!(item.status, RepaymentStatus::Late);
        assert_eq!(item.late_fee, Money::from_major(10));
        assert_eq!(item.amount_due().as_decimal(), dec!(110));
    }

    #[test]
    fn test_mark_late_rejects_paid() {
        let mut item = installment(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), RepaymentStatus::Paid);
        assert!(item.mark_late(Money::from_major(5)).is_err());
        assert_eq!(item.late_fee, Money::ZERO);
    }

    #[test]
    fn test_mark_late_reports_charged_fee() {
        let mut item = installment(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), RepaymentStatus::Pending);

        assert_eq!(item.mark_late(Money::from_major(-3)).unwrap(), Money::ZERO);
        assert_eq!(item.mark_late(Money::from_major(4)).unwrap(), Money::from_major(4));
        assert_eq!(item.late_fee, Money::from_major(4));
    }
}
