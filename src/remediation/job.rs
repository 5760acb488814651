use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decimal::Money;
use crate::errors::Result;
use crate::remediation::penalty::LatePenaltyPolicy;
use crate::store::{ScheduleStore, TransactionalStore};

/// outcome of one remediation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationReport {
    pub as_of: NaiveDate,
    pub processed_count: usize,
    pub total_penalty: Money,
}

/// daily batch marking overdue installments late and charging the penalty.
///
/// Every installment due before `as_of` and not paid is selected, including
/// ones already late, so the penalty is charged again on each run.
pub struct OverdueRemediationJob<S> {
    store: Arc<S>,
    policy: LatePenaltyPolicy,
}

impl<S: TransactionalStore> OverdueRemediationJob<S> {
    pub fn new(store: Arc<S>, policy: LatePenaltyPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &LatePenaltyPolicy {
        &self.policy
    }

    /// remediate everything overdue as of `as_of`; all-or-nothing
    pub fn run(&self, as_of: NaiveDate) -> Result<RemediationReport> {
        info!(%as_of, "starting overdue remediation run");

        let report = self.store.transaction(|tx| {
            let overdue = tx.find_overdue(as_of)?;
            let mut total_penalty = Money::ZERO;

            for mut installment in overdue.iter().cloned() {
                let penalty = installment.mark_late(self.policy.penalty_for(&installment))?;
                tx.save_installment(&installment)?;
                total_penalty += penalty;

                warn!(
                    installment_id = %installment.id,
                    credit_id = %installment.credit_id,
                    due_date = %installment.due_date,
                    %penalty,
                    late_fee = %installment.late_fee,
                    "late penalty applied"
                );
            }

            Ok(RemediationReport {
                as_of,
                processed_count: overdue.len(),
                total_penalty,
            })
        })?;

        info!(
            %as_of,
            processed = report.processed_count,
            total_penalty = %report.total_penalty,
            "overdue remediation run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{CreditApplication, RepaymentInstallment};
    use crate::decimal::Rate;
    use crate::errors::{CreditError, StoreError};
    use crate::store::{CreditStore, InMemoryStore};
    use crate::types::{CreditId, RepaymentStatus};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Arc<InMemoryStore>, CreditId) {
        let store = Arc::new(InMemoryStore::new(SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))));
        let credit = store
            .save(CreditApplication::new(
                Uuid::new_v4(),
                Money::from_major(1_000),
                Rate::from_percentage(12),
                3,
            ))
            .unwrap()
            .id
            .unwrap();
        (store, credit)
    }

    fn seed(store: &InMemoryStore, credit_id: CreditId, due: NaiveDate, status: RepaymentStatus) -> RepaymentInstallment {
        let installment = RepaymentInstallment {
            id: Uuid::new_v4(),
            credit_id,
            due_date: due,
            total_amount: Money::from_str_exact("373.33").unwrap(),
            principal_amount: None,
            interest_amount: None,
            late_fee: Money::ZERO,
            status,
        };
        store.save_all(&[installment.clone()]).unwrap();
        installment
    }

    fn job(store: &Arc<InMemoryStore>) -> OverdueRemediationJob<InMemoryStore> {
        OverdueRemediationJob::new(store.clone(), LatePenaltyPolicy::default())
    }

    #[test]
    fn test_overdue_installment_marked_late_with_penalty() {
        let (store, credit) = setup();
        let overdue = seed(&store, credit, date(2024, 2, 1), RepaymentStatus::Pending);

        let report = job(&store).run(date(2024, 2, 2)).unwrap();

        assert_eq!(report.processed_count, 1);
        assert_eq!(report.total_penalty.as_decimal(), dec!(18.6665));
        let updated = store.installment(overdue.id).unwrap();
        assert_eq!(updated.status, RepaymentStatus::Late);
        assert_eq!(updated.late_fee.as_decimal(), dec!(18.6665));
    }

    #[test]
    fn test_repeated_runs_accumulate_penalty() {
        // current policy: an installment stays selected while unpaid and is
        // charged again on every run, even on the same day
        let (store, credit) = setup();
        let overdue = seed(&store, credit, date(2024, 2, 1), RepaymentStatus::Pending);
        let job = job(&store);
        let as_of = date(2024, 2, 10);

        job.run(as_of).unwrap();
        let first = store.installment(overdue.id).unwrap();
        job.run(as_of).unwrap();
        let second = store.installment(overdue.id).unwrap();

        assert_eq!(first.status, RepaymentStatus::Late);
        assert_eq!(second.status, RepaymentStatus::Late);
        assert_eq!(first.late_fee.as_decimal(), dec!(18.6665));
        assert_eq!(second.late_fee.as_decimal(), dec!(37.333));
        assert!(second.late_fee > first.late_fee);
    }

    #[test]
    fn test_report_total_matches_stored_fees() {
        let (store, credit) = setup();
        let seeded: Vec<RepaymentInstallment> = [date(2024, 1, 10), date(2024, 1, 20)]
            .into_iter()
            .map(|due| seed(&store, credit, due, RepaymentStatus::Pending))
            .collect();

        let report = job(&store).run(date(2024, 2, 1)).unwrap();

        let stored: Money = seeded
            .iter()
            .map(|i| store.installment(i.id).unwrap().late_fee)
            .sum();
        assert_eq!(report.total_penalty, stored);
        assert_eq!(stored.as_decimal(), dec!(37.333));
    }

    #[test]
    fn test_paid_and_not_yet_due_untouched() {
        let (store, credit) = setup();
        let as_of = date(2024, 3, 1);
        let paid = seed(&store, credit, date(2024, 2, 1), RepaymentStatus::Paid);
        let due_today = seed(&store, credit, as_of, RepaymentStatus::Pending);
        let future = seed(&store, credit, date(2024, 4, 1), RepaymentStatus::Pending);
        let partial = seed(&store, credit, date(2024, 2, 15), RepaymentStatus::PartiallyPaid);

        let report = job(&store).run(as_of).unwrap();

        assert_eq!(report.processed_count, 1);
        assert_eq!(store.installment(paid.id).unwrap(), paid);
        assert_eq!(store.installment(due_today.id).unwrap(), due_today);
        assert_eq!(store.installment(future.id).unwrap(), future);
        assert_eq!(store.installment(partial.id).unwrap().status, RepaymentStatus::Late);
    }

    #[test]
    fn test_nothing_overdue() {
        let (store, credit) = setup();
        seed(&store, credit, date(2024, 5, 1), RepaymentStatus::Pending);
        let writes = store.write_count();

        let report = job(&store).run(date(2024, 2, 1)).unwrap();

        assert_eq!(report.processed_count, 0);
        assert_eq!(report.total_penalty, Money::ZERO);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn test_failed_write_aborts_whole_run() {
        let (store, credit) = setup();
        let seeded: Vec<RepaymentInstallment> = [date(2024, 1, 10), date(2024, 1, 20), date(2024, 1, 30)]
            .into_iter()
            .map(|due| seed(&store, credit, due, RepaymentStatus::Pending))
            .collect();
        store.fail_writes_after(2);

        let err = job(&store).run(date(2024, 2, 1)).unwrap_err();

        assert!(matches!(err, CreditError::Store(StoreError::Unavailable(_))));
        for installment in &seeded {
            let stored = store.installment(installment.id).unwrap();
            assert_eq!(stored.status, RepaymentStatus::Pending);
            assert_eq!(stored.late_fee, Money::ZERO);
        }

        store.restore_writes();
        let report = job(&store).run(date(2024, 2, 1)).unwrap();
        assert_eq!(report.processed_count, 3);
    }
}
