use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{debug, error};

use crate::clock::Clock;
use crate::config::RemediationConfig;
use crate::errors::Result;
use crate::remediation::job::{OverdueRemediationJob, RemediationReport};
use crate::remediation::penalty::LatePenaltyPolicy;
use crate::store::TransactionalStore;

/// daily trigger for the remediation job.
///
/// `tick` is meant to be polled by the host (timer, cron, loop); it fires at
/// most once per calendar day, once `run_at` has passed. Taking `&mut self`
/// keeps runs through one scheduler from overlapping.
pub struct RemediationScheduler<S, C> {
    job: OverdueRemediationJob<S>,
    clock: C,
    run_at: NaiveTime,
    last_fired: Option<NaiveDate>,
}

impl<S: TransactionalStore, C: Clock> RemediationScheduler<S, C> {
    pub fn new(job: OverdueRemediationJob<S>, clock: C, run_at: NaiveTime) -> Self {
        Self {
            job,
            clock,
            run_at,
            last_fired: None,
        }
    }

    pub fn from_config(store: Arc<S>, clock: C, config: &RemediationConfig) -> Result<Self> {
        let job = OverdueRemediationJob::new(store, LatePenaltyPolicy::new(config.penalty_rate)?);
        Ok(Self::new(job, clock, config.run_at))
    }

    pub fn job(&self) -> &OverdueRemediationJob<S> {
        &self.job
    }

    /// day of the last tick that fired, successful or not
    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.last_fired
    }

    /// run immediately for the clock's current day; does not count as the daily firing
    pub fn run_now(&self) -> Result<RemediationReport> {
        self.run_for(self.clock.today())
    }

    /// run immediately for an arbitrary day
    pub fn run_for(&self, as_of: NaiveDate) -> Result<RemediationReport> {
        self.job.run(as_of)
    }

    /// fire the daily run if it is due. A failed run is reported and not
    /// retried until the next day.
    pub fn tick(&mut self) -> Result<Option<RemediationReport>> {
        let now = self.clock.now();
        let today = now.date_naive();

        if self.last_fired == Some(today) || now.time() < self.run_at {
            debug!(%now, last_fired = ?self.last_fired, "remediation not due");
            return Ok(None);
        }

        self.last_fired = Some(today);
        match self.job.run(today) {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                error!(%today, error = %err, "remediation run failed");
                Err(err)
            }
        }
    }

    /// moment from which the next `tick` fires
    pub fn next_fire_at(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        let today = now.date_naive();
        let fire_today = Utc.from_utc_datetime(&today.and_time(self.run_at));

        if self.last_fired == Some(today) {
            fire_today + Duration::days(1)
        } else if now < fire_today {
            fire_today
        } else {
            now
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{CreditApplication, RepaymentInstallment};
    use crate::decimal::{Money, Rate};
    use crate::errors::{CreditError, StoreError};
    use crate::store::{CreditStore, InMemoryStore, ScheduleStore};
    use crate::types::RepaymentStatus;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    type TestScheduler = RemediationScheduler<InMemoryStore, Arc<SafeTimeProvider>>;

    fn setup(start: DateTime<Utc>, run_at: NaiveTime) -> (Arc<SafeTimeProvider>, Arc<InMemoryStore>, TestScheduler, Uuid) {
        let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(start)));
        let store = Arc::new(InMemoryStore::new(time.clone()));

        let credit = store
            .save(CreditApplication::new(
                Uuid::new_v4(),
                Money::from_major(300),
                Rate::ZERO,
                1,
            ))
            .unwrap()
            .id
            .unwrap();
        let installment = RepaymentInstallment {
            id: Uuid::new_v4(),
            credit_id: credit,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            total_amount: Money::from_major(100),
            principal_amount: None,
            interest_amount: None,
            late_fee: Money::ZERO,
            status: RepaymentStatus::Pending,
        };
        store.save_all(&[installment.clone()]).unwrap();

        let config = RemediationConfig {
            run_at,
            ..RemediationConfig::default()
        };
        let scheduler = RemediationScheduler::from_config(store.clone(), time.clone(), &config).unwrap();
        (time, store, scheduler, installment.id)
    }

    #[test]
    fn test_negative_penalty_rate_rejected() {
        let store = Arc::new(InMemoryStore::new(SafeTimeProvider::new(TimeSource::System)));
        let config = RemediationConfig {
            penalty_rate: Rate::from_decimal(dec!(-0.05)),
            ..RemediationConfig::default()
        };

        let result = RemediationScheduler::from_config(store, SafeTimeProvider::new(TimeSource::System), &config);
        assert!(matches!(result, Err(CreditError::Domain(_))));
    }

    #[test]
    fn test_run_for_arbitrary_day() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (_time, store, scheduler, id) = setup(start, NaiveTime::MIN);

        let before = scheduler.run_for(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()).unwrap();
        assert_eq!(before.processed_count, 0);

        let after = scheduler.run_for(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()).unwrap();
        assert_eq!(after.processed_count, 1);
        assert_eq!(store.installment(id).unwrap().late_fee, Money::from_major(5));
    }

    #[test]
    fn test_run_now_uses_injected_clock() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let (time, store, scheduler, id) = setup(start, NaiveTime::MIN);
        let control = time.test_control().unwrap();

        // due today, not overdue yet
        assert_eq!(scheduler.run_now().unwrap().processed_count, 0);

        control.advance(Duration::days(1));
        let report = scheduler.run_now().unwrap();
        assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        assert_eq!(report.processed_count, 1);
        assert_eq!(store.installment(id).unwrap().status, RepaymentStatus::Late);
    }

    #[test]
    fn test_tick_fires_once_per_day() {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
        let (time, store, mut scheduler, id) = setup(start, NaiveTime::MIN);
        let control = time.test_control().unwrap();

        assert!(scheduler.tick().unwrap().is_some());
        control.advance(Duration::hours(6));
        assert!(scheduler.tick().unwrap().is_none());
        control.advance(Duration::hours(17));
        assert!(scheduler.tick().unwrap().is_none());

        control.advance(Duration::hours(1));
        let report = scheduler.tick().unwrap().unwrap();
        assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());

        // one penalty per daily firing
        assert_eq!(store.installment(id).unwrap().late_fee.as_decimal(), dec!(10));
    }

    #[test]
    fn test_tick_waits_for_fire_time() {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 1, 0, 0).unwrap();
        let run_at = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let (time, _store, mut scheduler, _id) = setup(start, run_at);
        let control = time.test_control().unwrap();

        assert_eq!(scheduler.next_fire_at(), Utc.with_ymd_and_hms(2024, 2, 5, 2, 30, 0).unwrap());
        assert!(scheduler.tick().unwrap().is_none());

        control.advance(Duration::minutes(90));
        assert!(scheduler.tick().unwrap().is_some());
        assert_eq!(scheduler.last_fired(), Some(NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()));
        assert_eq!(scheduler.next_fire_at(), Utc.with_ymd_and_hms(2024, 2, 6, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_failed_tick_not_retried_same_day() {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
        let (time, store, mut scheduler, id) = setup(start, NaiveTime::MIN);
        let control = time.test_control().unwrap();
        store.fail_writes_after(0);

        let err = scheduler.tick().unwrap_err();
        assert!(matches!(err, CreditError::Store(StoreError::Unavailable(_))));
        assert_eq!(store.installment(id).unwrap().late_fee, Money::ZERO);

        store.restore_writes();
        assert!(scheduler.tick().unwrap().is_none());

        control.advance(Duration::days(1));
        assert_eq!(scheduler.tick().unwrap().unwrap().processed_count, 1);
    }
}
