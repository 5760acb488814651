use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::{CreditApplication, RepaymentInstallment};
use crate::clock::Clock;
use crate::errors::{Result, StoreError};
use crate::store::{
    CreditStore, CustomerDirectory, ScheduleStore, StoreResult, TransactionalStore,
};
use crate::types::{CreditId, CustomerId, CustomerSnapshot, InstallmentId};

#[derive(Debug, Clone, Default)]
struct StoreData {
    credits: HashMap<CreditId, CreditApplication>,
    installments: HashMap<InstallmentId, RepaymentInstallment>,
}

/// remaining successful writes before every write fails, shared with staged copies
type WriteBudget = Arc<Mutex<Option<usize>>>;

/// in-memory credit and schedule store, safe to share across threads.
///
/// A transaction holds the data lock for its whole duration and runs against a
/// staged copy; the copy replaces the committed data only when the work succeeds.
/// The work must go through the store it is handed, not the outer one.
/// Writes can be made to fail on demand to exercise rollback paths.
pub struct InMemoryStore {
    data: Mutex<StoreData>,
    budget: WriteBudget,
    /// committed write calls
    writes: AtomicUsize,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryStore {
    pub fn new(clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            data: Mutex::new(StoreData::default()),
            budget: Arc::new(Mutex::new(None)),
            writes: AtomicUsize::new(0),
            clock: Arc::new(clock),
        }
    }

    /// let `writes` more writes succeed, then fail every write after them
    pub fn fail_writes_after(&self, writes: usize) {
        *self.budget() = Some(writes);
    }

    /// make writes succeed again
    pub fn restore_writes(&self) {
        *self.budget() = None;
    }

    /// number of committed write calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn credit_count(&self) -> usize {
        self.data().credits.len()
    }

    pub fn installment_count(&self) -> usize {
        self.data().installments.len()
    }

    /// fetch a single installment
    pub fn installment(&self, id: InstallmentId) -> Option<RepaymentInstallment> {
        self.data().installments.get(&id).cloned()
    }

    fn data(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().expect("store mutex poisoned")
    }

    fn budget(&self) -> MutexGuard<'_, Option<usize>> {
        self.budget.lock().expect("store budget mutex poisoned")
    }

    /// store over a private copy of `data`, sharing the clock and write budget
    fn staged(&self, data: StoreData) -> Self {
        Self {
            data: Mutex::new(data),
            budget: Arc::clone(&self.budget),
            writes: AtomicUsize::new(0),
            clock: Arc::clone(&self.clock),
        }
    }

    fn begin_write(&self) -> StoreResult<()> {
        let mut remaining = self.budget();
        if let Some(left) = *remaining {
            if left == 0 {
                return Err(StoreError::Unavailable("write rejected".to_string()));
            }
            *remaining = Some(left - 1);
        }
        drop(remaining);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl CreditStore for InMemoryStore {
    fn save(&self, mut application: CreditApplication) -> StoreResult<CreditApplication> {
        self.begin_write()?;

        let id = *application.id.get_or_insert_with(Uuid::new_v4);
        if application.created_at.is_none() {
            application.created_at = Some(self.clock.now());
        }

        let mut data = self.data();
        if let Some(existing) = data.credits.get(&id) {
            // creation timestamp is immutable
            application.created_at = existing.created_at;
        }

        let stored = CreditApplication {
            installments: Vec::new(),
            ..application.clone()
        };
        data.credits.insert(id, stored);

        Ok(application)
    }

    fn find_by_id(&self, id: CreditId) -> StoreResult<Option<CreditApplication>> {
        Ok(self.data().credits.get(&id).cloned())
    }
}

impl ScheduleStore for InMemoryStore {
    fn save_all(&self, installments: &[RepaymentInstallment]) -> StoreResult<()> {
        self.begin_write()?;

        let mut data = self.data();
        for installment in installments {
            if !data.credits.contains_key(&installment.credit_id) {
                return Err(StoreError::NotFound {
                    entity: "credit",
                    id: installment.credit_id,
                });
            }
            if data.installments.contains_key(&installment.id) {
                return Err(StoreError::Conflict {
                    entity: "installment",
                    id: installment.id,
                });
            }
        }
        for installment in installments {
            data.installments.insert(installment.id, installment.clone());
        }
        Ok(())
    }

    fn save_installment(&self, installment: &RepaymentInstallment) -> StoreResult<()> {
        self.begin_write()?;
        self.data().installments.insert(installment.id, installment.clone());
        Ok(())
    }

    fn find_overdue(&self, as_of: NaiveDate) -> StoreResult<Vec<RepaymentInstallment>> {
        let mut overdue: Vec<RepaymentInstallment> = self
            .data()
            .installments
            .values()
            .filter(|i| i.is_overdue(as_of))
            .cloned()
            .collect();
        overdue.sort_by_key(|i| (i.due_date, i.id));
        Ok(overdue)
    }

    fn find_by_credit(&self, credit_id: CreditId) -> StoreResult<Vec<RepaymentInstallment>> {
        let mut schedule: Vec<RepaymentInstallment> = self
            .data()
            .installments
            .values()
            .filter(|i| i.credit_id == credit_id)
            .cloned()
            .collect();
        schedule.sort_by_key(|i| i.due_date);
        Ok(schedule)
    }
}

impl TransactionalStore for InMemoryStore {
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        // held until commit so concurrent transactions never interleave
        let mut committed = self.data();
        let staged = self.staged(committed.clone());

        let value = work(&staged)?;

        self.writes.fetch_add(staged.write_count(), Ordering::SeqCst);
        *committed = staged.data.into_inner().expect("store mutex poisoned");
        Ok(value)
    }
}

/// in-memory customer directory
#[derive(Debug, Default)]
pub struct InMemoryCustomerDirectory {
    customers: Mutex<HashMap<CustomerId, CustomerSnapshot>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: CustomerSnapshot) {
        self.customers
            .lock()
            .expect("directory mutex poisoned")
            .insert(customer.customer_id, customer);
    }
}

impl CustomerDirectory for InMemoryCustomerDirectory {
    fn find_customer(&self, id: CustomerId) -> StoreResult<Option<CustomerSnapshot>> {
        Ok(self
            .customers
            .lock()
            .expect("directory mutex poisoned")
            .get(&id)
            .cloned())
    }
}
