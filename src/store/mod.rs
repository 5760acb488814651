//! Storage collaborators consumed by origination and remediation.
//!
//! Reads and writes are opaque synchronous calls that may fail with a
//! [`StoreError`]. Atomicity is provided by [`TransactionalStore::transaction`]:
//! either every write made inside the closure is kept, or none is.

pub mod memory;

use chrono::NaiveDate;

use crate::application::{CreditApplication, RepaymentInstallment};
use crate::errors::{Result, StoreError};
use crate::types::{CreditId, CustomerId, CustomerSnapshot};

pub use memory::{InMemoryCustomerDirectory, InMemoryStore};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// persistence of credit applications
pub trait CreditStore {
    /// insert or update. On first save the store assigns the identity and
    /// the creation timestamp; both are kept on later saves.
    fn save(&self, application: CreditApplication) -> StoreResult<CreditApplication>;

    /// application without its installments
    fn find_by_id(&self, id: CreditId) -> StoreResult<Option<CreditApplication>>;
}

/// persistence of repayment installments
pub trait ScheduleStore {
    /// insert a batch of installments for already saved credits
    fn save_all(&self, installments: &[RepaymentInstallment]) -> StoreResult<()>;

    /// insert or update a single installment
    fn save_installment(&self, installment: &RepaymentInstallment) -> StoreResult<()>;

    /// installments with `due_date < as_of` whose status is not `Paid`
    fn find_overdue(&self, as_of: NaiveDate) -> StoreResult<Vec<RepaymentInstallment>>;

    /// installments of one credit, ordered by due date
    fn find_by_credit(&self, credit_id: CreditId) -> StoreResult<Vec<RepaymentInstallment>>;
}

/// single transactional boundary over both stores
pub trait TransactionalStore: CreditStore + ScheduleStore {
    /// run `work` so that all of its writes commit together, or none do when
    /// it returns an error
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>;
}

/// resolves customers to the snapshot used for scoring
pub trait CustomerDirectory {
    fn find_customer(&self, id: CustomerId) -> StoreResult<Option<CustomerSnapshot>>;
}
