pub mod application;
pub mod clock;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod origination;
pub mod payments;
pub mod remediation;
pub mod scoring;
pub mod state;
pub mod store;
pub mod types;

// re-export key types
pub use application::{CreditApplication, RepaymentInstallment};
pub use clock::Clock;
pub use config::{EngineConfig, RemediationConfig, ScheduleConfig};
pub use decimal::{Money, Rate};
pub use errors::{CreditError, DomainError, Result, StoreError};
pub use origination::{CreditOriginationWorkflow, OriginationOutcome, RejectionReason};
pub use payments::{AmortizationCalculator, AmortizationPlan, PaymentQuote, ScheduledInstallment};
pub use remediation::{
    LatePenaltyPolicy, OverdueRemediationJob, RemediationReport, RemediationScheduler,
};
pub use scoring::{ScoringEngine, ScoringRule, ScoringRules};
pub use store::{
    CreditStore, CustomerDirectory, InMemoryCustomerDirectory, InMemoryStore, ScheduleStore,
    TransactionalStore,
};
pub use types::{
    CreditId, CreditStatus, CustomerId, CustomerSnapshot, Decision, InstallmentId, KycStatus,
    RepaymentStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
