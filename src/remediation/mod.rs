pub mod job;
pub mod penalty;
pub mod scheduler;

pub use job::{OverdueRemediationJob, RemediationReport};
pub use penalty::LatePenaltyPolicy;
pub use scheduler::RemediationScheduler;
