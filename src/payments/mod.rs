pub mod amortization;

pub use amortization::{AmortizationCalculator, AmortizationPlan, PaymentQuote, ScheduledInstallment};
