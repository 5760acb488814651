use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::{CreditApplication, RepaymentInstallment};
use crate::config::EngineConfig;
use crate::errors::{CreditError, Result, StoreError};
use crate::payments::AmortizationCalculator;
use crate::scoring::ScoringEngine;
use crate::store::{CreditStore, CustomerDirectory, ScheduleStore, TransactionalStore};
use crate::types::{CreditId, CustomerSnapshot, Decision};

/// text returned for every rejection, whatever rule triggered it
pub const GENERIC_REJECTION: &str = "application rejected: applicant is not eligible for credit";

/// why an application was turned down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    pub message: String,
}

impl RejectionReason {
    pub fn generic() -> Self {
        Self {
            message: GENERIC_REJECTION.to_string(),
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// result of an origination attempt; rejection is a normal outcome
#[derive(Debug, Clone, PartialEq)]
pub enum OriginationOutcome {
    /// persisted application with its schedule attached
    Originated(CreditApplication),
    /// nothing was written
    Rejected(RejectionReason),
}

impl OriginationOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, OriginationOutcome::Rejected(_))
    }

    pub fn application(&self) -> Option<&CreditApplication> {
        match self {
            OriginationOutcome::Originated(application) => Some(application),
            OriginationOutcome::Rejected(_) => None,
        }
    }

    pub fn into_result(self) -> std::result::Result<CreditApplication, RejectionReason> {
        match self {
            OriginationOutcome::Originated(application) => Ok(application),
            OriginationOutcome::Rejected(reason) => Err(reason),
        }
    }
}

/// scores an application and, unless rejected, persists it with its schedule
pub struct CreditOriginationWorkflow<S> {
    store: Arc<S>,
    scoring: ScoringEngine,
    calculator: AmortizationCalculator,
}

impl<S: TransactionalStore> CreditOriginationWorkflow<S> {
    pub fn new(store: Arc<S>, scoring: ScoringEngine, calculator: AmortizationCalculator) -> Self {
        Self {
            store,
            scoring,
            calculator,
        }
    }

    pub fn from_config(store: Arc<S>, config: &EngineConfig) -> Self {
        Self::new(
            store,
            ScoringEngine::new(config.scoring.clone()),
            AmortizationCalculator::new(config.schedule.currency_scale),
        )
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// decide only, without origination
    pub fn evaluate(&self, customer: &CustomerSnapshot, application: &CreditApplication) -> Decision {
        self.scoring.evaluate(customer, application.amount)
    }

    /// score, price and persist `application` for `customer`.
    ///
    /// The application and all its installments are written in one transaction.
    pub fn originate(
        &self,
        mut application: CreditApplication,
        customer: &CustomerSnapshot,
    ) -> Result<OriginationOutcome> {
        let decision = self.scoring.evaluate(customer, application.amount);
        if decision == Decision::Rejected {
            info!(customer_id = %customer.customer_id, amount = %application.amount, "credit application rejected");
            return Ok(OriginationOutcome::Rejected(RejectionReason::generic()));
        }

        application.update_status(decision.into())?;

        // validated before any write so bad input never reaches the store
        let quote = self.calculator.quote(
            application.amount,
            application.interest_rate,
            application.duration_months,
        )?;
        application.monthly_payment = Some(quote.monthly_payment);

        let originated = self.store.transaction(|tx| {
            let mut saved = tx.save(application)?;
            let (credit_id, created_at) = match (saved.id, saved.created_at) {
                (Some(id), Some(created_at)) => (id, created_at),
                _ => {
                    return Err(StoreError::Unavailable(
                        "credit store did not assign identity".to_string(),
                    )
                    .into())
                }
            };

            let installments: Vec<RepaymentInstallment> = quote
                .schedule(created_at.date_naive())?
                .iter()
                .map(|scheduled| RepaymentInstallment::from_schedule(credit_id, scheduled))
                .collect();

            tx.save_all(&installments)?;
            saved.installments = installments;
            Ok(saved)
        })?;

        info!(
            credit_id = ?originated.id,
            customer_id = %originated.customer_id,
            status = %originated.status,
            monthly_payment = %quote.monthly_payment,
            installments = originated.installments.len(),
            "credit originated"
        );

        Ok(OriginationOutcome::Originated(originated))
    }

    /// resolve the customer through `directory`, then originate
    pub fn originate_for_customer(
        &self,
        application: CreditApplication,
        directory: &dyn CustomerDirectory,
    ) -> Result<OriginationOutcome> {
        let customer = directory
            .find_customer(application.customer_id)?
            .ok_or(CreditError::CustomerNotFound {
                id: application.customer_id,
            })?;
        self.originate(application, &customer)
    }

    /// persisted application with its installments ordered by due date
    pub fn credit_details(&self, id: CreditId) -> Result<CreditApplication> {
        let mut application = self
            .store
            .find_by_id(id)?
            .ok_or(CreditError::CreditNotFound { id })?;
        application.installments = self.store.find_by_credit(id)?;
        Ok(application)
    }
}
