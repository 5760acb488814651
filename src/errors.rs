use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};

/// invalid input or forbidden state change, detected before any arithmetic or write
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid duration: {months} months, at least 1 required")]
    InvalidDuration {
        months: u32,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("schedule of {months} months from {start} runs past the supported date range")]
    ScheduleOutOfRange {
        start: NaiveDate,
        months: u32,
    },

    #[error("invalid {entity} status transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}

/// failure reported by a storage collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write conflict on {entity} {id}")]
    Conflict {
        entity: &'static str,
        id: Uuid,
    },

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
}

#[derive(Error, Debug)]
pub enum CreditError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: Uuid,
    },

    #[error("credit application not found: {id}")]
    CreditNotFound {
        id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl CreditError {
    pub fn is_domain(&self) -> bool {
        matches!(self, CreditError::Domain(_))
    }

    pub fn is_store(&self) -> bool {
        matches!(self, CreditError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, CreditError>;
