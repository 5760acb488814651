use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::types::{CustomerSnapshot, Decision};

/// thresholds of the eligibility rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// credit score strictly above this earns the good-payer bonus
    pub good_score_threshold: i32,
    pub good_score_bonus: i32,
    /// credit score strictly below this is rejected outright
    pub risk_cutoff: i32,
    /// accumulated score needed for automatic approval
    pub approval_threshold: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            good_score_threshold: 700,
            good_score_bonus: 50,
            risk_cutoff: 300,
            approval_threshold: 40,
        }
    }
}

/// rule that decided an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringRule {
    KycNotVerified,
    NoIncome,
    BelowRiskCutoff,
    ScoreThreshold,
    Premium,
    ManualReview,
}

/// eligibility scoring; stateless and safe to share between threads
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    rules: ScoringRules,
}

impl ScoringEngine {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// decide whether `customer` may borrow.
    ///
    /// `requested_amount` is accepted but not weighed by the current rule set.
    pub fn evaluate(&self, customer: &CustomerSnapshot, requested_amount: Money) -> Decision {
        let (decision, rule) = self.assess(customer);
        debug!(
            customer_id = %customer.customer_id,
            %requested_amount,
            ?decision,
            ?rule,
            "scored applicant"
        );
        decision
    }

    /// evaluate and report which rule decided, first match wins
    pub fn assess(&self, customer: &CustomerSnapshot) -> (Decision, ScoringRule) {
        if !customer.kyc_status.is_verified() {
            return (Decision::Rejected, ScoringRule::KycNotVerified);
        }

        match customer.monthly_income {
            Some(income) if income.is_positive() => {}
            _ => return (Decision::Rejected, ScoringRule::NoIncome),
        }

        let mut score = 0;
        if customer.credit_score > self.rules.good_score_threshold {
            score += self.rules.good_score_bonus;
        } else if customer.credit_score < self.rules.risk_cutoff {
            return (Decision::Rejected, ScoringRule::BelowRiskCutoff);
        }

        if score >= self.rules.approval_threshold {
            (Decision::Approved, ScoringRule::ScoreThreshold)
        } else if customer.is_premium() {
            (Decision::Approved, ScoringRule::Premium)
        } else {
            (Decision::PendingReview, ScoringRule::ManualReview)
        }
    }
}
