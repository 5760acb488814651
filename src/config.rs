use chrono::NaiveTime;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Rate, CURRENCY_SCALE};
use crate::errors::{CreditError, Result};
use crate::scoring::ScoringRules;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringRules,
    pub schedule: ScheduleConfig,
    pub remediation: RemediationConfig,
}

/// schedule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// decimals kept by each half-up rounding step
    pub currency_scale: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            currency_scale: CURRENCY_SCALE,
        }
    }
}

/// overdue remediation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// share of the installment total added to the late fee on every run
    pub penalty_rate: Rate,
    /// time of day (UTC) from which the daily run may fire
    pub run_at: NaiveTime,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            penalty_rate: Rate::from_decimal(dec!(0.05)),
            run_at: NaiveTime::MIN,
        }
    }
}

impl EngineConfig {
    /// parse from json, missing sections fall back to defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| CreditError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CreditError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.scoring.risk_cutoff > self.scoring.good_score_threshold {
            return Err(CreditError::InvalidConfiguration {
                message: format!(
                    "risk cutoff {} above good score threshold {}",
                    self.scoring.risk_cutoff, self.scoring.good_score_threshold
                ),
            });
        }
        if self.schedule.currency_scale > 8 {
            return Err(CreditError::InvalidConfiguration {
                message: format!("currency scale {} exceeds 8", self.schedule.currency_scale),
            });
        }
        if self.remediation.penalty_rate.is_negative() {
            return Err(CreditError::InvalidConfiguration {
                message: format!("negative penalty rate {}", self.remediation.penalty_rate),
            });
        }
        Ok(())
    }
}
