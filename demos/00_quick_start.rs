/// quick start - score an applicant and originate a credit with its schedule
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use credit_engine_rs::{
    CreditApplication, CreditOriginationWorkflow, CustomerSnapshot, EngineConfig, InMemoryStore,
    KycStatus, Money, OriginationOutcome, Rate, SafeTimeProvider, TimeSource, Uuid,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_target(false)
        .compact()
        .init();

    println!("=== quick start ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
    ));
    let store = Arc::new(InMemoryStore::new(time));
    let workflow = CreditOriginationWorkflow::from_config(store.clone(), &EngineConfig::default());

    let customer = CustomerSnapshot {
        customer_id: Uuid::new_v4(),
        kyc_status: KycStatus::Verified,
        monthly_income: Some(Money::from_major(2_500)),
        credit_score: 720,
        is_premium: None,
    };

    let application = CreditApplication::new(
        customer.customer_id,
        Money::from_major(1_000),
        Rate::from_percentage_decimal(dec!(12)),
        3,
    );

    match workflow.originate(application, &customer)? {
        OriginationOutcome::Originated(credit) => {
            println!("status:          {}", credit.status);
            println!("monthly payment: {}", credit.monthly_payment.unwrap_or(Money::ZERO));
            for installment in &credit.installments {
                println!("  due {}  {}", installment.due_date, installment.total_amount);
            }
        }
        OriginationOutcome::Rejected(reason) => println!("rejected: {}", reason),
    }

    // unverified applicants are rejected and nothing is stored
    let unverified = CustomerSnapshot {
        kyc_status: KycStatus::NotVerified,
        ..customer.clone()
    };
    let outcome = workflow.originate(
        CreditApplication::new(unverified.customer_id, Money::from_major(500), Rate::from_percentage(10), 6),
        &unverified,
    )?;
    println!("\nunverified applicant rejected: {}", outcome.is_rejected());
    println!("credits stored: {}", store.credit_count());

    Ok(())
}
