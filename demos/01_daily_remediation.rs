/// daily remediation - drive the overdue job with controlled time
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use credit_engine_rs::{
    CreditApplication, CreditOriginationWorkflow, CustomerSnapshot, EngineConfig, InMemoryStore,
    KycStatus, Money, Rate, RemediationScheduler, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_target(false)
        .compact()
        .init();

    println!("=== daily remediation ===\n");

    let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
    )));
    let controller = time.test_control().unwrap();

    let config = EngineConfig::default();
    let store = Arc::new(InMemoryStore::new(time.clone()));
    let workflow = CreditOriginationWorkflow::from_config(store.clone(), &config);

    let customer = CustomerSnapshot {
        customer_id: Uuid::new_v4(),
        kyc_status: KycStatus::Verified,
        monthly_income: Some(Money::from_major(1_800)),
        credit_score: 510,
        is_premium: Some(true),
    };
    let credit = workflow
        .originate(
            CreditApplication::new(customer.customer_id, Money::from_major(1_200), Rate::from_percentage(10), 2),
            &customer,
        )?
        .into_result()
        .map_err(|reason| reason.to_string())?;
    let credit_id = credit.id.unwrap_or_default();
    println!("credit {} originated on {}", credit_id, time.now().format("%Y-%m-%d"));

    let mut scheduler = RemediationScheduler::from_config(store.clone(), time.clone(), &config.remediation)?;
    println!("next run at {}\n", scheduler.next_fire_at());

    // first installment falls due on 2024-02-10; watch a few days past it
    controller.advance(Duration::days(31));
    for _ in 0..4 {
        controller.advance(Duration::days(1));
        if let Some(report) = scheduler.tick()? {
            println!(
                "{}: processed {} installment(s), penalty {}",
                report.as_of, report.processed_count, report.total_penalty
            );
        }
    }

    let details = workflow.credit_details(credit_id)?;
    println!("\nschedule after remediation:");
    for installment in &details.installments {
        println!(
            "  due {}  {:?}  total {}  late fee {}",
            installment.due_date,
            installment.status,
            installment.total_amount,
            installment.late_fee.to_currency()
        );
    }

    // explicit run, outside the daily trigger
    let report = scheduler.run_for(details.installments[0].due_date + Duration::days(1))?;
    println!("\nmanual run processed {}", report.processed_count);

    Ok(())
}
