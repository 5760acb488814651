/// configuration - load engine settings from json
use credit_engine_rs::{CustomerSnapshot, EngineConfig, KycStatus, Money, ScoringEngine, Uuid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== configuration ===\n");

    let config = EngineConfig::from_json_str(
        r#"{
            "scoring": { "good_score_threshold": 650 },
            "remediation": { "penalty_rate": "0.03", "run_at": "01:00:00" }
        }"#,
    )?;
    println!("{}", config.to_json_string()?);

    let engine = ScoringEngine::new(config.scoring.clone());
    let customer = CustomerSnapshot {
        customer_id: Uuid::new_v4(),
        kyc_status: KycStatus::Verified,
        monthly_income: Some(Money::from_major(2_000)),
        credit_score: 680,
        is_premium: None,
    };
    println!("\ndecision for score 680: {:?}", engine.evaluate(&customer, Money::from_major(3_000)));

    Ok(())
}
