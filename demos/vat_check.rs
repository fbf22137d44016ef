use tracing_subscriber::EnvFilter;
use vatcalc::core::*;
use vatcalc::vat::{VatCalculator, ViesClient};

fn main() -> Result<(), VatError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CalculatorConfig::from_env()?;
    let calc = VatCalculator::from_config(&config, ViesClient::new()?)?;

    let numbers: Vec<String> = std::env::args().skip(1).collect();
    let numbers = if numbers.is_empty() {
        vec![
            "DE 190 098 891".to_string(),
            "CY123Μ456_789".to_string(),
            "US123456789".to_string(),
        ]
    } else {
        numbers
    };

    println!("=== VIES check ===\n");
    for number in &numbers {
        match calc.vat_details(number) {
            Ok(details) => println!(
                "  {number} => valid={} ({}{}) request={}",
                details.valid,
                details.country_code,
                details.vat_number,
                details.request_id.as_deref().unwrap_or("-")
            ),
            Err(VatError::VatCheckUnavailable(e)) => println!("  {number} => unavailable: {e}"),
            Err(e) => println!("  {number} => rejected: {e}"),
        }
    }

    Ok(())
}
