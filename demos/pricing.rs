use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;
use vatcalc::core::*;
use vatcalc::rates::{RateQuery, RateResolver};

fn main() -> Result<(), VatError> {
    // RUST_LOG=vatcalc=debug shows every resolution
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CalculatorConfig::from_env()?;
    let mut resolver = RateResolver::embedded()?;
    if let Some(code) = &config.business_country_code {
        resolver.set_business_country(Some(code));
    }
    for code in &config.extra_countries {
        resolver.add_country(code)?;
    }
    resolver.add_country("GB")?;

    println!("=== Consumer prices for a net of 100.00 ===\n");

    let net = dec!(100.00);
    let queries = [
        ("Berlin", RateQuery::new("DE").postal_code("10115")),
        ("Heligoland", RateQuery::new("DE").postal_code("27498")),
        ("Jungholz (AT)", RateQuery::new("AT").postal_code("6691")),
        ("Funchal, Madeira", RateQuery::new("PT").postal_code("9000-123")),
        ("Lisbon", RateQuery::new("PT").postal_code("1000-001")),
        ("Saint-Denis, Réunion", RateQuery::new("FR").postal_code("97400")),
        ("Las Palmas", RateQuery::new("ES").postal_code("35001")),
        ("Amsterdam, reduced", RateQuery::new("NL").rate_class(RateClass::Reduced)),
        ("London", RateQuery::new("GB").postal_code("SW1A 1AA")),
        ("Dhekelia", RateQuery::new("GB").postal_code("BFPO 58")),
        ("Oslo (not added)", RateQuery::new("NO")),
    ];

    for (label, query) in &queries {
        let res = resolver.resolve(query);
        let result = from_net(net, res.rate);
        println!(
            "  {label:<24} rate={:<6} price={:<8} basis={:?} (source {})",
            res.rate,
            result.price.round_dp(2),
            res.basis,
            res.source_country
        );
    }

    println!("\n=== B2B ===\n");
    let business = RateQuery::new("DE").business(true);
    println!(
        "  seller country {:?}: DE business rate = {}",
        resolver.business_country(),
        resolver.rate(&business)
    );
    resolver.set_business_country(Some("DE"));
    println!("  seller country DE: DE business rate = {}", resolver.rate(&business));

    println!("\n=== Rates known for DE ===\n");
    println!("  latest per class: {:?}", resolver.table().list_all_rates("DE")?);
    println!("  all historical:   {:?}", resolver.table().all_known_rates("DE")?);

    Ok(())
}
