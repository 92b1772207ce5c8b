use parish_budget_engine::*;
use std::collections::BTreeMap;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("📊 Parish Budget Variance Report\n");

    let mut session = BudgetSession::default();
    session.replace_dataset(sample_dataset());

    if let Some(stats) = session.summary() {
        println!("📋 Summary:");
        println!("  Total budget:    {}", format_currency(stats.total_budget, "£"));
        println!("  Total actual:    {}", format_currency(stats.total_actual, "£"));
        println!("  Total variance:  {}", format_currency(stats.total_variance, "£"));
        println!("  Completion rate: {}", format_percentage(stats.completion_rate, 1));
    }

    println!("\n⚠️  Risk assessment:");
    for record in session.risk_assessment() {
        if matches!(record.risk_category, RiskCategory::High | RiskCategory::Critical) {
            println!(
                "  {:<20} {:>8} {:>14}",
                record.item.description,
                format_percentage(record.variance_pct, 1),
                record.risk_category
            );
        }
    }

    let categories = session.dataset().categories();
    let mut scenarios = BTreeMap::new();
    for preset in [
        ScenarioPreset::Conservative,
        ScenarioPreset::Optimistic,
        ScenarioPreset::Pessimistic,
    ] {
        scenarios.insert(format!("{:?}", preset), preset.probabilities(&categories));
    }

    println!("\n🔄 Scenario comparison:");
    for row in compare_scenarios(session.dataset(), &scenarios)? {
        println!(
            "  {:<14} projected {:>14}  variance {:>12} ({})",
            row.scenario,
            format_currency(row.total_projected, "£"),
            format_currency(row.total_variance, "£"),
            format_percentage(row.variance_percentage, 1)
        );
    }

    let config = MonteCarloConfig::seeded(42);
    let simulation = calculate_monte_carlo_simulation(session.dataset(), &config)?;
    println!("\n🎲 Monte Carlo ({} trials):", simulation.trials());
    println!("  Mean variance: {}", format_currency(simulation.mean, "£"));
    println!(
        "  90% interval:  {} to {}",
        format_currency(simulation.percentile_5, "£"),
        format_currency(simulation.percentile_95, "£")
    );
    println!(
        "  Chance of ending in surplus: {}",
        format_percentage(simulation.probability_positive, 1)
    );

    println!("\n📄 Summary sheet (CSV):");
    session.export().write_summary_csv(std::io::stdout())?;

    Ok(())
}
