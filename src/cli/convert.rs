use super::ui;
use crate::core::orchestrator::FallbackOrchestrator;
use crate::core::rates::ProviderKind;
use anyhow::{Context, Result};
use rust_decimal::Decimal;

pub fn format_conversion(amount: Decimal, from: &str, converted: Decimal, to: &str) -> String {
    format!(
        "{} = {}",
        ui::format_amount(amount, from),
        ui::style_text(&ui::format_amount(converted, to), ui::StyleType::TotalValue)
    )
}

pub async fn run(
    orchestrator: &FallbackOrchestrator,
    preferred: Option<ProviderKind>,
    amount: Decimal,
    from: &str,
    to: &str,
) -> Result<()> {
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();

    let pb = ui::new_spinner("Resolving exchange rates...");
    let outcome = orchestrator.resolve(preferred).await;
    pb.finish_and_clear();

    let converted = outcome
        .convert(amount, &from, &to)
        .with_context(|| format!("Cannot convert {from} to {to}"))?;

    println!("{}", format_conversion(amount, &from, converted, &to));
    println!("{}", outcome.source_line());
    println!("{}", outcome.attempts_line());
    Ok(())
}
