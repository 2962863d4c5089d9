use super::ui;
use crate::core::orchestrator::FallbackOrchestrator;
use crate::core::rates::ProviderKind;
use anyhow::Result;

/// Discards today's cached rates and fetches again.
pub async fn run(
    orchestrator: &FallbackOrchestrator,
    preferred: Option<ProviderKind>,
    display_currency: &str,
) -> Result<()> {
    let pb = ui::new_spinner("Refreshing exchange rates...");
    let outcome = orchestrator.force_refresh(preferred).await;
    pb.finish_and_clear();
    let outcome = outcome?;

    if outcome.stale {
        println!(
            "{}",
            ui::style_text(
                "Refresh failed for every provider; showing fallback rates.",
                ui::StyleType::Warning
            )
        );
    }
    println!("{}", outcome.display_as_table(display_currency));
    Ok(())
}
