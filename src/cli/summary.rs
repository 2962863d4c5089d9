use super::ui;
use crate::core::config::Subscription;
use crate::core::orchestrator::{FallbackOrchestrator, RateOutcome};
use crate::core::rates::ProviderKind;
use crate::core::subscriptions::{SubscriptionSummary, summarize};
use anyhow::Result;
use comfy_table::Cell;

impl SubscriptionSummary {
    pub fn display_as_table(&self) -> String {
        let target = &self.display_currency;

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Subscription"),
            ui::header_cell("Billing"),
            ui::header_cell("Cost"),
            ui::header_cell(&format!("Monthly ({target})")),
            ui::header_cell(&format!("Yearly ({target})")),
        ]);

        for item in &self.items {
            let (monthly, yearly) = match (&item.monthly, item.yearly()) {
                (Ok(m), Some(y)) => (
                    ui::number_cell(ui::format_amount(*m, target)),
                    ui::number_cell(ui::format_amount(y, target)),
                ),
                _ => (ui::na_cell(true), ui::na_cell(true)),
            };
            table.add_row(vec![
                Cell::new(&item.name),
                Cell::new(item.billing_cycle.to_string()),
                ui::number_cell(ui::format_amount(item.cost, &item.currency)),
                monthly,
                yearly,
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Subscriptions", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        for (item, err) in self.failed() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Warning: '{}' not converted: {}", item.name, err),
                    ui::StyleType::Warning
                )
            ));
        }

        let (monthly_total, yearly_total, style_type) =
            match (self.total_monthly, self.total_yearly()) {
                (Some(m), Some(y)) => (
                    ui::format_amount(m, target),
                    ui::format_amount(y, target),
                    ui::StyleType::TotalValue,
                ),
                _ => ("N/A".to_string(), "N/A".to_string(), ui::StyleType::Error),
            };
        output.push_str(&format!(
            "\n\nTotal ({}): {} per month, {} per year",
            ui::style_text(target, ui::StyleType::TotalLabel),
            ui::style_text(&monthly_total, style_type),
            ui::style_text(&yearly_total, ui::StyleType::Subtle)
        ));
        output
    }
}

pub fn render(subscriptions: &[Subscription], outcome: &RateOutcome, display_currency: &str) -> String {
    let summary = summarize(subscriptions, outcome, display_currency);
    format!(
        "{}\n\n{}\n{}",
        summary.display_as_table(),
        outcome.source_line(),
        outcome.attempts_line()
    )
}

pub async fn run(
    orchestrator: &FallbackOrchestrator,
    preferred: Option<ProviderKind>,
    subscriptions: &[Subscription],
    display_currency: &str,
) -> Result<()> {
    if subscriptions.is_empty() {
        println!("No subscriptions configured.");
        return Ok(());
    }

    let pb = ui::new_spinner("Resolving exchange rates...");
    let outcome = orchestrator.resolve(preferred).await;
    pb.finish_and_clear();

    println!("{}", render(subscriptions, &outcome, display_currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::billing::BillingCycle;
    use crate::core::rates::RateSource;
    use rust_decimal_macros::dec;

    fn outcome() -> RateOutcome {
        RateOutcome {
            rates: [("EUR", dec!(1)), ("USD", dec!(1.25))]
                .into_iter()
                .map(|(c, r)| (c.to_string(), r))
                .collect(),
            base_currency: "EUR".to_string(),
            attempts: Vec::new(),
            active: RateSource::Static,
            as_of: None,
            stale: true,
        }
    }

    fn subscriptions(extra_currency: &str) -> Vec<Subscription> {
        vec![
            Subscription {
                name: "Music".to_string(),
                cost: dec!(9.99),
                currency: "EUR".to_string(),
                billing_cycle: BillingCycle::Monthly,
            },
            Subscription {
                name: "Backup".to_string(),
                cost: dec!(60),
                currency: extra_currency.to_string(),
                billing_cycle: BillingCycle::Yearly,
            },
        ]
    }

    #[test]
    fn test_render_shows_rounded_totals() {
        let output = render(&subscriptions("USD"), &outcome(), "EUR");

        assert!(output.contains("€9.99"));
        assert!(output.contains("$60.00"));
        // 60 USD / 12 = 5 USD = 4 EUR
        assert!(output.contains("€4.00"));
        assert!(output.contains("€13.99"));
        assert!(output.contains("€167.88"));
        assert!(output.contains("approximate"));
        assert!(!output.contains("Warning"));
    }

    #[test]
    fn test_render_withholds_total_on_missing_rate() {
        let output = render(&subscriptions("CHF"), &outcome(), "EUR");

        assert!(output.contains("Warning: 'Backup' not converted"));
        assert!(output.contains("No exchange rate available for CHF"));
        assert!(output.contains("N/A"));
        assert!(!output.contains("€13.99"));
    }
}
