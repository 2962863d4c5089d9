use super::ui;
use crate::core::currency;
use crate::core::orchestrator::{FallbackOrchestrator, RateOutcome};
use crate::core::rates::{ProviderKind, RateSource};
use anyhow::Result;
use comfy_table::Cell;
use rust_decimal::Decimal;

impl RateOutcome {
    /// One-line description of where the rates came from.
    pub fn source_line(&self) -> String {
        match (&self.active, self.as_of) {
            (RateSource::Static, _) => format!(
                "Source: {} {}",
                ui::style_text("static table", ui::StyleType::TotalLabel),
                ui::style_text("(approximate, offline)", ui::StyleType::Warning)
            ),
            (RateSource::Provider(provider), Some(date)) if self.stale => format!(
                "Source: {} {}",
                ui::style_text(provider.name(), ui::StyleType::TotalLabel),
                ui::style_text(
                    &format!("(cached {date}, may be out of date)"),
                    ui::StyleType::Warning
                )
            ),
            (RateSource::Provider(provider), as_of) => format!(
                "Source: {} (as of {})",
                ui::style_text(provider.name(), ui::StyleType::TotalLabel),
                as_of.map_or("unknown".to_string(), |d| d.to_string())
            ),
        }
    }

    pub fn attempts_line(&self) -> String {
        format!(
            "Attempts: {}",
            ui::style_text(&self.attempt_chain(), ui::StyleType::Subtle)
        )
    }

    /// Renders every rate against the base and the value of one unit of
    /// `display_currency`.
    pub fn display_as_table(&self, display_currency: &str) -> String {
        let base = &self.base_currency;
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Name"),
            ui::header_cell(&format!("Per 1 {base}")),
            ui::header_cell(&format!("1 {display_currency} =")),
        ]);

        for (code, rate) in &self.rates {
            let name = currency::lookup(code).map_or("", |c| c.name);
            let per_display = match self.convert(Decimal::ONE, display_currency, code) {
                Ok(value) => ui::number_cell(ui::format_amount(value, code)),
                Err(_) => ui::na_cell(true),
            };
            table.add_row(vec![
                Cell::new(code),
                Cell::new(name),
                ui::number_cell(rate.normalize().to_string()),
                per_display,
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("Exchange rates ({base})"), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!("\n\n{}\n{}", self.source_line(), self.attempts_line()));
        output
    }
}

pub async fn run(
    orchestrator: &FallbackOrchestrator,
    preferred: Option<ProviderKind>,
    display_currency: &str,
) -> Result<()> {
    let pb = ui::new_spinner("Resolving exchange rates...");
    let outcome = orchestrator.resolve(preferred).await;
    pb.finish_and_clear();

    println!("{}", outcome.display_as_table(display_currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{AttemptRecord, Outcome};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn outcome(active: RateSource, stale: bool) -> RateOutcome {
        RateOutcome {
            rates: [("EUR", dec!(1)), ("USD", dec!(1.25)), ("JPY", dec!(160))]
                .into_iter()
                .map(|(c, r)| (c.to_string(), r))
                .collect(),
            base_currency: "EUR".to_string(),
            attempts: vec![
                AttemptRecord::new(ProviderKind::Frankfurter, Outcome::Failed).with_detail("timeout"),
                AttemptRecord::new(ProviderKind::FloatRates, Outcome::Fetched),
            ],
            active,
            as_of: NaiveDate::from_ymd_opt(2024, 5, 4),
            stale,
        }
    }

    #[test]
    fn test_display_as_table_lists_rates_and_chain() {
        let output = outcome(RateSource::Provider(ProviderKind::FloatRates), false)
            .display_as_table("USD");

        assert!(output.contains("Per 1 EUR"));
        assert!(output.contains("1 USD ="));
        assert!(output.contains("JPY"));
        assert!(output.contains("¥128.00"));
        assert!(output.contains("floatrates"));
        assert!(output.contains("2024-05-04"));
        assert!(output.contains("frankfurter:failed(timeout) -> floatrates:fetched"));
    }

    #[test]
    fn test_source_line_flags_stale_and_static() {
        let stale = outcome(RateSource::Provider(ProviderKind::Frankfurter), true).source_line();
        assert!(stale.contains("may be out of date"));

        let fallback = outcome(RateSource::Static, true).source_line();
        assert!(fallback.contains("approximate"));
    }

    #[test]
    fn test_unknown_display_currency_shows_na() {
        let output = outcome(RateSource::Provider(ProviderKind::Frankfurter), false)
            .display_as_table("CHF");
        assert!(output.contains("N/A"));
    }
}
