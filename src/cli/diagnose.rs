use super::ui;
use crate::core::orchestrator::{Diagnostics, FallbackOrchestrator};
use crate::core::rates::ProviderKind;
use anyhow::Result;
use comfy_table::{Cell, Color};
use rust_decimal::Decimal;

impl Diagnostics {
    pub fn display_as_report(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Provider"),
            ui::header_cell("Failures"),
            ui::header_cell("Last failure"),
            ui::header_cell("Circuit"),
        ]);

        for (i, provider) in self.priority.iter().enumerate() {
            let state = self
                .breaker
                .iter()
                .find(|(p, _)| p == provider)
                .map(|(_, s)| *s);
            let failures = state.map_or(0, |s| s.consecutive_failures);
            let last_failure = state
                .and_then(|s| s.last_failure_at)
                .map_or(Cell::new("-"), |t| {
                    Cell::new(t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                });
            let circuit = if self.open_circuits.contains(provider) {
                Cell::new("open").fg(Color::Red)
            } else {
                Cell::new("closed").fg(Color::Green)
            };

            table.add_row(vec![
                ui::number_cell((i + 1).to_string()),
                Cell::new(provider.name()),
                ui::number_cell(failures.to_string()),
                last_failure,
                circuit,
            ]);
        }

        let sample = &self.sample;
        let sample_line = match &sample.result {
            Ok(value) => format!(
                "{} = {}",
                ui::format_amount(sample.amount, &sample.from),
                ui::style_text(&ui::format_amount(*value, &sample.to), ui::StyleType::TotalValue)
            ),
            Err(e) => ui::style_text(&e.to_string(), ui::StyleType::Error),
        };

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Provider diagnostics", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}\n{}\nRates loaded: {} (base {})\nSample: {}",
            self.outcome.source_line(),
            self.outcome.attempts_line(),
            self.outcome.rates.len(),
            self.outcome.base_currency,
            sample_line
        ));
        output
    }
}

pub async fn run(
    orchestrator: &FallbackOrchestrator,
    preferred: Option<ProviderKind>,
    display_currency: &str,
) -> Result<()> {
    let pb = ui::new_spinner("Checking providers...");
    let report = orchestrator
        .diagnose(
            preferred,
            Decimal::ONE_HUNDRED,
            orchestrator.base_currency(),
            display_currency,
        )
        .await;
    pb.finish_and_clear();

    println!("{}", report.display_as_report());
    Ok(())
}
