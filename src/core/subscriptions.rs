//! Subscription costs normalised to the display currency.

use crate::core::billing::BillingCycle;
use crate::core::config::Subscription;
use crate::core::conversion::ConversionError;
use crate::core::orchestrator::RateOutcome;
use rust_decimal::Decimal;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SubscriptionCost {
    pub name: String,
    pub cost: Decimal,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    /// Monthly cost in the display currency.
    pub monthly: Result<Decimal, ConversionError>,
}

impl SubscriptionCost {
    pub fn yearly(&self) -> Option<Decimal> {
        self.monthly.as_ref().ok().map(|m| m * Decimal::from(12))
    }
}

#[derive(Debug, Clone)]
pub struct SubscriptionSummary {
    pub display_currency: String,
    pub items: Vec<SubscriptionCost>,
    /// `None` when any item could not be converted.
    pub total_monthly: Option<Decimal>,
}

impl SubscriptionSummary {
    pub fn total_yearly(&self) -> Option<Decimal> {
        self.total_monthly.map(|m| m * Decimal::from(12))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&SubscriptionCost, &ConversionError)> {
        self.items
            .iter()
            .filter_map(|item| item.monthly.as_ref().err().map(|e| (item, e)))
    }
}

pub fn summarize(
    subscriptions: &[Subscription],
    outcome: &RateOutcome,
    display_currency: &str,
) -> SubscriptionSummary {
    let items: Vec<SubscriptionCost> = subscriptions
        .iter()
        .map(|sub| {
            let monthly_native = sub.billing_cycle.monthly_cost(sub.cost);
            let monthly = outcome.convert(monthly_native, &sub.currency, display_currency);
            if let Err(e) = &monthly {
                warn!(subscription = %sub.name, "{}", e);
            }
            SubscriptionCost {
                name: sub.name.clone(),
                cost: sub.cost,
                currency: sub.currency.clone(),
                billing_cycle: sub.billing_cycle,
                monthly,
            }
        })
        .collect();

    let total_monthly = items
        .iter()
        .map(|item| item.monthly.as_ref().ok().copied())
        .sum::<Option<Decimal>>();

    SubscriptionSummary {
        display_currency: display_currency.to_string(),
        items,
        total_monthly,
    }
}
