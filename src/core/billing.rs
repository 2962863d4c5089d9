//! Normalises subscription costs to a monthly figure

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingCycle {
    Daily,
    Weekly,
    BiWeekly,
    #[default]
    Monthly,
    BiMonthly,
    Quarterly,
    SemiAnnually,
    Yearly,
    Custom {
        days: u32,
    },
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingCycle::Daily => f.write_str("daily"),
            BillingCycle::Weekly => f.write_str("weekly"),
            BillingCycle::BiWeekly => f.write_str("bi-weekly"),
            BillingCycle::Monthly => f.write_str("monthly"),
            BillingCycle::BiMonthly => f.write_str("bi-monthly"),
            BillingCycle::Quarterly => f.write_str("quarterly"),
            BillingCycle::SemiAnnually => f.write_str("semi-annually"),
            BillingCycle::Yearly => f.write_str("yearly"),
            BillingCycle::Custom { days } => write!(f, "every {days} days"),
        }
    }
}

impl BillingCycle {
    /// Cost per month for one charge of `cost` on this cycle.
    ///
    /// Weeks and custom day counts use average month lengths (4.33 weeks,
    /// 2.17 fortnights, 30.44 days). A zero-day custom cycle costs nothing.
    pub fn monthly_cost(&self, cost: Decimal) -> Decimal {
        match self {
            BillingCycle::Daily => cost * dec!(30),
            BillingCycle::Weekly => cost * dec!(4.33),
            BillingCycle::BiWeekly => cost * dec!(2.17),
            BillingCycle::Monthly => cost,
            BillingCycle::BiMonthly => cost / dec!(2),
            BillingCycle::Quarterly => cost / dec!(3),
            BillingCycle::SemiAnnually => cost / dec!(6),
            BillingCycle::Yearly => cost / dec!(12),
            BillingCycle::Custom { days: 0 } => Decimal::ZERO,
            BillingCycle::Custom { days } => cost / Decimal::from(*days) * dec!(30.44),
        }
    }
}
