//! Purchasable credit packages.

use serde::{Deserialize, Serialize};

/// Starter package price in US dollars.
pub const STARTER_PRICE_USD: u32 = 10;

/// Pro package price in US dollars.
pub const PRO_PRICE_USD: u32 = 25;

/// Enterprise package price in US dollars.
pub const ENTERPRISE_PRICE_USD: u32 = 50;

/// A credit package sold on the pricing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// $10 for 10 credits.
    Starter,

    /// $25 for 30 credits.
    Pro,

    /// $50 for 70 credits.
    Enterprise,
}

impl Plan {
    /// Every plan, cheapest first.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Starter, Self::Pro, Self::Enterprise]
    }

    /// Credits granted when the plan is paid for.
    #[must_use]
    pub const fn credits(&self) -> i64 {
        match self {
            Self::Starter => 10,
            Self::Pro => 30,
            Self::Enterprise => 70,
        }
    }

    /// Price in US dollars.
    #[must_use]
    pub const fn price_usd(&self) -> u32 {
        match self {
            Self::Starter => STARTER_PRICE_USD,
            Self::Pro => PRO_PRICE_USD,
            Self::Enterprise => ENTERPRISE_PRICE_USD,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Pro => "Pro",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Marketing feature list shown next to the plan.
    #[must_use]
    pub const fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Starter => &["10 room redesigns", "All styles available", "24/7 support"],
            Self::Pro => &[
                "30 room redesigns",
                "All styles available",
                "Priority support",
                "HD downloads",
            ],
            Self::Enterprise => &[
                "70 room redesigns",
                "All styles available",
                "Priority support",
                "HD downloads",
                "Custom styles",
            ],
        }
    }
}
