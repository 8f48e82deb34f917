//! Checkout Config

use std::time::Duration;

use clap::Args;

/// Basket settlement settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Upper bound on a single settlement, in milliseconds.
    #[arg(long, env = "SETTLEMENT_DEADLINE_MS", default_value_t = 10_000_u64)]
    pub settlement_deadline_ms: u64,
}

impl CheckoutConfig {
    /// The settlement deadline as a [`Duration`].
    #[must_use]
    pub fn settlement_deadline(&self) -> Duration {
        Duration::from_millis(self.settlement_deadline_ms)
    }
}
