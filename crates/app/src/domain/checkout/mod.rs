//! Checkout

pub mod engine;
pub mod errors;
pub mod models;
pub mod ports;
pub mod postgres;
pub mod pricing;

pub use engine::*;
pub use errors::{CheckoutError, SettlementStage, StoreError};
pub use postgres::PgSettlementStore;

/// Checkout engine settling against Postgres.
pub type PgCheckoutService = CheckoutEngine<PgSettlementStore>;
