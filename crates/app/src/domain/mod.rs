//! Storefront Domain Concerns

pub mod baskets;
pub mod checkout;
pub mod products;
