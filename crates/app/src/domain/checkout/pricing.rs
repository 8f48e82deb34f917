//! Feasibility and pricing of a resolved request.

use std::num::NonZeroU32;

use crate::{
    database::MAX_AMOUNT,
    domain::checkout::{
        errors::CheckoutError,
        models::{CatalogEntry, Quote, QuotedLine, Shortfall},
    },
};

/// Every line asking for more than is on hand.
pub fn shortfalls(resolved: &[(CatalogEntry, NonZeroU32)]) -> Vec<Shortfall> {
    resolved
        .iter()
        .filter(|(entry, quantity)| u64::from(quantity.get()) > entry.available)
        .map(|(entry, quantity)| Shortfall {
            product: entry.product,
            requested: quantity.get(),
            available: entry.available,
        })
        .collect()
}

/// Price a request whose lines can all be satisfied.
///
/// # Errors
///
/// Returns [`CheckoutError::InsufficientStock`] listing every infeasible line,
/// or [`CheckoutError::PriceOverflow`] if a line or the total exceeds
/// [`MAX_AMOUNT`].
pub fn quote(resolved: &[(CatalogEntry, NonZeroU32)]) -> Result<Quote, CheckoutError> {
    let shortfalls = shortfalls(resolved);

    if !shortfalls.is_empty() {
        return Err(CheckoutError::InsufficientStock(shortfalls));
    }

    let mut lines = Vec::with_capacity(resolved.len());
    let mut total: u64 = 0;
    let mut savings: u64 = 0;

    for (entry, quantity) in resolved {
        let units = u64::from(quantity.get());

        let line_total = storable(entry.price.checked_mul(units))
            .ok_or(CheckoutError::PriceOverflow(entry.product))?;

        total = storable(total.checked_add(line_total))
            .ok_or(CheckoutError::PriceOverflow(entry.product))?;

        // Marked-up products save nothing rather than a negative amount.
        savings = savings.saturating_add(
            entry
                .original_price
                .saturating_sub(entry.price)
                .saturating_mul(units),
        );

        lines.push(QuotedLine {
            product: entry.product,
            quantity: *quantity,
            unit_price: entry.price,
            original_price: entry.original_price,
            line_total,
        });
    }

    Ok(Quote {
        lines,
        total,
        savings,
    })
}

/// `amount` if it was computed without overflow and fits a money column.
pub fn storable(amount: Option<u64>) -> Option<u64> {
    amount.filter(|amount| *amount <= MAX_AMOUNT)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::products::models::ProductUuid;

    use super::*;

    fn entry(price: u64, original_price: u64, available: u64) -> CatalogEntry {
        CatalogEntry {
            product: ProductUuid::new(),
            price,
            original_price,
            available,
        }
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
    }

    #[test]
    fn quote_multiplies_and_sums_lines() -> TestResult {
        let a = entry(250, 300, 5);
        let b = entry(1_000, 1_000, 2);

        let quote = quote(&[(a, qty(3)), (b, qty(2))])?;

        assert_eq!(quote.total, 3 * 250 + 2 * 1_000);
        assert_eq!(quote.savings, 3 * 50);
        assert_eq!(quote.lines.len(), 2);

        let first = quote.lines.first().ok_or("missing first line")?;

        assert_eq!(first.product, a.product);
        assert_eq!(first.unit_price, 250);
        assert_eq!(first.line_total, 750);

        Ok(())
    }

    #[test]
    fn every_infeasible_line_is_reported() {
        let a = entry(100, 100, 1);
        let b = entry(100, 100, 10);
        let c = entry(100, 100, 0);

        let result = quote(&[(a, qty(2)), (b, qty(3)), (c, qty(1))]);

        let Err(CheckoutError::InsufficientStock(shortfalls)) = result else {
            panic!("expected InsufficientStock, got {result:?}");
        };

        assert_eq!(
            shortfalls,
            vec![
                Shortfall {
                    product: a.product,
                    requested: 2,
                    available: 1,
                },
                Shortfall {
                    product: c.product,
                    requested: 1,
                    available: 0,
                },
            ]
        );
    }

    #[test]
    fn exact_stock_is_feasible() {
        assert!(shortfalls(&[(entry(100, 100, 4), qty(4))]).is_empty());
    }

    #[test]
    fn overflowing_line_is_refused() {
        let huge = entry(u64::MAX / 2, u64::MAX / 2, 10);

        let result = quote(&[(huge, qty(3))]);

        assert!(
            matches!(result, Err(CheckoutError::PriceOverflow(p)) if p == huge.product),
            "expected PriceOverflow, got {result:?}"
        );
    }

    #[test]
    fn totals_beyond_bigint_are_refused() {
        let pricey = entry(4_000_000_000_000_000_000, 4_000_000_000_000_000_000, 10);

        let result = quote(&[(pricey, qty(3))]);

        assert!(
            matches!(result, Err(CheckoutError::PriceOverflow(p)) if p == pricey.product),
            "expected PriceOverflow, got {result:?}"
        );
    }

    #[test]
    fn lines_summing_past_bigint_are_refused() {
        let half = MAX_AMOUNT / 2 + 1;
        let a = entry(half, half, 1);
        let b = entry(half, half, 1);

        let result = quote(&[(a, qty(1)), (b, qty(1))]);

        assert!(
            matches!(result, Err(CheckoutError::PriceOverflow(p)) if p == b.product),
            "expected PriceOverflow on the second line, got {result:?}"
        );
    }

    #[test]
    fn a_total_of_exactly_max_amount_is_priced() -> TestResult {
        let quote = quote(&[(entry(MAX_AMOUNT, MAX_AMOUNT, 1), qty(1))])?;

        assert_eq!(quote.total, MAX_AMOUNT);

        Ok(())
    }

    #[test]
    fn marked_up_products_do_not_reduce_savings() -> TestResult {
        let discounted = entry(80, 100, 5);
        let marked_up = entry(120, 100, 5);

        let quote = quote(&[(discounted, qty(1)), (marked_up, qty(1))])?;

        assert_eq!(quote.savings, 20);

        Ok(())
    }
}
