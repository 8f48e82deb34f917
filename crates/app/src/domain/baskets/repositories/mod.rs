//! Basket Repositories

mod baskets;
mod lines;

pub(crate) use baskets::PgBasketsRepository;
pub(crate) use lines::PgBasketLinesRepository;
