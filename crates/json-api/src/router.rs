//! App Router

use salvo::Router;

use crate::{baskets, checkout, products};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .get(products::get::handler)
                        .put(products::update::handler)
                        .delete(products::delete::handler)
                        .push(Router::with_path("restock").post(products::restock::handler)),
                ),
        )
        .push(
            Router::with_path("baskets")
                .post(baskets::create::handler)
                .push(
                    Router::with_path("{basket}")
                        .get(baskets::get::handler)
                        .delete(baskets::delete::handler)
                        .push(Router::with_path("checkout").post(checkout::handler::handler)),
                ),
        )
}
