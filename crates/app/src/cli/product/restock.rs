use clap::Args;
use storefront_app::domain::products::{ProductsService, models::ProductUuid};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RestockProductArgs {
    #[arg(long)]
    product_uuid: Uuid,

    /// Units to add to the quantity on hand
    #[arg(long)]
    amount: u64,
}

pub(crate) async fn run(
    service: &dyn ProductsService,
    args: RestockProductArgs,
) -> Result<(), String> {
    let product = service
        .restock(ProductUuid::from_uuid(args.product_uuid), args.amount)
        .await
        .map_err(|error| format!("failed to restock product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("quantity: {}", product.quantity);

    Ok(())
}
