use clap::Args;
use storefront_app::domain::products::{
    ProductsService,
    models::{CategoryUuid, NewProduct, ProductUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// Product display name
    #[arg(long)]
    name: String,

    /// Selling price in minor currency units
    #[arg(long)]
    price: u64,

    /// Price before discount; defaults to `price`
    #[arg(long)]
    original_price: Option<u64>,

    /// Initial quantity on hand
    #[arg(long, default_value_t = 0)]
    quantity: u64,

    #[arg(long)]
    category_uuid: Option<Uuid>,

    /// Optional product UUID; generated when omitted
    #[arg(long)]
    product_uuid: Option<Uuid>,
}

pub(crate) async fn run(
    service: &dyn ProductsService,
    args: CreateProductArgs,
) -> Result<(), String> {
    if args.name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }

    let product = service
        .create_product(NewProduct {
            uuid: args
                .product_uuid
                .map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            name: args.name,
            price: args.price,
            original_price: args.original_price.unwrap_or(args.price),
            quantity: args.quantity,
            category_uuid: args.category_uuid.map(CategoryUuid::from_uuid),
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("product_name: {}", product.name);
    println!("quantity: {}", product.quantity);

    Ok(())
}
