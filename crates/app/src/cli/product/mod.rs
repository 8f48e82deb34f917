use clap::{Args, Subcommand};
use storefront_app::{
    database::{self, Db, DbSettings},
    domain::products::PgProductsService,
};

mod create;
mod restock;

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    Create(create::CreateProductArgs),
    Restock(restock::RestockProductArgs),
}

pub(crate) async fn run(command: ProductCommand) -> Result<(), String> {
    let database_url = command
        .database_url
        .ok_or_else(|| "--database-url or DATABASE_URL is required".to_string())?;

    let pool = database::connect(&database_url, &DbSettings::default())
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgProductsService::new(Db::new(pool));

    match command.command {
        ProductSubcommand::Create(args) => create::run(&service, args).await,
        ProductSubcommand::Restock(args) => restock::run(&service, args).await,
    }
}
