use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use configuration::{OutputFormat, load_config_from};
use core_types::{Customer, CustomerId};
// Import database types directly from the database crate
use database::connection::{connect, run_migrations};
use database::repository::{CustomerLookup, DbRepository};
use database::seed::seed_sample_data;
use sqlx::SqlitePool;

/// The main entry point for the customer service tool.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config))?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Initialize the database connection and make sure the schema exists
    let db_pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Init => handle_init(db_pool).await,
        Commands::Fetch(args) => {
            let format = args.format.unwrap_or(config.output.format);
            handle_fetch(args.customer_id, format, db_pool).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Rebuilds nested customer records from the relational customer store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, without extension (e.g. "config" for config.toml).
    #[arg(long, global = true, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and load the sample data set.
    Init,
    /// Fetch one customer by id and print it.
    Fetch(FetchArgs),
}

#[derive(Parser)]
struct FetchArgs {
    /// The customer to fetch (e.g., "CUST001").
    customer_id: CustomerId,

    /// Output format; defaults to `output.format` from the configuration.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_init(db_pool: SqlitePool) -> anyhow::Result<()> {
    let summary = seed_sample_data(&db_pool)
        .await
        .context("Failed to seed sample data")?;

    println!(
        "Customer store ready: {} customer(s), {} product(s), {} purchase(s), {} purchase item(s).",
        summary.customers, summary.products, summary.purchases, summary.purchase_items
    );
    Ok(())
}

async fn handle_fetch(
    customer_id: CustomerId,
    format: OutputFormat,
    db_pool: SqlitePool,
) -> anyhow::Result<()> {
    let db_repo = DbRepository::new(db_pool);
    tracing::info!(customer_id = %customer_id, "Fetching customer");

    match db_repo.fetch_customer(customer_id.as_str()).await {
        CustomerLookup::Found(customer) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&customer)?),
                OutputFormat::Table => print_tables(&customer),
            }
            Ok(())
        }
        CustomerLookup::NotFound => {
            println!("Could not fetch customer.");
            Ok(())
        }
        CustomerLookup::StoreError(e) => bail!("Could not fetch customer {customer_id}: {e}"),
    }
}

/// Prints the profile and the purchase history as two tables.
fn print_tables(customer: &Customer) {
    let mut profile = Table::new();
    profile.load_preset(UTF8_FULL).set_header(vec!["Field", "Value"]);

    let address = &customer.billing_address;
    let prefs = &customer.communication_preferences;
    let rows = [
        ("Customer ID", customer.customer_id.clone()),
        ("Account", customer.account_number.clone()),
        ("Name", customer.full_name()),
        ("Email", customer.email.clone()),
        ("Phone", customer.phone_number.clone().unwrap_or_else(|| "-".to_string())),
        ("Customer since", format!("{} ({} years)", customer.start_date, customer.years_as_customer)),
        (
            "Billing address",
            format!("{}, {}, {} {}", address.street, address.city, address.state, address.zip),
        ),
        ("Loyalty points", customer.loyalty_points.to_string()),
        ("Preferred store", customer.preferred_store.clone()),
        (
            "Contact by",
            format!("email: {}, sms: {}, push: {}", prefs.email, prefs.sms, prefs.push_notifications),
        ),
    ];
    for (field, value) in rows {
        profile.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    if let Some(garden) = &customer.garden_profile {
        profile.add_row(vec![
            Cell::new("Garden"),
            Cell::new(format!(
                "{} ({}, {}, {} soil)",
                garden.garden_type, garden.size, garden.sun_exposure, garden.soil_type
            )),
        ]);
        profile.add_row(vec![Cell::new("Interests"), Cell::new(garden.interests.join(", "))]);
    }
    println!("{profile}");

    let mut purchases = Table::new();
    purchases
        .load_preset(UTF8_FULL)
        .set_header(vec!["Date", "Product", "Name", "Qty", "Total"]);
    for purchase in &customer.purchase_history {
        if purchase.items.is_empty() {
            purchases.add_row(vec![
                Cell::new(&purchase.date),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(0),
                Cell::new(format!("{:.2}", purchase.total_amount)),
            ]);
        }
        for (index, item) in purchase.items.iter().enumerate() {
            let (date, total) = if index == 0 {
                (purchase.date.clone(), format!("{:.2}", purchase.total_amount))
            } else {
                (String::new(), String::new())
            };
            purchases.add_row(vec![
                Cell::new(date),
                Cell::new(&item.product_id),
                Cell::new(&item.name),
                Cell::new(item.quantity),
                Cell::new(total),
            ]);
        }
    }
    println!("{purchases}");
    println!(
        "{} purchase(s), lifetime spend {:.2}",
        customer.purchase_history.len(),
        customer.lifetime_spend()
    );
}
