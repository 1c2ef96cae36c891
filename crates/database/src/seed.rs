use crate::DbError;
use crate::mapping::encode_string_list;
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::Transaction;

/// Id of the customer written by [`seed_sample_data`].
pub const SAMPLE_CUSTOMER_ID: &str = "CUST001";

const SAMPLE_INTERESTS: [&str; 3] = ["Organic Gardening", "Composting", "Herb Growing"];

const SAMPLE_PRODUCTS: &[(&str, &str)] = &[
    ("fert-111", "All-Purpose Fertilizer"),
    ("trowel-222", "Gardening Trowel"),
    ("seeds-333", "Tomato Seeds (Variety Pack)"),
    ("pots-444", "Terracotta Pots (6-inch)"),
    ("gloves-555", "Gardening Gloves (Leather)"),
    ("pruner-666", "Pruning Shears"),
];

struct SamplePurchase {
    date: &'static str,
    total_amount: f64,
    items: &'static [(&'static str, i64)],
}

const SAMPLE_PURCHASES: &[SamplePurchase] = &[
    SamplePurchase {
        date: "2023-03-05",
        total_amount: 35.98,
        items: &[("fert-111", 1), ("trowel-222", 1)],
    },
    SamplePurchase {
        date: "2023-07-12",
        total_amount: 42.50,
        items: &[("seeds-333", 2), ("pots-444", 4)],
    },
    SamplePurchase {
        date: "2024-01-20",
        total_amount: 55.25,
        items: &[("gloves-555", 1), ("pruner-666", 1)],
    },
];

/// Row counts written by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: u64,
    pub products: u64,
    pub purchases: u64,
    pub purchase_items: u64,
}

/// Replaces the store's contents with the fixed sample data set.
///
/// Everything happens in one transaction; if any insert fails the store is
/// left exactly as it was.
pub async fn seed_sample_data(pool: &SqlitePool) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    clear_all(&mut tx).await?;

    let interests: Vec<String> = SAMPLE_INTERESTS.iter().map(|s| s.to_string()).collect();
    summary.customers += sqlx::query(
        r#"
        INSERT INTO customers (
            customer_id, account_number, customer_first_name, customer_last_name, email,
            phone_number, customer_start_date, years_as_customer,
            billing_address_street, billing_address_city, billing_address_state, billing_address_zip,
            loyalty_points, preferred_store, comm_pref_email, comm_pref_sms, comm_pref_push,
            garden_type, garden_size, garden_sun_exposure, garden_soil_type, garden_interests,
            scheduled_appointments
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(SAMPLE_CUSTOMER_ID)
    .bind("ACC12345")
    .bind("John")
    .bind("Smith")
    .bind("john.smith@email.com")
    .bind("555-0123")
    .bind("2020-05-01")
    .bind(4_i64)
    .bind("123 Garden Lane")
    .bind("Springfield")
    .bind("IL")
    .bind("62701")
    .bind(250_i64)
    .bind("Springfield Garden Center")
    .bind(1_i64)
    .bind(0_i64)
    .bind(1_i64)
    .bind("Vegetable Garden")
    .bind("Medium")
    .bind("Full Sun")
    .bind("Loamy")
    .bind(encode_string_list(&interests)?)
    .bind("{}")
    .execute(&mut *tx)
    .await?
    .rows_affected();

    // The catalog is shared, so an existing product is left alone.
    for (product_id, name) in SAMPLE_PRODUCTS {
        summary.products += sqlx::query("INSERT OR IGNORE INTO products (product_id, name) VALUES (?, ?)")
            .bind(*product_id)
            .bind(*name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    for purchase in SAMPLE_PURCHASES {
        let result = sqlx::query("INSERT INTO purchases (customer_id, date, total_amount) VALUES (?, ?, ?)")
            .bind(SAMPLE_CUSTOMER_ID)
            .bind(purchase.date)
            .bind(purchase.total_amount)
            .execute(&mut *tx)
            .await?;
        summary.purchases += result.rows_affected();
        let purchase_id = result.last_insert_rowid();

        for (product_id, quantity) in purchase.items {
            summary.purchase_items += sqlx::query(
                "INSERT INTO purchase_items (purchase_id, product_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(purchase_id)
            .bind(*product_id)
            .bind(*quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
    }

    tx.commit().await?;

    tracing::info!(
        customers = summary.customers,
        products = summary.products,
        purchases = summary.purchases,
        purchase_items = summary.purchase_items,
        "Seeded sample data"
    );

    Ok(summary)
}

/// Deletes every row, children first, and restarts the autoincrement counters.
async fn clear_all(tx: &mut Transaction<'_, Sqlite>) -> Result<(), DbError> {
    for statement in [
        "DELETE FROM purchase_items",
        "DELETE FROM purchases",
        "DELETE FROM products",
        "DELETE FROM customers",
    ] {
        sqlx::query(statement).execute(&mut **tx).await?;
    }
    sqlx::query("DELETE FROM sqlite_sequence WHERE name IN ('purchases', 'purchase_items')")
        .execute(&mut **tx)
        .await?;
    Ok(())
}
