use crate::DbError;
use crate::mapping::reconstruct_customer;
use core_types::{Customer, Product, Purchase};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::FromRow;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the customer store. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

/// A row from the `purchases` table, before its lines are attached.
#[derive(Debug, Clone, FromRow)]
pub struct DbPurchase {
    pub purchase_id: i64,
    pub date: String,
    pub total_amount: f64,
}

/// A `purchase_items` row joined with the product catalog for its name.
#[derive(Debug, Clone, FromRow)]
pub struct DbPurchaseItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
}

impl From<DbPurchaseItem> for Product {
    fn from(item: DbPurchaseItem) -> Self {
        Product {
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
        }
    }
}

/// Outcome of a customer lookup.
///
/// `NotFound` is an ordinary answer. `StoreError` means the store could not
/// answer at all, including rows whose stored values do not fit the record.
#[derive(Debug)]
pub enum CustomerLookup {
    Found(Box<Customer>),
    NotFound,
    StoreError(DbError),
}

impl CustomerLookup {
    /// Collapses the lookup into "customer or absent"; store errors read as absent.
    pub fn into_option(self) -> Option<Customer> {
        match self {
            CustomerLookup::Found(customer) => Some(*customer),
            CustomerLookup::NotFound | CustomerLookup::StoreError(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CustomerLookup::Found(_))
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` over a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetches a customer by id and reports the outcome as a [`CustomerLookup`].
    ///
    /// Never fails: store errors are logged here and handed back as
    /// `StoreError`. Nothing is retried.
    pub async fn fetch_customer(&self, customer_id: &str) -> CustomerLookup {
        match self.get_customer(customer_id).await {
            Ok(Some(customer)) => CustomerLookup::Found(Box::new(customer)),
            Ok(None) => {
                tracing::info!(customer_id, "Customer not found");
                CustomerLookup::NotFound
            }
            Err(e) => {
                tracing::error!(customer_id, error = %e, "Failed to fetch customer");
                CustomerLookup::StoreError(e)
            }
        }
    }

    /// Rebuilds the nested customer record for `customer_id`.
    ///
    /// One connection is held for the whole reconstruction and goes back to the
    /// pool on every return path. Purchases come back in insertion order, and so
    /// do the lines within each purchase.
    pub async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, DbError> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query("SELECT * FROM customers WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DbError::from_query)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let purchase_history = load_purchase_history(&mut conn, customer_id).await?;
        let customer = reconstruct_customer(&row, purchase_history)?;

        tracing::debug!(
            customer_id,
            purchases = customer.purchase_history.len(),
            garden_profile = customer.has_garden_profile(),
            "Reconstructed customer"
        );

        Ok(Some(customer))
    }
}

async fn load_purchase_history(
    conn: &mut SqliteConnection,
    customer_id: &str,
) -> Result<Vec<Purchase>, DbError> {
    let shells = sqlx::query_as::<_, DbPurchase>(
        "SELECT purchase_id, date, total_amount FROM purchases WHERE customer_id = ? ORDER BY purchase_id",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DbError::from_query)?;

    let mut history = Vec::with_capacity(shells.len());
    for shell in shells {
        let items = sqlx::query_as::<_, DbPurchaseItem>(
            r#"
            SELECT pi.product_id, p.name, pi.quantity
            FROM purchase_items AS pi
            JOIN products AS p ON pi.product_id = p.product_id
            WHERE pi.purchase_id = ?
            ORDER BY pi.purchase_item_id
            "#,
        )
        .bind(shell.purchase_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(DbError::from_query)?;

        history.push(Purchase {
            date: shell.date,
            items: items.into_iter().map(Product::from).collect(),
            total_amount: shell.total_amount,
        });
    }

    Ok(history)
}
