use configuration::DatabaseSettings;
use core_types::{CommunicationPreferences, Product};
use database::{
    CustomerLookup, DbError, DbRepository, SAMPLE_CUSTOMER_ID, SeedSummary, connect,
    run_migrations, seed_sample_data,
};
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_secs: 5,
    };
    let pool = connect(&settings).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

async fn seeded_repository() -> DbRepository {
    let pool = memory_pool().await;
    seed_sample_data(&pool).await.unwrap();
    DbRepository::new(pool)
}

/// Inserts a customer with no purchases; `garden_type` controls the garden columns.
async fn insert_plain_customer(pool: &SqlitePool, customer_id: &str, garden_type: Option<&str>) {
    sqlx::query(
        r#"
        INSERT INTO customers (
            customer_id, account_number, customer_first_name, customer_last_name, email,
            customer_start_date, years_as_customer,
            billing_address_street, billing_address_city, billing_address_state, billing_address_zip,
            loyalty_points, preferred_store, comm_pref_email, comm_pref_sms, comm_pref_push,
            garden_type, garden_size, garden_sun_exposure, garden_soil_type, garden_interests
        ) VALUES (?, 'ACC999', 'Jane', 'Doe', ?, '2022-02-02', 2,
                  '9 Elm St', 'Shelbyville', 'IL', '62565',
                  NULL, 'Shelbyville Nursery', 0, 1, 0,
                  ?, 'Small', 'Shade', 'Clay', '["Ferns"]')
        "#,
    )
    .bind(customer_id)
    .bind(format!("{customer_id}@example.com"))
    .bind(garden_type)
    .execute(pool)
    .await
    .unwrap();
}

fn found(lookup: CustomerLookup) -> core_types::Customer {
    match lookup {
        CustomerLookup::Found(customer) => *customer,
        other => panic!("expected a customer, got {other:?}"),
    }
}

#[tokio::test]
async fn seeded_customer_is_rebuilt_with_nested_groups() {
    let repo = seeded_repository().await;

    let customer = found(repo.fetch_customer(SAMPLE_CUSTOMER_ID).await);

    assert_eq!(customer.customer_id, "CUST001");
    assert_eq!(customer.account_number, "ACC12345");
    assert_eq!(customer.full_name(), "John Smith");
    assert_eq!(customer.email, "john.smith@email.com");
    assert_eq!(customer.phone_number.as_deref(), Some("555-0123"));
    assert_eq!(customer.start_date, "2020-05-01");
    assert_eq!(customer.years_as_customer, 4);
    assert_eq!(customer.loyalty_points, 250);
    assert_eq!(customer.preferred_store, "Springfield Garden Center");
    assert_eq!(customer.billing_address.street, "123 Garden Lane");
    assert_eq!(customer.billing_address.city, "Springfield");
    assert_eq!(customer.billing_address.state, "IL");
    assert_eq!(customer.billing_address.zip, "62701");
    assert_eq!(
        customer.communication_preferences,
        CommunicationPreferences {
            email: true,
            sms: false,
            push_notifications: true,
        }
    );
}

#[tokio::test]
async fn garden_interests_keep_their_stored_order() {
    let repo = seeded_repository().await;

    let customer = found(repo.fetch_customer(SAMPLE_CUSTOMER_ID).await);
    let garden = customer.garden_profile.expect("seeded customer has a garden");

    assert_eq!(garden.garden_type, "Vegetable Garden");
    assert_eq!(garden.size, "Medium");
    assert_eq!(garden.sun_exposure, "Full Sun");
    assert_eq!(garden.soil_type, "Loamy");
    assert_eq!(
        garden.interests,
        vec!["Organic Gardening", "Composting", "Herb Growing"]
    );
}

#[tokio::test]
async fn purchases_carry_their_catalog_lines() {
    let repo = seeded_repository().await;

    let customer = found(repo.fetch_customer(SAMPLE_CUSTOMER_ID).await);

    assert_eq!(customer.purchase_history.len(), 3);
    let first = &customer.purchase_history[0];
    assert_eq!(first.date, "2023-03-05");
    assert_eq!(first.total_amount, 35.98);
    assert_eq!(
        first.items,
        vec![
            Product {
                product_id: "fert-111".to_string(),
                name: "All-Purpose Fertilizer".to_string(),
                quantity: 1,
            },
            Product {
                product_id: "trowel-222".to_string(),
                name: "Gardening Trowel".to_string(),
                quantity: 1,
            },
        ]
    );

    let dates: Vec<_> = customer.purchase_history.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, vec!["2023-03-05", "2023-07-12", "2024-01-20"]);
    assert_eq!(customer.purchase_history[1].unit_count(), 6);
}

#[tokio::test]
async fn unknown_customer_is_not_found_rather_than_an_error() {
    let repo = seeded_repository().await;

    assert!(matches!(repo.fetch_customer("CUST404").await, CustomerLookup::NotFound));
    assert!(repo.fetch_customer("").await.into_option().is_none());
    assert!(repo.get_customer("CUST404").await.unwrap().is_none());
}

#[tokio::test]
async fn customer_without_purchases_or_garden() {
    let repo = seeded_repository().await;
    insert_plain_customer(repo.pool(), "CUST002", Some("")).await;
    insert_plain_customer(repo.pool(), "CUST003", None).await;

    for customer_id in ["CUST002", "CUST003"] {
        let customer = found(repo.fetch_customer(customer_id).await);

        assert!(customer.purchase_history.is_empty());
        assert_eq!(customer.garden_profile, None);
        assert_eq!(customer.loyalty_points, 0);
        assert_eq!(customer.phone_number, None);
        assert_eq!(
            customer.communication_preferences,
            CommunicationPreferences {
                email: false,
                sms: true,
                push_notifications: false,
            }
        );
    }
}

#[tokio::test]
async fn repeated_fetches_are_structurally_equal() {
    let repo = seeded_repository().await;

    let first = repo.fetch_customer(SAMPLE_CUSTOMER_ID).await.into_option();
    let second = repo.fetch_customer(SAMPLE_CUSTOMER_ID).await.into_option();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn legacy_comma_delimited_interests_are_accepted() {
    let repo = seeded_repository().await;
    sqlx::query("UPDATE customers SET garden_interests = ? WHERE customer_id = ?")
        .bind("Organic Gardening,Composting,Herb Growing")
        .bind(SAMPLE_CUSTOMER_ID)
        .execute(repo.pool())
        .await
        .unwrap();

    let customer = found(repo.fetch_customer(SAMPLE_CUSTOMER_ID).await);

    assert_eq!(
        customer.garden_profile.unwrap().interests,
        vec!["Organic Gardening", "Composting", "Herb Growing"]
    );
}

#[tokio::test]
async fn undecodable_interests_are_reported_as_malformed() {
    let repo = seeded_repository().await;
    sqlx::query("UPDATE customers SET garden_interests = '[\"Composting\"' WHERE customer_id = ?")
        .bind(SAMPLE_CUSTOMER_ID)
        .execute(repo.pool())
        .await
        .unwrap();

    let lookup = repo.fetch_customer(SAMPLE_CUSTOMER_ID).await;

    assert!(matches!(
        lookup,
        CustomerLookup::StoreError(DbError::MalformedRow { ref column, .. }) if column == "garden_interests"
    ));
}

#[tokio::test]
async fn non_numeric_purchase_total_names_the_bare_column() {
    let repo = seeded_repository().await;
    sqlx::query("UPDATE purchases SET total_amount = 'abc' WHERE purchase_id = 1")
        .execute(repo.pool())
        .await
        .unwrap();

    let lookup = repo.fetch_customer(SAMPLE_CUSTOMER_ID).await;

    assert!(matches!(
        lookup,
        CustomerLookup::StoreError(DbError::MalformedRow { ref column, .. }) if column == "total_amount"
    ));
}

#[tokio::test]
async fn non_numeric_tenure_names_the_bare_column() {
    let repo = seeded_repository().await;
    sqlx::query("UPDATE customers SET years_as_customer = 'four' WHERE customer_id = ?")
        .bind(SAMPLE_CUSTOMER_ID)
        .execute(repo.pool())
        .await
        .unwrap();

    match repo.fetch_customer(SAMPLE_CUSTOMER_ID).await {
        CustomerLookup::StoreError(DbError::MalformedRow { column, .. }) => {
            assert_eq!(column, "years_as_customer");
        }
        other => panic!("expected a malformed row, got {other:?}"),
    }
}

#[tokio::test]
async fn scheduled_appointments_are_never_read() {
    let repo = seeded_repository().await;
    let before = repo.fetch_customer(SAMPLE_CUSTOMER_ID).await.into_option();

    sqlx::query("UPDATE customers SET scheduled_appointments = 'not json at all' WHERE customer_id = ?")
        .bind(SAMPLE_CUSTOMER_ID)
        .execute(repo.pool())
        .await
        .unwrap();

    assert_eq!(repo.fetch_customer(SAMPLE_CUSTOMER_ID).await.into_option(), before);
}

#[tokio::test]
async fn unreachable_store_is_a_store_error() {
    let repo = seeded_repository().await;
    repo.pool().close().await;

    let lookup = repo.fetch_customer(SAMPLE_CUSTOMER_ID).await;

    assert!(matches!(lookup, CustomerLookup::StoreError(DbError::QueryError(_))));
    assert!(!lookup.is_found());
}

#[tokio::test]
async fn purchase_items_must_reference_known_products() {
    let repo = seeded_repository().await;

    let result = sqlx::query("INSERT INTO purchase_items (purchase_id, product_id, quantity) VALUES (1, 'no-such-product', 1)")
        .execute(repo.pool())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn seeding_twice_leaves_one_copy_of_the_sample_data() {
    let pool = memory_pool().await;
    let expected = SeedSummary {
        customers: 1,
        products: 6,
        purchases: 3,
        purchase_items: 6,
    };

    assert_eq!(seed_sample_data(&pool).await.unwrap(), expected);
    assert_eq!(seed_sample_data(&pool).await.unwrap(), expected);

    let purchases: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
        .fetch_one(&pool)
        .await
        .unwrap();
    let first_purchase_id: i64 = sqlx::query_scalar("SELECT MIN(purchase_id) FROM purchases")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(purchases, 3);
    assert_eq!(first_purchase_id, 1);
}
