//! Integration tests for the `ecommerce` repositories and schema constraints.
//!
//! These tests require a running `PostgreSQL` server reachable through
//! `DATABASE_URL`. Run with: `cargo test -p storekeep-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use std::num::NonZeroU32;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::PgPool;
use storekeep_core::{CategoryId, Email, OrderId, OrderStatus, ProductId, UserId};
use storekeep_integration_tests::{
    create_category, create_order, create_product, create_user, price,
};
use storekeep_server::db::{
    AddressRepository, CategoryRepository, Database, OrderItemRepository, OrderRepository,
    ProductRepository, RepositoryError, UserRepository,
};
use storekeep_server::models::{
    AddressUpdate, NewAddress, NewOrder, NewOrderItem, ProductUpdate, UserUpdate,
};

fn quantity(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

// ============================================================================
// Users
// ============================================================================

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_email_is_a_conflict(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    create_user(&mut session, "grace@example.com").await.unwrap();
    session.commit().await.unwrap();

    let err = create_user(&mut session, "grace@example.com").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_user_lookup_and_partial_update(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "linus@example.com").await.unwrap();
    let mut users = UserRepository::new(&mut session);

    let by_email = users
        .get_by_email(&Email::parse("linus@example.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);

    let updated = users
        .update(
            user.id,
            &UserUpdate {
                username: Some("torvalds".to_owned()),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "torvalds");
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.hashed_password, user.hashed_password);

    assert!(users.get_by_id(UserId::new(i32::MAX)).await.unwrap().is_none());
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_update_and_delete_of_missing_rows_are_not_found(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();
    let missing = UserId::new(i32::MAX);

    let err = UserRepository::new(&mut session)
        .update(missing, &UserUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let err = UserRepository::new(&mut session)
        .delete(missing)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let err = OrderRepository::new(&mut session)
        .delete(OrderId::new(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_updated_at_advances_on_update(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "barbara@example.com").await.unwrap();
    assert_eq!(user.timestamps.created_at, user.timestamps.updated_at);
    session.commit().await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;

    let updated = UserRepository::new(&mut session)
        .update(
            user.id,
            &UserUpdate {
                username: Some("liskov".to_owned()),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.timestamps.created_at, user.timestamps.created_at);
    assert!(updated.timestamps.updated_at > user.timestamps.updated_at);
}

// ============================================================================
// Categories & Products
// ============================================================================

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_category_names_are_unique(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    create_category(&mut session, "Books").await.unwrap();
    let other = create_category(&mut session, "Films").await.unwrap();
    session.commit().await.unwrap();

    let err = CategoryRepository::new(&mut session)
        .rename(other.id, "Books")
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    session.rollback().await.unwrap();

    let names: Vec<String> = CategoryRepository::new(&mut session)
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Books", "Films"]);
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_products_by_category(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let category = create_category(&mut session, "Stationery").await.unwrap();
    let pen = create_product(&mut session, "Pen", 150, 10).await.unwrap();
    let loose = create_product(&mut session, "Mystery box", 999, 1).await.unwrap();

    let mut products = ProductRepository::new(&mut session);
    let pen = products
        .update(
            pen.id,
            &ProductUpdate {
                category_id: Some(Some(category.id)),
                description: Some(Some("Blue ink".to_owned())),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pen.category_id, Some(category.id));
    assert_eq!(pen.description.as_deref(), Some("Blue ink"));

    let in_category = products.list_by_category(Some(category.id)).await.unwrap();
    assert_eq!(in_category.iter().map(|p| p.id).collect::<Vec<_>>(), [pen.id]);

    let uncategorized = products.list_by_category(None).await.unwrap();
    assert_eq!(
        uncategorized.iter().map(|p| p.id).collect::<Vec<_>>(),
        [loose.id]
    );

    // Some(None) clears a nullable column, None leaves it alone
    let pen = products
        .update(
            pen.id,
            &ProductUpdate {
                description: Some(None),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pen.description, None);
    assert_eq!(pen.category_id, Some(category.id));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_product_with_missing_category_is_rejected(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let product = create_product(&mut session, "Orphan", 100, 0).await.unwrap();
    let err = ProductRepository::new(&mut session)
        .update(
            product.id,
            &ProductUpdate {
                category_id: Some(Some(CategoryId::new(i32::MAX))),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_stock_cannot_go_negative(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let product = create_product(&mut session, "Mug", 1_200, 3).await.unwrap();
    session.commit().await.unwrap();

    let mut products = ProductRepository::new(&mut session);
    assert_eq!(products.adjust_stock(product.id, -3).await.unwrap(), 0);

    let err = products.adjust_stock(product.id, -1).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)));
    session.rollback().await.unwrap();

    let mut products = ProductRepository::new(&mut session);
    let stored = products.get_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 3);

    let err = products
        .adjust_stock(ProductId::new(i32::MAX), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

// ============================================================================
// Orders & Order Items
// ============================================================================

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_order_defaults_to_pending(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "edsger@example.com").await.unwrap();
    let order = create_order(&mut session, &user, 0).await.unwrap();
    assert!(order.status.is_pending());
    assert_eq!(order.total, price(0));

    let shipped = OrderRepository::new(&mut session)
        .update_status(order.id, &OrderStatus::parse(OrderStatus::SHIPPED).unwrap())
        .await
        .unwrap();
    assert_eq!(shipped.status.as_str(), "shipped");

    let explicit = OrderRepository::new(&mut session)
        .create(&NewOrder {
            user_id: user.id,
            total: price(500),
            status: Some(OrderStatus::parse("awaiting_review").unwrap()),
        })
        .await
        .unwrap();
    assert_eq!(explicit.status.as_str(), "awaiting_review");

    let orders = OrderRepository::new(&mut session)
        .list_by_user(user.id)
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_order_with_missing_user_is_rejected(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let err = OrderRepository::new(&mut session)
        .create(&NewOrder {
            user_id: UserId::new(i32::MAX),
            total: price(100),
            status: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_order_item_with_missing_order_writes_nothing(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let product = create_product(&mut session, "Kettle", 3_999, 5).await.unwrap();
    session.commit().await.unwrap();

    let err = OrderItemRepository::new(&mut session)
        .create(&NewOrderItem {
            order_id: OrderId::new(i32::MAX),
            product_id: product.id,
            quantity: quantity(1),
            price: product.price,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
    session.rollback().await.unwrap();

    let items = OrderItemRepository::new(&mut session)
        .list_by_product(product.id)
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_order_item_with_missing_product_is_rejected(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "alan@example.com").await.unwrap();
    let order = create_order(&mut session, &user, 0).await.unwrap();

    let err = OrderItemRepository::new(&mut session)
        .create(&NewOrderItem {
            order_id: order.id,
            product_id: ProductId::new(i32::MAX),
            quantity: quantity(1),
            price: price(100),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_item_price_is_a_snapshot(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "margaret@example.com").await.unwrap();
    let product = create_product(&mut session, "Globe", 4_500, 4).await.unwrap();
    let order = create_order(&mut session, &user, 9_000).await.unwrap();
    let item = OrderItemRepository::new(&mut session)
        .create(&NewOrderItem {
            order_id: order.id,
            product_id: product.id,
            quantity: quantity(2),
            price: product.price,
        })
        .await
        .unwrap();

    ProductRepository::new(&mut session)
        .update(
            product.id,
            &ProductUpdate {
                price: Some(price(5_000)),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();

    let stored = OrderItemRepository::new(&mut session)
        .get_by_id(item.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.price, price(4_500));
    assert_eq!(stored.line_total(), Decimal::new(9_000, 2));
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_order_total_is_caller_maintained(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "frances@example.com").await.unwrap();
    let pencil = create_product(&mut session, "Pencil", 125, 100).await.unwrap();
    let eraser = create_product(&mut session, "Eraser", 80, 100).await.unwrap();
    let order = create_order(&mut session, &user, 0).await.unwrap();

    let mut items = OrderItemRepository::new(&mut session);
    for (product, n) in [(&pencil, 4), (&eraser, 3)] {
        items
            .create(&NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity: quantity(n),
                price: product.price,
            })
            .await
            .unwrap();
    }
    assert_eq!(items.list_by_order(order.id).await.unwrap().len(), 2);

    let mut orders = OrderRepository::new(&mut session);
    let unchanged = orders.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.total, price(0));

    let computed = orders.items_total(order.id).await.unwrap();
    assert_eq!(computed, Decimal::new(740, 2));

    let reconciled = orders
        .set_total(order.id, price(740))
        .await
        .unwrap();
    assert_eq!(reconciled.total.amount(), computed);
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_referenced_rows_cannot_be_deleted(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "barbara.l@example.com").await.unwrap();
    let product = create_product(&mut session, "Chair", 15_000, 1).await.unwrap();
    let order = create_order(&mut session, &user, 15_000).await.unwrap();
    let item = OrderItemRepository::new(&mut session)
        .create(&NewOrderItem {
            order_id: order.id,
            product_id: product.id,
            quantity: quantity(1),
            price: product.price,
        })
        .await
        .unwrap();
    session.commit().await.unwrap();

    let err = ProductRepository::new(&mut session)
        .delete(product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
    session.rollback().await.unwrap();

    let err = OrderRepository::new(&mut session)
        .delete(order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
    session.rollback().await.unwrap();

    // Removing dependents first lets the deletes through
    OrderItemRepository::new(&mut session)
        .delete(item.id)
        .await
        .unwrap();
    OrderRepository::new(&mut session)
        .delete(order.id)
        .await
        .unwrap();
    ProductRepository::new(&mut session)
        .delete(product.id)
        .await
        .unwrap();
    UserRepository::new(&mut session)
        .delete(user.id)
        .await
        .unwrap();
    session.commit().await.unwrap();
}

// ============================================================================
// Addresses
// ============================================================================

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_address_lifecycle(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "hedy@example.com").await.unwrap();
    let mut addresses = AddressRepository::new(&mut session);

    let address = addresses
        .create(&NewAddress {
            user_id: user.id,
            street: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: Some("IL".to_owned()),
            country: "US".to_owned(),
            postal_code: "62701".to_owned(),
        })
        .await
        .unwrap();

    let moved = addresses
        .update(
            address.id,
            &AddressUpdate {
                city: Some("Vienna".to_owned()),
                country: Some("AT".to_owned()),
                postal_code: Some("1010".to_owned()),
                state: Some(None),
                ..AddressUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.street, "1 Main St");
    assert_eq!(moved.city, "Vienna");
    assert_eq!(moved.state, None);

    let listed = addresses.list_by_user(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    addresses.delete(address.id).await.unwrap();
    assert!(addresses.get_by_id(address.id).await.unwrap().is_none());
}

#[sqlx::test(migrator = "storekeep_integration_tests::MIGRATOR")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_user_with_addresses_cannot_be_deleted(pool: PgPool) {
    let db = Database::from_pool(pool);
    let mut session = db.session().await.unwrap();

    let user = create_user(&mut session, "katherine@example.com").await.unwrap();
    AddressRepository::new(&mut session)
        .create(&NewAddress {
            user_id: user.id,
            street: "2 Side St".to_owned(),
            city: "Hampton".to_owned(),
            state: None,
            country: "US".to_owned(),
            postal_code: "23669".to_owned(),
        })
        .await
        .unwrap();

    let err = UserRepository::new(&mut session)
        .delete(user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
}
