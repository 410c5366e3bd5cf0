mod common;

use pos_backend::{
    dto::{
        accounts::CreateAccountRequest,
        auth::LoginRequest,
        customers::{CreateCustomerRequest, UpdateCustomerRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        sales::CartItemRequest,
    },
    error::AppError,
    models::Role,
    routes::params::ProductQuery,
    services::{account_service, auth_service, customer_service, product_service, sale_service},
};

// Integration flow: admin maintains the catalog and customers; duplicates and
// referenced deletes are refused without touching existing records.
#[tokio::test]
async fn catalog_customer_and_account_gate_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let admin = common::create_account(&state, Role::Admin, "secret").await?;
    let staff = common::create_account(&state, Role::Staff, "secret").await?;

    // Product round-trip
    let sku = common::unique("SKU");
    let created = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: Some("  Ferris Mug ".into()),
            description: Some("Coffee tastes better".into()),
            price: Some(12_000),
            stock: Some(7),
            sku: Some(sku.clone()),
            is_refundable: Some(true),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.name, "Ferris Mug");
    let fetched = product_service::get_product(&state, &staff, created.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched, created);

    let listed = product_service::list_products(
        &state,
        &staff,
        ProductQuery {
            q: Some(sku.clone()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(listed.data.unwrap().items, vec![created.clone()]);
    assert_eq!(listed.meta.unwrap().total, Some(1));

    // Only admins edit the catalog.
    let err = product_service::create_product(
        &state,
        &staff,
        CreateProductRequest {
            name: Some("Nope".into()),
            price: Some(1),
            stock: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Field validation names the field.
    for (request, field) in [
        (
            CreateProductRequest {
                name: Some("Zero".into()),
                price: Some(0),
                stock: Some(1),
                ..Default::default()
            },
            "price",
        ),
        (
            CreateProductRequest {
                name: Some("Negative".into()),
                price: Some(10),
                stock: Some(-1),
                ..Default::default()
            },
            "stock",
        ),
        (
            CreateProductRequest {
                name: Some(" ".into()),
                price: Some(10),
                stock: Some(1),
                ..Default::default()
            },
            "name",
        ),
    ] {
        match product_service::create_product(&state, &admin, request).await {
            Err(AppError::InvalidInput { field: got, .. }) => assert_eq!(got, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }

    // Duplicate SKU on create and on update leaves the original intact.
    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: Some("Copycat".into()),
            price: Some(10),
            stock: Some(1),
            sku: Some(sku.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "sku", .. }));

    let other_id = common::create_product(&state, 500, 3, false).await?;
    let other_before = product_service::get_product(&state, &admin, other_id)
        .await?
        .data
        .unwrap();
    let err = product_service::update_product(
        &state,
        &admin,
        other_id,
        UpdateProductRequest {
            sku: Some(sku.clone()),
            price: Some(999),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "sku", .. }));
    let other_after = product_service::get_product(&state, &admin, other_id)
        .await?
        .data
        .unwrap();
    assert_eq!(other_after, other_before);
    assert_eq!(
        product_service::get_product(&state, &admin, created.id)
            .await?
            .data
            .unwrap(),
        created
    );

    // Keeping its own SKU is not a conflict.
    let updated = product_service::update_product(
        &state,
        &admin,
        created.id,
        UpdateProductRequest {
            sku: Some(sku.clone()),
            price: Some(13_000),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.price, 13_000);
    assert_eq!(updated.stock, 7);
    assert_eq!(updated.sku.as_deref(), Some(sku.as_str()));

    // A blank SKU clears it; an absent one is left alone.
    let cleared = product_service::update_product(
        &state,
        &admin,
        created.id,
        UpdateProductRequest {
            sku: Some("  ".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cleared.sku, None);
    assert_eq!(cleared.description, created.description);
    let renamed = product_service::update_product(
        &state,
        &admin,
        other_id,
        UpdateProductRequest {
            name: Some("Renamed Widget".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.sku, other_before.sku);
    assert_eq!(renamed.description, other_before.description);

    // Customer round-trip and uniqueness of email and phone.
    let email = format!("{}@example.com", common::unique("ann"));
    let phone = common::unique("+62");
    let customer = customer_service::create_customer(
        &state,
        &staff,
        CreateCustomerRequest {
            name: Some("Ann".into()),
            email: Some(email.clone()),
            phone: Some(phone.clone()),
            is_member: Some(true),
        },
    )
    .await?
    .data
    .unwrap();
    let fetched = customer_service::get_customer(&state, &staff, customer.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched, customer);

    let err = customer_service::create_customer(
        &state,
        &staff,
        CreateCustomerRequest {
            name: Some("Ann Again".into()),
            email: Some(email.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "email", .. }));

    let err = customer_service::create_customer(
        &state,
        &staff,
        CreateCustomerRequest {
            name: Some("Ann Again".into()),
            phone: Some(phone.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "phone", .. }));

    let bob = common::create_customer(&state, false).await?;
    let err = customer_service::update_customer(
        &state,
        &staff,
        bob,
        UpdateCustomerRequest {
            name: Some("Bob".into()),
            phone: Some(phone.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "phone", .. }));
    let unchanged = customer_service::get_customer(&state, &staff, customer.id)
        .await?
        .data
        .unwrap();
    assert_eq!(unchanged, customer);

    // A name-only edit keeps contact details and membership.
    let renamed = customer_service::update_customer(
        &state,
        &staff,
        customer.id,
        UpdateCustomerRequest {
            name: Some("Ann Renamed".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.name, "Ann Renamed");
    assert_eq!(renamed.email.as_deref(), Some(email.as_str()));
    assert_eq!(renamed.phone.as_deref(), Some(phone.as_str()));
    assert!(renamed.is_member);

    // A blank email clears it and leaves the phone alone.
    let cleared = customer_service::update_customer(
        &state,
        &staff,
        customer.id,
        UpdateCustomerRequest {
            name: Some("Ann Renamed".into()),
            email: Some(String::new()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cleared.email, None);
    assert_eq!(cleared.phone.as_deref(), Some(phone.as_str()));

    // Referenced records cannot be deleted.
    sale_service::commit_with_retry(
        &state.orm,
        state.sales,
        staff.account_id,
        Some(customer.id),
        &[CartItemRequest {
            product_id: created.id,
            quantity: 1,
        }],
    )
    .await?;
    let err = product_service::delete_product(&state, &admin, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
    let err = customer_service::delete_customer(&state, &admin, customer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
    assert!(customer_service::get_customer(&state, &admin, customer.id).await.is_ok());

    // Staff may not delete customers; admins may delete unreferenced ones.
    let err = customer_service::delete_customer(&state, &staff, bob)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    customer_service::delete_customer(&state, &admin, bob).await?;
    assert!(matches!(
        customer_service::get_customer(&state, &admin, bob).await,
        Err(AppError::NotFound { .. })
    ));
    product_service::delete_product(&state, &admin, other_id).await?;
    assert!(matches!(
        product_service::delete_product(&state, &admin, other_id).await,
        Err(AppError::NotFound { .. })
    ));

    // Accounts: admin creates, username is unique, login issues a usable credential.
    let username = common::unique("cashier");
    let account = account_service::create_account(
        &state,
        &admin,
        CreateAccountRequest {
            username: Some(username.clone()),
            password: Some("hunter2".into()),
            role: Some(Role::Staff),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(account.role, Role::Staff);

    let err = account_service::create_account(
        &state,
        &admin,
        CreateAccountRequest {
            username: Some(username.clone()),
            password: Some("other".into()),
            role: Some(Role::Admin),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "username", .. }));

    let err = account_service::create_account(
        &state,
        &staff,
        CreateAccountRequest {
            username: Some(common::unique("sneaky")),
            password: Some("x".into()),
            role: Some(Role::Admin),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let login = auth_service::login(
        &state,
        LoginRequest {
            username: Some(username.clone()),
            password: Some("hunter2".into()),
        },
    )
    .await?
    .data
    .unwrap();
    let claim = state.credentials.verify(&login.token)?;
    assert_eq!(claim.account_id, account.id);
    assert_eq!(claim.role, Role::Staff);

    let err = auth_service::login(
        &state,
        LoginRequest {
            username: Some(username),
            password: Some("wrong".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));

    Ok(())
}
