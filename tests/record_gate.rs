use axum::{http::StatusCode, response::IntoResponse};
use chrono::{NaiveDate, TimeZone, Utc};
use pos_backend::{
    dto::{reports::SalesReportQuery, sales::CartItemRequest},
    error::{AppError, is_transient},
    routes::params::{Pagination, ProductQuery},
    services::{
        record_gate::{
            normalize_optional, normalize_patch, require_text, validate_price, validate_stock,
        },
        sale_service::validate_cart,
    },
};
use sea_orm::{ConnAcquireErr, DbErr};
use uuid::Uuid;

#[test]
fn name_is_required_and_trimmed() {
    assert_eq!(require_text("name", Some("  Mug ".into())).unwrap(), "Mug");
    assert!(matches!(
        require_text("name", Some("   ".into())),
        Err(AppError::InvalidInput { field: "name", .. })
    ));
    assert!(matches!(
        require_text("name", None),
        Err(AppError::InvalidInput { field: "name", .. })
    ));
    assert_eq!(normalize_optional(Some(" ".into())), None);
}

#[test]
fn patch_fields_distinguish_absent_from_blank() {
    assert_eq!(normalize_patch(None), None);
    assert_eq!(normalize_patch(Some("   ".into())), Some(None));
    assert_eq!(normalize_patch(Some(" a@b.c ".into())), Some(Some("a@b.c".to_string())));
}

#[test]
fn price_must_be_positive_and_stock_non_negative() {
    assert_eq!(validate_price(1).unwrap(), 1);
    assert!(matches!(
        validate_price(0),
        Err(AppError::InvalidInput { field: "price", .. })
    ));
    assert!(matches!(
        validate_price(-5),
        Err(AppError::InvalidInput { field: "price", .. })
    ));

    assert_eq!(validate_stock(0).unwrap(), 0);
    assert!(matches!(
        validate_stock(-1),
        Err(AppError::InvalidInput { field: "stock", .. })
    ));
}

#[test]
fn cart_validation() {
    assert!(matches!(validate_cart(&[]), Err(AppError::EmptyCart)));

    let product_id = Uuid::new_v4();
    let bad = [CartItemRequest {
        product_id,
        quantity: -1,
    }];
    assert!(matches!(
        validate_cart(&bad),
        Err(AppError::InvalidInput { field: "quantity", .. })
    ));

    let ok = [CartItemRequest {
        product_id,
        quantity: 1,
    }];
    assert!(validate_cart(&ok).is_ok());
}

#[test]
fn report_window_covers_whole_days() {
    let query = SalesReportQuery {
        start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
    };
    let (from, until) = query.window().unwrap();
    assert_eq!(from, Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()));
    assert_eq!(until, Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()));

    let open = SalesReportQuery::default().window().unwrap();
    assert_eq!(open, (None, None));

    let inverted = SalesReportQuery {
        start_date: NaiveDate::from_ymd_opt(2024, 5, 2),
        end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
    };
    assert!(matches!(
        inverted.window(),
        Err(AppError::InvalidInput { field: "end_date", .. })
    ));
}

#[test]
fn pagination_is_clamped() {
    let p = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    assert_eq!(p.normalize(), (1, 100, 0));

    let q = ProductQuery {
        page: Some(3),
        per_page: Some(10),
        ..Default::default()
    };
    assert_eq!(q.pagination().normalize(), (3, 10, 20));

    let huge = Pagination {
        page: Some(i64::MAX),
        per_page: Some(100),
    };
    let (page, per_page, offset) = huge.normalize();
    assert_eq!((page, per_page), (i64::MAX, 100));
    assert_eq!(offset, i64::MAX);

    let negative = Pagination {
        page: Some(i64::MIN),
        per_page: Some(-3),
    };
    assert_eq!(negative.normalize(), (1, 1, 0));
}

#[test]
fn error_kinds_map_to_statuses() {
    let cases = [
        (AppError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
        (AppError::Forbidden, StatusCode::FORBIDDEN),
        (AppError::invalid("price", "bad"), StatusCode::BAD_REQUEST),
        (AppError::EmptyCart, StatusCode::BAD_REQUEST),
        (AppError::conflict("sku", "dup"), StatusCode::CONFLICT),
        (
            AppError::InsufficientStock {
                product_id: Uuid::new_v4(),
                product: "Mug".into(),
                available: 2,
            },
            StatusCode::CONFLICT,
        ),
        (AppError::not_found("Product", Uuid::new_v4()), StatusCode::NOT_FOUND),
        (AppError::TransientStoreFailure, StatusCode::SERVICE_UNAVAILABLE),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (err, status) in cases {
        assert_eq!(err.status(), status, "{}", err.kind());
        assert_eq!(err.into_response().status(), status);
    }
}

#[test]
fn store_errors_are_classified() {
    assert!(is_transient(&DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)));
    assert!(!is_transient(&DbErr::Custom("nope".into())));

    assert!(matches!(
        AppError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)),
        AppError::TransientStoreFailure
    ));
    let unexpected = AppError::from(DbErr::Custom("relation does not exist".into()));
    assert_eq!(unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(unexpected.to_string(), "Database error");
}
