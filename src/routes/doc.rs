use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        accounts::{AccountList, CreateAccountRequest},
        auth::{LoginRequest, LoginResponse},
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reports::{ReportLine, ReportSale, SalesReport, SalesSummary},
        sales::{CartItemRequest, CreateSaleRequest, SaleReceipt, SaleWithLines},
    },
    models::{Account, Customer, Product, Role, Sale, SaleLine},
    response::{ApiResponse, ErrorData, Meta},
    routes::{accounts, auth, customers, health, params, products, reports, sales},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        accounts::create_account,
        accounts::list_accounts,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        sales::create_sale,
        sales::get_sale,
        reports::sales_report
    ),
    components(
        schemas(
            Role,
            Account,
            Product,
            Customer,
            Sale,
            SaleLine,
            LoginRequest,
            LoginResponse,
            CreateAccountRequest,
            AccountList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerList,
            CartItemRequest,
            CreateSaleRequest,
            SaleReceipt,
            SaleWithLines,
            ReportLine,
            ReportSale,
            SalesSummary,
            SalesReport,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ErrorData,
            ApiResponse<ErrorData>,
            ApiResponse<SaleReceipt>,
            ApiResponse<SalesReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Auth", description = "Credential issuing"),
        (name = "Accounts", description = "Staff and admin accounts"),
        (name = "Products", description = "Product catalog"),
        (name = "Customers", description = "Customer records"),
        (name = "Sales", description = "Checkout and sale lookup"),
        (name = "Reports", description = "Sales reporting"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
