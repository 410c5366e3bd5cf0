use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::reports::{ReportLine, ReportSale, SalesReport, SalesReportQuery, SalesSummary},
    entity::{
        accounts::{Column as AccountCol, Entity as Accounts},
        customers::{Column as CustomerCol, Entity as Customers, Model as CustomerModel},
        products::{Column as ProdCol, Entity as Products},
        sale_lines::{Column as LineCol, Entity as SaleLines, Model as LineModel},
        sales::{Column as SaleCol, Entity as Sales, Model as SaleModel},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Revenue and discount totals over the selected sales. Profit is not derivable: products carry no cost price.
pub fn summarize(sales: &[SaleModel]) -> SalesSummary {
    SalesSummary {
        total_sales_count: sales.len() as i64,
        total_revenue: sales.iter().map(|s| s.final_amount).sum(),
        total_discount_given: sales.iter().map(|s| s.discount_amount).sum(),
    }
}

pub async fn sales_report(
    state: &AppState,
    user: &AuthUser,
    query: SalesReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(user)?;
    let (from, until) = query.window()?;

    let mut condition = Condition::all();
    if let Some(from) = from {
        condition = condition.add(SaleCol::SoldAt.gte(from));
    }
    if let Some(until) = until {
        condition = condition.add(SaleCol::SoldAt.lt(until));
    }

    let sales = Sales::find()
        .filter(condition)
        .order_by_desc(SaleCol::SoldAt)
        .all(&state.orm)
        .await?;
    let summary = summarize(&sales);

    let sale_ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
    let mut lines_by_sale: HashMap<Uuid, Vec<LineModel>> = HashMap::new();
    if !sale_ids.is_empty() {
        let lines = SaleLines::find()
            .filter(LineCol::SaleId.is_in(sale_ids))
            .order_by_asc(LineCol::SaleId)
            .order_by_asc(LineCol::Position)
            .all(&state.orm)
            .await?;
        for line in lines {
            lines_by_sale.entry(line.sale_id).or_default().push(line);
        }
    }

    let account_ids: HashSet<Uuid> = sales.iter().map(|s| s.account_id).collect();
    let customer_ids: HashSet<Uuid> = sales.iter().filter_map(|s| s.customer_id).collect();
    let product_ids: HashSet<Uuid> = lines_by_sale
        .values()
        .flatten()
        .map(|l| l.product_id)
        .collect();

    let usernames: HashMap<Uuid, String> = Accounts::find()
        .filter(AccountCol::Id.is_in(account_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|a| (a.id, a.username))
        .collect();
    let customers: HashMap<Uuid, CustomerModel> = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let product_names: HashMap<Uuid, String> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let sales = sales
        .into_iter()
        .map(|sale| {
            let customer = sale.customer_id.and_then(|id| customers.get(&id));
            let lines = lines_by_sale
                .remove(&sale.id)
                .unwrap_or_default()
                .into_iter()
                .map(|line| ReportLine {
                    product_id: line.product_id,
                    product_name: product_names
                        .get(&line.product_id)
                        .cloned()
                        .unwrap_or_default(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.unit_price * i64::from(line.quantity),
                })
                .collect();
            ReportSale {
                id: sale.id,
                sold_at: sale.sold_at.with_timezone(&Utc),
                cashier_username: usernames.get(&sale.account_id).cloned().unwrap_or_default(),
                customer_name: customer.map(|c| c.name.clone()),
                customer_is_member: customer.map(|c| c.is_member),
                total_amount: sale.total_amount,
                discount_amount: sale.discount_amount,
                final_amount: sale.final_amount,
                lines,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Sales report",
        SalesReport { sales, summary },
        Some(Meta::empty()),
    ))
}
