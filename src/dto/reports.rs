use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SalesReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SalesReportQuery {
    /// Inclusive whole UTC days, returned as `[from, until)`.
    pub fn window(&self) -> AppResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let from = self
            .start_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc());
        let until = match self.end_date {
            Some(d) => Some(
                d.succ_opt()
                    .ok_or_else(|| AppError::invalid("end_date", "end_date is out of range"))?
                    .and_time(NaiveTime::MIN)
                    .and_utc(),
            ),
            None => None,
        };
        if let (Some(from), Some(until)) = (from, until) {
            if from >= until {
                return Err(AppError::invalid(
                    "end_date",
                    "end_date must not be before start_date",
                ));
            }
        }
        Ok((from, until))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportSale {
    pub id: Uuid,
    pub sold_at: DateTime<Utc>,
    pub cashier_username: String,
    pub customer_name: Option<String>,
    pub customer_is_member: Option<bool>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub lines: Vec<ReportLine>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SalesSummary {
    pub total_sales_count: i64,
    pub total_revenue: i64,
    pub total_discount_given: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub sales: Vec<ReportSale>,
    pub summary: SalesSummary,
}
