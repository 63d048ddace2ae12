use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A spending cap for a category over an inclusive date range.
#[derive(Debug, Clone)]
pub struct Budget {
    pub category_id: i64,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: i64,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: Option<String>,
}
