//! Aggregation engine: derived tabular views over materialized
//! transactions.
//!
//! Every function here is pure; the persistence layer's
//! `get_transactions` is the single materialize primitive they share.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::transaction::{Transaction, TransactionType};

/// A named, already-computed tabular report, ready for console printing
/// or export.
#[derive(Debug)]
pub struct Report {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MonthlySummaryRow {
    /// Calendar year-month, rendered `YYYY-MM`.
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
    pub net_savings: Decimal,
}

/// Groups by (year-month, type), pivots the types into columns, and
/// computes `net_savings = income - expense` per month. A month with no
/// income or no expense treats the missing side as zero; investments do
/// not enter the net. Output ascends by month.
pub fn monthly_summary(transactions: &[Transaction]) -> Vec<MonthlySummaryRow> {
    let mut months: BTreeMap<String, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for transaction in transactions {
        let key = transaction.date.format("%Y-%m").to_string();
        let totals = months.entry(key).or_default();
        match transaction.txn_type {
            TransactionType::Income => totals.0 += transaction.amount,
            TransactionType::Expense => totals.1 += transaction.amount,
            TransactionType::Investment => totals.2 += transaction.amount,
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense, investment))| MonthlySummaryRow {
            month,
            income,
            expense,
            investment,
            net_savings: income - expense,
        })
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
pub struct CategorySpendingRow {
    /// Display name; `None` when the category id no longer resolves.
    pub category: Option<String>,
    pub total: Decimal,
}

/// Total expense per category name, descending by total. Transactions
/// whose category id does not resolve land under a `None` name.
pub fn category_spending(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategorySpendingRow> {
    let names: HashMap<i64, &str> = categories
        .iter()
        .map(|c| (c.category_id, c.name.as_str()))
        .collect();

    let mut totals: HashMap<Option<String>, Decimal> = HashMap::new();
    for transaction in transactions {
        if transaction.txn_type != TransactionType::Expense {
            continue;
        }
        let name = transaction
            .category_id
            .and_then(|id| names.get(&id))
            .map(|name| name.to_string());
        *totals.entry(name).or_default() += transaction.amount;
    }

    let mut rows: Vec<CategorySpendingRow> = totals
        .into_iter()
        .map(|(category, total)| CategorySpendingRow { category, total })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

#[derive(Debug, PartialEq, Eq)]
pub struct BudgetComplianceRow {
    /// Display name; `None` when the budget's category no longer
    /// resolves.
    pub category: Option<String>,
    pub budget_amount: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
}

/// One row per budget: expenses in the budget's category whose date
/// falls inside [start_date, end_date] inclusive, against the allotted
/// amount.
pub fn budget_compliance(
    budgets: &[Budget],
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<BudgetComplianceRow> {
    let names: HashMap<i64, &str> = categories
        .iter()
        .map(|c| (c.category_id, c.name.as_str()))
        .collect();

    budgets
        .iter()
        .map(|budget| {
            let total_spent = transactions
                .iter()
                .filter(|t| {
                    t.txn_type == TransactionType::Expense
                        && t.category_id == Some(budget.category_id)
                        && t.date >= budget.start_date
                        && t.date <= budget.end_date
                })
                .fold(Decimal::ZERO, |acc, t| acc + t.amount);

            BudgetComplianceRow {
                category: names.get(&budget.category_id).map(|name| name.to_string()),
                budget_amount: budget.amount,
                total_spent,
                remaining: budget.amount - total_spent,
            }
        })
        .collect()
}

pub fn monthly_summary_report(rows: &[MonthlySummaryRow]) -> Report {
    Report {
        name: "monthly_summary".to_string(),
        columns: ["month", "income", "expense", "investment", "net_savings"]
            .map(String::from)
            .to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.month.clone(),
                    r.income.to_string(),
                    r.expense.to_string(),
                    r.investment.to_string(),
                    r.net_savings.to_string(),
                ]
            })
            .collect(),
    }
}

pub fn category_spending_report(rows: &[CategorySpendingRow]) -> Report {
    Report {
        name: "category_spending".to_string(),
        columns: ["category_name", "total_spent"].map(String::from).to_vec(),
        rows: rows
            .iter()
            .map(|r| vec![r.category.clone().unwrap_or_default(), r.total.to_string()])
            .collect(),
    }
}

pub fn budget_compliance_report(rows: &[BudgetComplianceRow]) -> Report {
    Report {
        name: "budget_compliance".to_string(),
        columns: ["category_name", "budget_amount", "total_spent", "remaining"]
            .map(String::from)
            .to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.category.clone().unwrap_or_default(),
                    r.budget_amount.to_string(),
                    r.total_spent.to_string(),
                    r.remaining.to_string(),
                ]
            })
            .collect(),
    }
}

/// Renders a report as a fixed-width console table.
pub fn print_report(report: &Report) {
    if report.is_empty() {
        println!("{}: (no rows)", report.name);
        return;
    }

    let mut widths: Vec<usize> = report.columns.iter().map(|c| c.len()).collect();
    for row in &report.rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() {
                widths[idx] = widths[idx].max(cell.len());
            }
        }
    }

    let header: Vec<String> = report
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:>width$}", c, width = *w))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(header.join("  ").len()));
    for row in &report.rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:>width$}", cell, width = *w))
            .collect();
        println!("{}", line.join("  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn(date: &str, amount: &str, txn_type: TransactionType, category_id: Option<i64>) -> Transaction {
        Transaction {
            txn_id: 0,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            txn_type,
            category_id,
            description: None,
            tags: None,
            user_id: None,
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            category_id: id,
            name: name.to_string(),
        }
    }

    fn budget(category_id: i64, amount: &str, start: &str, end: &str) -> Budget {
        Budget {
            category_id,
            amount: Decimal::from_str(amount).unwrap(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            user_id: None,
        }
    }

    #[test]
    fn test_monthly_summary_pivots_and_orders() {
        let transactions = vec![
            txn("2025-02-10", "200", TransactionType::Income, None),
            txn("2025-01-05", "1000", TransactionType::Income, None),
            txn("2025-01-20", "400", TransactionType::Expense, None),
            txn("2025-01-25", "100", TransactionType::Investment, None),
        ];

        let summary = monthly_summary(&transactions);
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].month, "2025-01");
        assert_eq!(summary[0].income, Decimal::from(1000));
        assert_eq!(summary[0].expense, Decimal::from(400));
        assert_eq!(summary[0].investment, Decimal::from(100));
        // investments stay out of the net
        assert_eq!(summary[0].net_savings, Decimal::from(600));

        assert_eq!(summary[1].month, "2025-02");
        assert_eq!(summary[1].expense, Decimal::ZERO);
        assert_eq!(summary[1].net_savings, Decimal::from(200));
    }

    #[test]
    fn test_monthly_summary_empty() {
        assert!(monthly_summary(&[]).is_empty());
    }

    #[test]
    fn test_category_spending_sorted_descending() {
        let categories = vec![category(1, "Food"), category(2, "Travel")];
        let transactions = vec![
            txn("2025-01-05", "30", TransactionType::Expense, Some(1)),
            txn("2025-01-06", "120", TransactionType::Expense, Some(2)),
            txn("2025-01-07", "20", TransactionType::Expense, Some(1)),
            txn("2025-01-08", "500", TransactionType::Income, Some(1)),
        ];

        let rows = category_spending(&transactions, &categories);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.as_deref(), Some("Travel"));
        assert_eq!(rows[0].total, Decimal::from(120));
        assert_eq!(rows[1].category.as_deref(), Some("Food"));
        assert_eq!(rows[1].total, Decimal::from(50));
    }

    #[test]
    fn test_category_spending_unresolved_id_is_null_name() {
        let transactions = vec![
            txn("2025-01-05", "10", TransactionType::Expense, Some(99)),
            txn("2025-01-06", "5", TransactionType::Expense, None),
        ];

        let rows = category_spending(&transactions, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, None);
        assert_eq!(rows[0].total, Decimal::from(15));
    }

    #[test]
    fn test_budget_compliance_no_matching_transactions() {
        let categories = vec![category(1, "Food")];
        let budgets = vec![budget(1, "200", "2025-01-01", "2025-01-31")];

        let rows = budget_compliance(&budgets, &[], &categories);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category.as_deref(), Some("Food"));
        assert_eq!(rows[0].total_spent, Decimal::ZERO);
        assert_eq!(rows[0].remaining, Decimal::from(200));
    }

    #[test]
    fn test_budget_compliance_window_is_inclusive() {
        let categories = vec![category(1, "Food")];
        let budgets = vec![budget(1, "100", "2025-01-10", "2025-01-20")];
        let transactions = vec![
            txn("2025-01-09", "1", TransactionType::Expense, Some(1)),
            txn("2025-01-10", "10", TransactionType::Expense, Some(1)),
            txn("2025-01-20", "20", TransactionType::Expense, Some(1)),
            txn("2025-01-21", "2", TransactionType::Expense, Some(1)),
            txn("2025-01-15", "500", TransactionType::Income, Some(1)),
        ];

        let rows = budget_compliance(&budgets, &transactions, &categories);
        assert_eq!(rows[0].total_spent, Decimal::from(30));
        assert_eq!(rows[0].remaining, Decimal::from(70));
    }

    #[test]
    fn test_budget_compliance_unresolved_category() {
        let budgets = vec![budget(7, "50", "2025-01-01", "2025-12-31")];

        let rows = budget_compliance(&budgets, &[], &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, None);
        assert_eq!(rows[0].remaining, Decimal::from(50));
    }

    #[test]
    fn test_report_conversion() {
        let summary = vec![MonthlySummaryRow {
            month: "2025-01".to_string(),
            income: Decimal::from(1000),
            expense: Decimal::from(400),
            investment: Decimal::ZERO,
            net_savings: Decimal::from(600),
        }];

        let report = monthly_summary_report(&summary);
        assert_eq!(report.name, "monthly_summary");
        assert_eq!(report.columns.len(), 5);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][0], "2025-01");
        assert_eq!(report.rows[0][4], "600");

        assert!(monthly_summary_report(&[]).is_empty());
    }
}
