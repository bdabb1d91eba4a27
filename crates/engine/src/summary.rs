//! Monthly aggregation of transaction records.
//!
//! [`aggregate`] is pure: it takes the full collection as read from the store
//! plus a [`MonthInterval`] and returns everything the month view shows.

use std::collections::HashMap;

use crate::{MoneyCents, MonthInterval, TransactionRecord};

/// The month view: records newest first plus the derived totals.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthSummary {
    pub records: Vec<TransactionRecord>,
    pub income: MoneyCents,
    /// Sum of expense magnitudes, never negative.
    pub expense: MoneyCents,
    pub net: MoneyCents,
    /// Share of income already spent, in percent, capped at 100.
    pub progress_used: f64,
}

/// Total expense for one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: MoneyCents,
}

impl MonthSummary {
    /// What is left of the month's income. Same value as `net`.
    pub fn remaining(&self) -> MoneyCents {
        self.net
    }

    /// Expense totals grouped by displayed category, largest first.
    ///
    /// Ties are ordered by category name.
    pub fn expenses_by_category(&self) -> Vec<CategoryTotal> {
        let mut totals: HashMap<&str, MoneyCents> = HashMap::new();
        for record in self.records.iter().filter(|r| r.amount.is_expense()) {
            let total = totals.entry(record.display_category()).or_default();
            *total = total.saturating_add(record.amount.abs());
        }

        let mut totals: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();
        totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        totals
    }
}

/// Filters `records` to `interval`, sorts them newest first and totals them.
///
/// Records with equal dates keep their relative input order. A zero amount
/// counts as income. Totals saturate rather than overflow, so `net` is always
/// `income - expense`.
pub fn aggregate(records: &[TransactionRecord], interval: &MonthInterval) -> MonthSummary {
    let mut in_month: Vec<TransactionRecord> = records
        .iter()
        .filter(|record| interval.contains(record.date))
        .cloned()
        .collect();
    // `sort_by` is stable.
    in_month.sort_by(|a, b| b.date.cmp(&a.date));

    let (income, expense) = in_month.iter().fold(
        (MoneyCents::ZERO, MoneyCents::ZERO),
        |(income, expense), record| {
            if record.amount.is_income() {
                (income.saturating_add(record.amount), expense)
            } else {
                (income, expense.saturating_add(record.amount.abs()))
            }
        },
    );

    MonthSummary {
        records: in_month,
        income,
        expense,
        net: income - expense,
        progress_used: progress_used(income, expense),
    }
}

fn progress_used(income: MoneyCents, expense: MoneyCents) -> f64 {
    if income.cents() <= 0 {
        return 0.0;
    }
    let ratio = expense.cents() as f64 / income.cents() as f64 * 100.0;
    ratio.min(100.0)
}
