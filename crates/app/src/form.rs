//! Turns `tally add` arguments into a [`TransactionRecord`].
//!
//! The rules follow the entry form: a title and a category are required, the
//! amount is entered as a positive number and the expense flag picks the sign,
//! dates are `YYYY-MM-DD` at local midnight.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use engine::{MoneyCents, TransactionRecord};

use crate::{
    cli::AddArgs,
    error::{AppError, Result},
};

pub fn build_record(args: &AddArgs, timezone: Tz, now: DateTime<Utc>) -> Result<TransactionRecord> {
    let title = required(&args.title, "title")?;
    let category = required(&args.category, "category")?;

    let amount: MoneyCents = args.amount.parse()?;
    if amount.cents() <= 0 {
        return Err(AppError::Input("amount must be greater than 0".to_string()));
    }
    let amount = if args.expense { -amount } else { amount };

    let date = match args.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => now.with_timezone(&timezone).date_naive(),
    };
    let date = engine::local_midnight(&timezone, date)?;

    let description = args
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    Ok(TransactionRecord::new(title, amount, date, category, description))
}

fn required(value: &str, label: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Input(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let invalid = || AppError::Input(format!("invalid date {raw:?}, expected YYYY-MM-DD"));
    let raw = raw.trim();
    let shape_ok = raw.len() == 10
        && raw
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !shape_ok {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}
