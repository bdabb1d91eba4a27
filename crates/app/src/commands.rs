use std::io::{self, BufRead, IsTerminal};

use chrono::Utc;
use chrono_tz::Tz;
use engine::{
    Auth, FileStore, MonthCursor, MonthSummary, RecordStore, Session, TransactionRecord, aggregate,
};

use crate::{
    cli::{AddArgs, ClearArgs, Command, DeleteArgs, EmailArgs, MonthArgs},
    error::{AppError, Result},
    form,
};

pub struct Context {
    pub auth: Auth<FileStore>,
    pub records: RecordStore<FileStore>,
    pub timezone: Tz,
}

pub async fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Register(args) => register(ctx, args).await,
        Command::Login(args) => log_in(ctx, args).await,
        Command::Logout => log_out(ctx).await,
        Command::Whoami => {
            let session = require_session(ctx)?;
            println!("{}", session.email());
            Ok(())
        }
        Command::Add(args) => add(ctx, args).await,
        Command::List(args) => list(ctx, args).await,
        Command::Summary(args) => summary(ctx, args).await,
        Command::Breakdown(args) => breakdown(ctx, args).await,
        Command::Delete(args) => delete(ctx, args).await,
        Command::Clear(args) => clear(ctx, args).await,
    }
}

fn require_session(ctx: &Context) -> Result<Session> {
    ctx.auth.current().ok_or(AppError::NotSignedIn)
}

async fn register(ctx: &Context, args: EmailArgs) -> Result<()> {
    let password = read_password()?;
    let session = ctx.auth.register(&args.email, &password).await?;
    println!("Account created, signed in as {}", session.email());
    Ok(())
}

async fn log_in(ctx: &Context, args: EmailArgs) -> Result<()> {
    let password = read_password()?;
    let session = ctx.auth.log_in(&args.email, &password).await?;
    println!("Signed in as {}", session.email());
    Ok(())
}

async fn log_out(ctx: &Context) -> Result<()> {
    ctx.auth.log_out().await?;
    println!("Signed out");
    Ok(())
}

async fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    require_session(ctx)?;
    let record = form::build_record(&args, ctx.timezone, Utc::now())?;
    let id = record.id.clone();
    ctx.records.create(record).await?;
    println!("{id}");
    Ok(())
}

async fn month_summary(ctx: &Context, args: &MonthArgs) -> Result<(String, MonthSummary)> {
    let cursor = MonthCursor::new(Utc::now(), ctx.timezone).with_offset(args.offset);
    let interval = cursor.interval()?;
    let all = ctx.records.list_all().await?;
    Ok((cursor.label()?, aggregate(&all, &interval)))
}

async fn list(ctx: &Context, args: MonthArgs) -> Result<()> {
    require_session(ctx)?;
    let (label, summary) = month_summary(ctx, &args).await?;
    println!("{label}");
    if summary.records.is_empty() {
        println!("  No transactions this month.");
        return Ok(());
    }
    for record in &summary.records {
        println!("  {}", format_row(record, ctx.timezone));
    }
    Ok(())
}

async fn summary(ctx: &Context, args: MonthArgs) -> Result<()> {
    require_session(ctx)?;
    let (label, summary) = month_summary(ctx, &args).await?;
    println!("{label}");
    println!("  Income   {:>12}", summary.income);
    println!("  Expense  {:>12}", summary.expense);
    println!("  Net      {:>12}", summary.net);
    println!(
        "  Remaining: {} ({}% used)",
        summary.remaining(),
        summary.progress_used.round()
    );
    Ok(())
}

async fn breakdown(ctx: &Context, args: MonthArgs) -> Result<()> {
    require_session(ctx)?;
    let (label, summary) = month_summary(ctx, &args).await?;
    println!("{label}");
    let totals = summary.expenses_by_category();
    if totals.is_empty() {
        println!("  No expenses this month.");
        return Ok(());
    }
    let expense = summary.expense.as_major_f64();
    for total in totals {
        let share = total.total.as_major_f64() / expense * 100.0;
        println!("  {:<16} {:>12} {:>5.1}%", total.category, total.total, share);
    }
    Ok(())
}

async fn delete(ctx: &Context, args: DeleteArgs) -> Result<()> {
    require_session(ctx)?;
    ctx.records.delete_by_id(&args.id).await?;
    println!("Deleted {}", args.id);
    Ok(())
}

async fn clear(ctx: &Context, args: ClearArgs) -> Result<()> {
    require_session(ctx)?;
    if !args.yes {
        return Err(AppError::Input(
            "refusing to delete every transaction without --yes".to_string(),
        ));
    }
    ctx.records.clear_all().await?;
    println!("All transactions deleted");
    Ok(())
}

fn format_row(record: &TransactionRecord, timezone: Tz) -> String {
    let day = record.date.with_timezone(&timezone).format("%b %d");
    let sign = if record.is_income() { "+" } else { "-" };
    let mut row = format!(
        "{day}  {:<24} {:<14} {sign}{:>11}  {}",
        record.display_title(),
        record.display_category(),
        record.amount.abs(),
        record.id
    );
    if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
        row.push_str(&format!("\n          {description}"));
    }
    row
}

/// Prompts on a terminal, otherwise takes the first line of stdin.
fn read_password() -> Result<String> {
    if io::stdin().is_terminal() {
        return Ok(rpassword::prompt_password("Password: ")?);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::MoneyCents;

    use super::*;

    #[test]
    fn rows_show_placeholders_and_magnitude() {
        let record = TransactionRecord {
            id: "abc".to_string(),
            title: String::new(),
            amount: MoneyCents::new(-12_50),
            date: Utc.with_ymd_and_hms(2025, 3, 10, 4, 0, 0).unwrap(),
            category: String::new(),
            description: Some("bus pass".to_string()),
        };
        let row = format_row(&record, chrono_tz::America::Toronto);
        assert!(row.starts_with("Mar 10  (No title)"));
        assert!(row.contains("Uncategorized"));
        assert!(row.contains("-      12.50"));
        assert!(row.ends_with("bus pass"));
    }
}
