use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(about = "Track income and expenses on this device")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account on this device and sign in (password read from stdin).
    Register(EmailArgs),
    /// Sign in (password read from stdin).
    Login(EmailArgs),
    /// Sign out.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Record a transaction.
    Add(AddArgs),
    /// List a month's transactions, newest first.
    List(MonthArgs),
    /// Show a month's income, expense and remaining budget.
    Summary(MonthArgs),
    /// Show a month's expenses per category.
    Breakdown(MonthArgs),
    /// Delete a transaction by id.
    Delete(DeleteArgs),
    /// Delete every transaction.
    Clear(ClearArgs),
}

#[derive(Debug, Args)]
pub struct EmailArgs {
    #[arg(long)]
    pub email: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    /// Positive amount, e.g. 12.50 (use --expense for money going out).
    #[arg(long, allow_hyphen_values = true)]
    pub amount: String,
    /// Record the amount as an expense instead of income.
    #[arg(long)]
    pub expense: bool,
    /// Date as YYYY-MM-DD; defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    /// e.g. Groceries, Transport, Rent, Dining, Shopping, Bills, Entertainment, Health, Other.
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
pub struct MonthArgs {
    /// Months relative to the current one (-1 = previous month).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset: i64,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deleting every stored transaction.
    #[arg(long)]
    pub yes: bool,
}
