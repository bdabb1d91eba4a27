//! Local personal-finance engine.
//!
//! Transaction records are persisted as a single document in a
//! [`KeyValueStore`] and read back through a [`RecordStore`], which funnels all
//! writes through one writer task. A [`MonthCursor`] picks a calendar month and
//! [`aggregate`] turns the stored records into that month's [`MonthSummary`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use engine::{MemoryStore, MoneyCents, MonthCursor, RecordStore, TransactionRecord, aggregate};
//!
//! # async fn demo() -> Result<(), engine::EngineError> {
//! let store = RecordStore::new(Arc::new(MemoryStore::new()));
//! store
//!     .create(TransactionRecord::new("Salary", MoneyCents::new(250_000), Utc::now(), "Other", None))
//!     .await?;
//!
//! let interval = MonthCursor::new(Utc::now(), chrono_tz::UTC).interval()?;
//! let summary = aggregate(&store.list_all().await?, &interval);
//! assert_eq!(summary.income, MoneyCents::new(250_000));
//! # Ok(())
//! # }
//! ```

pub use auth::{Auth, CredentialStore, Session};
pub use error::EngineError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use money::{MAX_ABS_CENTS, MoneyCents};
pub use month::{MonthCursor, MonthInterval, local_midnight};
pub use records::TransactionRecord;
pub use store::RecordStore;
pub use summary::{CategoryTotal, MonthSummary, aggregate};

mod auth;
mod error;
pub mod kv;
mod money;
mod month;
pub mod records;
mod store;
mod summary;

pub type ResultEngine<T> = Result<T, EngineError>;
