//! Transaction records and the document they are persisted in.
//!
//! A [`TransactionRecord`] is immutable once created: the only way to change
//! one is to delete it and create another.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

pub const NO_TITLE_LABEL: &str = "(No title)";
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Current layout version of the stored transaction document.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Signed: `>= 0` is income, `< 0` is expense.
    pub amount: MoneyCents,
    /// Economic date of the transaction.
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionRecord {
    /// Builds a record with a fresh UUID v4 id.
    pub fn new(
        title: impl Into<String>,
        amount: MoneyCents,
        date: DateTime<Utc>,
        category: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            amount,
            date,
            category: category.into(),
            description,
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_income()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            NO_TITLE_LABEL
        } else {
            &self.title
        }
    }

    pub fn display_category(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED_LABEL
        } else {
            &self.category
        }
    }

    /// Boundary check run by the store before a record is enqueued.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::Validation(
                "transaction id must not be empty".to_string(),
            ));
        }
        if !self.amount.is_storable() {
            return Err(EngineError::Validation(format!(
                "transaction amount {} is out of range",
                self.amount
            )));
        }
        Ok(())
    }
}

/// On-disk shapes of the transaction document.
///
/// Older clients wrote a bare array; everything written now carries a version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Versioned {
        version: u32,
        records: Vec<TransactionRecord>,
    },
    Legacy(Vec<TransactionRecord>),
}

/// Just the version field, read before the records so a newer layout is
/// recognised even when its records no longer parse.
#[derive(Deserialize)]
struct DocumentHeader {
    version: u32,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    records: &'a [TransactionRecord],
}

pub(crate) fn encode_document(records: &[TransactionRecord]) -> ResultEngine<String> {
    let document = DocumentRef {
        version: DOCUMENT_VERSION,
        records,
    };
    serde_json::to_string(&document)
        .map_err(|err| EngineError::Persistence(std::io::Error::other(err)))
}

/// Parses a stored document, returning `None` when it is unreadable.
///
/// A document written with a newer layout is an
/// [`EngineError::UnsupportedDocument`]: its data is intact, it just cannot be
/// read here, so it must never be replaced.
pub(crate) fn decode_document(raw: &str) -> ResultEngine<Option<Vec<TransactionRecord>>> {
    if let Ok(DocumentHeader { version }) = serde_json::from_str::<DocumentHeader>(raw)
        && version > DOCUMENT_VERSION
    {
        return Err(EngineError::UnsupportedDocument(version));
    }
    match serde_json::from_str::<StoredDocument>(raw) {
        Ok(StoredDocument::Legacy(records)) => Ok(Some(records)),
        Ok(StoredDocument::Versioned { version, records }) => {
            tracing::trace!("read transaction document version {version}");
            Ok(Some(records))
        }
        Err(err) => {
            tracing::warn!("transaction document is unreadable: {err}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> TransactionRecord {
        TransactionRecord {
            id: "a1".to_string(),
            title: "Salary".to_string(),
            amount: MoneyCents::new(250_000),
            date: Utc.with_ymd_and_hms(2025, 3, 5, 5, 0, 0).unwrap(),
            category: "Other".to_string(),
            description: None,
        }
    }

    #[test]
    fn reads_legacy_array_written_by_older_clients() {
        let raw = r#"[{"id":"x","title":"","amount":-12.5,"date":"2025-03-10T04:00:00.000Z","category":"","description":""}]"#;
        let records = decode_document(raw).unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, MoneyCents::new(-1250));
        assert_eq!(records[0].display_title(), NO_TITLE_LABEL);
        assert_eq!(records[0].display_category(), UNCATEGORIZED_LABEL);
        assert_eq!(records[0].description.as_deref(), Some(""));
        assert_eq!(
            records[0].date,
            Utc.with_ymd_and_hms(2025, 3, 10, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn written_document_is_versioned_and_readable() {
        let encoded = encode_document(&[sample()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["records"][0]["amount"], 2500);
        assert_eq!(value["records"][0]["date"], "2025-03-05T05:00:00Z");
        assert!(value["records"][0].get("description").is_none());

        assert_eq!(decode_document(&encoded).unwrap(), Some(vec![sample()]));
    }

    #[test]
    fn garbage_is_unreadable() {
        assert_eq!(decode_document("{not json").unwrap(), None);
        assert_eq!(decode_document(r#"[{"id":"x"}]"#).unwrap(), None);
        assert_eq!(decode_document(r#"{"version":1,"records":7}"#).unwrap(), None);
    }

    #[test]
    fn newer_versions_are_reported_not_dropped() {
        assert_eq!(
            decode_document(r#"{"version":2,"records":[]}"#),
            Err(EngineError::UnsupportedDocument(2))
        );
        // Records in a layout this build does not know.
        assert_eq!(
            decode_document(r#"{"version":3,"entries":{"a":{"cents":5}}}"#),
            Err(EngineError::UnsupportedDocument(3))
        );
    }

    #[test]
    fn blank_id_fails_validation() {
        let mut record = sample();
        record.id = "  ".to_string();
        assert!(matches!(record.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn oversized_amount_fails_validation() {
        let mut record = sample();
        record.amount = MoneyCents::new(crate::money::MAX_ABS_CENTS);
        assert!(record.validate().is_ok());

        record.amount = MoneyCents::new(9_000_000_000_000_000_000);
        assert!(matches!(record.validate(), Err(EngineError::Validation(_))));
        record.amount = MoneyCents::new(-crate::money::MAX_ABS_CENTS - 1);
        assert!(matches!(record.validate(), Err(EngineError::Validation(_))));
    }
}
