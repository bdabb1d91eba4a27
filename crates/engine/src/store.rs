//! The transaction record store.
//!
//! The whole collection lives in one document under [`TRANSACTIONS_KEY`], so
//! every mutation is a read-modify-write of that document. Mutations are sent
//! to a single writer task over a FIFO channel and applied one at a time;
//! callers get the outcome back once the new document has been written. Two
//! concurrent `create` calls therefore both land, in the order they were
//! enqueued.
//!
//! Reads go straight to the adapter and see the latest committed document.
//! A missing or unreadable document reads as an empty collection. A document
//! written with a newer layout also lists as empty, but every mutation is
//! refused so that document is never overwritten.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::{
    EngineError, ResultEngine, TransactionRecord,
    kv::{KeyValueStore, TRANSACTIONS_KEY},
    records::{decode_document, encode_document},
};

/// Pending mutations the writer will buffer before `send` starts waiting.
const WRITE_QUEUE_DEPTH: usize = 64;

type Reply = oneshot::Sender<ResultEngine<()>>;

#[derive(Debug)]
enum WriteOp {
    Create {
        record: TransactionRecord,
        reply: Reply,
    },
    Delete {
        id: String,
        reply: Reply,
    },
    Clear {
        reply: Reply,
    },
}

/// Handle to the transaction collection.
///
/// Cheap to clone; all clones feed the same writer. The writer task exits once
/// the last handle is dropped and the queue is drained.
#[derive(Debug)]
pub struct RecordStore<S> {
    kv: Arc<S>,
    writer: mpsc::Sender<WriteOp>,
}

impl<S> Clone for RecordStore<S> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            writer: self.writer.clone(),
        }
    }
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Starts the writer task. Must be called from within a tokio runtime.
    pub fn new(kv: Arc<S>) -> Self {
        let (writer, queue) = mpsc::channel(WRITE_QUEUE_DEPTH);
        tokio::spawn(run_writer(Arc::clone(&kv), queue));
        Self { kv, writer }
    }

    /// Returns every stored record in stored order.
    ///
    /// The order is not meaningful; sort before displaying.
    pub async fn list_all(&self) -> ResultEngine<Vec<TransactionRecord>> {
        match load(self.kv.as_ref()).await {
            Err(EngineError::UnsupportedDocument(version)) => {
                tracing::warn!("transaction document version {version} is not supported");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Persists a new record at the front of the collection.
    ///
    /// Fails with [`EngineError::Validation`] for a blank id or an amount
    /// beyond [`MAX_ABS_CENTS`] and with [`EngineError::ExistingKey`] when the
    /// id is already stored. Nothing is written in either case.
    ///
    /// [`MAX_ABS_CENTS`]: crate::MAX_ABS_CENTS
    pub async fn create(&self, record: TransactionRecord) -> ResultEngine<()> {
        record.validate()?;
        self.submit(|reply| WriteOp::Create { record, reply }).await
    }

    /// Removes the record with `id`. Unknown ids are a no-op.
    pub async fn delete_by_id(&self, id: &str) -> ResultEngine<()> {
        let id = id.to_string();
        self.submit(|reply| WriteOp::Delete { id, reply }).await
    }

    /// Drops the whole persisted document.
    ///
    /// Like the other mutations it fails with
    /// [`EngineError::UnsupportedDocument`] on a newer document layout.
    pub async fn clear_all(&self) -> ResultEngine<()> {
        self.submit(|reply| WriteOp::Clear { reply }).await
    }

    async fn submit(&self, op: impl FnOnce(Reply) -> WriteOp) -> ResultEngine<()> {
        let (reply, outcome) = oneshot::channel();
        self.writer
            .send(op(reply))
            .await
            .map_err(|_| EngineError::StoreClosed)?;
        outcome.await.map_err(|_| EngineError::StoreClosed)?
    }
}

async fn load<S: KeyValueStore>(kv: &S) -> ResultEngine<Vec<TransactionRecord>> {
    let Some(raw) = kv.get(TRANSACTIONS_KEY).await? else {
        return Ok(Vec::new());
    };
    Ok(decode_document(&raw)?.unwrap_or_default())
}

async fn save<S: KeyValueStore>(kv: &S, records: &[TransactionRecord]) -> ResultEngine<()> {
    let payload = encode_document(records)?;
    kv.set(TRANSACTIONS_KEY, payload).await?;
    Ok(())
}

async fn run_writer<S: KeyValueStore>(kv: Arc<S>, mut queue: mpsc::Receiver<WriteOp>) {
    tracing::debug!("record store writer started");
    while let Some(op) = queue.recv().await {
        let (outcome, reply) = match op {
            WriteOp::Create { record, reply } => (apply_create(kv.as_ref(), record).await, reply),
            WriteOp::Delete { id, reply } => (apply_delete(kv.as_ref(), &id).await, reply),
            WriteOp::Clear { reply } => (apply_clear(kv.as_ref()).await, reply),
        };
        if let Err(err) = &outcome {
            tracing::warn!("record store write failed: {err}");
        }
        // The caller may have stopped waiting; the write is done either way.
        let _ = reply.send(outcome);
    }
    tracing::debug!("record store writer stopped");
}

async fn apply_create<S: KeyValueStore>(kv: &S, record: TransactionRecord) -> ResultEngine<()> {
    let mut records = load(kv).await?;
    if records.iter().any(|existing| existing.id == record.id) {
        return Err(EngineError::ExistingKey(record.id));
    }
    tracing::debug!("creating transaction {}", record.id);
    records.insert(0, record);
    save(kv, &records).await
}

async fn apply_delete<S: KeyValueStore>(kv: &S, id: &str) -> ResultEngine<()> {
    let mut records = load(kv).await?;
    let before = records.len();
    records.retain(|record| record.id != id);
    if records.len() == before {
        tracing::debug!("delete of unknown transaction {id} ignored");
        return Ok(());
    }
    tracing::debug!("deleting transaction {id}");
    save(kv, &records).await
}

async fn apply_clear<S: KeyValueStore>(kv: &S) -> ResultEngine<()> {
    // Refuses a document this build cannot read.
    load(kv).await?;
    tracing::debug!("clearing all transactions");
    kv.remove(TRANSACTIONS_KEY).await?;
    Ok(())
}
