//! Single-writer actor for SQLite.
//!
//! SQLite tolerates many readers but only one writer at a time. All mutating
//! repository operations are funneled through one background task owning a
//! dedicated connection; each job runs inside an immediate transaction, so a
//! batch upsert either lands fully or not at all.

use diesel::SqliteConnection;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};
use wonfx_core::errors::Result;

use super::DbPool;
use crate::errors::StorageError;

// A write job: a closure over the writer's connection. Return values are
// type-erased through `Box<dyn Any>` so one channel serves every job shape.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, Reply)>,
}

impl WriteHandle {
    /// Execute a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; its result is sent back
    /// over a oneshot channel.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("writer actor channel closed; the actor has stopped");

        ret_rx
            .await
            .expect("writer actor dropped the reply sender without responding")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("writer actor returned an unexpected type"))
            })
    }
}

/// Spawn the background task that owns the write connection.
///
/// The returned handle is cheap to clone; the actor terminates once every
/// handle is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, Reply)>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("failed to reserve a connection for the writer actor");

        while let Some((job, reply_tx)) = rx.recv().await {
            // Jobs return core errors; the transaction wrapper needs a type
            // with `From<diesel::result::Error>`, so errors round-trip
            // through StorageError.
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());

            // The receiver may have been dropped (request cancelled); that
            // is not the actor's problem.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
