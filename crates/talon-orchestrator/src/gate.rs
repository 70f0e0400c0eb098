use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use talon_core::{Checkpoint, CheckpointStatus, Resolution, TalonError, TalonResult};
use tokio::sync::oneshot;
use tracing::{info, warn};
use uuid::Uuid;

/// Durable storage for checkpoints.
///
/// The gate writes a checkpoint before suspending on it and rewrites it with
/// its final status on resolution, so pending decisions survive inspection
/// (and a restart can at least enumerate what was left hanging).
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Inserts or replaces a checkpoint record.
    async fn put(&self, checkpoint: &Checkpoint) -> TalonResult<()>;
    /// Fetches a checkpoint by id.
    async fn get(&self, id: Uuid) -> TalonResult<Option<Checkpoint>>;
    /// All checkpoints still pending, in no particular order.
    async fn list_pending(&self) -> TalonResult<Vec<Checkpoint>>;
}

/// Checkpoint store keeping one JSON file per checkpoint in a directory.
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Creates the store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> TalonResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn put(&self, checkpoint: &Checkpoint) -> TalonResult<()> {
        let path = self.path_for(checkpoint.id);
        let json = serde_json::to_vec_pretty(checkpoint)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> TalonResult<Option<Checkpoint>> {
        let path = self.path_for(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_pending(&self) -> TalonResult<Vec<Checkpoint>> {
        let mut pending = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
            if checkpoint.status == CheckpointStatus::Pending {
                pending.push(checkpoint);
            }
        }
        Ok(pending)
    }
}

/// Checkpoint store backed by a map, for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    records: Mutex<HashMap<Uuid, Checkpoint>>,
}

impl InMemoryCheckpointStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn put(&self, checkpoint: &Checkpoint) -> TalonResult<()> {
        self.records.lock().insert(checkpoint.id, checkpoint.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> TalonResult<Option<Checkpoint>> {
        Ok(self.records.lock().get(&id).cloned())
    }

    async fn list_pending(&self) -> TalonResult<Vec<Checkpoint>> {
        Ok(self
            .records
            .lock()
            .values()
            .filter(|c| c.status == CheckpointStatus::Pending)
            .cloned()
            .collect())
    }
}

/// Parks mission drivers on pending human decisions.
///
/// `raise` suspends the calling driver on a oneshot until `resolve` hands
/// over a decision from the outside. Resolution is exactly-once: a second
/// attempt fails with [`TalonError::AlreadyResolved`] and leaves the stored
/// decision untouched.
pub struct CheckpointGate {
    store: Box<dyn CheckpointStore>,
    pending: Mutex<HashMap<Uuid, oneshot::Sender<Resolution>>>,
}

impl CheckpointGate {
    /// Creates a gate over the given store.
    pub fn new(store: Box<dyn CheckpointStore>) -> Self {
        Self {
            store,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Gate over an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryCheckpointStore::new()))
    }

    /// Raises a checkpoint and suspends until it is resolved.
    ///
    /// With a `timeout`, an undecided checkpoint resolves as
    /// [`Resolution::Rejected`] when the deadline passes.
    pub async fn raise(
        &self,
        checkpoint: Checkpoint,
        timeout: Option<Duration>,
    ) -> TalonResult<Resolution> {
        let id = checkpoint.id;
        let mission_id = checkpoint.mission_id;
        self.store.put(&checkpoint).await?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        info!(checkpoint_id = %id, mission_id = %mission_id, reason = %checkpoint.reason,
            "checkpoint raised, mission suspended");

        let resolution = match timeout {
            Some(deadline) => match tokio::time::timeout(deadline, rx).await {
                Ok(Ok(resolution)) => resolution,
                Ok(Err(_)) => {
                    return Err(TalonError::Mission(format!(
                        "checkpoint {id} resolver vanished"
                    )))
                }
                Err(_) => {
                    warn!(checkpoint_id = %id, "checkpoint decision deadline elapsed, rejecting");
                    self.pending.lock().remove(&id);
                    let mut record = checkpoint;
                    record.status = CheckpointStatus::Rejected;
                    self.store.put(&record).await?;
                    return Ok(Resolution::Rejected);
                }
            },
            None => rx.await.map_err(|_| {
                TalonError::Mission(format!("checkpoint {id} resolver vanished"))
            })?,
        };
        Ok(resolution)
    }

    /// Hands a decision to a suspended mission.
    ///
    /// Fails with [`TalonError::AlreadyResolved`] when the checkpoint was
    /// already decided, and [`TalonError::Mission`] when it never existed.
    pub async fn resolve(&self, id: Uuid, resolution: Resolution) -> TalonResult<()> {
        let sender = self.pending.lock().remove(&id);
        match sender {
            Some(tx) => {
                // Persist the decision before waking the driver, so a racing
                // second resolve finds a decided record rather than a pending
                // one with no waiter.
                if let Some(mut record) = self.store.get(id).await? {
                    record.status = CheckpointStatus::from(&resolution);
                    self.store.put(&record).await?;
                }
                info!(checkpoint_id = %id, "checkpoint resolved");
                tx.send(resolution)
                    .map_err(|_| TalonError::Mission(format!("checkpoint {id} waiter gone")))
            }
            None => match self.store.get(id).await? {
                Some(record) if record.status != CheckpointStatus::Pending => {
                    Err(TalonError::AlreadyResolved(id))
                }
                Some(_) => Err(TalonError::Mission(format!(
                    "checkpoint {id} has no active waiter"
                ))),
                None => Err(TalonError::Mission(format!("unknown checkpoint {id}"))),
            },
        }
    }

    /// Pending checkpoints, for operator listings.
    pub async fn pending(&self) -> TalonResult<Vec<Checkpoint>> {
        self.store.list_pending().await
    }

    /// Fetches a checkpoint record.
    pub async fn get(&self, id: Uuid) -> TalonResult<Option<Checkpoint>> {
        self.store.get(id).await
    }
}
