use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use talon_core::{TalonError, TalonResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::error;
use uuid::Uuid;

/// What a mission log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A mission was accepted.
    MissionSubmitted,
    /// The mission's status changed.
    MissionStatus,
    /// A task's phase changed.
    TaskPhase,
    /// The flying vehicle changed phase.
    VehicleTransition,
    /// A sensor product arrived.
    ProductCollected,
    /// The mission suspended on a checkpoint.
    CheckpointRaised,
    /// A checkpoint was resolved.
    CheckpointResolved,
    /// Processing changed the target list.
    TargetUpdate,
}

/// One append-only mission log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionEvent {
    /// UTC timestamp of the append.
    pub timestamp: DateTime<Utc>,
    /// The mission the entry belongs to.
    pub mission_id: Uuid,
    /// Entry category.
    pub kind: EventKind,
    /// Category-specific detail.
    pub payload: serde_json::Value,
}

impl MissionEvent {
    /// Creates an entry timestamped now.
    pub fn new(mission_id: Uuid, kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            mission_id,
            kind,
            payload,
        }
    }
}

enum LogMsg {
    Event(MissionEvent),
    Flush(oneshot::Sender<()>),
}

/// Append-only JSONL mission log.
///
/// Appends go through an unbounded channel to a background writer task, so
/// the mission driver never blocks on disk. Entries are never mutated or
/// removed; replaying the file reconstructs mission history.
pub struct MissionLog {
    tx: mpsc::UnboundedSender<LogMsg>,
    path: PathBuf,
}

impl MissionLog {
    /// Opens (or creates) the log file and starts the writer task.
    pub fn open(path: impl Into<PathBuf>) -> TalonResult<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_loop(tokio::fs::File::from_std(file), rx));
        Ok(Self { tx, path })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an entry. Best-effort: a closed writer is logged, not raised,
    /// so a dying log never takes the mission down with it.
    pub fn append(&self, event: MissionEvent) {
        if self.tx.send(LogMsg::Event(event)).is_err() {
            error!(path = %self.path.display(), "mission log writer is gone, entry dropped");
        }
    }

    /// Convenience append.
    pub fn record(&self, mission_id: Uuid, kind: EventKind, payload: serde_json::Value) {
        self.append(MissionEvent::new(mission_id, kind, payload));
    }

    /// Waits until every entry appended so far is on disk.
    pub async fn sync(&self) -> TalonResult<()> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(LogMsg::Flush(tx))
            .map_err(|_| TalonError::Mission("mission log writer is gone".into()))?;
        rx.await
            .map_err(|_| TalonError::Mission("mission log writer is gone".into()))
    }

    /// Reads the whole log back, in append order.
    pub fn read_all(&self) -> TalonResult<Vec<MissionEvent>> {
        read_log(&self.path)
    }
}

/// Parses a JSONL mission log file.
pub fn read_log(path: &Path) -> TalonResult<Vec<MissionEvent>> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line)?);
    }
    Ok(events)
}

async fn writer_loop(mut file: tokio::fs::File, mut rx: mpsc::UnboundedReceiver<LogMsg>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            LogMsg::Event(event) => match serde_json::to_string(&event) {
                Ok(mut line) => {
                    line.push('\n');
                    if let Err(e) = file.write_all(line.as_bytes()).await {
                        error!(error = %e, "mission log write failed");
                    }
                }
                Err(e) => error!(error = %e, "mission log entry serialization failed"),
            },
            LogMsg::Flush(ack) => {
                if let Err(e) = file.flush().await {
                    error!(error = %e, "mission log flush failed");
                }
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mission.jsonl");
        let log = MissionLog::open(&path).unwrap();
        let mission_id = Uuid::new_v4();

        log.record(
            mission_id,
            EventKind::MissionSubmitted,
            serde_json::json!({ "tasks": 2 }),
        );
        log.record(
            mission_id,
            EventKind::TaskPhase,
            serde_json::json!({ "phase": "planned" }),
        );
        log.sync().await.unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::MissionSubmitted);
        assert_eq!(events[1].kind, EventKind::TaskPhase);
        assert!(events.iter().all(|e| e.mission_id == mission_id));
    }

    #[tokio::test]
    async fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mission.jsonl");
        let mission_id = Uuid::new_v4();

        {
            let log = MissionLog::open(&path).unwrap();
            log.record(mission_id, EventKind::MissionSubmitted, serde_json::json!({}));
            log.sync().await.unwrap();
        }
        {
            let log = MissionLog::open(&path).unwrap();
            log.record(mission_id, EventKind::MissionStatus, serde_json::json!({}));
            log.sync().await.unwrap();
            assert_eq!(log.read_all().unwrap().len(), 2);
        }
    }
}
