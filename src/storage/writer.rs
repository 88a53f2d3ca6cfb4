//=========================================================================
// Write-Behind Worker
//=========================================================================
//
// Debounced persistence on a dedicated thread.
//
// Architecture:
//   DataManager ──WriteCommand──► crossbeam channel ──► worker thread
//                                                         │
//                      pending: HashMap<StorageKey, (record, deadline)>
//                                                         │
//                                  deadline passed ──► backend.put_many()
//
// A newer Save for the same key replaces the pending record and restarts
// its timer, so only the latest value in a burst is written. Immediate
// writes and deletes drop any pending write for their key first.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::backend::{StorageBackend, StorageError};
use super::key::{StorageKey, StoredRecord};

//=== DebounceProfile =====================================================

/// Write-behind delay preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebounceProfile {
    /// 300 ms.
    #[default]
    Desktop,
    /// 500 ms; slower storage and more aggressive app suspension.
    Mobile,
}

impl DebounceProfile {
    pub fn delay(self) -> Duration {
        match self {
            DebounceProfile::Desktop => Duration::from_millis(300),
            DebounceProfile::Mobile => Duration::from_millis(500),
        }
    }
}

//=== WriteCommand ========================================================

pub(crate) type Ack = Sender<Result<(), StorageError>>;

pub(crate) enum WriteCommand {
    /// Debounced write.
    Save(StorageKey, StoredRecord),

    /// Write now, superseding any pending write for the key.
    Immediate(StorageKey, StoredRecord, Ack),

    Delete(StorageKey, Sender<Result<bool, StorageError>>),

    /// Write everything pending, then acknowledge.
    Flush(Ack),

    Shutdown,
}

//=== WriteBehindWorker ===================================================

pub(crate) struct WriteBehindWorker {
    backend: Arc<dyn StorageBackend>,
    receiver: Receiver<WriteCommand>,
    delay: Duration,
    pending: HashMap<StorageKey, (StoredRecord, Instant)>,
}

impl WriteBehindWorker {
    pub(crate) fn spawn(
        backend: Arc<dyn StorageBackend>,
        receiver: Receiver<WriteCommand>,
        delay: Duration,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        let worker = Self {
            backend,
            receiver,
            delay,
            pending: HashMap::new(),
        };

        thread::Builder::new()
            .name("woodcat-storage".to_string())
            .spawn(move || worker.run())
    }

    fn run(mut self) {
        debug!(target: "storage", "Write-behind worker started (debounce {:?})", self.delay);

        loop {
            let command = match self.next_deadline() {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match self.receiver.recv_timeout(wait) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.receiver.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };

            if let Some(command) = command {
                if !self.handle(command) {
                    break;
                }
            }

            self.write_due(Instant::now());
        }

        if let Err(e) = self.write_all() {
            error!(target: "storage", "Final flush failed: {}", e);
        }
        debug!(target: "storage", "Write-behind worker stopped");
    }

    /// Returns `false` on shutdown.
    fn handle(&mut self, command: WriteCommand) -> bool {
        match command {
            WriteCommand::Save(key, record) => {
                trace!(target: "storage", "Debouncing write for {}", key);
                self.pending.insert(key, (record, Instant::now() + self.delay));
            }
            WriteCommand::Immediate(key, record, ack) => {
                self.pending.remove(&key);
                let _ = ack.send(self.backend.put(record));
            }
            WriteCommand::Delete(key, ack) => {
                self.pending.remove(&key);
                let _ = ack.send(self.backend.delete(&key));
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(self.write_all());
            }
            WriteCommand::Shutdown => return false,
        }
        true
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }

    fn write_due(&mut self, now: Instant) {
        let due: Vec<StorageKey> = self
            .pending
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(key, _)| *key)
            .collect();

        if due.is_empty() {
            return;
        }

        let records = due
            .iter()
            .filter_map(|key| self.pending.remove(key))
            .map(|(record, _)| record)
            .collect();

        if let Err(e) = self.backend.put_many(records) {
            error!(target: "storage", "Debounced write failed: {}", e);
        }
    }

    fn write_all(&mut self) -> Result<(), StorageError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let records: Vec<StoredRecord> = self.pending.drain().map(|(_, (record, _))| record).collect();
        debug!(target: "storage", "Flushing {} pending writes", records.len());
        self.backend.put_many(records)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
