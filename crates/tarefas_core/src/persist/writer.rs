//! Persistence writer: executes save/clear jobs under a scheduling policy.
//!
//! # Responsibility
//! - Take ownership of the gateway once startup load is done.
//! - Run persistence jobs inline or on one dedicated writer thread.
//! - Hand every submission back to the caller as a `SaveTicket`.
//!
//! # Invariants
//! - Jobs execute in submission order; there is exactly one writer.
//! - Within a drained batch, a save directly followed by another save is
//!   skipped and resolves as `Superseded`; the newest snapshot is written.
//! - Clear and flush are never skipped and act as ordering barriers.
//! - Dropping the writer drains queued jobs before the thread exits.

use crate::model::task::TaskList;
use crate::persist::gateway::{PersistError, PersistResult, PersistenceGateway};
use crate::persist::kv::KeyValueStore;
use crate::store::task_store::PersistIntent;
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

const WRITER_THREAD_NAME: &str = "tarefas-persist";

/// Where persistence jobs run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistPolicy {
    /// On the caller thread, before `submit` returns.
    Inline,
    /// On a single background writer thread.
    #[default]
    Background,
}

/// How a completed job affected the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// A newer snapshot replaced this one before it was written.
    Superseded,
}

pub type WriteOutcome = PersistResult<WriteStatus>;

/// Handle to the outcome of one submitted job.
///
/// Dropping the ticket does not cancel the job.
#[derive(Debug)]
pub struct SaveTicket {
    outcome: Receiver<WriteOutcome>,
    taken: bool,
}

impl SaveTicket {
    fn new(outcome: Receiver<WriteOutcome>) -> Self {
        Self {
            outcome,
            taken: false,
        }
    }

    /// Blocks until the job has run.
    pub fn wait(self) -> WriteOutcome {
        self.outcome
            .recv()
            .unwrap_or_else(|_| Err(PersistError::WriterStopped))
    }

    /// Returns the outcome if the job has run; yields it at most once.
    pub fn try_outcome(&mut self) -> Option<WriteOutcome> {
        if self.taken {
            return None;
        }
        let outcome = match self.outcome.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(PersistError::WriterStopped),
        };
        self.taken = true;
        Some(outcome)
    }
}

enum Job {
    Save(TaskList, Sender<WriteOutcome>),
    Clear(Sender<WriteOutcome>),
    Flush(Sender<WriteOutcome>),
}

enum WriterMode<S: KeyValueStore + Send + 'static> {
    Inline(PersistenceGateway<S>),
    Background {
        jobs: Option<Sender<Job>>,
        handle: Option<JoinHandle<()>>,
    },
}

/// Single-writer executor for persistence jobs.
pub struct PersistWriter<S: KeyValueStore + Send + 'static> {
    mode: WriterMode<S>,
}

impl<S: KeyValueStore + Send + 'static> PersistWriter<S> {
    /// Starts a writer owning `gateway`.
    ///
    /// # Errors
    /// - `WriterSpawn` when the background thread cannot be created.
    pub fn start(gateway: PersistenceGateway<S>, policy: PersistPolicy) -> PersistResult<Self> {
        let mode = match policy {
            PersistPolicy::Inline => WriterMode::Inline(gateway),
            PersistPolicy::Background => {
                let (sender, receiver) = mpsc::channel();
                let handle = std::thread::Builder::new()
                    .name(WRITER_THREAD_NAME.to_string())
                    .spawn(move || run_writer(gateway, receiver))
                    .map_err(PersistError::WriterSpawn)?;
                WriterMode::Background {
                    jobs: Some(sender),
                    handle: Some(handle),
                }
            }
        };
        Ok(Self { mode })
    }

    pub fn policy(&self) -> PersistPolicy {
        match self.mode {
            WriterMode::Inline(_) => PersistPolicy::Inline,
            WriterMode::Background { .. } => PersistPolicy::Background,
        }
    }

    /// Schedules the persistence work described by `intent`.
    pub fn submit(&self, intent: PersistIntent) -> SaveTicket {
        let (reply, outcome) = mpsc::channel();
        let job = match intent {
            PersistIntent::Save(tasks) => Job::Save(tasks, reply),
            PersistIntent::RemoveSlot => Job::Clear(reply),
        };
        self.enqueue(job);
        SaveTicket::new(outcome)
    }

    /// Returns a ticket that resolves once every earlier job has run.
    pub fn flush(&self) -> SaveTicket {
        let (reply, outcome) = mpsc::channel();
        self.enqueue(Job::Flush(reply));
        SaveTicket::new(outcome)
    }

    fn enqueue(&self, job: Job) {
        match &self.mode {
            WriterMode::Inline(gateway) => execute_batch(gateway, vec![job]),
            WriterMode::Background { jobs, .. } => {
                let sent = jobs.as_ref().map(|sender| sender.send(job));
                if !matches!(sent, Some(Ok(()))) {
                    warn!("event=persist_enqueue module=persist status=error error_code=writer_stopped");
                }
            }
        }
    }
}

impl<S: KeyValueStore + Send + 'static> Drop for PersistWriter<S> {
    fn drop(&mut self) {
        if let WriterMode::Background { jobs, handle } = &mut self.mode {
            drop(jobs.take());
            if let Some(handle) = handle.take() {
                if handle.join().is_err() {
                    warn!("event=persist_writer module=persist status=error error_code=writer_panicked");
                }
            }
        }
    }
}

fn run_writer<S: KeyValueStore>(gateway: PersistenceGateway<S>, jobs: Receiver<Job>) {
    info!("event=persist_writer module=persist status=start");
    while let Ok(first) = jobs.recv() {
        let mut batch = vec![first];
        batch.extend(jobs.try_iter());
        execute_batch(&gateway, batch);
    }
    info!("event=persist_writer module=persist status=stop");
}

fn execute_batch<S: KeyValueStore>(gateway: &PersistenceGateway<S>, batch: Vec<Job>) {
    let mut superseded = 0usize;
    let mut jobs = batch.into_iter().peekable();
    while let Some(job) = jobs.next() {
        // Reply failures only mean the ticket was dropped.
        match job {
            Job::Save(tasks, reply) => {
                if matches!(jobs.peek(), Some(Job::Save(..))) {
                    superseded += 1;
                    let _ = reply.send(Ok(WriteStatus::Superseded));
                    continue;
                }
                let _ = reply.send(gateway.save(&tasks).map(|()| WriteStatus::Written));
            }
            Job::Clear(reply) => {
                let _ = reply.send(gateway.clear().map(|()| WriteStatus::Written));
            }
            Job::Flush(reply) => {
                let _ = reply.send(Ok(WriteStatus::Written));
            }
        }
    }
    if superseded > 0 {
        debug!("event=persist_coalesce module=persist status=ok superseded={superseded}");
    }
}

#[cfg(test)]
mod tests {
    use super::{execute_batch, Job, PersistPolicy, PersistWriter, WriteStatus};
    use crate::model::task::{Task, TaskList};
    use crate::persist::gateway::{PersistenceGateway, TASKS_SLOT_KEY};
    use crate::persist::kv::MemoryKvStore;
    use crate::store::task_store::PersistIntent;
    use std::sync::mpsc;

    fn list_of(texts: &[&str]) -> TaskList {
        let mut list = TaskList::new();
        for text in texts {
            list.push(Task::new(text).unwrap());
        }
        list
    }

    #[test]
    fn batch_writes_only_newest_of_consecutive_saves() {
        let store = MemoryKvStore::new();
        let gateway = PersistenceGateway::new(store.clone());
        let (old_reply, old_outcome) = mpsc::channel();
        let (new_reply, new_outcome) = mpsc::channel();

        execute_batch(
            &gateway,
            vec![
                Job::Save(list_of(&["a"]), old_reply),
                Job::Save(list_of(&["a", "b"]), new_reply),
            ],
        );

        assert_eq!(old_outcome.recv().unwrap().unwrap(), WriteStatus::Superseded);
        assert_eq!(new_outcome.recv().unwrap().unwrap(), WriteStatus::Written);
        assert_eq!(gateway.load().texts(), vec!["a", "b"]);
    }

    #[test]
    fn clear_is_a_barrier_between_saves() {
        let store = MemoryKvStore::new();
        let gateway = PersistenceGateway::new(store.clone());
        let (save_reply, save_outcome) = mpsc::channel();
        let (clear_reply, clear_outcome) = mpsc::channel();

        execute_batch(
            &gateway,
            vec![
                Job::Save(list_of(&["a"]), save_reply),
                Job::Clear(clear_reply),
            ],
        );

        assert_eq!(save_outcome.recv().unwrap().unwrap(), WriteStatus::Written);
        assert_eq!(clear_outcome.recv().unwrap().unwrap(), WriteStatus::Written);
        assert_eq!(store.raw(TASKS_SLOT_KEY), None);
    }

    #[test]
    fn inline_policy_resolves_ticket_before_returning() {
        let store = MemoryKvStore::new();
        let writer =
            PersistWriter::start(PersistenceGateway::new(store.clone()), PersistPolicy::Inline)
                .unwrap();

        let mut ticket = writer.submit(PersistIntent::Save(list_of(&["x"])));
        assert_eq!(ticket.try_outcome().unwrap().unwrap(), WriteStatus::Written);
        assert!(ticket.try_outcome().is_none());
        assert!(store.raw(TASKS_SLOT_KEY).is_some());
    }

    #[test]
    fn background_writer_drains_queue_on_drop() {
        let store = MemoryKvStore::new();
        let writer = PersistWriter::start(
            PersistenceGateway::new(store.clone()),
            PersistPolicy::Background,
        )
        .unwrap();
        assert_eq!(writer.policy(), PersistPolicy::Background);

        for count in 1..=20 {
            let texts = (0..count).map(|i| format!("t{i}")).collect::<Vec<_>>();
            let refs = texts.iter().map(String::as_str).collect::<Vec<_>>();
            drop(writer.submit(PersistIntent::Save(list_of(&refs))));
        }
        drop(writer);

        let gateway = PersistenceGateway::new(store);
        assert_eq!(gateway.load().len(), 20);
    }
}
