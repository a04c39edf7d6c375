//! Single-writer persistence queue.
//!
//! Every snapshot goes through one background thread, so writes complete in
//! the order they were issued and the last write to land is always the most
//! recent snapshot.

use std::error::Error;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::error::StoreError;
use crate::model::todo::Todo;
use crate::repository::TodoStore;

struct SaveJob {
    seq: u64,
    snapshot: Vec<Todo>,
    reply: mpsc::Sender<Result<(), StoreError>>,
}

/// Completion handle for one queued save.
#[derive(Debug)]
pub struct SaveTicket {
    seq: u64,
    reply: mpsc::Receiver<Result<(), StoreError>>,
}

impl SaveTicket {
    /// Position of this save in issue order, starting at 1.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Blocks until the writer has handled this save.
    pub fn wait(self) -> Result<(), StoreError> {
        self.reply.recv().unwrap_or(Err(StoreError::WriterClosed))
    }

    /// Non-blocking check. Returns `Some` once the write has finished; the
    /// result is handed out a single time, so drop the ticket afterwards.
    pub fn try_result(&self) -> Option<Result<(), StoreError>> {
        match self.reply.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(StoreError::WriterClosed)),
        }
    }
}

pub struct SaveQueue {
    sender: Option<mpsc::Sender<SaveJob>>,
    worker: Option<JoinHandle<()>>,
    issued: u64,
}

impl SaveQueue {
    pub fn spawn<S>(store: S) -> Self
    where
        S: TodoStore + Send + 'static,
    {
        let (sender, jobs) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("pocketdo-save".to_string())
            .spawn(move || run_writer(store, jobs))
            .map_err(|e| error!(error = %e, "could not start save writer"))
            .ok();

        Self {
            sender: worker.as_ref().map(|_| sender),
            worker,
            issued: 0,
        }
    }

    /// Queues a full snapshot for writing. Never blocks on I/O.
    pub fn enqueue(&mut self, snapshot: Vec<Todo>) -> SaveTicket {
        self.issued += 1;
        let seq = self.issued;
        let (reply, ticket_rx) = mpsc::channel();

        let job = SaveJob {
            seq,
            snapshot,
            reply,
        };
        match &self.sender {
            Some(sender) => {
                if sender.send(job).is_err() {
                    error!(seq, "save writer is gone, snapshot dropped");
                }
            }
            None => error!(seq, "save writer never started, snapshot dropped"),
        }

        SaveTicket {
            seq,
            reply: ticket_rx,
        }
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain what is queued and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("save writer panicked");
            }
        }
    }
}

fn run_writer<S: TodoStore>(store: S, jobs: mpsc::Receiver<SaveJob>) {
    for job in jobs {
        let result = store.save(&job.snapshot).or_else(|err| {
            warn!(seq = job.seq, error = &err as &dyn Error, "save failed, retrying once");
            store.save(&job.snapshot)
        });
        match &result {
            Ok(()) => debug!(seq = job.seq, count = job.snapshot.len(), "snapshot persisted"),
            Err(err) => error!(seq = job.seq, error = err as &dyn Error, "snapshot not persisted"),
        }
        // The caller may have dropped the ticket.
        let _ = job.reply.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Records every snapshot and optionally fails the first N writes.
    #[derive(Clone, Default)]
    struct RecordingStore {
        saved: Arc<Mutex<Vec<Vec<String>>>>,
        failures_left: Arc<Mutex<u32>>,
    }

    impl TodoStore for RecordingStore {
        fn load(&self) -> Result<Option<Vec<Todo>>, StoreError> {
            Ok(None)
        }

        fn save(&self, todos: &[Todo]) -> Result<(), StoreError> {
            let mut failures = self.failures_left.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(StoreError::Persistence {
                    key: "todos".to_string(),
                    source: io::Error::other("disk full"),
                });
            }
            self.saved
                .lock()
                .push(todos.iter().map(|t| t.text.clone()).collect());
            Ok(())
        }
    }

    fn snapshot(texts: &[&str]) -> Vec<Todo> {
        texts.iter().filter_map(|t| Todo::new(t)).collect()
    }

    #[test]
    fn test_saves_complete_in_issue_order() {
        let store = RecordingStore::default();
        let mut queue = SaveQueue::spawn(store.clone());

        let tickets: Vec<SaveTicket> = (1..=20)
            .map(|n| {
                let texts: Vec<String> = (0..n).map(|i| format!("item {}", i)).collect();
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                queue.enqueue(snapshot(&refs))
            })
            .collect();

        for (i, ticket) in tickets.into_iter().enumerate() {
            assert_eq!(ticket.seq(), i as u64 + 1);
            ticket.wait().unwrap();
        }

        let saved = store.saved.lock();
        let lengths: Vec<usize> = saved.iter().map(Vec::len).collect();
        assert_eq!(lengths, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_failure_is_retried() {
        let store = RecordingStore::default();
        *store.failures_left.lock() = 1;
        let mut queue = SaveQueue::spawn(store.clone());

        queue.enqueue(snapshot(&["a"])).wait().unwrap();
        assert_eq!(store.saved.lock().len(), 1);
    }

    #[test]
    fn test_persistent_failure_is_reported() {
        let store = RecordingStore::default();
        *store.failures_left.lock() = 2;
        let mut queue = SaveQueue::spawn(store.clone());

        let result = queue.enqueue(snapshot(&["a"])).wait();
        assert!(matches!(result, Err(StoreError::Persistence { .. })));
        assert!(store.saved.lock().is_empty());

        // later saves are unaffected
        queue.enqueue(snapshot(&["b"])).wait().unwrap();
        assert_eq!(store.saved.lock().as_slice(), &[vec!["b".to_string()]]);
    }

    #[test]
    fn test_drop_flushes_pending_saves() {
        let store = RecordingStore::default();
        {
            let mut queue = SaveQueue::spawn(store.clone());
            for text in ["a", "b", "c"] {
                let _ = queue.enqueue(snapshot(&[text]));
            }
        }
        assert_eq!(store.saved.lock().len(), 3);
    }

    #[test]
    fn test_try_result_reports_once_finished() {
        let store = RecordingStore::default();
        let mut queue = SaveQueue::spawn(store);
        let ticket = queue.enqueue(snapshot(&["a"]));

        let result = loop {
            if let Some(result) = ticket.try_result() {
                break result;
            }
            thread::yield_now();
        };
        assert!(result.is_ok());
    }
}
