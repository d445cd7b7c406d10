//! Bounded work queues drained by tasks on the shared pool.

use crossbeam_channel::{Receiver, Sender};

use crate::cancel::CancelSignal;

/// A fully loaded, closed queue of work items.
pub(crate) struct WorkQueue<T> {
    rx: Receiver<T>,
    len: usize,
}

impl<T: Send> WorkQueue<T> {
    /// Load `items` into a queue sized to hold all of them.
    pub(crate) fn new(items: Vec<T>) -> Self {
        let len = items.len();
        let (tx, rx) = crossbeam_channel::bounded(len.max(1));
        for item in items {
            // Capacity equals the item count, so this never blocks.
            let _ = tx.send(item);
        }
        Self { rx, len }
    }

    /// Spawn up to `workers` tasks into `scope`, each pulling items until the queue is
    /// empty or `cancel` is raised, and posting `job(item)` to `results`.
    pub(crate) fn spawn_workers<'scope, R, F>(
        &self,
        scope: &rayon::Scope<'scope>,
        workers: usize,
        cancel: &'scope CancelSignal,
        results: &Sender<R>,
        job: &'scope F,
    ) where
        T: 'scope,
        R: Send + 'scope,
        F: Fn(T) -> R + Sync,
    {
        for _ in 0..workers.min(self.len) {
            let rx = self.rx.clone();
            let tx = results.clone();
            scope.spawn(move |_| {
                while !cancel.is_pending() {
                    let Ok(item) = rx.try_recv() else { break };
                    if tx.send(job(item)).is_err() {
                        break;
                    }
                }
            });
        }
    }
}

/// Run `job` over `items` with at most `workers` concurrent tasks and collect the results
/// in completion order.
pub(crate) fn fan_out<T, R, F>(items: Vec<T>, workers: usize, cancel: &CancelSignal, job: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let queue = WorkQueue::new(items);
    let (tx, rx) = crossbeam_channel::unbounded();
    rayon::scope(|s| queue.spawn_workers(s, workers, cancel, &tx, &job));
    drop(tx);
    rx.into_iter().collect()
}
