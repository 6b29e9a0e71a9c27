use crossbeam_channel::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;

/// Background thread with its termination channel.
#[derive(Debug)]
pub struct Worker {
    pub join_handle: JoinHandle<()>,
    pub terminate_worker_tx: Sender<()>,
}

/// Spawns the worker function on a dedicated thread. The worker must exit its loop when
/// `terminate_worker_rx` yields a value or disconnects.
pub fn run_worker<T: Send + 'static, F: Fn(T, Receiver<()>) + Send + 'static>(
    worker: F,
    params: T,
) -> Worker {
    let (terminate_worker_tx, terminate_worker_rx): (Sender<()>, Receiver<()>) =
        crossbeam_channel::unbounded();

    let join_handle = thread::spawn(move || worker(params, terminate_worker_rx));

    Worker {
        join_handle,
        terminate_worker_tx,
    }
}

impl Worker {
    pub fn terminate(&self) {
        if self.terminate_worker_tx.send(()).is_err() {
            trace!("Worker already stopped");
        }
    }

    /// Waits for the thread. Joining from the worker's own thread is skipped.
    pub fn join(self) {
        if self.join_handle.thread().id() == thread::current().id() {
            warn!("Worker cannot join itself");
            return;
        }

        if self.join_handle.join().is_err() {
            error!("Worker returned an error")
        }
    }
}

#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    pub fn new(workers: Vec<Worker>) -> WorkerPool {
        WorkerPool { workers }
    }

    pub fn terminate(&self) {
        for worker in &self.workers {
            worker.terminate();
        }
    }

    pub fn join(self) {
        for worker in self.workers {
            worker.join();
        }
    }
}
