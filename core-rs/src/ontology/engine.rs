// StoreHandle - serialized access to the knowledge store
//
// The store is owned by a single worker thread. Every round trip (query,
// update, dump, load) is a job sent over a channel; the caller blocks on the
// reply for at most the configured timeout. An expired job keeps the worker
// busy until it finishes, later jobs queue behind it.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

use super::store::{KnowledgeStore, Solution, StoreError};

type Job = Box<dyn FnOnce(&mut dyn KnowledgeStore) + Send>;

/// Cloneable handle to the store worker
#[derive(Clone)]
pub struct StoreHandle {
    jobs: Sender<Job>,
    timeout: Duration,
}

impl StoreHandle {
    /// Move `store` onto a dedicated worker thread
    pub fn spawn(store: Box<dyn KnowledgeStore>, timeout: Duration) -> Result<Self, StoreError> {
        let (jobs, inbox) = mpsc::channel::<Job>();

        thread::Builder::new()
            .name("knowledge-store".to_string())
            .spawn(move || {
                let mut store = store;
                for job in inbox {
                    if panic::catch_unwind(AssertUnwindSafe(|| job(store.as_mut()))).is_err() {
                        error!("knowledge store job panicked; worker continues");
                    }
                }
                debug!("knowledge store worker exiting");
            })?;

        Ok(Self { jobs, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `f` against the store on the worker and wait for its result
    pub fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn KnowledgeStore) -> Result<T, StoreError> + Send + 'static,
    {
        let (reply, response) = mpsc::channel();

        let job: Job = Box::new(move |store: &mut dyn KnowledgeStore| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(store)))
                .unwrap_or_else(|_| Err(StoreError::StoreError("store call panicked".to_string())));
            // The caller may have timed out and dropped the receiver.
            let _ = reply.send(result);
        });

        self.jobs.send(job).map_err(|_| StoreError::WorkerStopped)?;

        match response.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                error!("knowledge store round trip exceeded {:?}", self.timeout);
                Err(StoreError::Timeout(self.timeout.as_millis() as u64))
            }
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::WorkerStopped),
        }
    }

    pub fn query(&self, query: &str) -> Result<Vec<Solution>, StoreError> {
        let query = query.to_string();
        self.run(move |store| store.query(&query))
    }

    pub fn update(&self, update: &str) -> Result<(), StoreError> {
        let update = update.to_string();
        self.run(move |store| store.update(&update))
    }

    pub fn dump(&self, path: PathBuf) -> Result<(), StoreError> {
        self.run(move |store| store.dump(&path))
    }

    pub fn load(&self, path: PathBuf) -> Result<(), StoreError> {
        self.run(move |store| store.load(&path))
    }
}
