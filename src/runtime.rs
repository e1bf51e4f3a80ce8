//! Runtime abstraction layer for async operations
//!
//! Tile fetches are the only suspension points of the viewer. They are handed
//! to an [`AsyncSpawner`] so the core stays independent of the executor: tokio
//! in applications, [`spawners::queued::QueuedSpawner`] for headless hosts and
//! tests that want to decide when loads complete.

use futures::future::BoxFuture;
use std::future::Future;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning with type safety
pub fn spawn<F>(spawner: &dyn AsyncSpawner, future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use crate::{MapError, Result};
        use ::tokio::{runtime::Handle, task::JoinHandle};

        /// Tokio-based async spawner
        #[derive(Debug, Clone)]
        pub struct TokioSpawner {
            handle: Handle,
        }

        impl TokioSpawner {
            pub fn new(handle: Handle) -> Self {
                Self { handle }
            }

            /// Spawner for the runtime the caller is running on
            pub fn current() -> Result<Self> {
                Handle::try_current()
                    .map(Self::new)
                    .map_err(|e| MapError::Runtime(e.to_string()))
            }
        }

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
                Box::new(TokioHandle(self.handle.spawn(future)))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    pub mod queued {
        use super::*;
        use std::sync::{
            atomic::{AtomicBool, Ordering},
            Arc, Mutex,
        };

        struct QueuedTask {
            future: BoxFuture<'static, ()>,
            finished: Arc<AtomicBool>,
            cancelled: Arc<AtomicBool>,
        }

        /// Spawner that parks futures until [`QueuedSpawner::run_pending`]
        /// drives them to completion on the calling thread.
        #[derive(Clone, Default)]
        pub struct QueuedSpawner {
            pending: Arc<Mutex<Vec<QueuedTask>>>,
        }

        impl QueuedSpawner {
            pub fn new() -> Self {
                Self::default()
            }

            /// Number of spawned tasks that have not run yet
            pub fn pending(&self) -> usize {
                self.pending.lock().map(|tasks| tasks.len()).unwrap_or(0)
            }

            /// Runs every task queued so far, in spawn order, and returns how
            /// many ran. Tasks spawned while running wait for the next call.
            pub fn run_pending(&self) -> usize {
                let tasks = match self.pending.lock() {
                    Ok(mut tasks) => std::mem::take(&mut *tasks),
                    Err(_) => return 0,
                };
                let mut ran = 0;
                for task in tasks {
                    if task.cancelled.load(Ordering::SeqCst) {
                        continue;
                    }
                    futures::executor::block_on(task.future);
                    task.finished.store(true, Ordering::SeqCst);
                    ran += 1;
                }
                ran
            }
        }

        impl AsyncSpawner for QueuedSpawner {
            fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
                let finished = Arc::new(AtomicBool::new(false));
                let cancelled = Arc::new(AtomicBool::new(false));
                if let Ok(mut tasks) = self.pending.lock() {
                    tasks.push(QueuedTask {
                        future,
                        finished: finished.clone(),
                        cancelled: cancelled.clone(),
                    });
                }
                Box::new(QueuedHandle {
                    finished,
                    cancelled,
                })
            }
        }

        struct QueuedHandle {
            finished: Arc<AtomicBool>,
            cancelled: Arc<AtomicBool>,
        }

        impl AsyncHandle for QueuedHandle {
            fn is_finished(&self) -> bool {
                self.finished.load(Ordering::SeqCst) || self.cancelled.load(Ordering::SeqCst)
            }

            fn cancel(&self) {
                self.cancelled.store(true, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::spawners::queued::QueuedSpawner;
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_queued_spawner_runs_on_demand() {
        let spawner = QueuedSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let handle = spawn(&spawner, async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = counter.clone();
        let cancelled = spawn(&spawner, async move {
            c.fetch_add(10, Ordering::SeqCst);
        });
        cancelled.cancel();

        assert_eq!(spawner.pending(), 2);
        assert!(!handle.is_finished());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(spawner.run_pending(), 1);
        assert!(handle.is_finished());
        assert!(cancelled.is_finished());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(spawner.pending(), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let spawner = spawners::tokio_impl::TokioSpawner::current().unwrap();
        let handle = spawn(&spawner, async {
            ::tokio::time::sleep(::tokio::time::Duration::from_millis(10)).await;
        });

        // Should not be finished immediately
        assert!(!handle.is_finished());

        // Wait a bit and check again
        ::tokio::time::sleep(::tokio::time::Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }

    #[test]
    fn test_tokio_spawner_outside_runtime() {
        #[cfg(feature = "tokio-runtime")]
        assert!(spawners::tokio_impl::TokioSpawner::current().is_err());
    }
}
