//! Bounded fan-out worker pool for cache-tier writes. `concurrentWriteThreads
//! = 0` degenerates to synchronous, still best-effort, inline writes.

use std::sync::Arc;

use alloy_primitives::Bytes;
use eigenda_proxy_backend::Backend;
use tokio::sync::{mpsc, Mutex};

struct WriteTask {
    backend: Arc<dyn Backend>,
    key: Vec<u8>,
    value: Bytes,
}

async fn run_task(task: WriteTask) {
    if let Err(e) = task.backend.put(&task.key, task.value).await {
        tracing::warn!(
            backend = %task.backend.backend_type(),
            error = %e,
            "cache-tier write failed, ignoring (best-effort)"
        );
    }
}

enum Dispatch {
    Inline,
    Pool(mpsc::Sender<WriteTask>),
}

/// Owns `N` long-lived workers draining a bounded queue. Enqueue never
/// blocks the caller past the queue bound -- on overflow the task runs
/// synchronously on the producer instead of growing the queue unboundedly.
pub struct WorkerPool {
    dispatch: Dispatch,
}

impl WorkerPool {
    /// `queue_bound` is per-worker-pool, not per-worker.
    pub fn new(concurrent_write_threads: usize, queue_bound: usize) -> Self {
        if concurrent_write_threads == 0 {
            return Self { dispatch: Dispatch::Inline };
        }

        let (tx, rx) = mpsc::channel::<WriteTask>(queue_bound);
        let rx = Arc::new(Mutex::new(rx));
        for _ in 0..concurrent_write_threads {
            let rx = rx.clone();
            tokio::spawn(async move {
                loop {
                    let task = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    match task {
                        Some(task) => run_task(task).await,
                        None => break,
                    }
                }
            });
        }

        Self { dispatch: Dispatch::Pool(tx) }
    }

    /// Enqueues a best-effort cache write. Never returns an error to the
    /// caller -- per-task failures are logged and suppressed, never
    /// propagated to the PUT response.
    pub async fn enqueue(&self, backend: Arc<dyn Backend>, key: Vec<u8>, value: Bytes) {
        let task = WriteTask { backend, key, value };
        match &self.dispatch {
            Dispatch::Inline => run_task(task).await,
            Dispatch::Pool(tx) => {
                if let Err(mpsc::error::TrySendError::Full(task)) = tx.try_send(task) {
                    run_task(task).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eigenda_proxy_types::{BackendType, ProxyError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        puts: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Backend for CountingBackend {
        fn backend_type(&self) -> BackendType {
            BackendType::Memstore
        }
        async fn put(&self, _key: &[u8], _value: Bytes) -> Result<(), ProxyError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn get(&self, _key: &[u8]) -> Result<Bytes, ProxyError> {
            Err(ProxyError::NotFound)
        }
        async fn verify(&self, _key: &[u8], _value: &Bytes) -> Result<(), ProxyError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn synchronous_pool_runs_task_inline() {
        let puts = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(0, 1);
        let backend: Arc<dyn Backend> = Arc::new(CountingBackend { puts: puts.clone() });
        pool.enqueue(backend, vec![1], Bytes::from_static(b"x")).await;
        assert_eq!(puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pooled_writes_eventually_land() {
        let puts = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(2, 8);
        let backend: Arc<dyn Backend> = Arc::new(CountingBackend { puts: puts.clone() });
        for i in 0..5u8 {
            pool.enqueue(backend.clone(), vec![i], Bytes::from_static(b"x")).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(puts.load(Ordering::SeqCst), 5);
    }
}
