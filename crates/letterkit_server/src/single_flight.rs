//! Deduplication of concurrent identical work.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Shares one in-flight computation between concurrent callers with the
/// same key.
///
/// The first caller for a key runs its future; callers arriving while it is
/// running wait for and receive a clone of the same result. Once a result
/// is available the key is forgotten, so the next call starts fresh work
/// (caching finished results is the response cache's job).
///
/// If the running caller is cancelled, one of the waiters runs its own
/// future instead.
#[derive(Debug)]
pub struct SingleFlight<K, V> {
    calls: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key`, or joins the call already in flight.
    pub async fn run<F, Fut>(&self, key: K, work: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut calls = self.calls.lock();
            match calls.get(&key) {
                Some(cell) => {
                    debug!(?key, "joining in-flight call");
                    Arc::clone(cell)
                }
                None => {
                    let cell = Arc::new(OnceCell::new());
                    calls.insert(key.clone(), Arc::clone(&cell));
                    cell
                }
            }
        };

        let value = cell.get_or_init(work).await.clone();

        let mut calls = self.calls.lock();
        if calls.get(&key).is_some_and(|current| Arc::ptr_eq(current, &cell)) {
            calls.remove(&key);
        }

        value
    }

    /// Number of keys with work in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_run() {
        let group: SingleFlight<&str, u32> = SingleFlight::new();
        let counter = AtomicUsize::new(0);
        let runs = &counter;

        let work = move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            42
        };

        let (a, b, c) = tokio::join!(
            group.run("k", work),
            group.run("k", work),
            group.run("k", work),
        );

        assert_eq!((a, b, c), (42, 42, 42));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn different_keys_run_separately() {
        let group: SingleFlight<u8, u8> = SingleFlight::new();
        let (a, b) = tokio::join!(group.run(1, || async { 10 }), group.run(2, || async { 20 }));
        assert_eq!((a, b), (10, 20));
    }

    #[tokio::test]
    async fn finished_keys_start_fresh() {
        let group: SingleFlight<&str, usize> = SingleFlight::new();
        let counter = AtomicUsize::new(0);
        let runs = &counter;

        for _ in 0..3 {
            group
                .run("k", move || async move { runs.fetch_add(1, Ordering::SeqCst) })
                .await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
