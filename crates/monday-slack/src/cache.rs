//! TTL cache for the board-list and user-list lookups used by the
//! create-task handler (§5 "in-memory caches ... TTL 5 min for
//! boards/users").

use std::sync::Mutex;
use std::time::{Duration, Instant};

const TTL: Duration = Duration::from_secs(300);

pub struct TtlCache<T: Clone> {
    inner: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<T> {
        let guard = self.inner.lock().unwrap();
        guard.as_ref().and_then(|(stamped, value)| {
            if stamped.elapsed() < TTL {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn set(&self, value: T) {
        *self.inner.lock().unwrap() = Some((Instant::now(), value));
    }

    /// Return the cached value if fresh, otherwise populate it by calling
    /// `load` and cache the result.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get() {
            return Ok(cached);
        }
        let value = load().await?;
        self.set(value.clone());
        Ok(value)
    }
}
