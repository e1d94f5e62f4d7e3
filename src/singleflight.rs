//! Call Deduplication
//!
//! Collapses concurrent calls for the same key into a single execution.
//!
//! The first caller for a key becomes the leader: it registers an in-flight
//! record, runs the work, publishes the result and removes the record.
//! Callers arriving while the work runs subscribe to the record and receive a
//! clone of the leader's result. Once the record is gone, the next call for
//! the key runs the work again; nothing is remembered between flights.
//!
//! There is no timeout here. Work that never finishes holds every waiter for
//! that key, so bounded latency has to be imposed inside the work itself.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::trace;

type Slot<T, E> = Option<Result<T, E>>;
type Call<T, E> = Arc<watch::Sender<Slot<T, E>>>;

// == Flight ==
/// Per-key call deduplicator.
pub struct Flight<T, E> {
    calls: Mutex<HashMap<String, Call<T, E>>>,
}

enum Role<T, E> {
    Leader(Call<T, E>),
    Waiter(watch::Receiver<Slot<T, E>>),
}

impl<T, E> Flight<T, E>
where
    T: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Work ==
    /// Runs `work` for `key` unless a call for `key` is already in flight, in
    /// which case this waits for that call and returns its result.
    ///
    /// Every caller attached to one flight observes the same result. If the
    /// leader is dropped before publishing, the waiters start over and one of
    /// them leads the next attempt.
    pub async fn work<F, Fut>(&self, key: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        loop {
            match self.join(key) {
                Role::Leader(call) => {
                    let _guard = FlightGuard {
                        flight: self,
                        key,
                        call: Arc::clone(&call),
                    };
                    let result = work().await;
                    call.send_replace(Some(result.clone()));
                    return result;
                }
                Role::Waiter(mut rx) => {
                    trace!(key, "joining in-flight call");
                    match rx.wait_for(Option::is_some).await {
                        Ok(slot) => {
                            if let Some(result) = slot.as_ref() {
                                return result.clone();
                            }
                        }
                        // Leader dropped without publishing
                        Err(_) => continue,
                    }
                }
            }
        }
    }

    // == In Flight ==
    /// Number of keys with a call currently running.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    fn join(&self, key: &str) -> Role<T, E> {
        let mut calls = self.calls.lock();
        if let Some(call) = calls.get(key) {
            return Role::Waiter(call.subscribe());
        }
        let (tx, _) = watch::channel(None);
        let call = Arc::new(tx);
        calls.insert(key.to_string(), Arc::clone(&call));
        Role::Leader(call)
    }
}

impl<T, E> Default for Flight<T, E>
where
    T: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the leader's record when the leader finishes or is dropped.
struct FlightGuard<'a, T, E> {
    flight: &'a Flight<T, E>,
    key: &'a str,
    call: Call<T, E>,
}

impl<T, E> Drop for FlightGuard<'_, T, E> {
    fn drop(&mut self) {
        let mut calls = self.flight.calls.lock();
        if calls
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.call))
        {
            calls.remove(self.key);
        }
    }
}
