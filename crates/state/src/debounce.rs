//! Cancellable debounce timer with a single pending slot.
//!
//! Each `schedule` call aborts the pending timer (if it has not fired yet) and
//! starts a new one, so a burst of calls runs the work once, `delay` after the
//! last call. Work that already started is never aborted by a later call.
//!
//! Must be used from within a Tokio runtime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Slot {
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

/// One logical debounced operation.
#[derive(Debug)]
pub struct Debouncer {
    name: &'static str,
    delay: Duration,
    slot: Arc<Mutex<Slot>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debouncer {
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `work` after the delay unless another call replaces it first.
    pub fn schedule<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        slot.ticket += 1;
        let ticket = slot.ticket;
        if let Some(handle) = slot.pending.take() {
            handle.abort();
        }

        let shared = Arc::clone(&self.slot);
        let delay = self.delay;
        let name = self.name;
        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = lock(&shared);
                if slot.ticket != ticket {
                    return;
                }
                // Detach: from here on the work runs to completion.
                slot.pending = None;
            }
            tracing::debug!(debouncer = name, "debounce fired");
            work.await;
        }));
    }

    /// Drop the pending timer. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = lock(&self.slot);
        slot.ticket += 1;
        match slot.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.slot).pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let make = move || {
            let c = Arc::clone(&c);
            Box::pin(async move {
                c.fetch_add(1, Ordering::SeqCst);
            }) as std::pin::Pin<Box<dyn Future<Output = ()> + Send>>
        };
        (count, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once() {
        let debouncer = Debouncer::new("test", Duration::from_millis(300));
        let (count, make) = counter();

        for _ in 0..5 {
            debouncer.schedule(make());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_run_each_time() {
        let debouncer = Debouncer::new("test", Duration::from_millis(50));
        let (count, make) = counter();

        debouncer.schedule(make());
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.schedule(make());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Debouncer::new("test", Duration::from_millis(50));
        let (count, make) = counter();

        debouncer.schedule(make());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_work_not_aborted_by_reschedule() {
        let debouncer = Debouncer::new("test", Duration::from_millis(10));
        let done = Arc::new(AtomicUsize::new(0));

        let d = Arc::clone(&done);
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            d.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The first work is sleeping inside its body; rescheduling must not abort it.
        debouncer.schedule(async {});
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
