//! Numbered permit windows for request quota enforcement
//!
//! A window models "N requests per duration D". Permits are numbered `1..=N`
//! and handed out FIFO across every worker contending on the window; the
//! worker that draws permit `N` is responsible for waiting out the rest of
//! the window and refilling the pool via `wait_and_reset`. The reset is
//! lazy — an idle window never ticks — and permits already held when a reset
//! happens are never clawed back: only the pool refills.
//!
//! The semaphore gates availability and its fair wait queue provides the
//! FIFO ordering; the numbered sequence lives behind a mutex. Refill pushes
//! the fresh numbers before adding semaphore credits, so a granted permit
//! always finds a number waiting.
//!
//! `close()` is the shutdown path: every blocked `acquire` wakes with
//! `Error::Cancelled`, future acquires fail the same way, and a holder
//! parked in `wait_and_reset` is released without refilling.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, watch};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A fixed-capacity pool of numbered request permits.
pub struct QuotaWindow {
    name: &'static str,
    capacity: u32,
    window: Duration,
    permits: Semaphore,
    numbers: Mutex<VecDeque<u32>>,
    closed: watch::Sender<bool>,
}

impl QuotaWindow {
    /// Create a window allowing `capacity` requests per `window` duration.
    ///
    /// `name` labels the window in logs ("read", "write").
    pub fn new(name: &'static str, capacity: u32, window: Duration) -> Self {
        assert!(capacity > 0, "quota window capacity must be positive");
        Self {
            name,
            capacity,
            window,
            permits: Semaphore::new(capacity as usize),
            numbers: Mutex::new((1..=capacity).collect()),
            closed: watch::Sender::new(false),
        }
    }

    /// Permits per window cycle.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Window duration.
    pub fn duration(&self) -> Duration {
        self.window
    }

    /// Acquire the next permit, blocking until one is free.
    ///
    /// Returns the 1-based permit number within the current window cycle.
    /// Blocking is unbounded; the only failure is cancellation after
    /// [`close`](Self::close).
    pub async fn acquire(&self) -> Result<u32> {
        let permit = self.permits.acquire().await.map_err(|_| Error::Cancelled)?;
        permit.forget();
        let number = self
            .numbers
            .lock()
            .await
            .pop_front()
            .expect("permit numbers in sync with semaphore");
        debug!(window = self.name, permit = number, "permit granted");
        Ok(number)
    }

    /// Whether `number` is the final permit of a window cycle.
    ///
    /// The holder of the final permit must call
    /// [`wait_and_reset`](Self::wait_and_reset) once its request completes.
    pub fn is_last(&self, number: u32) -> bool {
        number == self.capacity
    }

    /// Wait out the window duration, then refill the permit pool.
    ///
    /// Only the holder of the final permit calls this; that single-writer
    /// rule keeps one cycle from being refilled twice. Closing the window
    /// mid-wait abandons the reset and returns `Cancelled`, so shutdown is
    /// never stalled behind a window wait.
    pub async fn wait_and_reset(&self) -> Result<()> {
        info!(
            window = self.name,
            wait_secs = self.window.as_secs(),
            "window exhausted, holding until reset"
        );
        let mut closed = self.closed.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(self.window) => {}
            _ = closed.wait_for(|closed| *closed) => return Err(Error::Cancelled),
        }

        let mut numbers = self.numbers.lock().await;
        numbers.clear();
        numbers.extend(1..=self.capacity);
        self.permits.add_permits(self.capacity as usize);
        info!(
            window = self.name,
            capacity = self.capacity,
            "window reset"
        );
        Ok(())
    }

    /// Close the window, cancelling every blocked and future `acquire`.
    pub fn close(&self) {
        self.permits.close();
        let _ = self.closed.send(true);
        info!(window = self.name, "window closed");
    }

    /// Whether the window has been closed.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}
