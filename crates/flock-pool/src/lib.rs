//! Quota windows and worker pools for the flock bot
//!
//! Enforces the API's request quotas and fans independent per-account jobs
//! out across bounded worker pools. Two `QuotaWindow` instances exist per
//! run (application-authenticated reads, user-authenticated writes); each is
//! a fixed pool of numbered permits that refills only after the holder of
//! the final permit has waited out the window duration.
//!
//! Job lifecycle:
//! 1. The bot submits one job per target account via `Dispatcher`
//! 2. Each job calls `QuotaWindow::acquire()` before every request
//! 3. The worker granted the final permit waits the window out and refills
//! 4. Shutdown closes the windows; blocked acquires return `Cancelled`
//! 5. `Dispatcher::drain()` joins every submitted job before returning

pub mod dispatch;
pub mod error;
pub mod window;

pub use dispatch::{Dispatcher, WorkerPool};
pub use error::{Error, Result};
pub use window::QuotaWindow;
