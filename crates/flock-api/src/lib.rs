//! Social graph API engines for the flock workspace
//!
//! Three engines share one executor seam:
//!
//! 1. `Paginator` walks cursored follower/friend listings under the
//!    read-quota window.
//! 2. `Mutator` applies follow/unfollow changes under the write-quota
//!    window.
//! 3. `RecordStore` persists fetched listings as line-delimited JSON.
//!
//! All HTTP goes through the `RequestExecutor` trait so tests can script
//! responses without a server; `HttpExecutor` is the production
//! implementation.

pub mod error;
pub mod friendship;
pub mod query;
pub mod store;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use friendship::{FriendAction, Mutator};
pub use query::{FetchOutcome, Paginator, QueryKind};
pub use store::RecordStore;
pub use transport::{ApiResponse, HttpExecutor, RequestExecutor};
pub use wire::{UserPage, UserRecord};
