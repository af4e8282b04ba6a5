//! Client-side data access for the sensor network dashboard.
//!
//! Two components, composed only through shared session state:
//!
//! - [`SessionStore`] — who is logged in and with what token, persisted in a
//!   [`SessionStorage`] backend and published to subscribers.
//! - [`ResourceFetcher`] — fetches one named [`Resource`] with the current
//!   bearer token, validates the response, and tears the session down on any
//!   failed request. [`ResourceCache`] layers a revalidating cache on top.
//!
//! [`Dashboard`] wires both together from a [`ClientConfig`].

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod hooks;
pub mod session;
pub mod storage;

pub use cache::ResourceCache;
pub use config::ClientConfig;
pub use dashboard::{BackgroundTasks, Dashboard};
pub use error::ClientError;
pub use fetcher::{Networks, Resource, ResourceFetcher};
pub use hooks::{Logout, Notifier, Reload, TracingNotifier};
pub use session::SessionStore;
pub use storage::{memory::MemoryStorage, sqlite::SqliteStorage, SessionStorage, StorageError};
