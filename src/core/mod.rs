pub mod cache;
pub mod link;
pub mod reconcile;
pub mod report;
pub mod service;
pub mod sync_state;
pub mod worker;

pub use cache::LocalCache;
pub use service::{Tracker, TrackerContext};
pub use worker::{DrainHandle, DrainReport, SyncWorker};
