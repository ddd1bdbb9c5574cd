//! Synkronisering, uppslag och bokmärken ovanpå lagret.

pub mod bookmark;
pub mod cache;
pub mod lookup;
pub mod query;
pub mod sync;

pub use bookmark::BookmarkReconciler;
pub use cache::CollectionCache;
pub use lookup::{normalize_key, restore_case, LookupService};
pub use query::{Query, Request};
pub use sync::{CacheEvent, Collection, SyncService};
