//! Adapt Sync - lokalt datalager för offline bibelöversättning
//!
//! SQLite-lagring per entitetstyp, minnescachar som ägs av en synktjänst,
//! KB-uppslag och bokmärkeshantering.

pub mod models;
pub mod db;
pub mod services;
pub mod utils;

// Re-exports
pub use db::Database;
pub use models::*;
pub use services::{BookmarkReconciler, LookupService, Query, Request, SyncService};
pub use utils::{AppError, AppResult};
