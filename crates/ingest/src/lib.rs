//! Redemption record ingestion — CSV loading with fail-fast schema
//! validation and a content-invalidated load cache.

pub mod cache;
pub mod loader;

pub use cache::CachedLoader;
pub use loader::RecordLoader;
