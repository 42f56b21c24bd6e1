//! HEXHOLD Store - durable StateStore backends
//!
//! Two implementations of the core's `StateStore` contract:
//! - [`FileStore`]: one JSON file per level/table under a data directory
//! - [`HttpStore`]: client for a remote row-oriented backend

mod file;
mod http;

pub use file::FileStore;
pub use http::HttpStore;
