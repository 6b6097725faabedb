//! Offline IP-to-region lookup over a precomputed `xdb` binary index.
//!
//! The format is a 256-byte header, a dense 256×256 vector index, and a
//! pool of sorted, fixed-stride segment records pointing at UTF-8 region
//! payloads. [`Searcher`] opens an xdb file under one of three
//! [`CachePolicy`] strategies and answers queries against it; see
//! `cache` for the strategies themselves and `reader` for the two
//! backing-store implementations they build on.

mod cache;
mod error;
mod reader;
pub mod searcher;

pub use crate::error::XdbError;
pub use crate::searcher::{CachePolicy, Searcher};
