//! Searcher façade: picks a cache strategy at construction from a policy
//! value, forwards queries, exposes the last query's I/O count.

use crate::cache::{ContentStrategy, FileStrategy, VectorIndexStrategy};
use crate::error::XdbError;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which cache strategy a [`Searcher`] should use. Closed set — no other
/// values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Nothing preloaded; every query reads the vector slot, the segment
    /// records, and the payload from the file. O(1) memory.
    File,
    /// The 524 288-byte vector index is preloaded; segment and payload
    /// reads still go through the file.
    VectorIndex,
    /// The whole xdb file is preloaded, plus the vector index is also
    /// decoded into flat arrays. Zero I/O per query.
    Content,
}

enum Strategy {
    File(FileStrategy),
    VectorIndex(VectorIndexStrategy),
    Content(ContentStrategy),
}

impl Strategy {
    fn search(&self, ip_bytes: &[u8]) -> Result<String, XdbError> {
        match self {
            Strategy::File(s) => s.search(ip_bytes),
            Strategy::VectorIndex(s) => s.search(ip_bytes),
            Strategy::Content(s) => s.search(ip_bytes),
        }
    }

    fn io_count(&self) -> u32 {
        match self {
            Strategy::File(s) => s.io_count(),
            Strategy::VectorIndex(s) => s.io_count(),
            Strategy::Content(s) => s.io_count(),
        }
    }
}

/// Opens an xdb file under one of the three cache policies and answers
/// IP-to-region queries against it.
///
/// Cheap to clone and share across threads: the backing reader and any
/// preloaded arrays live behind an `Arc` and are read-only after
/// construction. The per-query I/O counter is therefore only meaningful for
/// a single, non-concurrent `search` call — see [`Searcher::io_count`].
#[derive(Clone)]
pub struct Searcher {
    strategy: Arc<Strategy>,
    disposed: Arc<AtomicBool>,
}

impl Searcher {
    /// Opens `path` read-only and builds the strategy named by `policy`.
    /// Fails if the file is missing, unreadable, or (for `Content` and
    /// `VectorIndex`) shorter than `header + vector index` (256 + 524 288
    /// bytes).
    pub fn new(policy: CachePolicy, path: impl AsRef<Path>) -> Result<Self, XdbError> {
        let path = path.as_ref();
        let strategy = match policy {
            CachePolicy::File => Strategy::File(FileStrategy::open(path)?),
            CachePolicy::VectorIndex => Strategy::VectorIndex(VectorIndexStrategy::open(path)?),
            CachePolicy::Content => Strategy::Content(ContentStrategy::open(path)?),
        };
        Ok(Self {
            strategy: Arc::new(strategy),
            disposed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Core entry point: looks up the region owning `ip_bytes` (length 4 or
    /// 16). Returns the empty string when no range matches; returns a
    /// non-empty UTF-8 string on a hit.
    pub fn search(&self, ip_bytes: &[u8]) -> Result<String, XdbError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(XdbError::Disposed);
        }
        if ip_bytes.len() != 4 && ip_bytes.len() != 16 {
            return Err(XdbError::InvalidIpLength(ip_bytes.len()));
        }
        self.strategy.search(ip_bytes)
    }

    /// Parses `ip` (dotted-quad or colon-hex) and delegates to
    /// [`Searcher::search`].
    pub fn search_str(&self, ip: &str) -> Result<String, XdbError> {
        let addr = IpAddr::from_str(ip)?;
        self.search_addr(addr)
    }

    /// Extracts `addr`'s byte form (4 or 16 bytes) and delegates to
    /// [`Searcher::search`].
    pub fn search_addr(&self, addr: IpAddr) -> Result<String, XdbError> {
        match addr {
            IpAddr::V4(v4) => self.search(&v4.octets()),
            IpAddr::V6(v6) => self.search(&v6.octets()),
        }
    }

    /// I/O cost of the last `search` call. Not meaningful when the same
    /// `Searcher` is queried concurrently from multiple threads (see the
    /// type-level docs).
    pub fn io_count(&self) -> u32 {
        self.strategy.io_count()
    }

    /// Marks this searcher disposed. Idempotent: a second call is a no-op.
    /// Queries issued after disposal fail. The underlying reader and any
    /// preloaded arrays are only actually released once every clone sharing
    /// this searcher's `Arc` is dropped.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }
}
