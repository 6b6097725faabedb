//! Cache strategies: `Content` (full buffer + preloaded vector index),
//! `VectorIndex` (file-backed + preloaded vector index), `File` (file-backed,
//! nothing preloaded). All three share one binary-search-over-segments
//! algorithm; they differ only in where the vector slot and segment bytes
//! come from.

use crate::error::XdbError;
use crate::reader::{FileReader, FullBufferReader, XdbReader};
use byteorder::{ByteOrder, LE};
use std::cmp::Ordering;
use std::path::Path;

pub(crate) const HEADER_LEN: u64 = 256;
const VECTOR_INDEX_COLS: usize = 256;
const VECTOR_INDEX_SLOTS: usize = VECTOR_INDEX_COLS * VECTOR_INDEX_COLS;
const VECTOR_SLOT_SIZE: usize = 8;
pub(crate) const VECTOR_INDEX_LEN: u64 = (VECTOR_INDEX_SLOTS * VECTOR_SLOT_SIZE) as u64;

/// Stack threshold for the per-query record scratch buffer. The widest
/// record (IPv6, 38 bytes) is well under this.
const RECORD_STACK_LEN: usize = 64;
/// Stack threshold for the region payload; most region strings fit.
const PAYLOAD_STACK_LEN: usize = 256;

/// Compare a query IP against a stored range endpoint, honoring the
/// asymmetric on-disk byte order: IPv6 endpoints are big-endian (the same
/// order as the query), IPv4 endpoints are stored byte-reversed relative to
/// the network-order query.
fn cmp_ip(query: &[u8], stored: &[u8], ip_len: usize) -> Ordering {
    if ip_len == 4 {
        let q = u32::from_be_bytes(query.try_into().unwrap());
        let s = u32::from_le_bytes(stored.try_into().unwrap());
        q.cmp(&s)
    } else {
        let q = u128::from_be_bytes(query.try_into().unwrap());
        let s = u128::from_be_bytes(stored.try_into().unwrap());
        q.cmp(&s)
    }
}

/// Decode the 524 288-byte vector index into two flat u32 arrays indexed by
/// `ip_bytes[0] * 256 + ip_bytes[1]`.
fn decode_vector_index(bytes: &[u8]) -> (Vec<u32>, Vec<u32>) {
    let mut start = Vec::with_capacity(VECTOR_INDEX_SLOTS);
    let mut end = Vec::with_capacity(VECTOR_INDEX_SLOTS);
    for slot in bytes.chunks_exact(VECTOR_SLOT_SIZE) {
        start.push(LE::read_u32(&slot[0..4]));
        end.push(LE::read_u32(&slot[4..8]));
    }
    (start, end)
}

fn vector_slot_preloaded(start: &[u32], end: &[u32], ip_bytes: &[u8]) -> (u32, u32) {
    let idx = ip_bytes[0] as usize * VECTOR_INDEX_COLS + ip_bytes[1] as usize;
    (start[idx], end[idx])
}

fn vector_slot_via_reader(reader: &dyn XdbReader, ip_bytes: &[u8]) -> Result<(u32, u32), XdbError> {
    let idx = ip_bytes[0] as usize * VECTOR_INDEX_COLS + ip_bytes[1] as usize;
    let offset = HEADER_LEN + (idx * VECTOR_SLOT_SIZE) as u64;
    let mut buf = [0u8; VECTOR_SLOT_SIZE];
    reader.read(offset, &mut buf)?;
    Ok((LE::read_u32(&buf[0..4]), LE::read_u32(&buf[4..8])))
}

fn read_payload(reader: &dyn XdbReader, data_ptr: u32, data_len: u16) -> Result<String, XdbError> {
    let len = data_len as usize;
    if len <= PAYLOAD_STACK_LEN {
        let mut buf = [0u8; PAYLOAD_STACK_LEN];
        reader.read(data_ptr as u64, &mut buf[..len])?;
        Ok(String::from_utf8(buf[..len].to_vec())?)
    } else {
        let mut buf = vec![0u8; len];
        reader.read(data_ptr as u64, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Binary search the fixed-stride segment array in `[s_ptr, e_ptr)` for
/// `ip_bytes`, returning the matching region string or the empty string if
/// no range contains the address.
fn search_segment(
    reader: &dyn XdbReader,
    ip_bytes: &[u8],
    s_ptr: u32,
    e_ptr: u32,
) -> Result<String, XdbError> {
    if e_ptr < s_ptr {
        return Err(XdbError::CorruptIndex);
    }

    let ip_len = ip_bytes.len();
    let index_size = 2 * ip_len + 6;
    let span = (e_ptr - s_ptr) as usize;
    if span % index_size != 0 {
        return Err(XdbError::InvalidFormat);
    }
    let count = span / index_size;
    if count == 0 {
        return Ok(String::new());
    }

    let mut record = [0u8; RECORD_STACK_LEN];
    let rec = &mut record[..index_size];

    let mut low: i64 = 0;
    let mut high: i64 = count as i64 - 1;
    while low <= high {
        let mid = (low + high) >> 1;
        let p = s_ptr as u64 + mid as u64 * index_size as u64;
        reader.read(p, rec)?;

        let sip = &rec[0..ip_len];
        let eip = &rec[ip_len..2 * ip_len];

        if cmp_ip(ip_bytes, sip, ip_len) == Ordering::Less {
            high = mid - 1;
        } else if cmp_ip(ip_bytes, eip, ip_len) == Ordering::Greater {
            low = mid + 1;
        } else {
            let data_len = LE::read_u16(&rec[2 * ip_len..2 * ip_len + 2]);
            let data_ptr = LE::read_u32(&rec[2 * ip_len + 2..2 * ip_len + 6]);
            if data_len == 0 {
                return Ok(String::new());
            }
            return read_payload(reader, data_ptr, data_len);
        }
    }

    Ok(String::new())
}

/// Full file preloaded, vector index also preloaded into flat arrays. No
/// reader I/O is ever issued; `io_count` is always 0.
pub(crate) struct ContentStrategy {
    reader: FullBufferReader,
    vector_start: Vec<u32>,
    vector_end: Vec<u32>,
}

impl ContentStrategy {
    pub(crate) fn open(path: &Path) -> Result<Self, XdbError> {
        let reader = FullBufferReader::open(path)?;
        if (reader.len() as u64) < HEADER_LEN + VECTOR_INDEX_LEN {
            return Err(XdbError::InvalidFormat);
        }
        let vector_bytes = &reader.as_slice()
            [HEADER_LEN as usize..(HEADER_LEN + VECTOR_INDEX_LEN) as usize];
        let (vector_start, vector_end) = decode_vector_index(vector_bytes);
        Ok(Self {
            reader,
            vector_start,
            vector_end,
        })
    }

    pub(crate) fn search(&self, ip_bytes: &[u8]) -> Result<String, XdbError> {
        self.reader.reset_io_count();
        let (s, e) = vector_slot_preloaded(&self.vector_start, &self.vector_end, ip_bytes);
        search_segment(&self.reader, ip_bytes, s, e)
    }

    pub(crate) fn io_count(&self) -> u32 {
        self.reader.io_count()
    }
}

/// File-backed reads, but the vector index is preloaded once at
/// construction. Every query skips the vector I/O and binary-searches
/// segments and reads the payload through the reader.
pub(crate) struct VectorIndexStrategy {
    reader: FileReader,
    vector_start: Vec<u32>,
    vector_end: Vec<u32>,
}

impl VectorIndexStrategy {
    pub(crate) fn open(path: &Path) -> Result<Self, XdbError> {
        let reader = FileReader::open(path)?;
        if reader.len() < HEADER_LEN + VECTOR_INDEX_LEN {
            return Err(XdbError::InvalidFormat);
        }
        let mut vector_bytes = vec![0u8; VECTOR_INDEX_LEN as usize];
        reader.read(HEADER_LEN, &mut vector_bytes)?;
        let (vector_start, vector_end) = decode_vector_index(&vector_bytes);
        reader.reset_io_count();
        Ok(Self {
            reader,
            vector_start,
            vector_end,
        })
    }

    pub(crate) fn search(&self, ip_bytes: &[u8]) -> Result<String, XdbError> {
        self.reader.reset_io_count();
        let (s, e) = vector_slot_preloaded(&self.vector_start, &self.vector_end, ip_bytes);
        search_segment(&self.reader, ip_bytes, s, e)
    }

    pub(crate) fn io_count(&self) -> u32 {
        self.reader.io_count()
    }
}

/// Nothing preloaded. Every query reads the vector slot, the binary-search
/// records, and the payload through the reader.
pub(crate) struct FileStrategy {
    reader: FileReader,
}

impl FileStrategy {
    pub(crate) fn open(path: &Path) -> Result<Self, XdbError> {
        let reader = FileReader::open(path)?;
        if reader.len() < HEADER_LEN {
            return Err(XdbError::InvalidFormat);
        }
        Ok(Self { reader })
    }

    pub(crate) fn search(&self, ip_bytes: &[u8]) -> Result<String, XdbError> {
        self.reader.reset_io_count();
        let (s, e) = vector_slot_via_reader(&self.reader, ip_bytes)?;
        search_segment(&self.reader, ip_bytes, s, e)
    }

    pub(crate) fn io_count(&self) -> u32 {
        self.reader.io_count()
    }
}
