//! Builds synthetic xdb byte buffers for tests: a zeroed 256-byte header, a
//! 256x256 vector index, and one or more populated slots of sorted segment
//! records pointing at UTF-8 payloads. Not a general-purpose xdb writer —
//! just enough to exercise the reader/cache/searcher core against known
//! layouts.

pub const HEADER_LEN: usize = 256;
pub const VECTOR_INDEX_LEN: usize = 256 * 256 * 8;

pub struct Slot {
    pub row: u8,
    pub col: u8,
    /// (start_ip, end_ip, payload) in query (network) byte order; the
    /// builder re-encodes start/end into on-disk order per family.
    pub records: Vec<(Vec<u8>, Vec<u8>, &'static str)>,
}

fn encode_ip(bytes: &[u8], ip_len: usize) -> Vec<u8> {
    if ip_len == 4 {
        bytes.iter().rev().cloned().collect()
    } else {
        bytes.to_vec()
    }
}

pub fn build_xdb(ip_len: usize, slots: Vec<Slot>) -> Vec<u8> {
    let mut out = vec![0u8; HEADER_LEN + VECTOR_INDEX_LEN];
    let mut body: Vec<u8> = Vec::new();
    let index_size = 2 * ip_len + 6;

    for slot in &slots {
        let seg_start = HEADER_LEN + VECTOR_INDEX_LEN + body.len();
        let seg_end = seg_start + slot.records.len() * index_size;

        let mut records_bytes = Vec::new();
        let mut payload_section: Vec<u8> = Vec::new();
        for (sip, eip, payload) in &slot.records {
            let stored_sip = encode_ip(sip, ip_len);
            let stored_eip = encode_ip(eip, ip_len);
            assert_eq!(stored_sip.len(), ip_len);
            assert_eq!(stored_eip.len(), ip_len);

            let payload_bytes = payload.as_bytes();
            let data_ptr = (seg_end + payload_section.len()) as u32;
            let data_len = payload_bytes.len() as u16;

            records_bytes.extend_from_slice(&stored_sip);
            records_bytes.extend_from_slice(&stored_eip);
            records_bytes.extend_from_slice(&data_len.to_le_bytes());
            records_bytes.extend_from_slice(&data_ptr.to_le_bytes());

            payload_section.extend_from_slice(payload_bytes);
        }

        body.extend_from_slice(&records_bytes);
        body.extend_from_slice(&payload_section);

        let idx = slot.row as usize * 256 + slot.col as usize;
        let vec_off = HEADER_LEN + idx * 8;
        out[vec_off..vec_off + 4].copy_from_slice(&(seg_start as u32).to_le_bytes());
        out[vec_off + 4..vec_off + 8].copy_from_slice(&(seg_end as u32).to_le_bytes());
    }

    out.extend_from_slice(&body);
    out
}

pub fn ipv4(a: u8, b: u8, c: u8, d: u8) -> Vec<u8> {
    vec![a, b, c, d]
}

pub fn ipv6_from_str(s: &str) -> Vec<u8> {
    use std::net::Ipv6Addr;
    use std::str::FromStr;
    Ipv6Addr::from_str(s).unwrap().octets().to_vec()
}
