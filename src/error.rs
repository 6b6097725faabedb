use thiserror::Error;

/// Errors surfaced by the xdb reader, cache strategies and searcher façade.
#[derive(Error, Debug)]
pub enum XdbError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("invalid xdb format")]
    InvalidFormat,
    #[error("corrupt vector index slot (e_ptr < s_ptr)")]
    CorruptIndex,
    #[error("ip byte length must be 4 or 16, got {0}")]
    InvalidIpLength(usize),
    #[error("region payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("IP parse error")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("searcher has been disposed")]
    Disposed,
}
