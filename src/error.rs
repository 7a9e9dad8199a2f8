use crate::boxes::FourCC;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("short read at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead { offset: u64, wanted: u64, got: u64 },
    #[error("box at offset {offset} declares size {size}, smaller than its 8-byte header")]
    HeaderTooSmall { offset: u64, size: u32 },
    #[error("{typ}: payload truncated, need {need} bytes, have {have}")]
    Truncated { typ: FourCC, need: usize, have: usize },
    #[error("{typ}: unsupported full box version {version}")]
    UnsupportedVersion { typ: FourCC, version: u8 },
    #[error("box {typ} at offset {offset} ends at {end}, past its parent's end {parent_end}")]
    MalformedTree {
        typ: FourCC,
        offset: u64,
        end: u64,
        parent_end: u64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
