use serde::{Serialize, Serializer};
use std::fmt;

/// Size of the compact box header: 32-bit size followed by the 4CC.
pub const BOX_HEADER_SIZE: u64 = 8;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl From<[u8; 4]> for FourCC { fn from(b: [u8; 4]) -> Self { FourCC(b) } }
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.as_str_lossy())
    }
}

/// Half-open byte interval `[start, end)` within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DataRange {
    pub start: u64,
    pub end: u64,
}

impl DataRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &DataRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// The 8-byte box header as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u32,   // total size including header
    pub typ: FourCC,
}

/// One parsed box. Immutable once the tree builder hands it out; children
/// are owned by value and there is no link back to the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxRef {
    pub typ: FourCC,
    pub size: u64,
    pub offset: u64,
    pub depth: usize,
    pub children: Vec<BoxRef>,
}

impl BoxRef {
    /// Byte range of the payload, i.e. everything after the 8-byte header.
    pub fn payload_range(&self) -> DataRange {
        DataRange {
            start: self.offset + BOX_HEADER_SIZE,
            end: self.offset + self.size,
        }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    /// Depth-first, pre-order walk starting at (and including) this box.
    pub fn iter(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// One-line summary: `box moov @32: data ~ [40 (+1000), 1040)`.
    pub fn summary(&self) -> String {
        let dr = self.payload_range();
        format!(
            "box {} @{}: data ~ [{} (+{}), {})",
            self.typ,
            self.offset,
            dr.start,
            dr.size(),
            dr.end
        )
    }
}

/// Depth-first pre-order iterator over a forest of boxes.
pub struct Walk<'a> {
    stack: Vec<&'a BoxRef>,
}

impl<'a> Walk<'a> {
    pub fn new(roots: &'a [BoxRef]) -> Self {
        Walk { stack: roots.iter().rev().collect() }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a BoxRef;

    fn next(&mut self) -> Option<Self::Item> {
        let b = self.stack.pop()?;
        self.stack.extend(b.children.iter().rev());
        Some(b)
    }
}
