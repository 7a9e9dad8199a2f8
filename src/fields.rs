//! Record types for the well-known header boxes and the functions that
//! decode them from a box payload (the bytes after the 8-byte header).
//!
//! Every decoder checks bounds up front and reports a short payload as
//! [`Error::Truncated`]; none of them index past the end of the input.

use crate::boxes::FourCC;
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;
use std::fmt;

/// Bounds-checked big-endian reads over one box payload.
struct Fields<'a> {
    typ: FourCC,
    buf: &'a [u8],
}

impl<'a> Fields<'a> {
    fn new(typ: &[u8; 4], buf: &'a [u8]) -> Self {
        Self { typ: FourCC(*typ), buf }
    }

    fn need(&self, need: usize) -> Result<()> {
        if self.buf.len() < need {
            return Err(Error::Truncated { typ: self.typ, need, have: self.buf.len() });
        }
        Ok(())
    }

    fn bytes(&self, at: usize, len: usize) -> Result<&'a [u8]> {
        self.need(at + len)?;
        Ok(&self.buf[at..at + len])
    }

    fn u16_at(&self, at: usize) -> Result<u16> {
        Ok(BigEndian::read_u16(self.bytes(at, 2)?))
    }

    fn u32_at(&self, at: usize) -> Result<u32> {
        Ok(BigEndian::read_u32(self.bytes(at, 4)?))
    }

    fn u64_at(&self, at: usize) -> Result<u64> {
        Ok(BigEndian::read_u64(self.bytes(at, 8)?))
    }

    fn fourcc_at(&self, at: usize) -> Result<FourCC> {
        let b = self.bytes(at, 4)?;
        Ok(FourCC([b[0], b[1], b[2], b[3]]))
    }
}

// ---------- ftyp ----------

/// File Type Box (`ftyp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileType {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

/// A trailing group shorter than four bytes is ignored.
pub fn parse_ftyp(data: &[u8]) -> Result<FileType> {
    let f = Fields::new(b"ftyp", data);
    let major_brand = f.fourcc_at(0)?;
    let minor_version = f.u32_at(4)?;
    let compatible_brands = data[8..]
        .chunks_exact(4)
        .map(|c| FourCC([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(FileType { major_brand, minor_version, compatible_brands })
}

// ---------- version + flags ----------

/// The 4-byte prefix of a full box: 1 byte version, 24 bits of flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionFlags {
    pub version: u8,
    pub flags: u32,
}

impl VersionFlags {
    pub const SIZE: usize = 4;

    /// Split the prefix without judging the version.
    pub fn from_bytes(b: [u8; 4]) -> Self {
        VersionFlags {
            version: b[0],
            flags: ((b[1] as u32) << 16) | ((b[2] as u32) << 8) | (b[3] as u32),
        }
    }
}

fn parse_version_flags(f: &Fields<'_>) -> Result<VersionFlags> {
    let b = f.bytes(0, VersionFlags::SIZE)?;
    let vf = VersionFlags::from_bytes([b[0], b[1], b[2], b[3]]);
    if vf.version > 1 {
        return Err(Error::UnsupportedVersion { typ: f.typ, version: vf.version });
    }
    Ok(vf)
}

pub fn parse_full_box_prefix(typ: FourCC, data: &[u8]) -> Result<VersionFlags> {
    parse_version_flags(&Fields { typ, buf: data })
}

// ---------- shared mvhd/mdhd timestamps ----------

/// Creation/modification time, timescale and duration as laid out in
/// `mvhd` and `mdhd`. The version byte picks the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout")]
pub enum HeaderTimes {
    V0 {
        creation_time: u32,
        modification_time: u32,
        timescale: u32,
        duration: u32,
    },
    V1 {
        creation_time: u64,
        modification_time: u64,
        timescale: u32,
        duration: u64,
    },
}

impl HeaderTimes {
    /// Payload offset just past the timestamp block (prefix included).
    pub fn end_offset(&self) -> usize {
        match self {
            HeaderTimes::V0 { .. } => 20,
            HeaderTimes::V1 { .. } => 32,
        }
    }

    pub fn creation_time(&self) -> u64 {
        match *self {
            HeaderTimes::V0 { creation_time, .. } => creation_time as u64,
            HeaderTimes::V1 { creation_time, .. } => creation_time,
        }
    }

    pub fn modification_time(&self) -> u64 {
        match *self {
            HeaderTimes::V0 { modification_time, .. } => modification_time as u64,
            HeaderTimes::V1 { modification_time, .. } => modification_time,
        }
    }

    pub fn timescale(&self) -> u32 {
        match *self {
            HeaderTimes::V0 { timescale, .. } | HeaderTimes::V1 { timescale, .. } => timescale,
        }
    }

    pub fn duration(&self) -> u64 {
        match *self {
            HeaderTimes::V0 { duration, .. } => duration as u64,
            HeaderTimes::V1 { duration, .. } => duration,
        }
    }

    /// Duration in seconds, or `None` when the timescale is zero.
    pub fn duration_seconds(&self) -> Option<f64> {
        match self.timescale() {
            0 => None,
            ts => Some(self.duration() as f64 / ts as f64),
        }
    }
}

fn parse_header_times(f: &Fields<'_>, vf: VersionFlags) -> Result<HeaderTimes> {
    let at = VersionFlags::SIZE;
    if vf.version == 0 {
        f.need(20)?;
        Ok(HeaderTimes::V0 {
            creation_time: f.u32_at(at)?,
            modification_time: f.u32_at(at + 4)?,
            timescale: f.u32_at(at + 8)?,
            duration: f.u32_at(at + 12)?,
        })
    } else {
        f.need(32)?;
        Ok(HeaderTimes::V1 {
            creation_time: f.u64_at(at)?,
            modification_time: f.u64_at(at + 8)?,
            timescale: f.u32_at(at + 16)?,
            duration: f.u64_at(at + 20)?,
        })
    }
}

// ---------- mvhd ----------

/// Movie Header Box (`mvhd`). Rate, volume, matrix and next track ID are
/// not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovieHeader {
    #[serde(flatten)]
    pub version_flags: VersionFlags,
    pub times: HeaderTimes,
}

pub fn parse_mvhd(data: &[u8]) -> Result<MovieHeader> {
    let f = Fields::new(b"mvhd", data);
    let version_flags = parse_version_flags(&f)?;
    let times = parse_header_times(&f, version_flags)?;
    Ok(MovieHeader { version_flags, times })
}

// ---------- tkhd ----------

/// Track Header Box (`tkhd`). Width and height are the raw 16.16
/// fixed-point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackHeader {
    #[serde(flatten)]
    pub version_flags: VersionFlags,
    pub creation_time: u64,
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub width: u32,
    pub height: u32,
}

impl TrackHeader {
    pub fn width_pixels(&self) -> u32 {
        self.width >> 16
    }

    pub fn height_pixels(&self) -> u32 {
        self.height >> 16
    }
}

// reserved[2], layer, alternate_group, volume, reserved, matrix[9]
const TKHD_SKIPPED: usize = 4 * 2 + 2 + 2 + 2 + 2 + 4 * 9;

pub fn parse_tkhd(data: &[u8]) -> Result<TrackHeader> {
    let f = Fields::new(b"tkhd", data);
    let version_flags = parse_version_flags(&f)?;
    let at = VersionFlags::SIZE;

    // creation, modification, track_id, reserved(4), duration
    let (creation_time, modification_time, track_id, duration, last) = if version_flags.version == 0 {
        f.need(24 + TKHD_SKIPPED + 8)?;
        (
            f.u32_at(at)? as u64,
            f.u32_at(at + 4)? as u64,
            f.u32_at(at + 8)?,
            f.u32_at(at + 16)? as u64,
            24,
        )
    } else {
        f.need(36 + TKHD_SKIPPED + 8)?;
        (
            f.u64_at(at)?,
            f.u64_at(at + 8)?,
            f.u32_at(at + 16)?,
            f.u64_at(at + 24)?,
            36,
        )
    };

    let dims = last + TKHD_SKIPPED;
    Ok(TrackHeader {
        version_flags,
        creation_time,
        modification_time,
        track_id,
        duration,
        width: f.u32_at(dims)?,
        height: f.u32_at(dims + 4)?,
    })
}

// ---------- mdhd ----------

/// ISO-639-2/T language code packed as three 5-bit letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: [u8; 3],
    pub raw: u16,
}

impl Language {
    /// Unpack `0 aaaaa bbbbb ccccc`, adding 0x60 to each letter.
    pub fn from_bytes(b: [u8; 2]) -> Self {
        let code = [
            ((b[0] >> 2) & 0x1F) + 0x60,
            (((b[0] & 0x03) << 3) | (b[1] >> 5)) + 0x60,
            (b[1] & 0x1F) + 0x60,
        ];
        Self { code, raw: u16::from_be_bytes(b) }
    }

    pub fn from_raw(raw: u16) -> Self {
        Self::from_bytes(raw.to_be_bytes())
    }

    /// Pack a three-letter code. Only characters in `0x60..=0x7F` fit.
    pub fn pack(code: &str) -> Option<u16> {
        let b = code.as_bytes();
        if b.len() != 3 || b.iter().any(|c| !(0x60..=0x7F).contains(c)) {
            return None;
        }
        let v = b.iter().fold(0u16, |acc, &c| (acc << 5) | (c - 0x60) as u16);
        Some(v)
    }

    pub fn as_str(&self) -> String {
        self.code.iter().map(|&c| c as char).collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = s.serialize_struct("Language", 2)?;
        st.serialize_field("code", &self.as_str())?;
        st.serialize_field("raw", &self.raw)?;
        st.end()
    }
}

/// Media Header Box (`mdhd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaHeader {
    #[serde(flatten)]
    pub version_flags: VersionFlags,
    pub times: HeaderTimes,
    pub language: Language,
}

pub fn parse_mdhd(data: &[u8]) -> Result<MediaHeader> {
    let f = Fields::new(b"mdhd", data);
    let version_flags = parse_version_flags(&f)?;
    let times = parse_header_times(&f, version_flags)?;
    let raw = f.u16_at(times.end_offset())?;
    Ok(MediaHeader {
        version_flags,
        times,
        language: Language::from_raw(raw),
    })
}
