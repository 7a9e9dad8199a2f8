use crate::boxes::FourCC;
use crate::error::Result;
use crate::fields::{self, FileType, MediaHeader, MovieHeader, TrackHeader};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A value returned from a box decoder.
///
/// The built-in decoders return [`BoxValue::Structured`]; custom decoders may
/// also return a text summary or raw bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoxValue {
    Text(String),
    Bytes(Vec<u8>),
    Structured(StructuredData),
}

/// Records produced by the built-in decoders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record")]
pub enum StructuredData {
    /// File Type Box (ftyp)
    FileType(FileType),
    /// Movie Header Box (mvhd)
    MovieHeader(MovieHeader),
    /// Track Header Box (tkhd)
    TrackHeader(TrackHeader),
    /// Media Header Box (mdhd)
    MediaHeader(MediaHeader),
}

impl fmt::Display for BoxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxValue::Text(s) => write!(f, "{s}"),
            BoxValue::Bytes(b) => write!(f, "{} bytes", b.len()),
            BoxValue::Structured(d) => write!(f, "{d}"),
        }
    }
}

impl fmt::Display for StructuredData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuredData::FileType(d) => write!(
                f,
                "major_brand={} minor_version={} compatible_brands={:?}",
                d.major_brand, d.minor_version, d.compatible_brands
            ),
            StructuredData::MovieHeader(d) => write!(
                f,
                "version={} flags=0x{:06x} create={} modify={} timescale={} duration={}",
                d.version_flags.version,
                d.version_flags.flags,
                d.times.creation_time(),
                d.times.modification_time(),
                d.times.timescale(),
                d.times.duration()
            ),
            StructuredData::TrackHeader(d) => write!(
                f,
                "version={} flags=0x{:06x} create={} modify={} track_id={} duration={} size={}x{}",
                d.version_flags.version,
                d.version_flags.flags,
                d.creation_time,
                d.modification_time,
                d.track_id,
                d.duration,
                d.width as f32 / 65536.0,
                d.height as f32 / 65536.0
            ),
            StructuredData::MediaHeader(d) => write!(
                f,
                "version={} flags=0x{:06x} create={} modify={} timescale={} duration={} language={} (raw=0x{:04x})",
                d.version_flags.version,
                d.version_flags.flags,
                d.times.creation_time(),
                d.times.modification_time(),
                d.times.timescale(),
                d.times.duration(),
                d.language,
                d.language.raw
            ),
        }
    }
}

/// Trait for box decoders.
///
/// A decoder interprets the payload of one box type (the bytes after the
/// 8-byte header) and returns a [`BoxValue`].
pub trait BoxDecoder: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<BoxValue>;
}

impl<F> BoxDecoder for F
where
    F: Fn(&[u8]) -> Result<BoxValue> + Send + Sync,
{
    fn decode(&self, payload: &[u8]) -> Result<BoxValue> {
        self(payload)
    }
}

/// Registry of decoders keyed by box type.
///
/// The registry is immutable once constructed; use [`Registry::with_decoder`]
/// to build it fluently and pass it by reference to whatever walks the tree.
pub struct Registry {
    map: HashMap<FourCC, BoxDecoderEntry>,
}

struct BoxDecoderEntry {
    inner: Box<dyn BoxDecoder>,
    name: String,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added.
    ///
    /// `name` is human-readable and used only for logging.
    pub fn with_decoder(mut self, typ: FourCC, name: &str, dec: Box<dyn BoxDecoder>) -> Self {
        self.map.insert(
            typ,
            BoxDecoderEntry {
                inner: dec,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn contains(&self, typ: &FourCC) -> bool {
        self.map.contains_key(typ)
    }

    /// Try to decode a payload with the decoder registered for `typ`.
    ///
    /// Returns `None` if no decoder exists for the given type.
    pub fn decode(&self, typ: &FourCC, payload: &[u8]) -> Option<Result<BoxValue>> {
        self.map.get(typ).map(|d| {
            tracing::debug!(%typ, decoder = %d.name, len = payload.len(), "decoding payload");
            d.inner.decode(payload)
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------- Decoders ----------

pub struct FtypDecoder;

impl BoxDecoder for FtypDecoder {
    fn decode(&self, payload: &[u8]) -> Result<BoxValue> {
        let d = fields::parse_ftyp(payload)?;
        Ok(BoxValue::Structured(StructuredData::FileType(d)))
    }
}

pub struct MvhdDecoder;

impl BoxDecoder for MvhdDecoder {
    fn decode(&self, payload: &[u8]) -> Result<BoxValue> {
        let d = fields::parse_mvhd(payload)?;
        Ok(BoxValue::Structured(StructuredData::MovieHeader(d)))
    }
}

pub struct TkhdDecoder;

impl BoxDecoder for TkhdDecoder {
    fn decode(&self, payload: &[u8]) -> Result<BoxValue> {
        let d = fields::parse_tkhd(payload)?;
        Ok(BoxValue::Structured(StructuredData::TrackHeader(d)))
    }
}

pub struct MdhdDecoder;

impl BoxDecoder for MdhdDecoder {
    fn decode(&self, payload: &[u8]) -> Result<BoxValue> {
        let d = fields::parse_mdhd(payload)?;
        Ok(BoxValue::Structured(StructuredData::MediaHeader(d)))
    }
}

/// Registry with the built-in ftyp, mvhd, tkhd and mdhd decoders.
pub fn default_registry() -> Registry {
    Registry::new()
        .with_decoder(FourCC(*b"ftyp"), "ftyp", Box::new(FtypDecoder))
        .with_decoder(FourCC(*b"mvhd"), "mvhd", Box::new(MvhdDecoder))
        .with_decoder(FourCC(*b"tkhd"), "tkhd", Box::new(TkhdDecoder))
        .with_decoder(FourCC(*b"mdhd"), "mdhd", Box::new(MdhdDecoder))
}
