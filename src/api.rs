use crate::{
    boxes::{BoxRef, FourCC, Walk},
    error::Result,
    options::ParseOptions,
    parser::{parse_boxes, read_payload},
    registry::{BoxValue, Registry},
    source::{ByteSource, FileSource, read_slice},
    util::hex_dump,
};
use serde::Serialize;
use std::path::Path;

/// A parsed MP4/ISOBMFF source: the byte storage plus its box tree.
///
/// Payloads are not loaded up front. [`Mp4Reader::read_box_data`] and
/// [`Mp4Reader::decode`] go back to the source on every call.
///
/// # Example
/// ```no_run
/// use mp4tree::{Mp4Reader, default_registry};
///
/// let reader = Mp4Reader::open("video.mp4")?;
/// let reg = default_registry();
/// for b in reader.iter() {
///     println!("{}", b.summary());
///     if let Some(Ok(v)) = reader.decode(b, &reg) {
///         println!("    {v}");
///     }
/// }
/// # Ok::<(), mp4tree::Error>(())
/// ```
pub struct Mp4Reader<S> {
    source: S,
    boxes: Vec<BoxRef>,
}

impl Mp4Reader<FileSource> {
    /// Open a file and parse it with the default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &ParseOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, opts: &ParseOptions) -> Result<Self> {
        Self::from_source(FileSource::open(path)?, opts)
    }
}

impl<S: ByteSource> Mp4Reader<S> {
    pub fn from_source(source: S, opts: &ParseOptions) -> Result<Self> {
        let boxes = parse_boxes(&source, opts)?;
        tracing::debug!(top_level = boxes.len(), len = source.len(), "parsed box tree");
        Ok(Self { source, boxes })
    }

    /// Top-level boxes in file order.
    pub fn boxes(&self) -> &[BoxRef] {
        &self.boxes
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every box, depth-first pre-order.
    pub fn iter(&self) -> Walk<'_> {
        Walk::new(&self.boxes)
    }

    /// First box of type `typ` in depth-first order.
    pub fn find(&self, typ: FourCC) -> Option<&BoxRef> {
        self.iter().find(|b| b.typ == typ)
    }

    /// Boxes of type `typ`, depth-first order.
    pub fn find_all(&self, typ: FourCC) -> impl Iterator<Item = &BoxRef> + '_ {
        self.iter().filter(move |b| b.typ == typ)
    }

    /// Raw payload bytes of `b`.
    pub fn read_box_data(&self, b: &BoxRef) -> Result<Vec<u8>> {
        read_payload(&self.source, b)
    }

    /// Read and decode `b`'s payload with the decoder registered for its type.
    ///
    /// Returns `None` when the registry has no decoder for the type. A read
    /// or decode failure only concerns this box.
    pub fn decode(&self, b: &BoxRef, reg: &Registry) -> Option<Result<BoxValue>> {
        if !reg.contains(&b.typ) {
            return None;
        }
        let payload = match self.read_box_data(b) {
            Ok(p) => p,
            Err(e) => return Some(Err(e)),
        };
        reg.decode(&b.typ, &payload)
    }

    /// Hex-dump up to `max_len` bytes starting at `offset`, clamped to the
    /// end of the source.
    pub fn hex_range(&self, offset: u64, max_len: u64) -> Result<HexDump> {
        hex_range(&self.source, offset, max_len)
    }
}

/// Result of a hex dump operation containing the formatted hex output.
#[derive(Debug, Serialize)]
pub struct HexDump {
    /// Starting offset of the dumped data
    pub offset: u64,
    /// Actual number of bytes that were read and dumped
    pub length: u64,
    /// Formatted hex dump string with addresses and ASCII representation
    pub hex: String,
}

/// Hex-dump a range of bytes from a source.
///
/// Never reads past the end: if `offset + max_len` goes beyond the source,
/// the returned length is smaller than `max_len`.
pub fn hex_range<S: ByteSource + ?Sized>(src: &S, offset: u64, max_len: u64) -> Result<HexDump> {
    let available = src.len().saturating_sub(offset);
    let to_read = available.min(max_len);

    if to_read == 0 {
        return Ok(HexDump {
            offset,
            length: 0,
            hex: String::new(),
        });
    }

    let data = read_slice(src, offset, to_read)?;
    Ok(HexDump {
        offset,
        length: to_read,
        hex: hex_dump(&data, offset),
    })
}
