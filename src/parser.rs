use crate::boxes::{BOX_HEADER_SIZE, BoxHeader, BoxRef, DataRange, FourCC};
use crate::error::{Error, Result};
use crate::options::{ParseOptions, TilingPolicy};
use crate::source::{ByteSource, read_exact_at, read_slice};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::Write;

/*
    +-----------+-----------+
    | size (4)  | type (4)  |  header = 8 bytes
    +-----------+-----------+
    |      payload (N)      |
    +-----------------------+
    size = 8 + N
*/

/// Read the 8-byte box header at `offset`.
pub fn read_box_header<S: ByteSource + ?Sized>(src: &S, offset: u64) -> Result<BoxHeader> {
    let mut buf = [0u8; BOX_HEADER_SIZE as usize];
    read_exact_at(src, &mut buf, offset)?;
    let hdr = decode_box_header(&buf);
    tracing::trace!(offset, typ = %hdr.typ, size = hdr.size, "box header");

    // size 0 (to end of parent) and 1 (64-bit largesize) are not supported
    if (hdr.size as u64) < BOX_HEADER_SIZE {
        return Err(Error::HeaderTooSmall { offset, size: hdr.size });
    }
    Ok(hdr)
}

pub fn decode_box_header(buf: &[u8; 8]) -> BoxHeader {
    BoxHeader {
        size: BigEndian::read_u32(&buf[0..4]),
        typ: FourCC([buf[4], buf[5], buf[6], buf[7]]),
    }
}

impl BoxHeader {
    pub fn encode(&self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        BigEndian::write_u32(&mut buf[0..4], self.size);
        buf[4..8].copy_from_slice(&self.typ.0);
        buf
    }
}

pub fn write_box_header<W: Write>(w: &mut W, hdr: &BoxHeader) -> std::io::Result<()> {
    w.write_u32::<BigEndian>(hdr.size)?;
    w.write_all(&hdr.typ.0)
}

/// Parse every box in the source, starting at depth 0.
pub fn parse_boxes<S: ByteSource + ?Sized>(src: &S, opts: &ParseOptions) -> Result<Vec<BoxRef>> {
    parse_children(src, DataRange::new(0, src.len()), 0, opts)
}

/// Walk `range` as a run of sibling boxes, recursing into container types.
///
/// Stops at the first header that fails to read: once one size is wrong the
/// remaining box boundaries cannot be recovered.
pub fn parse_children<S: ByteSource + ?Sized>(
    src: &S,
    range: DataRange,
    depth: usize,
    opts: &ParseOptions,
) -> Result<Vec<BoxRef>> {
    let mut kids = Vec::new();
    let mut pos = range.start;
    while pos < range.end {
        let h = read_box_header(src, pos)?;
        let size = h.size as u64;
        let box_end = pos + size;

        if box_end > range.end {
            match opts.tiling {
                TilingPolicy::Strict => {
                    return Err(Error::MalformedTree {
                        typ: h.typ,
                        offset: pos,
                        end: box_end,
                        parent_end: range.end,
                    });
                }
                TilingPolicy::Lenient => {
                    tracing::warn!(
                        typ = %h.typ,
                        offset = pos,
                        end = box_end,
                        parent_end = range.end,
                        "box overshoots its enclosing range"
                    );
                }
            }
        }

        let children = if opts.container_types.contains(&h.typ) {
            if depth >= opts.max_depth {
                tracing::warn!(typ = %h.typ, offset = pos, depth, "max depth reached, not descending");
                Vec::new()
            } else {
                // an overshooting container only gets the bytes its parent owns
                let payload = DataRange::new(pos + BOX_HEADER_SIZE, box_end.min(range.end));
                parse_children(src, payload, depth + 1, opts)?
            }
        } else {
            Vec::new()
        };

        tracing::debug!(typ = %h.typ, offset = pos, size, depth, children = children.len(), "parsed box");
        kids.push(BoxRef {
            typ: h.typ,
            size,
            offset: pos,
            depth,
            children,
        });
        pos = box_end;
    }
    Ok(kids)
}

/// Read the payload bytes of `b` (everything after its header).
pub fn read_payload<S: ByteSource + ?Sized>(src: &S, b: &BoxRef) -> Result<Vec<u8>> {
    let dr = b.payload_range();
    read_slice(src, dr.start, dr.size())
}
