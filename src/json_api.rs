use crate::{
    api::Mp4Reader,
    boxes::BoxRef,
    fields::VersionFlags,
    known_boxes::KnownBox,
    options::ParseOptions,
    registry::{BoxValue, Registry},
    source::{ByteSource, read_slice},
};
use serde::Serialize;
use std::path::Path;

/// A JSON-serializable representation of a single box.
///
/// Designed for UIs and for the `--json` output of the `mp4tree` binary.
#[derive(Debug, Serialize)]
pub struct JsonBox {
    pub offset: u64,
    pub size: u64,
    pub depth: usize,
    pub payload_offset: u64,
    pub payload_size: u64,

    pub typ: String,
    /// "container", "full" or "leaf"
    pub kind: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<BoxValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<JsonBox>>,
}

/// Build the JSON tree for every top-level box of `reader`.
///
/// With `reg` set, boxes that have a decoder are decoded; a failed decode is
/// reported on that box and the walk carries on.
pub fn json_boxes<S: ByteSource>(
    reader: &Mp4Reader<S>,
    opts: &ParseOptions,
    reg: Option<&Registry>,
) -> Vec<JsonBox> {
    reader
        .boxes()
        .iter()
        .map(|b| build_json_for_box(reader, b, opts, reg))
        .collect()
}

/// Open `path`, parse it and return its box tree as JSON-ready values.
pub fn analyze_file(
    path: impl AsRef<Path>,
    opts: &ParseOptions,
    reg: Option<&Registry>,
) -> crate::Result<Vec<JsonBox>> {
    let reader = Mp4Reader::open_with(path, opts)?;
    Ok(json_boxes(&reader, opts, reg))
}

fn build_json_for_box<S: ByteSource>(
    reader: &Mp4Reader<S>,
    b: &BoxRef,
    opts: &ParseOptions,
    reg: Option<&Registry>,
) -> JsonBox {
    let kb = KnownBox::from(b.typ);
    let dr = b.payload_range();
    let is_container = opts.container_types.contains(&b.typ);

    // version/flags come straight from the first payload bytes, whatever the version
    let prefix = if kb.is_full_box() && dr.size() >= 4 {
        read_slice(reader.source(), dr.start, 4)
            .ok()
            .map(|p| VersionFlags::from_bytes([p[0], p[1], p[2], p[3]]))
    } else {
        None
    };

    let kind = if is_container {
        "container"
    } else if kb.is_full_box() {
        "full"
    } else {
        "leaf"
    };

    let (decoded, decode_error) = match reg.and_then(|r| reader.decode(b, r)) {
        Some(Ok(v)) => (Some(v), None),
        Some(Err(e)) => (None, Some(e.to_string())),
        None => (None, None),
    };

    let children = is_container.then(|| {
        b.children
            .iter()
            .map(|c| build_json_for_box(reader, c, opts, reg))
            .collect()
    });

    JsonBox {
        offset: b.offset,
        size: b.size,
        depth: b.depth,
        payload_offset: dr.start,
        payload_size: dr.size(),
        typ: b.typ.to_string(),
        kind: kind.to_string(),
        full_name: kb.full_name().to_string(),
        version: prefix.map(|vf| vf.version),
        flags: prefix.map(|vf| vf.flags),
        decoded,
        decode_error,
        children,
    }
}
