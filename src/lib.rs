pub mod api;
pub mod boxes;
pub mod error;
pub mod fields;
pub mod json_api;
pub mod known_boxes;
pub mod options;
pub mod parser;
pub mod registry;
pub mod source;
pub mod util;

pub use api::{HexDump, Mp4Reader, hex_range};
pub use boxes::{BoxHeader, BoxRef, DataRange, FourCC, Walk};
pub use error::{Error, Result};
pub use json_api::{JsonBox, analyze_file, json_boxes};
pub use options::{ContainerTypes, ParseOptions, TilingPolicy};
pub use parser::{parse_boxes, parse_children, read_box_header, read_payload};
pub use registry::{BoxDecoder, BoxValue, Registry, StructuredData, default_registry};
pub use source::{ByteSource, FileSource};
