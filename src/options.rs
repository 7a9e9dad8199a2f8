use crate::boxes::FourCC;
use crate::known_boxes::KnownBox;
use std::collections::HashSet;

/// Box types whose payload is parsed as a sequence of child boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTypes {
    set: HashSet<FourCC>,
}

impl ContainerTypes {
    /// An empty set: every box is a leaf.
    pub fn empty() -> Self {
        Self { set: HashSet::new() }
    }

    /// Only the movie box.
    pub fn minimal() -> Self {
        Self::empty().with(FourCC(*b"moov"))
    }

    pub fn with(mut self, typ: FourCC) -> Self {
        self.set.insert(typ);
        self
    }

    pub fn without(mut self, typ: FourCC) -> Self {
        self.set.remove(&typ);
        self
    }

    pub fn contains(&self, typ: &FourCC) -> bool {
        self.set.contains(typ)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl Default for ContainerTypes {
    /// The movie-structure containers: moov, trak, mdia, minf, stbl, edts, dinf.
    fn default() -> Self {
        let set = KnownBox::ALL
            .iter()
            .filter(|kb| kb.is_container())
            .map(|kb| kb.fourcc())
            .collect();
        Self { set }
    }
}

impl FromIterator<FourCC> for ContainerTypes {
    fn from_iter<I: IntoIterator<Item = FourCC>>(iter: I) -> Self {
        Self { set: iter.into_iter().collect() }
    }
}

/// What to do when a child box extends past the end of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TilingPolicy {
    /// Keep the overshooting box and stop walking that level.
    #[default]
    Lenient,
    /// Fail with [`crate::Error::MalformedTree`].
    Strict,
}

/// Tree-building configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub container_types: ContainerTypes,
    pub tiling: TilingPolicy,
    /// Containers at or beyond this depth are kept as leaves.
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container_types(mut self, container_types: ContainerTypes) -> Self {
        self.container_types = container_types;
        self
    }

    pub fn with_tiling(mut self, tiling: TilingPolicy) -> Self {
        self.tiling = tiling;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            container_types: ContainerTypes::default(),
            tiling: TilingPolicy::default(),
            max_depth: 64,
        }
    }
}
