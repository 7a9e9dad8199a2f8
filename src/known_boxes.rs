use crate::boxes::FourCC;

/// Typed view over the box types this crate knows by name.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // File-level
    Ftyp,
    Moov,
    Mdat,
    Free,
    Skip,
    Wide,
    Uuid,

    // moov children
    Mvhd,
    Trak,
    Udta,

    // trak children
    Tkhd,
    Edts,
    Mdia,
    Tref,

    // edts children
    Elst,

    // mdia children
    Mdhd,
    Hdlr,
    Minf,

    // minf children
    Vmhd,
    Smhd,
    Dinf,
    Stbl,

    // dinf children
    Dref,

    // stbl children
    Stsd,
    Stts,
    Ctts,
    Stsc,
    Stsz,
    Stco,
    Co64,
    Stss,

    Unknown(FourCC),
}

impl KnownBox {
    /// Every named variant, in declaration order.
    pub const ALL: &'static [KnownBox] = &[
        KnownBox::Ftyp,
        KnownBox::Moov,
        KnownBox::Mdat,
        KnownBox::Free,
        KnownBox::Skip,
        KnownBox::Wide,
        KnownBox::Uuid,
        KnownBox::Mvhd,
        KnownBox::Trak,
        KnownBox::Udta,
        KnownBox::Tkhd,
        KnownBox::Edts,
        KnownBox::Mdia,
        KnownBox::Tref,
        KnownBox::Elst,
        KnownBox::Mdhd,
        KnownBox::Hdlr,
        KnownBox::Minf,
        KnownBox::Vmhd,
        KnownBox::Smhd,
        KnownBox::Dinf,
        KnownBox::Stbl,
        KnownBox::Dref,
        KnownBox::Stsd,
        KnownBox::Stts,
        KnownBox::Ctts,
        KnownBox::Stsc,
        KnownBox::Stsz,
        KnownBox::Stco,
        KnownBox::Co64,
        KnownBox::Stss,
    ];

    pub fn fourcc(&self) -> FourCC {
        let b: &[u8; 4] = match self {
            KnownBox::Ftyp => b"ftyp",
            KnownBox::Moov => b"moov",
            KnownBox::Mdat => b"mdat",
            KnownBox::Free => b"free",
            KnownBox::Skip => b"skip",
            KnownBox::Wide => b"wide",
            KnownBox::Uuid => b"uuid",
            KnownBox::Mvhd => b"mvhd",
            KnownBox::Trak => b"trak",
            KnownBox::Udta => b"udta",
            KnownBox::Tkhd => b"tkhd",
            KnownBox::Edts => b"edts",
            KnownBox::Mdia => b"mdia",
            KnownBox::Tref => b"tref",
            KnownBox::Elst => b"elst",
            KnownBox::Mdhd => b"mdhd",
            KnownBox::Hdlr => b"hdlr",
            KnownBox::Minf => b"minf",
            KnownBox::Vmhd => b"vmhd",
            KnownBox::Smhd => b"smhd",
            KnownBox::Dinf => b"dinf",
            KnownBox::Stbl => b"stbl",
            KnownBox::Dref => b"dref",
            KnownBox::Stsd => b"stsd",
            KnownBox::Stts => b"stts",
            KnownBox::Ctts => b"ctts",
            KnownBox::Stsc => b"stsc",
            KnownBox::Stsz => b"stsz",
            KnownBox::Stco => b"stco",
            KnownBox::Co64 => b"co64",
            KnownBox::Stss => b"stss",
            KnownBox::Unknown(cc) => return *cc,
        };
        FourCC(*b)
    }

    /// Human-readable box name, e.g. "Movie Header Box".
    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Ftyp => "File Type Box",
            KnownBox::Moov => "Movie Box",
            KnownBox::Mdat => "Media Data Box",
            KnownBox::Free => "Free Space Box",
            KnownBox::Skip => "Skip Box",
            KnownBox::Wide => "Wide Box",
            KnownBox::Uuid => "User Extension Box",
            KnownBox::Mvhd => "Movie Header Box",
            KnownBox::Trak => "Track Box",
            KnownBox::Udta => "User Data Box",
            KnownBox::Tkhd => "Track Header Box",
            KnownBox::Edts => "Edit Box",
            KnownBox::Mdia => "Media Box",
            KnownBox::Tref => "Track Reference Box",
            KnownBox::Elst => "Edit List Box",
            KnownBox::Mdhd => "Media Header Box",
            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Minf => "Media Information Box",
            KnownBox::Vmhd => "Video Media Header Box",
            KnownBox::Smhd => "Sound Media Header Box",
            KnownBox::Dinf => "Data Information Box",
            KnownBox::Stbl => "Sample Table Box",
            KnownBox::Dref => "Data Reference Box",
            KnownBox::Stsd => "Sample Description Box",
            KnownBox::Stts => "Decoding Time to Sample Box",
            KnownBox::Ctts => "Composition Time to Sample Box",
            KnownBox::Stsc => "Sample To Chunk Box",
            KnownBox::Stsz => "Sample Size Box",
            KnownBox::Stco => "Chunk Offset Box",
            KnownBox::Co64 => "64-bit Chunk Offset Box",
            KnownBox::Stss => "Sync Sample Box",
            KnownBox::Unknown(_) => "Unknown Box",
        }
    }

    /// Containers whose payload is nothing but child boxes.
    ///
    /// `udta` is left out: QuickTime writers pad it with a 32-bit zero
    /// terminator that does not parse as a box.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Moov
                | KnownBox::Trak
                | KnownBox::Mdia
                | KnownBox::Minf
                | KnownBox::Stbl
                | KnownBox::Edts
                | KnownBox::Dinf
        )
    }

    /// Boxes whose payload opens with the version + flags prefix.
    pub fn is_full_box(&self) -> bool {
        matches!(
            self,
            KnownBox::Mvhd
                | KnownBox::Tkhd
                | KnownBox::Elst
                | KnownBox::Mdhd
                | KnownBox::Hdlr
                | KnownBox::Vmhd
                | KnownBox::Smhd
                | KnownBox::Dref
                | KnownBox::Stsd
                | KnownBox::Stts
                | KnownBox::Ctts
                | KnownBox::Stsc
                | KnownBox::Stsz
                | KnownBox::Stco
                | KnownBox::Co64
                | KnownBox::Stss
        )
    }
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        KnownBox::ALL
            .iter()
            .copied()
            .find(|kb| kb.fourcc() == cc)
            .unwrap_or(KnownBox::Unknown(cc))
    }
}
