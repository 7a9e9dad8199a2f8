use mp4tree::boxes::FourCC;
use mp4tree::known_boxes::KnownBox;
use mp4tree::ContainerTypes;

#[test]
fn known_box_from_ftyp() {
    let cc = FourCC(*b"ftyp");
    let kb = KnownBox::from(cc);
    assert!(matches!(kb, KnownBox::Ftyp));
    assert_eq!(kb.full_name(), "File Type Box");
    assert_eq!(kb.fourcc(), cc);
}

#[test]
fn unknown_box_keeps_its_fourcc() {
    let cc = FourCC(*b"zzzz");
    let kb = KnownBox::from(cc);
    assert_eq!(kb, KnownBox::Unknown(cc));
    assert_eq!(kb.fourcc(), cc);
    assert_eq!(kb.full_name(), "Unknown Box");
}

#[test]
fn known_box_classifies_container() {
    let moov = KnownBox::from(FourCC(*b"moov"));
    assert!(moov.is_container());

    let ftyp = KnownBox::from(FourCC(*b"ftyp"));
    assert!(!ftyp.is_container());

    let udta = KnownBox::from(FourCC(*b"udta"));
    assert!(!udta.is_container());
}

#[test]
fn known_box_classifies_full_box() {
    let mvhd = KnownBox::from(FourCC(*b"mvhd"));
    assert!(mvhd.is_full_box());

    let mdat = KnownBox::from(FourCC(*b"mdat"));
    assert!(!mdat.is_full_box());
}

#[test]
fn default_containers_come_from_known_boxes() {
    let c = ContainerTypes::default();
    for t in [b"moov", b"trak", b"mdia", b"minf", b"stbl", b"edts", b"dinf"] {
        assert!(c.contains(&FourCC(*t)), "{}", FourCC(*t));
    }
    assert_eq!(c.len(), 7);

    let m = ContainerTypes::minimal();
    assert_eq!(m.len(), 1);
    assert!(m.contains(&FourCC(*b"moov")));
    assert!(!m.clone().without(FourCC(*b"moov")).contains(&FourCC(*b"moov")));
}
