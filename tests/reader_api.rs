use mp4tree::boxes::{BoxHeader, FourCC};
use mp4tree::fields::Language;
use mp4tree::parser::write_box_header;
use mp4tree::{
    BoxValue, ByteSource, Error, FileSource, Mp4Reader, ParseOptions, StructuredData,
    analyze_file, default_registry, hex_range, json_boxes,
};
use serde_json::Value;
use std::io::Write;

fn bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    let hdr = BoxHeader { size: (8 + payload.len()) as u32, typ: FourCC(*typ) };
    write_box_header(&mut v, &hdr).unwrap();
    v.extend_from_slice(payload);
    v
}

fn mvhd_payload() -> Vec<u8> {
    let mut v = vec![0u8; 4];
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(&2u32.to_be_bytes());
    v.extend_from_slice(&1000u32.to_be_bytes());
    v.extend_from_slice(&5000u32.to_be_bytes());
    v.extend_from_slice(&[0u8; 80]);
    v
}

fn tkhd_payload(track_id: u32) -> Vec<u8> {
    let mut v = vec![0, 0, 0, 3];
    v.extend_from_slice(&[0u8; 8]);
    v.extend_from_slice(&track_id.to_be_bytes());
    v.extend_from_slice(&[0u8; 4]);
    v.extend_from_slice(&5000u32.to_be_bytes());
    v.extend_from_slice(&[0u8; 52]);
    v.extend_from_slice(&(640u32 << 16).to_be_bytes());
    v.extend_from_slice(&(480u32 << 16).to_be_bytes());
    v
}

fn mdhd_payload(lang: &str) -> Vec<u8> {
    let mut v = vec![0u8; 4];
    v.extend_from_slice(&[0u8; 8]);
    v.extend_from_slice(&90000u32.to_be_bytes());
    v.extend_from_slice(&450000u32.to_be_bytes());
    v.extend_from_slice(&Language::pack(lang).unwrap().to_be_bytes());
    v.extend_from_slice(&[0, 0]);
    v
}

/// ftyp, moov{ mvhd, trak{ tkhd, mdia{ mdhd } }, trak{ tkhd, mdia{ mdhd(truncated) } } }, mdat
fn make_movie() -> Vec<u8> {
    let trak1 = bx(
        b"trak",
        &[bx(b"tkhd", &tkhd_payload(1)), bx(b"mdia", &bx(b"mdhd", &mdhd_payload("eng")))].concat(),
    );
    let trak2 = bx(
        b"trak",
        &[bx(b"tkhd", &tkhd_payload(2)), bx(b"mdia", &bx(b"mdhd", &mdhd_payload("fra")[..10]))].concat(),
    );
    let moov = bx(b"moov", &[bx(b"mvhd", &mvhd_payload()), trak1, trak2].concat());
    let mut ftyp = b"isom".to_vec();
    ftyp.extend_from_slice(&512u32.to_be_bytes());
    ftyp.extend_from_slice(b"isomiso2avc1mp41");
    [bx(b"ftyp", &ftyp), moov, bx(b"mdat", &[0x55; 64])].concat()
}

fn temp_file(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn open_file_and_walk() {
    let data = make_movie();
    let file = temp_file(&data);

    let reader = Mp4Reader::open(file.path()).unwrap();
    assert_eq!(reader.source().len(), data.len() as u64);

    let top: Vec<String> = reader.boxes().iter().map(|b| b.typ.to_string()).collect();
    assert_eq!(top, ["ftyp", "moov", "mdat"]);

    let all: Vec<String> = reader.iter().map(|b| b.typ.to_string()).collect();
    assert_eq!(
        all,
        ["ftyp", "moov", "mvhd", "trak", "tkhd", "mdia", "mdhd", "trak", "tkhd", "mdia", "mdhd", "mdat"]
    );

    let mdat = reader.find(FourCC(*b"mdat")).unwrap();
    assert_eq!(reader.read_box_data(mdat).unwrap(), vec![0x55; 64]);
    assert_eq!(reader.find_all(FourCC(*b"trak")).count(), 2);
}

#[test]
fn file_and_memory_sources_agree() {
    let data = make_movie();
    let file = temp_file(&data);

    let from_file = Mp4Reader::from_source(FileSource::open(file.path()).unwrap(), &ParseOptions::default()).unwrap();
    let from_mem = Mp4Reader::from_source(data.as_slice(), &ParseOptions::default()).unwrap();
    assert_eq!(from_file.boxes(), from_mem.boxes());
}

#[test]
fn decode_failure_stays_local() {
    let data = make_movie();
    let reader = Mp4Reader::from_source(data, &ParseOptions::default()).unwrap();
    let reg = default_registry();

    let mut langs = Vec::new();
    let mut errors = 0;
    for b in reader.find_all(FourCC(*b"mdhd")) {
        match reader.decode(b, &reg) {
            Some(Ok(BoxValue::Structured(StructuredData::MediaHeader(m)))) => langs.push(m.language.as_str()),
            Some(Err(Error::Truncated { .. })) => errors += 1,
            other => panic!("unexpected {:?}", other),
        }
    }
    assert_eq!(langs, ["eng"]);
    assert_eq!(errors, 1);

    // tracks after the broken one still decode
    let ids: Vec<u32> = reader
        .find_all(FourCC(*b"tkhd"))
        .filter_map(|b| match reader.decode(b, &reg) {
            Some(Ok(BoxValue::Structured(StructuredData::TrackHeader(t)))) => Some(t.track_id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, [1, 2]);

    // no decoder for mdat
    assert!(reader.decode(reader.find(FourCC(*b"mdat")).unwrap(), &reg).is_none());
}

#[test]
fn concurrent_decoding_shares_one_reader() {
    let data = make_movie();
    let reader = Mp4Reader::from_source(data, &ParseOptions::default()).unwrap();
    let reg = default_registry();

    let decoded: Vec<bool> = std::thread::scope(|s| {
        let handles: Vec<_> = reader
            .iter()
            .map(|b| {
                let (reader, reg) = (&reader, &reg);
                s.spawn(move || matches!(reader.decode(b, reg), Some(Ok(_))))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // ftyp, mvhd, two tkhd and one good mdhd
    assert_eq!(decoded.iter().filter(|ok| **ok).count(), 5);
}

#[test]
fn json_tree_carries_decoded_records() {
    let data = make_movie();
    let file = temp_file(&data);
    let opts = ParseOptions::default();
    let reg = default_registry();

    let tree = analyze_file(file.path(), &opts, Some(&reg)).unwrap();
    let v: Value = serde_json::to_value(&tree).unwrap();

    assert_eq!(v[0]["typ"], "ftyp");
    assert_eq!(v[0]["kind"], "leaf");
    assert_eq!(v[0]["full_name"], "File Type Box");
    assert_eq!(v[0]["decoded"]["record"], "FileType");
    assert_eq!(v[0]["decoded"]["major_brand"], "isom");
    assert_eq!(v[0]["decoded"]["compatible_brands"][3], "mp41");

    let moov = &v[1];
    assert_eq!(moov["kind"], "container");
    assert_eq!(moov["payload_offset"], moov["offset"].as_u64().unwrap() + 8);

    let mvhd = &moov["children"][0];
    assert_eq!(mvhd["kind"], "full");
    assert_eq!(mvhd["version"], 0);
    assert_eq!(mvhd["decoded"]["times"]["timescale"], 1000);

    let mdhd = &moov["children"][1]["children"][1]["children"][0];
    assert_eq!(mdhd["depth"], 3);
    assert_eq!(mdhd["decoded"]["language"]["code"], "eng");

    let broken = &moov["children"][2]["children"][1]["children"][0];
    assert!(broken.get("decoded").is_none());
    assert!(broken["decode_error"].as_str().unwrap().contains("truncated"));

    assert_eq!(v[2]["typ"], "mdat");
    assert!(v[2].get("children").is_none());
}

#[test]
fn json_without_registry_has_no_decoded_values() {
    let data = make_movie();
    let opts = ParseOptions::default();
    let reader = Mp4Reader::from_source(data, &opts).unwrap();

    let v = serde_json::to_value(json_boxes(&reader, &opts, None)).unwrap();
    assert!(v[0].get("decoded").is_none());
    assert_eq!(v[1]["children"].as_array().unwrap().len(), 3);
}

#[test]
fn hex_range_reads_within_bounds() {
    let data = (0u8..64u8).collect::<Vec<_>>();

    let dump = hex_range(&data, 16, 16).expect("hex_range failed");

    assert_eq!(dump.offset, 16);
    assert_eq!(dump.length, 16);
    assert!(dump.hex.starts_with("00000010  10 11 12"));
}

#[test]
fn hex_range_clamps_to_eof() {
    let data = (0u8..32u8).collect::<Vec<_>>();
    let file = temp_file(&data);
    let src = FileSource::open(file.path()).unwrap();

    // ask past EOF
    let dump = hex_range(&src, 24, 32).expect("hex_range failed");
    assert_eq!(dump.offset, 24);
    assert_eq!(dump.length, 8);

    let dump = hex_range(&src, 40, 8).unwrap();
    assert_eq!(dump.length, 0);
    assert!(dump.hex.is_empty());
}

#[test]
fn json_reports_prefix_of_any_version() {
    // elst version 2 is not decodable, but its version and flags still show up
    let elst = bx(b"elst", &[2, 0x00, 0x01, 0x02, 0, 0, 0, 0]);
    let data = bx(b"moov", &bx(b"trak", &bx(b"edts", &elst)));
    let opts = ParseOptions::default();
    let reader = Mp4Reader::from_source(data, &opts).unwrap();

    let v = serde_json::to_value(json_boxes(&reader, &opts, Some(&default_registry()))).unwrap();
    let elst = &v[0]["children"][0]["children"][0]["children"][0];
    assert_eq!(elst["typ"], "elst");
    assert_eq!(elst["kind"], "full");
    assert_eq!(elst["version"], 2);
    assert_eq!(elst["flags"], 0x000102);
    assert!(elst.get("decode_error").is_none());
}
