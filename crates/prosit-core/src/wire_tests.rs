use crate::report::wire::{self, DecodeError};
use crate::report::{Level, Report, tags};
use crate::source::File;

fn sample_report() -> Report {
    let a = File::new("a.proto", "message A {}\n");
    let b = File::new("b.proto", "enum B {}\n");
    let mut report = Report::new();
    report
        .error("bad message")
        .snippet(a.span(0, 7), "the keyword")
        .snippet(b.span(0, 4), "conflicts here")
        .note("message names must be unique")
        .tag(tags::UNRECOGNIZED_TOKEN)
        .emit();
    report
        .warning("odd spacing")
        .snippet(a.span(8, 9), "")
        .help("run the formatter")
        .emit();
    report.remark("whole-file remark").in_file("c.proto").emit();
    report
}

#[test]
fn round_trip_preserves_diagnostics() {
    let report = sample_report();
    let bytes = wire::encode(&report);
    let decoded = wire::decode(&bytes).unwrap();

    assert_eq!(decoded.len(), report.len());
    for (old, new) in report.iter().zip(decoded.iter()) {
        assert_eq!(old.level(), new.level());
        assert_eq!(old.message(), new.message());
        assert_eq!(old.tag(), new.tag());
        assert_eq!(old.in_file(), new.in_file());
        assert_eq!(old.notes(), new.notes());
        assert_eq!(old.helps(), new.helps());
        assert_eq!(old.annotations().len(), new.annotations().len());
        for (oa, na) in old.annotations().iter().zip(new.annotations()) {
            assert_eq!(oa.span.start(), na.span.start());
            assert_eq!(oa.span.end(), na.span.end());
            assert_eq!(oa.message, na.message);
            assert_eq!(oa.primary, na.primary);
        }
    }
}

#[test]
fn decoded_files_carry_path_and_text() {
    let report = sample_report();
    let decoded = wire::decode(&wire::encode(&report)).unwrap();
    let ann = &decoded.iter().next().unwrap().annotations()[0];
    let file = ann.span.file().unwrap();
    assert_eq!(file.path(), "a.proto");
    assert_eq!(file.text(), "message A {}\n");
    assert_eq!(ann.span.text(), "message");
}

#[test]
fn files_are_deduplicated_by_identity() {
    let file = File::new("a.proto", "xxxx");
    let mut report = Report::new();
    report.error("one").snippet(file.span(0, 1), "").emit();
    report.error("two").snippet(file.span(2, 3), "").emit();
    let decoded = wire::decode(&wire::encode(&report)).unwrap();
    let first = decoded.iter().next().unwrap().annotations()[0]
        .span
        .file()
        .unwrap()
        .clone();
    let second = decoded.iter().nth(1).unwrap().annotations()[0]
        .span
        .file()
        .unwrap()
        .clone();
    assert!(first.same_file(&second));
}

#[test]
fn empty_report_round_trips() {
    let report = Report::new();
    let bytes = wire::encode(&report);
    assert!(bytes.is_empty());
    assert!(wire::decode(&bytes).unwrap().is_empty());
}

// hand-rolled wire helpers for crafting malformed inputs
fn uvarint(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let b = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(b);
            break;
        }
        out.push(b | 0x80);
    }
}

fn len_field(out: &mut Vec<u8>, field: u32, body: &[u8]) {
    uvarint(out, u64::from(field) << 3 | 2);
    uvarint(out, body.len() as u64);
    out.extend_from_slice(body);
}

fn uint_field(out: &mut Vec<u8>, field: u32, v: u64) {
    uvarint(out, u64::from(field) << 3);
    uvarint(out, v);
}

fn str_field(out: &mut Vec<u8>, field: u32, s: &str) {
    len_field(out, field, s.as_bytes());
}

#[test]
fn decode_restores_missing_primary_flag() {
    let mut file_body = Vec::new();
    str_field(&mut file_body, 1, "x.proto");
    str_field(&mut file_body, 2, "abcdef");

    let mut ann = Vec::new();
    uint_field(&mut ann, 1, 0);
    uint_field(&mut ann, 2, 1);
    uint_field(&mut ann, 3, 3);
    // no primary flag on the wire

    let mut diag = Vec::new();
    uint_field(&mut diag, 1, 2); // error
    str_field(&mut diag, 3, "msg");
    len_field(&mut diag, 8, &ann);

    let mut bytes = Vec::new();
    len_field(&mut bytes, 1, &file_body);
    len_field(&mut bytes, 2, &diag);

    let report = wire::decode(&bytes).unwrap();
    let decoded = report.iter().next().unwrap();
    assert_eq!(decoded.level(), Level::Error);
    assert!(decoded.annotations()[0].primary);
}

#[test]
fn decode_rejects_out_of_bounds_spans() {
    let mut file_body = Vec::new();
    str_field(&mut file_body, 1, "x.proto");
    str_field(&mut file_body, 2, "ab");

    let mut ann = Vec::new();
    uint_field(&mut ann, 1, 0);
    uint_field(&mut ann, 2, 1);
    uint_field(&mut ann, 3, 9);

    let mut diag = Vec::new();
    uint_field(&mut diag, 1, 2);
    len_field(&mut diag, 8, &ann);

    let mut bytes = Vec::new();
    len_field(&mut bytes, 1, &file_body);
    len_field(&mut bytes, 2, &diag);

    assert!(matches!(
        wire::decode(&bytes),
        Err(DecodeError::SpanOutOfBounds { start: 1, end: 9, len: 2 })
    ));
}

#[test]
fn decode_rejects_bad_file_index() {
    let mut ann = Vec::new();
    uint_field(&mut ann, 1, 5);

    let mut diag = Vec::new();
    uint_field(&mut diag, 1, 2);
    len_field(&mut diag, 8, &ann);

    let mut bytes = Vec::new();
    len_field(&mut bytes, 2, &diag);

    assert!(matches!(
        wire::decode(&bytes),
        Err(DecodeError::BadFileIndex(5))
    ));
}

#[test]
fn decode_rejects_unknown_level() {
    let mut diag = Vec::new();
    uint_field(&mut diag, 1, 9);
    str_field(&mut diag, 3, "msg");

    let mut bytes = Vec::new();
    len_field(&mut bytes, 2, &diag);

    assert!(matches!(
        wire::decode(&bytes),
        Err(DecodeError::UnknownLevel(9))
    ));
}

#[test]
fn decode_rejects_truncated_input() {
    let report = sample_report();
    let bytes = wire::encode(&report);
    assert!(matches!(
        wire::decode(&bytes[..bytes.len() - 3]),
        Err(DecodeError::Truncated)
    ));
}

#[test]
fn decode_skips_unknown_fields() {
    let mut diag = Vec::new();
    uint_field(&mut diag, 1, 3); // warning
    str_field(&mut diag, 3, "msg");
    uint_field(&mut diag, 200, 77); // unknown varint field
    str_field(&mut diag, 201, "future"); // unknown length field

    let mut bytes = Vec::new();
    len_field(&mut bytes, 2, &diag);
    uint_field(&mut bytes, 99, 1);

    let report = wire::decode(&bytes).unwrap();
    let decoded = report.iter().next().unwrap();
    assert_eq!(decoded.level(), Level::Warning);
    assert_eq!(decoded.message(), "msg");
}

#[test]
fn unknown_tags_are_dropped_not_leaked() {
    let mut diag = Vec::new();
    uint_field(&mut diag, 1, 2);
    str_field(&mut diag, 2, "not-a-known-tag");
    str_field(&mut diag, 3, "msg");

    let mut bytes = Vec::new();
    len_field(&mut bytes, 2, &diag);

    let report = wire::decode(&bytes).unwrap();
    assert_eq!(report.iter().next().unwrap().tag(), None);
}
