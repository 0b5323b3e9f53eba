//! Protobuf wire form of a report.
//!
//! The schema, with field numbers:
//!
//! ```text
//! message Report {
//!   repeated File files = 1;
//!   repeated Diagnostic diagnostics = 2;
//! }
//! message File {
//!   string path = 1;
//!   string text = 2;
//! }
//! message Diagnostic {
//!   uint32 level = 1;            // 1=ICE 2=error 3=warning 4=remark
//!   string tag = 2;
//!   string message = 3;
//!   string in_file = 4;
//!   repeated string notes = 5;
//!   repeated string helps = 6;
//!   repeated string debugs = 7;
//!   repeated Annotation annotations = 8;
//! }
//! message Annotation {
//!   uint32 file_index = 1;
//!   uint64 start = 2;
//!   uint64 end = 3;
//!   string message = 4;
//!   bool primary = 5;
//! }
//! ```
//!
//! Annotated files are deduplicated by identity into the `files` table;
//! annotations refer to them by index. Decoding validates every span against
//! its file's length and restores a primary annotation if none was flagged.

use super::{Annotation, Diagnostic, Level, Report, tags};
use crate::source::File;

/// Failures while decoding a wire-form report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("unsupported wire type {0}")]
    BadWireType(u8),
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown diagnostic level {0}")]
    UnknownLevel(u64),
    #[error("annotation file index {0} out of range")]
    BadFileIndex(u64),
    #[error("annotation span {start}..{end} out of bounds for file of length {len}")]
    SpanOutOfBounds { start: u64, end: u64, len: usize },
}

const WIRE_VARINT: u8 = 0;
const WIRE_I64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_I32: u8 = 5;

/// Encodes a report into Protobuf wire bytes.
pub fn encode(report: &Report) -> Vec<u8> {
    let files = file_table(report);
    let mut out = Vec::new();
    for file in &files {
        let mut body = Vec::new();
        put_str(&mut body, 1, file.path());
        put_str(&mut body, 2, file.text());
        put_len_field(&mut out, 1, &body);
    }
    for diag in report.iter() {
        let body = encode_diagnostic(diag, &files);
        put_len_field(&mut out, 2, &body);
    }
    out
}

/// Decodes wire bytes produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Report, DecodeError> {
    let mut files = Vec::new();
    let mut raw_diags = Vec::new();

    let mut reader = Reader::new(bytes);
    while let Some((field, wire_type)) = reader.next_key()? {
        match (field, wire_type) {
            (1, WIRE_LEN) => {
                let body = reader.bytes()?;
                files.push(decode_file(body)?);
            }
            (2, WIRE_LEN) => {
                // file table entries may legally follow, so diagnostics are
                // decoded in a second pass
                raw_diags.push(reader.bytes()?);
            }
            _ => reader.skip(wire_type)?,
        }
    }

    let mut report = Report::new();
    for body in raw_diags {
        let diag = decode_diagnostic(body, &files)?;
        report.push(diag);
    }
    Ok(report)
}

fn file_table(report: &Report) -> Vec<File> {
    let mut files: Vec<File> = Vec::new();
    for diag in report.iter() {
        for ann in diag.annotations() {
            if let Some(file) = ann.span.file()
                && !files.iter().any(|f| f.same_file(file))
            {
                files.push(file.clone());
            }
        }
    }
    files
}

fn encode_diagnostic(diag: &Diagnostic, files: &[File]) -> Vec<u8> {
    let mut body = Vec::new();
    put_uint(&mut body, 1, diag.level() as u64);
    if let Some(tag) = diag.tag() {
        put_str(&mut body, 2, tag);
    }
    put_str(&mut body, 3, diag.message());
    if let Some(path) = diag.in_file() {
        put_str(&mut body, 4, path);
    }
    for note in diag.notes() {
        put_str(&mut body, 5, note);
    }
    for help in diag.helps() {
        put_str(&mut body, 6, help);
    }
    for debug in diag.debugs() {
        put_str(&mut body, 7, debug);
    }
    for ann in diag.annotations() {
        let Some(file) = ann.span.file() else {
            continue;
        };
        let index = files
            .iter()
            .position(|f| f.same_file(file))
            .expect("annotated file is in the table") as u64;
        let mut ann_body = Vec::new();
        put_uint(&mut ann_body, 1, index);
        put_uint(&mut ann_body, 2, ann.span.start() as u64);
        put_uint(&mut ann_body, 3, ann.span.end() as u64);
        if !ann.message.is_empty() {
            put_str(&mut ann_body, 4, &ann.message);
        }
        if ann.primary {
            put_uint(&mut ann_body, 5, 1);
        }
        put_len_field(&mut body, 8, &ann_body);
    }
    body
}

fn decode_file(bytes: &[u8]) -> Result<File, DecodeError> {
    let mut path = String::new();
    let mut text = String::new();
    let mut reader = Reader::new(bytes);
    while let Some((field, wire_type)) = reader.next_key()? {
        match (field, wire_type) {
            (1, WIRE_LEN) => path = reader.string()?,
            (2, WIRE_LEN) => text = reader.string()?,
            _ => reader.skip(wire_type)?,
        }
    }
    Ok(File::new(path, text))
}

fn decode_diagnostic(bytes: &[u8], files: &[File]) -> Result<Diagnostic, DecodeError> {
    let mut level = 0u64;
    let mut diag = Diagnostic::new(Level::Error, String::new(), 0);
    let mut reader = Reader::new(bytes);
    while let Some((field, wire_type)) = reader.next_key()? {
        match (field, wire_type) {
            (1, WIRE_VARINT) => level = reader.uint()?,
            (2, WIRE_LEN) => diag.tag = tags_lookup(&reader.string()?),
            (3, WIRE_LEN) => diag.message = reader.string()?,
            (4, WIRE_LEN) => diag.in_file = Some(reader.string()?),
            (5, WIRE_LEN) => diag.notes.push(reader.string()?),
            (6, WIRE_LEN) => diag.helps.push(reader.string()?),
            (7, WIRE_LEN) => diag.debugs.push(reader.string()?),
            (8, WIRE_LEN) => {
                let ann = decode_annotation(reader.bytes()?, files)?;
                diag.annotations.push(ann);
            }
            _ => reader.skip(wire_type)?,
        }
    }
    diag.level = Level::from_wire(level).ok_or(DecodeError::UnknownLevel(level))?;
    if !diag.annotations.is_empty() && diag.primary().is_none() {
        diag.annotations[0].primary = true;
    }
    Ok(diag)
}

fn decode_annotation(bytes: &[u8], files: &[File]) -> Result<Annotation, DecodeError> {
    let mut file_index = 0u64;
    let mut start = 0u64;
    let mut end = 0u64;
    let mut message = String::new();
    let mut primary = false;
    let mut reader = Reader::new(bytes);
    while let Some((field, wire_type)) = reader.next_key()? {
        match (field, wire_type) {
            (1, WIRE_VARINT) => file_index = reader.uint()?,
            (2, WIRE_VARINT) => start = reader.uint()?,
            (3, WIRE_VARINT) => end = reader.uint()?,
            (4, WIRE_LEN) => message = reader.string()?,
            (5, WIRE_VARINT) => primary = reader.uint()? != 0,
            _ => reader.skip(wire_type)?,
        }
    }
    let file = files
        .get(file_index as usize)
        .ok_or(DecodeError::BadFileIndex(file_index))?;
    if start > end || end > file.len() as u64 {
        return Err(DecodeError::SpanOutOfBounds {
            start,
            end,
            len: file.len(),
        });
    }
    Ok(Annotation {
        span: file.span(start as usize, end as usize),
        message,
        primary,
    })
}

/// Maps a decoded tag string back to its stable constant; unknown tags are
/// dropped rather than leaked into static storage.
fn tags_lookup(name: &str) -> Option<&'static str> {
    const ALL: &[&str] = &[
        tags::UNRECOGNIZED_TOKEN,
        tags::UNOPENED_DELIMITER,
        tags::UNCLOSED_DELIMITER,
        tags::UNTERMINATED_BLOCK_COMMENT,
        tags::UNTERMINATED_STRING,
        tags::INVALID_ESCAPE,
        tags::NON_ASCII_IDENT,
        tags::INTEGER_OVERFLOW,
        tags::INVALID_DEC_LITERAL,
        tags::INVALID_BIN_LITERAL,
        tags::INVALID_OCT_LITERAL,
        tags::INVALID_HEX_LITERAL,
        tags::INVALID_FLOAT_LITERAL,
    ];
    ALL.iter().copied().find(|t| *t == name)
}

// --- low-level wire helpers ---

fn put_uvarint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn put_key(out: &mut Vec<u8>, field: u32, wire_type: u8) {
    put_uvarint(out, ((field as u64) << 3) | wire_type as u64);
}

fn put_uint(out: &mut Vec<u8>, field: u32, value: u64) {
    put_key(out, field, WIRE_VARINT);
    put_uvarint(out, value);
}

fn put_str(out: &mut Vec<u8>, field: u32, value: &str) {
    put_key(out, field, WIRE_LEN);
    put_uvarint(out, value.len() as u64);
    out.extend_from_slice(value.as_bytes());
}

fn put_len_field(out: &mut Vec<u8>, field: u32, body: &[u8]) {
    put_key(out, field, WIRE_LEN);
    put_uvarint(out, body.len() as u64);
    out.extend_from_slice(body);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn next_key(&mut self) -> Result<Option<(u32, u8)>, DecodeError> {
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }
        let key = self.uint()?;
        Ok(Some(((key >> 3) as u32, (key & 0x7) as u8)))
    }

    fn uint(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = *self.bytes.get(self.pos).ok_or(DecodeError::Truncated)?;
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 64 {
                return Err(DecodeError::Truncated);
            }
        }
    }

    fn bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.uint()? as usize;
        let end = self.pos.checked_add(len).ok_or(DecodeError::Truncated)?;
        if end > self.bytes.len() {
            return Err(DecodeError::Truncated);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    fn skip(&mut self, wire_type: u8) -> Result<(), DecodeError> {
        match wire_type {
            WIRE_VARINT => {
                self.uint()?;
            }
            WIRE_I64 => self.advance(8)?,
            WIRE_LEN => {
                self.bytes()?;
            }
            WIRE_I32 => self.advance(4)?,
            other => return Err(DecodeError::BadWireType(other)),
        }
        Ok(())
    }

    fn advance(&mut self, n: usize) -> Result<(), DecodeError> {
        let end = self.pos.checked_add(n).ok_or(DecodeError::Truncated)?;
        if end > self.bytes.len() {
            return Err(DecodeError::Truncated);
        }
        self.pos = end;
        Ok(())
    }
}
