// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object serialisation — the byte-level syntax of PDF values and indirect
// objects (ISO 32000-1 §7.3).

use super::date::encode_date;
use super::object::{Dictionary, Name, ObjRef, PdfObject, PdfString, Stream, StringFormat};

/// Append `n g obj ... endobj` for one indirect object.
pub fn write_indirect(out: &mut Vec<u8>, reference: ObjRef, object: &PdfObject) {
    out.extend_from_slice(format!("{} {} obj\n", reference.number, reference.generation).as_bytes());
    write_object(out, object);
    out.extend_from_slice(b"\nendobj\n");
}

/// Append the serialised form of a value.
pub fn write_object(out: &mut Vec<u8>, object: &PdfObject) {
    match object {
        PdfObject::Null => out.extend_from_slice(b"null"),
        PdfObject::Boolean(value) => {
            let keyword: &[u8] = if *value { b"true" } else { b"false" };
            out.extend_from_slice(keyword);
        }
        PdfObject::Integer(value) => out.extend_from_slice(value.to_string().as_bytes()),
        PdfObject::Real(value) => out.extend_from_slice(format_real(*value).as_bytes()),
        PdfObject::String(string) => write_string(out, string),
        PdfObject::Name(name) => write_name(out, name),
        PdfObject::Date(date) => write_string(out, &PdfString::literal(encode_date(date))),
        PdfObject::Array(items) => {
            out.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(b' ');
                }
                write_object(out, item);
            }
            out.push(b']');
        }
        PdfObject::Dictionary(dict) => write_dictionary(out, dict),
        PdfObject::Stream(stream) => write_stream(out, stream),
        PdfObject::Reference(reference) => out.extend_from_slice(
            format!("{} {} R", reference.number, reference.generation).as_bytes(),
        ),
    }
}

fn write_dictionary(out: &mut Vec<u8>, dict: &Dictionary) {
    out.extend_from_slice(b"<<");
    for (key, value) in dict.iter() {
        out.push(b' ');
        write_name(out, key);
        out.push(b' ');
        write_object(out, value);
    }
    out.extend_from_slice(b" >>");
}

/// `/Length` is always rewritten from the actual content.
fn write_stream(out: &mut Vec<u8>, stream: &Stream) {
    let mut dict = stream.dict.clone();
    dict.set("Length", stream.content.len() as i64);
    write_dictionary(out, &dict);
    out.extend_from_slice(b"\nstream\n");
    out.extend_from_slice(&stream.content);
    out.extend_from_slice(b"\nendstream");
}

/// Regular characters are written as-is; whitespace, delimiters, `#`, and
/// bytes outside the printable range become `#xx` (lowercase hex).
pub fn write_name(out: &mut Vec<u8>, name: &Name) {
    out.push(b'/');
    for &byte in name.as_bytes() {
        let regular = (0x21..=0x7e).contains(&byte)
            && !matches!(
                byte,
                b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#'
            );
        if regular {
            out.push(byte);
        } else {
            out.extend_from_slice(format!("#{byte:02x}").as_bytes());
        }
    }
}

pub fn write_string(out: &mut Vec<u8>, string: &PdfString) {
    match string.format() {
        StringFormat::Hexadecimal => {
            out.push(b'<');
            out.extend_from_slice(hex::encode(string.as_bytes()).as_bytes());
            out.push(b'>');
        }
        StringFormat::Literal => {
            out.push(b'(');
            for &byte in string.as_bytes() {
                match byte {
                    b'(' | b')' | b'\\' => {
                        out.push(b'\\');
                        out.push(byte);
                    }
                    b'\n' => out.extend_from_slice(b"\\n"),
                    b'\r' => out.extend_from_slice(b"\\r"),
                    b'\t' => out.extend_from_slice(b"\\t"),
                    0x08 => out.extend_from_slice(b"\\b"),
                    0x0c => out.extend_from_slice(b"\\f"),
                    0x20..=0x7e => out.push(byte),
                    _ => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
                }
            }
            out.push(b')');
        }
    }
}

/// Fixed-point form without exponent; non-finite values become `0`.
fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_owned();
    }
    let mut text = format!("{value:.6}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_owned();
    }
    text
}
