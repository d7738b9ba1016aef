//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of maildir-mbox.
//
// maildir-mbox is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// maildir-mbox is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along with
// maildir-mbox. If not, see <http://www.gnu.org/licenses/>.

//! Splitting a message into header fields and body.
//!
//! The parser is strict about the header block: every line
//! before the first blank line must be either a well-formed `name: value`
//! field or a continuation of one. Anything else means the file is not
//! something we can reproduce field by field, and the caller falls back to
//! copying it verbatim.

use std::str;

use memchr::memchr;

use super::model::*;
use crate::support::error::Error;

/// Return the line starting at `start` with its line ending removed, and the
/// offset of the following line.
fn next_line(data: &[u8], start: usize) -> (&[u8], usize) {
    let rest = &data[start..];
    let (mut line, next) = match memchr(b'\n', rest) {
        Some(ix) => (&rest[..ix], start + ix + 1),
        None => (rest, data.len()),
    };

    if line.ends_with(b"\r") {
        line = &line[..line.len() - 1];
    }

    (line, next)
}

struct FieldSpan<'a> {
    name: &'a str,
    start: usize,
    value_start: usize,
    end: usize,
}

fn is_field_name_char(ch: u8) -> bool {
    ch > b' ' && ch < 0x7F && ch != b':'
}

pub fn parse_message(data: &[u8]) -> Result<ParsedMessage<'_>, Error> {
    let mut pos = 0;
    let mut envelope = None;

    if data.starts_with(b"From ") {
        let (line, next) = next_line(data, 0);
        envelope = Some(line);
        pos = next;
    }

    let mut fields: Vec<FieldSpan<'_>> = Vec::new();
    let mut body: &[u8] = &[];

    while pos < data.len() {
        let line_start = pos;
        let (line, next) = next_line(data, pos);
        pos = next;

        if line.is_empty() {
            body = &data[next..];
            break;
        }

        if b' ' == line[0] || b'\t' == line[0] {
            let field = fields.last_mut().ok_or(Error::MalformedMessage(
                "continuation line before first header",
            ))?;
            field.end = line_start + line.len();
            continue;
        }

        let colon = memchr(b':', line)
            .ok_or(Error::MalformedMessage("header line without colon"))?;
        // Obsolete syntax permits whitespace between the name and the colon
        let name = trim_wsp_end(&line[..colon]);
        if name.is_empty() || !name.iter().copied().all(is_field_name_char) {
            return Err(Error::MalformedMessage("invalid header field name"));
        }

        fields.push(FieldSpan {
            name: str::from_utf8(name).map_err(|_| {
                Error::MalformedMessage("invalid header field name")
            })?,
            start: line_start,
            value_start: line_start + colon + 1,
            end: line_start + line.len(),
        });
    }

    if fields.is_empty() {
        return Err(Error::MalformedMessage("no header fields"));
    }

    let headers = fields
        .into_iter()
        .map(|f| Header {
            name: f.name,
            raw: &data[f.start..f.end],
            value: &data[f.value_start..f.end],
        })
        .collect();

    Ok(ParsedMessage {
        envelope,
        headers,
        body,
    })
}

fn trim_wsp_end(mut s: &[u8]) -> &[u8] {
    while let Some(&last) = s.last() {
        if b' ' != last && b'\t' != last {
            break;
        }
        s = &s[..s.len() - 1];
    }
    s
}
