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

//! The mbox archive format, in its "mboxrd" variant.
//!
//! Each record starts with a `From_` line naming the envelope sender and the
//! delivery time, followed by the message and a blank line. Any line of the
//! message matching `^>*From ` gets one more `>` prepended, which makes the
//! escaping reversible.

use chrono::prelude::*;

use crate::support::chronox::asctime;

mod archive;
#[cfg(test)]
mod reader;

pub use self::archive::ArchiveFile;
#[cfg(test)]
pub use self::reader::{MboxReader, MboxRecord};

/// The envelope sender used when none is known.
pub const DEFAULT_SENDER: &str = "MAILER-DAEMON";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub sender: String,
    pub date: DateTime<Utc>,
}

impl Envelope {
    /// Build an envelope, using `DEFAULT_SENDER` if `sender` is absent or
    /// could not be written on a `From_` line.
    pub fn new(sender: Option<String>, date: DateTime<Utc>) -> Self {
        let sender = sender
            .filter(|s| {
                !s.is_empty() && s.chars().all(|c| c.is_ascii_graphic())
            })
            .unwrap_or_else(|| DEFAULT_SENDER.to_owned());
        Envelope { sender, date }
    }

    pub fn from_line(&self) -> String {
        format!("From {} {}", self.sender, asctime(&self.date))
    }
}

fn is_from_line(line: &[u8]) -> bool {
    let unquoted = line
        .iter()
        .position(|&b| b'>' != b)
        .map_or(&[][..], |ix| &line[ix..]);
    unquoted.starts_with(b"From ")
}

/// Append a complete record for a message with the given envelope and
/// content to `dst`.
///
/// A missing final line ending on `content` is supplied.
pub fn encode_record(dst: &mut Vec<u8>, envelope: &Envelope, content: &[u8]) {
    dst.extend_from_slice(envelope.from_line().as_bytes());
    dst.push(b'\n');

    for line in content.split_inclusive(|&b| b'\n' == b) {
        if is_from_line(line) {
            dst.push(b'>');
        }
        dst.extend_from_slice(line);
    }

    if !content.is_empty() && !content.ends_with(b"\n") {
        dst.push(b'\n');
    }
    dst.push(b'\n');
}

/// Reverse the escaping `encode_record` applies to `line`, in place.
#[cfg(test)]
fn unescape_line(line: &mut Vec<u8>) {
    if line.starts_with(b">") && is_from_line(line) {
        line.remove(0);
    }
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;
    use crate::support::chronox::NaiveDateX;

    fn epoch() -> DateTime<Utc> {
        NaiveDate::from_ymdx(1970, 1, 1).and_hmsx_utc(0, 0, 0)
    }

    #[test]
    fn envelope_sender_validation() {
        assert_eq!(
            "From MAILER-DAEMON Thu Jan  1 00:00:00 1970",
            Envelope::new(None, epoch()).from_line()
        );
        assert_eq!(
            "From a@b.c Thu Jan  1 00:00:00 1970",
            Envelope::new(Some("a@b.c".to_owned()), epoch()).from_line()
        );
        assert_eq!(
            DEFAULT_SENDER,
            Envelope::new(Some("a b@c".to_owned()), epoch()).sender
        );
        assert_eq!(
            DEFAULT_SENDER,
            Envelope::new(Some(String::new()), epoch()).sender
        );
    }

    #[test]
    fn encode_escapes_from_lines() {
        let mut out = Vec::new();
        encode_record(
            &mut out,
            &Envelope::new(None, epoch()),
            b"Subject: x\n\nFrom here\n>From there\nFromage\n",
        );

        assert_eq!(
            "From MAILER-DAEMON Thu Jan  1 00:00:00 1970\n\
             Subject: x\n\n>From here\n>>From there\nFromage\n\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn encode_terminates_last_line() {
        let mut out = Vec::new();
        encode_record(&mut out, &Envelope::new(None, epoch()), b"abc");
        assert!(out.ends_with(b"\nabc\n\n"));

        out.clear();
        encode_record(&mut out, &Envelope::new(None, epoch()), b"");
        assert_eq!(b"From MAILER-DAEMON Thu Jan  1 00:00:00 1970\n\n", &out[..]);
    }

    #[test]
    fn records_read_back_verbatim() {
        let contents: &[&[u8]] = &[
            b"Subject: one\n\nFrom the start\n>From quoted\n",
            b"",
            b"Subject: crlf\r\n\r\nFrom x\r\n\r\n\r\n",
            b"\n\n",
        ];

        let mut out = Vec::new();
        for (ix, content) in contents.iter().enumerate() {
            encode_record(
                &mut out,
                &Envelope::new(Some(format!("s{}@x", ix)), epoch()),
                content,
            );
        }

        let records = MboxReader::new(io::Cursor::new(out))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(contents.len(), records.len());
        for (ix, (record, content)) in
            records.iter().zip(contents.iter()).enumerate()
        {
            assert_eq!(format!("s{}@x", ix), record.sender());
            assert_eq!(
                String::from_utf8_lossy(content),
                String::from_utf8_lossy(&record.content)
            );
        }
    }
}
