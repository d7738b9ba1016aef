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

use std::io::{self, BufRead};

use super::unescape_line;

/// One record read back from an mbox file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MboxRecord {
    /// The `From_` line, without its line ending.
    pub from_line: Vec<u8>,
    /// The message, unescaped, without the blank line separating it from the
    /// next record.
    pub content: Vec<u8>,
}

impl MboxRecord {
    /// The envelope sender named by the `From_` line.
    pub fn sender(&self) -> String {
        String::from_utf8_lossy(&self.from_line)
            .split(' ')
            .nth(1)
            .unwrap_or("")
            .to_owned()
    }
}

/// Iterates the records of an mboxrd file.
///
/// Anything before the first `From_` line is ignored.
pub struct MboxReader<R> {
    reader: R,
    pending_from: Option<Vec<u8>>,
    done: bool,
}

impl<R: BufRead> MboxReader<R> {
    pub fn new(reader: R) -> Self {
        MboxReader {
            reader,
            pending_from: None,
            done: false,
        }
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if 0 == self.reader.read_until(b'\n', &mut line)? {
            self.done = true;
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    fn next_record(&mut self) -> io::Result<Option<MboxRecord>> {
        let mut from_line = match self.pending_from.take() {
            Some(line) => line,
            None => loop {
                match self.read_line()? {
                    None => return Ok(None),
                    Some(line) if line.starts_with(b"From ") => break line,
                    Some(_) => continue,
                }
            },
        };

        let mut content = Vec::new();
        while let Some(mut line) = self.read_line()? {
            if line.starts_with(b"From ") {
                self.pending_from = Some(line);
                break;
            }

            unescape_line(&mut line);
            content.extend_from_slice(&line);
        }

        // The blank line separating records
        if content.ends_with(b"\n") {
            content.pop();
        }
        while from_line.ends_with(b"\n") || from_line.ends_with(b"\r") {
            from_line.pop();
        }

        Ok(Some(MboxRecord { from_line, content }))
    }
}

impl<R: BufRead> Iterator for MboxReader<R> {
    type Item = io::Result<MboxRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done && self.pending_from.is_none() {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skips_preamble_and_splits_records() {
        let data: &[u8] = b"junk\n\
            From a@b Thu Jan  1 00:00:00 1970\n\
            Subject: 1\n\n>From body\n\n\
            From c@d Thu Jan  1 00:00:00 1970\n\
            Subject: 2\n\n";

        let records = MboxReader::new(data)
            .collect::<io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(2, records.len());
        assert_eq!("a@b", records[0].sender());
        assert_eq!(b"Subject: 1\n\nFrom body\n".to_vec(), records[0].content);
        assert_eq!("c@d", records[1].sender());
        assert_eq!(b"Subject: 2\n".to_vec(), records[1].content);
    }

    #[test]
    fn empty_input() {
        assert_eq!(0, MboxReader::new(&b""[..]).count());
    }
}
