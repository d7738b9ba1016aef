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

use std::borrow::Cow;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrSpec<'a> {
    pub local: Vec<Cow<'a, [u8]>>,
    pub domain: Vec<Cow<'a, [u8]>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailboxSpec<'a> {
    pub addr: AddrSpec<'a>,
    pub name: Vec<Cow<'a, [u8]>>,
}

impl fmt::Display for AddrSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn dotted(
            f: &mut fmt::Formatter<'_>,
            parts: &[Cow<'_, [u8]>],
        ) -> fmt::Result {
            for (ix, part) in parts.iter().enumerate() {
                if ix > 0 {
                    f.write_str(".")?;
                }
                f.write_str(&String::from_utf8_lossy(part))?;
            }
            Ok(())
        }

        dotted(f, &self.local)?;
        f.write_str("@")?;
        dotted(f, &self.domain)
    }
}

/// One header field as found in the message, possibly spanning several
/// physical lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header<'a> {
    /// The field name, without the colon or any whitespace before it.
    pub name: &'a str,
    /// The complete raw field, excluding the final line ending.
    pub raw: &'a [u8],
    /// Everything after the colon, still folded.
    pub value: &'a [u8],
}

/// A message split into its header fields and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedMessage<'a> {
    /// A leading `From ` envelope line, if the file had one, without the
    /// line ending.
    pub envelope: Option<&'a [u8]>,
    pub headers: Vec<Header<'a>>,
    /// Everything after the blank line terminating the headers.
    pub body: &'a [u8],
}

impl<'a> ParsedMessage<'a> {
    /// Return the value of the first header named `name`, compared
    /// case-insensitively.
    pub fn header(&self, name: &str) -> Option<&'a [u8]> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value)
    }
}
