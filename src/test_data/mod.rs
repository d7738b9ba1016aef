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

//! Fixtures shared by tests across the crate.

use std::fs;
use std::path::Path;

pub static SIMPLE_MESSAGE: &[u8] = b"\
Return-Path: <bounce@lists.example.org>
From: Alice Example <alice@example.com>
To: bob@example.net
Subject: Lunch
Date: Thu, 1 Oct 2020 12:34:56 +0000
Message-ID: <1234@example.com>

Shall we meet at noon?
From the office, we can walk over.
";

pub static CRLF_MESSAGE: &[u8] = b"\
From: carol@example.com\r
To: dave@example.net\r
Subject: A folded\r
 subject\r
Status: U\r
\r
Line one\r
Line two\r
";

/// Not a message by any stretch; has no header block at all.
pub static GARBAGE_MESSAGE: &[u8] = b"\
this is not a header\n\
From nowhere in particular\n\
\x00\x01\x02 binary junk\n";

pub fn make_maildir(path: &Path) {
    for sub in &["cur", "new", "tmp"] {
        fs::create_dir_all(path.join(sub)).unwrap();
    }
}

/// Write `data` as the message file `sub/name` of the Maildir at `maildir`.
pub fn write_message(maildir: &Path, sub: &str, name: &str, data: &[u8]) {
    fs::write(maildir.join(sub).join(name), data).unwrap();
}
