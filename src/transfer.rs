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

//! Moving the messages of one Maildir into an mbox archive.
//!
//! Each message is attempted in up to three ways, the first to succeed
//! winning:
//!
//! 1. Parse the message and write it back out field by field, adding
//!    `Status`/`X-Status` headers derived from the Maildir flags.
//! 2. Copy the file verbatim.
//! 3. Write a placeholder record noting the message could not be read.
//!
//! If even the placeholder cannot be written, the message is skipped.

use std::collections::HashSet;
use std::io::Write;

use chrono::prelude::*;
use log::{debug, error, warn};

use crate::maildir::{key_of, Entry, Maildir, MaildirFlag, Subdir};
use crate::mbox::{ArchiveFile, Envelope};
use crate::mime::header::{parse_first_mailbox, parse_return_path};
use crate::mime::message::parse_message;
use crate::mime::model::ParsedMessage;
use crate::progress::Reporter;
use crate::support::error::Error;

pub const PLACEHOLDER_SENDER: &str = "conversion-error";
pub const PLACEHOLDER_SUBJECT: &str = "Recovered placeholder";

const PLACEHOLDER_BODY: &str = "<Failed to read original message in Maildir.>";

/// The destination of a transfer.
pub trait MessageSink {
    fn append(
        &mut self,
        envelope: &Envelope,
        content: &[u8],
    ) -> Result<(), Error>;

    fn flush(&mut self) -> Result<(), Error>;
}

impl MessageSink for ArchiveFile {
    fn append(
        &mut self,
        envelope: &Envelope,
        content: &[u8],
    ) -> Result<(), Error> {
        ArchiveFile::append(self, envelope, content)
    }

    fn flush(&mut self) -> Result<(), Error> {
        ArchiveFile::flush(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The message was parsed and written field by field.
    Parsed,
    /// The message was written verbatim, or as a placeholder if it could not
    /// be read at all.
    RawFallback { placeholder: bool },
    /// Nothing was written.
    Skipped,
}

impl Outcome {
    pub fn tag(self) -> &'static str {
        match self {
            Outcome::Parsed => "OK",
            Outcome::RawFallback { .. } => "RAW",
            Outcome::Skipped => "SKIP",
        }
    }
}

/// Per-folder outcome counts.
///
/// `count == ok + raw + skip` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub count: usize,
    pub ok: usize,
    pub raw: usize,
    pub skip: usize,
}

impl FolderSummary {
    pub fn record(&mut self, outcome: Outcome) {
        self.count += 1;
        match outcome {
            Outcome::Parsed => self.ok += 1,
            Outcome::RawFallback { .. } => self.raw += 1,
            Outcome::Skipped => self.skip += 1,
        }
    }

    /// The number of records actually written.
    pub fn written(&self) -> usize {
        self.ok + self.raw
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferOptions {
    /// Flush the sink after every this many messages.
    pub flush_interval: usize,
}

/// Determine which messages of `maildir` to transfer, in transfer order.
///
/// The keys are those of the current directory listing which the Maildir
/// also knows about. Should that match nothing, every key the Maildir knows
/// is used instead.
pub fn select_keys(maildir: &Maildir) -> Result<Vec<String>, Error> {
    let listed = maildir
        .list_entries()?
        .iter()
        .map(|name| key_of(name).to_owned())
        .collect::<HashSet<_>>();

    let known = maildir.keys();
    let mut keys = known
        .iter()
        .filter(|key| listed.contains(key.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    if keys.is_empty() && !known.is_empty() {
        warn!(
            "{}: none of the {} known messages are in the directory listing; \
             converting all of them",
            maildir.path().display(),
            known.len()
        );
        keys = known;
    }

    keys.sort();
    Ok(keys)
}

/// Transfer every message of `maildir` into `sink`.
///
/// This never fails as a whole; problems are logged and reflected in the
/// outcome counts. The sink is flushed every `options.flush_interval`
/// messages but not at the end, which is the caller's responsibility.
pub fn transfer_folder(
    maildir: &Maildir,
    keys: &[String],
    sink: &mut impl MessageSink,
    reporter: &mut Reporter<impl Write>,
    options: &TransferOptions,
) -> FolderSummary {
    let flush_interval = options.flush_interval.max(1);
    let mut summary = FolderSummary::default();

    for key in keys {
        let outcome = transfer_message(maildir, sink, key);
        summary.record(outcome);
        reporter.message(&summary, outcome, key);

        if 0 == summary.count % flush_interval {
            if let Err(e) = sink.flush() {
                error!(
                    "{}: failed to flush archive: {}",
                    maildir.path().display(),
                    e
                );
            }
        }
    }

    summary
}

/// Transfer the single message `key`, degrading through the fallbacks as
/// needed.
pub fn transfer_message(
    maildir: &Maildir,
    sink: &mut impl MessageSink,
    key: &str,
) -> Outcome {
    let e = match append_parsed(maildir, sink, key) {
        Ok(()) => return Outcome::Parsed,
        Err(e) => e,
    };
    debug!("{}: cannot copy parsed form: {}", key, e);

    let e = match append_raw(maildir, sink, key) {
        Ok(()) => return Outcome::RawFallback { placeholder: false },
        Err(e) => e,
    };
    warn!(
        "{}/{}: cannot read message, writing placeholder: {}",
        maildir.path().display(),
        key,
        e
    );

    match append_placeholder(sink) {
        Ok(()) => Outcome::RawFallback { placeholder: true },
        Err(e) => {
            error!(
                "{}/{}: cannot write placeholder, skipping: {}",
                maildir.path().display(),
                key,
                e
            );
            Outcome::Skipped
        }
    }
}

fn delivery_time(maildir: &Maildir, key: &str) -> DateTime<Utc> {
    maildir.delivered(key).unwrap_or_else(Utc::now)
}

pub fn append_parsed(
    maildir: &Maildir,
    sink: &mut impl MessageSink,
    key: &str,
) -> Result<(), Error> {
    let entry = maildir
        .entry(key)
        .ok_or_else(|| Error::NxMessage(key.to_owned()))?;
    let data = maildir.read(key)?;
    let message = parse_message(&data)?;

    let envelope =
        Envelope::new(envelope_sender(&message), delivery_time(maildir, key));
    sink.append(&envelope, &render_parsed(&message, entry))
}

pub fn append_raw(
    maildir: &Maildir,
    sink: &mut impl MessageSink,
    key: &str,
) -> Result<(), Error> {
    let data = maildir.read(key)?;
    let envelope = Envelope::new(None, delivery_time(maildir, key));
    sink.append(&envelope, &data)
}

pub fn append_placeholder(sink: &mut impl MessageSink) -> Result<(), Error> {
    let content = format!(
        "From: {}\nSubject: {}\n\n{}",
        PLACEHOLDER_SENDER, PLACEHOLDER_SUBJECT, PLACEHOLDER_BODY
    );
    sink.append(&Envelope::new(None, Utc::now()), content.as_bytes())
}

/// Pick the envelope sender for a parsed message.
///
/// In order of preference: the sender of an existing `From_` line, the
/// `Return-Path`, and the first address of `From`.
pub fn envelope_sender(message: &ParsedMessage<'_>) -> Option<String> {
    if let Some(sender) = message.envelope.and_then(|line| {
        String::from_utf8_lossy(line)
            .split(' ')
            .nth(1)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }) {
        return Some(sender);
    }

    if let Some(addr) = message.header("Return-Path").and_then(parse_return_path)
    {
        return Some(addr.to_string());
    }

    message
        .header("From")
        .and_then(parse_first_mailbox)
        .map(|mailbox| mailbox.addr.to_string())
}

/// Compute the mbox `Status` and `X-Status` values for a Maildir entry.
pub fn status_flags(entry: &Entry) -> (String, String) {
    let has = |flag| entry.flags.contains(&flag);

    let mut status = String::new();
    if has(MaildirFlag::Seen) {
        status.push('R');
    }
    if Subdir::Cur == entry.subdir {
        status.push('O');
    }

    let mut x_status = String::new();
    if has(MaildirFlag::Trashed) {
        x_status.push('D');
    }
    if has(MaildirFlag::Flagged) {
        x_status.push('F');
    }
    if has(MaildirFlag::Replied) {
        x_status.push('A');
    }

    (status, x_status)
}

/// Write `message` back out with `\n` line endings, replacing any status
/// headers with ones derived from `entry`.
pub fn render_parsed(message: &ParsedMessage<'_>, entry: &Entry) -> Vec<u8> {
    fn push_line(out: &mut Vec<u8>, line: &[u8]) {
        out.extend_from_slice(line.strip_suffix(b"\r").unwrap_or(line));
        out.push(b'\n');
    }

    let mut out = Vec::with_capacity(
        message.body.len()
            + message.headers.iter().map(|h| h.raw.len() + 2).sum::<usize>()
            + 32,
    );

    for header in &message.headers {
        if header.name.eq_ignore_ascii_case("Status")
            || header.name.eq_ignore_ascii_case("X-Status")
        {
            continue;
        }

        for line in header.raw.split(|&b| b'\n' == b) {
            push_line(&mut out, line);
        }
    }

    let (status, x_status) = status_flags(entry);
    if !status.is_empty() {
        out.extend_from_slice(format!("Status: {}\n", status).as_bytes());
    }
    if !x_status.is_empty() {
        out.extend_from_slice(format!("X-Status: {}\n", x_status).as_bytes());
    }

    out.push(b'\n');

    if !message.body.is_empty() {
        let body = message.body.strip_suffix(b"\n").unwrap_or(message.body);
        for line in body.split(|&b| b'\n' == b) {
            push_line(&mut out, line);
        }
    }

    out
}
