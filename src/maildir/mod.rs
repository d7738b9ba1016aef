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

//! Read-only access to Maildir folders.
//!
//! A Maildir is a directory with `cur`, `new` and `tmp` subdirectories, each
//! message stored as its own file. Messages are addressed by a key, which is
//! the file name up to the `:` introducing the info suffix (`:2,FS` etc).
//! Only `new` and `cur` are read; `tmp` holds deliveries still in progress.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::prelude::*;

use crate::support::chronox::utc_from_system_time;
use crate::support::error::Error;
use crate::support::file_ops::{list_visible_names, IgnoreKinds};

mod locator;
pub mod name;

pub use self::locator::find_maildirs;

const INFO_SEPARATOR: char = ':';

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subdir {
    New,
    Cur,
}

impl Subdir {
    pub fn name(self) -> &'static str {
        match self {
            Subdir::New => "new",
            Subdir::Cur => "cur",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaildirFlag {
    Draft,
    Flagged,
    Replied,
    Seen,
    Trashed,
}

/// Return the key a message file with the given name is addressed by.
pub fn key_of(file_name: &str) -> &str {
    file_name
        .split(INFO_SEPARATOR)
        .next()
        .unwrap_or(file_name)
}

/// Extract the flags from the info suffix of a message file name.
///
/// Only the `2,` info format carries flags; anything else yields nothing.
pub fn extract_maildir_flags(
    file_name: &str,
) -> impl Iterator<Item = MaildirFlag> + '_ {
    file_name
        .splitn(2, INFO_SEPARATOR)
        .nth(1)
        .and_then(|info| info.strip_prefix("2,"))
        .unwrap_or("")
        .chars()
        .filter_map(|ch| match ch {
            'D' => Some(MaildirFlag::Draft),
            'F' => Some(MaildirFlag::Flagged),
            'R' => Some(MaildirFlag::Replied),
            'S' => Some(MaildirFlag::Seen),
            'T' => Some(MaildirFlag::Trashed),
            _ => None,
        })
}

/// Where a message lives within its Maildir.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub subdir: Subdir,
    pub file_name: OsString,
    pub flags: Vec<MaildirFlag>,
}

#[derive(Debug)]
pub struct Maildir {
    root: PathBuf,
    toc: BTreeMap<String, Entry>,
}

impl Maildir {
    /// Open the Maildir at `root`, scanning `new` and `cur` for messages.
    ///
    /// A missing `new` or `cur` is treated as empty. If the same key appears
    /// in both, the copy in `cur` wins.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let mut toc = BTreeMap::new();

        for &subdir in &[Subdir::New, Subdir::Cur] {
            let names = list_visible_names(root.join(subdir.name()))
                .ignore_not_found()?;
            for file_name in names {
                let lossy = file_name.to_string_lossy().into_owned();
                let entry = Entry {
                    subdir,
                    flags: extract_maildir_flags(&lossy).collect(),
                    file_name,
                };
                toc.insert(key_of(&lossy).to_owned(), entry);
            }
        }

        Ok(Maildir { root, toc })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// All keys known to this Maildir, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.toc.keys().cloned().collect()
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.toc.get(key)
    }

    /// List the raw file names currently present in `new` and `cur`.
    ///
    /// Unlike `keys()`, this goes back to the file system.
    pub fn list_entries(&self) -> Result<Vec<String>, Error> {
        let mut entries = Vec::new();
        for &subdir in &[Subdir::New, Subdir::Cur] {
            entries.extend(
                list_visible_names(self.root.join(subdir.name()))
                    .ignore_not_found()?
                    .into_iter()
                    .map(|name| name.to_string_lossy().into_owned()),
            );
        }

        Ok(entries)
    }

    pub fn message_path(&self, key: &str) -> Result<PathBuf, Error> {
        let entry = self
            .toc
            .get(key)
            .ok_or_else(|| Error::NxMessage(key.to_owned()))?;
        Ok(self.root.join(entry.subdir.name()).join(&entry.file_name))
    }

    /// Read the full content of the message with the given key.
    pub fn read(&self, key: &str) -> Result<Vec<u8>, Error> {
        Ok(fs::read(self.message_path(key)?)?)
    }

    /// Return when the message was delivered, going by the modification time
    /// of its file.
    pub fn delivered(&self, key: &str) -> Option<DateTime<Utc>> {
        let path = self.message_path(key).ok()?;
        let modified = fs::metadata(path).and_then(|md| md.modified()).ok()?;
        Some(utc_from_system_time(modified))
    }
}
