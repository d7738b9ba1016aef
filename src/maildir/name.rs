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

use std::path::{Component, Path};

const ROOT_NAME: &str = "Inbox";

/// Derive the name of the mbox file for the Maildir at `maildir` within the
/// tree rooted at `src_root`.
///
/// The root itself becomes `Inbox.mbox`. Other folders are named after their
/// path relative to the root, with any leading dots (as used by Courier and
/// Dovecot to mark subfolders, e.g. `.Sent`) removed and nested directories
/// flattened with `_`, so `.Archive/2020` becomes `Archive_2020.mbox`.
pub fn mbox_file_name(src_root: &Path, maildir: &Path) -> String {
    let relative = maildir.strip_prefix(src_root).unwrap_or(maildir);
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    let flattened = joined.trim_start_matches('.').replace('/', "_");
    if flattened.is_empty() {
        format!("{}.mbox", ROOT_NAME)
    } else {
        format!("{}.mbox", flattened)
    }
}
