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

use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::support::error::Error;

/// Return whether `path` has all three of the Maildir subdirectories.
fn is_maildir(path: &Path) -> bool {
    ["cur", "new", "tmp"]
        .iter()
        .all(|sub| path.join(sub).is_dir())
}

/// Find every Maildir at or below `root`.
///
/// Symlinks below `root` are not followed. Directories which cannot be read
/// are logged and skipped. The result is sorted so that repeated runs over
/// the same tree process folders in the same order.
pub fn find_maildirs(root: &Path) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::NotFound(root.to_owned()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping part of {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_dir() && is_maildir(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(found)
}
