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

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::maildir::{find_maildirs, name::mbox_file_name, Maildir};
use crate::mbox::ArchiveFile;
use crate::progress::Reporter;
use crate::support::error::Error;
use crate::support::sysexits::*;
use crate::transfer::{
    select_keys, transfer_folder, FolderSummary, Outcome, TransferOptions,
};

/// Totals over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct RunSummary {
    pub(super) folders: usize,
    pub(super) messages: FolderSummary,
}

impl RunSummary {
    fn add(&mut self, folder: &FolderSummary) {
        self.messages.count += folder.count;
        self.messages.ok += folder.ok;
        self.messages.raw += folder.raw;
        self.messages.skip += folder.skip;
    }

    pub(super) fn exit_status(&self) -> Sysexit {
        if 0 == self.folders || 0 == self.messages.written() {
            EX_NOTHING_DONE
        } else {
            EX_OK
        }
    }
}

/// Convert every Maildir under `source` into an mbox file in `destination`.
///
/// Only fails if `source` cannot be searched or `destination` cannot be
/// created; everything else is handled per folder or per message.
pub(super) fn convert_tree(
    source: &Path,
    destination: &Path,
    options: &TransferOptions,
    reporter: &mut Reporter<impl Write>,
) -> Result<RunSummary, Error> {
    let maildirs = find_maildirs(source)?;
    if maildirs.is_empty() {
        reporter.no_folders(source);
        return Ok(RunSummary::default());
    }

    fs::create_dir_all(destination)?;
    reporter.found_folders(maildirs.len());

    let mut run = RunSummary {
        folders: maildirs.len(),
        ..RunSummary::default()
    };
    // Archive path -> first folder written to it
    let mut produced = HashMap::<PathBuf, &Path>::new();
    for maildir in &maildirs {
        let dst = destination.join(mbox_file_name(source, maildir));
        let append = match produced.get(&dst) {
            Some(&first) => {
                warn!(
                    "{} and {} both map to {}; appending the former to it",
                    maildir.display(),
                    first.display(),
                    dst.display()
                );
                true
            }
            None => {
                produced.insert(dst.clone(), maildir);
                false
            }
        };

        reporter.start_folder(maildir, &dst);
        let summary = convert_folder(maildir, &dst, append, options, reporter);
        reporter.end_folder(&summary);
        info!(
            "{} -> {}: {} messages, {} parsed, {} raw, {} skipped",
            maildir.display(),
            dst.display(),
            summary.count,
            summary.ok,
            summary.raw,
            summary.skip
        );
        run.add(&summary);
    }

    reporter.end_run(run.messages.written(), destination);
    Ok(run)
}

fn open_folder(src: &Path) -> Result<(Maildir, Vec<String>), Error> {
    let maildir = Maildir::open(src)?;
    let keys = select_keys(&maildir)?;
    Ok((maildir, keys))
}

/// Convert one Maildir into the archive at `dst`, which is truncated first
/// unless `append` is set.
fn convert_folder(
    src: &Path,
    dst: &Path,
    append: bool,
    options: &TransferOptions,
    reporter: &mut Reporter<impl Write>,
) -> FolderSummary {
    let folder = match open_folder(src) {
        Ok(folder) => Some(folder),
        Err(e) => {
            error!("{}: unable to list messages: {}", src.display(), e);
            None
        }
    };

    let archive = if append {
        ArchiveFile::open_append(dst)
    } else {
        ArchiveFile::create(dst)
    };
    let mut archive = match archive {
        Ok(archive) => archive,
        Err(e) => {
            error!("{}: unable to create archive: {}", dst.display(), e);
            let mut summary = FolderSummary::default();
            for key in folder.iter().flat_map(|(_, keys)| keys) {
                summary.record(Outcome::Skipped);
                reporter.message(&summary, Outcome::Skipped, key);
            }
            return summary;
        }
    };

    let summary = match folder {
        Some((maildir, keys)) => {
            transfer_folder(&maildir, &keys, &mut archive, reporter, options)
        }
        None => FolderSummary::default(),
    };

    if let Err(e) = archive.finish() {
        error!("{}: failed to finish archive: {}", dst.display(), e);
    }

    summary
}
