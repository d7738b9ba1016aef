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

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::error;

use super::{encode_record, Envelope};
use crate::support::error::Error;

/// An mbox file open for appending.
///
/// The file is flushed to stable storage and closed by `finish()`, or, if the
/// archive is dropped without finishing (e.g. while unwinding), by the drop
/// handler, which can only log failures.
#[derive(Debug)]
pub struct ArchiveFile {
    path: PathBuf,
    writer: Option<BufWriter<fs::File>>,
    records: usize,
}

impl ArchiveFile {
    /// Create the archive at `path`, truncating any existing file there.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let file = fs::File::create(&path)?;
        Ok(ArchiveFile::from_file(path, file))
    }

    /// Open the archive at `path` for appending after any records already
    /// there, creating it if it does not exist.
    pub fn open_append(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(ArchiveFile::from_file(path, file))
    }

    fn from_file(path: PathBuf, file: fs::File) -> Self {
        ArchiveFile {
            path,
            writer: Some(BufWriter::new(file)),
            records: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of records appended so far.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn append(
        &mut self,
        envelope: &Envelope,
        content: &[u8],
    ) -> Result<(), Error> {
        let mut record = Vec::with_capacity(content.len() + 64);
        encode_record(&mut record, envelope, content);
        self.writer()?.write_all(&record)?;
        self.records += 1;
        Ok(())
    }

    /// Write out buffered records and sync the file data to disk.
    pub fn flush(&mut self) -> Result<(), Error> {
        let writer = self.writer()?;
        writer.flush()?;
        writer.get_ref().sync_data()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), Error> {
        self.close()
    }

    fn writer(&mut self) -> Result<&mut BufWriter<fs::File>, Error> {
        self.writer.as_mut().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "archive already closed",
            ))
        })
    }

    fn close(&mut self) -> Result<(), Error> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        Ok(())
    }
}

impl Drop for ArchiveFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::prelude::*;

    use super::*;
    use crate::mbox::MboxReader;

    fn envelope() -> Envelope {
        Envelope::new(None, Utc.timestamp_opt(0, 0).unwrap())
    }

    fn read_contents(path: &Path) -> Vec<Vec<u8>> {
        MboxReader::new(io::BufReader::new(fs::File::open(path).unwrap()))
            .map(|r| r.unwrap().content)
            .collect()
    }

    #[test]
    fn append_flush_finish() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = tmpdir.path().join("Inbox.mbox");

        let mut archive = ArchiveFile::create(&path).unwrap();
        archive.append(&envelope(), b"Subject: a\n\nA\n").unwrap();
        archive.flush().unwrap();
        assert_eq!(vec![b"Subject: a\n\nA\n".to_vec()], read_contents(&path));

        archive.append(&envelope(), b"Subject: b\n\nB\n").unwrap();
        assert_eq!(2, archive.records());
        archive.finish().unwrap();

        assert_eq!(
            vec![b"Subject: a\n\nA\n".to_vec(), b"Subject: b\n\nB\n".to_vec()],
            read_contents(&path)
        );
    }

    #[test]
    fn drop_flushes() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = tmpdir.path().join("Inbox.mbox");

        {
            let mut archive = ArchiveFile::create(&path).unwrap();
            archive.append(&envelope(), b"Subject: a\n\nA\n").unwrap();
        }

        assert_eq!(vec![b"Subject: a\n\nA\n".to_vec()], read_contents(&path));
    }

    #[test]
    fn create_truncates() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = tmpdir.path().join("Inbox.mbox");
        fs::write(&path, b"From old Thu Jan  1 00:00:00 1970\nold\n\n").unwrap();

        ArchiveFile::create(&path).unwrap().finish().unwrap();
        assert!(read_contents(&path).is_empty());
    }

    #[test]
    fn open_append_keeps_existing_records() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = tmpdir.path().join("Sent.mbox");

        let mut archive = ArchiveFile::create(&path).unwrap();
        archive.append(&envelope(), b"Subject: a\n\nA\n").unwrap();
        archive.finish().unwrap();

        let mut archive = ArchiveFile::open_append(&path).unwrap();
        archive.append(&envelope(), b"Subject: b\n\nB\n").unwrap();
        assert_eq!(1, archive.records());
        archive.finish().unwrap();

        assert_eq!(
            vec![b"Subject: a\n\nA\n".to_vec(), b"Subject: b\n\nB\n".to_vec()],
            read_contents(&path)
        );

        let fresh = tmpdir.path().join("Fresh.mbox");
        ArchiveFile::open_append(&fresh).unwrap().finish().unwrap();
        assert!(fresh.is_file());
    }

    #[test]
    fn create_in_missing_directory_fails() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        assert_matches!(
            Err(Error::Io(_)),
            ArchiveFile::create(tmpdir.path().join("nx/Inbox.mbox"))
        );
    }
}
