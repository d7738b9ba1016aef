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

//! Human-readable progress on standard output.
//!
//! Reporting is purely observational: failures to write are ignored so that
//! a closed pipe or full terminal never interrupts a conversion.

use std::fmt;
use std::io::Write;
use std::path::Path;

use chrono::prelude::*;

use crate::transfer::{FolderSummary, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressMode {
    /// One line for every message.
    PerMessage,
    /// One line every this many messages within a folder; 0 for none.
    Periodic(usize),
}

#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
    mode: ProgressMode,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, mode: ProgressMode) -> Self {
        Reporter { out, mode }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
    }

    pub fn no_folders(&mut self, root: &Path) {
        self.line(format_args!(
            "No Maildir folders found under: {}",
            root.display()
        ));
    }

    pub fn found_folders(&mut self, count: usize) {
        self.line(format_args!("Found {} Maildir folders.\n", count));
    }

    pub fn start_folder(&mut self, src: &Path, dst: &Path) {
        self.line(format_args!(
            "[{}] Converting:\n  {}\n  -> {}",
            Local::now().format("%H:%M:%S"),
            src.display(),
            dst.display()
        ));
    }

    /// Report that `key` was processed with `outcome`. `summary` must already
    /// include it.
    pub fn message(
        &mut self,
        summary: &FolderSummary,
        outcome: Outcome,
        key: &str,
    ) {
        match self.mode {
            ProgressMode::PerMessage => self.line(format_args!(
                "  #{:6} {}  key={}",
                summary.count,
                outcome.tag(),
                key
            )),
            ProgressMode::Periodic(tick)
                if tick > 0 && 0 == summary.count % tick =>
            {
                self.line(format_args!(
                    "  … {} messages processed (OK:{} RAW:{} SKIP:{})",
                    summary.count, summary.ok, summary.raw, summary.skip
                ))
            }
            ProgressMode::Periodic(_) => (),
        }
    }

    pub fn end_folder(&mut self, summary: &FolderSummary) {
        self.line(format_args!(
            "  Done: {} messages  (OK:{} RAW:{} SKIP:{})\n",
            summary.count, summary.ok, summary.raw, summary.skip
        ));
    }

    pub fn end_run(&mut self, written: usize, dst: &Path) {
        self.line(format_args!(
            "All done. Wrote {} messages into: {}",
            written,
            dst.display()
        ));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(mode: ProgressMode, outcomes: &[Outcome]) -> String {
        let mut reporter = Reporter::new(Vec::new(), mode);
        let mut summary = FolderSummary::default();
        for (ix, &outcome) in outcomes.iter().enumerate() {
            summary.record(outcome);
            reporter.message(&summary, outcome, &format!("k{}", ix));
        }
        reporter.end_folder(&summary);
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn per_message_lines() {
        let out = run(
            ProgressMode::PerMessage,
            &[
                Outcome::Parsed,
                Outcome::RawFallback { placeholder: false },
                Outcome::RawFallback { placeholder: true },
                Outcome::Skipped,
            ],
        );

        assert_eq!(
            "  #     1 OK  key=k0\n\
             \x20 #     2 RAW  key=k1\n\
             \x20 #     3 RAW  key=k2\n\
             \x20 #     4 SKIP  key=k3\n\
             \x20 Done: 4 messages  (OK:1 RAW:2 SKIP:1)\n\n",
            out
        );
    }

    #[test]
    fn periodic_lines() {
        let outcomes = vec![Outcome::Parsed; 5];
        assert_eq!(
            "  … 2 messages processed (OK:2 RAW:0 SKIP:0)\n\
             \x20 … 4 messages processed (OK:4 RAW:0 SKIP:0)\n\
             \x20 Done: 5 messages  (OK:5 RAW:0 SKIP:0)\n\n",
            run(ProgressMode::Periodic(2), &outcomes)
        );
        assert_eq!(
            "  Done: 5 messages  (OK:5 RAW:0 SKIP:0)\n\n",
            run(ProgressMode::Periodic(0), &outcomes)
        );
    }

    #[test]
    fn run_lines() {
        let mut reporter =
            Reporter::new(Vec::new(), ProgressMode::Periodic(200));
        reporter.no_folders(Path::new("/mail"));
        reporter.found_folders(3);
        reporter.start_folder(Path::new("/mail/.Sent"), Path::new("/out/Sent.mbox"));
        reporter.end_run(42, Path::new("/out"));

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!("No Maildir folders found under: /mail", lines[0]);
        assert_eq!("Found 3 Maildir folders.", lines[1]);
        assert_eq!("", lines[2]);
        assert!(lines[3].starts_with('['));
        assert!(lines[3].ends_with("] Converting:"));
        assert_eq!("  /mail/.Sent", lines[4]);
        assert_eq!("  -> /out/Sent.mbox", lines[5]);
        assert_eq!("All done. Wrote 42 messages into: /out", lines[6]);
    }
}
