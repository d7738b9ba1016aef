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

//! Process exit statuses.
//!
//! The conversion reports its overall result through a handful of small
//! statuses rather than the full `sysexits.h` set; only command-line syntax
//! errors use the `sysexits.h` convention.

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Sysexit(pub i32);

/// At least one message was written.
pub const EX_OK: Sysexit = Sysexit(0);
/// The source or destination is missing or unusable, or the configuration
/// file could not be loaded.
pub const EX_CONFIG: Sysexit = Sysexit(1);
/// The run completed but nothing was converted.
pub const EX_NOTHING_DONE: Sysexit = Sysexit(2);
/// Malformed command line.
pub const EX_USAGE: Sysexit = Sysexit(64);

impl Sysexit {
    pub fn exit(self) -> ! {
        std::process::exit(self.0)
    }
}
