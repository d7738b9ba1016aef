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

use std::time::SystemTime;

use chrono::prelude::*;

/// Format `dt` the way `asctime(3)` does, which is what the `From_` line of
/// an mbox record carries.
///
/// E.g. `Thu Jan  1 00:00:00 1970`.
pub fn asctime(dt: &DateTime<Utc>) -> String {
    dt.format("%a %b %e %H:%M:%S %Y").to_string()
}

pub fn utc_from_system_time(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
pub trait NaiveDateX {
    fn from_ymdx(y: i32, m: u32, d: u32) -> Self;
    fn and_hmsx_utc(&self, h: u32, m: u32, s: u32) -> DateTime<Utc>;
}

#[cfg(test)]
impl NaiveDateX for NaiveDate {
    fn from_ymdx(y: i32, m: u32, d: u32) -> Self {
        Self::from_ymd_opt(y, m, d).unwrap()
    }

    fn and_hmsx_utc(&self, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        self.and_hms_opt(h, m, s).unwrap().and_utc()
    }
}
