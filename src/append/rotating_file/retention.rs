// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;
use jiff::civil::Date;

use crate::Error;
use crate::Trap;
use crate::append::rotating_file::filename::BUCKET_FORMAT;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Deletes date buckets older than the retention window.
///
/// Only immediate subdirectories of the parent whose name is exactly `\d{4}-\d{2}-\d{2}` are
/// considered. Everything else, including files and symlinks with such names, is left alone.
///
/// Sweepers in different processes sharing one parent directory are not coordinated and may race
/// on the same bucket; the loser reports the failed removal to its trap.
#[derive(Debug, Clone)]
pub(crate) struct RetentionSweeper {
    parent: PathBuf,
    max_storage_days: u32,
}

impl RetentionSweeper {
    pub(crate) fn new(parent: impl Into<PathBuf>, max_storage_days: u32) -> Self {
        Self {
            parent: parent.into(),
            max_storage_days,
        }
    }

    /// Remove every expired bucket and return the removed paths.
    ///
    /// Failures are reported to `trap` and never stop the sweep.
    pub(crate) fn cleanup(&self, now: &Zoned, trap: &dyn Trap) -> Vec<PathBuf> {
        let read_dir = match fs::read_dir(&self.parent) {
            Ok(read_dir) => read_dir,
            // not created yet, so there is no bucket to sweep
            Err(err) if err.kind() == io::ErrorKind::NotFound => return vec![],
            Err(err) => {
                let err = Error::new("failed to read log dir")
                    .with_context("dir", self.parent.display())
                    .with_source(err);
                trap.trap(&err);
                return vec![];
            }
        };

        let mut removed = vec![];
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let err = Error::new("failed to read log dir entry")
                        .with_context("dir", self.parent.display())
                        .with_source(err);
                    trap.trap(&err);
                    continue;
                }
            };

            // file_type does not follow symlinks
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => {}
                _ => continue,
            }

            let name = entry.file_name();
            let Some(date) = name.to_str().and_then(parse_bucket_name) else {
                continue;
            };
            let Some(age) = bucket_age_days(date, now) else {
                continue;
            };

            if age > f64::from(self.max_storage_days) {
                let path = entry.path();
                match remove_bucket(&path) {
                    Ok(()) => removed.push(path),
                    Err(err) => trap.trap(&err),
                }
            }
        }

        removed
    }
}

fn remove_bucket(path: &Path) -> Result<(), Error> {
    fs::remove_dir_all(path).map_err(|err| {
        Error::new("failed to remove expired log dir")
            .with_context("dir", path.display())
            .with_source(err)
    })
}

/// Parse a directory name of the exact shape `YYYY-MM-DD`.
///
/// Names of the right shape that are not a calendar date, like `2024-13-45`, yield `None`.
pub(crate) fn parse_bucket_name(name: &str) -> Option<Date> {
    let bytes = name.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    Date::strptime(BUCKET_FORMAT, name).ok()
}

/// Fractional days elapsed since local midnight of `date`, in the time zone of `now`.
fn bucket_age_days(date: Date, now: &Zoned) -> Option<f64> {
    let midnight = date.to_zoned(now.time_zone().clone()).ok()?;
    let elapsed = now.duration_since(&midnight);
    Some(elapsed.as_secs_f64() / SECONDS_PER_DAY)
}
