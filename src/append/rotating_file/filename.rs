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

use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;

pub(crate) const BUCKET_FORMAT: &str = "%Y-%m-%d";
const STAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Computes where the active log file lives for a given wall-clock time.
///
/// The layout is `<parent>/<YYYY-MM-DD>/<basename>_<YYYY-MM-DD-HH:MM:SS>.log`. The date directory
/// is the date bucket swept by retention.
///
/// Paths have a one-second resolution and are never checked for collisions: two rotations in
/// the same second compute the same path, and the second one truncates the file of the first.
#[derive(Debug, Clone)]
pub(crate) struct FilenameScheme {
    parent: PathBuf,
    basename: String,
}

impl FilenameScheme {
    pub(crate) fn new(parent: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            basename: basename.into(),
        }
    }

    /// The directory holding the date buckets. An empty parent means the working directory.
    pub(crate) fn parent(&self) -> &Path {
        if self.parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            &self.parent
        }
    }

    pub(crate) fn bucket_dir(&self, now: &Zoned) -> PathBuf {
        // joining onto an empty path yields a relative path without a leading segment
        self.parent.join(now.strftime(BUCKET_FORMAT).to_string())
    }

    pub(crate) fn calc_filename(&self, now: &Zoned) -> PathBuf {
        let filename = format!("{}_{}.log", self.basename, now.strftime(STAMP_FORMAT));
        self.bucket_dir(now).join(filename)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_calc_filename() {
        let now = Zoned::from_str("2024-06-05T07:08:09[UTC]").unwrap();

        let scheme = FilenameScheme::new("logs", "test");
        assert_eq!(
            scheme.calc_filename(&now),
            Path::new("logs/2024-06-05/test_2024-06-05-07:08:09.log")
        );

        let scheme = FilenameScheme::new("", "test");
        assert_eq!(
            scheme.calc_filename(&now),
            Path::new("2024-06-05/test_2024-06-05-07:08:09.log")
        );
        assert_eq!(scheme.parent(), Path::new("."));
    }

    #[test]
    fn test_calc_filename_uses_local_date() {
        // still 2024-06-05 in UTC
        let now = Zoned::from_str("2024-06-06T01:30:00+08:00[+08:00]").unwrap();
        let scheme = FilenameScheme::new("logs", "app");
        assert_eq!(
            scheme.calc_filename(&now),
            Path::new("logs/2024-06-06/app_2024-06-06-01:30:00.log")
        );
    }

    #[test]
    fn test_same_second_same_path() {
        let scheme = FilenameScheme::new("logs", "app");
        let a = Zoned::from_str("2024-06-05T07:08:09.100[UTC]").unwrap();
        let b = Zoned::from_str("2024-06-05T07:08:09.900[UTC]").unwrap();
        assert_eq!(scheme.calc_filename(&a), scheme.calc_filename(&b));
    }
}
