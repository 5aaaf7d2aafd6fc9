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

use std::fmt::Write;
use std::thread::ThreadId;

use jiff::tz::TimeZone;

use crate::Error;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// [2024-08-11 22:44:57.172] [ERROR] |1| [rolling_file.rs:51]: Hello error!
/// [2024-08-11 22:44:57.172] [WARN] |1| [rolling_file.rs:52]: Hello warn!
/// [2024-08-11 22:44:57.172] [INFO] |7| [rolling_file.rs:53]: Hello info!
/// ```
///
/// The timestamp is rendered in the system time zone unless another one is set with
/// [`TextLayout::timezone`].
///
/// # Examples
///
/// ```
/// use daybucket::layout::TextLayout;
///
/// let layout = TextLayout::default();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    tz: Option<TimeZone>,
}

impl TextLayout {
    /// Set the time zone used to render timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use daybucket::layout::TextLayout;
    /// use jiff::tz::TimeZone;
    ///
    /// let layout = TextLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

fn thread_number(id: ThreadId) -> String {
    // ThreadId has no stable numeric accessor; its Debug output is `ThreadId(N)`.
    let repr = format!("{id:?}");
    repr.trim_start_matches("ThreadId(")
        .trim_end_matches(')')
        .to_string()
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        let time = record.time().to_zoned(tz);

        let mut text = String::new();
        write!(
            &mut text,
            "[{}.{:03}] [{}] |{}| ",
            time.strftime("%Y-%m-%d %H:%M:%S"),
            time.millisecond(),
            record.level(),
            thread_number(record.thread_id()),
        )
        .map_err(Error::from_fmt_error)?;

        if let Some(line) = record.line() {
            write!(&mut text, "[{}:{line}]: ", record.filename()).map_err(Error::from_fmt_error)?;
        }
        text.push_str(record.payload());

        Ok(text.into_bytes())
    }
}
