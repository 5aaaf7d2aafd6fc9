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

use std::borrow::Cow;

use crate::Error;
use crate::Logger;
use crate::Trap;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::Record;
use crate::trap::DefaultTrap;

impl From<log::LevelFilter> for LevelFilter {
    fn from(level: log::LevelFilter) -> Self {
        match level {
            log::LevelFilter::Off => Self::Off,
            log::LevelFilter::Error => Self::MoreSevereEqual(Level::Error),
            log::LevelFilter::Warn => Self::MoreSevereEqual(Level::Warn),
            log::LevelFilter::Info => Self::MoreSevereEqual(Level::Info),
            log::LevelFilter::Debug => Self::MoreSevereEqual(Level::Debug),
            log::LevelFilter::Trace => Self::All,
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = record.level().into();
        if !Logger::enabled(self, level) {
            return;
        }

        let args = record.args();
        let payload = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        let record = Record::builder()
            .level(level)
            .target(record.target())
            .file(record.file())
            .line(record.line())
            .payload(payload)
            .build();

        if let Err(err) = Logger::log(self, &record) {
            let err = Error::new("failed to log record")
                .with_context("payload", record.payload())
                .with_source(err);
            DefaultTrap::default().trap(&err);
        }
    }

    fn flush(&self) {
        if let Err(err) = Logger::flush(self) {
            DefaultTrap::default().trap(&err);
        }
    }
}

pub(crate) fn set_default_logger(logger: Logger) -> Result<(), Error> {
    log::set_boxed_logger(Box::new(logger))
        .map_err(|err| Error::new("failed to set global logger").with_source(err))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_conversion() {
        assert_eq!(Level::from(log::Level::Error), Level::Error);
        assert_eq!(Level::from(log::Level::Trace), Level::Trace);

        let filter = LevelFilter::from(log::LevelFilter::Warn);
        assert!(filter.test(Level::Fatal));
        assert!(filter.test(Level::Warn));
        assert!(!filter.test(Level::Info));
        assert!(!LevelFilter::from(log::LevelFilter::Off).test(Level::Fatal));
    }
}
