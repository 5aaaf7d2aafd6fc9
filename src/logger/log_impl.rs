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
use std::fmt;
use std::panic::Location;

use crate::Append;
use crate::Error;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::Record;

/// A logger that dispatches log records to one or more dispatches.
///
/// Built with [`builder`](crate::builder). With the `bridge-log` feature it also implements
/// [`log::Log`].
#[derive(Debug)]
pub struct Logger {
    dispatches: Vec<Dispatch>,
}

impl Logger {
    pub(super) fn new(dispatches: Vec<Dispatch>) -> Self {
        Self { dispatches }
    }

    /// Determine if a record of the given level would be logged by any dispatch.
    pub fn enabled(&self, level: Level) -> bool {
        self.dispatches
            .iter()
            .any(|dispatch| dispatch.enabled(level))
    }

    /// Log the record.
    ///
    /// The record is offered to every dispatch even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Return the first error raised by an appender.
    pub fn log(&self, record: &Record) -> Result<(), Error> {
        let mut first_error = None;
        for dispatch in &self.dispatches {
            if let Err(err) = dispatch.log(record) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Flush all appenders.
    ///
    /// # Errors
    ///
    /// Return the first error raised by an appender.
    pub fn flush(&self) -> Result<(), Error> {
        let mut first_error = None;
        for dispatch in &self.dispatches {
            if let Err(err) = dispatch.flush() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Log a message at the [`Trace`](Level::Trace) level from the caller's location.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments) -> Result<(), Error> {
        self.log_args(Level::Trace, args, Location::caller())
    }

    /// Log a message at the [`Debug`](Level::Debug) level from the caller's location.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments) -> Result<(), Error> {
        self.log_args(Level::Debug, args, Location::caller())
    }

    /// Log a message at the [`Info`](Level::Info) level from the caller's location.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    ///
    /// # Examples
    ///
    /// ```
    /// let logger = daybucket::builder().build();
    /// logger.info(format_args!("listening on port {}", 8080)).unwrap();
    /// ```
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments) -> Result<(), Error> {
        self.log_args(Level::Info, args, Location::caller())
    }

    /// Log a message at the [`Warn`](Level::Warn) level from the caller's location.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments) -> Result<(), Error> {
        self.log_args(Level::Warn, args, Location::caller())
    }

    /// Log a message at the [`Error`](Level::Error) level from the caller's location.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments) -> Result<(), Error> {
        self.log_args(Level::Error, args, Location::caller())
    }

    /// Log a message at the [`Fatal`](Level::Fatal) level from the caller's location.
    ///
    /// Logging a fatal record does not terminate the program.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments) -> Result<(), Error> {
        self.log_args(Level::Fatal, args, Location::caller())
    }

    fn log_args(
        &self,
        level: Level,
        args: fmt::Arguments,
        location: &'static Location<'static>,
    ) -> Result<(), Error> {
        if !self.enabled(level) {
            return Ok(());
        }

        let payload = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        let record = Record::builder()
            .level(level)
            .location(location)
            .payload(payload)
            .build();
        self.log(&record)
    }
}

/// A grouped set of appenders and level filters.
#[derive(Debug)]
pub(super) struct Dispatch {
    filters: Vec<LevelFilter>,
    appends: Vec<Box<dyn Append>>,
}

impl Dispatch {
    pub(super) fn new(filters: Vec<LevelFilter>, appends: Vec<Box<dyn Append>>) -> Self {
        debug_assert!(
            !appends.is_empty(),
            "A Dispatch must have at least one appender"
        );

        Self { filters, appends }
    }

    fn enabled(&self, level: Level) -> bool {
        self.filters.iter().all(|filter| filter.test(level))
    }

    fn log(&self, record: &Record) -> Result<(), Error> {
        if !self.enabled(record.level()) {
            return Ok(());
        }

        let mut first_error = None;
        for append in &self.appends {
            if let Err(err) = append.append(record) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn flush(&self) -> Result<(), Error> {
        let mut first_error = None;
        for append in &self.appends {
            if let Err(err) = append.flush() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
