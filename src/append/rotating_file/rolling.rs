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
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;
use jiff::civil::Date;

use crate::Error;
use crate::Trap;
use crate::append::rotating_file::DEFAULT_MAX_FILE_SIZE;
use crate::append::rotating_file::DEFAULT_MAX_STORAGE_DAYS;
use crate::append::rotating_file::MAX_STORAGE_DAYS;
use crate::append::rotating_file::clock::Clock;
use crate::append::rotating_file::filename::FilenameScheme;
use crate::append::rotating_file::retention::RetentionSweeper;
use crate::append::rotating_file::rotation::RotationPolicy;
use crate::trap::DefaultTrap;

/// A writer that rotates files by size and date, and sweeps expired date buckets.
///
/// Each call to [`Write::write`] is treated as one record: it is either written whole to a
/// single file, or fails.
#[derive(Debug)]
pub struct RollingFileWriter {
    state: State,
    writer: Option<File>,
}

impl RollingFileWriter {
    /// The path of the active log file, if one is open.
    pub fn current_path(&self) -> Option<&Path> {
        self.state.current_path.as_deref()
    }

    /// The number of bytes in the active log file.
    pub fn current_size(&self) -> usize {
        self.state.current_size
    }

    #[cfg(test)]
    pub(crate) fn set_now(&mut self, now: Zoned) {
        self.state.clock.set_now(now);
    }

    fn rotate(&mut self, now: &Zoned) -> Result<(), Error> {
        if let Some(mut file) = self.writer.take() {
            if let Err(err) = file.flush() {
                let err = Error::new("failed to flush previous writer").with_source(err);
                self.state.trap.trap(&err);
            }
            // closed here, before the next one is opened
            drop(file);
        }
        self.state.current_path = None;
        self.state.current_size = 0;

        self.state.sweeper.cleanup(now, self.state.trap.as_ref());

        let filepath = self.state.scheme.calc_filename(now);
        let file = open_log_file(&filepath, OpenMode::Truncate)?;
        self.state.current_path = Some(filepath);
        self.state.opened_on = now.date();
        self.writer = Some(file);
        Ok(())
    }
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.flush() {
                let err = Error::new("failed to flush file writer on dropped").with_source(err);
                self.state.trap.trap(&err);
            }
        }
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.state.clock.now();

        let should_rotate = self.writer.is_none()
            || self
                .state
                .policy
                .decide(
                    self.state.opened_on,
                    now.date(),
                    self.state.current_size,
                    buf.len(),
                )
                .is_some();
        if should_rotate {
            self.rotate(&now).map_err(io::Error::other)?;
        }

        let Some(writer) = self.writer.as_mut() else {
            return Err(io::Error::other(Error::new("no log file is open")));
        };
        writer.write_all(buf)?;
        self.state.current_size += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

/// A builder for configuring [`RollingFileWriter`].
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    // required
    log_path: PathBuf,

    // has default
    max_size: usize,
    max_storage_days: u32,
    rotate_on_open: bool,
    rollover_daily: bool,
    clock: Clock,
    trap: Box<dyn Trap>,
}

impl RollingFileWriterBuilder {
    /// Creates a new [`RollingFileWriterBuilder`].
    ///
    /// The parent of `log_path` holds the date buckets, and its file stem is the basename of
    /// every log file: `logs/app.log` writes to `logs/<date>/app_<datetime>.log`.
    #[must_use]
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            max_size: DEFAULT_MAX_FILE_SIZE,
            max_storage_days: DEFAULT_MAX_STORAGE_DAYS,
            rotate_on_open: true,
            rollover_daily: true,
            clock: Clock::default(),
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the trap for the rolling file writer.
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the maximum size of a log file in bytes. Must be greater than zero.
    #[must_use]
    pub fn max_file_size(mut self, n: usize) -> Self {
        self.max_size = n;
        self
    }

    /// Set the number of days a date bucket is kept. Must not exceed 730.
    #[must_use]
    pub fn max_storage_days(mut self, n: u32) -> Self {
        self.max_storage_days = n;
        self
    }

    /// Set whether a non-empty file found at the initial path is rotated away on build.
    #[must_use]
    pub fn rotate_on_open(mut self, yes: bool) -> Self {
        self.rotate_on_open = yes;
        self
    }

    /// Set whether the file is also rotated when the local date changes.
    #[must_use]
    pub fn rollover_daily(mut self, yes: bool) -> Self {
        self.rollover_daily = yes;
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the [`RollingFileWriter`].
    ///
    /// # Errors
    ///
    /// Return a [`ConfigInvalid`](crate::ErrorKind::ConfigInvalid) error if either:
    ///
    /// * The maximum file size is zero.
    /// * The retention window exceeds 730 days.
    /// * The log path does not name a file.
    ///
    /// Return an error if the first log file cannot be opened.
    pub fn build(self) -> Result<RollingFileWriter, Error> {
        let Self {
            log_path,
            max_size,
            max_storage_days,
            rotate_on_open,
            rollover_daily,
            clock,
            trap,
        } = self;

        let Some(max_size) = NonZeroUsize::new(max_size) else {
            return Err(Error::config_invalid("max file size must be greater than zero")
                .with_context("max_size", max_size));
        };

        if max_storage_days > MAX_STORAGE_DAYS {
            return Err(Error::config_invalid(format!(
                "max storage days must not exceed {MAX_STORAGE_DAYS}"
            ))
            .with_context("max_storage_days", max_storage_days));
        }

        let basename = log_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if basename.is_empty() {
            return Err(Error::config_invalid("log path must name a file")
                .with_context("log_path", log_path.display()));
        }
        let parent = log_path.parent().unwrap_or(Path::new("")).to_path_buf();

        let scheme = FilenameScheme::new(parent, basename);
        let sweeper = RetentionSweeper::new(scheme.parent(), max_storage_days);
        let now = clock.now();

        let mut state = State {
            scheme,
            sweeper,
            policy: RotationPolicy::new(max_size, rollover_daily),
            current_path: None,
            current_size: 0,
            opened_on: now.date(),
            clock,
            trap,
        };

        // sweep first, so the file opened below is never removed while held
        state.sweeper.cleanup(&now, state.trap.as_ref());

        let filepath = state.scheme.calc_filename(&now);
        let file = open_log_file(&filepath, OpenMode::Append)?;
        let existing = file
            .metadata()
            .map_err(|err| Error::new("failed to read log file metadata").with_source(err))?
            .len();
        state.current_size = usize::try_from(existing).unwrap_or(usize::MAX);
        state.current_path = Some(filepath);

        let mut writer = RollingFileWriter {
            state,
            writer: Some(file),
        };

        if rotate_on_open && writer.state.current_size > 0 {
            writer.rotate(&now)?;
        }

        Ok(writer)
    }
}

#[derive(Debug)]
struct State {
    scheme: FilenameScheme,
    sweeper: RetentionSweeper,
    policy: RotationPolicy,
    current_path: Option<PathBuf>,
    current_size: usize,
    opened_on: Date,
    clock: Clock,
    trap: Box<dyn Trap>,
}

#[derive(Debug, Clone, Copy)]
enum OpenMode {
    /// Keep what is already in the file; used for the first file only.
    Append,
    /// Start from an empty file; a same-second path collision overwrites the earlier file.
    Truncate,
}

fn open_log_file(filepath: &Path, mode: OpenMode) -> Result<File, Error> {
    if let Some(dir) = filepath.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|err| {
                Error::new("failed to create log directory")
                    .with_context("dir", dir.display())
                    .with_source(err)
            })?;
        }
    }

    let mut open_options = OpenOptions::new();
    match mode {
        OpenMode::Append => open_options.append(true).create(true),
        OpenMode::Truncate => open_options.write(true).create(true).truncate(true),
    };
    open_options.open(filepath).map_err(|err| {
        Error::new("failed to create log file")
            .with_context("path", filepath.display())
            .with_source(err)
    })
}
