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

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::Error;
use crate::Layout;
use crate::Trap;
use crate::append::Append;
use crate::append::rotating_file::observer::Observers;
use crate::append::rotating_file::observer::OnOutput;
use crate::append::rotating_file::rolling::RollingFileWriter;
use crate::append::rotating_file::rolling::RollingFileWriterBuilder;
use crate::layout::TextLayout;
use crate::record::Level;
use crate::record::Record;
use crate::trap::DefaultTrap;

/// A builder to configure and create a [`RotatingFile`] appender.
pub struct RotatingFileBuilder {
    builder: RollingFileWriterBuilder,
    layout: Box<dyn Layout>,
    trap: Box<dyn Trap>,
    observers: Vec<Arc<OnOutput>>,
}

impl fmt::Debug for RotatingFileBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingFileBuilder")
            .field("builder", &self.builder)
            .field("layout", &self.layout)
            .field("trap", &self.trap)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl RotatingFileBuilder {
    /// Create a new rotating file appender builder.
    ///
    /// `log_path` is split into the directory holding the date buckets and the basename of the
    /// log files: `logs/app.log` writes to `logs/<YYYY-MM-DD>/app_<YYYY-MM-DD-HH:MM:SS>.log`.
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            builder: RollingFileWriterBuilder::new(log_path),
            layout: Box::new(TextLayout::default()),
            trap: Box::new(DefaultTrap::default()),
            observers: vec![],
        }
    }

    /// Build the [`RotatingFile`] appender.
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
    pub fn build(self) -> Result<RotatingFile, Error> {
        let RotatingFileBuilder {
            builder,
            layout,
            trap,
            observers,
        } = self;

        let trap: Arc<dyn Trap> = Arc::from(trap);
        let writer = builder.trap(trap.clone()).build()?;
        let file = RotatingFile::new(writer, layout, trap);
        for observer in observers {
            file.observers.add(observer);
        }
        Ok(file)
    }

    /// Set the layout for the logs.
    ///
    /// Default to [`TextLayout`].
    ///
    /// # Examples
    ///
    /// ```
    /// use daybucket::append::RotatingFileBuilder;
    /// use daybucket::layout::IdenticalLayout;
    ///
    /// let builder = RotatingFileBuilder::new("logs/app.log").layout(IdenticalLayout::default());
    /// ```
    pub fn layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the trap for errors that do not fail a write, like a bucket that cannot be removed.
    ///
    /// Default to [`DefaultTrap`].
    ///
    /// # Examples
    ///
    /// ```
    /// use daybucket::append::RotatingFileBuilder;
    /// use daybucket::trap::DefaultTrap;
    ///
    /// let builder = RotatingFileBuilder::new("logs/app.log").trap(DefaultTrap::default());
    /// ```
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the maximum size of a log file in bytes.
    ///
    /// Default to 20 MiB. Zero is rejected by [`build`](Self::build).
    pub fn max_file_size(mut self, n: usize) -> Self {
        self.builder = self.builder.max_file_size(n);
        self
    }

    /// Set how many days a date bucket is kept before it is deleted.
    ///
    /// Default to 1. Values above 730 are rejected by [`build`](Self::build).
    pub fn max_storage_days(mut self, n: u32) -> Self {
        self.builder = self.builder.max_storage_days(n);
        self
    }

    /// Set whether a non-empty file found at the initial path is rotated away on build.
    ///
    /// Default to `true`.
    pub fn rotate_on_open(mut self, yes: bool) -> Self {
        self.builder = self.builder.rotate_on_open(yes);
        self
    }

    /// Set whether to also roll over when the local date changes.
    ///
    /// Default to `true`. The date check runs before the size check.
    pub fn rollover_daily(mut self, yes: bool) -> Self {
        self.builder = self.builder.rollover_daily(yes);
        self
    }

    /// Register an output observer. See [`RotatingFile::add_on_output`].
    pub fn on_output<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Level) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(f));
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: super::clock::Clock) -> Self {
        self.builder = self.builder.clock(clock);
        self
    }
}

/// An appender that writes log records to size-rotated files grouped in date buckets.
///
/// Records are totally ordered by one sink lock: the rotation check, a possible rotation, the
/// append, the size update and the notification of observers all happen while it is held. The
/// lock is reentrant, so an observer may log through the sink it observes.
#[derive(Debug)]
pub struct RotatingFile {
    sink: ReentrantMutex<RefCell<RollingFileWriter>>,
    layout: Box<dyn Layout>,
    observers: Observers,
    trap: Arc<dyn Trap>,
}

impl RotatingFile {
    fn new(writer: RollingFileWriter, layout: Box<dyn Layout>, trap: Arc<dyn Trap>) -> Self {
        Self {
            sink: ReentrantMutex::new(RefCell::new(writer)),
            layout,
            observers: Observers::default(),
            trap,
        }
    }

    /// Register an observer called with `(message, level)` after each record is written.
    ///
    /// Observers run in registration order, once per record that was written successfully, and
    /// see records in the order they were written to the file. They run under the sink lock, so
    /// a slow observer holds back writers on other threads. A panicking observer is reported to
    /// the trap and does not affect the write or the other observers.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use daybucket::append::RotatingFileBuilder;
    ///
    /// let file = RotatingFileBuilder::new("logs/app.log").build().unwrap();
    /// file.add_on_output(|msg, level| println!("{level}: {msg}"));
    /// ```
    pub fn add_on_output<F>(&self, f: F)
    where
        F: Fn(&str, Level) + Send + Sync + 'static,
    {
        self.observers.add(Arc::new(f));
    }

    /// The path of the active log file, if one is open.
    pub fn current_path(&self) -> Option<PathBuf> {
        let sink = self.sink.lock();
        let writer = sink.borrow();
        writer.current_path().map(|p| p.to_path_buf())
    }
}

impl Append for RotatingFile {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');

        let sink = self.sink.lock();
        // the borrow ends before observers run, they may log through this sink
        sink.borrow_mut().write_all(&bytes).map_err(|err| {
            Error::new("failed to write log record")
                .with_context("level", record.level())
                .with_source(err)
        })?;

        let message = String::from_utf8_lossy(&bytes[..bytes.len() - 1]);
        self.observers
            .notify(&message, record.level(), self.trap.as_ref());
        drop(sink);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let sink = self.sink.lock();
        sink.borrow_mut().flush().map_err(Error::from_io_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::str::FromStr;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use jiff::Zoned;
    use tempfile::TempDir;

    use super::*;
    use crate::ErrorKind;
    use crate::append::rotating_file::clock::Clock;
    use crate::layout::IdenticalLayout;
    use crate::trap::testing::CollectTrap;

    fn record(level: Level, payload: &str) -> Record<'_> {
        Record::builder().level(level).payload(payload).build()
    }

    #[test]
    fn test_observers_see_each_written_record_once() {
        let temp_dir = TempDir::new().unwrap();
        let seen = Arc::new(Mutex::new(vec![]));
        let early = seen.clone();
        let file = RotatingFileBuilder::new(temp_dir.path().join("app.log"))
            .layout(IdenticalLayout::default())
            .on_output(move |msg, level| early.lock().unwrap().push(format!("1 {level} {msg}")))
            .build()
            .unwrap();
        let late = seen.clone();
        file.add_on_output(move |msg, level| late.lock().unwrap().push(format!("2 {level} {msg}")));

        file.append(&record(Level::Info, "hello")).unwrap();
        file.append(&record(Level::Fatal, "bye")).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            ["1 INFO hello", "2 INFO hello", "1 FATAL bye", "2 FATAL bye"]
        );
    }

    #[test]
    fn test_failed_write_notifies_nobody() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let file = RotatingFileBuilder::new(root.join("app.log"))
            .layout(IdenticalLayout::default())
            .max_storage_days(30)
            .on_output(move |_, _| *counter.lock().unwrap() += 1)
            .clock(Clock::pinned_at(
                Zoned::from_str("2024-08-10T23:59:59[UTC]").unwrap(),
            ))
            .build()
            .unwrap();
        file.append(&record(Level::Info, "day one")).unwrap();
        assert_eq!(*count.lock().unwrap(), 1);

        // the next bucket cannot be created, so the date rollover fails
        fs::write(root.join("2024-08-11"), "not a directory").unwrap();
        file.sink
            .lock()
            .borrow_mut()
            .set_now(Zoned::from_str("2024-08-11T00:00:01[UTC]").unwrap());

        let err = file.append(&record(Level::Info, "day two")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(file.current_path(), None);
    }

    #[test]
    fn test_observer_may_log_to_the_observed_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = Arc::new(
            RotatingFileBuilder::new(temp_dir.path().join("app.log"))
                .layout(IdenticalLayout::default())
                .build()
                .unwrap(),
        );

        let observed = Arc::downgrade(&file);
        file.add_on_output(move |msg, level| {
            if level == Level::Warn {
                if let Some(file) = observed.upgrade() {
                    let echo = format!("echo: {msg}");
                    file.append(&record(Level::Info, &echo)).unwrap();
                }
            }
        });

        file.append(&record(Level::Warn, "careful")).unwrap();
        file.flush().unwrap();

        let path = file.current_path().unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "careful\necho: careful\n");
    }

    #[test]
    fn test_slow_observer_keeps_write_order() {
        let temp_dir = TempDir::new().unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let started_tx = Mutex::new(started_tx);
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        let file = Arc::new(
            RotatingFileBuilder::new(temp_dir.path().join("app.log"))
                .layout(IdenticalLayout::default())
                .on_output(move |msg, _| {
                    if msg == "first" {
                        started_tx.lock().unwrap().send(()).unwrap();
                        thread::sleep(Duration::from_millis(300));
                    }
                    sink.lock().unwrap().push(msg.to_string());
                })
                .build()
                .unwrap(),
        );

        let first = {
            let file = file.clone();
            thread::spawn(move || file.append(&record(Level::Info, "first")).unwrap())
        };
        // "first" is in the file and its observer is running
        started_rx.recv().unwrap();
        let second = {
            let file = file.clone();
            thread::spawn(move || file.append(&record(Level::Info, "second")).unwrap())
        };
        first.join().unwrap();
        second.join().unwrap();
        file.flush().unwrap();

        let content = fs::read_to_string(file.current_path().unwrap()).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), ["first", "second"]);
        assert_eq!(*seen.lock().unwrap(), ["first", "second"]);
    }

    #[test]
    fn test_drop_leaves_complete_file() {
        let temp_dir = TempDir::new().unwrap();
        let trap = CollectTrap::default();
        let file = RotatingFileBuilder::new(temp_dir.path().join("app.log"))
            .layout(IdenticalLayout::default())
            .trap(trap.clone())
            .build()
            .unwrap();
        file.append(&record(Level::Info, "last words")).unwrap();
        let path = file.current_path().unwrap();

        drop(file);
        assert_eq!(fs::read_to_string(path).unwrap(), "last words\n");
        assert!(trap.messages().is_empty());
    }

    #[test]
    fn test_panicking_observer_does_not_fail_append() {
        let temp_dir = TempDir::new().unwrap();
        let trap = CollectTrap::default();
        let file = RotatingFileBuilder::new(temp_dir.path().join("app.log"))
            .layout(IdenticalLayout::default())
            .trap(trap.clone())
            .on_output(|_, _| panic!("boom"))
            .build()
            .unwrap();

        file.append(&record(Level::Error, "recorded anyway")).unwrap();
        file.flush().unwrap();

        let path = file.current_path().unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "recorded anyway\n");
        assert_eq!(trap.messages().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let temp_dir = TempDir::new().unwrap();
        let file = Arc::new(
            RotatingFileBuilder::new(temp_dir.path().join("app.log"))
                .layout(IdenticalLayout::default())
                .build()
                .unwrap(),
        );

        let handles = (0..8)
            .map(|t| {
                let file = file.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let payload = format!("thread-{t}-record-{i:03}-{}", "z".repeat(64));
                        file.append(&record(Level::Info, &payload)).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        file.flush().unwrap();

        let content = fs::read_to_string(file.current_path().unwrap()).unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 8 * 200);
        for line in lines {
            assert!(line.starts_with("thread-"));
            assert!(line.ends_with(&"z".repeat(64)));
        }
    }

    #[test]
    fn test_invalid_config_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("app.log");

        let err = RotatingFileBuilder::new(&log_path)
            .max_file_size(0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = RotatingFileBuilder::new(&log_path)
            .max_storage_days(800)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        assert!(!temp_dir.path().join("logs").exists());
    }
}
