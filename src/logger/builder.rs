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

use crate::Append;
use crate::Logger;
use crate::logger::log_impl::Dispatch;
use crate::record::LevelFilter;

/// Create a new empty [`LoggerBuilder`] instance for configuring log dispatching.
///
/// # Examples
///
/// ```no_run
/// use daybucket::append::RotatingFileBuilder;
///
/// let file = RotatingFileBuilder::new("logs/app.log").build().unwrap();
/// let logger = daybucket::builder().dispatch(|d| d.append(file)).build();
/// ```
pub fn builder() -> LoggerBuilder {
    LoggerBuilder { dispatches: vec![] }
}

/// A builder for configuring log dispatching and setting up the global logger.
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    // stashed dispatches
    dispatches: Vec<Dispatch>,
}

impl LoggerBuilder {
    /// Register a new dispatch with the [`LoggerBuilder`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use daybucket::append::RotatingFileBuilder;
    /// use daybucket::record::Level;
    /// use daybucket::record::LevelFilter;
    ///
    /// let errors = RotatingFileBuilder::new("logs/error.log").build().unwrap();
    /// let everything = RotatingFileBuilder::new("logs/app.log").build().unwrap();
    /// let logger = daybucket::builder()
    ///     .dispatch(|d| {
    ///         d.filter(LevelFilter::MoreSevereEqual(Level::Error))
    ///             .append(errors)
    ///     })
    ///     .dispatch(|d| d.append(everything))
    ///     .build();
    /// ```
    pub fn dispatch<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatchBuilder<false>) -> DispatchBuilder<true>,
    {
        self.dispatches.push(f(DispatchBuilder::new()).build());
        self
    }

    /// Build the [`Logger`].
    ///
    /// # Examples
    ///
    /// ```
    /// use daybucket::record::Record;
    ///
    /// let l = daybucket::builder().build();
    /// let r = Record::builder().payload("hello world!").build();
    /// l.log(&r).unwrap();
    /// ```
    pub fn build(self) -> Logger {
        Logger::new(self.dispatches)
    }

    /// Set up the global logger of the [`log`] crate with all the configured dispatches.
    ///
    /// This should be called early in the execution of a Rust program. Any log events that occur
    /// before initialization will be ignored.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    ///
    /// # Examples
    ///
    /// ```
    /// if daybucket::builder().try_apply().is_err() {
    ///     eprintln!("failed to set logger");
    /// }
    /// ```
    #[cfg(feature = "bridge-log")]
    pub fn try_apply(self) -> Result<(), crate::Error> {
        crate::bridge::log::set_default_logger(self.build())
    }

    /// Set up the global logger of the [`log`] crate with all the configured dispatches.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set.
    ///
    /// # Examples
    ///
    /// ```
    /// daybucket::builder().apply();
    /// ```
    #[cfg(feature = "bridge-log")]
    pub fn apply(self) {
        self.try_apply()
            .expect("LoggerBuilder::apply must be called before the global logger initialized");
    }
}

/// A builder for configuring a log dispatch, including level filters and appenders.
///
/// A record reaches the appenders of a dispatch only if every filter of that dispatch accepts
/// its level.
#[derive(Debug)]
pub struct DispatchBuilder<const APPEND: bool> {
    filters: Vec<LevelFilter>,
    appends: Vec<Box<dyn Append>>,
}

impl DispatchBuilder<false> {
    fn new() -> Self {
        DispatchBuilder {
            filters: vec![],
            appends: vec![],
        }
    }

    /// Add a level filter to this dispatch.
    pub fn filter(mut self, filter: impl Into<LevelFilter>) -> Self {
        self.filters.push(filter.into());
        self
    }
}

impl DispatchBuilder<true> {
    fn build(self) -> Dispatch {
        Dispatch::new(self.filters, self.appends)
    }
}

impl<const APPEND: bool> DispatchBuilder<APPEND> {
    /// Add an appender to this dispatch.
    pub fn append(mut self, append: impl Into<Box<dyn Append>>) -> DispatchBuilder<true> {
        self.appends.push(append.into());
        DispatchBuilder {
            filters: self.filters,
            appends: self.appends,
        }
    }
}
