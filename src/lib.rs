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

//! Daybucket is a logger whose main appender writes size-rotated log files into one directory per
//! day, and deletes the directories that fall out of a retention window.
//!
//! # Overview
//!
//! A [`RotatingFile`](append::RotatingFile) configured with `logs/app.log` writes to
//! `logs/<YYYY-MM-DD>/app_<YYYY-MM-DD-HH:MM:SS>.log`. A new file is started when the next record
//! would push the active file past its size limit, or when the local date changes. Every time a
//! file is opened, date directories older than the retention window are removed. Output observers
//! can be registered to see every record that was written.
//!
//! # Examples
//!
//! ```no_run
//! use daybucket::append::RotatingFileBuilder;
//! use daybucket::record::Level;
//! use daybucket::record::LevelFilter;
//!
//! let file = RotatingFileBuilder::new("logs/app.log")
//!     .max_file_size(8 * 1024 * 1024)
//!     .max_storage_days(7)
//!     .on_output(|msg, level| {
//!         if level <= Level::Error {
//!             eprintln!("{msg}");
//!         }
//!     })
//!     .build()
//!     .unwrap();
//!
//! daybucket::builder()
//!     .dispatch(|d| d.filter(LevelFilter::MoreSevereEqual(Level::Info)).append(file))
//!     .apply();
//!
//! log::info!("This record lands in today's bucket.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod layout;
pub mod record;
pub mod trap;

pub use append::Append;
pub use layout::Layout;
pub use trap::Trap;

mod error;
pub use error::Error;
pub use error::ErrorKind;

mod bridge;

mod logger;
pub use logger::*;
