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

//! Appender for writing log records to size-rotated files in daily directories.
//!
//! # Layout on disk
//!
//! ```text
//! logs/
//! ├── 2024-06-04/
//! │   └── app_2024-06-04-09:12:44.log
//! └── 2024-06-05/
//!     ├── app_2024-06-05-00:00:01.log
//!     └── app_2024-06-05-13:40:02.log
//! ```
//!
//! Only subdirectories named exactly `YYYY-MM-DD` are ever deleted by the retention sweep.
//!
//! # Example
//!
//! ```no_run
//! use daybucket::append::RotatingFileBuilder;
//! use daybucket::record::Record;
//! use daybucket::Append;
//!
//! let file = RotatingFileBuilder::new("logs/app.log")
//!     .max_file_size(1024 * 1024)
//!     .max_storage_days(3)
//!     .build()
//!     .unwrap();
//!
//! file.append(&Record::builder().payload("hello").build()).unwrap();
//! println!("writing to {:?}", file.current_path());
//! ```

pub use self::append::RotatingFile;
pub use self::append::RotatingFileBuilder;
pub use self::observer::OnOutput;
pub use self::rolling::RollingFileWriter;
pub use self::rolling::RollingFileWriterBuilder;

mod append;
mod clock;
mod filename;
mod observer;
mod retention;
mod rolling;
mod rotation;

/// Default maximum size of a single log file: 20 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Default number of days a date bucket is kept.
pub const DEFAULT_MAX_STORAGE_DAYS: u32 = 1;

/// Upper bound accepted for the retention window, in days.
pub const MAX_STORAGE_DAYS: u32 = 730;
