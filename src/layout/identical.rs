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

use crate::Error;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that returns the payload of a log record as is.
///
/// This is useful when records arrive already formatted by an upstream front-end.
///
/// # Examples
///
/// ```
/// use daybucket::layout::IdenticalLayout;
///
/// let layout = IdenticalLayout::default();
/// ```
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct IdenticalLayout {}

impl Layout for IdenticalLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        Ok(record.payload().as_bytes().to_vec())
    }
}
