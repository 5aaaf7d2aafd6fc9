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

use std::num::NonZeroUsize;

use jiff::civil::Date;

/// Why the active file must be replaced before the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rollover {
    /// The local date differs from the date the active file was opened on.
    DateChanged,
    /// The incoming record does not fit into the active file.
    SizeExceeded,
}

/// Decides whether a record may be appended to the active file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RotationPolicy {
    max_size: NonZeroUsize,
    daily: bool,
}

impl RotationPolicy {
    pub(crate) fn new(max_size: NonZeroUsize, daily: bool) -> Self {
        Self { max_size, daily }
    }

    /// The date check runs first: a new day must land in a new bucket whatever the size budget.
    ///
    /// An empty file is never rotated for size. A record larger than the limit is written to an
    /// empty file rather than producing an endless chain of empty files.
    pub(crate) fn decide(
        &self,
        opened_on: Date,
        today: Date,
        current_size: usize,
        incoming: usize,
    ) -> Option<Rollover> {
        if self.daily && today != opened_on {
            return Some(Rollover::DateChanged);
        }

        if current_size > 0 && current_size.saturating_add(incoming) > self.max_size.get() {
            return Some(Rollover::SizeExceeded);
        }

        None
    }
}
