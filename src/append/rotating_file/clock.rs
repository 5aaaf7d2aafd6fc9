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

use jiff::Zoned;

/// Where the rolling writer reads the wall-clock time from.
///
/// Outside of tests this is always the system clock in the system time zone. Unit tests pin it
/// to a fixed instant and move it forward by hand.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    #[cfg(test)]
    pinned: Option<Zoned>,
}

impl Clock {
    pub(crate) fn now(&self) -> Zoned {
        #[cfg(test)]
        if let Some(now) = &self.pinned {
            return now.clone();
        }
        Zoned::now()
    }

    #[cfg(test)]
    pub(crate) fn pinned_at(now: Zoned) -> Clock {
        Clock { pinned: Some(now) }
    }

    #[cfg(test)]
    pub(crate) fn set_now(&mut self, now: Zoned) {
        self.pinned = Some(now);
    }
}
