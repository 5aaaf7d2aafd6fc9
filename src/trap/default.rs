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

use std::io;
use std::io::Write;

use crate::Error;
use crate::trap::Trap;

/// The trap used when none is configured: one line per error on standard error.
///
/// Lines are prefixed with `daybucket:` so they can be told apart from the application's own
/// stderr output. Write failures are ignored.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct DefaultTrap {}

impl DefaultTrap {
    fn render(err: &Error) -> String {
        format!("daybucket: {err}")
    }
}

impl Trap for DefaultTrap {
    fn trap(&self, err: &Error) {
        let line = Self::render(err);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_names_the_crate() {
        let err = Error::new("failed to remove expired log dir").with_context("dir", "logs/2024-01-01");
        assert_eq!(
            DefaultTrap::render(&err),
            "daybucket: failed to remove expired log dir (Unexpected), context: { dir: logs/2024-01-01 }"
        );
    }
}
