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

//! Traps for errors that cannot be returned to the caller.
//!
//! A best-effort operation, such as removing an expired date bucket or flushing a file on drop,
//! must not abort the write that triggered it. Such errors are handed to a [`Trap`] instead.

use std::fmt;
use std::sync::Arc;

use crate::Error;

mod default;

pub use self::default::DefaultTrap;

/// A trap for processing errors raised off the regular error path.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Process the error.
    fn trap(&self, err: &Error);
}

impl<T: Trap> From<T> for Box<dyn Trap> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

impl<T: Trap + ?Sized> Trap for Arc<T> {
    fn trap(&self, err: &Error) {
        (**self).trap(err)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    /// A trap that records every error message it receives.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct CollectTrap {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl CollectTrap {
        pub(crate) fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Trap for CollectTrap {
        fn trap(&self, err: &Error) {
            self.messages.lock().unwrap().push(err.to_string());
        }
    }
}
