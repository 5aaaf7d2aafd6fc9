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

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::Mutex;

use crate::Error;
use crate::Trap;
use crate::record::Level;

/// A callback invoked with each record written by a [`RotatingFile`](super::RotatingFile).
///
/// The message is the formatted record without its trailing newline.
pub type OnOutput = dyn Fn(&str, Level) + Send + Sync + 'static;

/// Output observers of one appender, called in registration order.
///
/// The list has its own lock. Observers are called on a snapshot taken under that lock, so an
/// observer may register more observers or log through the appender it observes.
#[derive(Default)]
pub(crate) struct Observers {
    callbacks: Mutex<Vec<Arc<OnOutput>>>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.snapshot().len())
            .finish()
    }
}

impl Observers {
    pub(crate) fn add(&self, callback: Arc<OnOutput>) {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
        callbacks.push(callback);
    }

    fn snapshot(&self) -> Vec<Arc<OnOutput>> {
        let callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
        callbacks.clone()
    }

    /// A panicking observer is reported to `trap`; the remaining observers still run.
    pub(crate) fn notify(&self, message: &str, level: Level, trap: &dyn Trap) {
        for (index, callback) in self.snapshot().iter().enumerate() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(message, level)))
            {
                let err = Error::new("output observer panicked")
                    .with_context("observer", index)
                    .with_context("panic", panic_message(payload.as_ref()));
                trap.trap(&err);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trap::testing::CollectTrap;

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Arc::new(Mutex::new(vec![]));
        let observers = Observers::default();
        for name in ["a", "b", "c"] {
            let seen = seen.clone();
            observers.add(Arc::new(move |msg: &str, level: Level| {
                seen.lock().unwrap().push(format!("{name}:{level}:{msg}"));
            }));
        }

        let trap = CollectTrap::default();
        observers.notify("hello", Level::Info, &trap);
        assert_eq!(
            *seen.lock().unwrap(),
            ["a:INFO:hello", "b:INFO:hello", "c:INFO:hello"]
        );
        assert!(trap.messages().is_empty());
    }

    #[test]
    fn test_panicking_observer_is_isolated() {
        let seen = Arc::new(Mutex::new(vec![]));
        let observers = Observers::default();
        observers.add(Arc::new(|_: &str, _: Level| panic!("observer is broken")));
        let sink = seen.clone();
        observers.add(Arc::new(move |msg: &str, _: Level| {
            sink.lock().unwrap().push(msg.to_string());
        }));

        let trap = CollectTrap::default();
        observers.notify("still delivered", Level::Error, &trap);
        assert_eq!(*seen.lock().unwrap(), ["still delivered"]);

        let messages = trap.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("observer is broken"));
    }

    #[test]
    fn test_observer_may_register_observers() {
        let observers = Arc::new(Observers::default());
        let inner = observers.clone();
        observers.add(Arc::new(move |_: &str, _: Level| {
            inner.add(Arc::new(|_: &str, _: Level| {}));
        }));

        let trap = CollectTrap::default();
        observers.notify("one", Level::Info, &trap);
        assert_eq!(observers.snapshot().len(), 2);
    }
}
