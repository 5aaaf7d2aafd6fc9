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

use std::fs;

use daybucket::append::RotatingFileBuilder;
use daybucket::layout::TextLayout;
use daybucket::record::Level;
use daybucket::record::LevelFilter;
use jiff::tz::TimeZone;
use tempfile::TempDir;

#[test]
fn test_logger_fans_out_by_level() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let root = temp_dir.path();
    let errors = std::sync::Arc::new(
        RotatingFileBuilder::new(root.join("errors").join("app.log"))
            .layout(TextLayout::default().timezone(TimeZone::UTC))
            .build()
            .unwrap(),
    );
    let everything = std::sync::Arc::new(
        RotatingFileBuilder::new(root.join("all").join("app.log"))
            .layout(TextLayout::default().timezone(TimeZone::UTC))
            .build()
            .unwrap(),
    );

    let logger = daybucket::builder()
        .dispatch(|d| {
            d.filter(LevelFilter::MoreSevereEqual(Level::Error))
                .append(errors.clone())
        })
        .dispatch(|d| d.append(everything.clone()))
        .build();

    logger.info(format_args!("starting {} workers", 4)).unwrap();
    let line = line!() + 1;
    logger.error(format_args!("worker {} crashed", 3)).unwrap();
    logger.flush().unwrap();

    let errors = fs::read_to_string(errors.current_path().unwrap()).unwrap();
    let errors = errors.lines().collect::<Vec<_>>();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("] [ERROR] |"));
    assert!(errors[0].ends_with(&format!("[logger.rs:{line}]: worker 3 crashed")));

    let everything = fs::read_to_string(everything.current_path().unwrap()).unwrap();
    let everything = everything.lines().collect::<Vec<_>>();
    assert_eq!(everything.len(), 2);
    assert!(everything[0].contains("] [INFO] |"));
    assert!(everything[0].ends_with("]: starting 4 workers"));
}
