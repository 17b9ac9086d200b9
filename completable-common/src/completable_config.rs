// Copyright 2026 The Completable Rust Authors
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

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::log::Level;

/// Default value functions for Serde deserialization
mod defaults {
    pub fn log_level() -> String {
        "INFO".to_string()
    }
}

/// Settings shared by producers and consumers of completable results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletableConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    /// Default bound for configured waits, in milliseconds. `0` waits indefinitely.
    #[serde(default)]
    pub await_timeout_millis: u64,
}

impl Default for CompletableConfig {
    fn default() -> Self {
        CompletableConfig {
            log_level: defaults::log_level(),
            await_timeout_millis: 0,
        }
    }
}

impl CompletableConfig {
    pub fn await_timeout(&self) -> Option<Duration> {
        match self.await_timeout_millis {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    pub fn log_level(&self) -> completable_error::Result<Level> {
        Level::from_str(self.log_level.as_str())
    }

    /// Installs the global subscriber at the configured level, falling back to INFO when the
    /// configured level is invalid.
    pub fn init_logger(&self) {
        crate::log::init_logger_with_level(self.log_level().unwrap_or(Level::INFO));
    }
}
