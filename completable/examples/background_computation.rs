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

use std::thread;
use std::time::Duration;

use completable::CancelPolicy;
use completable::ResultFuture;
use completable_common::CompletableConfig;
use completable_common::ParseConfigFile;
use tracing::info;
use tracing::warn;

fn main() {
    // An optional config file path, e.g. `completable.toml`.
    let config = match std::env::args().nth(1) {
        Some(path) => match ParseConfigFile::parse_config_file::<CompletableConfig>(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config {path}: {e}");
                return;
            }
        },
        None => CompletableConfig {
            await_timeout_millis: 2_000,
            ..Default::default()
        },
    };
    config.init_logger();

    // Compute a value in the background, then handle it on the calling thread.
    let future = ResultFuture::<Vec<String>, String>::new(CancelPolicy::Deferred);
    let producer = future.clone();
    let worker = thread::Builder::new()
        .name("background-computation".to_string())
        .spawn(move || {
            producer.run(|this| {
                let mut targets = Vec::new();
                for name in ["debug", "release", "test"] {
                    if this.is_cancel_requested() {
                        return Err("computation abandoned".to_string());
                    }
                    thread::sleep(Duration::from_millis(50));
                    targets.push(format!("build target: {name}"));
                }
                Ok(targets)
            })
        });

    let worker = match worker {
        Ok(worker) => worker,
        Err(e) => {
            warn!("failed to start worker: {}", e);
            return;
        }
    };

    match future.await_configured(&config) {
        Ok(targets) => targets.iter().for_each(|target| info!("{}", target)),
        Err(e) => warn!("computation did not produce a value: {}", e),
    }

    if let Ok(Err(e)) = worker.join() {
        warn!("worker completed twice: {}", e);
    }

    let native = ResultFuture::<u32, String>::completed(42).as_native_future();
    info!("completed future resolves to {:?}, cancel = {}", native.get(), native.cancel(true));
}
