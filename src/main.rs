// This file is part of the terraform-provider-ncloud project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
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

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ncloud_provider::NcloudProvider;

mod config;
mod mongodb;
mod mysql;
mod ncloud_provider;
mod redis;
mod region;
mod sdk;
mod timeouts;
mod utils;
mod vpc;
mod wait;

/// Log filter, falls back to `RUST_LOG`
const LOG_ENV: &str = "NCLOUD_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the plugin handshake
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling pending waits");
                shutdown.cancel();
            }
        }
    });

    tf_provider::serve("ncloud", NcloudProvider::new(shutdown))
        .await
        .map_err(|err| anyhow::anyhow!("{err}"))
}
