// Copyright 2025 Fedboard Contributors
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

use anyhow::Result;
use clap::Parser;
use fedboard_server::{config::ServerConfig, run_server};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config file)
    #[arg(long, env = "FEDBOARD_HTTP_ADDR")]
    listen_addr: Option<String>,

    /// Store URI, `file://<dir>` or `memory://` (overrides config file)
    #[arg(long, env = "FEDBOARD_STORAGE_URI")]
    storage_uri: Option<String>,

    /// Verify session tokens
    #[arg(long, env = "FEDBOARD_AUTH_ENABLED")]
    auth_enabled: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config)?;

    // CLI overrides
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }
    if let Some(uri) = args.storage_uri {
        config.storage.uri = uri;
    }
    if args.auth_enabled {
        config.auth.enabled = true;
    }

    run_server(config).await
}
