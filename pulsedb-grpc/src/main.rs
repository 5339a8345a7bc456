// Copyright 2026 Sushanth (https://github.com/sushanthpy)
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

//! PulseDB gRPC Server
//!
//! Starts the log-table service: an in-memory, append-only, schema-typed
//! log store with live indexes, named filters, trigger-driven alerts,
//! and paginated server-side cursors.
//!
//! ## Usage
//!
//! ```bash
//! # Start on default port 9090
//! pulsedb-server
//!
//! # Bind to a specific address
//! pulsedb-server --host 0.0.0.0 --port 9090
//! ```

use clap::Parser;
use pulsedb_engine::config::MAX_CONCURRENCY;
use pulsedb_engine::store::Store;
use pulsedb_engine::HandlerRegistry;
use pulsedb_grpc::LogTableServer;
use std::sync::Arc;
use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// PulseDB gRPC Server
#[derive(Parser, Debug)]
#[command(name = "pulsedb-server")]
#[command(about = "PulseDB server - streaming telemetry log engine")]
#[command(version)]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "9090")]
    port: u16,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = format!("{}:{}", args.host, args.port).parse()?;

    let store = Arc::new(Store::new());
    let registry = Arc::new(HandlerRegistry::new());
    let server = LogTableServer::new(store, registry);

    tracing::info!("Starting PulseDB gRPC server on {}", addr);
    tracing::info!("Server version: {}", env!("CARGO_PKG_VERSION"));

    println!(
        r#"
╔══════════════════════════════════════════════════════════╗
║              PulseDB gRPC Server                         ║
╠══════════════════════════════════════════════════════════╣
║  Server:     {}
║  Version:    {}
║                                                          ║
║  Service:                                                ║
║    - LogTableService   append-only log tables with       ║
║                        filters, triggers, and cursors    ║
╚══════════════════════════════════════════════════════════╝
"#,
        addr,
        env!("CARGO_PKG_VERSION")
    );

    Server::builder()
        .concurrency_limit_per_connection(MAX_CONCURRENCY)
        .add_service(server.into_service())
        .serve(addr)
        .await?;

    Ok(())
}
