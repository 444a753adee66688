/*!
# Meshbridge - Mesh/IP Bridge Node

Bridge node between a low-power wireless mesh network and an IP network,
with periodic topology reporting to an HTTP collector.

## Architecture

```text
┌──────────────┐   radio    ┌──────────────┐    IP     ┌──────────────┐
│ Mesh nodes   │ <--------> │  Meshbridge  │ <-------> │ LAN / uplink │
│ (sensors,    │            │  gateway +   │           │              │
│  relays)     │            │  control loop│           │              │
└──────────────┘            └──────┬───────┘           └──────────────┘
                                   │ POST topology report
                                   ▼
                            ┌──────────────┐
                            │  Collector   │
                            └──────────────┘
```

The control loop interleaves three concerns per iteration: pump one cycle of
mesh↔IP bridging, report mesh membership once per configured interval, and
drain any application message addressed to the bridge itself. Reports are
sent off-loop with an at-most-one-in-flight guarantee so a slow collector
never starves packet pumping.

## Quick Start

```rust,no_run
use meshbridge::{BridgeConfig, ControlLoop, Reporter, SimulatedMesh};
use meshbridge::types::{MeshAddress, MeshIdentity, NodeId};
use std::sync::Arc;

#[tokio::main]
async fn main() -> meshbridge::Result<()> {
    meshbridge::init();

    let config = BridgeConfig::builder()
        .collector_url("http://10.10.2.2/api/gateway")
        .build()?;

    let identity = MeshIdentity {
        node_id: NodeId(config.node_id),
        address: MeshAddress::ROOT,
    };
    let (mesh, _handle) = SimulatedMesh::new(identity, config.gateway.clone());
    let reporter = Reporter::new(&config)?;

    ControlLoop::new(&config, Arc::new(mesh), reporter)?.run().await;
    Ok(())
}
```
*/

#![warn(missing_docs, rust_2018_idioms)]

// Re-export key types and functions for convenience
pub use bridge::{drain_one, ControlLoop, LoopMetrics, LoopStats, ReportingTimer};
pub use config::{BridgeConfig, GatewayConfig};
pub use error::{BridgeError, ReportError, Result};
pub use mesh::{MeshStack, SimulatedMesh, SimulatedMeshHandle};
pub use report::{encode_report, snapshot, Reporter};

// Core modules
pub mod bridge;
pub mod config;
pub mod error;
pub mod mesh;
pub mod report;
pub mod types;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize meshbridge with default tracing configuration
pub fn init() {
    init_with_tracing("info")
}

/// Initialize meshbridge with custom tracing filter
pub fn init_with_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("meshbridge initialized with tracing filter: {}", filter);
}

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get the library name
pub fn name() -> &'static str {
    env!("CARGO_PKG_NAME")
}
