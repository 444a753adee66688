/*!
In-memory mesh stack

Channel-free simulation of the gateway subsystem: an address table and a
receive queue behind mutexes, with an injector handle for feeding membership
changes and inbound frames from outside the control loop. Used by the CLI
`start` command when no radio driver is compiled in, and throughout the test
suite.
*/

use crate::config::GatewayConfig;
use crate::types::{FrameHeader, InboundMessage, MeshAddress, MeshIdentity, NodeId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::MeshStack;

#[derive(Debug, Default)]
struct Inner {
    address_table: Mutex<Vec<(NodeId, MeshAddress)>>,
    rx_queue: Mutex<VecDeque<(FrameHeader, Vec<u8>)>>,
    pump_cycles: AtomicU64,
}

/// Simulated mesh/IP gateway
#[derive(Debug)]
pub struct SimulatedMesh {
    identity: MeshIdentity,
    gateway: GatewayConfig,
    inner: Arc<Inner>,
}

/// Injector side of a [`SimulatedMesh`]: joins and drops members, queues
/// inbound frames. Cloneable and usable from any thread.
#[derive(Clone)]
pub struct SimulatedMeshHandle {
    inner: Arc<Inner>,
}

impl SimulatedMesh {
    /// Create a simulated mesh with the given local identity and IP-side
    /// binding, returning the stack and its injector handle. The gateway
    /// owns the IP address and subnet for the lifetime of the stack, the
    /// same way a real driver applies them once at startup.
    pub fn new(identity: MeshIdentity, gateway: GatewayConfig) -> (Self, SimulatedMeshHandle) {
        let inner = Arc::new(Inner::default());
        let handle = SimulatedMeshHandle {
            inner: inner.clone(),
        };
        (
            Self {
                identity,
                gateway,
                inner,
            },
            handle,
        )
    }

    /// The IP binding applied at construction
    pub fn gateway(&self) -> &GatewayConfig {
        &self.gateway
    }

    /// Number of pump cycles driven so far
    pub fn pump_cycles(&self) -> u64 {
        self.inner.pump_cycles.load(Ordering::Relaxed)
    }
}

impl SimulatedMeshHandle {
    /// Add a member to the address table, replacing any entry already
    /// holding the same address.
    pub fn join_node(&self, node_id: NodeId, address: MeshAddress) {
        let mut table = self.inner.address_table.lock();
        table.retain(|(_, a)| *a != address);
        table.push((node_id, address));
    }

    /// Remove a member by logical id
    pub fn drop_node(&self, node_id: NodeId) {
        self.inner.address_table.lock().retain(|(n, _)| *n != node_id);
    }

    /// Queue an inbound frame addressed to the bridge
    pub fn inject_frame(&self, kind: u8, id: u8, payload: Vec<u8>) {
        let header = FrameHeader {
            kind,
            id,
            payload_len: payload.len(),
        };
        self.inner.rx_queue.lock().push_back((header, payload));
    }
}

#[async_trait]
impl MeshStack for SimulatedMesh {
    async fn pump(&self) {
        // No real traffic tables to drain; account the cycle so tests can
        // assert the loop never starves the pump.
        self.inner.pump_cycles.fetch_add(1, Ordering::Relaxed);
    }

    fn list_addresses(&self) -> Vec<MeshAddress> {
        self.inner
            .address_table
            .lock()
            .iter()
            .map(|(_, a)| *a)
            .collect()
    }

    fn resolve_node_id(&self, address: MeshAddress) -> Option<NodeId> {
        self.inner
            .address_table
            .lock()
            .iter()
            .find(|(_, a)| *a == address)
            .map(|(n, _)| *n)
    }

    fn local_identity(&self) -> MeshIdentity {
        self.identity
    }

    fn peek(&self) -> Option<FrameHeader> {
        self.inner.rx_queue.lock().front().map(|(h, _)| *h)
    }

    fn read(&self, payload_len: usize) -> Option<InboundMessage> {
        let (header, mut payload) = self.inner.rx_queue.lock().pop_front()?;
        payload.truncate(payload_len);
        Some(InboundMessage {
            kind: header.kind,
            id: header.id,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> MeshIdentity {
        MeshIdentity {
            node_id: NodeId::MASTER,
            address: MeshAddress::ROOT,
        }
    }

    fn new_mesh() -> (SimulatedMesh, SimulatedMeshHandle) {
        SimulatedMesh::new(master(), GatewayConfig::default())
    }

    #[test]
    fn test_ip_binding_applied_at_construction() {
        use std::net::Ipv4Addr;

        let gateway = GatewayConfig {
            ip: Ipv4Addr::new(10, 10, 3, 1),
            subnet: Ipv4Addr::new(255, 255, 0, 0),
        };
        let (mesh, _handle) = SimulatedMesh::new(master(), gateway);

        assert_eq!(mesh.gateway().ip, Ipv4Addr::new(10, 10, 3, 1));
        assert_eq!(mesh.gateway().subnet, Ipv4Addr::new(255, 255, 0, 0));
    }

    #[test]
    fn test_join_and_resolve() {
        let (mesh, handle) = new_mesh();

        handle.join_node(NodeId(2), MeshAddress(0o5));
        handle.join_node(NodeId(3), MeshAddress(0o15));

        assert_eq!(mesh.list_addresses(), vec![MeshAddress(0o5), MeshAddress(0o15)]);
        assert_eq!(mesh.resolve_node_id(MeshAddress(0o5)), Some(NodeId(2)));
        assert_eq!(mesh.resolve_node_id(MeshAddress(0o44)), None);
    }

    #[test]
    fn test_rejoin_replaces_address_holder() {
        let (mesh, handle) = new_mesh();

        handle.join_node(NodeId(2), MeshAddress(0o5));
        handle.join_node(NodeId(4), MeshAddress(0o5));

        assert_eq!(mesh.list_addresses().len(), 1);
        assert_eq!(mesh.resolve_node_id(MeshAddress(0o5)), Some(NodeId(4)));
    }

    #[test]
    fn test_drop_node() {
        let (mesh, handle) = new_mesh();

        handle.join_node(NodeId(2), MeshAddress(0o5));
        handle.drop_node(NodeId(2));

        assert!(mesh.list_addresses().is_empty());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let (mesh, handle) = new_mesh();
        handle.inject_frame(1, 42, vec![0xAB, 0xCD]);

        let header = mesh.peek().unwrap();
        assert_eq!(header.payload_len, 2);
        assert!(mesh.peek().is_some());

        let msg = mesh.read(header.payload_len).unwrap();
        assert_eq!(msg.kind, 1);
        assert_eq!(msg.id, 42);
        assert_eq!(msg.payload, vec![0xAB, 0xCD]);

        assert!(mesh.peek().is_none());
        assert!(mesh.read(0).is_none());
    }

    #[test]
    fn test_pump_counts_cycles() {
        let (mesh, _handle) = new_mesh();
        tokio_test::block_on(async {
            mesh.pump().await;
            mesh.pump().await;
        });
        assert_eq!(mesh.pump_cycles(), 2);
    }
}
