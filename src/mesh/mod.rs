/*!
Mesh stack interface

The control loop never talks to radio hardware directly; it drives an
injected [`MeshStack`] that owns the routing tables, the mesh/IP packet
translation, and the receive queue. A deployment binds a real driver here;
[`SimulatedMesh`] is the in-memory implementation used by the CLI when no
radio is attached and by the test suite.
*/

use crate::types::{FrameHeader, InboundMessage, MeshAddress, MeshIdentity, NodeId};
use async_trait::async_trait;

pub mod simulated;

pub use simulated::{SimulatedMesh, SimulatedMeshHandle};

/// Interface to the underlying mesh/IP gateway subsystem.
///
/// All methods take `&self`; implementations own their interior mutability
/// the same way a hardware driver owns its DMA rings.
#[async_trait]
pub trait MeshStack: Send + Sync {
    /// Advance one unit of bridging work: drain pending IP-bound and
    /// mesh-bound traffic queued inside the gateway. Fire-and-forget;
    /// bridging failures stay internal to the stack.
    async fn pump(&self);

    /// Current contents of the address table, in table order. Must not
    /// mutate the table; ordering is only stable for the duration of one
    /// call.
    fn list_addresses(&self) -> Vec<MeshAddress>;

    /// Resolve the logical id currently holding `address`, if any
    fn resolve_node_id(&self, address: MeshAddress) -> Option<NodeId>;

    /// This node's own id and address on the mesh
    fn local_identity(&self) -> MeshIdentity;

    /// Header of the next frame addressed to this node, without consuming
    /// it. `None` when the receive queue is empty.
    fn peek(&self) -> Option<FrameHeader>;

    /// Consume the next frame, reading exactly `payload_len` bytes of
    /// payload. Advances the receive queue; a frame is returned at most
    /// once.
    fn read(&self, payload_len: usize) -> Option<InboundMessage>;
}
