/*!
Core types for meshbridge operations

Type-safe definitions for mesh membership, addressing, and the inbound
message frames the bridge drains off the mesh stack.
*/

use serde::{Deserialize, Serialize};

/// Logical identifier of a mesh node, assigned at join time and stable
/// across address changes. Node 0 is the master (this bridge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u8);

impl NodeId {
    /// The master node (the bridge itself)
    pub const MASTER: NodeId = NodeId(0);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routing-path-encoded mesh address, conventionally rendered in base 8
/// with a literal leading `0` (e.g. address 9 renders as `011`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshAddress(pub u16);

impl MeshAddress {
    /// The master node's address, the root of the routing tree
    pub const ROOT: MeshAddress = MeshAddress(0);
}

impl std::fmt::Display for MeshAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0{:o}", self.0)
    }
}

/// One observed member of the mesh: a logical id paired with the routing
/// address it currently holds. Immutable per observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshNode {
    pub node_id: NodeId,
    pub address: MeshAddress,
}

/// The bridge's own identity on the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshIdentity {
    pub node_id: NodeId,
    pub address: MeshAddress,
}

/// Header of a pending inbound frame, readable without consuming the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Application-level message type tag
    pub kind: u8,
    /// Per-sender sequence id
    pub id: u8,
    /// Payload size in bytes; the consuming read must request exactly this
    pub payload_len: usize,
}

/// A message addressed to the bridge itself, consumed exactly once from the
/// mesh stack's receive queue. The payload is carried but not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub kind: u8,
    pub id: u8,
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_octal_rendering() {
        assert_eq!(MeshAddress(0).to_string(), "00");
        assert_eq!(MeshAddress(1).to_string(), "01");
        assert_eq!(MeshAddress(8).to_string(), "010");
        assert_eq!(MeshAddress(9).to_string(), "011");
        assert_eq!(MeshAddress(0o45).to_string(), "045");
    }

    #[test]
    fn test_master_identity_constants() {
        assert_eq!(NodeId::MASTER, NodeId(0));
        assert_eq!(MeshAddress::ROOT, MeshAddress(0));
    }
}
