/*!
Topology reporting

Membership observation and the wire format of the collector report. The
report body is a strict serialization contract with the collector side:

```text
masterNodeId=<id>&masterAddress=0<addr octal>&nodeList=<id>|0<addr octal>||...
```

Decimal ids, octal addresses with a literal leading `0`, entries joined by
`||` with no trailing delimiter. [`encode_report`] is a pure function; the
unit tests pin the literal format.
*/

use crate::mesh::MeshStack;
use crate::types::{MeshIdentity, MeshNode};
use std::fmt::Write;
use tracing::debug;

pub mod reporter;

pub use reporter::Reporter;

/// Observe current mesh membership.
///
/// Walks the stack's address table in table order, resolving the logical id
/// for each address. The snapshot is taken fresh per reporting tick and
/// never cached. An address with no resolvable id is skipped; the table
/// normally carries both sides of every pairing, so this only happens when
/// a node is mid-rejoin.
pub fn snapshot<M: MeshStack + ?Sized>(mesh: &M) -> Vec<MeshNode> {
    let mut nodes = Vec::new();
    for address in mesh.list_addresses() {
        match mesh.resolve_node_id(address) {
            Some(node_id) => nodes.push(MeshNode { node_id, address }),
            None => debug!(%address, "address table entry has no resolvable node id"),
        }
    }
    nodes
}

/// Encode a membership snapshot into the collector's form body.
///
/// Pure; an empty snapshot yields an empty `nodeList=` section, which the
/// collector accepts.
pub fn encode_report(local: MeshIdentity, nodes: &[MeshNode]) -> String {
    let mut body = format!(
        "masterNodeId={}&masterAddress={}&nodeList=",
        local.node_id, local.address
    );

    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            body.push_str("||");
        }
        // write! to a String cannot fail
        let _ = write!(body, "{}|{}", node.node_id, node.address);
    }

    body
}
