/*!
 Data structures and models used by the object graph.
*/

use crate::records::models::Value;

/// A handle into the graph's node arena
pub type NodeId = usize;

/// Object id of nodes that do not correspond to a wire object
pub const NO_OBJECT_ID: i32 = -1;

/// Type label given to nodes that have been referenced but not yet defined
pub const UNRESOLVED: &str = "Unresolved";

/// A vertex in the assembled object graph
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// The wire object id, or [`NO_OBJECT_ID`] for synthesized nodes
    pub id: i32,
    /// Class name, primitive kind name, or library name
    pub node_type: Option<String>,
    /// Member name in a class, or decimal index in an array
    pub name: Option<String>,
    pub value: Option<Value>,
    /// Handles of child nodes, in parse order
    pub members: Vec<NodeId>,
}

impl ObjectNode {
    /// A node with no identity, used for inline values and synthesized children
    pub(crate) fn new() -> Self {
        Self {
            id: NO_OBJECT_ID,
            node_type: None,
            name: None,
            value: None,
            members: vec![],
        }
    }

    /// A placeholder for an object id that has been referenced but not yet defined
    pub(crate) fn unresolved(id: i32) -> Self {
        Self {
            id,
            node_type: Some(UNRESOLVED.to_string()),
            name: None,
            value: None,
            members: vec![],
        }
    }
}
