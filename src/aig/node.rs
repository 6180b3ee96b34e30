use std::rc::Rc;

use super::AigEdge;

/// A node id.
///
/// The constant node [`AigNode::False`] has id 0 by convention. Ids are unique and
/// allocated increasingly, so every AND gate has a greater id than both of its fanins.
pub type NodeId = u64;

/// An AIG node.
///
/// Networks handled here are purely combinational: there is no latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AigNode {
    /// The constant low/false signal.
    False,
    /// A primary input.
    Input(NodeId),
    /// An AND gate with two fanins.
    And {
        id: NodeId,
        fanin0: AigEdge,
        fanin1: AigEdge,
    },
}

/// A wrapper for AIG nodes to allow multiple references to it.
///
/// Nodes are never mutated once they are part of a network, so a plain [`Rc`] is enough.
pub type AigNodeRef = Rc<AigNode>;

impl AigNode {
    /// Returns a new and gate.
    pub fn and(id: NodeId, fanin0: AigEdge, fanin1: AigEdge) -> Self {
        if id == 0 {
            panic!(
                "Hey, you are trying to create an AND gate with id=0. \
                Id=0 is reserved for the constant node AigNode::False."
            )
        }
        AigNode::And { id, fanin0, fanin1 }
    }

    pub fn is_false(&self) -> bool {
        matches!(self, AigNode::False)
    }

    pub fn is_input(&self) -> bool {
        matches!(self, AigNode::Input(_))
    }

    pub fn is_and(&self) -> bool {
        matches!(self, AigNode::And { .. })
    }

    pub fn get_id(&self) -> NodeId {
        match *self {
            AigNode::False => 0,
            AigNode::Input(id) => id,
            AigNode::And { id, .. } => id,
        }
    }

    /// Returns the fanins of the node (empty for the constant and the inputs).
    pub fn get_fanins(&self) -> Vec<AigEdge> {
        match self {
            AigNode::And { fanin0, fanin1, .. } => vec![fanin0.clone(), fanin1.clone()],
            _ => Vec::new(),
        }
    }

    /// Returns the fanin ids of the node, in fanin order.
    pub fn get_fanin_ids(&self) -> Vec<NodeId> {
        self.get_fanins().iter().map(AigEdge::get_node_id).collect()
    }
}
