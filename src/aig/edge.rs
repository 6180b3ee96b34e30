//! An [`AigEdge`] points at an [`AigNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! [`AigNode`]: crate::AigNode

use std::ops::Not;

use crate::NodeId;

use super::AigNodeRef;

/// A directed edge representing a fanin (or an output driver).
///
/// The edge can carry an inverter according to the value of `complement`.
///
/// For example:
///
/// ```rust
/// use aigmatch::Aig;
/// let aig = Aig::new();
/// let low = aig.constant(false);
/// let high = aig.constant(true);
/// assert_eq!(low, !&high);
/// assert!(high.is_cst_true());
/// ```
#[derive(Clone, Debug, Eq)]
pub struct AigEdge {
    /// The node the edge is refering to.
    pub(super) node: AigNodeRef,
    /// Set to true if signal should be inverted.
    pub(super) complement: bool,
}

impl Not for AigEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl Not for &AigEdge {
    type Output = AigEdge;

    fn not(self) -> Self::Output {
        !self.clone()
    }
}

impl PartialEq for AigEdge {
    fn eq(&self, other: &Self) -> bool {
        self.complement == other.complement && self.get_node_id() == other.get_node_id()
    }
}

impl From<&AigEdge> for (NodeId, bool) {
    fn from(edge: &AigEdge) -> Self {
        (edge.get_node_id(), edge.get_complement())
    }
}

impl AigEdge {
    pub fn new(node: AigNodeRef, complement: bool) -> Self {
        AigEdge { node, complement }
    }

    pub fn get_node(&self) -> AigNodeRef {
        self.node.clone()
    }

    pub fn get_node_id(&self) -> NodeId {
        self.node.get_id()
    }

    pub fn get_complement(&self) -> bool {
        self.complement
    }

    /// Complements the edge if `condition` holds.
    pub fn not_if(self, condition: bool) -> Self {
        if condition { !self } else { self }
    }

    pub fn is_constant(&self) -> bool {
        self.get_node_id() == 0
    }

    pub fn is_cst_false(&self) -> bool {
        self.is_constant() && !self.complement
    }

    pub fn is_cst_true(&self) -> bool {
        self.is_constant() && self.complement
    }

    pub fn is_complement_of(&self, other: &AigEdge) -> bool {
        self.get_node_id() == other.get_node_id() && self.get_complement() ^ other.get_complement()
    }
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::AigNode;

    #[test]
    fn edge_complement_test() {
        let a = Rc::new(AigNode::Input(1));
        let e = AigEdge::new(a.clone(), false);
        let ne = !&e;

        assert!(e.is_complement_of(&ne));
        assert!(!e.is_complement_of(&e));
        assert_eq!(!ne.clone(), e);
        assert_eq!(e.clone().not_if(true), ne);
        assert_eq!(e.clone().not_if(false), e);
        assert_eq!(<(NodeId, bool)>::from(&ne), (1, true));
        assert!(!e.is_constant());
    }
}
