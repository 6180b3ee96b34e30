use std::rc::Rc;

use crate::{Aig, AigEdge, AigError, AigNode, AigNodeRef, Result};

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment. Derived networks (parsed, strashed, cofactors) are
    /// checked once right after being built.
    ///
    /// Checks that:
    /// - each registered node has the id it is registered under, and only `False` has id 0
    /// - every fanin and every output driver refers to a node of this AIG
    /// - every AND gate has a strictly larger id than its fanins (topological ids)
    /// - inputs positions and names are coherent
    /// - the structural hashing table only refers to registered gates with matching fanins.
    pub fn check_integrity(&self) -> Result<()> {
        for (&id, node) in &self.nodes {
            if node.get_id() != id {
                return Err(AigError::InvalidState(format!(
                    "incoherent node id: {} in map vs {} in reality",
                    id,
                    node.get_id()
                )));
            }
            self.check_node_integrity(node)?;
        }

        if self.inputs.len() != self.input_names.len()
            || self.inputs.len() != self.input_positions.len()
        {
            return Err(AigError::InvalidState(
                "inputs, their names and their positions disagree".to_string(),
            ));
        }
        for (position, input) in self.inputs.iter().enumerate() {
            self.check_edge_integrity(&AigEdge::new(input.clone(), false))?;
            if !input.is_input() || self.input_position(input.get_id()) != Some(position) {
                return Err(AigError::InvalidState(format!(
                    "node {} is registered as input {} but is not",
                    input.get_id(),
                    position
                )));
            }
        }

        if self.outputs.len() != self.output_names.len() {
            return Err(AigError::InvalidState(
                "outputs and their names disagree".to_string(),
            ));
        }
        for output in &self.outputs {
            self.check_edge_integrity(output)?;
        }

        for (&(lo, hi), node) in &self.strash {
            let registered = self.get_node(node.get_id());
            let fanins: Vec<(u64, bool)> =
                node.get_fanins().iter().map(<(u64, bool)>::from).collect();
            if registered.is_none() || fanins != vec![lo, hi] {
                return Err(AigError::InvalidState(format!(
                    "strash entry {:?} does not match node {}",
                    (lo, hi),
                    node.get_id()
                )));
            }
        }

        Ok(())
    }

    /// Check the integrity for an individual node, that is:
    /// - check that only `False` have id 0
    /// - check that fanins of and gates are valid and topologically ordered.
    fn check_node_integrity(&self, node: &AigNodeRef) -> Result<()> {
        match node.as_ref() {
            AigNode::False => {
                if !Rc::ptr_eq(node, &self.node_false) {
                    return Err(AigError::InvalidState("invalid false node".to_string()));
                }
            }
            AigNode::Input(id) => {
                if *id == 0 {
                    return Err(AigError::IdZeroButNotFalse);
                }
            }
            AigNode::And { id, fanin0, fanin1 } => {
                if *id == 0 {
                    return Err(AigError::IdZeroButNotFalse);
                }
                for fanin in [fanin0, fanin1] {
                    self.check_edge_integrity(fanin)?;
                    if fanin.get_node_id() >= *id {
                        return Err(AigError::InvalidState(format!(
                            "id of parent {} should be strictly larger than its fanin {}",
                            id,
                            fanin.get_node_id()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// The edge must point at the very node registered under its id, not a lookalike
    /// from another AIG.
    fn check_edge_integrity(&self, fanin: &AigEdge) -> Result<()> {
        let id = fanin.get_node_id();
        let registered = self.get_node(id).ok_or(AigError::InvalidState(format!(
            "edge pointing at node {} which is not in the AIG",
            id
        )))?;
        if !Rc::ptr_eq(&registered, &fanin.node) {
            return Err(AigError::InvalidState(format!(
                "edge pointing at a node {} from another AIG",
                id
            )));
        }
        Ok(())
    }
}
