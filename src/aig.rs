//! Module defining the [`Aig`] struct, as well as [`AigNode`], [`AigEdge`] and some others relevant structs.
//!
//! An [`Aig`] is built through its hashing constructor [`Aig::and`]: two AND gates with the same
//! fanins are never created twice, and gates with a constant or trivially related fanins are folded
//! away. Networks are immutable once built; derived networks (strashed copies, permutations,
//! cofactors) are always rebuilt from scratch.

mod cofactor;
pub mod edge;
pub mod error;
mod integrity;
pub mod node;
mod parser;
mod rebuild;

use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

pub use cofactor::LevelIndex;
pub use edge::AigEdge;
pub use error::{AigError, ParserError, Result};
pub use node::{AigNode, AigNodeRef, NodeId};

/// Key of the structural hashing table: both fanins as `(id, complement)`, smallest first.
type StrashKey = ((NodeId, bool), (NodeId, bool));

/// A whole combinational AIG.
///
/// Inputs and outputs are ordered: matching talks about them through their positions, see
/// [`Aig::get_input`] and [`Aig::get_output`]. Each of them carries a name, used for reporting.
///
/// Note that [`Aig::clone`] performs a shallow copy of the AIG (the nodes are shared, which is fine
/// as they are never mutated). If you need brand new nodes, use [`Aig::strash`].
#[derive(Debug, Clone)]
pub struct Aig {
    nodes: HashMap<NodeId, AigNodeRef>,
    inputs: Vec<AigNodeRef>,
    input_positions: HashMap<NodeId, usize>,
    input_names: Vec<String>,
    outputs: Vec<AigEdge>,
    output_names: Vec<String>,
    strash: HashMap<StrashKey, AigNodeRef>,
    next_id: NodeId,
    node_false: AigNodeRef,
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node [`AigNode::False`] included).
    pub fn new() -> Self {
        let node_false = Rc::new(AigNode::False);
        Aig {
            nodes: HashMap::from([(0, node_false.clone())]),
            inputs: Vec::new(),
            input_positions: HashMap::new(),
            input_names: Vec::new(),
            outputs: Vec::new(),
            output_names: Vec::new(),
            strash: HashMap::new(),
            next_id: 1,
            node_false,
        }
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<AigNodeRef> {
        self.nodes.get(&id).cloned()
    }

    /// Number of nodes, constant node included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of AND gates.
    pub fn num_ands(&self) -> usize {
        self.nodes.len() - self.inputs.len() - 1
    }

    /// The constant edge of value `value`.
    pub fn constant(&self, value: bool) -> AigEdge {
        AigEdge::new(self.node_false.clone(), value)
    }

    /// Registers a new primary input at the next position and returns a (non complemented) edge to it.
    pub fn add_input(&mut self, name: impl Into<String>) -> AigEdge {
        let id = self.fresh_id();
        let node = Rc::new(AigNode::Input(id));
        self.nodes.insert(id, node.clone());
        self.input_positions.insert(id, self.inputs.len());
        self.inputs.push(node.clone());
        self.input_names.push(name.into());
        AigEdge::new(node, false)
    }

    /// Registers `edge` as the next primary output.
    pub fn add_output(&mut self, edge: AigEdge, name: impl Into<String>) {
        self.outputs.push(edge);
        self.output_names.push(name.into());
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns an edge computing `AND(a, b)`.
    ///
    /// Constant fanins and trivial cases (`x & x`, `x & !x`) are folded, and an already existing
    /// gate with the same fanins is reused. Both edges must belong to this AIG.
    pub fn and(&mut self, a: &AigEdge, b: &AigEdge) -> AigEdge {
        if a.is_cst_false() || b.is_cst_false() || a.is_complement_of(b) {
            return self.constant(false);
        }
        if a.is_cst_true() || a == b {
            return b.clone();
        }
        if b.is_cst_true() {
            return a.clone();
        }

        let (lo, hi) = if <(NodeId, bool)>::from(a) <= <(NodeId, bool)>::from(b) {
            (a, b)
        } else {
            (b, a)
        };
        let key: StrashKey = (lo.into(), hi.into());
        if let Some(node) = self.strash.get(&key) {
            return AigEdge::new(node.clone(), false);
        }

        let id = self.fresh_id();
        let node = Rc::new(AigNode::and(id, lo.clone(), hi.clone()));
        self.nodes.insert(id, node.clone());
        self.strash.insert(key, node.clone());
        AigEdge::new(node, false)
    }

    pub fn or(&mut self, a: &AigEdge, b: &AigEdge) -> AigEdge {
        !self.and(&!a, &!b)
    }

    pub fn xor(&mut self, a: &AigEdge, b: &AigEdge) -> AigEdge {
        let t0 = self.and(a, &!b);
        let t1 = self.and(&!a, b);
        self.or(&t0, &t1)
    }

    /// `if sel { then } else { otherwise }`.
    pub fn mux(&mut self, sel: &AigEdge, then: &AigEdge, otherwise: &AigEdge) -> AigEdge {
        let t0 = self.and(sel, then);
        let t1 = self.and(&!sel, otherwise);
        self.or(&t0, &t1)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Retrieves inputs reference, in position order.
    pub fn get_inputs(&self) -> &[AigNodeRef] {
        &self.inputs
    }

    /// Retrieves the input at position `index`.
    pub fn get_input(&self, index: usize) -> Result<AigNodeRef> {
        self.inputs
            .get(index)
            .cloned()
            .ok_or(AigError::InputOutOfRange {
                index,
                len: self.inputs.len(),
            })
    }

    /// Non complemented edge to the input at position `index`.
    pub fn input_edge(&self, index: usize) -> Result<AigEdge> {
        Ok(AigEdge::new(self.get_input(index)?, false))
    }

    /// Position of the input with the given node id, if it is one.
    pub fn input_position(&self, id: NodeId) -> Option<usize> {
        self.input_positions.get(&id).copied()
    }

    /// Retrieves outputs drivers, in position order.
    pub fn get_outputs(&self) -> &[AigEdge] {
        &self.outputs
    }

    /// Retrieves the driver of the output at position `index`.
    pub fn get_output(&self, index: usize) -> Result<&AigEdge> {
        self.outputs.get(index).ok_or(AigError::OutputOutOfRange {
            index,
            len: self.outputs.len(),
        })
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// All AND gates, in topological order.
    ///
    /// Ids are allocated increasingly and a gate is only created after its fanins, so sorting
    /// by id is a valid topological order.
    pub fn and_nodes(&self) -> Vec<AigNodeRef> {
        let mut ands: Vec<AigNodeRef> = self
            .nodes
            .values()
            .filter(|n| n.is_and())
            .cloned()
            .collect();
        ands.sort_by_key(|n| n.get_id());
        ands
    }

    /// AND gates reachable from the outputs, fanins before fanouts.
    ///
    /// The traversal is an iterative post-order DFS started from each output in turn.
    pub fn get_topological_sort(&self) -> Vec<AigNodeRef> {
        let mut sort = Vec::new();
        let mut done: HashSet<NodeId> = HashSet::new();

        for output in &self.outputs {
            let mut stack: Vec<(AigNodeRef, bool)> = vec![(output.get_node(), false)];
            while let Some((node, expanded)) = stack.pop() {
                let id = node.get_id();
                if expanded {
                    sort.push(node);
                    continue;
                }
                if !node.is_and() || !done.insert(id) {
                    continue;
                }
                stack.push((node.clone(), true));
                for fanin in node.get_fanins() {
                    if fanin.node.is_and() && !done.contains(&fanin.get_node_id()) {
                        stack.push((fanin.get_node(), false));
                    }
                }
            }
        }
        sort
    }

    /// Topological level of each node: 0 for the constant and the inputs,
    /// `1 + max(level(fanins))` for AND gates.
    pub fn levels(&self) -> HashMap<NodeId, usize> {
        let mut levels: HashMap<NodeId, usize> = HashMap::with_capacity(self.nodes.len());
        levels.insert(0, 0);
        for input in &self.inputs {
            levels.insert(input.get_id(), 0);
        }
        for node in self.and_nodes() {
            let level = node
                .get_fanin_ids()
                .iter()
                .map(|id| levels.get(id).copied().unwrap_or(0))
                .max()
                .unwrap_or(0)
                + 1;
            levels.insert(node.get_id(), level);
        }
        levels
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn and_folding_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let t = aig.constant(true);
        let f = aig.constant(false);

        assert_eq!(aig.and(&a, &f), f);
        assert_eq!(aig.and(&f, &a), f);
        assert_eq!(aig.and(&a, &t), a);
        assert_eq!(aig.and(&t, &a), a);
        assert_eq!(aig.and(&a, &a), a);
        assert_eq!(aig.and(&a, &!&a), f);
        assert_eq!(aig.and(&t, &t), t);
        assert_eq!(aig.num_ands(), 0);
    }

    #[test]
    fn and_strash_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");

        let x = aig.and(&a, &b);
        let y = aig.and(&b, &a);
        assert_eq!(x, y);
        assert_eq!(aig.num_ands(), 1);

        let z = aig.and(&a, &!&b);
        assert_ne!(x, z);
        assert_eq!(aig.num_ands(), 2);

        let o = aig.or(&a, &b);
        assert!(o.get_complement());
        assert_eq!(aig.num_ands(), 3);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn inputs_outputs_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let x = aig.xor(&a, &b);
        aig.add_output(x.clone(), "x");
        aig.add_output(!&a, "na");

        assert_eq!(aig.num_inputs(), 2);
        assert_eq!(aig.num_outputs(), 2);
        assert_eq!(aig.input_position(b.get_node_id()), Some(1));
        assert_eq!(aig.input_position(x.get_node_id()), None);
        assert_eq!(aig.input_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(aig.output_names()[1], "na");
        assert_eq!(aig.get_output(0).unwrap(), &x);
        assert!(aig.get_output(2).is_err());
        assert!(aig.get_input(2).is_err());
        assert_eq!(aig.input_edge(0).unwrap(), a);
    }

    #[test]
    fn topological_sort_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let c = aig.add_input("c");
        let ab = aig.and(&a, &b);
        let abc = aig.and(&ab, &c);
        // dangling gate, not reachable from any output
        aig.and(&a, &c);
        aig.add_output(!abc, "y");

        let sort = aig.get_topological_sort();
        let ids: Vec<NodeId> = sort.iter().map(|n| n.get_id()).collect();
        assert_eq!(ids, vec![ab.get_node_id(), 5]);
        assert_eq!(aig.and_nodes().len(), 3);

        let levels = aig.levels();
        assert_eq!(levels[&a.get_node_id()], 0);
        assert_eq!(levels[&ab.get_node_id()], 1);
        assert_eq!(levels[&5], 2);
    }
}
