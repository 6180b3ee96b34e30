//! Provides a DFS visitor to allow simple AIG traversal.
//!
//! See [`Dfs`] for details.
//!
//! [`Dfs`]: Dfs

use std::collections::HashSet;

use crate::{Aig, AigEdge, AigNodeRef, NodeId};

/// A simple DFS visitor over fanin cones.
///
/// Nodes are yielded in preorder. You can:
/// - start a DFS from a node using [`from_node`]
/// - start from several edges using [`from_edges`]
/// - or visit all the AIG that matters by starting from the outputs using [`from_outputs`].
///
/// With several starts, it explores the fanin of the first one, then all non-previously-explored
/// nodes from the fanin of the second one, and so on.
///
/// [`from_node`]: Dfs::from_node
/// [`from_edges`]: Dfs::from_edges
/// [`from_outputs`]: Dfs::from_outputs
///
/// Example:
///
/// ```rust
/// use aigmatch::{Aig, dfs::Dfs};
/// let mut aig = Aig::new();
/// let a = aig.add_input("a");
/// let b = aig.add_input("b");
/// let y = aig.and(&a, &b);
/// aig.add_output(y, "y");
/// assert_eq!(Dfs::from_outputs(&aig).count(), 3);
/// ```
///
/// Inspired by [petgraph DFS](https://docs.rs/petgraph/latest/petgraph/visit/struct.Dfs.html).
pub struct Dfs {
    /// Must maintain the following invariant:
    /// - all nodes on the stack have not been visited yet
    /// - their `seen` flag is set to true to avoid adding them one more time to the stack
    /// - the different nodes from which to start a DFS are in starts
    ///   (they might have been visited already by the time we start the DFS from them,
    ///   and will simply be discarded if that's the case).
    stack: Vec<AigNodeRef>,
    seen: HashSet<NodeId>,
    starts: Vec<AigNodeRef>,
}

impl Dfs {
    /// Create a DFS from the initial start node.
    /// You will only browse the fanin of this node.
    pub fn from_node(start: AigNodeRef) -> Self {
        Dfs::from_nodes(vec![start])
    }

    /// Create a DFS from the nodes the given edges point at, in order.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a AigEdge>) -> Self {
        Dfs::from_nodes(edges.into_iter().map(AigEdge::get_node).collect())
    }

    /// Create a DFS from the outputs of the given AIG.
    /// Dangling gates are never reached.
    pub fn from_outputs(aig: &Aig) -> Self {
        Dfs::from_edges(aig.get_outputs())
    }

    fn from_nodes(mut starts: Vec<AigNodeRef>) -> Self {
        starts.reverse();
        let mut dfs = Dfs {
            stack: Vec::new(),
            seen: HashSet::new(),
            starts,
        };
        dfs.new_start();
        dfs
    }

    /// Returns true if we are ready to start again! Else false, we are done.
    /// Should only be called when stack is empty (ie we are done with the current fanin).
    fn new_start(&mut self) -> bool {
        debug_assert!(self.stack.is_empty());

        while let Some(node) = self.starts.pop() {
            if self.seen.insert(node.get_id()) {
                self.stack.push(node);
                return true;
            }
        }
        false
    }
}

impl Iterator for Dfs {
    type Item = AigNodeRef;

    /// Yield the next node of the DFS, or None if it is done.
    /// This might be a new start if the current fanin has been fully explored.
    fn next(&mut self) -> Option<AigNodeRef> {
        loop {
            if let Some(node) = self.stack.pop() {
                for child in node.get_fanins() {
                    if self.seen.insert(child.get_node_id()) {
                        self.stack.push(child.get_node());
                    }
                }
                return Some(node);
            }

            // Maybe we can start from a different node?
            if !self.new_start() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_node_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let ab = aig.and(&a, &!&b);

        let visited: Vec<NodeId> = Dfs::from_node(ab.get_node()).map(|n| n.get_id()).collect();
        // first node is known, then its children in any order
        assert_eq!(visited.len(), 3);
        assert_eq!(visited[0], ab.get_node_id());
        assert!(visited.contains(&a.get_node_id()));
        assert!(visited.contains(&b.get_node_id()));
    }

    #[test]
    fn from_outputs_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let c = aig.add_input("c");
        let ab = aig.and(&a, &b);
        let abc = aig.and(&ab, &c);
        // dangling
        aig.and(&a, &c);
        aig.add_output(ab.clone(), "x");
        aig.add_output(!&abc, "y");
        aig.add_output(aig.constant(true), "one");

        let mut dfs = Dfs::from_outputs(&aig);
        // Starting by the first output
        assert_eq!(dfs.next().unwrap().get_id(), ab.get_node_id());
        let rest: Vec<NodeId> = dfs.map(|n| n.get_id()).collect();
        assert_eq!(rest.len(), 5);
        assert!(rest.contains(&abc.get_node_id()));
        assert!(rest.contains(&c.get_node_id()));
        assert!(rest.contains(&0));
        // a and b are visited before moving to the second output
        assert!(rest[..2].contains(&a.get_node_id()));
        assert!(rest[..2].contains(&b.get_node_id()));
    }

    #[test]
    fn repeated_node_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let ab = aig.and(&a, &b);
        let nab = aig.and(&!&a, &ab);

        let dfs = Dfs::from_edges([&nab, &ab, &nab]);
        assert_eq!(dfs.count(), 4);
    }
}
