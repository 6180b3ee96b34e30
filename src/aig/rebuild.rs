use std::collections::HashMap;

use crate::{Aig, AigEdge, AigError, AigNode, NodeId, Result};

impl Aig {
    /// Instantiates this AIG inside `dst`, input `k` of `self` being driven by `input_edges[k]`.
    ///
    /// Gates reachable from the outputs are recreated in topological order through [`Aig::and`],
    /// so the copy is structurally hashed against what `dst` already contains.
    /// Returns the edges of `dst` driving each output of `self`.
    pub fn copy_into(&self, dst: &mut Aig, input_edges: &[AigEdge]) -> Result<Vec<AigEdge>> {
        if input_edges.len() != self.num_inputs() {
            return Err(AigError::InvalidState(format!(
                "copy needs {} input edges, got {}",
                self.num_inputs(),
                input_edges.len()
            )));
        }

        let mut map: HashMap<NodeId, AigEdge> = HashMap::with_capacity(self.num_nodes());
        map.insert(0, dst.constant(false));
        for (input, edge) in self.inputs.iter().zip(input_edges) {
            map.insert(input.get_id(), edge.clone());
        }

        let lookup = |map: &HashMap<NodeId, AigEdge>, edge: &AigEdge| -> Result<AigEdge> {
            let id = edge.get_node_id();
            let mapped = map.get(&id).ok_or(AigError::NodeDoesNotExist(id))?;
            Ok(mapped.clone().not_if(edge.get_complement()))
        };

        for node in self.get_topological_sort() {
            if let AigNode::And { id, fanin0, fanin1 } = node.as_ref() {
                let new_fanin0 = lookup(&map, fanin0)?;
                let new_fanin1 = lookup(&map, fanin1)?;
                let edge = dst.and(&new_fanin0, &new_fanin1);
                map.insert(*id, edge);
            }
        }

        self.outputs
            .iter()
            .map(|output| lookup(&map, output))
            .collect()
    }

    /// Performs a real recursive clone of the AIG through the hashing builder.
    ///
    /// We are not just incrementing reference counters, but instead creating brand new nodes.
    /// Dangling gates are dropped, duplicated gates are merged and ids become dense.
    pub fn strash(&self) -> Result<Self> {
        let mut aig = Aig::new();
        let inputs: Vec<AigEdge> = self
            .input_names
            .iter()
            .map(|name| aig.add_input(name.clone()))
            .collect();

        let outputs = self.copy_into(&mut aig, &inputs)?;
        for (edge, name) in outputs.into_iter().zip(&self.output_names) {
            aig.add_output(edge, name.clone());
        }

        aig.check_integrity()?;
        Ok(aig)
    }

    /// Builds a copy of the AIG with inputs and outputs reordered.
    ///
    /// Input `k` of the result is input `input_perm[k]` of `self` (name included), and output `k`
    /// of the result is output `output_perm[k]` of `self`.
    pub fn permuted(&self, input_perm: &[usize], output_perm: &[usize]) -> Result<Self> {
        check_permutation(input_perm, self.num_inputs())?;
        check_permutation(output_perm, self.num_outputs())?;

        let mut aig = Aig::new();
        let mut inputs: Vec<Option<AigEdge>> = vec![None; self.num_inputs()];
        for &old in input_perm {
            inputs[old] = Some(aig.add_input(self.input_names[old].clone()));
        }
        let inputs: Vec<AigEdge> = inputs.into_iter().flatten().collect();

        let outputs = self.copy_into(&mut aig, &inputs)?;
        for &old in output_perm {
            aig.add_output(outputs[old].clone(), self.output_names[old].clone());
        }

        aig.check_integrity()?;
        Ok(aig)
    }
}

fn check_permutation(perm: &[usize], len: usize) -> Result<()> {
    let mut seen = vec![false; len];
    for &k in perm {
        if k >= len || seen[k] {
            return Err(AigError::InvalidPermutation(perm.to_vec(), len));
        }
        seen[k] = true;
    }
    if perm.len() != len {
        return Err(AigError::InvalidPermutation(perm.to_vec(), len));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::Simulator;

    fn sample() -> Aig {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let c = aig.add_input("c");
        let ab = aig.and(&a, &!&b);
        let y = aig.or(&ab, &c);
        // dangling
        aig.and(&b, &c);
        aig.add_output(y, "y");
        aig.add_output(!ab, "z");
        aig
    }

    #[test]
    fn strash_test() {
        let aig = sample();
        let copy = aig.strash().unwrap();
        assert_eq!(copy.num_inputs(), 3);
        assert_eq!(copy.num_outputs(), 2);
        assert_eq!(copy.num_ands(), 2);
        assert_eq!(copy.input_names(), aig.input_names());
        assert_eq!(copy.output_names(), aig.output_names());

        let s0 = Simulator::new(&aig);
        let s1 = Simulator::new(&copy);
        for pattern in 0..8u32 {
            let bits: Vec<bool> = (0..3).map(|k| pattern >> k & 1 == 1).collect();
            assert_eq!(s0.simulate_pattern(&bits), s1.simulate_pattern(&bits));
        }
    }

    #[test]
    fn permuted_test() {
        let aig = sample();
        let perm = aig.permuted(&[2, 0, 1], &[1, 0]).unwrap();
        assert_eq!(perm.input_names(), &["c", "a", "b"]);
        assert_eq!(perm.output_names(), &["z", "y"]);

        let s0 = Simulator::new(&aig);
        let s1 = Simulator::new(&perm);
        for pattern in 0..8u32 {
            let bits: Vec<bool> = (0..3).map(|k| pattern >> k & 1 == 1).collect();
            let permuted_bits = vec![bits[2], bits[0], bits[1]];
            let out = s0.simulate_pattern(&bits);
            let permuted_out = s1.simulate_pattern(&permuted_bits);
            assert_eq!(permuted_out, vec![out[1], out[0]]);
        }
    }

    #[test]
    fn invalid_permutation_test() {
        let aig = sample();
        assert!(aig.permuted(&[0, 0, 1], &[0, 1]).is_err());
        assert!(aig.permuted(&[0, 1], &[0, 1]).is_err());
        assert!(aig.permuted(&[0, 1, 2], &[2, 0]).is_err());
    }
}
