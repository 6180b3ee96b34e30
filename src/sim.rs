//! Bit-parallel simulation of an [`Aig`].
//!
//! A [`Simulator`] compiles a network into dense slots once: slot 0 is the constant, slots
//! `1..=n` are the inputs in position order, then one slot per AND gate in topological order.
//! Each `u64` word carries 64 independent patterns.

use std::collections::HashMap;

use crate::{Aig, AigEdge, NodeId};

#[derive(Debug, Clone, Copy)]
struct Fanin {
    slot: usize,
    complement: bool,
}

impl Fanin {
    fn value(&self, values: &[u64]) -> u64 {
        let v = values[self.slot];
        if self.complement { !v } else { v }
    }
}

#[derive(Debug, Clone, Copy)]
struct Gate {
    fanin0: Fanin,
    fanin1: Fanin,
}

/// A compiled, reusable simulator for one network.
#[derive(Debug, Clone)]
pub struct Simulator {
    num_inputs: usize,
    gates: Vec<Gate>,
    outputs: Vec<Fanin>,
    /// Per input, the gates of its transitive fanout cone in topological order.
    fanout_cones: Vec<Vec<usize>>,
}

/// Pattern word where every bit holds `value`.
pub fn broadcast(value: bool) -> u64 {
    if value { u64::MAX } else { 0 }
}

impl Simulator {
    pub fn new(aig: &Aig) -> Self {
        let num_inputs = aig.num_inputs();
        let mut slots: HashMap<NodeId, usize> = HashMap::with_capacity(aig.num_nodes());
        slots.insert(0, 0);
        for (k, input) in aig.get_inputs().iter().enumerate() {
            slots.insert(input.get_id(), k + 1);
        }

        let fanin_of = |slots: &HashMap<NodeId, usize>, edge: &AigEdge| Fanin {
            slot: slots.get(&edge.get_node_id()).copied().unwrap_or(0),
            complement: edge.get_complement(),
        };

        let ands = aig.and_nodes();
        let mut gates = Vec::with_capacity(ands.len());
        for node in &ands {
            let fanins = node.get_fanins();
            gates.push(Gate {
                fanin0: fanin_of(&slots, &fanins[0]),
                fanin1: fanin_of(&slots, &fanins[1]),
            });
            slots.insert(node.get_id(), num_inputs + 1 + gates.len() - 1);
        }

        let outputs = aig
            .get_outputs()
            .iter()
            .map(|edge| fanin_of(&slots, edge))
            .collect();

        // Gate fanouts, as gate indices.
        let first_gate = num_inputs + 1;
        let mut fanouts: Vec<Vec<usize>> = vec![Vec::new(); first_gate + gates.len()];
        for (g, gate) in gates.iter().enumerate() {
            fanouts[gate.fanin0.slot].push(g);
            if gate.fanin1.slot != gate.fanin0.slot {
                fanouts[gate.fanin1.slot].push(g);
            }
        }

        let mut fanout_cones = Vec::with_capacity(num_inputs);
        let mut mark = vec![usize::MAX; gates.len()];
        for input in 0..num_inputs {
            let mut cone = Vec::new();
            let mut stack = fanouts[input + 1].clone();
            while let Some(g) = stack.pop() {
                if mark[g] == input {
                    continue;
                }
                mark[g] = input;
                cone.push(g);
                stack.extend(fanouts[first_gate + g].iter().copied());
            }
            cone.sort_unstable();
            fanout_cones.push(cone);
        }

        Simulator {
            num_inputs,
            gates,
            outputs,
            fanout_cones,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Number of gates whose value may change when `input` flips.
    pub fn cone_size(&self, input: usize) -> usize {
        self.fanout_cones.get(input).map_or(0, Vec::len)
    }

    fn eval_gate(&self, g: usize, values: &mut [u64]) {
        let gate = self.gates[g];
        values[self.num_inputs + 1 + g] = gate.fanin0.value(values) & gate.fanin1.value(values);
    }

    /// Simulates one word per input and returns the value of every slot.
    ///
    /// Missing input words are taken as 0.
    pub fn simulate(&self, inputs: &[u64]) -> Vec<u64> {
        let mut values = vec![0; self.num_inputs + 1 + self.gates.len()];
        for (k, &word) in inputs.iter().take(self.num_inputs).enumerate() {
            values[k + 1] = word;
        }
        for g in 0..self.gates.len() {
            self.eval_gate(g, &mut values);
        }
        values
    }

    /// Output words from slot values computed by [`Simulator::simulate`].
    pub fn outputs(&self, values: &[u64]) -> Vec<u64> {
        self.outputs.iter().map(|o| o.value(values)).collect()
    }

    /// Output words when `input` is complemented, everything else as in `values`.
    ///
    /// Only the gates of the fanout cone of `input` are re-evaluated.
    pub fn simulate_flip(&self, values: &[u64], input: usize) -> Vec<u64> {
        let mut flipped = values.to_vec();
        flipped[input + 1] = !flipped[input + 1];
        if let Some(cone) = self.fanout_cones.get(input) {
            for &g in cone {
                self.eval_gate(g, &mut flipped);
            }
        }
        self.outputs(&flipped)
    }

    /// Single pattern simulation.
    pub fn simulate_pattern(&self, pattern: &[bool]) -> Vec<bool> {
        let words: Vec<u64> = pattern.iter().map(|&b| broadcast(b)).collect();
        let values = self.simulate(&words);
        self.outputs(&values).iter().map(|&w| w & 1 == 1).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// y = a & !b, z = (a & !b) | c
    fn sample() -> Aig {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let c = aig.add_input("c");
        let anb = aig.and(&a, &!&b);
        let z = aig.or(&anb, &c);
        aig.add_output(anb, "y");
        aig.add_output(z, "z");
        aig
    }

    #[test]
    fn simulate_pattern_test() {
        let sim = Simulator::new(&sample());
        assert_eq!(sim.simulate_pattern(&[true, false, false]), vec![true, true]);
        assert_eq!(sim.simulate_pattern(&[true, true, false]), vec![false, false]);
        assert_eq!(sim.simulate_pattern(&[false, true, true]), vec![false, true]);
    }

    #[test]
    fn simulate_words_test() {
        let sim = Simulator::new(&sample());
        let a = 0b1100u64;
        let b = 0b1010u64;
        let c = 0b0001u64;
        let out = sim.outputs(&sim.simulate(&[a, b, c]));
        assert_eq!(out[0], a & !b);
        assert_eq!(out[1], (a & !b) | c);
    }

    #[test]
    fn simulate_flip_test() {
        let sim = Simulator::new(&sample());
        assert_eq!(sim.cone_size(0), 2);
        assert_eq!(sim.cone_size(2), 1);

        let words = [0b1100u64, 0b1010, 0b0001];
        let values = sim.simulate(&words);
        for input in 0..3 {
            let mut flipped = words;
            flipped[input] = !flipped[input];
            let expected = sim.outputs(&sim.simulate(&flipped));
            assert_eq!(sim.simulate_flip(&values, input), expected);
        }
    }

    #[test]
    fn constant_output_test() {
        let mut aig = Aig::new();
        aig.add_input("a");
        aig.add_output(aig.constant(true), "one");
        aig.add_output(aig.constant(false), "zero");
        let sim = Simulator::new(&aig);
        assert_eq!(sim.simulate_pattern(&[false]), vec![true, false]);
        assert_eq!(sim.simulate_flip(&sim.simulate(&[0]), 0), vec![u64::MAX, 0]);
    }
}
