//! Simulation-driven refinement of one side.
//!
//! A round simulates one pattern and splits, in this order:
//! 1. outputs by their value,
//! 2. inputs by the classes of the dependent outputs that are 1 once the input flips,
//! 3. outputs by the classes of the inputs whose flip changes them.
//!
//! The matcher runs the same round on both networks with corresponding patterns, so both sides
//! split identically when they match.

use super::{
    deps::{Dependencies, class_signature},
    partition::Partition,
};
use crate::sim::{Simulator, broadcast};

/// Refinement state of one network across simulation rounds.
pub struct SideRefiner<'a> {
    sim: &'a Simulator,
    /// Per input, how many times flipping it changed a dependent output.
    observability: Vec<u64>,
}

impl<'a> SideRefiner<'a> {
    pub fn new(sim: &'a Simulator) -> Self {
        SideRefiner {
            sim,
            observability: vec![0; sim.num_inputs()],
        }
    }

    pub fn observability(&self) -> &[u64] {
        &self.observability
    }

    /// Runs one round under `pattern`, one bit per input. Returns the number of new classes,
    /// inputs and outputs together.
    pub fn round(
        &mut self,
        pattern: &[bool],
        inputs: &mut Partition,
        outputs: &mut Partition,
        deps: &mut Dependencies,
    ) -> usize {
        let words: Vec<u64> = pattern.iter().map(|&b| broadcast(b)).collect();
        let values = self.sim.simulate(&words);
        let base: Vec<bool> = self.sim.outputs(&values).iter().map(|&w| w & 1 == 1).collect();

        let by_value = outputs.refine_with(|_, o| base[o]);
        if by_value > 0 {
            deps.regroup_inputs(outputs);
        }

        // Classes of the inputs whose flip changed each output, filled during the input pass.
        let mut flipped_by: Vec<Vec<usize>> = vec![Vec::new(); outputs.num_elements()];
        let sim = self.sim;
        let observability = &mut self.observability;
        let input_deps = &deps.inputs;
        let output_classes: &Partition = outputs;
        let by_flip = inputs.refine_with(|class, i| {
            let flipped: Vec<bool> = sim
                .simulate_flip(&values, i)
                .iter()
                .map(|&w| w & 1 == 1)
                .collect();
            let mut high = Vec::new();
            for &o in &input_deps[i] {
                if flipped[o] {
                    high.push(o);
                }
                if flipped[o] != base[o] {
                    observability[i] += 1;
                    flipped_by[o].push(class);
                }
            }
            class_signature(&high, output_classes)
        });
        if by_flip > 0 {
            deps.regroup_outputs(inputs);
        }

        let by_observers = outputs.refine_with(|_, o| {
            let mut signature = flipped_by[o].clone();
            signature.sort_unstable();
            signature
        });
        if by_observers > 0 {
            deps.regroup_inputs(outputs);
        }

        by_value + by_flip + by_observers
    }
}
