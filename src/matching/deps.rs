use rand::Rng;

use super::partition::Partition;
use crate::{Aig, Result, support::functional_support};

/// Functional dependencies of one network, in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependencies {
    /// Per input, the outputs depending on it.
    pub inputs: Vec<Vec<usize>>,
    /// Per output, the inputs it depends on.
    pub outputs: Vec<Vec<usize>>,
}

impl Dependencies {
    /// Builds both lists from a support matrix indexed `[output][input]`.
    pub fn from_supports(num_inputs: usize, supports: &[Vec<bool>]) -> Self {
        let mut inputs = vec![Vec::new(); num_inputs];
        let mut outputs = Vec::with_capacity(supports.len());
        for (o, row) in supports.iter().enumerate() {
            let list: Vec<usize> = (0..num_inputs).filter(|&i| row[i]).collect();
            for &i in &list {
                inputs[i].push(o);
            }
            outputs.push(list);
        }
        Dependencies { inputs, outputs }
    }

    pub fn compute(aig: &Aig, sim_rounds: usize, rng: &mut impl Rng) -> Result<Self> {
        let supports = functional_support(aig, sim_rounds, rng)?;
        Ok(Dependencies::from_supports(aig.num_inputs(), &supports))
    }

    /// Reorders the output list of every input by output class, keeping the current order
    /// inside a class.
    pub fn regroup_inputs(&mut self, output_classes: &Partition) {
        regroup_by_class(&mut self.inputs, output_classes);
    }

    /// Reorders the input list of every output by input class.
    pub fn regroup_outputs(&mut self, input_classes: &Partition) {
        regroup_by_class(&mut self.outputs, input_classes);
    }
}

fn regroup_by_class(lists: &mut [Vec<usize>], opposite: &Partition) {
    for list in lists.iter_mut().filter(|l| l.len() > 1) {
        list.sort_by_key(|&e| opposite.class_of(e));
    }
}

/// Multiset of the classes of the elements of `list`, as a sorted vector.
pub fn class_signature(list: &[usize], opposite: &Partition) -> Vec<usize> {
    let mut signature: Vec<usize> = list.iter().map(|&e| opposite.class_of(e)).collect();
    signature.sort_unstable();
    signature
}
