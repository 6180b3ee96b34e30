//! Structural and functional support of outputs.
//!
//! The functional support of an output is the set of inputs its function really depends on.
//! It is a subset of the structural support (the inputs of its fanin cone) and is computed in
//! three steps: structural cones give the candidates, random simulation with single input flips
//! proves most dependencies, and the remaining candidates are decided with SAT by comparing the
//! two cofactors of the output with respect to the input.

use log::debug;
use rand::Rng;

use crate::{
    Aig, LevelIndex, Result,
    dfs::Dfs,
    miter::{EquivResult, check_equivalence},
    sim::Simulator,
};

/// Sorted input positions of the fanin cone of output `output`.
pub fn structural_support(aig: &Aig, output: usize) -> Result<Vec<usize>> {
    let driver = aig.get_output(output)?;
    let mut support: Vec<usize> = Dfs::from_edges([driver])
        .filter_map(|node| aig.input_position(node.get_id()))
        .collect();
    support.sort_unstable();
    Ok(support)
}

/// Functional support of every output, as one bit per input.
///
/// `rounds` is the number of 64-wide random patterns tried before falling back to SAT.
pub fn functional_support(aig: &Aig, rounds: usize, rng: &mut impl Rng) -> Result<Vec<Vec<bool>>> {
    let num_inputs = aig.num_inputs();
    let num_outputs = aig.num_outputs();
    let mut support = vec![vec![false; num_inputs]; num_outputs];

    // Per input, the outputs whose cone contains it and not proven dependent yet.
    let mut pending: Vec<Vec<usize>> = vec![Vec::new(); num_inputs];
    for o in 0..num_outputs {
        for i in structural_support(aig, o)? {
            pending[i].push(o);
        }
    }

    let sim = Simulator::new(aig);
    for _ in 0..rounds {
        if pending.iter().all(Vec::is_empty) {
            break;
        }
        let words: Vec<u64> = (0..num_inputs).map(|_| rng.r#gen::<u64>()).collect();
        let values = sim.simulate(&words);
        let base = sim.outputs(&values);
        for (i, outputs) in pending.iter_mut().enumerate() {
            if outputs.is_empty() {
                continue;
            }
            let flipped = sim.simulate_flip(&values, i);
            outputs.retain(|&o| {
                let changed = flipped[o] != base[o];
                if changed {
                    support[o][i] = true;
                }
                !changed
            });
        }
    }

    let unresolved: usize = pending.iter().map(Vec::len).sum();
    debug!(
        "functional support: {} (output, input) pairs left to SAT after {} random rounds",
        unresolved, rounds
    );
    if unresolved == 0 {
        return Ok(support);
    }

    let levels = LevelIndex::new(aig);
    for (i, outputs) in pending.iter().enumerate() {
        if outputs.is_empty() {
            continue;
        }
        let kept: Vec<usize> = (0..num_inputs).filter(|&k| k != i).collect();
        let mut forced = vec![false; num_inputs];
        let low = aig.cofactor(&levels, Some(&forced), &kept)?;
        forced[i] = true;
        let high = aig.cofactor(&levels, Some(&forced), &kept)?;
        for &o in outputs {
            let result = check_equivalence(&low, &high, None, &[(o, o)], None)?;
            support[o][i] = result != EquivResult::Equivalent;
        }
    }

    Ok(support)
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use test_log::test;

    use super::*;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(7)
    }

    #[test]
    fn and_gate_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let y = aig.and(&a, &b);
        aig.add_output(y, "y");

        assert_eq!(structural_support(&aig, 0).unwrap(), vec![0, 1]);
        let support = functional_support(&aig, 4, &mut rng()).unwrap();
        assert_eq!(support, vec![vec![true, true]]);
    }

    #[test]
    fn buffer_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        aig.add_input("b");
        aig.add_output(a, "y");
        aig.add_output(aig.constant(true), "one");

        assert_eq!(structural_support(&aig, 0).unwrap(), vec![0]);
        assert!(structural_support(&aig, 1).unwrap().is_empty());
        assert!(structural_support(&aig, 2).is_err());
        let support = functional_support(&aig, 4, &mut rng()).unwrap();
        assert_eq!(support, vec![vec![true, false], vec![false, false]]);
    }

    #[test]
    fn redundant_structure_test() {
        // y = (a & b) | (a & !b) = a, structurally depends on b but functionally does not.
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let t0 = aig.and(&a, &b);
        let t1 = aig.and(&a, &!&b);
        let y = aig.or(&t0, &t1);
        aig.add_output(y, "y");

        assert_eq!(structural_support(&aig, 0).unwrap(), vec![0, 1]);
        // With no random round at all, SAT alone decides every pair.
        let support = functional_support(&aig, 0, &mut rng()).unwrap();
        assert_eq!(support, vec![vec![true, false]]);
        let support = functional_support(&aig, 8, &mut rng()).unwrap();
        assert_eq!(support, vec![vec![true, false]]);
    }
}
