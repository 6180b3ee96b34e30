//! Boolean matching of two combinational networks.
//!
//! A run looks for a pairing of the inputs and of the outputs (see [`MatchMode`]) under which
//! both networks compute the same functions:
//! 1. functional dependencies are extracted on both sides,
//! 2. inputs and outputs are partitioned by their dependency counts, then refined by dependency
//!    classes until a fixpoint,
//! 3. random simulation keeps refining until it stalls,
//! 4. the remaining choices are explored by a SAT-validated backtracking search,
//! 5. the matching found is confirmed by a final equivalence check.
//!
//! Both networks always go through the very same refinement steps, so partitions whose class
//! sizes diverge prove that no matching exists.

mod config;
mod deps;
mod partition;
mod refine;
mod report;
mod search;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use thiserror::Error;

pub use config::{MatchConfig, MatchMode};
pub use deps::{Dependencies, class_signature};
pub use partition::Partition;
pub use refine::SideRefiner;
pub use report::{
    CounterExample, MatchOutcome, MatchStats, Matching, NoMatchReason, RefinementStage, Verdict,
};
pub use search::SearchStats;

use crate::{
    Aig, AigError, Result,
    miter::{EquivResult, check_equivalence},
    sim::Simulator,
};
use search::{SearchContext, Side};

/// Error returned when two networks cannot even be compared.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A bijection needs the same number of inputs and outputs on both sides.
    #[error(
        "networks have {}/{} inputs and {}/{} outputs",
        .inputs.0, .inputs.1, .outputs.0, .outputs.1
    )]
    StructuralMismatch {
        inputs: (usize, usize),
        outputs: (usize, usize),
    },
}

/// Refinement state of one network.
struct SideState {
    aig: Aig,
    deps: Dependencies,
    inputs: Partition,
    outputs: Partition,
}

impl SideState {
    fn new(aig: &Aig, config: &MatchConfig, rng: &mut impl Rng) -> Result<Self> {
        let aig = aig.strash()?;
        let deps = Dependencies::compute(&aig, config.support_sim_rounds, rng)?;
        let inputs = Partition::by_cardinality(&deps.inputs, aig.num_outputs());
        let outputs = match config.mode {
            MatchMode::PermuteInputsOnly => Partition::singletons(aig.num_outputs()),
            MatchMode::PermuteInputsAndOutputs => {
                Partition::by_cardinality(&deps.outputs, aig.num_inputs())
            }
        };
        Ok(SideState {
            aig,
            deps,
            inputs,
            outputs,
        })
    }

    /// Splits inputs by the classes of their outputs, then outputs by the classes of their
    /// inputs. Returns the number of new classes.
    fn refine_by_dependencies(&mut self) -> usize {
        let deps = &self.deps;
        let outputs = &self.outputs;
        let created_inputs = self
            .inputs
            .refine_with(|_, i| class_signature(&deps.inputs[i], outputs));
        let inputs = &self.inputs;
        let created_outputs = self
            .outputs
            .refine_with(|_, o| class_signature(&deps.outputs[o], inputs));
        self.deps.regroup_inputs(&self.outputs);
        self.deps.regroup_outputs(&self.inputs);
        created_inputs + created_outputs
    }

    fn is_consistent_with(&self, other: &SideState) -> bool {
        self.inputs.is_consistent_with(&other.inputs)
            && self.outputs.is_consistent_with(&other.outputs)
    }

    fn is_discrete(&self) -> bool {
        self.inputs.is_discrete() && self.outputs.is_discrete()
    }
}

/// Runs the matching flow with a given configuration.
///
/// ```rust
/// use aigmatch::{Aig, matching::{BooleanMatcher, MatchConfig}};
///
/// let mut first = Aig::new();
/// let a = first.add_input("a");
/// let b = first.add_input("b");
/// let y = first.and(&a, &!&b);
/// first.add_output(y, "y");
///
/// let mut second = Aig::new();
/// let p = second.add_input("p");
/// let q = second.add_input("q");
/// let z = second.and(&!&p, &q);
/// second.add_output(z, "z");
///
/// let outcome = BooleanMatcher::new(MatchConfig::default()).run(&first, &second).unwrap();
/// let matching = outcome.verdict.matching().unwrap();
/// assert!(outcome.verdict.is_equivalent());
/// assert_eq!(matching.input_image(0), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BooleanMatcher {
    config: MatchConfig,
}

impl BooleanMatcher {
    pub fn new(config: MatchConfig) -> Self {
        BooleanMatcher { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Matches `first` against `second`.
    ///
    /// Only networks that cannot be compared at all give an error, negative answers are
    /// reported in the [`Verdict`].
    pub fn run(&self, first: &Aig, second: &Aig) -> Result<MatchOutcome> {
        if first.num_inputs() != second.num_inputs() || first.num_outputs() != second.num_outputs()
        {
            return Err(MatchError::StructuralMismatch {
                inputs: (first.num_inputs(), second.num_inputs()),
                outputs: (first.num_outputs(), second.num_outputs()),
            }
            .into());
        }
        let config = &self.config;
        info!(
            "matching networks with {} inputs and {} outputs ({} and {} gates)",
            first.num_inputs(),
            first.num_outputs(),
            first.num_ands(),
            second.num_ands()
        );

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let mut left = SideState::new(first, config, &mut rng)?;
        let mut right = SideState::new(second, config, &mut rng)?;
        let mut stats = MatchStats::default();

        if !left.is_consistent_with(&right) {
            return no_match(
                NoMatchReason::PartitionDivergence(RefinementStage::Initial),
                stats,
            );
        }

        loop {
            stats.dependency_rounds += 1;
            let created_left = left.refine_by_dependencies();
            let created_right = right.refine_by_dependencies();
            if created_left != created_right || !left.is_consistent_with(&right) {
                return no_match(
                    NoMatchReason::PartitionDivergence(RefinementStage::Dependency),
                    stats,
                );
            }
            if created_left == 0 {
                break;
            }
        }
        debug!(
            "after dependencies: {} input classes, {} output classes",
            left.inputs.len(),
            left.outputs.len()
        );

        let sim_left = Simulator::new(&left.aig);
        let sim_right = Simulator::new(&right.aig);
        let mut refiner_left = SideRefiner::new(&sim_left);
        let mut refiner_right = SideRefiner::new(&sim_right);
        let mut stall = 0;
        while stall < config.sim_stall_limit && !left.is_discrete() {
            // One random bit per input class, shared by the corresponding classes.
            let mut pattern_left = vec![false; left.aig.num_inputs()];
            let mut pattern_right = vec![false; right.aig.num_inputs()];
            for (c, members) in left.inputs.classes().iter().enumerate() {
                let bit = rng.r#gen::<bool>();
                for &i in members {
                    pattern_left[i] = bit;
                }
                for &i in right.inputs.class(c) {
                    pattern_right[i] = bit;
                }
            }

            stats.sim_rounds += 1;
            let created_left = refiner_left.round(
                &pattern_left,
                &mut left.inputs,
                &mut left.outputs,
                &mut left.deps,
            );
            let created_right = refiner_right.round(
                &pattern_right,
                &mut right.inputs,
                &mut right.outputs,
                &mut right.deps,
            );
            if created_left != created_right || !left.is_consistent_with(&right) {
                return no_match(
                    NoMatchReason::PartitionDivergence(RefinementStage::Simulation),
                    stats,
                );
            }
            if created_left > 0 {
                stall = 0;
            } else {
                stall += 1;
            }
        }
        stats.input_classes = left.inputs.len();
        stats.output_classes = left.outputs.len();
        debug!(
            "after {} simulation rounds: {} input classes, {} output classes",
            stats.sim_rounds, stats.input_classes, stats.output_classes
        );

        let priority = refiner_right.observability().to_vec();
        let mut search = SearchContext::new(
            Side::new(&left.aig, &left.deps, &left.inputs, &left.outputs),
            Side::new(&right.aig, &right.deps, &right.inputs, &right.outputs),
            config,
            &priority,
            rng,
        );
        let found = search.run()?;
        stats.search = search.stats().clone();
        debug!("search: {:?}", stats.search);
        if !found {
            return no_match(NoMatchReason::SearchExhausted, stats);
        }

        let mut input_pairs = search.matched_inputs().to_vec();
        let mut output_pairs = search.matched_outputs().to_vec();
        input_pairs.sort_unstable();
        output_pairs.sort_unstable();
        let matching = Matching {
            input_names: names(&input_pairs, left.aig.input_names(), right.aig.input_names()),
            output_names: names(
                &output_pairs,
                left.aig.output_names(),
                right.aig.output_names(),
            ),
            inputs: input_pairs,
            outputs: output_pairs,
        };

        let verdict = match check_equivalence(
            &left.aig,
            &right.aig,
            Some(&matching.inputs),
            &matching.outputs,
            config.final_conflict_limit,
        )? {
            EquivResult::Equivalent => Verdict::Equivalent(matching),
            EquivResult::Undecided => Verdict::Unknown(matching),
            EquivResult::Different(witness) => {
                let cex = counter_example(&left.aig, &right.aig, &matching, &witness)?;
                Verdict::Different(matching, cex)
            }
        };
        info!("verdict: {verdict}");
        Ok(MatchOutcome { verdict, stats })
    }
}

fn no_match(reason: NoMatchReason, stats: MatchStats) -> Result<MatchOutcome> {
    info!("no match: {reason}");
    Ok(MatchOutcome {
        verdict: Verdict::NoMatch(reason),
        stats,
    })
}

/// Runs [`BooleanMatcher`] with `config`.
pub fn match_networks(first: &Aig, second: &Aig, config: MatchConfig) -> Result<MatchOutcome> {
    BooleanMatcher::new(config).run(first, second)
}

fn names(pairs: &[(usize, usize)], left: &[String], right: &[String]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|&(l, r)| (left[l].clone(), right[r].clone()))
        .collect()
}

/// Expands a miter witness, one value per input pair, to both networks.
fn counter_example(
    left: &Aig,
    right: &Aig,
    matching: &Matching,
    witness: &[bool],
) -> Result<CounterExample> {
    let mut first_inputs = vec![false; left.num_inputs()];
    let mut second_inputs = vec![false; right.num_inputs()];
    for (&(l, r), &value) in matching.inputs.iter().zip(witness) {
        first_inputs[l] = value;
        second_inputs[r] = value;
    }
    let first_outputs = Simulator::new(left).simulate_pattern(&first_inputs);
    let second_outputs = Simulator::new(right).simulate_pattern(&second_inputs);
    let output = matching
        .outputs
        .iter()
        .copied()
        .find(|&(l, r)| first_outputs[l] != second_outputs[r])
        .ok_or_else(|| {
            AigError::InvalidState("counter-example does not distinguish any output".to_string())
        })?;
    Ok(CounterExample {
        first_inputs,
        second_inputs,
        first_outputs,
        second_outputs,
        output,
    })
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    /// Checks on every input pattern that `matching` maps `first` onto `second`.
    fn assert_valid(first: &Aig, second: &Aig, matching: &Matching) {
        let n = first.num_inputs();
        assert!(n <= 12);
        let sim_first = Simulator::new(first);
        let sim_second = Simulator::new(second);
        for bits in 0..(1u32 << n) {
            let pattern: Vec<bool> = (0..n).map(|i| (bits >> i) & 1 == 1).collect();
            let mapped = matching.map_pattern(&pattern);
            let out_first = sim_first.simulate_pattern(&pattern);
            let out_second = sim_second.simulate_pattern(&mapped);
            for &(l, r) in &matching.outputs {
                assert_eq!(out_first[l], out_second[r], "pattern {bits:b}");
            }
        }
    }

    /// Three outputs sharing five inputs:
    /// - s = a ^ b ^ c
    /// - m = majority(c, d, e)
    /// - w = (a & !d) | e
    fn sample() -> Aig {
        let mut aig = Aig::new();
        let i: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| aig.add_input(*name))
            .collect();
        let ab = aig.xor(&i[0], &i[1]);
        let s = aig.xor(&ab, &i[2]);
        let cd = aig.and(&i[2], &i[3]);
        let ce = aig.and(&i[2], &i[4]);
        let de = aig.and(&i[3], &i[4]);
        let cd_ce = aig.or(&cd, &ce);
        let m = aig.or(&cd_ce, &de);
        let and = aig.and(&i[0], &!&i[3]);
        let w = aig.or(&and, &i[4]);
        aig.add_output(s, "s");
        aig.add_output(m, "m");
        aig.add_output(w, "w");
        aig
    }

    fn run(first: &Aig, second: &Aig, config: MatchConfig) -> MatchOutcome {
        match_networks(first, second, config).unwrap()
    }

    #[test]
    fn identity_test() {
        let aig = sample();
        let outcome = run(&aig, &aig, MatchConfig::default());
        let Verdict::Equivalent(matching) = &outcome.verdict else {
            panic!("unexpected verdict {}", outcome.verdict);
        };
        assert_eq!(matching.inputs.len(), 5);
        assert_eq!(matching.outputs.len(), 3);
        assert_valid(&aig, &aig, matching);
    }

    #[test]
    fn permutation_round_trip_test() {
        let aig = sample();
        for (input_perm, output_perm) in [
            (vec![4, 3, 2, 1, 0], vec![2, 1, 0]),
            (vec![1, 0, 3, 4, 2], vec![1, 2, 0]),
            (vec![2, 4, 0, 1, 3], vec![0, 2, 1]),
        ] {
            let permuted = aig.permuted(&input_perm, &output_perm).unwrap();
            let outcome = run(&aig, &permuted, MatchConfig::default());
            let Verdict::Equivalent(matching) = &outcome.verdict else {
                panic!("unexpected verdict {}", outcome.verdict);
            };
            assert_valid(&aig, &permuted, matching);
            // Outputs have distinct functions, their pairing is forced.
            for (new, &old) in output_perm.iter().enumerate() {
                assert_eq!(matching.output_image(old), Some(new));
            }
        }
    }

    #[test]
    fn one_bit_and_test() {
        let mut first = Aig::new();
        let a = first.add_input("a");
        let b = first.add_input("b");
        let y = first.and(&a, &b);
        first.add_output(y, "y");
        let mut second = Aig::new();
        let p = second.add_input("p");
        let q = second.add_input("q");
        let z = second.and(&q, &p);
        second.add_output(z, "z");

        let outcome = run(&first, &second, MatchConfig::default());
        assert!(outcome.verdict.is_equivalent());
        assert_valid(&first, &second, outcome.verdict.matching().unwrap());
    }

    #[test]
    fn asymmetric_test() {
        // x = a & b, y = c against y' = c', x' = b' & a' with rotated inputs.
        let mut first = Aig::new();
        let a = first.add_input("a");
        let b = first.add_input("b");
        let c = first.add_input("c");
        let x = first.and(&a, &b);
        first.add_output(x, "x");
        first.add_output(c, "y");
        let mut second = Aig::new();
        let c = second.add_input("c");
        let a = second.add_input("a");
        let b = second.add_input("b");
        let x = second.and(&b, &a);
        second.add_output(c, "y");
        second.add_output(x, "x");

        let outcome = run(&first, &second, MatchConfig::default());
        let Verdict::Equivalent(matching) = &outcome.verdict else {
            panic!("unexpected verdict {}", outcome.verdict);
        };
        assert_eq!(matching.input_image(2), Some(0));
        assert_eq!(matching.output_image(0), Some(1));
        assert_eq!(matching.output_image(1), Some(0));
        // c is told apart by dependencies, a and b are paired on their first candidates.
        assert_eq!(outcome.stats.search.input_trials, 2);
        assert_valid(&first, &second, matching);
    }

    #[test]
    fn mux_search_test() {
        // f = (a & !c) | (b & c), inputs listed as (c, b, a) in the second network.
        let mux = |order: [usize; 3]| {
            let mut aig = Aig::new();
            let names = ["a", "b", "c"];
            let mut edges = vec![None; 3];
            for k in order {
                edges[k] = Some(aig.add_input(names[k]));
            }
            let [a, b, c] = [0, 1, 2].map(|k| edges[k].clone().unwrap());
            let f = aig.mux(&c, &b, &a);
            aig.add_output(f, "f");
            aig
        };
        let first = mux([0, 1, 2]);
        let second = mux([2, 1, 0]);

        let config = MatchConfig::default().with_sim_stall_limit(0);
        let outcome = run(&first, &second, config);
        let Verdict::Equivalent(matching) = &outcome.verdict else {
            panic!("unexpected verdict {}", outcome.verdict);
        };
        assert_eq!(outcome.stats.sim_rounds, 0);
        assert_eq!(matching.inputs, vec![(0, 2), (1, 1), (2, 0)]);
        // one trial per remaining candidate at most
        assert!(outcome.stats.search.input_trials <= 3 + 2 + 1);
        assert_valid(&first, &second, matching);
    }

    #[test]
    fn different_functions_test() {
        let mut first = Aig::new();
        let a = first.add_input("a");
        let b = first.add_input("b");
        let y = first.and(&a, &b);
        first.add_output(y, "y");
        let mut second = Aig::new();
        let a = second.add_input("a");
        let b = second.add_input("b");
        let y = second.or(&a, &b);
        second.add_output(y, "y");

        let outcome = run(&first, &second, MatchConfig::default());
        assert_eq!(
            outcome.verdict,
            Verdict::NoMatch(NoMatchReason::SearchExhausted)
        );
    }

    #[test]
    fn divergence_test() {
        // x = a & b, y = a | b against two copies of a & b: simulation tells y apart.
        let mut first = Aig::new();
        let a = first.add_input("a");
        let b = first.add_input("b");
        let x = first.and(&a, &b);
        let y = first.or(&a, &b);
        first.add_output(x, "x");
        first.add_output(y, "y");
        let mut second = Aig::new();
        let a = second.add_input("a");
        let b = second.add_input("b");
        let x = second.and(&a, &b);
        second.add_output(x.clone(), "x");
        second.add_output(x, "y");

        let outcome = run(&first, &second, MatchConfig::default());
        assert_eq!(
            outcome.verdict,
            Verdict::NoMatch(NoMatchReason::PartitionDivergence(
                RefinementStage::Simulation
            ))
        );
        assert_eq!(outcome.stats.sim_rounds, 1);

        // b is not in the support of the only output of the second network.
        let mut third = Aig::new();
        let a = third.add_input("a");
        third.add_input("b");
        third.add_output(a, "x");
        let outcome = run(&first_output_only(&first), &third, MatchConfig::default());
        assert_eq!(
            outcome.verdict,
            Verdict::NoMatch(NoMatchReason::PartitionDivergence(RefinementStage::Initial))
        );
    }

    fn first_output_only(aig: &Aig) -> Aig {
        let mut single = Aig::new();
        let inputs: Vec<_> = aig
            .input_names()
            .iter()
            .map(|name| single.add_input(name.clone()))
            .collect();
        let outputs = aig.copy_into(&mut single, &inputs).unwrap();
        single.add_output(outputs[0].clone(), aig.output_names()[0].clone());
        single
    }

    #[test]
    fn structural_mismatch_test() {
        let mut first = Aig::new();
        let a = first.add_input("a");
        first.add_output(a, "y");
        let mut second = Aig::new();
        let a = second.add_input("a");
        second.add_input("b");
        second.add_output(a, "y");

        let err = match_networks(&first, &second, MatchConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AigError::MatchError(MatchError::StructuralMismatch {
                inputs: (1, 2),
                outputs: (1, 1)
            })
        ));
    }

    #[test]
    fn undecided_policy_test() {
        // Same xor, built in two ways the structural check cannot merge.
        let mut first = Aig::new();
        let a = first.add_input("a");
        let b = first.add_input("b");
        let y = first.xor(&a, &b);
        first.add_output(y, "y");
        let mut second = Aig::new();
        let a = second.add_input("a");
        let b = second.add_input("b");
        let either = second.or(&a, &b);
        let both = second.and(&a, &b);
        let y = second.and(&either, &!&both);
        second.add_output(y, "y");

        let structural_only = MatchConfig::default().with_step_conflict_limit(Some(0));

        let outcome = run(&first, &second, structural_only.clone());
        assert!(outcome.verdict.is_equivalent());
        assert!(outcome.stats.search.undecided > 0);

        let outcome = run(
            &first,
            &second,
            structural_only.clone().with_final_conflict_limit(Some(0)),
        );
        assert!(matches!(outcome.verdict, Verdict::Unknown(_)));

        let outcome = run(
            &first,
            &second,
            structural_only.with_optimistic_undecided(false),
        );
        assert_eq!(
            outcome.verdict,
            Verdict::NoMatch(NoMatchReason::SearchExhausted)
        );
    }

    #[test]
    fn permute_inputs_only_test() {
        let aig = sample();
        let config = MatchConfig::default().with_mode(MatchMode::PermuteInputsOnly);

        let permuted = aig.permuted(&[3, 0, 4, 2, 1], &[0, 1, 2]).unwrap();
        let outcome = run(&aig, &permuted, config.clone());
        let Verdict::Equivalent(matching) = &outcome.verdict else {
            panic!("unexpected verdict {}", outcome.verdict);
        };
        assert_eq!(matching.outputs, vec![(0, 0), (1, 1), (2, 2)]);
        assert_valid(&aig, &permuted, matching);

        // Outputs are never permuted in this mode: s, m and w no longer line up with their
        // inputs once rotated.
        let permuted = aig.permuted(&[0, 1, 2, 3, 4], &[2, 0, 1]).unwrap();
        let outcome = run(&aig, &permuted, config);
        assert_eq!(
            outcome.verdict,
            Verdict::NoMatch(NoMatchReason::PartitionDivergence(
                RefinementStage::Dependency
            ))
        );
    }

    /// y0 = a & b (or a & !b), y1 = b & c, y2 = c: dependencies alone tell every input and
    /// output apart.
    fn chain(flip: bool) -> Aig {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let c = aig.add_input("c");
        let y0 = aig.and(&a, &b.clone().not_if(flip));
        let y1 = aig.and(&b, &c);
        aig.add_output(y0, "y0");
        aig.add_output(y1, "y1");
        aig.add_output(c, "y2");
        aig
    }

    #[test]
    fn flipped_gate_test() {
        let first = chain(false);
        let second = chain(true).permuted(&[2, 0, 1], &[1, 2, 0]).unwrap();

        let outcome = run(&first, &second, MatchConfig::default());
        let Verdict::Different(matching, cex) = &outcome.verdict else {
            panic!("unexpected verdict {}", outcome.verdict);
        };
        assert_eq!(outcome.stats.sim_rounds, 0);
        assert_eq!(outcome.stats.input_classes, 3);
        assert_eq!(outcome.stats.output_classes, 3);
        assert_eq!(matching.map_pattern(&cex.first_inputs), cex.second_inputs);
        let out_first = Simulator::new(&first).simulate_pattern(&cex.first_inputs);
        let out_second = Simulator::new(&second).simulate_pattern(&cex.second_inputs);
        assert_eq!(out_first, cex.first_outputs);
        assert_eq!(out_second, cex.second_outputs);
        assert_ne!(out_first[cex.output.0], out_second[cex.output.1]);
        // y0 moved under the rotation, its image is the pair that disagrees.
        assert_eq!(cex.output.0, 0);
        assert_eq!(matching.output_image(0), Some(cex.output.1));
    }

    #[test]
    fn refinement_monotonicity_test() {
        fn assert_refines(old: &Partition, new: &Partition) {
            assert!(new.refines(old));
            assert!(new.len() >= old.len());
        }

        let config = MatchConfig::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let mut side = SideState::new(&sample(), &config, &mut rng).unwrap();
        loop {
            let (inputs, outputs) = (side.inputs.clone(), side.outputs.clone());
            let created = side.refine_by_dependencies();
            assert_refines(&inputs, &side.inputs);
            assert_refines(&outputs, &side.outputs);
            assert_eq!(
                side.inputs.len() + side.outputs.len(),
                inputs.len() + outputs.len() + created
            );
            if created == 0 {
                break;
            }
        }

        let sim = Simulator::new(&side.aig);
        let mut refiner = SideRefiner::new(&sim);
        for _ in 0..32 {
            let pattern: Vec<bool> = (0..side.aig.num_inputs()).map(|_| rng.r#gen()).collect();
            let (inputs, outputs) = (side.inputs.clone(), side.outputs.clone());
            let created =
                refiner.round(&pattern, &mut side.inputs, &mut side.outputs, &mut side.deps);
            assert_refines(&inputs, &side.inputs);
            assert_refines(&outputs, &side.outputs);
            assert_eq!(
                side.inputs.len() + side.outputs.len(),
                inputs.len() + outputs.len() + created
            );
        }
    }

    #[test]
    fn forced_pairing_different_test() {
        let mut first = Aig::new();
        let a = first.add_input("a");
        first.add_output(a, "y");
        let mut second = Aig::new();
        let a = second.add_input("a");
        second.add_output(!a, "y");

        let outcome = run(&first, &second, MatchConfig::default());
        let Verdict::Different(matching, cex) = &outcome.verdict else {
            panic!("unexpected verdict {}", outcome.verdict);
        };
        assert_eq!(matching.inputs, vec![(0, 0)]);
        assert_eq!(cex.output, (0, 0));
        assert_ne!(cex.first_outputs[0], cex.second_outputs[0]);
        assert_eq!(outcome.stats.search.sat_calls, 0);
    }

    #[test]
    fn empty_networks_test() {
        let outcome = run(&Aig::new(), &Aig::new(), MatchConfig::default());
        assert!(outcome.verdict.is_equivalent());
    }
}
