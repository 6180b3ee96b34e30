//! Backtracking search over the pairs left open by refinement.
//!
//! Inputs are paired one class member at a time. Each tentative pair is validated on the
//! cofactors where only the inputs paired so far stay free, against the outputs paired so far.
//! Right after the first member of an input class is paired, the still open output classes it
//! reaches are paired the same way. When the networks disagree under a witness, the witness
//! is reused to discard other candidates of the same class at once.

use std::{cmp::Reverse, collections::HashSet};

use log::trace;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{config::MatchConfig, deps::Dependencies, partition::Partition};
use crate::{
    Aig, LevelIndex, Result,
    miter::{EquivResult, check_equivalence},
    sim::Simulator,
    support::functional_support,
};

/// What the search knows about one of the two networks.
pub struct Side<'a> {
    pub aig: &'a Aig,
    pub levels: LevelIndex,
    pub deps: &'a Dependencies,
    pub inputs: &'a Partition,
    pub outputs: &'a Partition,
}

impl<'a> Side<'a> {
    pub fn new(
        aig: &'a Aig,
        deps: &'a Dependencies,
        inputs: &'a Partition,
        outputs: &'a Partition,
    ) -> Self {
        Side {
            aig,
            levels: LevelIndex::new(aig),
            deps,
            inputs,
            outputs,
        }
    }
}

/// Search counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Input candidates submitted to the oracle.
    pub input_trials: usize,
    /// Output candidates submitted to the oracle.
    pub output_trials: usize,
    pub sat_calls: usize,
    pub undecided: usize,
    /// Input candidates discarded from a witness without being tried.
    pub pruned_inputs: usize,
    /// Output candidates discarded from a witness without being tried.
    pub pruned_outputs: usize,
}

enum Step {
    Accept,
    /// Refuted, with the witness when the oracle found one.
    Reject(Option<Vec<bool>>),
}

/// Where to go once the current list of output classes is fully paired.
#[derive(Debug, Clone, Copy)]
enum Then {
    Inputs(usize, usize),
    Done,
}

fn oracle(
    config: &MatchConfig,
    stats: &mut SearchStats,
    left: &Aig,
    right: &Aig,
    outputs: &[(usize, usize)],
) -> Result<Step> {
    stats.sat_calls += 1;
    Ok(
        match check_equivalence(left, right, None, outputs, config.step_conflict_limit)? {
            EquivResult::Equivalent => Step::Accept,
            EquivResult::Different(witness) => Step::Reject(Some(witness)),
            EquivResult::Undecided => {
                stats.undecided += 1;
                if config.optimistic_undecided {
                    Step::Accept
                } else {
                    Step::Reject(None)
                }
            }
        },
    )
}

/// Positions, in the matched output list, of the outputs whose support holds `input`.
fn support_signature(
    support: &[Vec<bool>],
    input: usize,
    outputs: impl Iterator<Item = usize>,
) -> Vec<usize> {
    outputs
        .enumerate()
        .filter(|&(_, o)| support[o][input])
        .map(|(pos, _)| pos)
        .collect()
}

pub struct SearchContext<'a> {
    left: Side<'a>,
    right: Side<'a>,
    config: &'a MatchConfig,
    rng: Xoshiro256PlusPlus,
    /// Non-singleton input classes, in search order.
    input_order: Vec<usize>,
    /// Per input class, the candidates of the right network. The prefix of a class holds the
    /// candidates currently paired with its first members.
    candidates: Vec<Vec<usize>>,
    /// Per output class, the right members currently paired.
    output_used: Vec<Vec<bool>>,
    /// Output classes already handled by an input class.
    claimed: Vec<usize>,
    matched_inputs: Vec<(usize, usize)>,
    matched_outputs: Vec<(usize, usize)>,
    stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    /// Singleton classes are paired right away. Open input classes are searched by decreasing
    /// `priority` of their first right member, then by increasing size.
    pub fn new(
        left: Side<'a>,
        right: Side<'a>,
        config: &'a MatchConfig,
        priority: &[u64],
        rng: Xoshiro256PlusPlus,
    ) -> Self {
        let mut matched_inputs = Vec::new();
        let mut input_order = Vec::new();
        for (c, members) in left.inputs.classes().iter().enumerate() {
            if members.len() == 1 {
                matched_inputs.push((members[0], right.inputs.class(c)[0]));
            } else {
                input_order.push(c);
            }
        }
        input_order.sort_by_key(|&c| {
            let members = right.inputs.class(c);
            (Reverse(priority[members[0]]), members.len())
        });

        let matched_outputs = left
            .outputs
            .classes()
            .iter()
            .enumerate()
            .filter(|(_, members)| members.len() == 1)
            .map(|(c, members)| (members[0], right.outputs.class(c)[0]))
            .collect();

        SearchContext {
            candidates: right.inputs.classes().to_vec(),
            output_used: right
                .outputs
                .classes()
                .iter()
                .map(|members| vec![false; members.len()])
                .collect(),
            left,
            right,
            config,
            rng,
            input_order,
            claimed: Vec::new(),
            matched_inputs,
            matched_outputs,
            stats: SearchStats::default(),
        }
    }

    /// Runs the search. On success the full matching is available from
    /// [`SearchContext::matched_inputs`] and [`SearchContext::matched_outputs`].
    pub fn run(&mut self) -> Result<bool> {
        self.match_inputs(0, 0)
    }

    pub fn matched_inputs(&self) -> &[(usize, usize)] {
        &self.matched_inputs
    }

    pub fn matched_outputs(&self) -> &[(usize, usize)] {
        &self.matched_outputs
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pairs member `idx` of the `ii`-th open input class, then goes on.
    fn match_inputs(&mut self, ii: usize, idx: usize) -> Result<bool> {
        let Some(&class) = self.input_order.get(ii) else {
            return self.match_remaining_outputs();
        };
        let left_inputs: &'a Partition = self.left.inputs;
        let left_members = left_inputs.class(class);
        let size = left_members.len();
        if idx == size {
            return self.match_inputs(ii + 1, 0);
        }
        let member = left_members[idx];

        // Open output classes reached by this input class, handled once its first member is in.
        let mut claimed_here = Vec::new();
        if idx == 0 {
            for &o in &self.left.deps.inputs[member] {
                let c = self.left.outputs.class_of(o);
                if self.left.outputs.class(c).len() > 1
                    && !self.claimed.contains(&c)
                    && !claimed_here.contains(&c)
                {
                    claimed_here.push(c);
                }
            }
        }
        self.claimed.extend(&claimed_here);

        let kept_left: Vec<usize> = self
            .matched_inputs
            .iter()
            .map(|&(l, _)| l)
            .chain([member])
            .collect();
        let sub_left = self.left.aig.cofactor(&self.left.levels, None, &kept_left)?;

        let mut skip = vec![false; size];
        let mut found = false;
        for j in idx..size {
            if skip[j] {
                continue;
            }
            let candidate = self.candidates[class][j];
            self.stats.input_trials += 1;
            self.matched_inputs.push((member, candidate));
            trace!("trying input {} -> {}", member, candidate);

            let kept_right: Vec<usize> = self.matched_inputs.iter().map(|&(_, r)| r).collect();
            let sub_right = self.right.aig.cofactor(&self.right.levels, None, &kept_right)?;
            match oracle(
                self.config,
                &mut self.stats,
                &sub_left,
                &sub_right,
                &self.matched_outputs,
            )? {
                Step::Accept => {
                    self.candidates[class].swap(idx, j);
                    found = self.match_outputs(
                        &sub_left,
                        &sub_right,
                        &claimed_here,
                        0,
                        0,
                        Then::Inputs(ii, idx + 1),
                    )?;
                    self.candidates[class].swap(idx, j);
                }
                Step::Reject(Some(witness)) => {
                    self.prune_inputs(class, idx, j + 1, &witness, &mut skip)?;
                }
                Step::Reject(None) => {}
            }
            if found {
                break;
            }
            self.matched_inputs.pop();
        }

        if !found {
            let keep = self.claimed.len() - claimed_here.len();
            self.claimed.truncate(keep);
        }
        Ok(found)
    }

    /// Marks in `skip` the candidates of input class `class`, from position `from` on, that
    /// cannot be paired with member `idx` under the prefix refuted by `witness`.
    ///
    /// Both networks are cofactored with the paired inputs held at the witness values, keeping
    /// free the open members of the class and every unpaired input. A candidate must then reach
    /// the same paired outputs as the member.
    fn prune_inputs(
        &mut self,
        class: usize,
        idx: usize,
        from: usize,
        witness: &[bool],
        skip: &mut [bool],
    ) -> Result<()> {
        let left_aig = self.left.aig;
        let right_aig = self.right.aig;
        let mut forced_left = vec![false; left_aig.num_inputs()];
        let mut forced_right = vec![false; right_aig.num_inputs()];
        for (&(l, r), &value) in self.matched_inputs.iter().zip(witness) {
            forced_left[l] = value;
            forced_right[r] = value;
        }

        let paired_left: HashSet<usize> = self.matched_inputs.iter().map(|&(l, _)| l).collect();
        let paired_right: HashSet<usize> = self.matched_inputs.iter().map(|&(_, r)| r).collect();
        let open = |first: &[usize], paired: &HashSet<usize>, n: usize| -> Vec<usize> {
            let extra: Vec<usize> = (0..n)
                .filter(|i| !paired.contains(i) && !first.contains(i))
                .collect();
            first.iter().copied().chain(extra).collect()
        };
        let kept_left = open(
            &self.left.inputs.class(class)[idx..],
            &paired_left,
            left_aig.num_inputs(),
        );
        let kept_right = open(
            &self.candidates[class][idx..],
            &paired_right,
            right_aig.num_inputs(),
        );

        let sub_left = left_aig.cofactor(&self.left.levels, Some(&forced_left), &kept_left)?;
        let sub_right = right_aig.cofactor(&self.right.levels, Some(&forced_right), &kept_right)?;
        let rounds = self.config.support_sim_rounds;
        let support_left = functional_support(&sub_left, rounds, &mut self.rng)?;
        let support_right = functional_support(&sub_right, rounds, &mut self.rng)?;

        let reference = support_signature(
            &support_left,
            0,
            self.matched_outputs.iter().map(|&(l, _)| l),
        );
        for k in (from - idx)..(skip.len() - idx) {
            if skip[idx + k] {
                continue;
            }
            let signature = support_signature(
                &support_right,
                k,
                self.matched_outputs.iter().map(|&(_, r)| r),
            );
            if signature != reference {
                skip[idx + k] = true;
                self.stats.pruned_inputs += 1;
            }
        }
        Ok(())
    }

    /// Pairs member `idx` of output class `classes[oi]`, validated on the current cofactors.
    fn match_outputs(
        &mut self,
        sub_left: &Aig,
        sub_right: &Aig,
        classes: &[usize],
        oi: usize,
        idx: usize,
        then: Then,
    ) -> Result<bool> {
        let Some(&class) = classes.get(oi) else {
            return match then {
                Then::Inputs(ii, next) => self.match_inputs(ii, next),
                Then::Done => Ok(true),
            };
        };
        let left_outputs: &'a Partition = self.left.outputs;
        let right_outputs: &'a Partition = self.right.outputs;
        let left_members = left_outputs.class(class);
        let right_members = right_outputs.class(class);
        let size = left_members.len();
        let member = left_members[idx];
        let (next_oi, next_idx) = if idx + 1 < size {
            (oi, idx + 1)
        } else {
            (oi + 1, 0)
        };

        let mut skip = vec![false; size];
        let mut found = false;
        for j in 0..size {
            if skip[j] || self.output_used[class][j] {
                continue;
            }
            let candidate = right_members[j];
            self.stats.output_trials += 1;
            self.matched_outputs.push((member, candidate));
            trace!("trying output {} -> {}", member, candidate);

            match oracle(
                self.config,
                &mut self.stats,
                sub_left,
                sub_right,
                &self.matched_outputs,
            )? {
                Step::Accept => {
                    self.output_used[class][j] = true;
                    found =
                        self.match_outputs(sub_left, sub_right, classes, next_oi, next_idx, then)?;
                    self.output_used[class][j] = false;
                }
                Step::Reject(Some(witness)) => {
                    // Under the witness, only outputs with the member's value stay candidates.
                    let value = Simulator::new(sub_left).simulate_pattern(&witness)[member];
                    let right_values = Simulator::new(sub_right).simulate_pattern(&witness);
                    for k in 0..size {
                        if k != j
                            && !skip[k]
                            && !self.output_used[class][k]
                            && right_values[right_members[k]] != value
                        {
                            skip[k] = true;
                            self.stats.pruned_outputs += 1;
                        }
                    }
                }
                Step::Reject(None) => {}
            }
            if found {
                break;
            }
            self.matched_outputs.pop();
        }
        Ok(found)
    }

    /// Every input is paired: pairs the output classes no input class has reached.
    fn match_remaining_outputs(&mut self) -> Result<bool> {
        let left_outputs = self.left.outputs;
        let remaining: Vec<usize> = (0..left_outputs.len())
            .filter(|&c| left_outputs.class(c).len() > 1 && !self.claimed.contains(&c))
            .collect();
        if remaining.is_empty() {
            return Ok(true);
        }
        let kept_left: Vec<usize> = self.matched_inputs.iter().map(|&(l, _)| l).collect();
        let kept_right: Vec<usize> = self.matched_inputs.iter().map(|&(_, r)| r).collect();
        let sub_left = self.left.aig.cofactor(&self.left.levels, None, &kept_left)?;
        let sub_right = self.right.aig.cofactor(&self.right.levels, None, &kept_right)?;
        self.match_outputs(&sub_left, &sub_right, &remaining, 0, 0, Then::Done)
    }
}
