use std::{
    collections::{HashMap, HashSet},
    num::TryFromIntError,
};

use log::{debug, trace};
use thiserror::Error;

use crate::{
    Aig, AigEdge, NodeId, Result,
    cnf::{Cnf, Lit, SatOutcome},
    dfs::Dfs,
};

/// Error returned when an operation related to the miter fails
/// (creation, CNF extraction, SAT solving).
#[derive(Debug, Error)]
pub enum MiterError {
    /// Inputs are paired by position but the two AIGs have different input counts.
    #[error("AIGs have different input counts: {0} vs {1}")]
    DifferentInputCounts(usize, usize),

    /// An input pairing uses the same input twice on one side.
    #[error("invalid input pairing: {0}")]
    InvalidPairing(String),

    /// A node was not mapped to any SAT literal in the miter.
    #[error("node id {0} is not mapped to any literal")]
    UnmappedNodeToLit(NodeId),

    /// Conversion from a NodeId to a SAT literal failed.
    #[error("conversion from NodeId to Lit failed because of {0}")]
    NodeIdToLit(TryFromIntError),

    /// The SAT solver itself failed.
    #[error("SAT solver failed: {0}")]
    SolverFailed(String),
}

impl From<TryFromIntError> for MiterError {
    fn from(value: TryFromIntError) -> Self {
        MiterError::NodeIdToLit(value)
    }
}

/// Outcome of an equivalence query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquivResult {
    /// The paired outputs agree on every input pattern.
    Equivalent,
    /// Some paired outputs disagree under this assignment of the miter inputs,
    /// one value per pairing slot.
    Different(Vec<bool>),
    /// The budget did not allow to decide.
    Undecided,
}

/// The miter of two AIGs restricted to a set of output pairs.
///
/// For background on what is a miter, please check
/// [Verification of large synthesized designs](https://doi.org/10.1109/ICCAD.1993.580110) by D. Brand.
///
/// Both AIGs are instantiated in a single AIG through the hashing builder, on shared inputs:
/// one input per pairing slot. Structurally identical logic is thus merged on the fly, which is
/// what [`Miter::structural_check`] relies on. Inputs of either side left out of the pairing are
/// tied to 0.
pub struct Miter {
    aig: Aig,
    pairs: Vec<(AigEdge, AigEdge)>,
}

impl Miter {
    /// Create miter between two AIGs.
    ///
    /// - `input_pairing`: slot `k` drives input `p[k].0` of `a` and input `p[k].1` of `b`.
    ///   `None` pairs inputs by position, which requires equal input counts.
    /// - `output_pairing`: list of `(output of a, output of b)` that must agree.
    pub fn new(
        a: &Aig,
        b: &Aig,
        input_pairing: Option<&[(usize, usize)]>,
        output_pairing: &[(usize, usize)],
    ) -> Result<Self> {
        let positional: Vec<(usize, usize)>;
        let pairing = match input_pairing {
            Some(pairing) => pairing,
            None => {
                if a.num_inputs() != b.num_inputs() {
                    return Err(
                        MiterError::DifferentInputCounts(a.num_inputs(), b.num_inputs()).into(),
                    );
                }
                positional = (0..a.num_inputs()).map(|k| (k, k)).collect();
                &positional
            }
        };

        let mut aig = Aig::new();
        let mut a_inputs: Vec<Option<AigEdge>> = vec![None; a.num_inputs()];
        let mut b_inputs: Vec<Option<AigEdge>> = vec![None; b.num_inputs()];
        for (k, &(ia, ib)) in pairing.iter().enumerate() {
            a.get_input(ia)?;
            b.get_input(ib)?;
            let edge = aig.add_input(format!("m{}", k));
            if a_inputs[ia].replace(edge.clone()).is_some()
                || b_inputs[ib].replace(edge).is_some()
            {
                return Err(MiterError::InvalidPairing(format!(
                    "pair ({}, {}) reuses an input",
                    ia, ib
                ))
                .into());
            }
        }
        let tie = |inputs: Vec<Option<AigEdge>>, aig: &Aig| -> Vec<AigEdge> {
            inputs
                .into_iter()
                .map(|e| e.unwrap_or_else(|| aig.constant(false)))
                .collect()
        };
        let a_inputs = tie(a_inputs, &aig);
        let b_inputs = tie(b_inputs, &aig);

        let a_outputs = a.copy_into(&mut aig, &a_inputs)?;
        let b_outputs = b.copy_into(&mut aig, &b_inputs)?;

        let mut pairs = Vec::with_capacity(output_pairing.len());
        for &(oa, ob) in output_pairing {
            a.get_output(oa)?;
            b.get_output(ob)?;
            let ea = a_outputs[oa].clone();
            let eb = b_outputs[ob].clone();
            aig.add_output(ea.clone(), format!("a{}", oa));
            aig.add_output(eb.clone(), format!("b{}", ob));
            pairs.push((ea, eb));
        }

        Ok(Miter { aig, pairs })
    }

    /// Number of miter inputs, ie pairing slots.
    pub fn num_inputs(&self) -> usize {
        self.aig.num_inputs()
    }

    /// Cheap decision without SAT:
    /// - every pair merged by structural hashing: equivalent
    /// - a pair of complementary edges: the alarm is constant true, any pattern distinguishes.
    pub fn structural_check(&self) -> Option<EquivResult> {
        if self.pairs.iter().any(|(ea, eb)| ea.is_complement_of(eb)) {
            return Some(EquivResult::Different(vec![false; self.num_inputs()]));
        }
        if self.pairs.iter().all(|(ea, eb)| ea == eb) {
            return Some(EquivResult::Equivalent);
        }
        None
    }

    /// Tseitin encoding of the miter, asserting that at least one pair disagrees.
    ///
    /// Miter input `k` is variable `k + 1`. Pairs merged by hashing produce no alarm.
    pub fn to_cnf(&self) -> Result<(Cnf, HashMap<NodeId, Lit>)> {
        let mut litmap: HashMap<NodeId, Lit> = HashMap::new();
        for (k, input) in self.aig.get_inputs().iter().enumerate() {
            litmap.insert(
                input.get_id(),
                Lit::try_from(k as u64 + 1).map_err(MiterError::from)?,
            );
        }
        let mut next_var = self.num_inputs() as i64 + 1;
        let mut fresh = || {
            let lit = Lit::from(next_var);
            next_var += 1;
            lit
        };

        let mut cnf = Cnf::new();
        let gates: Vec<_> = Dfs::from_outputs(&self.aig)
            .filter(|n| n.is_and())
            .collect();
        for node in &gates {
            litmap.insert(node.get_id(), fresh());
        }
        for node in &gates {
            cnf.add_clauses_node(node, &litmap)?;
        }

        let mut alarms = Vec::new();
        for (ea, eb) in &self.pairs {
            if ea == eb {
                continue;
            }
            match (ea.get_literal(&litmap)?, eb.get_literal(&litmap)?) {
                (Some(la), Some(lb)) => {
                    let z = fresh();
                    cnf.add_xor(la, lb, z);
                    alarms.push(z);
                }
                // xor with a constant is the literal itself, or its negation
                (Some(l), None) => alarms.push(if eb.is_cst_true() { !l } else { l }),
                (None, Some(l)) => alarms.push(if ea.is_cst_true() { !l } else { l }),
                // two different constants: the formula is trivially satisfiable
                (None, None) => return Ok((Cnf::new(), litmap)),
            }
        }
        cnf.add_or_whose_output_is_true(alarms);

        Ok((cnf, litmap))
    }

    /// Decides the miter.
    ///
    /// The structural check is always tried first. `conflict_limit == Some(0)` stops there and
    /// answers [`EquivResult::Undecided`] for anything the structure cannot settle. varisat has no
    /// conflict budget, so any other limit lets the solver run to completion.
    pub fn check(&self, conflict_limit: Option<u64>) -> Result<EquivResult> {
        if let Some(result) = self.structural_check() {
            return Ok(result);
        }
        match conflict_limit {
            Some(0) => return Ok(EquivResult::Undecided),
            Some(limit) => debug!("conflict limit {limit} ignored, solving to completion"),
            None => {}
        }

        let (cnf, _) = self.to_cnf()?;
        trace!(
            "miter with {} inputs, {} gates, {} clauses",
            self.num_inputs(),
            self.aig.num_ands(),
            cnf.len()
        );
        match cnf.solve()? {
            SatOutcome::Unsat => Ok(EquivResult::Equivalent),
            SatOutcome::Sat(model) => {
                let positive: HashSet<u64> = model
                    .iter()
                    .filter(|l| l.is_positive())
                    .map(Lit::var)
                    .collect();
                Ok(EquivResult::Different(
                    (1..=self.num_inputs() as u64)
                        .map(|var| positive.contains(&var))
                        .collect(),
                ))
            }
        }
    }
}

/// Builds the miter of `a` and `b` and decides it, see [`Miter::new`] and [`Miter::check`].
pub fn check_equivalence(
    a: &Aig,
    b: &Aig,
    input_pairing: Option<&[(usize, usize)]>,
    output_pairing: &[(usize, usize)],
    conflict_limit: Option<u64>,
) -> Result<EquivResult> {
    Miter::new(a, b, input_pairing, output_pairing)?.check(conflict_limit)
}
