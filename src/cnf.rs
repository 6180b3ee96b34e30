//! SAT formulas in conjunctive normal form, and the call into the SAT solver.
//!
//! To decide whether two circuits `a` and `b` disagree on some paired output:
//! - build the miter of `a` and `b` with [`Miter::new`]
//! - extract CNF from the miter with methods of [`Cnf`]
//! - check if the CNF is **SAT** with [`Cnf::solve`]; a model is a distinguishing input pattern.
//!
//! If the resulting CNF is UNSAT, the two circuits are **equivalent** on the paired outputs.
//!
//! This is already implemented in [`Miter::check`].
//!
//! [`Miter::new`]: crate::miter::Miter::new
//! [`Miter::check`]: crate::miter::Miter::check

use std::{collections::HashMap, num::TryFromIntError, ops::Not};

use log::trace;
use varisat::ExtendFormula;

use crate::{AigEdge, AigNode, NodeId, Result, miter::MiterError};

/// A SAT literal.
///
/// Note that all AIG nodes do not correspond to a SAT literal.
/// For example, [`AigNode::False`] node do not map to any literal, but rather is omitted
/// as false boolean variables can be removed from a clause without changing the problem.
/// Clauses that contain a true boolean variable (ie a complemented edge to [`AigNode::False`] node)
/// are obviously true and don't need to be emitted.
///
/// These cases are handled by the internal `LitRes` data structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(i64);

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl From<i64> for Lit {
    fn from(value: i64) -> Self {
        if value == 0 {
            panic!("Tried to create a Lit from 0. 0 is not a valid literal in DIMACS format.");
        }
        Lit(value)
    }
}

impl TryFrom<NodeId> for Lit {
    type Error = TryFromIntError;

    fn try_from(value: NodeId) -> std::result::Result<Self, Self::Error> {
        Ok(Lit::from(i64::try_from(value)?))
    }
}

impl Lit {
    /// The DIMACS variable index.
    pub fn var(&self) -> u64 {
        self.0.unsigned_abs()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    fn to_varisat(self) -> varisat::Lit {
        varisat::Lit::from_dimacs(self.0 as isize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LitRes {
    False,
    True,
    Lit(Lit),
}

impl Not for LitRes {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LitRes::False => LitRes::True,
            LitRes::True => LitRes::False,
            LitRes::Lit(lit) => LitRes::Lit(!lit),
        }
    }
}

impl From<Lit> for LitRes {
    fn from(value: Lit) -> Self {
        LitRes::Lit(value)
    }
}

/// A SAT clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clause(Vec<Lit>);

impl Clause {
    /// A new empty clause.
    pub fn new() -> Self {
        Clause(Vec::new())
    }

    pub fn literals(&self) -> &[Lit] {
        &self.0
    }

    /// Returns the true SAT clause once we got rid of `True` and `False` literals.
    /// If there is a `True`, then the Clause is obviously satisfied, so we return None.
    /// `False` literals are omitted, and real literals are added to the clause.
    /// If the clause is empty (lits were only `False`), None is returned.
    fn from_lit_res(lits: Vec<LitRes>) -> Option<Clause> {
        let mut literals = Vec::new();

        for lit_res in lits {
            match lit_res {
                LitRes::True => return None,
                LitRes::False => (),
                LitRes::Lit(lit) => literals.push(lit),
            }
        }

        if literals.is_empty() {
            None
        } else {
            Some(Clause(literals))
        }
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(value: Vec<Lit>) -> Self {
        Clause(value)
    }
}

/// Result of a SAT call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatOutcome {
    /// Satisfiable, with the model: one literal per variable the solver knows about.
    Sat(Vec<Lit>),
    Unsat,
}

/// A SAT CNF that can be passed to a SAT solver.
///
/// It provides the two methods needed to finish a miter: [`add_xor`] for each compared pair and
/// [`add_or_whose_output_is_true`] for the final alarm.
///
/// [`add_xor`]: Cnf::add_xor
/// [`add_or_whose_output_is_true`]: Cnf::add_or_whose_output_is_true
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf(Vec<Clause>);

impl Cnf {
    /// A new empty CNF.
    pub fn new() -> Self {
        Cnf(Vec::new())
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add the given clause to the CNF.
    pub fn add_clause(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Add the given clause to the CNF, else does nothing.
    pub fn add_clause_if(&mut self, clause: Option<Clause>) {
        if let Some(c) = clause {
            self.add_clause(c);
        }
    }

    /// Add clauses induced by the node.
    pub fn add_clauses_node(
        &mut self,
        node: &AigNode,
        litmap: &HashMap<NodeId, Lit>,
    ) -> Result<()> {
        // The other nodes do not induce any clause, they only generate literals
        if let AigNode::And { id, fanin0, fanin1 } = node {
            let a = fanin0.get_literal_res(litmap)?;
            let b = fanin1.get_literal_res(litmap)?;
            let z = LitRes::from(*litmap.get(id).ok_or(MiterError::UnmappedNodeToLit(*id))?);

            self.add_clause_if(Clause::from_lit_res(vec![a, !z]));
            self.add_clause_if(Clause::from_lit_res(vec![b, !z]));
            self.add_clause_if(Clause::from_lit_res(vec![!a, !b, z]));
        }
        Ok(())
    }

    /// Add clauses that encode `z = XOR(a, b)`.
    ///
    /// - a is the literal associated with the `fanin0`
    /// - b is the literal associated with the `fanin1`
    /// - z is the literal of the XOR gate itself, usually a fresh one.
    pub fn add_xor(&mut self, a: Lit, b: Lit, z: Lit) {
        self.add_clause(Clause::from(vec![a, b, !z]));
        self.add_clause(Clause::from(vec![a, !b, z]));
        self.add_clause(Clause::from(vec![!a, b, z]));
        self.add_clause(Clause::from(vec![!a, !b, !z]));
    }

    /// Add clauses that encode `OR(inputs) = true`.
    ///
    /// This is the last node of the miter to compare two circuits.
    /// We assume that the output is true, which means there are at least a pair of outputs
    /// which differ for the same set of inputs:
    /// - if this is possible (ie the CNF is SAT), then circuits are not equivalent
    /// - if the CNF is UNSAT, then circuits are equivalent.
    pub fn add_or_whose_output_is_true(&mut self, inputs: Vec<Lit>) {
        self.add_clause(Clause::from(inputs));
    }

    /// Solves the CNF with varisat.
    pub fn solve(&self) -> Result<SatOutcome> {
        let mut solver = varisat::Solver::new();
        for clause in &self.0 {
            let lits: Vec<varisat::Lit> = clause.0.iter().map(|l| l.to_varisat()).collect();
            solver.add_clause(&lits);
        }
        trace!("solving cnf with {} clauses", self.0.len());

        match solver.solve() {
            Ok(false) => Ok(SatOutcome::Unsat),
            Ok(true) => {
                let model = solver
                    .model()
                    .ok_or(MiterError::SolverFailed("no model for a SAT answer".to_string()))?;
                Ok(SatOutcome::Sat(
                    model
                        .into_iter()
                        .map(|l| Lit::from(l.to_dimacs() as i64))
                        .collect(),
                ))
            }
            Err(e) => Err(MiterError::SolverFailed(format!("{:?}", e)).into()),
        }
    }
}

impl AigEdge {
    fn get_literal_res(&self, litmap: &HashMap<NodeId, Lit>) -> Result<LitRes> {
        let lit = if self.get_node().is_false() {
            LitRes::False
        } else {
            let id = self.get_node_id();
            LitRes::from(*litmap.get(&id).ok_or(MiterError::UnmappedNodeToLit(id))?)
        };
        Ok(if self.get_complement() { !lit } else { lit })
    }

    /// Literal of the edge, `None` when the edge is a constant.
    pub(crate) fn get_literal(&self, litmap: &HashMap<NodeId, Lit>) -> Result<Option<Lit>> {
        Ok(match self.get_literal_res(litmap)? {
            LitRes::Lit(lit) => Some(lit),
            _ => None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Aig;

    #[test]
    fn not_lit_test() {
        let l1 = Lit(1);
        assert_eq!(!l1, Lit(-1));
        assert_eq!((!l1).var(), 1);
        assert!(!(!l1).is_positive());
    }

    #[test]
    fn not_lit_res_test() {
        let ltrue = LitRes::True;
        let lfalse = LitRes::False;
        let l1 = LitRes::Lit(Lit(1));
        assert_eq!(!lfalse, ltrue);
        assert_eq!(!l1, LitRes::Lit(!Lit(1)));
    }

    #[test]
    fn clause_from_lit_res_test() {
        let ltrue = LitRes::True;
        let lfalse = LitRes::False;
        let l1 = Lit(1);
        let l2 = Lit(2);
        let lr1 = LitRes::Lit(l1);
        let lr2 = LitRes::Lit(l2);

        assert!(Clause::from_lit_res(vec![lfalse, lfalse]).is_none());
        assert!(Clause::from_lit_res(vec![lfalse, ltrue, lr1]).is_none());
        assert_eq!(
            Clause::from_lit_res(vec![lr1, lfalse, lr2]).unwrap(),
            Clause(vec![l1, l2])
        );
    }

    #[test]
    fn add_clause_test() {
        let l1 = Lit(1);
        let l2 = Lit(2);
        let c = Clause::from(vec![l1, l2]);

        let mut cnf = Cnf::new();

        cnf.add_clause(c.clone());
        assert_eq!(cnf.0, vec![c.clone()]);

        cnf.add_clause_if(Some(c.clone()));
        assert_eq!(cnf.0, vec![c.clone(), c.clone()]);

        cnf.add_clause_if(None);
        assert_eq!(cnf.len(), 2);
    }

    #[test]
    fn add_clauses_node_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let ab = aig.and(&a, &!&b);
        let litmap = HashMap::from([(1, Lit(1)), (2, Lit(2)), (ab.get_node_id(), Lit(3))]);

        let mut cnf = Cnf::new();
        cnf.add_clauses_node(&ab.get_node(), &litmap).unwrap();
        assert_eq!(
            cnf.clauses(),
            &[
                Clause(vec![Lit(1), Lit(-3)]),
                Clause(vec![Lit(-2), Lit(-3)]),
                Clause(vec![Lit(-1), Lit(2), Lit(3)]),
            ]
        );

        // inputs do not produce clauses, unmapped gates are errors
        cnf.add_clauses_node(&a.get_node(), &litmap).unwrap();
        assert_eq!(cnf.len(), 3);
        assert!(cnf.add_clauses_node(&ab.get_node(), &HashMap::new()).is_err());
    }

    #[test]
    fn solve_test() {
        // z = a xor b, z true, a true: b must be false.
        let mut cnf = Cnf::new();
        cnf.add_xor(Lit(1), Lit(2), Lit(3));
        cnf.add_clause(Clause::from(vec![Lit(3)]));
        cnf.add_clause(Clause::from(vec![Lit(1)]));
        match cnf.solve().unwrap() {
            SatOutcome::Sat(model) => {
                assert!(model.contains(&Lit(1)));
                assert!(model.contains(&Lit(-2)));
            }
            SatOutcome::Unsat => panic!("expected SAT"),
        }

        // b = 1 now contradicts the model above
        cnf.add_or_whose_output_is_true(vec![Lit(2)]);
        assert_eq!(cnf.solve().unwrap(), SatOutcome::Unsat);
    }

    #[test]
    #[should_panic]
    fn invalid_lit_from_test() {
        _ = Lit::from(0);
    }

    #[test]
    #[should_panic]
    fn invalid_lit_tryfrom_test() {
        _ = Lit::try_from(0 as NodeId);
    }
}
