use std::{collections::HashMap, ops::Not};

use crate::{Aig, AigEdge, AigError, AigNode, AigNodeRef, NodeId, Result};

/// AND gates of a network bucketed by topological level.
///
/// Level 0 holds the inputs, level `l > 0` the gates whose deepest fanin is at level `l - 1`.
/// It is computed once per network and reused by every cofactor built from it.
#[derive(Debug, Clone)]
pub struct LevelIndex {
    levels: Vec<Vec<AigNodeRef>>,
}

impl LevelIndex {
    pub fn new(aig: &Aig) -> Self {
        let node_levels = aig.levels();
        let depth = node_levels.values().copied().max().unwrap_or(0);
        let mut levels: Vec<Vec<AigNodeRef>> = vec![Vec::new(); depth + 1];
        levels[0] = aig.get_inputs().to_vec();
        for node in aig.and_nodes() {
            if let Some(&l) = node_levels.get(&node.get_id()) {
                levels[l].push(node);
            }
        }
        LevelIndex { levels }
    }

    /// Number of levels, the input level included.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, l: usize) -> &[AigNodeRef] {
        self.levels.get(l).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The AND gates, level by level.
    pub fn gates(&self) -> impl Iterator<Item = &AigNodeRef> {
        self.levels.iter().skip(1).flatten()
    }
}

/// Value taken by a node of the parent network while building a cofactor.
#[derive(Debug, Clone)]
enum CofactorValue {
    Zero,
    One,
    Mapped(AigEdge),
}

impl Not for CofactorValue {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            CofactorValue::Zero => CofactorValue::One,
            CofactorValue::One => CofactorValue::Zero,
            CofactorValue::Mapped(edge) => CofactorValue::Mapped(!edge),
        }
    }
}

impl From<bool> for CofactorValue {
    fn from(value: bool) -> Self {
        if value {
            CofactorValue::One
        } else {
            CofactorValue::Zero
        }
    }
}

impl CofactorValue {
    fn into_edge(self, aig: &Aig) -> AigEdge {
        match self {
            CofactorValue::Zero => aig.constant(false),
            CofactorValue::One => aig.constant(true),
            CofactorValue::Mapped(edge) => edge,
        }
    }
}

fn resolve(values: &HashMap<NodeId, CofactorValue>, edge: &AigEdge) -> Result<CofactorValue> {
    let id = edge.get_node_id();
    let value = values
        .get(&id)
        .cloned()
        .ok_or(AigError::NodeDoesNotExist(id))?;
    Ok(if edge.get_complement() { !value } else { value })
}

impl Aig {
    /// Builds the cofactor of the network where only the inputs at positions `kept` stay free.
    ///
    /// The result has one input per entry of `kept`, in that order and with the same names. Every
    /// other input is held at `forced[i]`, or at 0 when no forced vector is given. Gates are folded
    /// level by level: a constant 0 fanin gives 0, a constant 1 fanin gives the other fanin, two
    /// mapped fanins give a new gate. Every output is kept, possibly as a constant.
    ///
    /// `levels` must have been computed on `self`.
    pub fn cofactor(
        &self,
        levels: &LevelIndex,
        forced: Option<&[bool]>,
        kept: &[usize],
    ) -> Result<Aig> {
        if let Some(bits) = forced {
            if bits.len() != self.num_inputs() {
                return Err(AigError::InvalidState(format!(
                    "forced vector has {} bits for {} inputs",
                    bits.len(),
                    self.num_inputs()
                )));
            }
        }

        let mut sub = Aig::new();
        let mut values: HashMap<NodeId, CofactorValue> = HashMap::with_capacity(self.num_nodes());
        values.insert(0, CofactorValue::Zero);

        for &k in kept {
            let input = self.get_input(k)?;
            let edge = sub.add_input(self.input_names[k].clone());
            if values
                .insert(input.get_id(), CofactorValue::Mapped(edge))
                .is_some()
            {
                return Err(AigError::InvalidState(format!(
                    "input {} is kept twice",
                    k
                )));
            }
        }
        for (k, input) in self.inputs.iter().enumerate() {
            values
                .entry(input.get_id())
                .or_insert_with(|| forced.map_or(false, |bits| bits[k]).into());
        }

        for node in levels.gates() {
            if let AigNode::And { id, fanin0, fanin1 } = node.as_ref() {
                let value = match (resolve(&values, fanin0)?, resolve(&values, fanin1)?) {
                    (CofactorValue::Zero, _) | (_, CofactorValue::Zero) => CofactorValue::Zero,
                    (CofactorValue::One, other) | (other, CofactorValue::One) => other,
                    (CofactorValue::Mapped(a), CofactorValue::Mapped(b)) => {
                        CofactorValue::Mapped(sub.and(&a, &b))
                    }
                };
                values.insert(*id, value);
            }
        }

        for (output, name) in self.outputs.iter().zip(&self.output_names) {
            let edge = resolve(&values, output)?.into_edge(&sub);
            sub.add_output(edge, name.clone());
        }

        Ok(sub)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::Simulator;

    /// y = (a & b) | c, z = a ^ c
    fn sample() -> Aig {
        let mut aig = Aig::new();
        let a = aig.add_input("a");
        let b = aig.add_input("b");
        let c = aig.add_input("c");
        let ab = aig.and(&a, &b);
        let y = aig.or(&ab, &c);
        let z = aig.xor(&a, &c);
        aig.add_output(y, "y");
        aig.add_output(z, "z");
        aig
    }

    #[test]
    fn level_index_test() {
        let aig = sample();
        let levels = LevelIndex::new(&aig);
        assert_eq!(levels.level(0).len(), 3);
        assert_eq!(levels.gates().count(), aig.num_ands());
        assert!(levels.level(levels.len()).is_empty());
        for l in 1..levels.len() {
            assert!(!levels.level(l).is_empty());
        }
    }

    #[test]
    fn cofactor_constant_folding_test() {
        let aig = sample();
        let levels = LevelIndex::new(&aig);

        // Only c is free, a and b held at 0: y = c, z = c.
        let sub = aig.cofactor(&levels, None, &[2]).unwrap();
        sub.check_integrity().unwrap();
        assert_eq!(sub.num_inputs(), 1);
        assert_eq!(sub.input_names(), &["c"]);
        assert_eq!(sub.num_ands(), 0);
        let c = sub.input_edge(0).unwrap();
        assert_eq!(sub.get_output(0).unwrap(), &c);
        assert_eq!(sub.get_output(1).unwrap(), &c);

        // a forced to 1, b forced to 1, c free: y = 1, z = !c.
        let sub = aig
            .cofactor(&levels, Some(&[true, true, false]), &[2])
            .unwrap();
        assert!(sub.get_output(0).unwrap().is_cst_true());
        assert_eq!(sub.get_output(1).unwrap(), &!sub.input_edge(0).unwrap());

        // Nothing free.
        let sub = aig
            .cofactor(&levels, Some(&[true, false, false]), &[])
            .unwrap();
        assert!(sub.get_output(0).unwrap().is_cst_false());
        assert!(sub.get_output(1).unwrap().is_cst_true());
    }

    #[test]
    fn cofactor_order_test() {
        let aig = sample();
        let levels = LevelIndex::new(&aig);
        let sub = aig.cofactor(&levels, None, &[2, 0, 1]).unwrap();
        assert_eq!(sub.input_names(), &["c", "a", "b"]);

        let s0 = Simulator::new(&aig);
        let s1 = Simulator::new(&sub);
        for pattern in 0..8u32 {
            let bits: Vec<bool> = (0..3).map(|k| pattern >> k & 1 == 1).collect();
            assert_eq!(
                s0.simulate_pattern(&bits),
                s1.simulate_pattern(&[bits[2], bits[0], bits[1]])
            );
        }
    }

    #[test]
    fn cofactor_invalid_test() {
        let aig = sample();
        let levels = LevelIndex::new(&aig);
        assert!(aig.cofactor(&levels, None, &[0, 0]).is_err());
        assert!(aig.cofactor(&levels, None, &[3]).is_err());
        assert!(aig.cofactor(&levels, Some(&[true]), &[0]).is_err());
    }
}
