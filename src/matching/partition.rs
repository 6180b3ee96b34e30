//! Ordered partitions of the inputs or outputs of one network.
//!
//! Classes are identified by their creation index. The matcher keeps one partition per side and
//! per kind, and always splits both sides with the same rule, so that class `c` of one network
//! corresponds to class `c` of the other one.

/// An ordered partition of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    class_of: Vec<usize>,
    classes: Vec<Vec<usize>>,
}

impl Partition {
    /// A single class holding every element, or no class at all for `n = 0`.
    pub fn single(n: usize) -> Self {
        let classes = if n == 0 { Vec::new() } else { vec![(0..n).collect()] };
        Partition {
            class_of: vec![0; n],
            classes,
        }
    }

    /// One class per element, element `k` in class `k`.
    pub fn singletons(n: usize) -> Self {
        Partition {
            class_of: (0..n).collect(),
            classes: (0..n).map(|k| vec![k]).collect(),
        }
    }

    /// Groups the elements by the length of their dependency list.
    ///
    /// Classes come by increasing length, from 0 to `max_len`, and empty buckets are skipped.
    pub fn by_cardinality(deps: &[Vec<usize>], max_len: usize) -> Self {
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_len.max(1) + 1];
        for (k, list) in deps.iter().enumerate() {
            let len = list.len().min(max_len);
            buckets[len].push(k);
        }
        let classes: Vec<Vec<usize>> = buckets.into_iter().filter(|b| !b.is_empty()).collect();
        let mut class_of = vec![0; deps.len()];
        for (c, members) in classes.iter().enumerate() {
            for &k in members {
                class_of[k] = c;
            }
        }
        Partition { class_of, classes }
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of partitioned elements.
    pub fn num_elements(&self) -> usize {
        self.class_of.len()
    }

    pub fn class_of(&self, element: usize) -> usize {
        self.class_of[element]
    }

    pub fn class(&self, class: usize) -> &[usize] {
        &self.classes[class]
    }

    pub fn classes(&self) -> &[Vec<usize>] {
        &self.classes
    }

    /// Whether every class is a singleton.
    pub fn is_discrete(&self) -> bool {
        self.classes.iter().all(|c| c.len() == 1)
    }

    /// Size of each class, in class order.
    pub fn shape(&self) -> Vec<usize> {
        self.classes.iter().map(Vec::len).collect()
    }

    /// Two partitions can still describe matching networks only if their classes have the same
    /// sizes in the same order.
    pub fn is_consistent_with(&self, other: &Partition) -> bool {
        self.classes.len() == other.classes.len()
            && self
                .classes
                .iter()
                .zip(&other.classes)
                .all(|(a, b)| a.len() == b.len())
    }

    /// Whether every class of `self` lies inside a class of `coarser`.
    pub fn refines(&self, coarser: &Partition) -> bool {
        self.class_of.len() == coarser.class_of.len()
            && self.classes.iter().all(|members| {
                members
                    .iter()
                    .all(|&e| coarser.class_of[e] == coarser.class_of[members[0]])
            })
    }

    /// Splits class `class` according to one signature per member, given in member order.
    ///
    /// Members holding the smallest signature stay in `class`. The other groups become new
    /// classes appended in decreasing signature order. Returns the number of new classes.
    pub fn split_class<S: Ord>(&mut self, class: usize, signatures: &[S]) -> usize {
        let members = std::mem::take(&mut self.classes[class]);
        debug_assert_eq!(members.len(), signatures.len());

        let mut distinct: Vec<&S> = signatures.iter().collect();
        distinct.sort();
        distinct.dedup();
        if distinct.len() <= 1 {
            self.classes[class] = members;
            return 0;
        }

        let group = |sig: &S| -> Vec<usize> {
            members
                .iter()
                .zip(signatures)
                .filter(|(_, s)| *s == sig)
                .map(|(&m, _)| m)
                .collect()
        };

        for &sig in distinct[1..].iter().rev() {
            let id = self.classes.len();
            let peeled = group(sig);
            for &m in &peeled {
                self.class_of[m] = id;
            }
            self.classes.push(peeled);
        }
        self.classes[class] = group(distinct[0]);
        distinct.len() - 1
    }

    /// Splits every class that existed before the call and has more than one member.
    ///
    /// `signature` receives the class id and the element. Returns the number of new classes.
    pub fn refine_with<S: Ord>(&mut self, mut signature: impl FnMut(usize, usize) -> S) -> usize {
        let mut created = 0;
        for class in 0..self.classes.len() {
            if self.classes[class].len() < 2 {
                continue;
            }
            let signatures: Vec<S> = self.classes[class]
                .iter()
                .map(|&e| signature(class, e))
                .collect();
            created += self.split_class(class, &signatures);
        }
        created
    }
}
