use std::{fmt, io::Write};

use super::search::SearchStats;

/// Which refinement step found the two networks incompatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementStage {
    /// Grouping by dependency cardinality.
    Initial,
    /// Splitting by dependency class signatures.
    Dependency,
    /// Splitting by simulation.
    Simulation,
}

impl fmt::Display for RefinementStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefinementStage::Initial => "initial grouping",
            RefinementStage::Dependency => "dependency refinement",
            RefinementStage::Simulation => "simulation refinement",
        };
        write!(f, "{name}")
    }
}

/// Why no matching exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatchReason {
    /// The class sizes of the two networks diverged, no bijection preserves them.
    PartitionDivergence(RefinementStage),
    /// Every candidate pairing was refuted.
    SearchExhausted,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::PartitionDivergence(stage) => {
                write!(f, "partitions diverged during {stage}")
            }
            NoMatchReason::SearchExhausted => write!(f, "no candidate pairing survived the search"),
        }
    }
}

/// A pairing of the inputs and outputs of two networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    /// `(input of the first network, input of the second network)`, by first input.
    pub inputs: Vec<(usize, usize)>,
    /// `(output of the first network, output of the second network)`, by first output.
    pub outputs: Vec<(usize, usize)>,
    pub input_names: Vec<(String, String)>,
    pub output_names: Vec<(String, String)>,
}

impl Matching {
    /// Second network input paired with input `i` of the first one.
    pub fn input_image(&self, i: usize) -> Option<usize> {
        self.inputs.iter().find(|(a, _)| *a == i).map(|&(_, b)| b)
    }

    /// Second network output paired with output `o` of the first one.
    pub fn output_image(&self, o: usize) -> Option<usize> {
        self.outputs.iter().find(|(a, _)| *a == o).map(|&(_, b)| b)
    }

    /// Input pattern of the second network corresponding to `pattern` on the first one.
    pub fn map_pattern(&self, pattern: &[bool]) -> Vec<bool> {
        let mut mapped = vec![false; self.inputs.len()];
        for &(a, b) in &self.inputs {
            mapped[b] = pattern[a];
        }
        mapped
    }

    /// Writes the human readable matching: pair counts, input pairs, a separator line, output
    /// pairs.
    pub fn write_report(&self, mut w: impl Write) -> std::io::Result<()> {
        write!(w, "{self}")
    }
}

impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "I/O = {} / {} ", self.inputs.len(), self.outputs.len())?;
        writeln!(f)?;
        for (a, b) in &self.input_names {
            writeln!(f, "{{{a}}}\t{{{b}}}")?;
        }
        writeln!(f)?;
        writeln!(f, "-----------------------------------------")?;
        for (a, b) in &self.output_names {
            writeln!(f, "{{{a}}}\t{{{b}}}")?;
        }
        Ok(())
    }
}

/// Input assignment on which a matched output pair disagrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterExample {
    /// Values of the inputs of the first network, by position.
    pub first_inputs: Vec<bool>,
    /// Values of the inputs of the second network, consistent with the input pairing.
    pub second_inputs: Vec<bool>,
    pub first_outputs: Vec<bool>,
    pub second_outputs: Vec<bool>,
    /// The first disagreeing output pair.
    pub output: (usize, usize),
}

/// Final answer of a matching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The networks are equivalent under this matching.
    Equivalent(Matching),
    /// The final check refuted the matching, which was either forced by refinement or built
    /// from optimistic acceptances.
    Different(Matching, CounterExample),
    /// No matching exists.
    NoMatch(NoMatchReason),
    /// A matching was found but the final check ran out of budget.
    Unknown(Matching),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent(_))
    }

    pub fn matching(&self) -> Option<&Matching> {
        match self {
            Verdict::Equivalent(m) | Verdict::Different(m, _) | Verdict::Unknown(m) => Some(m),
            Verdict::NoMatch(_) => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Equivalent(_) => write!(f, "equivalent"),
            Verdict::Different(_, cex) => write!(
                f,
                "different: outputs {} and {} disagree",
                cex.output.0, cex.output.1
            ),
            Verdict::NoMatch(reason) => write!(f, "no match: {reason}"),
            Verdict::Unknown(_) => write!(f, "unknown: final check undecided"),
        }
    }
}

/// Counters of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub dependency_rounds: usize,
    pub sim_rounds: usize,
    pub input_classes: usize,
    pub output_classes: usize,
    pub search: SearchStats,
}

/// Verdict of a run together with its counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub verdict: Verdict,
    pub stats: MatchStats,
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Matching {
        Matching {
            inputs: vec![(0, 1), (1, 0)],
            outputs: vec![(0, 0)],
            input_names: vec![("a".into(), "q".into()), ("b".into(), "p".into())],
            output_names: vec![("y".into(), "z".into())],
        }
    }

    #[test]
    fn report_test() {
        let mut buf = Vec::new();
        sample().write_report(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "I/O = 2 / 1 \n\n{a}\t{q}\n{b}\t{p}\n\n-----------------------------------------\n{y}\t{z}\n"
        );
    }

    #[test]
    fn verdict_test() {
        let m = sample();
        assert_eq!(m.input_image(0), Some(1));
        assert_eq!(m.output_image(3), None);
        assert_eq!(m.map_pattern(&[true, false]), vec![false, true]);

        let v = Verdict::Equivalent(m.clone());
        assert!(v.is_equivalent());
        assert_eq!(v.matching(), Some(&m));
        assert_eq!(v.to_string(), "equivalent");

        let v = Verdict::NoMatch(NoMatchReason::PartitionDivergence(RefinementStage::Simulation));
        assert!(v.matching().is_none());
        assert_eq!(
            v.to_string(),
            "no match: partitions diverged during simulation refinement"
        );
    }
}
