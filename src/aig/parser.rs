use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{Aig, AigEdge, Result, aig::error::ParserError};

fn read_u64(s: &str) -> std::result::Result<u64, ParserError> {
    s.parse::<u64>()
        .map_err(|_| ParserError::InvalidToken(s.to_string() + " expected u64"))
}

fn check_even(x: u64) -> Result<()> {
    if x & 1 == 1 {
        return Err(ParserError::InvalidToken(
            "expected literal to be even, got ".to_string() + &x.to_string(),
        )
        .into());
    }
    Ok(())
}

/// Reads the next line into `line`, failing on end of file.
fn next_line(reader: &mut impl BufRead, line: &mut String) -> Result<()> {
    line.clear();
    let n = reader.read_line(line).map_err(ParserError::from)?;
    if n == 0 {
        return Err(ParserError::InvalidToken("unexpected end of file".to_string()).into());
    }
    Ok(())
}

/// Reads a line holding exactly one literal.
fn read_single_literal(line: &str, what: &str) -> Result<u64> {
    let tokens = line.split_whitespace().collect::<Vec<&str>>();

    if tokens.is_empty() {
        return Err(
            ParserError::InvalidToken(format!("expected {} token, got nothing", what)).into(),
        );
    }

    if tokens.len() > 1 {
        return Err(ParserError::InvalidToken(format!(
            "expected nothing after {}, got {}",
            what, tokens[1]
        ))
        .into());
    }

    Ok(read_u64(tokens[0])?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    m: u64,
    i: u64,
    o: u64,
    a: u64,
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> std::result::Result<Self, Self::Error> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 6 {
            return Err(ParserError::InvalidToken(
                "missing header tokens".to_string(),
            ));
        }

        if tokens[0] != "aag" && tokens[0] != "aig" {
            return Err(ParserError::InvalidToken(
                "expected aag (or at least aig)".to_string(),
            ));
        }

        let m = read_u64(tokens[1])?;
        let i = read_u64(tokens[2])?;
        let l = read_u64(tokens[3])?;
        let o = read_u64(tokens[4])?;
        let a = read_u64(tokens[5])?;

        if tokens.len() > 6 {
            return Err(ParserError::UnsupportedFeature(
                "header only supports M I L O A".to_string(),
            ));
        }

        if l != 0 {
            return Err(ParserError::UnsupportedFeature(
                "latches (only combinational networks can be matched)".to_string(),
            ));
        }

        if m < i + a {
            return Err(ParserError::InvalidToken(format!(
                "maximum variable index {} is lower than I + A = {}",
                m,
                i + a
            )));
        }

        Ok(Header { m, i, o, a })
    }
}

/// Maps AIGER variables to edges of the AIG being built.
///
/// AND gates of the ASCII format may come in any order, so they are recorded first and
/// instantiated on demand, fanins first.
struct Builder {
    aig: Aig,
    edges: HashMap<u64, AigEdge>,
    ands: HashMap<u64, (u64, u64)>,
}

impl Builder {
    fn new(input_vars: &[u64]) -> Result<Self> {
        let mut aig = Aig::new();
        let mut edges = HashMap::from([(0, aig.constant(false))]);
        for (k, &var) in input_vars.iter().enumerate() {
            let edge = aig.add_input(format!("i{}", k));
            if var == 0 || edges.insert(var, edge).is_some() {
                return Err(ParserError::InvalidToken(format!(
                    "input variable {} defined twice (or constant)",
                    var
                ))
                .into());
            }
        }
        Ok(Builder {
            aig,
            edges,
            ands: HashMap::new(),
        })
    }

    fn define_and(&mut self, var: u64, rhs0: u64, rhs1: u64) -> Result<()> {
        if self.edges.contains_key(&var) || self.ands.insert(var, (rhs0, rhs1)).is_some() {
            return Err(ParserError::InvalidToken(format!(
                "variable {} defined twice",
                var
            ))
            .into());
        }
        Ok(())
    }

    fn edge_of(&self, lit: u64) -> Option<AigEdge> {
        self.edges
            .get(&(lit >> 1))
            .map(|edge| edge.clone().not_if(lit & 1 == 1))
    }

    /// Returns the edge of `lit`, building the gates of its cone if needed.
    fn resolve(&mut self, lit: u64) -> Result<AigEdge> {
        let mut in_progress: HashSet<u64> = HashSet::new();
        let mut stack: Vec<(u64, bool)> = vec![(lit >> 1, false)];

        while let Some((var, expanded)) = stack.pop() {
            if self.edges.contains_key(&var) {
                continue;
            }
            let &(rhs0, rhs1) = self.ands.get(&var).ok_or(ParserError::InvalidToken(
                format!("literal {} is never defined", var << 1),
            ))?;

            if expanded {
                let (Some(e0), Some(e1)) = (self.edge_of(rhs0), self.edge_of(rhs1)) else {
                    return Err(ParserError::InvalidToken(format!(
                        "fanins of variable {} are undefined",
                        var
                    ))
                    .into());
                };
                let edge = self.aig.and(&e0, &e1);
                self.edges.insert(var, edge);
                in_progress.remove(&var);
                continue;
            }

            in_progress.insert(var);
            stack.push((var, true));
            for child in [rhs0 >> 1, rhs1 >> 1] {
                if self.edges.contains_key(&child) {
                    continue;
                }
                if in_progress.contains(&child) {
                    return Err(ParserError::InvalidToken(format!(
                        "combinational cycle through variable {}",
                        child
                    ))
                    .into());
                }
                stack.push((child, false));
            }
        }

        self.edge_of(lit).ok_or(
            ParserError::InvalidToken(format!("literal {} is never defined", lit)).into(),
        )
    }

    fn finish(mut self, outputs: &[u64], symbols: &[String]) -> Result<Aig> {
        for (k, &lit) in outputs.iter().enumerate() {
            let edge = self.resolve(lit)?;
            self.aig.add_output(edge, format!("o{}", k));
        }
        read_symbols(&mut self.aig, symbols)?;
        self.aig.check_integrity()?;
        Ok(self.aig)
    }
}

/// Applies the symbol table (`i<k> name`, `o<k> name`) that may follow the gates.
/// Reading stops at the comment section.
fn read_symbols(aig: &mut Aig, lines: &[String]) -> Result<()> {
    for line in lines {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.starts_with('c') {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let Some((tag, name)) = line.split_once(' ') else {
            return Err(ParserError::InvalidToken(format!("invalid symbol line {}", line)).into());
        };
        let Some(kind) = tag.chars().next() else {
            return Err(ParserError::InvalidToken(format!("invalid symbol line {}", line)).into());
        };
        let position = read_u64(&tag[kind.len_utf8()..])? as usize;
        let names = match kind {
            'i' => &mut aig.input_names,
            'o' => &mut aig.output_names,
            _ => {
                return Err(
                    ParserError::InvalidToken(format!("unexpected symbol kind {}", kind)).into(),
                );
            }
        };
        let slot = names.get_mut(position).ok_or(ParserError::InvalidToken(format!(
            "symbol {} refers to a missing position",
            tag
        )))?;
        *slot = name.to_string();
    }
    Ok(())
}

fn read_remaining_lines(reader: &mut impl BufRead) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.map_err(ParserError::from)?);
    }
    Ok(lines)
}

/// Parser for the ASCII AIGER format.
mod ascii {
    use std::io::{BufReader, Read};

    use super::{
        Builder, Header, check_even, next_line, read_remaining_lines, read_single_literal,
        read_u64,
    };
    use crate::{Aig, Result, aig::error::ParserError};

    pub(super) fn read_input(line: &str) -> Result<u64> {
        let i = read_single_literal(line, "input")?;
        check_even(i)?;
        Ok(i >> 1)
    }

    pub(super) fn read_output(line: &str) -> Result<u64> {
        read_single_literal(line, "output")
    }

    pub(super) fn read_and(line: &str) -> Result<(u64, u64, u64)> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 3 {
            return Err(ParserError::InvalidToken("not enough and tokens".to_string()).into());
        }

        if tokens.len() > 3 {
            return Err(ParserError::InvalidToken(
                "expected nothing after and tokens, got ".to_string() + tokens[3],
            )
            .into());
        }

        let id = read_u64(tokens[0])?;
        let fanin0 = read_u64(tokens[1])?;
        let fanin1 = read_u64(tokens[2])?;

        check_even(id)?;
        Ok((id >> 1, fanin0, fanin1))
    }

    impl Aig {
        /// Creates an AIG from a reader over an ASCII AIGER (`aag`) description.
        pub fn from_ascii(reader: impl Read) -> Result<Self> {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            next_line(&mut reader, &mut line)?;
            let header = Header::try_from(line.as_str())?;

            let mut inputs = Vec::new();
            for _ in 0..header.i {
                next_line(&mut reader, &mut line)?;
                inputs.push(read_input(&line)?);
            }

            let mut outputs = Vec::new();
            for _ in 0..header.o {
                next_line(&mut reader, &mut line)?;
                outputs.push(read_output(&line)?);
            }

            let mut builder = Builder::new(&inputs)?;
            for _ in 0..header.a {
                next_line(&mut reader, &mut line)?;
                let (var, rhs0, rhs1) = read_and(&line)?;
                if var > header.m {
                    return Err(ParserError::InvalidToken(format!(
                        "variable {} exceeds maximum index {}",
                        var, header.m
                    ))
                    .into());
                }
                builder.define_and(var, rhs0, rhs1)?;
            }

            let symbols = read_remaining_lines(&mut reader)?;
            builder.finish(&outputs, &symbols)
        }
    }

}

/// Parser for the binary AIGER format.
mod bin {
    use std::io::{BufReader, Read};

    use super::{Builder, Header, next_line, read_single_literal};
    use crate::{Aig, Result, aig::error::ParserError};

    fn getnoneofch(buf: &[u8], offset: &mut usize) -> Result<u8> {
        if *offset >= buf.len() {
            return Err(ParserError::InvalidToken("unexpected end of file".to_string()).into());
        }

        let byte = buf[*offset];
        *offset += 1;
        Ok(byte)
    }

    pub(super) fn decode_delta(buf: &[u8], offset: &mut usize) -> Result<u64> {
        let mut x = 0;
        let mut i = 0;

        loop {
            let ch = getnoneofch(buf, offset)?;
            if i >= 10 {
                return Err(ParserError::InvalidToken("delta does not fit u64".to_string()).into());
            }
            x |= ((ch & 0x7f) as u64) << (7 * i);
            i += 1;

            if ch & 0x80 == 0 {
                return Ok(x);
            }
        }
    }

    impl Aig {
        /// Creates an AIG from a reader over a binary AIGER (`aig`) description.
        pub fn from_bin(reader: impl Read) -> Result<Self> {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            next_line(&mut reader, &mut line)?;
            let header = Header::try_from(line.as_str())?;

            // Inputs are implicit in the binary format.
            let inputs: Vec<u64> = (1..=header.i).collect();

            let mut outputs = Vec::new();
            for _ in 0..header.o {
                next_line(&mut reader, &mut line)?;
                outputs.push(read_single_literal(&line, "output")?);
            }

            let mut buf = Vec::new();
            reader
                .read_to_end(&mut buf)
                .map_err(ParserError::from)?;

            let mut builder = Builder::new(&inputs)?;
            let mut offset = 0;
            let mut lhs = 2 * (header.i + 1);

            for _ in 0..header.a {
                let delta0 = decode_delta(&buf, &mut offset)?;
                let delta1 = decode_delta(&buf, &mut offset)?;

                let rhs0 = lhs.checked_sub(delta0);
                let rhs1 = rhs0.and_then(|rhs0| rhs0.checked_sub(delta1));
                let (Some(rhs0), Some(rhs1)) = (rhs0, rhs1) else {
                    return Err(ParserError::InvalidToken(format!(
                        "invalid deltas for gate {}",
                        lhs
                    ))
                    .into());
                };
                builder.define_and(lhs >> 1, rhs0, rhs1)?;

                lhs += 2;
            }

            let symbols: Vec<String> = String::from_utf8_lossy(&buf[offset..])
                .lines()
                .map(str::to_string)
                .collect();
            builder.finish(&outputs, &symbols)
        }
    }
}

impl Aig {
    /// Creates an AIG from an .aig (resp .aag) file using bin (resp. ASCII) AIGER format.
    ///
    /// Only combinational files are supported: a file declaring latches is rejected.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref()).map_err(ParserError::from)?;
        let reader = BufReader::new(f);
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("aag") => Aig::from_ascii(reader),
            Some("aig") => Aig::from_bin(reader),
            _ => Err(
                ParserError::IoError("invalid extension, expected .aag or .aig".to_string()).into(),
            ),
        }
    }
}
