use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;

/// Bijection over the indices of an alphabet, written in cycle notation.
///
/// Both directions are materialized at construction so `permute` and
/// `invert` are single table lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Builds the permutation described by `cycles`, e.g. `"(AELT) (BK) (C)"`.
    ///
    /// Whitespace is ignored everywhere. Symbols that appear in no cycle map
    /// to themselves.
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self, EnigmaError> {
        let size = alphabet.size();
        let mut forward: Vec<usize> = (0..size).collect();
        let mut mapped = vec![false; size];
        for cycle in parse_cycles(cycles)? {
            let mut indices = Vec::with_capacity(cycle.len());
            for symbol in cycle {
                let index = alphabet.to_int(symbol)?;
                if mapped[index] {
                    return Err(EnigmaError::DuplicateMapping(symbol));
                }
                mapped[index] = true;
                indices.push(index);
            }
            for (position, &from) in indices.iter().enumerate() {
                forward[from] = indices[(position + 1) % indices.len()];
            }
        }
        let mut inverse = vec![0; size];
        for (from, &to) in forward.iter().enumerate() {
            inverse[to] = from;
        }
        Ok(Self {
            alphabet,
            forward,
            inverse,
        })
    }

    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let forward: Vec<usize> = (0..alphabet.size()).collect();
        Self {
            inverse: forward.clone(),
            forward,
            alphabet,
        }
    }

    pub fn size(&self) -> usize {
        self.forward.len()
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// `p` modulo the alphabet size, always in `0..size()`.
    pub fn wrap(&self, p: isize) -> usize {
        p.rem_euclid(self.size() as isize) as usize
    }

    pub fn permute(&self, p: isize) -> usize {
        self.forward[self.wrap(p)]
    }

    pub fn invert(&self, c: isize) -> usize {
        self.inverse[self.wrap(c)]
    }

    pub fn permute_symbol(&self, p: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.to_int(p)?;
        Ok(self.alphabet.symbol_at(self.forward[index]))
    }

    pub fn invert_symbol(&self, c: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.to_int(c)?;
        Ok(self.alphabet.symbol_at(self.inverse[index]))
    }

    /// True iff no symbol maps to itself.
    pub fn derangement(&self) -> bool {
        self.forward
            .iter()
            .enumerate()
            .all(|(from, &to)| from != to)
    }

    /// True iff every cycle has length one or two.
    pub fn is_involution(&self) -> bool {
        self.forward == self.inverse
    }

    /// Canonical cycle notation, fixed points omitted.
    pub fn cycles(&self) -> Vec<String> {
        let mut visited = vec![false; self.size()];
        let mut cycles = Vec::new();
        for start in 0..self.size() {
            if visited[start] || self.forward[start] == start {
                continue;
            }
            let mut cycle = String::new();
            let mut current = start;
            while !visited[current] {
                visited[current] = true;
                cycle.push(self.alphabet.symbol_at(current));
                current = self.forward[current];
            }
            cycles.push(cycle);
        }
        cycles
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, cycle) in self.cycles().iter().enumerate() {
            if position > 0 {
                f.write_str(" ")?;
            }
            write!(f, "({cycle})")?;
        }
        Ok(())
    }
}

/// Splits cycle notation into its groups of symbols.
fn parse_cycles(text: &str) -> Result<Vec<Vec<char>>, EnigmaError> {
    let mut cycles = Vec::new();
    let mut current: Option<Vec<char>> = None;
    for symbol in text.chars().filter(|c| !c.is_whitespace()) {
        match symbol {
            '(' => {
                if current.is_some() {
                    return Err(EnigmaError::MalformedCycle(format!(
                        "nested '(' in {text:?}"
                    )));
                }
                current = Some(Vec::new());
            }
            ')' => match current.take() {
                Some(cycle) if !cycle.is_empty() => cycles.push(cycle),
                Some(_) => {
                    return Err(EnigmaError::MalformedCycle(format!(
                        "empty cycle in {text:?}"
                    )));
                }
                None => {
                    return Err(EnigmaError::MalformedCycle(format!(
                        "unmatched ')' in {text:?}"
                    )));
                }
            },
            _ => match current.as_mut() {
                Some(cycle) => cycle.push(symbol),
                None => {
                    return Err(EnigmaError::MalformedCycle(format!(
                        "'{symbol}' outside a cycle in {text:?}"
                    )));
                }
            },
        }
    }
    if current.is_some() {
        return Err(EnigmaError::MalformedCycle(format!(
            "unterminated cycle in {text:?}"
        )));
    }
    Ok(cycles)
}
