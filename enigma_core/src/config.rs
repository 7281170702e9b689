//! Text configuration and per-message settings lines.
//!
//! A configuration looks like:
//!
//! ```text
//! A-Z
//! 5 3
//! I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! B R (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!     (RX) (SZ) (TV)
//! ```
//!
//! and a settings line like `* B BETA III IV I AXLE (YF) (HZ)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::pool::RotorPool;
use crate::rotor::{RotorSpec, RotorTag};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub alphabet: Alphabet,
    pub slots: usize,
    pub pawls: usize,
    pub rotors: Vec<RotorSpec>,
}

impl MachineConfig {
    /// Parses the text configuration format and validates the result.
    pub fn parse(text: &str) -> Result<Self, EnigmaError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line_no, alphabet_line) = lines
            .next()
            .ok_or_else(|| EnigmaError::parse(1, "configuration is empty"))?;
        let alphabet = parse_alphabet(alphabet_line)?;

        let (line_no, counts) = lines
            .next()
            .ok_or_else(|| EnigmaError::parse(line_no + 1, "missing slot and pawl counts"))?;
        let (slots, pawls) = parse_counts(line_no, counts)?;

        let mut rotors: Vec<RotorSpec> = Vec::new();
        for (line_no, line) in lines {
            if line.starts_with('(') {
                let last = rotors.last_mut().ok_or_else(|| {
                    EnigmaError::parse(line_no, "cycle continuation without a rotor")
                })?;
                last.wiring.push(' ');
                last.wiring.push_str(line);
                continue;
            }
            rotors.push(parse_rotor(line_no, line)?);
        }

        let config = Self {
            alphabet,
            slots,
            pawls,
            rotors,
        };
        config.build_machine()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn rotor_pool(&self) -> Result<RotorPool, EnigmaError> {
        RotorPool::from_specs(&Arc::new(self.alphabet.clone()), &self.rotors)
    }

    pub fn build_machine(&self) -> Result<Machine, EnigmaError> {
        let alphabet = Arc::new(self.alphabet.clone());
        let pool = RotorPool::from_specs(&alphabet, &self.rotors)?;
        Machine::new(alphabet, self.slots, self.pawls, &pool)
    }

    /// Renders the configuration back into the text format.
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n{} {}\n", self.alphabet, self.slots, self.pawls);
        for rotor in &self.rotors {
            out.push_str(&format!(
                "{} {}{} {}\n",
                rotor.name,
                rotor.kind.code(),
                rotor.notches,
                rotor.wiring
            ));
        }
        out
    }
}

/// `A-Z` style ranges, otherwise an explicit symbol list.
fn parse_alphabet(line: &str) -> Result<Alphabet, EnigmaError> {
    let symbols: Vec<char> = line.chars().collect();
    match symbols.as_slice() {
        [start, '-', end] => Alphabet::range(*start, *end),
        _ => Alphabet::from_symbols(symbols),
    }
}

fn parse_counts(line_no: usize, line: &str) -> Result<(usize, usize), EnigmaError> {
    let numbers = line
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| EnigmaError::parse(line_no, format!("expected two counts, found {line:?}")))?;
    match numbers.as_slice() {
        [slots, pawls] => Ok((*slots, *pawls)),
        _ => Err(EnigmaError::parse(
            line_no,
            format!("expected slot and pawl counts, found {line:?}"),
        )),
    }
}

fn parse_rotor(line_no: usize, line: &str) -> Result<RotorSpec, EnigmaError> {
    let mut tokens = line.split_whitespace();
    let name = tokens
        .next()
        .ok_or_else(|| EnigmaError::parse(line_no, "missing rotor name"))?;
    let descriptor = tokens
        .next()
        .ok_or_else(|| EnigmaError::parse(line_no, format!("rotor {name} has no type")))?;
    let mut descriptor_chars = descriptor.chars();
    let kind = descriptor_chars
        .next()
        .and_then(RotorTag::from_code)
        .ok_or_else(|| {
            EnigmaError::parse(line_no, format!("rotor {name} has unknown type {descriptor:?}"))
        })?;
    let notches: String = descriptor_chars.collect();
    if kind != RotorTag::Moving && !notches.is_empty() {
        return Err(EnigmaError::parse(
            line_no,
            format!("rotor {name}: only moving rotors have notches"),
        ));
    }
    let wiring = tokens.collect::<Vec<_>>().join(" ");
    if !wiring.is_empty() && !wiring.starts_with('(') {
        return Err(EnigmaError::parse(
            line_no,
            format!("rotor {name}: expected cycles, found {wiring:?}"),
        ));
    }
    Ok(RotorSpec::new(name, kind, wiring, notches))
}

/// One `*` line: rotor names (reflector first), positions, plugboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub rotors: Vec<String>,
    pub positions: String,
    pub plugboard: String,
}

impl SessionSettings {
    pub fn is_settings_line(line: &str) -> bool {
        line.trim_start().starts_with('*')
    }

    /// Parses a settings line for a machine with `slots` rotor slots.
    pub fn parse(line: &str, slots: usize) -> Result<Self, EnigmaError> {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some("*") {
            return Err(EnigmaError::MalformedSettings(format!(
                "expected '*' at the start of {line:?}"
            )));
        }
        let mut words = Vec::new();
        while let Some(token) = tokens.next_if(|token| !token.starts_with('(')) {
            words.push(token.to_string());
        }
        let plugboard = tokens.collect::<Vec<_>>().join(" ");
        let positions = match words.pop() {
            Some(positions) if !words.is_empty() => positions,
            _ => {
                return Err(EnigmaError::MalformedSettings(format!(
                    "expected rotor names and positions in {line:?}"
                )));
            }
        };
        if words.len() != slots {
            return Err(EnigmaError::WrongRotorCount {
                expected: slots,
                found: words.len(),
            });
        }
        Ok(Self {
            rotors: words,
            positions,
            plugboard,
        })
    }

    /// Inserts the rotors, sets their positions, then wires the plugboard.
    ///
    /// All three steps run on a copy; `machine` only changes if every one
    /// succeeds.
    pub fn apply(&self, machine: &mut Machine) -> Result<(), EnigmaError> {
        let plugboard = Permutation::new(&self.plugboard, Arc::clone(machine.alphabet()))?;
        let mut staged = machine.clone();
        staged.insert_rotors(self.rotors.as_slice())?;
        staged.set_rotors(&self.positions)?;
        staged.set_plugboard(plugboard)?;
        *machine = staged;
        Ok(())
    }
}
