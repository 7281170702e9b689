use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;

/// Behavior of a rotor within the stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotorKind {
    /// Driven by a pawl; turns its left neighbor when at one of `notches`.
    Moving { notches: BTreeSet<usize> },
    Fixed,
    Reflecting,
}

impl RotorKind {
    pub fn tag(&self) -> RotorTag {
        match self {
            RotorKind::Moving { .. } => RotorTag::Moving,
            RotorKind::Fixed => RotorTag::Fixed,
            RotorKind::Reflecting => RotorTag::Reflecting,
        }
    }
}

/// Variant tag as it appears in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotorTag {
    Moving,
    Fixed,
    Reflecting,
}

impl RotorTag {
    /// Single-letter code used by the text configuration format.
    pub fn code(self) -> char {
        match self {
            RotorTag::Moving => 'M',
            RotorTag::Fixed => 'N',
            RotorTag::Reflecting => 'R',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'M' => Some(RotorTag::Moving),
            'N' => Some(RotorTag::Fixed),
            'R' => Some(RotorTag::Reflecting),
            _ => None,
        }
    }
}

/// Declarative description of a rotor, independent of any alphabet instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotorSpec {
    pub name: String,
    pub kind: RotorTag,
    pub wiring: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notches: String,
}

impl RotorSpec {
    pub fn new(
        name: impl Into<String>,
        kind: RotorTag,
        wiring: impl Into<String>,
        notches: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            wiring: wiring.into(),
            notches: notches.into(),
        }
    }

    pub fn build(&self, alphabet: &Arc<Alphabet>) -> Result<Rotor, EnigmaError> {
        let wiring = Permutation::new(&self.wiring, Arc::clone(alphabet))?;
        match self.kind {
            RotorTag::Moving => Rotor::moving(&self.name, wiring, &self.notches),
            _ if !self.notches.is_empty() => Err(EnigmaError::UnexpectedNotch(self.name.clone())),
            RotorTag::Fixed => Ok(Rotor::fixed(&self.name, wiring)),
            RotorTag::Reflecting => Ok(Rotor::reflector(&self.name, wiring)),
        }
    }
}

/// A wired rotor and its current rotational offset.
///
/// Only `setting` ever changes after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rotor {
    name: String,
    kind: RotorKind,
    wiring: Permutation,
    setting: usize,
}

impl Rotor {
    pub fn moving(name: &str, wiring: Permutation, notches: &str) -> Result<Self, EnigmaError> {
        let notches = notches
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|symbol| wiring.alphabet().to_int(symbol))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self::with_kind(name, wiring, RotorKind::Moving { notches }))
    }

    pub fn fixed(name: &str, wiring: Permutation) -> Self {
        Self::with_kind(name, wiring, RotorKind::Fixed)
    }

    pub fn reflector(name: &str, wiring: Permutation) -> Self {
        if !wiring.derangement() {
            warn!("reflector {name} maps at least one contact to itself");
        }
        Self::with_kind(name, wiring, RotorKind::Reflecting)
    }

    fn with_kind(name: &str, wiring: Permutation, kind: RotorKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            wiring,
            setting: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    pub fn wiring(&self) -> &Permutation {
        &self.wiring
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.wiring.alphabet()
    }

    pub fn size(&self) -> usize {
        self.wiring.size()
    }

    /// True iff a pawl can advance this rotor.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflecting)
    }

    pub fn setting(&self) -> usize {
        self.setting
    }

    pub fn setting_symbol(&self) -> char {
        self.alphabet().symbol_at(self.setting)
    }

    pub fn set(&mut self, posn: usize) {
        self.setting = posn % self.size();
    }

    pub fn set_symbol(&mut self, posn: char) -> Result<(), EnigmaError> {
        self.setting = self.alphabet().to_int(posn)?;
        Ok(())
    }

    /// Maps contact `p` through the wiring, offset by the current setting.
    pub fn convert_forward(&self, p: usize) -> usize {
        let setting = self.setting as isize;
        let contact = self.wiring.permute(p as isize + setting);
        self.wiring.wrap(contact as isize - setting)
    }

    pub fn convert_backward(&self, e: usize) -> usize {
        let setting = self.setting as isize;
        let contact = self.wiring.invert(e as isize + setting);
        self.wiring.wrap(contact as isize - setting)
    }

    /// True iff this rotor is positioned to turn its left neighbor.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.contains(&self.setting),
            _ => false,
        }
    }

    pub fn advance(&mut self) {
        if self.rotates() {
            self.setting = (self.setting + 1) % self.size();
        }
    }

    pub fn spec(&self) -> RotorSpec {
        let notches = match &self.kind {
            RotorKind::Moving { notches } => notches
                .iter()
                .map(|&index| self.alphabet().symbol_at(index))
                .collect(),
            _ => String::new(),
        };
        RotorSpec::new(
            self.name.clone(),
            self.kind.tag(),
            self.wiring.to_string(),
            notches,
        )
    }
}

impl fmt::Display for Rotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotor {}", self.name)
    }
}
