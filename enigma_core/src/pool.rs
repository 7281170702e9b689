use std::collections::HashMap;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::rotor::{Rotor, RotorSpec};

/// Named rotors available to a machine.
///
/// The pool is an ordinary value owned by whoever loaded the configuration;
/// machines take it by reference and keep their own copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotorPool {
    rotors: Vec<Rotor>,
    by_name: HashMap<String, usize>,
}

impl RotorPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(alphabet: &Arc<Alphabet>, specs: &[RotorSpec]) -> Result<Self, EnigmaError> {
        let mut pool = Self::new();
        for spec in specs {
            pool.insert(spec.build(alphabet)?)?;
        }
        Ok(pool)
    }

    pub fn insert(&mut self, rotor: Rotor) -> Result<(), EnigmaError> {
        if self.by_name.contains_key(rotor.name()) {
            return Err(EnigmaError::DuplicateRotor(rotor.name().to_string()));
        }
        self.by_name.insert(rotor.name().to_string(), self.rotors.len());
        self.rotors.push(rotor);
        Ok(())
    }

    pub fn with_rotor(mut self, rotor: Rotor) -> Result<Self, EnigmaError> {
        self.insert(rotor)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Rotor> {
        self.by_name.get(name).map(|&index| &self.rotors[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Rotors in insertion order.
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rotors.iter().map(Rotor::name)
    }

    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    pub fn specs(&self) -> Vec<RotorSpec> {
        self.rotors.iter().map(Rotor::spec).collect()
    }
}
