//! The assembled machine: rotor slots, plugboard and the stepping rule.
//!
//! Each keystroke runs the same pipeline:
//!
//! ```text
//! plugboard -> step rotors -> rightmost .. reflector -> slot 1 .. rightmost -> plugboard
//! ```
//!
//! Stepping reads every notch before moving anything, which is what makes
//! the middle rotor advance on two consecutive keystrokes when it sits on
//! its own notch (the double-step anomaly).

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, trace};

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;
use crate::pool::RotorPool;
use crate::rotor::Rotor;

#[derive(Clone, Debug)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    slots: usize,
    pawls: usize,
    pool: RotorPool,
    rotors: Vec<Rotor>,
    plugboard: Option<Permutation>,
}

impl Machine {
    /// A machine with `slots` rotor slots, of which the rightmost `pawls`
    /// hold moving rotors. `pool` lists every rotor that may be inserted.
    pub fn new(
        alphabet: Arc<Alphabet>,
        slots: usize,
        pawls: usize,
        pool: &RotorPool,
    ) -> Result<Self, EnigmaError> {
        if slots < 2 {
            return Err(EnigmaError::InvalidSlotCount(slots));
        }
        if pawls >= slots {
            return Err(EnigmaError::InvalidPawlCount { pawls, slots });
        }
        if let Some(rotor) = pool.rotors().iter().find(|r| **r.alphabet() != *alphabet) {
            return Err(EnigmaError::AlphabetMismatch(rotor.name().to_string()));
        }
        debug!(
            "machine configured: alphabet={} slots={} pawls={} pool={}",
            alphabet,
            slots,
            pawls,
            pool.len()
        );
        Ok(Self {
            alphabet,
            slots,
            pawls,
            pool: pool.clone(),
            rotors: Vec::new(),
            plugboard: None,
        })
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    pub fn num_rotors(&self) -> usize {
        self.slots
    }

    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    pub fn pool(&self) -> &RotorPool {
        &self.pool
    }

    /// Inserted rotors, reflector first. Empty until `insert_rotors` succeeds.
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    pub fn plugboard(&self) -> Option<&Permutation> {
        self.plugboard.as_ref()
    }

    /// Fills the slots with fresh copies of the named pool rotors, all at
    /// setting 0. `names[0]` must name a reflector.
    ///
    /// Nothing changes unless every check passes.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EnigmaError> {
        let mut rotors = Vec::with_capacity(names.len());
        let mut seen = HashSet::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let rotor = self
                .pool
                .get(name)
                .ok_or_else(|| EnigmaError::UnknownRotor(name.to_string()))?;
            if !seen.insert(name) {
                return Err(EnigmaError::DuplicateRotor(name.to_string()));
            }
            let mut rotor = rotor.clone();
            rotor.set(0);
            rotors.push(rotor);
        }
        match rotors.first() {
            Some(first) if !first.reflecting() => {
                return Err(EnigmaError::ReflectorMisplaced {
                    slot: 0,
                    name: first.name().to_string(),
                });
            }
            _ => {}
        }
        if rotors.len() != self.slots {
            return Err(EnigmaError::WrongRotorCount {
                expected: self.slots,
                found: rotors.len(),
            });
        }
        if let Some((slot, rotor)) = rotors.iter().enumerate().skip(1).find(|(_, r)| r.reflecting())
        {
            return Err(EnigmaError::ReflectorMisplaced {
                slot,
                name: rotor.name().to_string(),
            });
        }
        let moving = rotors.iter().filter(|r| r.rotates()).count();
        if moving != self.pawls {
            return Err(EnigmaError::WrongMovingRotorCount {
                expected: self.pawls,
                found: moving,
            });
        }
        let first_moving = self.slots - self.pawls;
        if let Some((slot, rotor)) = rotors
            .iter()
            .enumerate()
            .skip(first_moving)
            .find(|(_, r)| !r.rotates())
        {
            return Err(EnigmaError::MovingRotorMisplaced {
                slot,
                name: rotor.name().to_string(),
            });
        }
        debug!(
            "inserted rotors: {}",
            rotors.iter().map(Rotor::name).collect::<Vec<_>>().join(" ")
        );
        self.rotors = rotors;
        Ok(())
    }

    /// Sets the non-reflector rotors, left to right, from `positions`.
    pub fn set_rotors(&mut self, positions: &str) -> Result<(), EnigmaError> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::RotorsNotInserted);
        }
        let indices = positions
            .chars()
            .map(|symbol| self.alphabet.to_int(symbol))
            .collect::<Result<Vec<_>, _>>();
        let found = positions.chars().count();
        if found != self.slots - 1 {
            return Err(EnigmaError::WrongSettingLength {
                expected: self.slots - 1,
                found,
            });
        }
        for (rotor, index) in self.rotors[1..].iter_mut().zip(indices?) {
            rotor.set(index);
        }
        debug!("rotor settings: {}", self.settings());
        Ok(())
    }

    /// Replaces the plugboard. Only involutions (pairwise swaps) are wired.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<(), EnigmaError> {
        if **plugboard.alphabet() != *self.alphabet {
            return Err(EnigmaError::AlphabetMismatch("plugboard".into()));
        }
        if !plugboard.is_involution() {
            return Err(EnigmaError::PlugboardNotInvolution(plugboard.to_string()));
        }
        debug!("plugboard: {plugboard}");
        self.plugboard = Some(plugboard);
        Ok(())
    }

    pub fn clear_plugboard(&mut self) {
        self.plugboard = None;
    }

    /// Current position of every slot, reflector included.
    pub fn settings(&self) -> String {
        self.rotors.iter().map(Rotor::setting_symbol).collect()
    }

    /// Converts one symbol index, advancing the rotors first.
    pub fn convert(&mut self, c: usize) -> Result<usize, EnigmaError> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::RotorsNotInserted);
        }
        Ok(self.convert_inserted(c))
    }

    /// Converts a whole message. The message is checked against the
    /// alphabet before any rotor moves, so a rejected message leaves the
    /// machine untouched.
    pub fn convert_message(&mut self, msg: &str) -> Result<String, EnigmaError> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::RotorsNotInserted);
        }
        let indices = msg
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                self.alphabet
                    .to_int(symbol)
                    .map_err(|_| EnigmaError::UnsupportedSymbol { symbol, position })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let converted = indices
            .into_iter()
            .map(|index| {
                let out = self.convert_inserted(index);
                self.alphabet.symbol_at(out)
            })
            .collect();
        Ok(converted)
    }

    fn convert_inserted(&mut self, c: usize) -> usize {
        let mut signal = self.through_plugboard(c % self.alphabet.size());
        self.step();
        for rotor in self.rotors.iter().rev() {
            signal = rotor.convert_forward(signal);
        }
        for rotor in &self.rotors[1..] {
            signal = rotor.convert_backward(signal);
        }
        self.through_plugboard(signal)
    }

    fn through_plugboard(&self, c: usize) -> usize {
        match &self.plugboard {
            Some(plugboard) => plugboard.permute(c as isize),
            None => c,
        }
    }

    /// Advances the moving rotors for one keystroke.
    ///
    /// Notches are sampled for all moving rotors before any of them moves.
    /// The rightmost rotor always advances; a moving rotor at its notch
    /// advances together with its left neighbor when that neighbor is also
    /// moving. Each rotor advances at most once.
    fn step(&mut self) {
        if self.pawls == 0 {
            return;
        }
        let first_moving = self.slots - self.pawls;
        let moving = &mut self.rotors[first_moving..];
        let at_notch: Vec<bool> = moving.iter().map(Rotor::at_notch).collect();
        let mut advancing = vec![false; moving.len()];
        advancing[moving.len() - 1] = true;
        for slot in 1..moving.len() {
            if at_notch[slot] {
                advancing[slot] = true;
                advancing[slot - 1] = true;
            }
        }
        for (rotor, advance) in moving.iter_mut().zip(advancing) {
            if advance {
                rotor.advance();
            }
        }
        trace!("stepped to {}", self.settings());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotor::{RotorSpec, RotorTag};

    fn abcd_machine() -> Machine {
        let alphabet = Arc::new(Alphabet::range('A', 'D').unwrap());
        let specs = vec![
            RotorSpec::new("R1", RotorTag::Reflecting, "(AC) (BD)", ""),
            RotorSpec::new("R2", RotorTag::Moving, "(ABCD)", "C"),
            RotorSpec::new("R3", RotorTag::Moving, "(ABCD)", "C"),
            RotorSpec::new("R4", RotorTag::Moving, "(ABCD)", "C"),
            RotorSpec::new("F1", RotorTag::Fixed, "(AB)", ""),
            RotorSpec::new("R5", RotorTag::Reflecting, "(AD) (BC)", ""),
        ];
        let pool = RotorPool::from_specs(&alphabet, &specs).unwrap();
        Machine::new(alphabet, 4, 3, &pool).unwrap()
    }

    fn press(machine: &mut Machine, times: usize) {
        for _ in 0..times {
            machine.convert(0).unwrap();
        }
    }

    #[test]
    fn double_step_sequence() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("AAA").unwrap();
        assert_eq!(machine.settings(), "AAAA");
        let expected = [
            (4, "AABA"),
            (4, "ABDA"),
            (4, "ABAA"),
            (7, "ABCD"),
            (2, "ACDB"),
            (5, "ACAC"),
            (3, "ACBB"),
            (2, "ACCD"),
        ];
        for (presses, settings) in expected {
            press(&mut machine, presses);
            assert_eq!(machine.settings(), settings);
        }
    }

    #[test]
    fn middle_rotor_steps_twice_in_a_row() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("ABC").unwrap();
        press(&mut machine, 1);
        assert_eq!(machine.settings(), "AACD");
        press(&mut machine, 1);
        assert_eq!(machine.settings(), "ABDA");
    }

    #[test]
    fn leftmost_moving_rotor_notch_turns_nothing() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("CAA").unwrap();
        press(&mut machine, 1);
        assert_eq!(machine.settings(), "ACAB");
    }

    #[test]
    fn single_pawl_only_moves_rightmost() {
        let alphabet = Arc::new(Alphabet::range('A', 'D').unwrap());
        let specs = vec![
            RotorSpec::new("R1", RotorTag::Reflecting, "(AC) (BD)", ""),
            RotorSpec::new("F1", RotorTag::Fixed, "(AB)", ""),
            RotorSpec::new("M1", RotorTag::Moving, "(ABCD)", "ABCD"),
        ];
        let pool = RotorPool::from_specs(&alphabet, &specs).unwrap();
        let mut machine = Machine::new(alphabet, 3, 1, &pool).unwrap();
        machine.insert_rotors(&["R1", "F1", "M1"]).unwrap();
        machine.set_rotors("BA").unwrap();
        press(&mut machine, 5);
        assert_eq!(machine.settings(), "ABB");
    }

    #[test]
    fn zero_pawls_never_step() {
        let alphabet = Arc::new(Alphabet::range('A', 'D').unwrap());
        let specs = vec![
            RotorSpec::new("R1", RotorTag::Reflecting, "(AC) (BD)", ""),
            RotorSpec::new("F1", RotorTag::Fixed, "(ABCD)", ""),
        ];
        let pool = RotorPool::from_specs(&alphabet, &specs).unwrap();
        let mut machine = Machine::new(alphabet, 2, 0, &pool).unwrap();
        machine.insert_rotors(&["R1", "F1"]).unwrap();
        machine.set_rotors("C").unwrap();
        let first = machine.convert_message("AAAA").unwrap();
        assert_eq!(machine.settings(), "AC");
        // A static stack is a fixed substitution.
        assert!(first.chars().all(|c| c == first.chars().next().unwrap()));
    }

    #[test]
    fn conversion_is_reciprocal_from_same_start() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("DBC").unwrap();
        let plaintext = "ABCDDCBAABBCCDDA";
        let ciphertext = machine.convert_message(plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        machine.set_rotors("DBC").unwrap();
        assert_eq!(machine.convert_message(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn no_symbol_encodes_to_itself() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("AAA").unwrap();
        for _ in 0..64 {
            for c in 0..4 {
                assert_ne!(machine.convert(c).unwrap(), c);
            }
        }
    }

    #[test]
    fn insert_rotors_validation() {
        let mut machine = abcd_machine();
        assert_eq!(
            machine.insert_rotors(&["R1", "R2", "RX", "R4"]),
            Err(EnigmaError::UnknownRotor("RX".into()))
        );
        assert_eq!(
            machine.insert_rotors(&["R2", "R1", "R3", "R4"]),
            Err(EnigmaError::ReflectorMisplaced {
                slot: 0,
                name: "R2".into()
            })
        );
        assert_eq!(
            machine.insert_rotors(&["R1", "R3", "R4"]),
            Err(EnigmaError::WrongRotorCount {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            machine.insert_rotors(&["R1", "R5", "R3", "R4"]),
            Err(EnigmaError::ReflectorMisplaced {
                slot: 1,
                name: "R5".into()
            })
        );
        assert_eq!(
            machine.insert_rotors(&["R1", "F1", "R3", "R4"]),
            Err(EnigmaError::WrongMovingRotorCount {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            machine.insert_rotors(&["R1", "R2", "R2", "R4"]),
            Err(EnigmaError::DuplicateRotor("R2".into()))
        );
        let empty: [&str; 0] = [];
        assert_eq!(
            machine.insert_rotors(&empty),
            Err(EnigmaError::WrongRotorCount {
                expected: 4,
                found: 0
            })
        );
        assert!(machine.rotors().is_empty());
    }

    #[test]
    fn moving_rotors_must_be_rightmost() {
        let alphabet = Arc::new(Alphabet::range('A', 'D').unwrap());
        let specs = vec![
            RotorSpec::new("R1", RotorTag::Reflecting, "(AC) (BD)", ""),
            RotorSpec::new("F1", RotorTag::Fixed, "(AB)", ""),
            RotorSpec::new("M1", RotorTag::Moving, "(ABCD)", "C"),
        ];
        let pool = RotorPool::from_specs(&alphabet, &specs).unwrap();
        let mut machine = Machine::new(alphabet, 3, 1, &pool).unwrap();
        assert_eq!(
            machine.insert_rotors(&["R1", "M1", "F1"]),
            Err(EnigmaError::MovingRotorMisplaced {
                slot: 2,
                name: "F1".into()
            })
        );
    }

    #[test]
    fn set_rotors_validation() {
        let mut machine = abcd_machine();
        assert_eq!(machine.set_rotors("AAA"), Err(EnigmaError::RotorsNotInserted));
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        assert_eq!(
            machine.set_rotors("AAAA"),
            Err(EnigmaError::WrongSettingLength {
                expected: 3,
                found: 4
            })
        );
        machine.set_rotors("BCD").unwrap();
        assert_eq!(
            machine.set_rotors("AEA"),
            Err(EnigmaError::SymbolNotInAlphabet('E'))
        );
        assert_eq!(machine.settings(), "ABCD");
    }

    #[test]
    fn reinserting_resets_positions() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("BCD").unwrap();
        press(&mut machine, 3);
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        assert_eq!(machine.settings(), "AAAA");
        assert!(machine.pool().get("R2").unwrap().setting() == 0);
    }

    #[test]
    fn plugboard_must_be_involution() {
        let mut machine = abcd_machine();
        let alphabet = machine.alphabet().clone();
        let cycle = Permutation::new("(ABC)", alphabet.clone()).unwrap();
        assert!(matches!(
            machine.set_plugboard(cycle),
            Err(EnigmaError::PlugboardNotInvolution(_))
        ));
        let swap = Permutation::new("(AB)", alphabet).unwrap();
        machine.set_plugboard(swap).unwrap();
        assert!(machine.plugboard().is_some());
        machine.clear_plugboard();
        assert!(machine.plugboard().is_none());

        let other = Arc::new(Alphabet::range('A', 'E').unwrap());
        assert_eq!(
            machine.set_plugboard(Permutation::new("(AE)", other).unwrap()),
            Err(EnigmaError::AlphabetMismatch("plugboard".into()))
        );
    }

    #[test]
    fn rejected_message_leaves_rotors_untouched() {
        let mut machine = abcd_machine();
        machine.insert_rotors(&["R1", "R2", "R3", "R4"]).unwrap();
        machine.set_rotors("ABC").unwrap();
        assert_eq!(
            machine.convert_message("ABXA"),
            Err(EnigmaError::UnsupportedSymbol {
                symbol: 'X',
                position: 2
            })
        );
        assert_eq!(machine.settings(), "AABC");
    }

    #[test]
    fn convert_requires_rotors() {
        let mut machine = abcd_machine();
        assert_eq!(machine.convert(0), Err(EnigmaError::RotorsNotInserted));
        assert_eq!(
            machine.convert_message("A"),
            Err(EnigmaError::RotorsNotInserted)
        );
    }

    #[test]
    fn construction_limits() {
        let alphabet = Arc::new(Alphabet::range('A', 'D').unwrap());
        let pool = RotorPool::new();
        assert_eq!(
            Machine::new(alphabet.clone(), 1, 0, &pool).unwrap_err(),
            EnigmaError::InvalidSlotCount(1)
        );
        assert_eq!(
            Machine::new(alphabet.clone(), 3, 3, &pool).unwrap_err(),
            EnigmaError::InvalidPawlCount { pawls: 3, slots: 3 }
        );
        let other = Arc::new(Alphabet::range('A', 'Z').unwrap());
        let foreign = RotorPool::from_specs(
            &other,
            &[RotorSpec::new("B", RotorTag::Reflecting, "(AB)", "")],
        )
        .unwrap();
        assert_eq!(
            Machine::new(alphabet, 3, 1, &foreign).unwrap_err(),
            EnigmaError::AlphabetMismatch("B".into())
        );
    }
}
