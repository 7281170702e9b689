//! Core types for a configurable rotor cipher machine in the style of the
//! Enigma: alphabets, cycle-notation permutations, rotors with notches, a
//! plugboard, and the double-stepping pawl mechanism.
//!
//! The machine is a historical toy. It provides no security.

pub mod alphabet;
pub mod config;
pub mod error;
pub mod format;
pub mod machine;
pub mod permutation;
pub mod pool;
pub mod presets;
pub mod rotor;
pub mod session;

pub use crate::alphabet::{Alphabet, AlphabetSpec};
pub use crate::config::{MachineConfig, SessionSettings};
pub use crate::error::{EnigmaError, ErrorKind};
pub use crate::format::{GROUP_WIDTH, group_symbols};
pub use crate::machine::Machine;
pub use crate::permutation::Permutation;
pub use crate::pool::RotorPool;
pub use crate::presets::{HISTORICAL, HISTORICAL_CONFIG, historical_config};
pub use crate::rotor::{Rotor, RotorKind, RotorSpec, RotorTag};
pub use crate::session::{EnigmaSession, LineOutcome, SessionError, SessionSummary};
