//! Error types shared by every layer of the machine.

use thiserror::Error;

/// Broad classification of an [`EnigmaError`].
///
/// Configuration errors are always raised before any symbol is converted;
/// conversion errors abort the message that triggered them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Conversion,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnigmaError {
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    #[error("invalid alphabet range '{start}'-'{end}'")]
    InvalidRange { start: char, end: char },

    #[error("duplicate symbol '{0}' in alphabet")]
    DuplicateSymbol(char),

    #[error("symbol {0:?} is reserved and cannot be part of an alphabet")]
    ReservedSymbol(char),

    #[error("symbol '{0}' is not in the alphabet")]
    SymbolNotInAlphabet(char),

    #[error("index {index} is out of range for an alphabet of {size} symbols")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("malformed cycle: {0}")]
    MalformedCycle(String),

    #[error("symbol '{0}' is mapped more than once")]
    DuplicateMapping(char),

    #[error("rotor '{0}' was built over a different alphabet")]
    AlphabetMismatch(String),

    #[error("only moving rotors carry notches (rotor '{0}')")]
    UnexpectedNotch(String),

    #[error("a machine needs at least two rotor slots, found {0}")]
    InvalidSlotCount(usize),

    #[error("pawl count {pawls} must be smaller than the slot count {slots}")]
    InvalidPawlCount { pawls: usize, slots: usize },

    #[error("unknown rotor '{0}'")]
    UnknownRotor(String),

    #[error("rotor '{0}' is named more than once")]
    DuplicateRotor(String),

    #[error("expected {expected} rotors, found {found}")]
    WrongRotorCount { expected: usize, found: usize },

    #[error("reflector misplaced: rotor '{name}' in slot {slot}")]
    ReflectorMisplaced { slot: usize, name: String },

    #[error("expected {expected} moving rotors, found {found}")]
    WrongMovingRotorCount { expected: usize, found: usize },

    #[error("slot {slot} holds '{name}', but the rightmost slots must hold moving rotors")]
    MovingRotorMisplaced { slot: usize, name: String },

    #[error("setting must have {expected} symbols, found {found}")]
    WrongSettingLength { expected: usize, found: usize },

    #[error("no rotors have been inserted")]
    RotorsNotInserted,

    #[error("plugboard must only swap pairs of symbols: {0}")]
    PlugboardNotInvolution(String),

    #[error("malformed settings line: {0}")]
    MalformedSettings(String),

    #[error("message input must start with a settings line")]
    MissingSettings,

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("message symbol '{symbol}' at position {position} is not in the alphabet")]
    UnsupportedSymbol { symbol: char, position: usize },
}

impl EnigmaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnigmaError::UnsupportedSymbol { .. } | EnigmaError::IndexOutOfRange { .. } => {
                ErrorKind::Conversion
            }
            _ => ErrorKind::Configuration,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        EnigmaError::Parse {
            line,
            message: message.into(),
        }
    }
}
