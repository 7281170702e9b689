use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EnigmaError;

/// Ordered, duplicate-free set of symbols indexed `0..size()`.
///
/// Both realizations keep the symbols in a vector so `to_char` is a plain
/// index; `to_int` is arithmetic for a range and a hash lookup for a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AlphabetSpec", into = "AlphabetSpec")]
pub struct Alphabet {
    symbols: Vec<char>,
    lookup: Lookup,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Lookup {
    Range { start: u32 },
    Listed(HashMap<char, usize>),
}

/// Serialized form of an [`Alphabet`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetSpec {
    Range { start: char, end: char },
    Symbols(String),
}

impl Alphabet {
    /// Contiguous range `start..=end`.
    pub fn range(start: char, end: char) -> Result<Self, EnigmaError> {
        if start > end {
            return Err(EnigmaError::InvalidRange { start, end });
        }
        let mut symbols = Vec::with_capacity((end as u32 - start as u32 + 1) as usize);
        for code in start as u32..=end as u32 {
            // Ranges spanning the surrogate block are not contiguous chars.
            let symbol = char::from_u32(code).ok_or(EnigmaError::InvalidRange { start, end })?;
            check_reserved(symbol)?;
            symbols.push(symbol);
        }
        Ok(Self {
            symbols,
            lookup: Lookup::Range {
                start: start as u32,
            },
        })
    }

    /// Explicit symbol list in the given order.
    pub fn from_symbols<I>(symbols: I) -> Result<Self, EnigmaError>
    where
        I: IntoIterator<Item = char>,
    {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(EnigmaError::EmptyAlphabet);
        }
        let mut index = HashMap::with_capacity(symbols.len());
        for (position, &symbol) in symbols.iter().enumerate() {
            check_reserved(symbol)?;
            if index.insert(symbol, position).is_some() {
                return Err(EnigmaError::DuplicateSymbol(symbol));
            }
        }
        Ok(Self {
            symbols,
            lookup: Lookup::Listed(index),
        })
    }

    /// The 26 upper-case Latin letters.
    pub fn upper() -> Self {
        Self {
            symbols: ('A'..='Z').collect(),
            lookup: Lookup::Range { start: 'A' as u32 },
        }
    }

    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol).is_some()
    }

    pub fn to_int(&self, symbol: char) -> Result<usize, EnigmaError> {
        self.index_of(symbol)
            .ok_or(EnigmaError::SymbolNotInAlphabet(symbol))
    }

    pub fn to_char(&self, index: usize) -> Result<char, EnigmaError> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn is_range(&self) -> bool {
        matches!(self.lookup, Lookup::Range { .. })
    }

    /// Symbol at `index` wrapped into range; callers hold already-wrapped indices.
    pub(crate) fn symbol_at(&self, index: usize) -> char {
        self.symbols[index % self.symbols.len()]
    }

    fn index_of(&self, symbol: char) -> Option<usize> {
        match &self.lookup {
            Lookup::Range { start } => {
                let offset = (symbol as u32).checked_sub(*start)? as usize;
                (offset < self.symbols.len()).then_some(offset)
            }
            Lookup::Listed(index) => index.get(&symbol).copied(),
        }
    }
}

fn check_reserved(symbol: char) -> Result<(), EnigmaError> {
    if symbol.is_whitespace() || symbol == '(' || symbol == ')' || symbol == '*' {
        return Err(EnigmaError::ReservedSymbol(symbol));
    }
    Ok(())
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lookup {
            Lookup::Range { .. } => write!(
                f,
                "{}-{}",
                self.symbols[0],
                self.symbols[self.symbols.len() - 1]
            ),
            Lookup::Listed(_) => {
                for symbol in &self.symbols {
                    write!(f, "{symbol}")?;
                }
                Ok(())
            }
        }
    }
}

impl TryFrom<AlphabetSpec> for Alphabet {
    type Error = EnigmaError;

    fn try_from(spec: AlphabetSpec) -> Result<Self, Self::Error> {
        match spec {
            AlphabetSpec::Range { start, end } => Alphabet::range(start, end),
            AlphabetSpec::Symbols(text) => Alphabet::from_symbols(text.chars()),
        }
    }
}

impl From<Alphabet> for AlphabetSpec {
    fn from(alphabet: Alphabet) -> Self {
        match alphabet.lookup {
            Lookup::Range { .. } => AlphabetSpec::Range {
                start: alphabet.symbols[0],
                end: alphabet.symbols[alphabet.symbols.len() - 1],
            },
            Lookup::Listed(_) => AlphabetSpec::Symbols(alphabet.symbols.into_iter().collect()),
        }
    }
}
