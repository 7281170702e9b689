use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::config::SessionSettings;
use crate::error::EnigmaError;
use crate::format::{GROUP_WIDTH, group_symbols};
use crate::machine::Machine;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("line {line}: {source}")]
    Enigma {
        line: usize,
        #[source]
        source: EnigmaError,
    },
    #[error("i/o failure: {0}")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for SessionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// What a single input line turned into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// A `*` line reconfigured the machine; nothing is written.
    Settings,
    Blank,
    /// Converted symbols, not yet grouped.
    Message(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub settings_lines: usize,
    pub messages: usize,
    pub symbols: usize,
}

/// Runs a stream of settings lines and messages through one machine.
///
/// Rotor positions carry over from one message line to the next until the
/// next settings line resets them.
pub struct EnigmaSession {
    machine: Machine,
    group_width: usize,
    configured: bool,
}

impl EnigmaSession {
    pub fn new(machine: Machine) -> Self {
        Self {
            machine,
            group_width: GROUP_WIDTH,
            configured: false,
        }
    }

    pub fn with_group_width(mut self, width: usize) -> Self {
        self.group_width = width;
        self
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn into_machine(self) -> Machine {
        self.machine
    }

    pub fn process_line(&mut self, line: &str) -> Result<LineOutcome, EnigmaError> {
        if SessionSettings::is_settings_line(line) {
            let settings = SessionSettings::parse(line, self.machine.num_rotors())?;
            settings.apply(&mut self.machine)?;
            self.configured = true;
            debug!(
                "session reconfigured: rotors={} positions={} plugboard={:?}",
                settings.rotors.join(" "),
                settings.positions,
                settings.plugboard
            );
            return Ok(LineOutcome::Settings);
        }
        if line.trim().is_empty() {
            return Ok(LineOutcome::Blank);
        }
        if !self.configured {
            return Err(EnigmaError::MissingSettings);
        }
        let message = normalize_message(line, &self.machine);
        self.machine.convert_message(&message).map(LineOutcome::Message)
    }

    /// Converts every line of `input` and writes the grouped result to
    /// `output`, flushing after each line.
    ///
    /// Stops at the first failing line. Lines written before it stay written;
    /// the failing line produces no output.
    pub fn process<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<SessionSummary, SessionError> {
        let mut summary = SessionSummary::default();
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let outcome = self
                .process_line(&line)
                .map_err(|source| SessionError::Enigma {
                    line: index + 1,
                    source,
                })?;
            match outcome {
                LineOutcome::Settings => summary.settings_lines += 1,
                LineOutcome::Blank => writeln!(output)?,
                LineOutcome::Message(converted) => {
                    summary.messages += 1;
                    summary.symbols += converted.chars().count();
                    writeln!(output, "{}", group_symbols(&converted, self.group_width))?;
                }
            }
            output.flush()?;
        }
        debug!(
            "session finished: settings_lines={} messages={} symbols={}",
            summary.settings_lines, summary.messages, summary.symbols
        );
        Ok(summary)
    }

    pub fn process_file(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<SessionSummary, SessionError> {
        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);
        self.process(reader, writer)
    }
}

/// Drops whitespace and upper-cases letters the alphabet only has in
/// upper case.
fn normalize_message(line: &str, machine: &Machine) -> String {
    let alphabet = machine.alphabet();
    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            if alphabet.contains(c) {
                return c;
            }
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) if alphabet.contains(u) => u,
                _ => c,
            }
        })
        .collect()
}
