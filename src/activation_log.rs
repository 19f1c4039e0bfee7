//! Per-tick activation trace.

use crate::neural::Network;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes one line per tick with the activation of every neuron.
///
/// A log created without a path swallows every record.
pub struct ActivationLog {
    writer: Option<Box<dyn Write>>,
    lines: u64,
}

impl ActivationLog {
    /// Log that records nothing
    pub fn disabled() -> Self {
        Self { writer: None, lines: 0 }
    }

    /// Open `path` for writing; `None` or an empty path disables the log
    pub fn create<P: AsRef<Path>>(path: Option<P>) -> io::Result<Self> {
        match path {
            Some(p) if !p.as_ref().as_os_str().is_empty() => {
                let file = File::create(p)?;
                Ok(Self::from_writer(BufWriter::new(file)))
            }
            _ => Ok(Self::disabled()),
        }
    }

    pub fn from_writer<W: Write + 'static>(writer: W) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            lines: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Number of lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Append the current activations of `network`
    pub fn record(&mut self, network: &Network) -> io::Result<()> {
        if let Some(out) = self.writer.as_mut() {
            write_activations(network, out)?;
            self.lines += 1;
        }
        Ok(())
    }

    /// Flush buffered lines
    pub fn finish(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(out) => out.flush(),
            None => Ok(()),
        }
    }
}

/// Space-separated activations in neuron order, newline-terminated
pub fn write_activations<W: Write + ?Sized>(network: &Network, out: &mut W) -> io::Result<()> {
    let mut first = true;
    for neuron in network.neurons() {
        if first {
            write!(out, "{}", neuron.value())?;
            first = false;
        } else {
            write!(out, " {}", neuron.value())?;
        }
    }
    writeln!(out)
}
