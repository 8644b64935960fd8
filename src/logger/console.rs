// Local console output for log lines and façade diagnostics

use crate::logger::level::ConsoleChannel;
use colored::*;
use std::io::{self, Write};
use std::sync::Mutex;

/// Destination for lines mirrored to the local console
pub trait Console: Send + Sync {
    /// Write a single line to the given channel. Must not fail.
    fn write(&self, channel: ConsoleChannel, line: &str);
}

/// Console writing to stdout/stderr, warnings and errors on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn write(&self, channel: ConsoleChannel, line: &str) {
        if channel.is_stderr() {
            write_line(&mut io::stderr().lock(), channel, line);
        } else {
            write_line(&mut io::stdout().lock(), channel, line);
        }
    }
}

/// Console writing every channel to one stream, e.g. a file or socket
#[derive(Debug)]
pub struct WriterConsole<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterConsole<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Console for WriterConsole<W> {
    fn write(&self, channel: ConsoleChannel, line: &str) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        write_line(&mut *writer, channel, line);
    }
}

/// Write one coloured line; a closed or full stream drops the line
fn write_line(out: &mut dyn Write, channel: ConsoleChannel, line: &str) {
    let styled = match channel {
        ConsoleChannel::Error => line.red(),
        ConsoleChannel::Warn => line.yellow(),
        ConsoleChannel::Debug => line.blue(),
        ConsoleChannel::Trace => line.dimmed(),
        ConsoleChannel::Info | ConsoleChannel::General => line.normal(),
    };

    if let Err(e) = writeln!(out, "{}", styled).and_then(|_| out.flush()) {
        tracing::debug!("Dropping console line: {}", e);
    }
}

/// Console that keeps every line in memory
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<(ConsoleChannel, String)>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all written lines
    pub fn lines(&self) -> Vec<(ConsoleChannel, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Lines written to one channel
    pub fn lines_on(&self, channel: ConsoleChannel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line)
            .collect()
    }

    /// Number of lines containing the given text
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|(_, line)| line.contains(needle))
            .count()
    }
}

impl Console for BufferConsole {
    fn write(&self, channel: ConsoleChannel, line: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((channel, line.to_string()));
    }
}
