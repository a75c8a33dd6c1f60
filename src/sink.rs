//! Output sinks for decoded tag reports

use log::{info, warn};
use std::io::Write;

/// Destination for formatted report lines
pub trait ReportSink {
    /// Accept one line of output, without trailing newline
    fn line(&mut self, line: &str);
}

/// Collects lines in memory
impl ReportSink for Vec<String> {
    fn line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

/// Forwards lines to the `log` facade at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn line(&mut self, line: &str) {
        info!("{}", line);
    }
}

/// Writes newline-terminated lines to any `io::Write`, e.g. stdout
pub struct WriteSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriteSink<W> {
    fn line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            warn!("Failed to write report line: {:?}", e);
        }
    }
}
