use super::SystemContext;
use std::io::Write;

/// Sends program output to standard output.
pub struct StdioContext;

impl SystemContext for StdioContext {
    fn writeln(&mut self, text: &str) {
        // A closed stdout is not a runtime error of the script.
        let _ = writeln!(std::io::stdout().lock(), "{text}");
    }
}

/// Collects program output in memory.
#[derive(Debug, Default)]
pub struct BufferedContext {
    buffer: String,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_data(self) -> String {
        self.buffer
    }
}

impl SystemContext for BufferedContext {
    fn writeln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}
