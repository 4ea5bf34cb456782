use std::io::{self, Write};

use crate::error::CoreError;
use crate::ports::Device;

/// Abstract byte sink, injected so tests can capture console output
/// instead of writing to the real terminal.
pub trait ConsoleSink {
    fn write_byte(&mut self, byte: u8);
}

/// Default sink: writes the byte to stdout as an ASCII character.
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_byte(&mut self, byte: u8) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(&[byte]);
        let _ = stdout.flush();
    }
}

/// A single write-only port; each store emits one ASCII byte to the
/// configured sink. Loads always return 0.
pub struct Console {
    sink: Box<dyn ConsoleSink>,
}

impl Console {
    pub fn new() -> Self {
        Self::with_sink(Box::new(StdoutSink))
    }

    pub fn with_sink(sink: Box<dyn ConsoleSink>) -> Self {
        Self { sink }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Console {
    fn load(&mut self, _offset: u8) -> Result<u8, CoreError> {
        Ok(0)
    }

    fn store(&mut self, _offset: u8, value: u8) -> Result<(), CoreError> {
        self.sink.write_byte(value);
        Ok(())
    }
}
