use crate::error::CoreError;
use crate::ports::Device;

/// Abstract source of random bytes, injected so tests can supply a
/// deterministic sequence instead of the system RNG.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

/// Default source backed by the thread-local RNG.
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn next_byte(&mut self) -> u8 {
        rand::random()
    }
}

/// A single read-only port yielding a uniformly random byte per load.
/// Stores are ignored.
pub struct Rng {
    source: Box<dyn RandomSource>,
}

impl Rng {
    pub fn new() -> Self {
        Self::with_source(Box::new(ThreadRandomSource))
    }

    pub fn with_source(source: Box<dyn RandomSource>) -> Self {
        Self { source }
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Rng {
    fn load(&mut self, _offset: u8) -> Result<u8, CoreError> {
        Ok(self.source.next_byte())
    }

    fn store(&mut self, _offset: u8, _value: u8) -> Result<(), CoreError> {
        Ok(())
    }
}
