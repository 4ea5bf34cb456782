use std::time::Instant;

use crate::error::CoreError;
use crate::ports::Device;

/// Abstract millisecond clock, injected so tests can control elapsed time
/// instead of depending on wall-clock timing.
pub trait Clock {
    fn elapsed_millis(&self) -> u32;
}

/// Default clock measuring real elapsed time since construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Four read-only ports exposing the little-endian bytes of a 32-bit
/// millisecond counter. Stores are ignored.
pub struct Timer {
    clock: Box<dyn Clock>,
}

impl Timer {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Timer {
    fn load(&mut self, offset: u8) -> Result<u8, CoreError> {
        let bytes = self.clock.elapsed_millis().to_le_bytes();
        Ok(bytes[(offset & 0x03) as usize])
    }

    fn store(&mut self, _offset: u8, _value: u8) -> Result<(), CoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(u32);
    impl Clock for Fake {
        fn elapsed_millis(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn reads_little_endian_bytes_of_the_elapsed_counter() {
        let mut timer = Timer::with_clock(Box::new(Fake(0x1234_5678)));
        assert_eq!(timer.load(0).unwrap(), 0x78);
        assert_eq!(timer.load(1).unwrap(), 0x56);
        assert_eq!(timer.load(2).unwrap(), 0x34);
        assert_eq!(timer.load(3).unwrap(), 0x12);
    }

    #[test]
    fn store_is_ignored() {
        let mut timer = Timer::with_clock(Box::new(Fake(0)));
        assert!(timer.store(0, 99).is_ok());
    }
}
