use crate::error::CoreError;
use crate::ports::Device;

/// Integer division of two stored operands, recomputed on every read.
///
/// | Offset | Access | Meaning |
/// | --- | --- | --- |
/// | 0 | R/W | divisor; reads the quotient |
/// | 1 | R/W | dividend; reads the remainder |
///
/// Division by zero yields quotient `0xFF` and remainder equal to the
/// dividend, rather than trapping.
pub struct Divider {
    divisor: u8,
    dividend: u8,
}

impl Divider {
    pub fn new() -> Self {
        Self { divisor: 0, dividend: 0 }
    }
}

impl Default for Divider {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Divider {
    fn load(&mut self, offset: u8) -> Result<u8, CoreError> {
        Ok(match offset {
            0 => {
                if self.divisor == 0 {
                    0xFF
                } else {
                    self.dividend / self.divisor
                }
            }
            _ => {
                if self.divisor == 0 {
                    self.dividend
                } else {
                    self.dividend % self.divisor
                }
            }
        })
    }

    fn store(&mut self, offset: u8, value: u8) -> Result<(), CoreError> {
        match offset {
            0 => self.divisor = value,
            _ => self.dividend = value,
        }
        Ok(())
    }
}
