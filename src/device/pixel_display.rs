use crate::error::{Axis, CoreError};
use crate::ports::Device;

pub const DISPLAY_WIDTH: u8 = 128;
pub const DISPLAY_HEIGHT: u8 = 128;

/// Abstract notification hook, injected so tests and renderers can observe
/// committed pixels without the core depending on a windowing toolkit.
pub trait PixelSink {
    fn pixel_committed(&mut self, x: u8, y: u8, rgb: (u8, u8, u8));
}

/// A sink that does nothing; the default when no renderer is attached.
pub struct NullSink;

impl PixelSink for NullSink {
    fn pixel_committed(&mut self, _x: u8, _y: u8, _rgb: (u8, u8, u8)) {}
}

#[derive(Clone, Copy)]
enum Coordinate {
    X,
    Y,
}

/// Five consecutive ports — R, G, B, X, Y — backing a 128x128 RGB grid.
///
/// Color ports are plain read/write latches. Writing a coordinate port
/// stores the low 7 bits of the byte; if the high bit is set, the pixel at
/// the current `(X, Y)` is committed using the current R, G, B and handed
/// to the injected sink.
pub struct PixelDisplay {
    r: u8,
    g: u8,
    b: u8,
    x: u8,
    y: u8,
    pixels: Vec<(u8, u8, u8)>,
    sink: Box<dyn PixelSink>,
}

impl PixelDisplay {
    pub fn new() -> Self {
        Self::with_sink(Box::new(NullSink))
    }

    pub fn with_sink(sink: Box<dyn PixelSink>) -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            x: 0,
            y: 0,
            pixels: vec![(0, 0, 0); DISPLAY_WIDTH as usize * DISPLAY_HEIGHT as usize],
            sink,
        }
    }

    pub fn get_pixel(&self, x: u8, y: u8) -> (u8, u8, u8) {
        self.pixels[Self::index(x, y)]
    }

    fn index(x: u8, y: u8) -> usize {
        y as usize * DISPLAY_WIDTH as usize + x as usize
    }

    fn write_coordinate(&mut self, axis: Coordinate, value: u8) -> Result<(), CoreError> {
        let low7 = value & 0x7F;
        match axis {
            Coordinate::X => self.x = low7,
            Coordinate::Y => self.y = low7,
        }
        if value & 0x80 != 0 {
            self.commit()?;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), CoreError> {
        if self.x >= DISPLAY_WIDTH {
            return Err(CoreError::PixelCoordinateOutOfRange { axis: Axis::X, value: self.x });
        }
        if self.y >= DISPLAY_HEIGHT {
            return Err(CoreError::PixelCoordinateOutOfRange { axis: Axis::Y, value: self.y });
        }
        let rgb = (self.r, self.g, self.b);
        let idx = Self::index(self.x, self.y);
        self.pixels[idx] = rgb;
        self.sink.pixel_committed(self.x, self.y, rgb);
        Ok(())
    }
}

impl Default for PixelDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for PixelDisplay {
    fn load(&mut self, offset: u8) -> Result<u8, CoreError> {
        Ok(match offset {
            0 => self.r,
            1 => self.g,
            2 => self.b,
            3 => self.x,
            _ => self.y,
        })
    }

    fn store(&mut self, offset: u8, value: u8) -> Result<(), CoreError> {
        match offset {
            0 => self.r = value,
            1 => self.g = value,
            2 => self.b = value,
            3 => self.write_coordinate(Coordinate::X, value)?,
            _ => self.write_coordinate(Coordinate::Y, value)?,
        }
        Ok(())
    }
}
