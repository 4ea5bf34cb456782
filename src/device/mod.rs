pub mod console;
pub mod divider;
pub mod keyboard;
pub mod multiplier;
pub mod pixel_display;
pub mod rng;
pub mod timer;

pub use console::{Console, ConsoleSink};
pub use divider::Divider;
pub use keyboard::{Keyboard, KeyPoller};
pub use multiplier::Multiplier;
pub use pixel_display::{PixelDisplay, PixelSink};
pub use rng::{RandomSource, Rng};
pub use timer::{Clock, Timer};

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::CoreError;
use crate::ports::PortBus;

/// Default hardware port map, per the fixed configuration the executor is
/// shipped against: ports 0-1 multiplier, 2-3 divider, 4 RNG, 5-8 timer,
/// 11-15 pixel display, 32 console, 33 keyboard.
///
/// The keyboard is only bound when a poller is supplied — it is the one
/// device the hosting configuration may omit entirely.
pub fn bind_default_hardware(
    ports: &mut PortBus,
    keyboard_poller: Option<Box<dyn KeyPoller>>,
) -> Result<(), CoreError> {
    let multiplier: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(Multiplier::new()));
    ports.try_bind(0, multiplier.clone(), 0)?;
    ports.try_bind(1, multiplier, 1)?;

    let divider: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(Divider::new()));
    ports.try_bind(2, divider.clone(), 0)?;
    ports.try_bind(3, divider, 1)?;

    let rng: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(Rng::new()));
    ports.try_bind(4, rng, 0)?;

    let timer: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(Timer::new()));
    for offset in 0..4 {
        ports.try_bind(5 + offset as u16, timer.clone(), offset)?;
    }

    let display: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(PixelDisplay::new()));
    for offset in 0..5 {
        ports.try_bind(11 + offset as u16, display.clone(), offset)?;
    }

    let console: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(Console::new()));
    ports.try_bind(32, console, 0)?;

    if let Some(poller) = keyboard_poller {
        let keyboard: Rc<RefCell<dyn crate::ports::Device>> = Rc::new(RefCell::new(Keyboard::new(poller)));
        ports.try_bind(33, keyboard, 0)?;
    }

    Ok(())
}
