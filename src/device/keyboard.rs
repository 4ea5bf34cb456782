use std::collections::{HashSet, VecDeque};

use crate::error::CoreError;
use crate::ports::Device;

/// Abstract OS key scanner, injected so the core never depends on a
/// platform-specific polling API. Returns the codes currently pressed.
pub trait KeyPoller {
    fn pressed_keys(&mut self) -> Vec<u8>;
}

/// A single port backed by a FIFO of unique key codes.
///
/// Each load polls the injected poller, enqueues any code not already seen
/// since the last clear, then dequeues the next code (or returns 0 if the
/// queue is empty). A store of 0 clears both the queue and the membership
/// set; any other store is ignored.
pub struct Keyboard {
    poller: Box<dyn KeyPoller>,
    queue: VecDeque<u8>,
    seen: HashSet<u8>,
}

impl Keyboard {
    pub fn new(poller: Box<dyn KeyPoller>) -> Self {
        Self { poller, queue: VecDeque::new(), seen: HashSet::new() }
    }
}

impl Device for Keyboard {
    fn load(&mut self, _offset: u8) -> Result<u8, CoreError> {
        for key in self.poller.pressed_keys() {
            if self.seen.insert(key) {
                self.queue.push_back(key);
            }
        }
        Ok(self.queue.pop_front().unwrap_or(0))
    }

    fn store(&mut self, _offset: u8, value: u8) -> Result<(), CoreError> {
        if value == 0 {
            self.queue.clear();
            self.seen.clear();
        }
        Ok(())
    }
}
