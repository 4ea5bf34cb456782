use std::cell::RefCell;
use std::rc::Rc;

use crate::error::CoreError;

/// The port-level device interface. Multi-port devices (the multiplier, the
/// divider, the timer, the pixel display) register several consecutive
/// slots against one shared `Rc<RefCell<_>>` instance and distinguish their
/// own ports via `offset`; there are no back-pointers from a device to the
/// bus that owns it.
pub trait Device {
    fn load(&mut self, offset: u8) -> Result<u8, CoreError>;
    fn store(&mut self, offset: u8, value: u8) -> Result<(), CoreError>;
}

/// Governs behavior when an instruction touches an unbound port.
///
/// The spec's default is strict (unmapped loads are fatal); a permissive
/// policy may relax this uniformly to "load returns 0, store is ignored".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortPolicy {
    #[default]
    Strict,
    Permissive,
}

struct Binding {
    device: Rc<RefCell<dyn Device>>,
    offset: u8,
}

/// 256 addressable I/O slots, each optionally bound to exactly one device.
/// Bindings are established during construction and are immutable
/// thereafter.
pub struct PortBus {
    slots: Vec<Option<Binding>>,
    policy: PortPolicy,
}

impl PortBus {
    pub fn new(policy: PortPolicy) -> Self {
        let mut slots = Vec::with_capacity(256);
        slots.resize_with(256, || None);
        Self { slots, policy }
    }

    /// Bind `port` to `device` at `offset`. Succeeds only if the slot was
    /// empty.
    pub fn try_bind(&mut self, port: u16, device: Rc<RefCell<dyn Device>>, offset: u8) -> Result<(), CoreError> {
        let slot = self.slot_mut(port)?;
        if slot.is_some() {
            return Err(CoreError::PortAlreadyBound { port: port as u8 });
        }
        *slot = Some(Binding { device, offset });
        Ok(())
    }

    pub fn read(&self, port: u8) -> Result<u8, CoreError> {
        match &self.slots[port as usize] {
            Some(binding) => binding.device.borrow_mut().load(binding.offset),
            None => match self.policy {
                PortPolicy::Strict => Err(CoreError::UnmappedPortLoad { port }),
                PortPolicy::Permissive => Ok(0),
            },
        }
    }

    pub fn write(&self, port: u8, value: u8) -> Result<(), CoreError> {
        match &self.slots[port as usize] {
            Some(binding) => binding.device.borrow_mut().store(binding.offset, value),
            None => match self.policy {
                PortPolicy::Strict => Err(CoreError::UnmappedPortStore { port }),
                PortPolicy::Permissive => Ok(()),
            },
        }
    }

    fn slot_mut(&mut self, port: u16) -> Result<&mut Option<Binding>, CoreError> {
        self.slots.get_mut(port as usize).ok_or(CoreError::PortOutOfRange { port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(u8);
    impl Device for Echo {
        fn load(&mut self, _offset: u8) -> Result<u8, CoreError> {
            Ok(self.0)
        }
        fn store(&mut self, _offset: u8, value: u8) -> Result<(), CoreError> {
            self.0 = value;
            Ok(())
        }
    }

    #[test]
    fn bind_then_round_trip() {
        let mut bus = PortBus::new(PortPolicy::Strict);
        let dev: Rc<RefCell<dyn Device>> = Rc::new(RefCell::new(Echo(0)));
        bus.try_bind(5, dev, 0).unwrap();
        bus.write(5, 9).unwrap();
        assert_eq!(bus.read(5).unwrap(), 9);
    }

    #[test]
    fn double_bind_is_rejected() {
        let mut bus = PortBus::new(PortPolicy::Strict);
        let dev: Rc<RefCell<dyn Device>> = Rc::new(RefCell::new(Echo(0)));
        bus.try_bind(5, dev.clone(), 0).unwrap();
        assert!(bus.try_bind(5, dev, 1).is_err());
    }

    #[test]
    fn strict_policy_faults_on_unmapped_load() {
        let bus = PortBus::new(PortPolicy::Strict);
        assert!(bus.read(1).is_err());
    }

    #[test]
    fn permissive_policy_returns_zero_and_ignores_store() {
        let bus = PortBus::new(PortPolicy::Permissive);
        assert_eq!(bus.read(1).unwrap(), 0);
        assert!(bus.write(1, 5).is_ok());
    }
}
