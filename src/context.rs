use crate::ports::{PortBus, PortPolicy};
use crate::program_counter::ProgramCounter;
use crate::ram::Ram;
use crate::registers::Registers;
use crate::stack_pointer::StackPointer;

/// The full mutable state of the CPU: registers, RAM, PC/call stack, SP,
/// flags, and the port bus. Exclusively owned and mutated by the executor;
/// the pipeline and program memory live outside it.
pub struct CpuContext {
    pub registers: Registers,
    pub ram: Ram,
    pub pc: ProgramCounter,
    pub sp: StackPointer,
    pub ports: PortBus,
    pub zero: bool,
    pub carry: bool,
    pub halted: bool,
}

impl CpuContext {
    pub fn new(port_policy: PortPolicy) -> Self {
        Self {
            registers: Registers::new(),
            ram: Ram::new(),
            pc: ProgramCounter::new(),
            sp: StackPointer::new(),
            ports: PortBus::new(port_policy),
            zero: false,
            carry: false,
            halted: false,
        }
    }

    pub fn set_zero_from(&mut self, result: u8) {
        self.zero = result == 0;
    }
}
