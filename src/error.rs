use std::fmt;

/// Axis identifier used by pixel-coordinate range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Fatal faults surfaced by the execution engine.
///
/// Every variant corresponds to a condition the spec calls out as fatal
/// (PC/SP bounds, call-stack misuse, unmapped-port access under the strict
/// policy, out-of-range pixel coordinates). None of these are recovered
/// internally; `Step`/`Run` propagate them to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    ProgramCounterOverflow { pc: u16 },
    BranchTargetOutOfRange { addr: u16 },
    FetchOutOfBounds { pc: u16, program_len: usize },
    CallStackUnderflow,
    StackPointerOverflow { sp: u8, delta: u8 },
    StackPointerUnderflow { sp: u8, delta: u8 },
    UnmappedPortLoad { port: u8 },
    UnmappedPortStore { port: u8 },
    PortAlreadyBound { port: u8 },
    PortOutOfRange { port: u16 },
    PixelCoordinateOutOfRange { axis: Axis, value: u8 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ProgramCounterOverflow { pc } => {
                write!(f, "program counter overflow: {pc} >= 1024")
            }
            CoreError::BranchTargetOutOfRange { addr } => {
                write!(f, "branch target out of range: {addr} >= 1024")
            }
            CoreError::FetchOutOfBounds { pc, program_len } => {
                write!(f, "fetch at {pc} is out of bounds for a {program_len}-instruction program")
            }
            CoreError::CallStackUnderflow => write!(f, "return with an empty call stack"),
            CoreError::StackPointerOverflow { sp, delta } => {
                write!(f, "stack pointer overflow: {sp} + {delta} > 255")
            }
            CoreError::StackPointerUnderflow { sp, delta } => {
                write!(f, "stack pointer underflow: {sp} - {delta} < 0")
            }
            CoreError::UnmappedPortLoad { port } => {
                write!(f, "load from unmapped port {port}")
            }
            CoreError::UnmappedPortStore { port } => {
                write!(f, "store to unmapped port {port}")
            }
            CoreError::PortAlreadyBound { port } => {
                write!(f, "port {port} is already bound to a device")
            }
            CoreError::PortOutOfRange { port } => {
                write!(f, "port {port} is outside the 0..256 address space")
            }
            CoreError::PixelCoordinateOutOfRange { axis, value } => {
                let name = match axis {
                    Axis::X => "X",
                    Axis::Y => "Y",
                };
                write!(f, "pixel coordinate {name}={value} is out of range")
            }
        }
    }
}

impl std::error::Error for CoreError {}
