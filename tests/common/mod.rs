use octet_core::prelude::*;

/// Build a `Program` from a plain instruction list — a thin wrapper so
/// scenario tests read as a flat sequence of addresses.
pub fn program(instructions: Vec<Instruction>) -> Program {
    Program::new(instructions)
}

/// Step a fresh pipeline against `program` and `ctx` until `Halted`,
/// bubbling up any fault instead of looping forever on a broken program.
pub fn run_to_halt(program: &Program, ctx: &mut CpuContext, max_steps: usize) {
    let mut pipeline = Pipeline::new();
    for _ in 0..max_steps {
        if ctx.halted {
            return;
        }
        pipeline.step(program, ctx).expect("program must not fault");
    }
    panic!("program did not halt within {max_steps} steps");
}

pub fn reg(index: u8) -> Operand {
    Operand::Register(index)
}

pub fn num(value: u8) -> Operand {
    Operand::Number(value)
}

pub fn addr(value: u16) -> Operand {
    Operand::Address(value)
}
