mod addressing;
pub mod alu;

use addressing::AddressMode;

use crate::context::CpuContext;
use crate::error::CoreError;
use crate::instruction::{Instruction, Mnemonic};

/// Condition codes consulted by `CMOV` and `BRH`.
fn condition_holds(ctx: &CpuContext, code: u8) -> bool {
    match code {
        0 => ctx.zero,
        1 => !ctx.zero,
        2 => ctx.carry,
        3 => !ctx.carry,
        other => panic!("condition code {other} is out of range"),
    }
}

/// A thin, borrow-based wrapper around a decoded instruction that knows
/// whether it is control-flow and how to apply its semantics. Construction
/// is side-effect-free and cheap enough that callers needn't cache it
/// across steps — this replaces the reflection-based per-mnemonic lookup
/// the source used with a single exhaustive match.
pub struct Executor<'a> {
    instruction: &'a Instruction,
}

impl<'a> Executor<'a> {
    pub fn new(instruction: &'a Instruction) -> Self {
        Self { instruction }
    }

    pub fn is_control_flow(&self) -> bool {
        self.instruction.is_control_flow()
    }

    /// Apply the instruction's semantics, then — if `advance_pc` is true
    /// and the instruction is not control-flow — advance PC by one.
    /// Control-flow instructions manage PC themselves.
    pub fn execute(&self, ctx: &mut CpuContext, advance_pc: bool) -> Result<(), CoreError> {
        self.apply(ctx)?;
        if advance_pc && !self.is_control_flow() {
            ctx.pc.increment()?;
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        match instr.mnemonic {
            Mnemonic::Add
            | Mnemonic::Adc
            | Mnemonic::Sub
            | Mnemonic::Subc
            | Mnemonic::And
            | Mnemonic::Or
            | Mnemonic::Xor
            | Mnemonic::Not
            | Mnemonic::Shft
            | Mnemonic::Shfc
            | Mnemonic::Shfe
            | Mnemonic::Sex
            | Mnemonic::Mov => self.exec_alu_register(ctx),

            Mnemonic::Adi => self.exec_adi(ctx),
            Mnemonic::Subi => self.exec_subi(ctx),
            Mnemonic::Ldi => self.exec_ldi(ctx),

            Mnemonic::Cmov => self.exec_cmov(ctx),

            Mnemonic::Mst => self.exec_store(ctx, AddressMode::Absolute),
            Mnemonic::Msp => self.exec_store(ctx, AddressMode::PointerOffset),
            Mnemonic::Mss => self.exec_store(ctx, AddressMode::StackOffset),
            Mnemonic::Msps => self.exec_store(ctx, AddressMode::StackPointerOffset),

            Mnemonic::Mld => self.exec_load(ctx, AddressMode::Absolute),
            Mnemonic::Mlp => self.exec_load(ctx, AddressMode::PointerOffset),
            Mnemonic::Mls => self.exec_load(ctx, AddressMode::StackOffset),
            Mnemonic::Mlps => self.exec_load(ctx, AddressMode::StackPointerOffset),

            Mnemonic::Psh => self.exec_psh(ctx),
            Mnemonic::Pshr => self.exec_pshr(ctx),
            Mnemonic::Pop => self.exec_pop(ctx),
            Mnemonic::Pshm => self.exec_pshm(ctx),

            Mnemonic::Jmp => self.exec_jmp(ctx),
            Mnemonic::Brh => self.exec_brh(ctx),
            Mnemonic::Cal => self.exec_cal(ctx),
            Mnemonic::Ret => self.exec_ret(ctx),
            Mnemonic::Hlt => self.exec_hlt(ctx),

            Mnemonic::Pst => self.exec_pst(ctx),
            Mnemonic::Dps => self.exec_dps(ctx),
            Mnemonic::Pld => self.exec_pld(ctx),

            Mnemonic::Nop => Ok(()),
        }
    }

    fn exec_alu_register(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let a = ctx.registers.read(instr.register(1));
        let b = ctx.registers.read(instr.register_or_zero(2));
        let result = alu::evaluate(instr.mnemonic, a, b, ctx.carry);
        ctx.registers.write(dst, result.value);
        ctx.set_zero_from(result.value);
        ctx.carry = result.carry;
        Ok(())
    }

    fn exec_adi(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let a = ctx.registers.read(instr.register(1));
        let imm = instr.number(2);
        let result = alu::add_immediate(a, imm);
        ctx.registers.write(dst, result.value);
        ctx.set_zero_from(result.value);
        ctx.carry = result.carry;
        Ok(())
    }

    fn exec_subi(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let a = ctx.registers.read(instr.register(1));
        let imm = instr.number(2);
        let result = alu::sub_immediate(a, imm);
        ctx.registers.write(dst, result.value);
        ctx.set_zero_from(result.value);
        ctx.carry = result.carry;
        Ok(())
    }

    fn exec_ldi(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let imm = instr.number(1);
        ctx.registers.write(dst, imm);
        ctx.set_zero_from(imm);
        Ok(())
    }

    fn exec_cmov(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let src = instr.register(1);
        let cond = instr.number(2);
        if condition_holds(ctx, cond) {
            let value = ctx.registers.read(src);
            ctx.registers.write(dst, value);
            ctx.set_zero_from(value);
        }
        Ok(())
    }

    fn exec_store(&self, ctx: &mut CpuContext, mode: AddressMode) -> Result<(), CoreError> {
        let instr = self.instruction;
        let reg = instr.register(0);
        let value = ctx.registers.read(reg);
        let addr = self.resolve_address(ctx, mode);
        ctx.ram.write(addr, value);
        Ok(())
    }

    fn exec_load(&self, ctx: &mut CpuContext, mode: AddressMode) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let addr = self.resolve_address(ctx, mode);
        let value = ctx.ram.read(addr);
        ctx.registers.write(dst, value);
        ctx.set_zero_from(value);
        Ok(())
    }

    fn resolve_address(&self, ctx: &CpuContext, mode: AddressMode) -> u8 {
        let instr = self.instruction;
        let sp = ctx.sp.value();
        match mode {
            AddressMode::Absolute => {
                let addr = instr.number(1);
                addressing::resolve(mode, addr, 0, 0, sp)
            }
            AddressMode::PointerOffset | AddressMode::StackPointerOffset => {
                let ptr = ctx.registers.read(instr.register(1));
                let offset = instr.signed_offset(2);
                addressing::resolve(mode, 0, offset, ptr, sp)
            }
            AddressMode::StackOffset => {
                let offset = instr.signed_offset(1);
                addressing::resolve(mode, 0, offset, 0, sp)
            }
        }
    }

    fn exec_psh(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let imm = self.instruction.number(0);
        let sp = ctx.sp.value();
        ctx.ram.write(sp, imm);
        ctx.sp.increment(1)
    }

    fn exec_pshr(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let reg = self.instruction.register(0);
        let value = ctx.registers.read(reg);
        let sp = ctx.sp.value();
        ctx.ram.write(sp, value);
        ctx.sp.increment(1)
    }

    fn exec_pop(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let n = self.instruction.number(0);
        ctx.sp.decrement(n)
    }

    fn exec_pshm(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let n = self.instruction.number(0);
        ctx.sp.increment(n)
    }

    fn exec_jmp(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let addr = self.instruction.address(0);
        ctx.pc.set_branch(addr)
    }

    fn exec_brh(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let cond = self.instruction.number(0);
        let addr = self.instruction.address(1);
        if condition_holds(ctx, cond) {
            ctx.pc.set_branch(addr)
        } else {
            ctx.pc.increment()
        }
    }

    fn exec_cal(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let addr = self.instruction.address(0);
        ctx.pc.push_call(addr)
    }

    fn exec_ret(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let n = self.instruction.number(0);
        ctx.sp.decrement(n)?;
        ctx.pc.pop_return()
    }

    fn exec_hlt(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        ctx.halted = true;
        Ok(())
    }

    fn exec_pst(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let value = ctx.registers.read(instr.register(0));
        let port = instr.number(1);
        ctx.ports.write(port, value)
    }

    fn exec_dps(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let value_a = ctx.registers.read(instr.register(0));
        let value_b = ctx.registers.read(instr.register(1));
        let port = instr.number(2);
        ctx.ports.write(port, value_a)?;
        ctx.ports.write(port.wrapping_add(1), value_b)
    }

    fn exec_pld(&self, ctx: &mut CpuContext) -> Result<(), CoreError> {
        let instr = self.instruction;
        let dst = instr.register(0);
        let port = instr.number(1);
        let value = ctx.ports.read(port)?;
        ctx.registers.write(dst, value);
        ctx.set_zero_from(value);
        Ok(())
    }
}
