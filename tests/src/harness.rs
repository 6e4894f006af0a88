use common::asm::{AddrMode, Operand, Reg};
use common::constants::DATA_START;
use common::mem::as_byte_slice;
use emu_lib::{Processor, State};

pub const HALT: u16 = 0o000000;

pub fn reg(reg: Reg) -> Operand {
    Operand::new(AddrMode::Gen, reg)
}

pub fn imm() -> Operand {
    Operand::new(AddrMode::AutoInc, Reg::PC)
}

/// Fresh processor with `bin` at DATA_START and the PC pointing at it.
pub fn load(bin: &[u16]) -> Processor {
    let mut cpu = Processor::new();
    cpu.load_bytes(as_byte_slice(bin), DATA_START);
    cpu.reg_write_word(Reg::PC, DATA_START);
    cpu
}

/// Runs to completion, expecting a halt.
pub fn run_to_halt(cpu: &mut Processor) {
    let state = cpu.run();
    assert_eq!(state, State::Halted, "pc: 0o{:o}", cpu.pc());
}

// Address just past the image, where the PC ends up after a trailing halt.
pub fn end_of(bin: &[u16]) -> u16 {
    DATA_START + 2 * bin.len() as u16
}
