
use crate::asm::NUM_REGS;

pub const WORD_SIZE: u16 = 2; // Bytes

pub const DATA_START: u16 = 0o400;

// Pushes may not move the stack pointer below this.
pub const STACK_LIMIT: u16 = DATA_START;
pub const STACK_INIT: u16 = 0o160000;

// The register file is aliased into the top of the address space, one word per register.
pub const REG_START: u16 = 0o177700;
pub const REG_END: u16 = REG_START + (NUM_REGS as u16) * WORD_SIZE; // Exclusive
pub const PS_ADDR: u16 = 0o177776;

pub const MEM_END: u32 = 0o200000; // Exclusive, note type
