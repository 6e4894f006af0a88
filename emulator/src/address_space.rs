use common::asm::Reg;
use common::constants::{PS_ADDR, REG_END, REG_START, STACK_INIT, STACK_LIMIT, WORD_SIZE, MEM_END};
use common::mem::{read_u16_le, write_u16_le};

use crate::error::Fault;
use crate::status::Status;
use crate::trace::{NullTrace, TraceEvent, TraceSink, Transaction};

use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Byte,
    Word,
}

impl Size {
    pub fn bytes(self) -> u16 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
        }
    }

    pub fn bits(self) -> u16 {
        self.bytes() * 8
    }

    pub fn mask(self) -> u32 {
        match self {
            Size::Byte => 0xff,
            Size::Word => 0xffff,
        }
    }

    pub fn smallest_signed(self) -> u32 {
        0x1 << (self.bits() - 1)
    }

    pub fn largest_signed(self) -> u32 {
        self.smallest_signed().wrapping_sub(1)
    }

    pub fn sign_bit(self, val: u32) -> u32 {
        match self {
            Size::Word => (val >> 15) & 0x1,
            Size::Byte => (val >> 7) & 0x1,
        }
    }
}

/// Register file and status word. Accesses here are never traced, and are
/// always word sized for the purposes of address arithmetic.
pub fn is_register_mapped(addr: u16) -> bool {
    (REG_START..REG_END).contains(&addr) || addr >= PS_ADDR
}

/// An effective address, tagged with whether it names a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    Reg(Reg),
    Mem(u16),
}

impl Loc {
    pub fn from_addr(addr: u16) -> Loc {
        match Reg::from_addr(addr) {
            Some(reg) => Loc::Reg(reg),
            None => Loc::Mem(addr),
        }
    }

    pub fn addr(self) -> u16 {
        match self {
            Loc::Reg(reg) => reg.addr(),
            Loc::Mem(addr) => addr,
        }
    }
}

/// The 64KB byte-addressed memory, with the registers and status word
/// aliased into its top.
pub struct AddressSpace {
    mem: Vec<u8>,
    byte_mode: bool,
    trace: Box<dyn TraceSink>,
    trace_enabled: bool,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::with_trace(NullTrace)
    }

    pub fn with_trace(trace: impl TraceSink + 'static) -> Self {
        let mut space = AddressSpace {
            mem: vec![0; MEM_END as usize],
            byte_mode: false,
            trace: Box::new(trace),
            trace_enabled: true,
        };
        space.reg_write_word(Reg::SP, STACK_INIT);
        space
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    pub fn flush_trace(&mut self) {
        self.trace.flush();
    }

    fn note(&mut self, kind: Transaction, addr: u16) {
        if self.trace_enabled && !is_register_mapped(addr) {
            self.trace.record(TraceEvent::new(kind, addr));
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Byte/word mode

    pub fn set_byte_mode(&mut self) {
        self.byte_mode = true;
    }

    pub fn set_word_mode(&mut self) {
        self.byte_mode = false;
    }

    pub fn size(&self) -> Size {
        if self.byte_mode { Size::Byte } else { Size::Word }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Raw, traced access

    pub fn read_byte(&mut self, addr: u16) -> u8 {
        self.note(Transaction::Read, addr);
        self.mem[addr as usize]
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        trace!("Mem: writing {val:#o} to 0o{addr:o} (byte)");
        self.note(Transaction::Write, addr);
        self.mem[addr as usize] = val;
    }

    pub fn read_word(&mut self, addr: u16) -> u16 {
        self.note(Transaction::Read, addr);
        read_u16_le(&self.mem, addr)
    }

    pub fn write_word(&mut self, addr: u16, val: u16) {
        trace!("Mem: writing {val:#o} to 0o{addr:o} (word)");
        self.note(Transaction::Write, addr);
        write_u16_le(&mut self.mem, addr, val);
    }

    ///////////////////////////////////////////////////////////////////////////
    // Untraced access, for loading and inspection

    pub fn peek_byte(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    pub fn peek_word(&self, addr: u16) -> u16 {
        read_u16_le(&self.mem, addr)
    }

    pub fn poke_byte(&mut self, addr: u16, val: u8) {
        self.mem[addr as usize] = val;
    }

    pub fn poke_word(&mut self, addr: u16, val: u16) {
        write_u16_le(&mut self.mem, addr, val);
    }

    pub fn memory(&self) -> &[u8] {
        &self.mem
    }

    pub fn load_bytes(&mut self, data: &[u8], start: u16) {
        assert!(start as usize + data.len() <= MEM_END as usize);
        let start = start as usize;
        self.mem[start..start + data.len()].copy_from_slice(data);
    }

    ///////////////////////////////////////////////////////////////////////////
    // Registers

    /// Address general register `n` is aliased to; 6 is the SP, 7 the PC.
    pub fn register_address(n: u16) -> u16 {
        Reg::from_field(n).addr()
    }

    pub fn reg_read_word(&self, reg: Reg) -> u16 {
        read_u16_le(&self.mem, reg.addr())
    }

    pub fn reg_write_word(&mut self, reg: Reg, val: u16) {
        trace!("Reg: writing {val:#o} to {reg:?} (word)");
        write_u16_le(&mut self.mem, reg.addr(), val);
    }

    pub fn reg_read_byte(&self, reg: Reg) -> u8 {
        self.reg_read_word(reg) as u8
    }

    // Replaces the low byte only.
    pub fn reg_write_byte(&mut self, reg: Reg, val: u8) {
        trace!("Reg: writing {val:#o} to {reg:?} (byte)");
        let mut old = self.reg_read_word(reg);
        old &= !0xff;
        old |= val as u16;
        write_u16_le(&mut self.mem, reg.addr(), old);
    }

    pub fn pc(&self) -> u16 {
        self.reg_read_word(Reg::PC)
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.reg_write_word(Reg::PC, pc);
    }

    pub fn advance_pc(&mut self) {
        let pc = self.pc().wrapping_add(WORD_SIZE);
        self.set_pc(pc);
    }

    pub fn status(&self) -> Status {
        Status::from_raw(read_u16_le(&self.mem, PS_ADDR))
    }

    pub fn set_status(&mut self, status: Status) {
        write_u16_le(&mut self.mem, PS_ADDR, status.to_raw());
    }

    /// Reads the word at the PC as an instruction fetch, then steps past it.
    pub fn fetch(&mut self) -> u16 {
        let pc = self.pc();
        self.note(Transaction::InstructionFetch, pc);
        let word = read_u16_le(&self.mem, pc);
        self.advance_pc();
        word
    }

    ///////////////////////////////////////////////////////////////////////////
    // Stack

    pub fn push_word(&mut self, val: u16) -> Result<(), Fault> {
        let sp = self.reg_read_word(Reg::SP);
        let new_sp = sp.wrapping_sub(WORD_SIZE);
        if sp < STACK_LIMIT + WORD_SIZE {
            return Err(Fault::StackOverflow{sp: new_sp});
        }
        self.reg_write_word(Reg::SP, new_sp);
        self.write_word(new_sp, val);
        Ok(())
    }

    pub fn pop_word(&mut self) -> u16 {
        let sp = self.reg_read_word(Reg::SP);
        let val = self.read_word(sp);
        self.reg_write_word(Reg::SP, sp.wrapping_add(WORD_SIZE));
        val
    }

    ///////////////////////////////////////////////////////////////////////////
    // Resolved operands, sized by the current mode

    pub fn read(&mut self, loc: Loc) -> u16 {
        match (loc, self.size()) {
            (Loc::Reg(reg), Size::Word) => self.reg_read_word(reg),
            (Loc::Reg(reg), Size::Byte) => self.reg_read_byte(reg) as u16,
            (Loc::Mem(addr), Size::Word) => self.read_word(addr),
            (Loc::Mem(addr), Size::Byte) => self.read_byte(addr) as u16,
        }
    }

    pub fn write(&mut self, loc: Loc, val: u16) {
        match (loc, self.size()) {
            (Loc::Reg(reg), Size::Word) => self.reg_write_word(reg, val),
            (Loc::Reg(reg), Size::Byte) => self.reg_write_byte(reg, val as u8),
            (Loc::Mem(addr), Size::Word) => self.write_word(addr, val),
            (Loc::Mem(addr), Size::Byte) => self.write_byte(addr, val as u8),
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}
