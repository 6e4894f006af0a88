
use crate::constants::{REG_START, REG_END, WORD_SIZE};

use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use derive_more::{IsVariant, Unwrap};


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum AddrMode {
    Gen = 0,
    Def, // Deferred (indirect)
    AutoInc,
    AutoIncDef,
    AutoDec,
    AutoDecDef,
    Index,
    IndexDef,
}

impl AddrMode {
    pub const NUM_BITS: usize = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;
}


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    SP,
    PC,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

pub const NUM_REGS: usize = 8;

impl Reg {
    pub const NUM_BITS: usize = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;

    pub const ALL: [Reg; NUM_REGS] = [
        Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5, Reg::SP, Reg::PC,
    ];

    // Takes the low 3 bits, so it can't fail.
    pub fn from_field(field: u16) -> Reg {
        Self::ALL[(field & Self::MASK) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Address the register is aliased to in the address space.
    pub fn addr(self) -> u16 {
        REG_START + (self as u16) * WORD_SIZE
    }

    /// Inverse of `addr()`. Only the even address of each register maps back.
    pub fn from_addr(addr: u16) -> Option<Reg> {
        if !(REG_START..REG_END).contains(&addr) || addr & 0x1 != 0 {
            return None;
        }
        Some(Self::from_field((addr - REG_START) / WORD_SIZE))
    }
}

/// A 6-bit operand specifier: addressing mode in the upper 3 bits, register in the lower 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub mode: AddrMode,
    pub reg: Reg,
}

impl Operand {
    pub const NUM_BITS: usize = AddrMode::NUM_BITS + Reg::NUM_BITS;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;

    pub fn new(mode: AddrMode, reg: Reg) -> Operand {
        Operand{mode, reg}
    }

    // Only the low 6 bits are looked at.
    pub fn decode(spec: u16) -> Operand {
        let reg = Reg::from_field(spec);
        let mode = AddrMode::from_u16((spec >> Reg::NUM_BITS) & AddrMode::MASK).unwrap();
        Operand{mode, reg}
    }

    pub fn encode(&self) -> u16 {
        self.reg.to_u16().unwrap() | (self.mode.to_u16().unwrap() << Reg::NUM_BITS)
    }

    // Whether resolving this operand consumes a word from the instruction stream.
    pub fn has_extra(&self) -> bool {
        use AddrMode::*;
        matches!{
            (self.mode, self.reg),
            (AutoInc | AutoIncDef, Reg::PC) | (Index | IndexDef, _)
        }
    }

    pub fn num_extra(&self) -> u16 {
        self.has_extra() as u16
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use AddrMode::*;
        match (self.mode, self.reg) {
            (AutoInc, Reg::PC) => write!(f, "#n"),
            (AutoIncDef, Reg::PC) => write!(f, "@#a"),
            (Index, Reg::PC) => write!(f, "a"),
            (IndexDef, Reg::PC) => write!(f, "@a"),

            (Gen, _) => write!(f, "{}", self.reg),
            (Def, _) => write!(f, "({})", self.reg),
            (AutoInc, _) => write!(f, "({})+", self.reg),
            (AutoIncDef, _) => write!(f, "@({})+", self.reg),
            (AutoDec, _) => write!(f, "-({})", self.reg),
            (AutoDecDef, _) => write!(f, "@-({})", self.reg),
            (Index, _) => write!(f, "x({})", self.reg),
            (IndexDef, _) => write!(f, "@x({})", self.reg),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////

// Also double operand byte instructions
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum DoubleOperandOpcode {
    Mov = 1,
    Cmp,
    Bit,
    Bic,
    Bis,
    Add,

    MovB = 9,
    CmpB,
    BitB,
    BicB,
    BisB,
    Sub,
}

impl fmt::Display for DoubleOperandOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleOperandIns {
    pub op: DoubleOperandOpcode,
    pub src: Operand,
    pub dst: Operand,
}

impl DoubleOperandIns {
    pub const LOWER_BITS: usize = 12;

    // Sub sits in the byte half of the opcode space, but is a word instruction.
    pub fn is_byte(&self) -> bool {
        use DoubleOperandOpcode::*;
        matches!(self.op, MovB | CmpB | BitB | BicB | BisB)
    }

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | (self.src.encode() << Operand::NUM_BITS)
            | self.dst.encode()
    }
}

impl fmt::Display for DoubleOperandIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}, {}", self.op, self.src, self.dst)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum BranchOpcode {
    Br = 1,
    Bne,
    Beq,
    Bge,
    Blt,
    Bgt,
    Ble,

    Bpl = 128,
    Bmi,
    Bhi,
    Blos,
    Bvc,
    Bvs,
    Bcc,
    Bcs
}

impl fmt::Display for BranchOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchIns {
    pub op: BranchOpcode,
    pub offset: u8,
}

impl BranchIns {
    pub const LOWER_BITS: usize = 8;
    pub const OFFSET_MASK: u16 = (1u16 << Self::LOWER_BITS) - 1;

    /// Signed displacement in bytes.
    pub fn displacement(&self) -> i16 {
        (self.offset as i8 as i16) * 2
    }

    /// Destination given the PC after the fetch.
    pub fn target(&self, pc: u16) -> u16 {
        pc.wrapping_add(self.displacement() as u16)
    }

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS) | (self.offset as u16)
    }
}

impl fmt::Display for BranchIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t. + {:#o}", self.op, 2i16.wrapping_add(self.displacement()) as u16)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JmpIns {
    pub dst: Operand,
}

impl JmpIns {
    pub const OPCODE: u16 = 0o0001;
    pub const LOWER_BITS: usize = 6;

    pub fn encode(&self) -> u16 {
        (Self::OPCODE << Self::LOWER_BITS) | self.dst.encode()
    }
}

impl fmt::Display for JmpIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "jmp\t{}", self.dst)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsrIns {
    pub reg: Reg,
    pub dst: Operand,
}

impl JsrIns {
    pub const OPCODE: u16 = 0o04;
    pub const LOWER_BITS: usize = 9;

    pub fn encode(&self) -> u16 {
        (Self::OPCODE << Self::LOWER_BITS)
            | (self.reg.to_u16().unwrap() << Operand::NUM_BITS)
            | self.dst.encode()
    }
}

impl fmt::Display for JsrIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "jsr\t{}, {}", self.reg, self.dst)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtsIns {
    pub reg: Reg,
}

impl RtsIns {
    pub const OPCODE: u16 = 0o00020;
    pub const LOWER_BITS: usize = 3;

    pub fn encode(&self) -> u16 {
        (Self::OPCODE << Self::LOWER_BITS) | self.reg.to_u16().unwrap()
    }
}

impl fmt::Display for RtsIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rts\t{}", self.reg)
    }
}

////////////////////////////////////////////////////////////////////////////////

// Also rotates, single operand byte instructions
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum SingleOperandOpcode {
    Swab = 3,

    Clr = 40,
    Com,
    Inc,
    Dec,
    Neg,
    Adc,
    Sbc,
    Tst,
    Ror,
    Rol,
    Asr,
    Asl,

    ClrB = 552,
    ComB,
    IncB,
    DecB,
    NegB,
    AdcB,
    SbcB,
    TstB,
    RorB,
    RolB,
    AsrB,
    AslB,
}

impl fmt::Display for SingleOperandOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleOperandIns {
    pub op: SingleOperandOpcode,
    pub dst: Operand,
}

impl SingleOperandIns {
    pub const LOWER_BITS: usize = 6;

    pub fn is_byte(&self) -> bool {
        (self.op as u32) >= (SingleOperandOpcode::ClrB as u32)
    }

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS) | self.dst.encode()
    }
}

impl fmt::Display for SingleOperandIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", self.op, self.dst)
    }
}

////////////////////////////////////////////////////////////////////////////////

// Condition code operators: 0o240 | flags clears, 0o260 | flags sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CCIns {
    pub set: bool,
    pub flags: u16,
}

impl CCIns {
    pub const BASE: u16 = 0o240;
    pub const SET_BIT: u16 = 0o20;
    pub const FLAGS_MASK: u16 = 0o17;

    pub fn encode(&self) -> u16 {
        let set = if self.set { Self::SET_BIT } else { 0 };
        Self::BASE | set | (self.flags & Self::FLAGS_MASK)
    }
}

impl fmt::Display for CCIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.set, self.flags) {
            (_, 0) => write!(f, "nop"),
            (false, 0o1) => write!(f, "clc"),
            (false, 0o2) => write!(f, "clv"),
            (false, 0o4) => write!(f, "clz"),
            (false, 0o10) => write!(f, "cln"),
            (false, 0o17) => write!(f, "ccc"),
            (true, 0o1) => write!(f, "sec"),
            (true, 0o2) => write!(f, "sev"),
            (true, 0o4) => write!(f, "sez"),
            (true, 0o10) => write!(f, "sen"),
            (true, 0o17) => write!(f, "scc"),
            _ => write!(f, ".word\t{:#o}", self.encode()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum MiscOpcode {
    Halt = 0,
    Wait = 1,
    Reset = 5,
}

impl fmt::Display for MiscOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiscIns {
    pub op: MiscOpcode,
}

impl MiscIns {
    pub fn encode(&self) -> u16 {
        self.op.to_u16().unwrap()
    }
}

impl fmt::Display for MiscIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.op)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, IsVariant, Unwrap)]
pub enum Ins {
    DoubleOperand(DoubleOperandIns),
    Branch(BranchIns),
    Jmp(JmpIns),
    Jsr(JsrIns),
    Rts(RtsIns),
    SingleOperand(SingleOperandIns),
    CC(CCIns),
    Misc(MiscIns),
}

impl Ins {
    pub fn encode(&self) -> u16 {
        match self {
            Ins::DoubleOperand(ins) => ins.encode(),
            Ins::Branch(ins) => ins.encode(),
            Ins::Jmp(ins) => ins.encode(),
            Ins::Jsr(ins) => ins.encode(),
            Ins::Rts(ins) => ins.encode(),
            Ins::SingleOperand(ins) => ins.encode(),
            Ins::CC(ins) => ins.encode(),
            Ins::Misc(ins) => ins.encode(),
        }
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ins::DoubleOperand(ins) => write!(f, "{ins}"),
            Ins::Branch(ins) => write!(f, "{ins}"),
            Ins::Jmp(ins) => write!(f, "{ins}"),
            Ins::Jsr(ins) => write!(f, "{ins}"),
            Ins::Rts(ins) => write!(f, "{ins}"),
            Ins::SingleOperand(ins) => write!(f, "{ins}"),
            Ins::CC(ins) => write!(f, "{ins}"),
            Ins::Misc(ins) => write!(f, "{ins}"),
        }
    }
}
