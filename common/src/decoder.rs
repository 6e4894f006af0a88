
use num_traits::FromPrimitive;

use super::asm::*;

/// The six positional fields every instruction word splits into.
/// `f0`/`f1` are the destination register/mode, `f2`/`f3` the source
/// register/mode (or opcode extension), `f4` the 3-bit opcode and `f5` the
/// byte/word discriminator in bit 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub f0: u16,
    pub f1: u16,
    pub f2: u16,
    pub f3: u16,
    pub f4: u16,
    pub f5: u16,
}

impl Fields {
    pub fn split(word: u16) -> Fields {
        Fields {
            f0: word & 0o7,
            f1: (word >> 3) & 0o7,
            f2: (word >> 6) & 0o7,
            f3: (word >> 9) & 0o7,
            f4: (word >> 12) & 0o7,
            f5: (word >> 15) & 0o1,
        }
    }

    fn dst(&self) -> Operand {
        Operand::decode((self.f1 << Reg::NUM_BITS) | self.f0)
    }

    fn src(&self) -> Operand {
        Operand::decode((self.f3 << Reg::NUM_BITS) | self.f2)
    }

    fn branch(&self, op: u16) -> Option<Ins> {
        let op = BranchOpcode::from_u16(op)?;
        let offset = ((self.f2 & 0o3) << 6) | (self.f1 << 3) | self.f0;
        Some(Ins::Branch(BranchIns{op, offset: offset as u8}))
    }

    // Branch opcodes live in the high byte; the low bit of that byte is the
    // top bit of f2.
    fn branch_op(&self) -> u16 {
        (self.f5 << 7) | (self.f4 << 4) | (self.f3 << 1) | (self.f2 >> 2)
    }

    fn single(&self) -> Option<Ins> {
        let op = (self.f5 << 9) | (self.f4 << 6) | (self.f3 << 3) | self.f2;
        let op = SingleOperandOpcode::from_u16(op)?;
        Some(Ins::SingleOperand(SingleOperandIns{op, dst: self.dst()}))
    }

    fn double(&self) -> Option<Ins> {
        let op = DoubleOperandOpcode::from_u16((self.f5 << 3) | self.f4)?;
        Some(Ins::DoubleOperand(DoubleOperandIns{op, src: self.src(), dst: self.dst()}))
    }
}

/// Decode one instruction word. `None` means the bit pattern has no defined
/// operation.
pub fn decode(word: u16) -> Option<Ins> {
    let fields = Fields::split(word);
    let Fields{f0, f1, f2, f3, f4, f5} = fields;

    match (f5, f4, f3, f2, f1) {
        // Control group, 0o000000 - 0o000077
        (0, 0, 0, 0, 0) => MiscOpcode::from_u16(f0).map(|op| Ins::Misc(MiscIns{op})),
        (0, 0, 0, 0, _) => None,

        // A register can't be jumped to.
        (0, 0, 0, 1, 0) => None,
        (0, 0, 0, 1, _) => Some(Ins::Jmp(JmpIns{dst: fields.dst()})),

        (0, 0, 0, 2, 0) => Some(Ins::Rts(RtsIns{reg: Reg::from_field(f0)})),
        (0, 0, 0, 2, 4..=7) => Some(Ins::CC(CCIns{
            set: f1 >= 6,
            flags: ((f1 & 0o1) << 3) | f0,
        })),
        (0, 0, 0, 2, _) => None,

        (0, 0, 0, 3, _) => fields.single(),

        (0, 0, 0..=3, _, _) => fields.branch(fields.branch_op()),

        (0, 0, 4, _, 0) => None,
        (0, 0, 4, _, _) => Some(Ins::Jsr(JsrIns{reg: Reg::from_field(f2), dst: fields.dst()})),

        (_, 0, 5, _, _) | (_, 0, 6, 0..=3, _) => fields.single(),

        // Mark, sxt, eis, emt, trap and friends aren't implemented.
        (_, 0, 6..=7, _, _) => None,
        (1, 0, 4, _, _) => None,

        (1, 0, 0..=3, _, _) => fields.branch(fields.branch_op()),

        (_, 1..=6, _, _, _) => fields.double(),

        // Eis, xor, sob, and floating point.
        _ => None,
    }
}
