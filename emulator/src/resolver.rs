use common::asm::{AddrMode, Operand, Reg};
use common::constants::WORD_SIZE;

use crate::address_space::{AddressSpace, Loc};

use log::{trace, warn};

/// What the instruction is going to do with a resolved operand. Resolution
/// happens once per operand either way; this only shapes diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Read,
    Write,
}

impl AddressSpace {
    // The stack pointer always moves a whole word, as does the PC when it
    // steps over an immediate or absolute operand. Everything else, the
    // deferred modes included, moves by the operand size.
    fn step_for(&self, operand: Operand) -> u16 {
        use AddrMode::*;
        match (operand.mode, operand.reg) {
            (_, Reg::SP) => WORD_SIZE,
            (AutoInc | AutoIncDef, Reg::PC) => WORD_SIZE,
            _ => self.size().bytes(),
        }
    }

    // Returns the register's value from before the increment.
    fn post_increment(&mut self, reg: Reg, step: u16) -> u16 {
        let val = self.reg_read_word(reg);
        self.reg_write_word(reg, val.wrapping_add(step));
        val
    }

    // Returns the register's value from after the decrement.
    fn pre_decrement(&mut self, reg: Reg, step: u16) -> u16 {
        let val = self.reg_read_word(reg).wrapping_sub(step);
        self.reg_write_word(reg, val);
        val
    }

    // Index word following the instruction. The PC is past it afterwards, so
    // a PC-relative base comes out relative to the next instruction.
    fn fetch_offset(&mut self) -> u16 {
        let pc = self.post_increment(Reg::PC, WORD_SIZE);
        self.read_word(pc)
    }

    /// Computes the effective address of an operand, applying the mode's side
    /// effects on its register. Must be called exactly once per operand of an
    /// instruction.
    pub fn resolve(&mut self, operand: Operand, intent: Intent) -> Loc {
        let Operand{mode, reg} = operand;
        let step = self.step_for(operand);
        let pc = self.pc();

        let loc = match mode {
            AddrMode::Gen => Loc::Reg(reg),
            AddrMode::Def => Loc::from_addr(self.reg_read_word(reg)),
            AddrMode::AutoInc => {
                if reg == Reg::PC && intent == Intent::Write {
                    warn!("Write to immediate operand at 0o{:o}", self.pc());
                }
                Loc::from_addr(self.post_increment(reg, step))
            },
            AddrMode::AutoIncDef => {
                let ptr = self.post_increment(reg, step);
                Loc::from_addr(self.read_word(ptr))
            },
            AddrMode::AutoDec => Loc::from_addr(self.pre_decrement(reg, step)),
            AddrMode::AutoDecDef => {
                let ptr = self.pre_decrement(reg, step);
                Loc::from_addr(self.read_word(ptr))
            },
            AddrMode::Index => {
                let offset = self.fetch_offset();
                let base = self.reg_read_word(reg);
                Loc::from_addr(base.wrapping_add(offset))
            },
            AddrMode::IndexDef => {
                let offset = self.fetch_offset();
                let base = self.reg_read_word(reg);
                Loc::from_addr(self.read_word(base.wrapping_add(offset)))
            },
        };

        // Autodecrement on the PC moves it backwards, which this doesn't model.
        if reg != Reg::PC || operand.has_extra() {
            debug_assert_eq!(
                self.pc(),
                pc.wrapping_add(WORD_SIZE * operand.num_extra()),
                "{operand} consumed the wrong number of words",
            );
        }

        trace!("Resolve: {operand} ({intent:?}) -> 0o{:o}", loc.addr());
        loc
    }
}
