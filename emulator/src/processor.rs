use common::asm::*;
use common::decoder::decode;
use common::misc::{IsEven, SignExtend};
use crate::address_space::{AddressSpace, Loc, Size};
use crate::error::{Advisory, Fault};
use crate::loader::Directive;
use crate::resolver::Intent;
use crate::status::Status;
use crate::trace::TraceSink;

use std::fmt;
use std::ops::{BitAnd, BitOr};

use delegate::delegate;
use derive_more::IsVariant;
use log::{debug, info, warn};


#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum State {
    Running,
    Halted,
    Waiting,
    // Devices were reset. Execution carries on.
    Reset,
    Faulted(Fault),
}

impl State {
    /// Whether a driver loop should stop stepping.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, State::Running | State::Reset)
    }
}


/// Snapshot of the register file and condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub regs: [u16; NUM_REGS],
    pub status: Status,
}

impl Registers {
    pub fn get(&self, reg: Reg) -> u16 {
        self.regs[reg.index()]
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for reg in Reg::ALL {
            writeln!(f, "{:>2}: {:06o}", reg.to_string().to_uppercase(), self.get(reg))?;
        }
        write!(f, "{}", self.status)
    }
}


pub struct Processor {
    space: AddressSpace,
    state: State,
    num_ins: u64,
    advisory: Option<Advisory>,
}

impl Processor {
    pub fn new() -> Processor {
        Self::from_space(AddressSpace::new())
    }

    pub fn with_trace(trace: impl TraceSink + 'static) -> Processor {
        Self::from_space(AddressSpace::with_trace(trace))
    }

    fn from_space(space: AddressSpace) -> Processor {
        Processor {
            space,
            state: State::Running,
            num_ins: 0,
            advisory: None,
        }
    }

    delegate! {
        to self.space {
            pub fn reg_read_word(&self, reg: Reg) -> u16;
            pub fn reg_write_word(&mut self, reg: Reg, val: u16);
            pub fn pc(&self) -> u16;
            pub fn status(&self) -> Status;
            pub fn set_status(&mut self, status: Status);
            pub fn peek_word(&self, addr: u16) -> u16;
            pub fn peek_byte(&self, addr: u16) -> u8;
            pub fn memory(&self) -> &[u8];
            pub fn set_trace_enabled(&mut self, enabled: bool);
            pub fn trace_enabled(&self) -> bool;
            pub fn flush_trace(&mut self);
            pub fn load_image(&mut self, directives: &[Directive]);
            pub fn load_bytes(&mut self, data: &[u8], start: u16);
        }
    }

    pub fn address_space_mut(&mut self) -> &mut AddressSpace {
        &mut self.space
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn num_ins(&self) -> u64 {
        self.num_ins
    }

    /// Non-fatal condition raised by the most recent step, if any.
    pub fn advisory(&self) -> Option<Advisory> {
        self.advisory
    }

    pub fn registers(&self) -> Registers {
        Registers {
            regs: Reg::ALL.map(|reg| self.space.reg_read_word(reg)),
            status: self.space.status(),
        }
    }

    // Run until something other than Running or Reset.
    pub fn run(&mut self) -> State {
        loop {
            let state = self.step();
            if state.is_terminal() {
                return state;
            }
        }
    }

    pub fn run_at(&mut self, pc: u16) -> State {
        self.space.set_pc(pc);
        self.run()
    }

    /// One fetch-decode-execute cycle.
    pub fn step(&mut self) -> State {
        self.num_ins += 1;
        self.advisory = None;

        let pc = self.space.pc();
        let word = self.space.fetch();
        let res = match decode(word) {
            Some(ins) => {
                debug!("PC: 0o{pc:o}: {ins}");
                self.exec(&ins)
            },
            None => Err(Fault::IllegalInstruction{word, pc}),
        };
        self.space.set_word_mode();

        let state = match res {
            Ok(state) => state,
            Err(fault) => {
                if let Fault::IllegalInstruction{..} = fault {
                    self.space.set_pc(pc);
                }
                State::Faulted(fault)
            },
        };

        let new_pc = self.space.pc();
        if !new_pc.is_even() {
            warn!("PC is unaligned: 0o{new_pc:o}");
            self.advisory = Some(Advisory::UnalignedProgramCounter{pc: new_pc});
        }

        self.state = state;
        state
    }


    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    fn update_flags(&mut self, f: impl FnOnce(&mut Status)) {
        let mut status = self.space.status();
        f(&mut status);
        self.space.set_status(status);
    }

    fn set_size(&mut self, byte: bool) -> Size {
        if byte {
            self.space.set_byte_mode();
        } else {
            self.space.set_word_mode();
        }
        self.space.size()
    }

    // Resolves and reads the source, then resolves the destination.
    fn fetch_operands(&mut self, src: Operand, dst: Operand, dst_intent: Intent) -> (u32, Loc) {
        let src = self.space.resolve(src, Intent::Read);
        let src_val = self.space.read(src) as u32;
        let dst = self.space.resolve(dst, dst_intent);
        (src_val, dst)
    }

    fn do_mov(&mut self, src: Operand, dst: Operand, size: Size) {
        let (val, dst) = self.fetch_operands(src, dst, Intent::Write);
        match dst {
            // Movb into a register fills the whole register.
            Loc::Reg(reg) if size == Size::Byte => {
                self.space.reg_write_word(reg, (val as u8).sign_extend());
            },
            _ => self.space.write(dst, val as u16),
        }
        self.update_flags(|s| {
            s.set_nz(val, size);
            s.set_overflow(false);
        });
    }

    fn do_bitwise(&mut self, src: Operand, op: fn(u32, u32) -> u32, dst: Operand, size: Size, discard: bool) {
        let intent = if discard { Intent::Read } else { Intent::Write };
        let (src_val, dst) = self.fetch_operands(src, dst, intent);
        let dst_val = self.space.read(dst) as u32;
        let res = op(src_val, dst_val) & size.mask();
        if !discard {
            self.space.write(dst, res as u16);
        }

        self.update_flags(|s| {
            s.set_nz(res, size);
            // Carry not affected
            s.set_overflow(false);
        });
    }

    fn do_add(&mut self, src: Operand, dst: Operand, size: Size) {
        let (src_val, dst) = self.fetch_operands(src, dst, Intent::Write);
        let src_sign = size.sign_bit(src_val);
        let dst_val = self.space.read(dst) as u32;
        let dst_sign = size.sign_bit(dst_val);
        let res = src_val + dst_val;
        let res_sign = size.sign_bit(res);
        self.space.write(dst, res as u16);

        self.update_flags(|s| {
            s.set_nz(res, size);
            s.set_carry(res >> size.bits() != 0);
            s.set_overflow(src_sign == dst_sign && dst_sign != res_sign);
        });
    }

    fn do_sub(&mut self, src: Operand, dst: Operand, size: Size) {
        let (src_val, dst) = self.fetch_operands(src, dst, Intent::Write);
        let src_sign = size.sign_bit(src_val);
        let dst_val = self.space.read(dst) as u32;
        let dst_sign = size.sign_bit(dst_val);
        let res = dst_val.wrapping_add((!src_val).wrapping_add(1) & size.mask()) & size.mask();
        let res_sign = size.sign_bit(res);
        self.space.write(dst, res as u16);

        self.update_flags(|s| {
            s.set_nz(res, size);
            s.set_carry(dst_val < src_val);
            s.set_overflow(src_sign != dst_sign && src_sign == res_sign);
        });
    }

    // NB: args are swapped compared to sub!
    fn do_cmp(&mut self, src: Operand, dst: Operand, size: Size) {
        let (src_val, dst) = self.fetch_operands(src, dst, Intent::Read);
        let src_sign = size.sign_bit(src_val);
        let dst_val = self.space.read(dst) as u32;
        let dst_sign = size.sign_bit(dst_val);
        let res = src_val.wrapping_add((!dst_val).wrapping_add(1) & size.mask()) & size.mask();
        let res_sign = size.sign_bit(res);

        self.update_flags(|s| {
            s.set_nz(res, size);
            s.set_carry(src_val < dst_val);
            s.set_overflow(src_sign != dst_sign && dst_sign == res_sign);
        });
    }

    fn exec_double_operand_ins(&mut self, ins: &DoubleOperandIns) {
        let size = self.set_size(ins.is_byte());
        let (src, dst) = (ins.src, ins.dst);

        use DoubleOperandOpcode::*;
        match ins.op {
            Mov | MovB => self.do_mov(src, dst, size),
            Cmp | CmpB => self.do_cmp(src, dst, size),
            Bis | BisB => self.do_bitwise(src, u32::bitor, dst, size, false),
            Bic | BicB => self.do_bitwise(src, not_and, dst, size, false),
            Bit | BitB => self.do_bitwise(src, u32::bitand, dst, size, true),
            Add => self.do_add(src, dst, size),
            Sub => self.do_sub(src, dst, size),
        }
    }

    fn exec_single_operand_ins(&mut self, ins: &SingleOperandIns) {
        use SingleOperandOpcode::*;

        if ins.op == Swab {
            self.space.set_word_mode();
            let dst = self.space.resolve(ins.dst, Intent::Write);
            let res = self.space.read(dst).swap_bytes();
            self.space.write(dst, res);
            self.update_flags(|s| {
                s.set_nz(res as u32, Size::Byte);
                s.set_carry(false);
                s.set_overflow(false);
            });
            return;
        }

        let size = self.set_size(ins.is_byte());
        let intent = match ins.op {
            Tst | TstB => Intent::Read,
            _ => Intent::Write,
        };
        let dst = self.space.resolve(ins.dst, intent);
        let carry = self.space.status().get_carry();

        let val = match ins.op {
            Clr | ClrB => 0,
            _ => self.space.read(dst) as u32,
        };

        // (result, new carry, new overflow); None leaves the flag alone.
        let (res, c, v): (u32, Option<bool>, Option<bool>) = match ins.op {
            Clr | ClrB => (0, Some(false), Some(false)),
            Com | ComB => (!val, Some(true), Some(false)),
            Inc | IncB => (val.wrapping_add(1), None, Some(val == size.largest_signed())),
            Dec | DecB => (val.wrapping_sub(1), None, Some(val == size.smallest_signed())),
            Neg | NegB => {
                let res = (!val).wrapping_add(1) & size.mask();
                (res, Some(res != 0), Some(val == size.smallest_signed()))
            },
            Adc | AdcB => (
                val.wrapping_add(carry as u32),
                Some(val == size.mask() && carry),
                Some(val == size.largest_signed() && carry),
            ),
            Sbc | SbcB => (
                val.wrapping_sub(carry as u32),
                Some(val == 0 && carry),
                Some(val == size.smallest_signed() && carry),
            ),
            Tst | TstB => (0u32.wrapping_sub(val), Some(false), Some(false)),
            Ror | RorB => ((val >> 1) | ((carry as u32) << (size.bits() - 1)), Some(val & 0x1 != 0), None),
            Rol | RolB => ((val << 1) | carry as u32, Some(size.sign_bit(val) != 0), None),
            Asr | AsrB => ((val >> 1) | (val & size.smallest_signed()), Some(val & 0x1 != 0), None),
            Asl | AslB => (val << 1, Some(size.sign_bit(val) != 0), None),
            Swab => unreachable!(),
        };
        let res = res & size.mask();

        if !matches!(ins.op, Tst | TstB) {
            self.space.write(dst, res as u16);
        }

        self.update_flags(|s| {
            s.set_nz(res, size);
            if let Some(c) = c {
                s.set_carry(c);
            }
            match v {
                Some(v) => s.set_overflow(v),
                // Shifts and rotates
                None if c.is_some() => s.set_overflow(s.get_negative() != s.get_carry()),
                None => {},
            }
        });
    }

    fn exec_branch_ins(&mut self, ins: &BranchIns) {
        let (z, n, c, v) = self.space.status().flags();
        let taken = match ins.op {
            BranchOpcode::Br => true,
            BranchOpcode::Bne => !z,
            BranchOpcode::Beq => z,
            BranchOpcode::Bmi => n,
            BranchOpcode::Bpl => !n,
            BranchOpcode::Bcs => c,
            BranchOpcode::Bcc => !c,
            BranchOpcode::Bvs => v,
            BranchOpcode::Bvc => !v,
            BranchOpcode::Blt => n != v,
            BranchOpcode::Bge => n == v,
            BranchOpcode::Ble => z || (n != v),
            BranchOpcode::Bgt => !(z || (n != v)),
            BranchOpcode::Bhi => !c && !z,
            BranchOpcode::Blos => c || z,
        };

        if taken {
            let target = ins.target(self.space.pc());
            self.space.set_pc(target);
        }
    }

    fn exec_jmp_ins(&mut self, ins: &JmpIns) {
        let new_pc = self.space.resolve(ins.dst, Intent::Read).addr();
        debug!("PC: 0o{:o}: JMP to 0o{new_pc:o}", self.space.pc());
        self.space.set_pc(new_pc);
    }

    fn exec_jsr_ins(&mut self, ins: &JsrIns) -> Result<(), Fault> {
        let new_pc = self.space.resolve(ins.dst, Intent::Read).addr();
        let old_val = self.space.reg_read_word(ins.reg);
        self.space.push_word(old_val)?;

        let ret = self.space.pc();
        self.space.reg_write_word(ins.reg, ret);
        self.space.set_pc(new_pc);
        Ok(())
    }

    fn exec_rts_ins(&mut self, ins: &RtsIns) {
        let new_pc = self.space.reg_read_word(ins.reg);
        self.space.set_pc(new_pc);

        let old_val = self.space.pop_word();
        self.space.reg_write_word(ins.reg, old_val);
    }

    fn exec_cc_ins(&mut self, ins: &CCIns) {
        self.update_flags(|s| {
            if ins.set {
                s.insert_flags(ins.flags);
            } else {
                s.clear_flags(ins.flags);
            }
        });
    }

    fn exec_misc_ins(&mut self, ins: &MiscIns) -> State {
        let state = match ins.op {
            MiscOpcode::Halt => State::Halted,
            MiscOpcode::Wait => State::Waiting,
            MiscOpcode::Reset => State::Reset,
        };
        info!("{} at 0o{:o}", ins.op, self.space.pc().wrapping_sub(2));
        state
    }

    fn exec(&mut self, ins: &Ins) -> Result<State, Fault> {
        match ins {
            Ins::DoubleOperand(ins) => self.exec_double_operand_ins(ins),
            Ins::Branch(ins) => self.exec_branch_ins(ins),
            Ins::Jmp(ins) => self.exec_jmp_ins(ins),
            Ins::Jsr(ins) => self.exec_jsr_ins(ins)?,
            Ins::Rts(ins) => self.exec_rts_ins(ins),
            Ins::SingleOperand(ins) => self.exec_single_operand_ins(ins),
            Ins::CC(ins) => self.exec_cc_ins(ins),
            Ins::Misc(ins) => return Ok(self.exec_misc_ins(ins)),
        }

        Ok(State::Running)
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

fn not_and(src: u32, dst: u32) -> u32 {
    !src & dst
}
