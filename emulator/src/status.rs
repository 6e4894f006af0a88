use crate::address_space::Size;

use std::fmt;

/// Processor status word. Only the condition codes are modelled.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    pub const CARRY_SHIFT: u16 = 0;
    pub const OVERFLOW_SHIFT: u16 = 1;
    pub const ZERO_SHIFT: u16 = 2;
    pub const NEGATIVE_SHIFT: u16 = 3;

    pub const C: u16 = 0x1 << Self::CARRY_SHIFT;
    pub const V: u16 = 0x1 << Self::OVERFLOW_SHIFT;
    pub const Z: u16 = 0x1 << Self::ZERO_SHIFT;
    pub const N: u16 = 0x1 << Self::NEGATIVE_SHIFT;

    pub const FLAGS_MASK: u16 = 0xf;

    pub fn new() -> Status {
        Default::default()
    }

    pub fn from_raw(raw: u16) -> Self {
        Status(raw)
    }

    pub fn to_raw(&self) -> u16 {
        self.0
    }

    pub fn get_flags(&self) -> u16 {
        self.0 & Self::FLAGS_MASK
    }

    pub fn set_flags(&mut self, bits: u16) {
        debug_assert_eq!(bits & !Self::FLAGS_MASK, 0, "not a condition code: {bits:#o}");
        self.0 &= !Self::FLAGS_MASK;
        self.0 |= bits;
    }

    // Sets the given bits, leaving the others alone.
    pub fn insert_flags(&mut self, bits: u16) {
        debug_assert_eq!(bits & !Self::FLAGS_MASK, 0, "not a condition code: {bits:#o}");
        self.0 |= bits;
    }

    pub fn clear_flags(&mut self, bits: u16) {
        debug_assert_eq!(bits & !Self::FLAGS_MASK, 0, "not a condition code: {bits:#o}");
        self.0 &= !bits;
    }

    // (z, n, c, v), for the branch conditions.
    pub fn flags(&self) -> (bool, bool, bool, bool) {
        (self.get_zero(), self.get_negative(), self.get_carry(), self.get_overflow())
    }

    pub fn get_carry(&self) -> bool {
        (self.0 & Self::C) != 0
    }

    pub fn set_carry(&mut self, val: bool) {
        self.0 &= !(1u16 << Self::CARRY_SHIFT);
        self.0 |= (val as u16) << Self::CARRY_SHIFT;
    }

    pub fn get_overflow(&self) -> bool {
        (self.0 & Self::V) != 0
    }

    pub fn set_overflow(&mut self, val: bool) {
        self.0 &= !(1u16 << Self::OVERFLOW_SHIFT);
        self.0 |= (val as u16) << Self::OVERFLOW_SHIFT;
    }

    pub fn get_zero(&self) -> bool {
        (self.0 & Self::Z) != 0
    }

    pub fn set_zero(&mut self, val: bool) {
        self.0 &= !(1u16 << Self::ZERO_SHIFT);
        self.0 |= (val as u16) << Self::ZERO_SHIFT;
    }

    pub fn get_negative(&self) -> bool {
        (self.0 & Self::N) != 0
    }

    pub fn set_negative(&mut self, val: bool) {
        self.0 &= !(1u16 << Self::NEGATIVE_SHIFT);
        self.0 |= (val as u16) << Self::NEGATIVE_SHIFT;
    }

    /// N and Z from a result of the given width. Bits above the width are ignored.
    pub fn set_nz(&mut self, res: u32, size: Size) {
        self.set_zero(res & size.mask() == 0);
        self.set_negative(size.sign_bit(res) != 0);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "N: {} Z: {} V: {} C: {}",
            self.get_negative() as u8,
            self.get_zero() as u8,
            self.get_overflow() as u8,
            self.get_carry() as u8,
        )
    }
}
