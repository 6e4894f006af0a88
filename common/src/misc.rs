pub trait IsEven: Copy {
    #[allow(clippy::wrong_self_convention)]
    fn is_even(self) -> bool;
}

impl IsEven for u16 {
    fn is_even(self) -> bool {
        self & 0x1 != 1
    }
}

////////////////////////////////////////////////////////////////////////////////

pub trait SignExtend {
    fn sign_extend(self) -> u16;
}

impl SignExtend for u8 {
    fn sign_extend(self) -> u16 {
        self as i8 as i16 as u16
    }
}
