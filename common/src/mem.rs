
use bytemuck::cast_slice;

pub fn as_byte_slice(input: &[u16]) -> &[u8] {
    cast_slice(input)
}

pub fn read_u16_le(bytes: &[u8], addr: u16) -> u16 {
    let lower = bytes[addr as usize] as u16;
    let upper = bytes[addr.wrapping_add(1) as usize] as u16;
    lower | (upper << u8::BITS)
}

pub fn write_u16_le(bytes: &mut [u8], addr: u16, val: u16) {
    bytes[addr as usize] = val as u8;
    bytes[addr.wrapping_add(1) as usize] = (val >> u8::BITS) as u8;
}
