//! Byte-order helpers.
//!
//! Everything here is a pure function over plain integers or floats. Host byte
//! order is known at compile time, so the "conversion" helpers collapse to
//! either the identity or a flip.

/// Whether the host stores multi-byte values least-significant byte first.
#[inline]
pub const fn is_little_endian_host() -> bool {
    cfg!(target_endian = "little")
}

/// Reverse the two bytes of a 16-bit value.
#[inline]
pub const fn flip_u16(value: u16) -> u16 {
    (value << 8) | (value >> 8)
}

/// Reverse the four bytes of a 32-bit value.
#[inline]
pub const fn flip_u32(value: u32) -> u32 {
    (value << 24) | ((value << 8) & 0x00ff_0000) | ((value >> 8) & 0x0000_ff00) | (value >> 24)
}

/// Reverse the four bytes of an IEEE-754 single, bit pattern preserved.
///
/// The swap is unconditional; callers decide whether the stored order
/// disagrees with the host.
#[inline]
pub fn flip_f32(value: f32) -> f32 {
    f32::from_bits(flip_u32(value.to_bits()))
}

#[inline]
pub const fn u16_from_big_endian(value: u16) -> u16 {
    if is_little_endian_host() {
        flip_u16(value)
    } else {
        value
    }
}

#[inline]
pub const fn u32_from_big_endian(value: u32) -> u32 {
    if is_little_endian_host() {
        flip_u32(value)
    } else {
        value
    }
}

#[inline]
pub const fn u32_from_little_endian(value: u32) -> u32 {
    if is_little_endian_host() {
        value
    } else {
        flip_u32(value)
    }
}

/// Interpret two bytes as an unsigned value in host order.
///
/// Header fields stored in a fixed order must be run through one of the
/// `*_from_*_endian` helpers afterwards.
#[inline]
pub fn bytes_to_u16(bytes: [u8; 2]) -> u16 {
    if is_little_endian_host() {
        (u16::from(bytes[1]) << 8) | u16::from(bytes[0])
    } else {
        (u16::from(bytes[0]) << 8) | u16::from(bytes[1])
    }
}

/// Interpret four bytes as an unsigned value in host order.
#[inline]
pub fn bytes_to_u32(bytes: [u8; 4]) -> u32 {
    if is_little_endian_host() {
        (u32::from(bytes[3]) << 24)
            | (u32::from(bytes[2]) << 16)
            | (u32::from(bytes[1]) << 8)
            | u32::from(bytes[0])
    } else {
        (u32::from(bytes[0]) << 24)
            | (u32::from(bytes[1]) << 16)
            | (u32::from(bytes[2]) << 8)
            | u32::from(bytes[3])
    }
}
