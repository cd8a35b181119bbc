//! Static opcode tables backing the instruction-length decoder.
//!
//! This module is data, not logic: [`crate::decoder`] is the only
//! consumer and owns every interpretation rule. Layout mirrors the
//! reference decoder's table set one-for-one: a one-byte legacy map,
//! a two-byte (`0F`) map, two three-byte escape maps (`0F 38`/`0F 3A`),
//! ModR/M.reg-indexed group sub-tables, and the prefix-byte classifier.

#![allow(missing_docs)]

pub mod flags;
pub mod groups;
pub mod one_byte;
pub mod prefix;
pub mod three_byte_38;
pub mod three_byte_3a;
pub mod two_byte;

pub use flags::{GroupId, OpcodeFlags, PrefixClass};
pub use groups::group;
pub use two_byte::Descriptor;

/// Flags for a single one-byte-map opcode.
pub fn one_byte(opcode: u8) -> OpcodeFlags {
    one_byte::ONE_BYTE[opcode as usize]
}

/// Descriptor for a single two-byte-map (`0F xx`) opcode.
pub fn two_byte(opcode: u8) -> Descriptor {
    two_byte::TWO_BYTE[opcode as usize]
}

/// Descriptor for a single `0F 38 xx` opcode.
pub fn three_byte_38(opcode: u8) -> Descriptor {
    three_byte_38::THREE_BYTE_38[opcode as usize]
}

/// Descriptor for a single `0F 3A xx` opcode.
pub fn three_byte_3a(opcode: u8) -> Descriptor {
    three_byte_3a::THREE_BYTE_3A[opcode as usize]
}

/// Prefix class contributed by a raw prefix byte, or empty if `byte`
/// is not a prefix.
pub fn prefix_class(byte: u8) -> PrefixClass {
    prefix::PREFIX[byte as usize]
}

/// Second-level accept-list applied to one-byte-map opcodes flagged
/// [`OpcodeFlags::SPECIAL`]: most are either genuinely exotic (ring-0,
/// BCD, far jumps) or this crate's two deliberate scan hints (an
/// unconditional jump's target is typically followed by padding or
/// unrelated data, so the scanner treats the next window cautiously).
///
/// Returns `true` if `opcode` is on the accept-list; an opcode that is
/// `SPECIAL` but not accepted makes the instruction unsupported.
pub fn one_byte_special_is_supported(opcode: u8) -> bool {
    matches!(
        opcode,
        0x06 | 0x07
            | 0x0e
            | 0x16
            | 0x17
            | 0x1e
            | 0x1f
            | 0x27
            | 0x2f
            | 0x37
            | 0x3f
            | 0xc4
            | 0xc5
            | 0xcf
            | 0xd4
            | 0xd5
            | 0x63
            | 0x00
            | 0x90
            | 0xff
            | 0xea
    )
}

/// Second-level accept-list for two-byte-map (`0F xx`) opcodes flagged
/// [`OpcodeFlags::SPECIAL`].
pub fn two_byte_special_is_supported(opcode: u8) -> bool {
    matches!(
        opcode,
        0x00 | 0x01
            | 0x02
            | 0x03
            | 0x06
            | 0x07
            | 0x08
            | 0x09
            | 0x20
            | 0x21
            | 0x22
            | 0x23
            | 0x24
            | 0x26
            | 0x30
            | 0x32
            | 0x35
            | 0xa0
            | 0xa1
            | 0xa8
            | 0xa9
            | 0xaa
            | 0xb2
            | 0xb4
            | 0xb5
    )
}


