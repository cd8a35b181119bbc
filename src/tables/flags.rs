//! Bit-packed descriptors used by the opcode tables.
//!
//! Each table entry carries a structural/meta flag bitset plus, for
//! two- and three-byte SSE-era opcodes, a bitset of prefix classes the
//! encoding requires. A group index (up to 20 distinct ModR/M.reg
//! sub-tables) is packed into the high byte of the flag word rather
//! than kept as a separate field, matching how the original decoder
//! keeps the group id inline with the other bits.

use bitflags::bitflags;

bitflags! {
    /// Structural and meta flags describing how to decode one opcode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpcodeFlags: u32 {
        /// Opcode is followed by a ModR/M byte.
        const HAS_MODRM   = 1 << 0;
        /// Byte is a legacy or REX prefix, not an opcode.
        const IS_PREFIX   = 1 << 1;
        /// Byte is a REX prefix (40..4F), meaningful only in 64-bit mode.
        const IS_REX      = 1 << 2;
        /// Opcode introduces the two-byte (0F) map.
        const IS_TWOBYTE  = 1 << 3;
        /// Two-byte opcode escapes further into the 0F 38 map.
        const ESC_3B_38   = 1 << 4;
        /// Two-byte opcode escapes further into the 0F 3A map.
        const ESC_3B_3A   = 1 << 5;

        /// Opcode carries an 8-bit immediate.
        const HAS_IMM8    = 1 << 6;
        /// Opcode carries a 16-bit immediate.
        const HAS_IMM16   = 1 << 7;
        /// Opcode carries a 32-bit immediate.
        const HAS_IMM32   = 1 << 8;
        /// Opcode carries a 64-bit immediate.
        const HAS_IMM64   = 1 << 9;

        /// Immediate size depends on the 0x66 operand-size override.
        const CHECK_66    = 1 << 10;
        /// Immediate size depends on the 0x67 address-size override.
        const CHECK_67    = 1 << 11;
        /// Immediate size depends on REX.W.
        const CHECK_REX   = 1 << 12;

        /// ModR/M addressing form carries an 8-bit displacement.
        const HAS_DISP8   = 1 << 13;
        /// ModR/M addressing form carries a 16-bit displacement.
        const HAS_DISP16  = 1 << 14;
        /// ModR/M addressing form carries a 32-bit displacement.
        const HAS_DISP32  = 1 << 15;

        /// Opcode is not defined in this decoder's instruction set.
        const UNDEFINED   = 1 << 16;
        /// Opcode is only valid in 32-bit (IA-32) mode.
        const IA32_ONLY   = 1 << 17;
        /// Opcode is a candidate for rewriting by the patcher.
        const NEEDS_PATCH = 1 << 18;
        /// Opcode requires a secondary accept-list check (see decoder §6).
        const SPECIAL     = 1 << 19;

        /// Reserved span for the packed `GroupId` (bits 24-31, see
        /// `with_group`/`group_index`). Not meaningful on its own;
        /// declared so `from_bits_truncate` doesn't strip those bits.
        const GROUP_BITS  = 0xff << 24;
    }
}

impl OpcodeFlags {
    const GROUP_SHIFT: u32 = 24;
    const GROUP_MASK: u32 = 0xff << Self::GROUP_SHIFT;

    /// Pack a group id (0 = no group) into the high bits of a flag word.
    pub const fn with_group(self, group: GroupId) -> Self {
        let bits = self.bits() | ((group as u32) << Self::GROUP_SHIFT);
        Self::from_bits_truncate(bits)
    }

    /// Extract the embedded group index, or `None` when this opcode has no group.
    pub const fn group_index(self) -> Option<u8> {
        let idx = ((self.bits() & Self::GROUP_MASK) >> Self::GROUP_SHIFT) as u8;
        if idx == 0 {
            None
        } else {
            Some(idx)
        }
    }

    /// All flags relating to operand/displacement size, used to assemble
    /// the final instruction length once addressing has been resolved.
    pub const fn operand_size_mask() -> Self {
        Self::from_bits_truncate(
            Self::HAS_IMM8.bits()
                | Self::HAS_IMM16.bits()
                | Self::HAS_IMM32.bits()
                | Self::HAS_IMM64.bits()
                | Self::HAS_DISP8.bits()
                | Self::HAS_DISP16.bits()
                | Self::HAS_DISP32.bits(),
        )
    }

    /// Everything that means "this opcode has more bytes to walk":
    /// ModR/M, an immediate or displacement of known size, or a size
    /// that still needs resolving against the prefix/mode (`CHECK_*`).
    /// An opcode with none of these is already fully decoded.
    pub const fn operands_mask() -> Self {
        Self::from_bits_truncate(
            Self::operand_size_mask().bits()
                | Self::HAS_MODRM.bits()
                | Self::CHECK_66.bits()
                | Self::CHECK_67.bits()
                | Self::CHECK_REX.bits(),
        )
    }
}

bitflags! {
    /// Prefix classes recognized while decoding, expressed as bits rather
    /// than raw prefix byte values so multiple physical bytes (e.g. any
    /// REX byte) can collapse onto the same class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PrefixClass: u16 {
        /// `F0` LOCK prefix.
        const LOCK    = 1 << 0;
        /// `F2` REPNE / mandatory SSE prefix.
        const F2      = 1 << 1;
        /// `F3` REP / mandatory SSE prefix.
        const F3      = 1 << 2;
        /// `2E/36/3E/26/64/65` segment override prefixes.
        const SEG     = 1 << 3;
        /// `66` operand-size override.
        const OPSIZE  = 1 << 4;
        /// `67` address-size override.
        const ADSIZE  = 1 << 5;
        /// Any REX prefix (40..4F).
        const REX     = 1 << 6;
        /// REX.W (48..4F), 64-bit mode only.
        const REX_W   = 1 << 7;
        /// Synthetic bit set when no SSE-relevant prefix was observed,
        /// added just before validating a two-/three-byte opcode's
        /// required prefix set.
        const NONE    = 1 << 8;
    }
}

impl PrefixClass {
    /// The subset of classes that matter for SSE mandatory-prefix validation.
    pub const SSE_ALL: Self = Self::from_bits_truncate(
        Self::NONE.bits() | Self::F3.bits() | Self::OPSIZE.bits() | Self::F2.bits(),
    );
}

/// Compact identifier for a ModR/M.reg-indexed group sub-table.
///
/// Numbered to match the Intel SDM's opcode-extension group numbers;
/// `Fisttp` is this decoder's own label for the FPU group that
/// contains the `DF/DB/DD /1` encodings eligible for patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GroupId {
    Group1 = 1,
    Group2 = 2,
    Group3A = 3,
    Group3B = 4,
    Group4 = 5,
    Group5 = 6,
    Group6 = 7,
    Group7 = 8,
    Group8 = 9,
    Group9 = 10,
    Group10 = 11,
    Group11 = 12,
    Group12 = 13,
    Group13 = 14,
    Group14 = 15,
    Group15 = 16,
    Group16 = 17,
    Group17A = 18,
    Group17B = 19,
    Fisttp = 20,
}

/// ModR/M.reg value that selects the FISTTP form within [`GroupId::Fisttp`].
pub const FISTTP_REG: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_round_trips_through_flag_word() {
        let f = OpcodeFlags::HAS_MODRM.with_group(GroupId::Group1);
        assert_eq!(f.group_index(), Some(GroupId::Group1 as u8));
        assert!(f.contains(OpcodeFlags::HAS_MODRM));
    }

    #[test]
    fn no_group_is_none() {
        let f = OpcodeFlags::HAS_MODRM;
        assert_eq!(f.group_index(), None);
    }

    #[test]
    fn sse_all_contains_none_and_mandatory_prefixes() {
        assert!(PrefixClass::SSE_ALL.contains(PrefixClass::NONE));
        assert!(PrefixClass::SSE_ALL.contains(PrefixClass::F2));
        assert!(PrefixClass::SSE_ALL.contains(PrefixClass::F3));
        assert!(!PrefixClass::SSE_ALL.contains(PrefixClass::LOCK));
    }
}
