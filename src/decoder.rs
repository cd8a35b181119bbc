//! x86/x86-64 instruction-length decoder.
//!
//! Walks exactly as many bytes as are needed to know where the next
//! instruction starts: prefixes, opcode (one/two/three-byte), group
//! sub-table dispatch, ModR/M + SIB addressing, then immediate and
//! displacement sizes. It never decodes operands or semantics beyond
//! what length and the [`DecodeStatus`] flags require.

use bitflags::bitflags;

use crate::tables::{self, GroupId, OpcodeFlags as F, PrefixClass as P};
use crate::types::Mode;

bitflags! {
    /// Out-of-band signals the scanner acts on besides raw length.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecodeStatus: u8 {
        /// This instruction is a rewrite candidate for the patcher.
        const NEEDS_PATCH = 1 << 0;
        /// This instruction is a run of interior zero-padding, not real code.
        const PADDING = 1 << 1;
        /// What follows is likely unrelated to code (e.g. after an absolute jump).
        const REST = 1 << 2;
    }
}

/// Result of decoding one instruction at a given offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A well-formed, supported instruction of `length` bytes.
    Decoded { length: u8, status: DecodeStatus },
    /// The byte sequence does not form a recognized instruction.
    Invalid,
    /// The instruction is recognized but deliberately not handled
    /// (privileged, archaic, or otherwise out of scope for patching).
    Unsupported,
}

const GROUP_OF: [Option<GroupId>; 21] = {
    use GroupId::*;
    [
        None,
        Some(Group1),
        Some(Group2),
        Some(Group3A),
        Some(Group3B),
        Some(Group4),
        Some(Group5),
        Some(Group6),
        Some(Group7),
        Some(Group8),
        Some(Group9),
        Some(Group10),
        Some(Group11),
        Some(Group12),
        Some(Group13),
        Some(Group14),
        Some(Group15),
        Some(Group16),
        Some(Group17A),
        Some(Group17B),
        Some(Fisttp),
    ]
};

/// Decode the instruction starting at `insn[0]`.
///
/// `insn` should carry a trailing safety margin at least as large as
/// the longest possible x86 instruction (15 bytes) beyond the start of
/// the instruction being decoded; see the scanner's `REST_SIZE`-gated
/// use of this margin for why the margin itself is not re-validated
/// here.
pub fn decode_length(insn: &[u8], mode: Mode) -> DecodeOutcome {
    let mut cursor = 0usize;
    let mut flag = F::empty();
    let mut prefix = P::empty();

    // prefix run
    loop {
        flag.remove(F::IS_PREFIX | F::IS_REX);
        let Some(&opcode) = insn.get(cursor) else {
            return DecodeOutcome::Invalid;
        };
        cursor += 1;
        flag |= tables::one_byte(opcode);
        if mode == Mode::Is32 {
            flag.remove(F::IS_REX);
        }
        if flag.intersects(F::IS_PREFIX | F::IS_REX) {
            prefix |= tables::prefix_class(opcode);
        } else {
            break;
        }
    }

    let mut last_opcode_byte = insn[cursor - 1];
    let mut in_two_byte = false;
    let mut in_three_byte = false;

    if flag.contains(F::IS_TWOBYTE) {
        in_two_byte = true;
        let Some(&opcode) = insn.get(cursor) else {
            return DecodeOutcome::Invalid;
        };
        cursor += 1;
        last_opcode_byte = opcode;
        let mut info = tables::two_byte(opcode);
        flag |= info.flags;

        if flag.intersects(F::ESC_3B_38 | F::ESC_3B_3A) {
            in_three_byte = true;
            let Some(&opcode3) = insn.get(cursor) else {
                return DecodeOutcome::Invalid;
            };
            cursor += 1;
            info = if flag.contains(F::ESC_3B_38) {
                tables::three_byte_38(opcode3)
            } else {
                tables::three_byte_3a(opcode3)
            };
            flag |= info.flags;
        }

        if !prefix.intersects(P::F2 | P::F3 | P::OPSIZE) {
            prefix |= P::NONE;
        }
        if !info.prefixes.is_empty() && !info.prefixes.intersects(prefix) {
            flag |= F::UNDEFINED;
        }
    }

    if let Some(group_idx) = flag.group_index() {
        let Some(&modrm_byte) = insn.get(cursor) else {
            return DecodeOutcome::Invalid;
        };
        let reg = (modrm_byte & 0x38) >> 3;
        let id = GROUP_OF[group_idx as usize].expect("group index always in range");
        flag |= tables::group(id, reg);
    }

    if flag.contains(F::UNDEFINED) || (mode == Mode::Is64 && flag.contains(F::IA32_ONLY)) {
        return DecodeOutcome::Invalid;
    }

    let mut status = DecodeStatus::empty();

    if flag.contains(F::SPECIAL) {
        let supported = if in_three_byte {
            false
        } else if in_two_byte {
            tables::two_byte_special_is_supported(last_opcode_byte)
        } else {
            match last_opcode_byte {
                0x00 => {
                    if insn.get(cursor) == Some(&0x00) {
                        return DecodeOutcome::Decoded {
                            length: 1,
                            status: DecodeStatus::PADDING,
                        };
                    }
                    true
                }
                0x90 => {
                    if !prefix.contains(P::F3) {
                        return DecodeOutcome::Decoded {
                            length: 1,
                            status: DecodeStatus::PADDING,
                        };
                    }
                    true
                }
                0xff | 0xea => {
                    status |= DecodeStatus::REST;
                    true
                }
                other => tables::one_byte_special_is_supported(other),
            }
        };
        if !supported {
            return DecodeOutcome::Unsupported;
        }
    }

    if flag.contains(F::NEEDS_PATCH) {
        status |= DecodeStatus::NEEDS_PATCH;
    }

    if !flag.intersects(F::operands_mask()) {
        return finish(cursor, status);
    }

    if mode == Mode::Is64 && flag.contains(F::CHECK_REX) {
        if prefix.contains(P::REX_W) {
            flag |= F::HAS_IMM64;
        } else if prefix.contains(P::OPSIZE) {
            flag |= F::HAS_IMM16;
        } else {
            flag |= F::HAS_IMM32;
        }
    } else if flag.contains(F::CHECK_66) {
        if prefix.contains(P::OPSIZE) {
            flag |= F::HAS_IMM16;
        } else {
            flag |= F::HAS_IMM32;
        }
    } else if flag.contains(F::CHECK_67) {
        flag |= match (mode, prefix.contains(P::ADSIZE)) {
            (Mode::Is64, true) => F::HAS_IMM32,
            (Mode::Is64, false) => F::HAS_IMM64,
            (Mode::Is32, true) => F::HAS_IMM16,
            (Mode::Is32, false) => F::HAS_IMM32,
        };
    }

    if flag.contains(F::HAS_MODRM) {
        let Some(&modrm) = insn.get(cursor) else {
            return DecodeOutcome::Invalid;
        };
        cursor += 1;
        let m = modrm >> 6;
        let rm = modrm & 0x7;

        if mode == Mode::Is32 && prefix.contains(P::ADSIZE) {
            // 0x67 in 32-bit mode selects real 16-bit addressing, which
            // has no SIB byte and a different disp8/disp16 rm=6 special
            // case. In 64-bit mode 0x67 only narrows addresses to 32
            // bits and ModRM/SIB decoding is unchanged, so that case
            // falls through to the branch below.
            if m == 1 {
                flag |= F::HAS_DISP8;
            } else if m == 2 || (m == 0 && rm == 6) {
                flag |= F::HAS_DISP16;
            }
        } else {
            if m == 1 {
                flag |= F::HAS_DISP8;
            } else if m == 2 || (m == 0 && rm == 5) {
                flag |= F::HAS_DISP32;
            }
            if m < 3 && rm == 4 {
                let Some(&sib) = insn.get(cursor) else {
                    return DecodeOutcome::Invalid;
                };
                cursor += 1;
                if m == 0 && (sib & 0x7) == 5 {
                    flag |= F::HAS_DISP32;
                }
            }
        }
    }

    if flag.contains(F::HAS_IMM8) {
        cursor += 1;
    }
    if flag.contains(F::HAS_IMM16) {
        cursor += 2;
    }
    if flag.contains(F::HAS_IMM32) {
        cursor += 4;
    }
    if flag.contains(F::HAS_IMM64) {
        cursor += 8;
    }
    if flag.contains(F::HAS_DISP8) {
        cursor += 1;
    }
    if flag.contains(F::HAS_DISP16) {
        cursor += 2;
    }
    if flag.contains(F::HAS_DISP32) {
        cursor += 4;
    }

    finish(cursor, status)
}

fn finish(cursor: usize, status: DecodeStatus) -> DecodeOutcome {
    debug_assert!(cursor <= u8::MAX as usize);
    DecodeOutcome::Decoded {
        length: cursor as u8,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_byte_nop() {
        let insn = [0x90, 0x90, 0x90, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, status } => {
                assert_eq!(length, 1);
                assert!(status.contains(DecodeStatus::PADDING));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_cpuid_as_needs_patch() {
        let insn = [0x0f, 0xa2, 0x90, 0x90, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, status } => {
                assert_eq!(length, 2);
                assert!(status.contains(DecodeStatus::NEEDS_PATCH));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_mov_reg_imm32_with_rex_w_as_imm64() {
        // 48 b8 imm64: MOV RAX, imm64
        let insn = [0x48, 0xb8, 1, 2, 3, 4, 5, 6, 7, 8, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, .. } => assert_eq!(length, 10),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_modrm_with_sib_and_disp32() {
        // 89 04 25 + disp32: MOV [disp32], EAX  (mod=00, rm=100, sib base=101)
        let insn = [0x89, 0x04, 0x25, 1, 2, 3, 4, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, .. } => assert_eq!(length, 7),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_undefined_opcode() {
        let insn = [0x0f, 0x04, 0x90, 0x90];
        assert_eq!(decode_length(&insn, Mode::Is64), DecodeOutcome::Invalid);
    }

    #[test]
    fn flags_lddqu_as_needs_patch() {
        // F2 0F F0 /r
        let insn = [0xf2, 0x0f, 0xf0, 0x00, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, status } => {
                assert_eq!(length, 4);
                assert!(status.contains(DecodeStatus::NEEDS_PATCH));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn truncated_instruction_is_invalid_not_a_panic() {
        let insn = [0x0f];
        assert_eq!(decode_length(&insn, Mode::Is64), DecodeOutcome::Invalid);
    }

    #[test]
    fn address_size_override_in_64bit_mode_still_uses_sib_and_disp32() {
        // 67 48 8B 04 25 11 22 33 44: ADSIZE + REX.W + MOV r64,[disp32]
        // via a SIB byte (mod=00, rm=100, sib base=101). 0x67 in 64-bit
        // mode narrows addressing to 32 bits; it doesn't switch to the
        // legacy 16-bit ModRM rules (no SIB, disp16), so this is still
        // 9 bytes.
        let insn = [0x67, 0x48, 0x8b, 0x04, 0x25, 0x11, 0x22, 0x33, 0x44, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, .. } => assert_eq!(length, 9),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn segment_override_before_two_byte_opcode_still_decodes() {
        // 64 0F 28 C0: FS segment override + MOVAPS xmm0, xmm0. Neither
        // LOCK nor a segment override is SSE-mandatory-prefix-relevant,
        // so this must decode the same as the bare `0F 28 C0` would.
        let insn = [0x64, 0x0f, 0x28, 0xc0, 0x90, 0x90];
        match decode_length(&insn, Mode::Is64) {
            DecodeOutcome::Decoded { length, .. } => assert_eq!(length, 4),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

