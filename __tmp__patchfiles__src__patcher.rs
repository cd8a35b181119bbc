//! The fixed catalog of in-place instruction rewrites.
//!
//! Every rewrite here preserves instruction length (patching never
//! shifts anything after it), which is what lets the scanner apply
//! patches during a single linear pass with no relocation step.

use crate::types::Mode;

/// Which rewrite, if any, applies to the instruction at `insn[..len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    /// `0F A2` (CPUID) rewritten to `CD FB` (`INT 0xFB`), trapping the
    /// instruction out to a handler instead of letting it execute.
    Cpuid,
    /// The 8-byte `SYSENTER` trampoline `5A 89 E1 0F 34 0F 1F 00`
    /// rewritten to trap through `INT 0xFC` instead. Only valid in
    /// 32-bit mode; `SYSENTER` itself is unsupported in 64-bit code
    /// here (see the decoder's `OP_NEEDS_PATCH` entry for `0F 34`).
    SysenterTrampoline,
    /// `DF /1`, `DB /1`, or `DD /1` (`FISTTP`) rewritten back to the
    /// corresponding `FISTP` form.
    Fisttp,
    /// `F2 0F F0 /r` (`LDDQU`) rewritten to `F3 0F 6F /r` (`MOVDQU`).
    Lddqu,
}

const SYSENTER_TRAMPOLINE: [u8; 8] = [0x5a, 0x89, 0xe1, 0x0f, 0x34, 0x0f, 0x1f, 0x00];
const SYSENTER_PATCHED: [u8; 8] = [0x59, 0xcd, 0xfc, 0x51, 0xc3, 0x0f, 0x1f, 0x00];

/// Scan a decoded instruction for an applicable patch and apply it in
/// place. `insn` must be exactly `length` bytes of the instruction the
/// decoder just recognized, unless checking for the SYSENTER
/// trampoline, which additionally needs 3 bytes before and 4 bytes
/// after `insn[0]` (the caller's prescan/scan already ensures this via
/// the same 15-byte tail margin the decoder itself requires).
///
/// Returns the patch applied, or `None` if this instruction carried
/// `NEEDS_PATCH` but none of the catalog's exact byte patterns matched
/// (this should not happen for well-formed input; it makes the
/// catalog a closed, exhaustive set rather than a partial one).
pub fn try_patch(full: &mut [u8], offset: usize, length: usize, mode: Mode) -> Option<Patch> {
    let insn = &full[offset..offset + length];

    match (insn[0], insn.get(1).copied()) {
        (0x0f, Some(0xa2)) => {
            full[offset] = 0xcd;
            full[offset + 1] = 0xfb;
            return Some(Patch::Cpuid);
        }
        (0xdf | 0xdb | 0xdd, Some(modrm)) if (modrm >> 3) & 0x7 == 1 => {
            return Some(patch_fisttp(full, offset, insn[0]));
        }
        (0xf2, Some(0x0f)) if insn.get(2) == Some(&0xf0) => {
            full[offset] = 0xf3;
            full[offset + 2] = 0x6f;
            return Some(Patch::Lddqu);
        }
        _ => {}
    }

    if mode == Mode::Is32 && insn.first() == Some(&0x0f) && insn.get(1) == Some(&0x34) {
        if let Some(start) = offset.checked_sub(3) {
            if full.len() >= start + 8 && full[start..start + 8] == SYSENTER_TRAMPOLINE {
                full[start..start + 8].copy_from_slice(&SYSENTER_PATCHED);
                return Some(Patch::SysenterTrampoline);
            }
        }
    }

    None
}

fn patch_fisttp(full: &mut [u8], offset: usize, opcode: u8) -> Patch {
    // Clear reg (bits 3-5) then set it back to the FISTP form: /3 for
    // the 32-bit forms (DF/DB), /7 for the 80-bit form (DD), which also
    // needs its opcode byte changed from DD to DF.
    let modrm = full[offset + 1];
    let cleared = modrm & !(0x7 << 3);
    if opcode == 0xdd {
        full[offset] = 0xdf;
        full[offset + 1] = cleared | (7 << 3);
    } else {
        full[offset + 1] = cleared | (3 << 3);
    }
    Patch::Fisttp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_cpuid_to_int_fb() {
        let mut buf = [0x0f, 0xa2, 0x90];
        let patch = try_patch(&mut buf, 0, 2, Mode::Is64);
        assert_eq!(patch, Some(Patch::Cpuid));
        assert_eq!(&buf[..2], &[0xcd, 0xfb]);
    }

    #[test]
    fn patches_fisttp_db_to_fistp_reg3() {
        // DB /1 with mod=11, rm=0 -> reg bits at position 1
        let mut buf = [0xdb, 0b11_001_000];
        let patch = try_patch(&mut buf, 0, 2, Mode::Is64);
        assert_eq!(patch, Some(Patch::Fisttp));
        assert_eq!(buf[0], 0xdb);
        assert_eq!((buf[1] >> 3) & 0x7, 3);
    }

    #[test]
    fn patches_fisttp_dd_to_fistp_df_reg7() {
        let mut buf = [0xdd, 0b11_001_000];
        let patch = try_patch(&mut buf, 0, 2, Mode::Is64);
        assert_eq!(patch, Some(Patch::Fisttp));
        assert_eq!(buf[0], 0xdf);
        assert_eq!((buf[1] >> 3) & 0x7, 7);
    }

    #[test]
    fn patches_lddqu_to_movdqu() {
        let mut buf = [0xf2, 0x0f, 0xf0, 0x00];
        let patch = try_patch(&mut buf, 0, 4, Mode::Is64);
        assert_eq!(patch, Some(Patch::Lddqu));
        assert_eq!(&buf[..3], &[0xf3, 0x0f, 0x6f]);
    }

    #[test]
    fn patches_sysenter_trampoline_only_in_32bit_mode() {
        let mut buf = [0x5a, 0x89, 0xe1, 0x0f, 0x34, 0x0f, 0x1f, 0x00];
        let offset = 3; // points at the 0F 34 opcode
        assert_eq!(try_patch(&mut buf, offset, 2, Mode::Is64), None);

        let patch = try_patch(&mut buf, offset, 2, Mode::Is32);
        assert_eq!(patch, Some(Patch::SysenterTrampoline));
        assert_eq!(buf, [0x59, 0xcd, 0xfc, 0x51, 0xc3, 0x0f, 0x1f, 0x00]);
    }

    #[test]
    fn sysenter_window_mismatch_is_not_patched() {
        let mut buf = [0xff, 0x89, 0xe1, 0x0f, 0x34, 0x0f, 0x1f, 0x00];
        assert_eq!(try_patch(&mut buf, 3, 2, Mode::Is32), None);
    }
}


