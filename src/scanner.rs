//! Linear scan over a `__TEXT,__text` section, applying patches as it goes.
//!
//! The scanner never backtracks past a byte it has already consumed:
//! on a malformed instruction it slides forward one byte and keeps
//! going, quarantining the next [`REST_SIZE`] bytes from patching so a
//! plausible-looking instruction found while re-synchronizing after
//! garbage (or just after an absolute jump) isn't rewritten.

use crate::decoder::{decode_length, DecodeOutcome, DecodeStatus};
use crate::error::{PatchError, Result};
use crate::patcher::try_patch;
use crate::types::{Mode, PatchKind, PatchRecord};

/// Bytes after a suspect region that must decode cleanly before the
/// scanner will apply a patch again.
const REST_SIZE: usize = 25;
/// How much of a section to prescan before committing to a full patch pass.
pub const PRESCAN_SIZE: usize = 1000;
/// Prescan abort threshold: this many malformed instructions means the
/// section probably isn't the code we think it is.
pub const PRESCAN_MAX_BAD: u32 = 20;

/// Outcome of scanning (and possibly patching) one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub bad_instructions: u32,
    pub patches: Vec<PatchRecord>,
}

impl From<crate::patcher::Patch> for PatchKind {
    fn from(p: crate::patcher::Patch) -> Self {
        match p {
            crate::patcher::Patch::Cpuid => PatchKind::Cpuid,
            crate::patcher::Patch::SysenterTrampoline => PatchKind::SysenterTrampoline,
            crate::patcher::Patch::Fisttp => PatchKind::Fisttp,
            crate::patcher::Patch::Lddqu => PatchKind::Lddqu,
        }
    }
}

/// Scan `text_size` bytes starting at `text_offset` within `full`.
///
/// `full` must extend at least 15 bytes past `text_offset + text_size`
/// so the decoder can always look ahead for the longest possible
/// instruction; the Mach-O layer guarantees this via its tail-margin
/// shrink before calling in here.
pub fn scan(
    full: &mut [u8],
    text_offset: usize,
    text_size: usize,
    mode: Mode,
    should_patch: bool,
) -> ScanResult {
    let mut pos = 0usize;
    let mut last_bad: Option<usize> = None;
    let mut bad = 0u32;
    let mut patches = Vec::new();

    while pos < text_size {
        let outcome = decode_length(&full[text_offset + pos..], mode);
        match outcome {
            DecodeOutcome::Invalid | DecodeOutcome::Unsupported => {
                last_bad = Some(pos);
                bad += 1;
                pos += 1;
            }
            DecodeOutcome::Decoded { length, status } => {
                if status.contains(DecodeStatus::PADDING) {
                    let marker = full[text_offset + pos];
                    let mut run = 0usize;
                    while pos + run < text_size && full[text_offset + pos + run] == marker {
                        run += 1;
                    }
                    pos += run.max(1);
                    continue;
                }

                if status.contains(DecodeStatus::REST) {
                    last_bad = Some(pos);
                }

                let clear_of_quarantine = last_bad.map_or(true, |lb| pos - lb > REST_SIZE);
                if status.contains(DecodeStatus::NEEDS_PATCH) && should_patch && clear_of_quarantine
                {
                    if let Some(kind) =
                        try_patch(full, text_offset + pos, length as usize, mode, text_offset)
                    {
                        patches.push(PatchRecord {
                            offset: (text_offset + pos) as u64,
                            kind: kind.into(),
                        });
                    }
                }

                pos += length as usize;
            }
        }
    }

    ScanResult {
        bad_instructions: bad,
        patches,
    }
}

/// Prescan a bounded prefix of the section; if it looks too malformed
/// to be real code, run the full scan read-only (`should_patch=false`)
/// and report [`PatchError::PrescanRejected`] instead of patching.
/// Otherwise run the full scan with patching enabled.
pub fn prescan_then_scan(
    full: &mut [u8],
    text_offset: usize,
    text_size: usize,
    mode: Mode,
) -> Result<ScanResult> {
    let prescan_size = text_size.min(PRESCAN_SIZE);
    let prescan = scan(full, text_offset, prescan_size, mode, false);
    if prescan.bad_instructions >= PRESCAN_MAX_BAD {
        return Err(PatchError::PrescanRejected {
            bad: prescan.bad_instructions,
            limit: PRESCAN_MAX_BAD,
        });
    }

    Ok(scan(full, text_offset, text_size, mode, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(bytes: &[u8], margin: usize) -> Vec<u8> {
        let mut v = bytes.to_vec();
        v.extend(std::iter::repeat(0x90).take(margin));
        v
    }

    #[test]
    fn patches_cpuid_found_mid_section() {
        let mut buf = padded(&[0x90, 0x90, 0x0f, 0xa2, 0x90, 0x90], 16);
        let result = scan(&mut buf, 0, 6, Mode::Is64, true);
        assert_eq!(result.patches.len(), 1);
        assert_eq!(result.patches[0].kind, PatchKind::Cpuid);
        assert_eq!(&buf[2..4], &[0xcd, 0xfb]);
    }

    #[test]
    fn quarantines_patch_candidates_immediately_after_bad_bytes() {
        // one garbage byte (0x0f with an undefined second byte) then
        // immediately a CPUID: too close to the bad byte to patch.
        let mut buf = padded(&[0x0f, 0x04, 0x0f, 0xa2], 16);
        let result = scan(&mut buf, 0, 4, Mode::Is64, true);
        assert!(result.patches.is_empty());
        assert_eq!(&buf[2..4], &[0x0f, 0xa2]);
    }

    #[test]
    fn padding_run_is_consumed_without_counting_as_bad() {
        let mut buf = padded(&[0x00, 0x00, 0x00, 0x00], 16);
        let result = scan(&mut buf, 0, 4, Mode::Is64, true);
        assert_eq!(result.bad_instructions, 0);
    }

    #[test]
    fn prescan_rejects_heavily_malformed_section() {
        // every 0x0f 0x0f pair decodes as the undefined two-byte opcode 0x0f
        let mut buf: Vec<u8> = std::iter::repeat(0x0fu8).take(40).collect();
        buf.extend(std::iter::repeat(0x90).take(16));
        let result = prescan_then_scan(&mut buf, 0, 40, Mode::Is64);
        assert!(matches!(result, Err(PatchError::PrescanRejected { .. })));
    }
}
