//! Mach-O container handling: thin and fat binary dispatch, `__TEXT,
//! __text` location, and code-signature stripping.
//!
//! Instruction-level decoding and patching live in
//! [`crate::decoder`]/[`crate::patcher`]/[`crate::scanner`]; this
//! module's job is purely finding the bytes those act on and writing
//! the report back.

pub mod codesign;
pub mod fat;
pub mod header;
pub mod text;

use std::path::PathBuf;

use crate::error::{PatchError, Result};
use crate::scanner;
use crate::types::{CpuType, Mode, PatchOptions, PatchReport, SliceReport};

use header::MachHeader;

/// Patch every Mach-O slice found in `data` (thin or fat) and report
/// what happened, without touching the filesystem — `input`/`output`
/// are carried through only for the report.
pub fn patch_file(
    data: &mut Vec<u8>,
    input: PathBuf,
    output: Option<PathBuf>,
    options: PatchOptions,
) -> Result<PatchReport> {
    if data.len() < 4 {
        return Err(PatchError::FileTooSmall {
            expected: 4,
            actual: data.len(),
        });
    }

    let raw: [u8; 4] = data[0..4].try_into().expect("checked len >= 4 above");
    let magic_le = u32::from_le_bytes(raw);
    let magic_be = u32::from_be_bytes(raw);
    let len = data.len() as u64;

    let slices = if magic_le == header::MH_MAGIC {
        vec![patch_thin_slice(
            data,
            0,
            len,
            CpuType::I386.to_string(),
            options,
        )?]
    } else if magic_le == header::MH_MAGIC_64 {
        vec![patch_thin_slice(
            data,
            0,
            len,
            CpuType::X86_64.to_string(),
            options,
        )?]
    } else if magic_be == header::FAT_MAGIC {
        patch_fat_binary(data, options)?
    } else {
        return Err(PatchError::UnknownMagic { magic: magic_le });
    };

    Ok(PatchReport {
        input,
        output,
        slices,
    })
}

fn patch_fat_binary(data: &mut Vec<u8>, options: PatchOptions) -> Result<Vec<SliceReport>> {
    let arches = fat::parse_fat_arches(data)?;
    let mut reports = Vec::with_capacity(arches.len());

    for arch in arches {
        match arch.cpu_type {
            CpuType::I386 | CpuType::X86_64 => {
                let report = patch_thin_slice(
                    data,
                    arch.offset as usize,
                    u64::from(arch.size),
                    arch.cpu_type.to_string(),
                    options,
                )?;
                reports.push(report);
            }
            CpuType::Other(_) => {
                // Non-Intel architecture slice: nothing in this catalog applies to it.
            }
        }
    }

    Ok(reports)
}

fn patch_thin_slice(
    data: &mut [u8],
    base: usize,
    slice_len: u64,
    cpu_label: String,
    options: PatchOptions,
) -> Result<SliceReport> {
    let header = MachHeader::parse(data, base)?;
    let mode = if header.is_64 { Mode::Is64 } else { Mode::Is32 };

    // The original strips the code signature unconditionally, even when
    // the text section can't be located or the prescan bypasses
    // patching, so every early return below still runs this.
    let strip = |data: &mut [u8]| -> Result<bool> {
        if !options.dry_run && options.strip_signature {
            codesign::strip_code_signature(data, &header, base)
        } else {
            Ok(false)
        }
    };

    let Some(text_section) = text::locate_text_section(data, &header, slice_len)? else {
        let signature_stripped = strip(data)?;
        let mut report = bypassed_report(cpu_label, mode);
        report.signature_stripped = signature_stripped;
        return Ok(report);
    };

    let text_offset = base + text_section.file_offset as usize;
    let text_size = text_section.size as usize;

    let scan_result = if options.dry_run {
        scanner::scan(data, text_offset, text_size, mode, false)
    } else {
        match scanner::prescan_then_scan(data, text_offset, text_size, mode) {
            Ok(result) => result,
            Err(PatchError::PrescanRejected { bad, .. }) => {
                let signature_stripped = strip(data)?;
                let mut report = bypassed_report(cpu_label, mode);
                report.bad_instructions = bad;
                report.signature_stripped = signature_stripped;
                return Ok(report);
            }
            Err(other) => return Err(other),
        }
    };

    let signature_stripped = strip(data)?;

    Ok(SliceReport {
        cpu_type: cpu_label,
        mode: mode.into(),
        patches: scan_result.patches,
        bad_instructions: scan_result.bad_instructions,
        bypassed: false,
        signature_stripped,
    })
}

fn bypassed_report(cpu_label: String, mode: Mode) -> SliceReport {
    SliceReport {
        cpu_type: cpu_label,
        mode: mode.into(),
        patches: Vec::new(),
        bad_instructions: 0,
        bypassed: true,
        signature_stripped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatchKind;

    fn minimal_64bit_with_cpuid() -> Vec<u8> {
        use header::{MACH_HEADER_64_SIZE, MH_MAGIC_64, SEGMENT_COMMAND_64_SIZE, SECTION_64_SIZE};

        let mut data = vec![0u8; MACH_HEADER_64_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC_64.to_le_bytes());
        data[16..20].copy_from_slice(&1u32.to_le_bytes()); // ncmds
        let cmdsize = SEGMENT_COMMAND_64_SIZE + SECTION_64_SIZE;
        data[20..24].copy_from_slice(&(cmdsize as u32).to_le_bytes());

        let segment_start = data.len();
        data.extend_from_slice(&header::LC_SEGMENT_64.to_le_bytes());
        data.extend_from_slice(&(cmdsize as u32).to_le_bytes());
        let mut segname = [0u8; 16];
        segname[..6].copy_from_slice(b"__TEXT");
        data.extend_from_slice(&segname);
        data.extend(std::iter::repeat(0u8).take(8 + 8 + 8 + 8 + 4 + 4));
        data.extend_from_slice(&1u32.to_le_bytes()); // nsects
        data.extend(std::iter::repeat(0u8).take(4));

        let text_file_offset = (segment_start + cmdsize) as u32;
        let mut sectname = [0u8; 16];
        sectname[..6].copy_from_slice(b"__text");
        data.extend_from_slice(&sectname);
        data.extend_from_slice(&segname);
        data.extend(std::iter::repeat(0u8).take(8)); // addr
        data.extend_from_slice(&8u64.to_le_bytes()); // size
        data.extend_from_slice(&text_file_offset.to_le_bytes()); // offset
        data.extend(std::iter::repeat(0u8).take(28)); // align, reloff, nreloc, flags, reserved1-3

        // 8 bytes of code: CPUID then padding, plus the 16-byte tail margin.
        data.extend_from_slice(&[0x0f, 0xa2, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90]);
        data.extend(std::iter::repeat(0x90u8).take(32));
        data
    }

    #[test]
    fn patches_thin_64bit_file_and_reports_cpuid() {
        let mut data = minimal_64bit_with_cpuid();
        let report = patch_file(
            &mut data,
            PathBuf::from("a.out"),
            None,
            PatchOptions::default(),
        )
        .unwrap();

        assert_eq!(report.slices.len(), 1);
        assert_eq!(report.slices[0].patches.len(), 1);
        assert_eq!(report.slices[0].patches[0].kind, PatchKind::Cpuid);
        assert!(report.has_patches());
    }

    #[test]
    fn dry_run_finds_patch_candidate_without_mutating() {
        let mut data = minimal_64bit_with_cpuid();
        let before = data.clone();
        let options = PatchOptions {
            dry_run: true,
            strip_signature: true,
        };
        let report = patch_file(&mut data, PathBuf::from("a.out"), None, options).unwrap();

        assert!(!report.has_patches());
        assert_eq!(data, before);
    }

    #[test]
    fn rejects_unknown_magic() {
        let mut data = vec![0u8; 16];
        let err = patch_file(
            &mut data,
            PathBuf::from("a.out"),
            None,
            PatchOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::UnknownMagic { .. }));
    }

    #[test]
    fn strips_signature_even_when_slice_is_bypassed() {
        use header::{LC_CODE_SIGNATURE, MACH_HEADER_64_SIZE, MH_MAGIC_64};

        // no __TEXT segment at all, so this slice bypasses patching,
        // but it still carries a code signature that must be stripped.
        let mut data = vec![0u8; MACH_HEADER_64_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC_64.to_le_bytes());
        data[16..20].copy_from_slice(&1u32.to_le_bytes()); // ncmds
        data[20..24].copy_from_slice(&16u32.to_le_bytes()); // sizeofcmds

        let lc_offset = data.len();
        data.extend_from_slice(&LC_CODE_SIGNATURE.to_le_bytes());
        data.extend_from_slice(&16u32.to_le_bytes());
        let dataoff = (lc_offset + 16) as u32;
        data.extend_from_slice(&dataoff.to_le_bytes());
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend(std::iter::repeat(0xABu8).take(8));

        let report = patch_file(
            &mut data,
            PathBuf::from("a.out"),
            None,
            PatchOptions::default(),
        )
        .unwrap();

        assert!(report.slices[0].bypassed);
        assert!(report.slices[0].signature_stripped);
        let ncmds = header::read_u32(&data, 16).unwrap();
        assert_eq!(ncmds, 0);
    }

    #[test]
    fn rejects_file_too_small_to_hold_a_magic() {
        let mut data = vec![0u8; 2];
        let err = patch_file(
            &mut data,
            PathBuf::from("a.out"),
            None,
            PatchOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::FileTooSmall { .. }));
    }
}
