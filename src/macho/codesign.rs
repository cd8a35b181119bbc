//! Stripping `LC_CODE_SIGNATURE` / `LC_DYLIB_CODE_SIGN_DRS` from a thin
//! Mach-O slice.
//!
//! The load command itself is zeroed in place rather than removed and
//! the following commands shifted down: every other load command's
//! offset stays valid, and `ncmds`/`sizeofcmds` shrink to match, so a
//! loader that walks `ncmds` commands never reaches the zeroed one.

use std::ops::ControlFlow;

use crate::error::{PatchError, Result};

use super::header::{
    read_u32, walk_load_commands, write_u32, LoadCommand, MachHeader, LC_CODE_SIGNATURE,
    LC_DYLIB_CODE_SIGN_DRS,
};

/// Zero the code-signature payload and its load command(s), and shrink
/// `ncmds`/`sizeofcmds` in the Mach-O header to match.
///
/// Returns whether anything was stripped. No signature present is not
/// an error; the caller just skips writing an output file for a
/// dry-run-equivalent "nothing changed" case.
pub fn strip_code_signature(data: &mut [u8], header: &MachHeader, base: usize) -> Result<bool> {
    let mut targets: Vec<LoadCommand> = Vec::new();
    walk_load_commands(data, header, |lc| {
        if lc.cmd == LC_CODE_SIGNATURE || lc.cmd == LC_DYLIB_CODE_SIGN_DRS {
            targets.push(lc);
        }
        ControlFlow::Continue(())
    })?;

    if targets.is_empty() {
        return Ok(false);
    }

    let mut ncmds = header.ncmds;
    let mut sizeofcmds = header.sizeofcmds;

    for lc in targets {
        let dataoff = base + read_u32(data, lc.offset + 8)? as usize;
        let datasize = read_u32(data, lc.offset + 12)? as usize;
        if let Some(payload) = data.get_mut(dataoff..dataoff + datasize) {
            payload.fill(0);
        }

        write_u32(data, lc.offset, 0); // cmd
        write_u32(data, lc.offset + 4, 0); // cmdsize
        write_u32(data, lc.offset + 8, 0); // dataoff
        write_u32(data, lc.offset + 12, 0); // datasize

        ncmds = ncmds
            .checked_sub(1)
            .ok_or(PatchError::InconsistentLoadCommands { offset: base })?;
        sizeofcmds = sizeofcmds
            .checked_sub(lc.cmdsize)
            .ok_or(PatchError::InconsistentLoadCommands { offset: base })?;
    }

    write_u32(data, base + 16, ncmds);
    write_u32(data, base + 20, sizeofcmds);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::header::{MACH_HEADER_SIZE, MH_MAGIC};

    fn build_slice_with_signature() -> Vec<u8> {
        let mut data = vec![0u8; MACH_HEADER_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC.to_le_bytes());
        data[16..20].copy_from_slice(&1u32.to_le_bytes()); // ncmds
        data[20..24].copy_from_slice(&16u32.to_le_bytes()); // sizeofcmds

        let lc_offset = data.len();
        data.extend_from_slice(&LC_CODE_SIGNATURE.to_le_bytes());
        data.extend_from_slice(&16u32.to_le_bytes());
        let dataoff = (lc_offset + 16) as u32;
        data.extend_from_slice(&dataoff.to_le_bytes());
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend(std::iter::repeat(0xABu8).take(8));
        data
    }

    #[test]
    fn strips_signature_and_shrinks_header() {
        let mut data = build_slice_with_signature();
        let header = MachHeader::parse(&data, 0).unwrap();
        let stripped = strip_code_signature(&mut data, &header, 0).unwrap();
        assert!(stripped);

        let ncmds = read_u32(&data, 16).unwrap();
        let sizeofcmds = read_u32(&data, 20).unwrap();
        assert_eq!(ncmds, 0);
        assert_eq!(sizeofcmds, 0);

        let payload_start = MACH_HEADER_SIZE + 16;
        assert!(data[payload_start..payload_start + 8].iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_header_whose_sizeofcmds_cant_cover_the_command_found() {
        // sizeofcmds (4) is far smaller than the 16-byte LC_CODE_SIGNATURE
        // command build_slice_with_signature() actually lays down.
        let mut data = build_slice_with_signature();
        data[20..24].copy_from_slice(&4u32.to_le_bytes());
        let header = MachHeader::parse(&data, 0).unwrap();
        let err = strip_code_signature(&mut data, &header, 0).unwrap_err();
        assert!(matches!(err, PatchError::InconsistentLoadCommands { .. }));
    }

    #[test]
    fn no_signature_is_not_an_error() {
        let mut data = vec![0u8; MACH_HEADER_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC.to_le_bytes());
        let header = MachHeader::parse(&data, 0).unwrap();
        assert!(!strip_code_signature(&mut data, &header, 0).unwrap());
    }

    #[test]
    fn strips_signature_in_fat_slice_at_nonzero_base() {
        // Slice lives at a nonzero offset within the fat file, as it
        // would inside a universal binary; dataoff in the load command
        // is slice-relative, so the payload it names sits at
        // `base + dataoff`, not at `dataoff` directly. Mark the
        // unshifted (base-less) position with a decoy value so the
        // bug — zeroing `dataoff` instead of `base + dataoff` — would
        // show up as a clobbered decoy rather than silently no-op'ing
        // against already-zero bytes.
        let base = 64usize;
        let mut data = vec![0xCDu8; base];
        data.extend(build_slice_with_signature());

        let header = MachHeader::parse(&data, base).unwrap();
        let stripped = strip_code_signature(&mut data, &header, base).unwrap();
        assert!(stripped);

        let ncmds = read_u32(&data, base + 16).unwrap();
        let sizeofcmds = read_u32(&data, base + 20).unwrap();
        assert_eq!(ncmds, 0);
        assert_eq!(sizeofcmds, 0);

        let payload_start = base + MACH_HEADER_SIZE + 16;
        assert!(data[payload_start..payload_start + 8].iter().all(|&b| b == 0));
        // the decoy region at the unshifted (base-less) offset must be untouched
        let decoy_start = MACH_HEADER_SIZE + 16;
        assert!(data[decoy_start..decoy_start + 8].iter().all(|&b| b == 0xCD));
    }
}
