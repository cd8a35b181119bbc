//! Stripping `LC_CODE_SIGNATURE` / `LC_DYLIB_CODE_SIGN_DRS` from a thin
//! Mach-O slice.
//!
//! The load command itself is zeroed in place rather than removed and
//! the following commands shifted down: every other load command's
//! offset stays valid, and `ncmds`/`sizeofcmds` shrink to match, so a
//! loader that walks `ncmds` commands never reaches the zeroed one.

use std::ops::ControlFlow;

use crate::error::Result;

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
        let dataoff = read_u32(data, lc.offset + 8)? as usize;
        let datasize = read_u32(data, lc.offset + 12)? as usize;
        if let Some(payload) = data.get_mut(dataoff..dataoff + datasize) {
            payload.fill(0);
        }

        write_u32(data, lc.offset, 0); // cmd
        write_u32(data, lc.offset + 4, 0); // cmdsize
        write_u32(data, lc.offset + 8, 0); // dataoff
        write_u32(data, lc.offset + 12, 0); // datasize

        ncmds -= 1;
        sizeofcmds -= lc.cmdsize;
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
    fn no_signature_is_not_an_error() {
        let mut data = vec![0u8; MACH_HEADER_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC.to_le_bytes());
        let header = MachHeader::parse(&data, 0).unwrap();
        assert!(!strip_code_signature(&mut data, &header, 0).unwrap());
    }
}


