//! Mach-O magic numbers, load command constants, and bounds-checked
//! header reads.
//!
//! Every multi-byte field here is read through [`read_u32`]/[`read_u64`]
//! rather than cast through a repr(C) struct: the input is untrusted and
//! the file is mapped as a plain byte buffer, so every offset is a
//! potential out-of-bounds read unless checked first.

use crate::error::{PatchError, Result};

/// 32-bit Mach-O, native (little-endian) byte order.
pub const MH_MAGIC: u32 = 0xfeed_face;
/// 64-bit Mach-O, native (little-endian) byte order.
pub const MH_MAGIC_64: u32 = 0xfeed_facf;
/// Fat (universal) binary, always big-endian on disk.
pub const FAT_MAGIC: u32 = 0xcafe_babe;

/// `CPU_TYPE_I386`.
pub const CPU_TYPE_I386: u32 = 7;
/// `CPU_TYPE_X86_64` (`CPU_TYPE_I386 | CPU_ARCH_ABI64`).
pub const CPU_TYPE_X86_64: u32 = 0x0100_0007;

/// `LC_SEGMENT` (32-bit `__TEXT`/`__DATA`/... segments).
pub const LC_SEGMENT: u32 = 0x1;
/// `LC_SEGMENT_64`.
pub const LC_SEGMENT_64: u32 = 0x19;
/// `LC_CODE_SIGNATURE`.
pub const LC_CODE_SIGNATURE: u32 = 0x1d;
/// `LC_DYLIB_CODE_SIGN_DRS`.
pub const LC_DYLIB_CODE_SIGN_DRS: u32 = 0x2b;

/// Size of `struct mach_header` (32-bit, no `reserved` field).
pub const MACH_HEADER_SIZE: usize = 28;
/// Size of `struct mach_header_64`.
pub const MACH_HEADER_64_SIZE: usize = 32;
/// Size of `struct segment_command` (32-bit).
pub const SEGMENT_COMMAND_SIZE: usize = 56;
/// Size of `struct segment_command_64`.
pub const SEGMENT_COMMAND_64_SIZE: usize = 72;
/// Size of `struct section` (32-bit).
pub const SECTION_SIZE: usize = 68;
/// Size of `struct section_64`.
pub const SECTION_64_SIZE: usize = 80;
/// Size of the generic `struct load_command` (`cmd`, `cmdsize`).
pub const LOAD_COMMAND_SIZE: usize = 8;
/// Size of `struct linkedit_data_command`.
pub const LINKEDIT_DATA_COMMAND_SIZE: usize = 16;

/// Read a little-endian `u32` at `offset`, bounds-checked against `data`.
pub fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let end = offset
        .checked_add(4)
        .ok_or(PatchError::TruncatedHeader { offset })?;
    let bytes: [u8; 4] = data
        .get(offset..end)
        .ok_or(PatchError::TruncatedHeader { offset })?
        .try_into()
        .expect("slice of length 4");
    Ok(u32::from_le_bytes(bytes))
}

/// Read a big-endian `u32` at `offset`, bounds-checked against `data`.
///
/// Used for the fat header and `fat_arch` entries, which are always
/// big-endian regardless of the host or slice byte order.
pub fn read_u32_be(data: &[u8], offset: usize) -> Result<u32> {
    let end = offset
        .checked_add(4)
        .ok_or(PatchError::TruncatedHeader { offset })?;
    let bytes: [u8; 4] = data
        .get(offset..end)
        .ok_or(PatchError::TruncatedHeader { offset })?
        .try_into()
        .expect("slice of length 4");
    Ok(u32::from_be_bytes(bytes))
}

/// Read a little-endian `u64` at `offset`, bounds-checked against `data`.
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let end = offset
        .checked_add(8)
        .ok_or(PatchError::TruncatedHeader { offset })?;
    let bytes: [u8; 8] = data
        .get(offset..end)
        .ok_or(PatchError::TruncatedHeader { offset })?
        .try_into()
        .expect("slice of length 8");
    Ok(u64::from_le_bytes(bytes))
}

/// Write a little-endian `u32` at `offset`. Caller guarantees the write
/// is in bounds (every call site here derives `offset` from a location
/// it has already read a header or load command from).
pub fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// The handful of `mach_header(_64)` fields the patcher actually needs.
#[derive(Debug, Clone, Copy)]
pub struct MachHeader {
    pub is_64: bool,
    pub cpu_type: u32,
    pub ncmds: u32,
    pub sizeofcmds: u32,
    /// Byte offset of the first load command, i.e. the header's own size.
    pub load_commands_offset: usize,
}

impl MachHeader {
    /// Parse a thin Mach-O header at `base` within `data`, dispatching
    /// on magic to the 32- or 64-bit layout.
    pub fn parse(data: &[u8], base: usize) -> Result<Self> {
        let magic = read_u32(data, base)?;
        let is_64 = match magic {
            MH_MAGIC_64 => true,
            MH_MAGIC => false,
            other => return Err(PatchError::UnknownMagic { magic: other }),
        };
        let cpu_type = read_u32(data, base + 4)?;
        let ncmds = read_u32(data, base + 16)?;
        let sizeofcmds = read_u32(data, base + 20)?;
        let header_size = if is_64 {
            MACH_HEADER_64_SIZE
        } else {
            MACH_HEADER_SIZE
        };
        Ok(MachHeader {
            is_64,
            cpu_type,
            ncmds,
            sizeofcmds,
            load_commands_offset: base + header_size,
        })
    }
}

/// One parsed load command: its type, its total size, and where it
/// starts in the file.
#[derive(Debug, Clone, Copy)]
pub struct LoadCommand {
    pub cmd: u32,
    pub cmdsize: u32,
    pub offset: usize,
}

/// Walk `header.ncmds` load commands starting at
/// `header.load_commands_offset`, calling `visit` with each one.
///
/// Stops early (returning `Ok(())`) the moment `visit` returns
/// `ControlFlow::Break`, mirroring the early `return` in the original
/// segment/section walkers once a match is found.
pub fn walk_load_commands(
    data: &[u8],
    header: &MachHeader,
    mut visit: impl FnMut(LoadCommand) -> std::ops::ControlFlow<()>,
) -> Result<()> {
    let mut offset = header.load_commands_offset;
    for _ in 0..header.ncmds {
        let cmd = read_u32(data, offset)?;
        let cmdsize = read_u32(data, offset + 4)?;
        if cmdsize < LOAD_COMMAND_SIZE as u32 {
            return Err(PatchError::TruncatedHeader { offset });
        }
        let lc = LoadCommand {
            cmd,
            cmdsize,
            offset,
        };
        if visit(lc).is_break() {
            return Ok(());
        }
        offset += cmdsize as usize;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_64bit_header_magic_and_counts() {
        let mut data = vec![0u8; MACH_HEADER_64_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC_64.to_le_bytes());
        data[4..8].copy_from_slice(&CPU_TYPE_X86_64.to_le_bytes());
        data[16..20].copy_from_slice(&3u32.to_le_bytes());
        data[20..24].copy_from_slice(&200u32.to_le_bytes());

        let header = MachHeader::parse(&data, 0).unwrap();
        assert!(header.is_64);
        assert_eq!(header.cpu_type, CPU_TYPE_X86_64);
        assert_eq!(header.ncmds, 3);
        assert_eq!(header.load_commands_offset, MACH_HEADER_64_SIZE);
    }

    #[test]
    fn rejects_unknown_magic() {
        let data = vec![0u8; 32];
        assert!(matches!(
            MachHeader::parse(&data, 0),
            Err(PatchError::UnknownMagic { .. })
        ));
    }

    #[test]
    fn walk_visits_every_command_until_found() {
        let mut data = vec![0u8; MACH_HEADER_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC.to_le_bytes());
        data[16..20].copy_from_slice(&2u32.to_le_bytes());

        // two fake load commands: sizes 20 then 16
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&20u32.to_le_bytes());
        data.extend(std::iter::repeat(0u8).take(12));
        data.extend_from_slice(&LC_CODE_SIGNATURE.to_le_bytes());
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend(std::iter::repeat(0u8).take(8));

        let header = MachHeader::parse(&data, 0).unwrap();
        let mut seen = Vec::new();
        walk_load_commands(&data, &header, |lc| {
            seen.push(lc.cmd);
            std::ops::ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(seen, vec![7, LC_CODE_SIGNATURE]);
    }
}


