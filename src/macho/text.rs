//! Locating `__TEXT,__text` inside a thin Mach-O slice, and the
//! 16-byte tail-margin shrink that keeps the scanner from reading past
//! the mapped file.

use std::ops::ControlFlow;

use crate::error::{PatchError, Result};
use crate::types::TextSection;

use super::header::{
    read_u32, read_u64, walk_load_commands, MachHeader, LC_SEGMENT, LC_SEGMENT_64,
    SECTION_64_SIZE, SECTION_SIZE, SEGMENT_COMMAND_64_SIZE, SEGMENT_COMMAND_SIZE,
};

/// Longest possible x86 instruction; the scanner/decoder may look this
/// far past the last instruction it starts decoding.
const TAIL_MARGIN: u64 = 16;

fn name_matches(data: &[u8], offset: usize, expected: &str) -> bool {
    match data.get(offset..offset + 16) {
        Some(bytes) => {
            let len = bytes.iter().position(|&b| b == 0).unwrap_or(16);
            &bytes[..len] == expected.as_bytes()
        }
        None => false,
    }
}

/// Find `__TEXT,__text` by walking this slice's load commands, then
/// shrink its reported size so `file_offset + size + TAIL_MARGIN` never
/// exceeds `slice_len` (the bytes actually available to read).
///
/// Returns `Ok(None)` when no matching section exists; the caller
/// treats this as "bypass, don't patch" rather than a hard error, same
/// as a section lookup failure in `patch_text_segment`.
pub fn locate_text_section(
    data: &[u8],
    header: &MachHeader,
    slice_len: u64,
) -> Result<Option<TextSection>> {
    let mut found: Option<TextSection> = None;

    walk_load_commands(data, header, |lc| {
        let is_text_segment = if header.is_64 {
            lc.cmd == LC_SEGMENT_64 && name_matches(data, lc.offset + 8, "__TEXT")
        } else {
            lc.cmd == LC_SEGMENT && name_matches(data, lc.offset + 8, "__TEXT")
        };
        if !is_text_segment {
            return ControlFlow::Continue(());
        }

        let result = if header.is_64 {
            locate_section_64(data, lc.offset)
        } else {
            locate_section_32(data, lc.offset)
        };
        if let Ok(Some(section)) = result {
            found = Some(section);
        }
        ControlFlow::Break(())
    })?;

    let Some(mut section) = found else {
        return Ok(None);
    };

    let end = u64::from(section.file_offset) + u64::from(section.size);
    if end > slice_len {
        return Err(PatchError::TextSectionOutOfBounds);
    }
    if end + TAIL_MARGIN > slice_len {
        let overshoot = TAIL_MARGIN - (slice_len - end);
        if overshoot > u64::from(section.size) {
            return Err(PatchError::TextSectionOutOfBounds);
        }
        section.size -= overshoot as u32;
    }

    Ok(Some(section))
}

fn locate_section_32(data: &[u8], segment_offset: usize) -> Result<Option<TextSection>> {
    let nsects = read_u32(data, segment_offset + 48)?;
    let mut sect_offset = segment_offset + SEGMENT_COMMAND_SIZE;
    for _ in 0..nsects {
        if sect_offset + SECTION_SIZE > data.len() {
            return Ok(None);
        }
        if name_matches(data, sect_offset, "__text")
            && name_matches(data, sect_offset + 16, "__TEXT")
        {
            let addr = read_u32(data, sect_offset + 32)?;
            let size = read_u32(data, sect_offset + 36)?;
            let file_offset = read_u32(data, sect_offset + 40)?;
            return Ok(Some(TextSection {
                file_offset,
                addr: u64::from(addr),
                size,
            }));
        }
        sect_offset += SECTION_SIZE;
    }
    Ok(None)
}

fn locate_section_64(data: &[u8], segment_offset: usize) -> Result<Option<TextSection>> {
    let nsects = read_u32(data, segment_offset + 64)?;
    let mut sect_offset = segment_offset + SEGMENT_COMMAND_64_SIZE;
    for _ in 0..nsects {
        if sect_offset + SECTION_64_SIZE > data.len() {
            return Ok(None);
        }
        if name_matches(data, sect_offset, "__text")
            && name_matches(data, sect_offset + 16, "__TEXT")
        {
            let addr = read_u64(data, sect_offset + 32)?;
            let size = read_u64(data, sect_offset + 40)?;
            let file_offset = read_u32(data, sect_offset + 48)?;
            return Ok(Some(TextSection {
                file_offset,
                addr,
                size: size as u32,
            }));
        }
        sect_offset += SECTION_64_SIZE;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::header::{MH_MAGIC_64, MACH_HEADER_64_SIZE};

    fn build_64bit_slice(text_size: u32, extra_tail: usize) -> Vec<u8> {
        let mut data = vec![0u8; MACH_HEADER_64_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC_64.to_le_bytes());
        data[16..20].copy_from_slice(&1u32.to_le_bytes()); // ncmds
        let segment_start = data.len();

        let cmdsize = SEGMENT_COMMAND_64_SIZE + SECTION_64_SIZE;
        data.extend_from_slice(&LC_SEGMENT_64.to_le_bytes());
        data.extend_from_slice(&(cmdsize as u32).to_le_bytes());
        let mut segname = [0u8; 16];
        segname[..6].copy_from_slice(b"__TEXT");
        data.extend_from_slice(&segname);
        data.extend(std::iter::repeat(0u8).take(8)); // vmaddr
        data.extend(std::iter::repeat(0u8).take(8)); // vmsize
        data.extend(std::iter::repeat(0u8).take(8)); // fileoff
        data.extend(std::iter::repeat(0u8).take(8)); // filesize
        data.extend(std::iter::repeat(0u8).take(4)); // maxprot
        data.extend(std::iter::repeat(0u8).take(4)); // initprot
        data.extend_from_slice(&1u32.to_le_bytes()); // nsects
        data.extend(std::iter::repeat(0u8).take(4)); // flags

        let text_file_offset = (segment_start + cmdsize) as u32;
        let mut sectname = [0u8; 16];
        sectname[..6].copy_from_slice(b"__text");
        data.extend_from_slice(&sectname);
        data.extend_from_slice(&segname);
        data.extend(std::iter::repeat(0u8).take(8)); // addr
        data.extend_from_slice(&(text_size as u64).to_le_bytes()); // size
        data.extend_from_slice(&text_file_offset.to_le_bytes()); // offset
        data.extend(std::iter::repeat(0u8).take(28)); // align, reloff, nreloc, flags, reserved1-3

        data.extend(std::iter::repeat(0x90u8).take(text_size as usize + extra_tail));
        data
    }

    #[test]
    fn locates_text_section_64bit() {
        let data = build_64bit_slice(100, 32);
        let header = MachHeader::parse(&data, 0).unwrap();
        let section = locate_text_section(&data, &header, data.len() as u64)
            .unwrap()
            .unwrap();
        assert_eq!(section.size, 100);
    }

    #[test]
    fn shrinks_size_when_tail_margin_would_overrun_file() {
        let data = build_64bit_slice(100, 5);
        let header = MachHeader::parse(&data, 0).unwrap();
        let section = locate_text_section(&data, &header, data.len() as u64)
            .unwrap()
            .unwrap();
        assert_eq!(section.size, 100 - (16 - 5));
    }

    #[test]
    fn rejects_section_too_small_for_tail_margin_instead_of_underflowing() {
        // a 3-byte __text section with no trailing bytes: the required
        // 16-byte tail margin overshoots the section itself, which must
        // be an error rather than wrapping `section.size` around zero.
        let data = build_64bit_slice(3, 0);
        let header = MachHeader::parse(&data, 0).unwrap();
        let err = locate_text_section(&data, &header, data.len() as u64).unwrap_err();
        assert!(matches!(err, PatchError::TextSectionOutOfBounds));
    }

    #[test]
    fn huge_nsects_stops_at_end_of_data_instead_of_looping() {
        // nsects claims four billion sections but the segment command
        // is followed by nothing; the loop must bail out the first
        // time sect_offset would run past the buffer instead of
        // iterating nsects times.
        let mut data = vec![0u8; MACH_HEADER_64_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC_64.to_le_bytes());
        data[16..20].copy_from_slice(&1u32.to_le_bytes()); // ncmds

        let cmdsize = SEGMENT_COMMAND_64_SIZE;
        data.extend_from_slice(&LC_SEGMENT_64.to_le_bytes());
        data.extend_from_slice(&(cmdsize as u32).to_le_bytes());
        let mut segname = [0u8; 16];
        segname[..6].copy_from_slice(b"__TEXT");
        data.extend_from_slice(&segname);
        data.extend(std::iter::repeat(0u8).take(8)); // vmaddr
        data.extend(std::iter::repeat(0u8).take(8)); // vmsize
        data.extend(std::iter::repeat(0u8).take(8)); // fileoff
        data.extend(std::iter::repeat(0u8).take(8)); // filesize
        data.extend(std::iter::repeat(0u8).take(4)); // maxprot
        data.extend(std::iter::repeat(0u8).take(4)); // initprot
        data.extend_from_slice(&u32::MAX.to_le_bytes()); // nsects
        data.extend(std::iter::repeat(0u8).take(4)); // flags

        let header = MachHeader::parse(&data, 0).unwrap();
        let section = locate_text_section(&data, &header, data.len() as u64).unwrap();
        assert!(section.is_none());
    }

    #[test]
    fn missing_text_segment_is_none_not_error() {
        let mut data = vec![0u8; MACH_HEADER_64_SIZE];
        data[0..4].copy_from_slice(&MH_MAGIC_64.to_le_bytes());
        let header = MachHeader::parse(&data, 0).unwrap();
        assert!(locate_text_section(&data, &header, data.len() as u64)
            .unwrap()
            .is_none());
    }
}

