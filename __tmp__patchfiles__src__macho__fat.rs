//! Fat (universal) binary parsing: the big-endian `fat_header` plus its
//! array of `fat_arch` slices.

use crate::error::{PatchError, Result};
use crate::types::{CpuType, FatArchEntry};

use super::header::{read_u32_be, CPU_TYPE_I386, CPU_TYPE_X86_64};

const FAT_HEADER_SIZE: usize = 8;
const FAT_ARCH_SIZE: usize = 20;

fn cpu_type_from_raw(raw: u32) -> CpuType {
    match raw {
        CPU_TYPE_I386 => CpuType::I386,
        CPU_TYPE_X86_64 => CpuType::X86_64,
        other => CpuType::Other(other),
    }
}

/// Parse the `fat_arch` array following the 8-byte fat header at the
/// start of `data`. All fields are big-endian regardless of host or
/// slice byte order.
pub fn parse_fat_arches(data: &[u8]) -> Result<Vec<FatArchEntry>> {
    let nfat_arch = read_u32_be(data, 4)? as usize;
    let mut entries = Vec::with_capacity(nfat_arch);

    for i in 0..nfat_arch {
        let entry_off = FAT_HEADER_SIZE + i * FAT_ARCH_SIZE;
        let cpu_type = read_u32_be(data, entry_off)?;
        let offset = read_u32_be(data, entry_off + 8)?;
        let size = read_u32_be(data, entry_off + 12)?;

        let slice_end = (offset as usize)
            .checked_add(size as usize)
            .ok_or(PatchError::FatSliceOutOfBounds {
                index: i,
                cpu_type,
            })?;
        if slice_end > data.len() {
            return Err(PatchError::FatSliceOutOfBounds {
                index: i,
                cpu_type,
            });
        }

        entries.push(FatArchEntry {
            cpu_type: cpu_type_from_raw(cpu_type),
            offset,
            size,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fat_arch(cpu_type: u32, offset: u32, size: u32) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&cpu_type.to_be_bytes());
        v.extend_from_slice(&0u32.to_be_bytes()); // cpusubtype
        v.extend_from_slice(&offset.to_be_bytes());
        v.extend_from_slice(&size.to_be_bytes());
        v.extend_from_slice(&0u32.to_be_bytes()); // align
        v
    }

    #[test]
    fn parses_two_slices_and_classifies_cpu_type() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xcafe_babeu32.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend(fat_arch(CPU_TYPE_I386, 8 + 40, 16));
        data.extend(fat_arch(CPU_TYPE_X86_64, 8 + 40 + 16, 16));
        data.extend(std::iter::repeat(0u8).take(32));

        let arches = parse_fat_arches(&data).unwrap();
        assert_eq!(arches.len(), 2);
        assert_eq!(arches[0].cpu_type, CpuType::I386);
        assert_eq!(arches[1].cpu_type, CpuType::X86_64);
    }

    #[test]
    fn rejects_slice_extending_past_file() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xcafe_babeu32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend(fat_arch(CPU_TYPE_X86_64, 8 + 20, 1000));

        assert!(matches!(
            parse_fat_arches(&data),
            Err(PatchError::FatSliceOutOfBounds { .. })
        ));
    }

    #[test]
    fn unrecognized_cpu_type_is_carried_as_other() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xcafe_babeu32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend(fat_arch(18, 8 + 20, 4));
        data.extend(std::iter::repeat(0u8).take(4));

        let arches = parse_fat_arches(&data).unwrap();
        assert_eq!(arches[0].cpu_type, CpuType::Other(18));
    }
}


