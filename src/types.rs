//! Core data model: the operating mode, Mach-O container shapes the
//! patcher needs, and the report produced by a patch run.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which instruction-set width a `__TEXT,__text` section decodes as.
///
/// This is the ABI width of the *code*, not the width of the file
/// container; a fat binary's 32-bit slice decodes as [`Mode::Is32`]
/// even though the fat header itself is parsed independent of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// 32-bit (IA-32) code.
    Is32,
    /// 64-bit (x86-64) code.
    Is64,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Is32 => "i386",
            Mode::Is64 => "x86_64",
        })
    }
}

/// CPU type recognized in a fat (universal) binary's `fat_arch` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuType {
    /// `CPU_TYPE_I386`.
    I386,
    /// `CPU_TYPE_X86_64`.
    X86_64,
    /// Anything else; carried so the driver can report what it skipped.
    Other(u32),
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuType::I386 => f.write_str("i386"),
            CpuType::X86_64 => f.write_str("x86_64"),
            CpuType::Other(v) => write!(f, "unknown(0x{v:08x})"),
        }
    }
}

/// One architecture slice located inside a fat/universal Mach-O file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatArchEntry {
    pub cpu_type: CpuType,
    pub offset: u32,
    pub size: u32,
}

/// The `__TEXT,__text` section located inside one architecture slice,
/// with the boundaries already adjusted for the tail-margin shrink the
/// patcher applies before scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSection {
    /// Offset of section data from the start of the slice (or file, for
    /// a thin binary).
    pub file_offset: u32,
    /// Virtual address of the section, as recorded in the section header.
    pub addr: u64,
    /// Size of the section after the tail-margin shrink, in bytes.
    pub size: u32,
}

/// One applied rewrite, recorded for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRecord {
    /// File offset of the patched instruction (or, for the SYSENTER
    /// trampoline, the start of the 8-byte window).
    pub offset: u64,
    /// Which catalog entry was applied.
    pub kind: PatchKind,
}

/// Mirrors [`crate::patcher::Patch`] without pulling its module into
/// the public type graph of every report consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchKind {
    Cpuid,
    SysenterTrampoline,
    Fisttp,
    Lddqu,
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatchKind::Cpuid => "cpuid",
            PatchKind::SysenterTrampoline => "sysenter-trampoline",
            PatchKind::Fisttp => "fisttp",
            PatchKind::Lddqu => "lddqu",
        })
    }
}

/// Serde-friendly stand-in for [`Mode`], used in reports so [`Mode`]
/// itself stays free to grow non-serializable variants later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeLabel {
    I386,
    X86_64,
}

impl From<Mode> for ModeLabel {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Is32 => ModeLabel::I386,
            Mode::Is64 => ModeLabel::X86_64,
        }
    }
}

/// Per-slice scan result, before the whole-file report aggregates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceReport {
    pub cpu_type: String,
    pub mode: ModeLabel,
    pub patches: Vec<PatchRecord>,
    pub bad_instructions: u32,
    pub bypassed: bool,
    pub signature_stripped: bool,
}

/// The complete result of patching one input file, possibly spanning
/// multiple architecture slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub slices: Vec<SliceReport>,
}

impl PatchReport {
    /// Total number of patches applied across every slice.
    pub fn total_patches(&self) -> usize {
        self.slices.iter().map(|s| s.patches.len()).sum()
    }

    /// Whether any slice actually received a patch. The driver only
    /// writes an output file when this is true.
    pub fn has_patches(&self) -> bool {
        self.total_patches() > 0
    }
}

/// Options controlling a patch run, populated from CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    /// Scan and report but never write bytes to the input buffer or
    /// produce an output file.
    pub dry_run: bool,
    /// Strip `LC_CODE_SIGNATURE`/`LC_DYLIB_CODE_SIGN_DRS` after patching.
    pub strip_signature: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            strip_signature: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_displays_as_lipo_style_arch_name() {
        assert_eq!(Mode::Is32.to_string(), "i386");
        assert_eq!(Mode::Is64.to_string(), "x86_64");
    }

    #[test]
    fn report_totals_patches_across_slices() {
        let report = PatchReport {
            input: PathBuf::from("a.out"),
            output: Some(PathBuf::from("a.out.patched")),
            slices: vec![
                SliceReport {
                    cpu_type: "i386".into(),
                    mode: ModeLabel::I386,
                    patches: vec![PatchRecord {
                        offset: 0x1000,
                        kind: PatchKind::Cpuid,
                    }],
                    bad_instructions: 0,
                    bypassed: false,
                    signature_stripped: true,
                },
                SliceReport {
                    cpu_type: "x86_64".into(),
                    mode: ModeLabel::X86_64,
                    patches: vec![],
                    bad_instructions: 3,
                    bypassed: true,
                    signature_stripped: false,
                },
            ],
        };
        assert_eq!(report.total_patches(), 1);
        assert!(report.has_patches());
    }

    #[test]
    fn empty_report_has_no_patches() {
        let report = PatchReport {
            input: PathBuf::from("a.out"),
            output: None,
            slices: vec![],
        };
        assert!(!report.has_patches());
    }
}
