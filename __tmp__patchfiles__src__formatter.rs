//! Output formatters for a patch run's report.
//!
//! Trait-based so the CLI can pick a renderer at runtime from `--format`
//! without the driver caring which one it got.

use crate::types::{PatchReport, SliceReport};

/// Renders a [`PatchReport`]. Implementors provide per-section pieces
/// plus a default `format_report` that concatenates them; a formatter
/// whose output isn't naturally section-shaped (JSON) overrides
/// `format_report` directly and leaves the per-section methods unused.
pub trait ReportFormatter {
    /// Format the input/output file line.
    fn format_header(&self, report: &PatchReport) -> String;

    /// Format one architecture slice's result.
    fn format_slice(&self, slice: &SliceReport) -> String;

    /// Format the cross-slice totals line, if there's anything to say.
    fn format_summary(&self, report: &PatchReport) -> Option<String>;

    /// Render the complete report.
    fn format_report(&self, report: &PatchReport) -> String {
        let mut out = self.format_header(report);
        for slice in &report.slices {
            out.push_str(&self.format_slice(slice));
        }
        if let Some(summary) = self.format_summary(report) {
            out.push_str(&summary);
        }
        out
    }
}

/// Human-readable, multi-line output.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    /// Include the bad-instruction count and each patch's file offset.
    pub verbose: bool,
}

impl HumanFormatter {
    /// Create a formatter with default (non-verbose) settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl ReportFormatter for HumanFormatter {
    fn format_header(&self, report: &PatchReport) -> String {
        match &report.output {
            Some(output) => format!(
                "{} -> {}\n",
                report.input.display(),
                output.display()
            ),
            None => format!("{} (dry run)\n", report.input.display()),
        }
    }

    fn format_slice(&self, slice: &SliceReport) -> String {
        let mut s = format!("  [{}, {}]", slice.cpu_type, slice.mode_label());

        if slice.bypassed {
            s.push_str(" bypassed (section did not look like valid code)\n");
            return s;
        }

        s.push_str(&format!(" {} patches applied", slice.patches.len()));
        if self.verbose {
            s.push_str(&format!(", {} malformed instructions seen", slice.bad_instructions));
        }
        s.push('\n');

        if self.verbose {
            for patch in &slice.patches {
                s.push_str(&format!(
                    "    0x{:08x}  {}\n",
                    patch.offset, patch.kind
                ));
            }
        }

        if slice.signature_stripped {
            s.push_str("    code signature stripped\n");
        }

        s
    }

    fn format_summary(&self, report: &PatchReport) -> Option<String> {
        Some(format!(
            "{} total patches across {} slice(s)\n",
            report.total_patches(),
            report.slices.len()
        ))
    }
}

/// JSON output, built once from the whole report rather than stitched
/// from per-section strings.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty-print with indentation.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a pretty-printing JSON formatter.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a single-line JSON formatter.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_header(&self, _report: &PatchReport) -> String {
        String::new()
    }

    fn format_slice(&self, _slice: &SliceReport) -> String {
        String::new()
    }

    fn format_summary(&self, _report: &PatchReport) -> Option<String> {
        None
    }

    fn format_report(&self, report: &PatchReport) -> String {
        if self.pretty {
            serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// One line per slice, tab-separated, for scripting.
#[derive(Debug, Clone, Default)]
pub struct ShortFormatter;

impl ShortFormatter {
    /// Create a new short formatter.
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for ShortFormatter {
    fn format_header(&self, _report: &PatchReport) -> String {
        String::new()
    }

    fn format_slice(&self, slice: &SliceReport) -> String {
        format!(
            "{}\t{}\t{}\t{}\n",
            slice.cpu_type,
            slice.mode_label(),
            slice.patches.len(),
            if slice.bypassed { "bypassed" } else { "ok" }
        )
    }

    fn format_summary(&self, _report: &PatchReport) -> Option<String> {
        None
    }

    fn format_report(&self, report: &PatchReport) -> String {
        let mut out = format!("{}\n", report.input.display());
        for slice in &report.slices {
            out.push_str(&self.format_slice(slice));
        }
        out
    }
}

impl SliceReport {
    fn mode_label(&self) -> &'static str {
        match self.mode {
            crate::types::ModeLabel::I386 => "i386",
            crate::types::ModeLabel::X86_64 => "x86_64",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModeLabel, PatchKind, PatchRecord};
    use std::path::PathBuf;

    fn sample_report() -> PatchReport {
        PatchReport {
            input: PathBuf::from("/bin/legacy"),
            output: Some(PathBuf::from("/bin/legacy.patched")),
            slices: vec![SliceReport {
                cpu_type: "x86_64".into(),
                mode: ModeLabel::X86_64,
                patches: vec![PatchRecord {
                    offset: 0x2000,
                    kind: PatchKind::Cpuid,
                }],
                bad_instructions: 2,
                bypassed: false,
                signature_stripped: true,
            }],
        }
    }

    #[test]
    fn human_formatter_reports_patch_count_and_signature_strip() {
        let output = HumanFormatter::new().format_report(&sample_report());
        assert!(output.contains("/bin/legacy -> /bin/legacy.patched"));
        assert!(output.contains("1 patches applied"));
        assert!(output.contains("code signature stripped"));
        assert!(output.contains("1 total patches"));
    }

    #[test]
    fn human_verbose_lists_each_patch_offset() {
        let output = HumanFormatter::verbose().format_report(&sample_report());
        assert!(output.contains("0x00002000"));
        assert!(output.contains("cpuid"));
    }

    #[test]
    fn json_formatter_round_trips_through_serde() {
        let output = JsonFormatter::new().format_report(&sample_report());
        assert!(output.contains("\"cpuid\""));
        assert!(output.contains("legacy.patched"));
    }

    #[test]
    fn short_formatter_is_one_line_per_slice() {
        let output = ShortFormatter::new().format_report(&sample_report());
        assert!(output.contains("x86_64\tx86_64\t1\tok"));
    }
}


