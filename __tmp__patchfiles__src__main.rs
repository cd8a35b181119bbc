//! Mach-O AMD instruction patcher CLI.
//!
//! Rewrites a handful of legacy/privileged x86 instructions in a
//! Mach-O executable's `__TEXT,__text` section and optionally strips
//! its code signature, so the output runs on hosts the original
//! instructions don't.

use clap::{Parser, ValueEnum};
use macho_patch::error::PatchError;
use macho_patch::formatter::{HumanFormatter, JsonFormatter, ReportFormatter, ShortFormatter};
use macho_patch::macho::patch_file;
use macho_patch::types::PatchOptions;
use std::path::PathBuf;
use std::process::ExitCode;

/// Patch legacy/privileged x86 instructions out of a Mach-O executable.
#[derive(Parser, Debug)]
#[command(name = "macho-patch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Mach-O file (thin or fat/universal)
    input: PathBuf,

    /// Where to write the patched file; required unless --dry-run
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Scan and report without writing any output
    #[arg(long)]
    dry_run: bool,

    /// Leave LC_CODE_SIGNATURE / LC_DYLIB_CODE_SIGN_DRS untouched
    #[arg(long)]
    no_strip_signature: bool,

    /// Verbose output (per-patch offsets, malformed-instruction counts)
    #[arg(short, long)]
    verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// Compact tab-separated output
    Short,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("macho_patch=debug")
            .init();
    }

    if !args.dry_run && args.output.is_none() {
        eprintln!("error: OUTPUT is required unless --dry-run is given");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut data =
        std::fs::read(&args.input).map_err(|e| anyhow::anyhow!("reading {}: {e}", args.input.display()))?;

    let options = PatchOptions {
        dry_run: args.dry_run,
        strip_signature: !args.no_strip_signature,
    };

    let report = patch_file(
        &mut data,
        args.input.clone(),
        args.output.clone(),
        options,
    )?;

    print_report(&report, args);

    if args.dry_run {
        return Ok(());
    }

    let changed = report.has_patches() || report.slices.iter().any(|s| s.signature_stripped);
    if !changed {
        return Err(PatchError::NothingToWrite.into());
    }

    let output = args.output.as_ref().expect("checked above");
    std::fs::write(output, &data)
        .map_err(|e| anyhow::anyhow!("writing {}: {e}", output.display()))?;

    Ok(())
}

fn print_report(report: &macho_patch::types::PatchReport, args: &Args) {
    let rendered = match args.format {
        OutputFormat::Human if args.verbose => HumanFormatter::verbose().format_report(report),
        OutputFormat::Human => HumanFormatter::new().format_report(report),
        OutputFormat::Json => JsonFormatter::new().format_report(report),
        OutputFormat::Short => ShortFormatter::new().format_report(report),
    };
    print!("{rendered}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_output_and_input() {
        let args = Args::try_parse_from(["macho-patch", "a.out", "a.out.patched"]).unwrap();
        assert_eq!(args.input, PathBuf::from("a.out"));
        assert_eq!(args.output, Some(PathBuf::from("a.out.patched")));
    }

    #[test]
    fn dry_run_does_not_require_output() {
        let args = Args::try_parse_from(["macho-patch", "--dry-run", "a.out"]).unwrap();
        assert!(args.output.is_none());
        assert!(args.dry_run);
    }

    #[test]
    fn format_flag_parses() {
        let args = Args::try_parse_from(["macho-patch", "-f", "json", "a.out", "out"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Json));
    }
}


