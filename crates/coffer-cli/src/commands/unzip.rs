//! `coffer unzip`: extract, list or test a zip archive.

use super::output_dir;
use crate::cli::UnzipArgs;
use crate::error::VerificationFailed;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress;
use anyhow::Result;
use coffer_core::ExtractionConfig;
use coffer_core::extract_archive_with_progress;
use coffer_core::formats::ArchiveType;
use coffer_core::list_archive;
use coffer_core::verify_archive;

pub fn execute(args: &UnzipArgs, formatter: &dyn OutputFormatter, json: bool) -> Result<()> {
    let config = ExtractionConfig::default()
        .with_format(Some(ArchiveType::Zip))
        .with_overwrite(args.overwrite)
        .with_strict_paths(args.strict)
        .with_exclude_patterns(args.exclude.clone())
        .with_include_patterns(args.include.clone());

    if args.list {
        let manifest = add_archive_context(list_archive(&args.archive, &config), &args.archive)?;
        return formatter.format_zip_listing(&manifest);
    }

    if args.test {
        let report = add_archive_context(verify_archive(&args.archive, &config), &args.archive)?;
        formatter.format_verification_report(&args.archive, &report)?;
        if !report.is_ok() {
            return Err(VerificationFailed {
                failures: report.failures.len(),
            }
            .into());
        }
        return Ok(());
    }

    let dest = output_dir(args.dir.as_deref())?;
    let mut progress = progress::select(json, args.verbose, args.quiet, "Inflating");
    let report = add_archive_context(
        extract_archive_with_progress(&args.archive, &dest, &config, progress.as_mut()),
        &args.archive,
    )?;
    drop(progress);

    formatter.format_extraction_result(&args.archive, &report)
}
