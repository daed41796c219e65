//! `coffer zip`: package files into a zip archive.

use crate::cli::ZipArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress;
use anyhow::Result;
use coffer_core::CreationConfig;
use coffer_core::create_archive_with_progress;
use coffer_core::creation::with_default_extension;
use coffer_core::formats::ArchiveType;

pub fn execute(args: &ZipArgs, formatter: &dyn OutputFormatter, json: bool) -> Result<()> {
    let output = with_default_extension(&args.archive, ArchiveType::Zip);
    let config = CreationConfig::default()
        .with_format(Some(ArchiveType::Zip))
        .with_recursive(args.recurse)
        .with_compression_level(args.level)
        .with_exclude_patterns(args.exclude.clone())
        .with_include_patterns(args.include.clone())
        .with_overwrite(args.force);

    let mut progress = progress::select(json, args.verbose, args.quiet, "Adding");
    let report = add_archive_context(
        create_archive_with_progress(&output, args.paths.as_slice(), &config, progress.as_mut()),
        &output,
    )?;
    drop(progress);

    formatter.format_creation_result(&output, &report)
}
