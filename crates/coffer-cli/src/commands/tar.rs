//! `coffer tar`: create, extract and list tar archives.

use super::output_dir;
use crate::cli::TarArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress;
use anyhow::Result;
use anyhow::bail;
use coffer_core::CreationConfig;
use coffer_core::ExtractionConfig;
use coffer_core::create_archive_with_progress;
use coffer_core::extract_archive_with_progress;
use coffer_core::formats::ArchiveType;
use coffer_core::formats::ContainerKind;
use coffer_core::formats::detect_format;
use coffer_core::list_archive;

pub fn execute(args: &TarArgs, formatter: &dyn OutputFormatter, json: bool) -> Result<()> {
    let archive_type = add_archive_context(archive_type(args), &args.file)?;

    if args.create {
        create(args, archive_type, formatter, json)
    } else if args.extract {
        extract(args, archive_type, formatter, json)
    } else {
        list(args, archive_type, formatter)
    }
}

/// Codec flag first, then the file extension, then plain tar.
fn archive_type(args: &TarArgs) -> coffer_core::Result<ArchiveType> {
    if let Some(compression) = args.compression() {
        return ArchiveType::from_parts(ContainerKind::Tar, compression);
    }
    Ok(detect_format(&args.file)
        .ok()
        .filter(|t| t.container() == ContainerKind::Tar)
        .unwrap_or(ArchiveType::Tar))
}

fn create(
    args: &TarArgs,
    archive_type: ArchiveType,
    formatter: &dyn OutputFormatter,
    json: bool,
) -> Result<()> {
    if args.paths.is_empty() {
        bail!(
            "Refusing to create an empty archive\n\
             HINT: Name the files or directories to archive after -f ARCHIVE."
        );
    }

    let config = CreationConfig::default()
        .with_format(Some(archive_type))
        .with_compression_level(args.level)
        .with_exclude_patterns(args.exclude.clone())
        .with_include_patterns(args.include.clone())
        .with_detect_hardlinks(!args.no_hardlinks)
        .with_overwrite(args.force);

    let mut progress = progress::select(json, args.verbose, args.quiet, "Creating");
    let report = add_archive_context(
        create_archive_with_progress(
            &args.file,
            args.paths.as_slice(),
            &config,
            progress.as_mut(),
        ),
        &args.file,
    )?;
    drop(progress);

    formatter.format_creation_result(&args.file, &report)
}

fn extract(
    args: &TarArgs,
    archive_type: ArchiveType,
    formatter: &dyn OutputFormatter,
    json: bool,
) -> Result<()> {
    let dest = output_dir(args.directory.as_deref())?;
    let config = ExtractionConfig::default()
        .with_format(Some(archive_type))
        .with_overwrite(args.overwrite)
        .with_strict_paths(args.strict)
        .with_exclude_patterns(args.exclude.clone())
        .with_include_patterns(args.include.clone());

    let mut progress = progress::select(json, args.verbose, args.quiet, "Extracting");
    let report = add_archive_context(
        extract_archive_with_progress(&args.file, &dest, &config, progress.as_mut()),
        &args.file,
    )?;
    drop(progress);

    formatter.format_extraction_result(&args.file, &report)
}

fn list(args: &TarArgs, archive_type: ArchiveType, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = ExtractionConfig::default()
        .with_format(Some(archive_type))
        .with_exclude_patterns(args.exclude.clone())
        .with_include_patterns(args.include.clone());

    let manifest = add_archive_context(list_archive(&args.file, &config), &args.file)?;
    formatter.format_tar_listing(&manifest, args.verbose)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::cli::Commands;
    use clap::Parser;

    fn tar_args(argv: &[&str]) -> TarArgs {
        let mut full = vec!["coffer", "tar"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Tar(args) => args,
            _ => panic!("expected tar"),
        }
    }

    #[test]
    fn test_archive_type_from_flag() {
        let args = tar_args(&["-c", "-j", "-f", "backup", "src"]);
        assert_eq!(archive_type(&args).unwrap(), ArchiveType::TarBz2);
    }

    #[test]
    fn test_archive_type_from_extension() {
        let args = tar_args(&["-x", "-f", "backup.tar.zst"]);
        assert_eq!(archive_type(&args).unwrap(), ArchiveType::TarZst);
    }

    #[test]
    fn test_archive_type_defaults_to_plain_tar() {
        let args = tar_args(&["-t", "-f", "backup"]);
        assert_eq!(archive_type(&args).unwrap(), ArchiveType::Tar);
        let args = tar_args(&["-t", "-f", "backup.zip"]);
        assert_eq!(archive_type(&args).unwrap(), ArchiveType::Tar);
    }
}
