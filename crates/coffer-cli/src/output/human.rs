//! Human-readable output with optional colors.

use super::formatter::OutputFormatter;
use anyhow::Result;
use chrono::DateTime;
use coffer_core::ArchiveManifest;
use coffer_core::CreationReport;
use coffer_core::ExtractionReport;
use coffer_core::VerificationReport;
use coffer_core::types::ArchiveEntry;
use coffer_core::types::EntryKind;
use console::Term;
use console::style;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn heading(&self, text: &str) {
        if self.use_colors {
            self.line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            self.line(text);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    /// `ls -l` style type and permission column.
    fn mode_string(entry: &ArchiveEntry) -> String {
        let mode = entry.effective_mode();
        let mut out = String::with_capacity(10);
        out.push(entry.kind.type_char());
        for shift in [6, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            out.push(if bits & 0o4 == 0 { '-' } else { 'r' });
            out.push(if bits & 0o2 == 0 { '-' } else { 'w' });
            out.push(if bits & 0o1 == 0 { '-' } else { 'x' });
        }
        out
    }

    fn format_owner(entry: &ArchiveEntry) -> String {
        let id = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        format!("{}/{}", id(entry.uid), id(entry.gid))
    }

    /// Modification time as UTC `YYYY-MM-DD HH:MM`.
    fn format_mtime(mtime: u64) -> String {
        i64::try_from(mtime)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map_or_else(
                || "-".to_string(),
                |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
            )
    }

    fn long_listing_line(entry: &ArchiveEntry) -> String {
        let mut line = format!(
            "{} {:>11} {:>10} {} {}",
            Self::mode_string(entry),
            Self::format_owner(entry),
            entry.size,
            Self::format_mtime(entry.mtime),
            entry.name
        );
        if let Some(target) = &entry.link_target {
            match entry.kind {
                EntryKind::Hardlink => line.push_str(&format!(" link to {target}")),
                _ => line.push_str(&format!(" -> {target}")),
            }
        }
        line
    }

    fn print_skips(&self, report: &ExtractionReport) {
        if report.skipped.is_empty() {
            return;
        }
        self.line(&format!(
            "  Skipped:          {}",
            Self::format_number(report.entries_skipped())
        ));
        if !self.verbose {
            return;
        }
        for skipped in &report.skipped {
            if skipped.message.is_empty() {
                self.line(&format!("    {} ({})", skipped.name, skipped.reason));
            } else {
                self.line(&format!(
                    "    {} ({}: {})",
                    skipped.name, skipped.reason, skipped.message
                ));
            }
        }
    }

    fn print_warnings(&self, warnings: &[String]) {
        if warnings.is_empty() || !self.verbose {
            return;
        }
        self.line("");
        self.line("Warnings:");
        for warning in warnings {
            if self.use_colors {
                self.line(&format!("  {} {warning}", style("⚠").yellow()));
            } else {
                self.line(&format!("  {warning}"));
            }
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.heading(&format!("Archive created: {}", output_path.display()));
        self.line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        self.line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        if report.symlinks_added + report.hardlinks_added > 0 {
            self.line(&format!(
                "  Links:            {}",
                Self::format_number(report.symlinks_added + report.hardlinks_added)
            ));
        }
        self.line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        self.line(&format!(
            "  Archive size:     {} ({:.1}% saved)",
            Self::format_size(report.bytes_compressed),
            report.compression_percentage()
        ));
        if self.verbose {
            self.line(&format!("  Duration:         {:?}", report.duration));
        }
        self.print_warnings(&report.warnings);

        Ok(())
    }

    fn format_extraction_result(&self, archive: &Path, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.heading(&format!("Extracted {}", archive.display()));
        self.line(&format!(
            "  Files extracted:  {}",
            Self::format_number(report.files_extracted)
        ));
        self.line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_created)
        ));
        if report.symlinks_created + report.hardlinks_created > 0 {
            self.line(&format!(
                "  Links:            {}",
                Self::format_number(report.symlinks_created + report.hardlinks_created)
            ));
        }
        self.line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        self.print_skips(report);
        if self.verbose {
            self.line(&format!("  Duration:         {:?}", report.duration));
        }
        self.print_warnings(&report.warnings);

        Ok(())
    }

    fn format_tar_listing(&self, manifest: &ArchiveManifest, long: bool) -> Result<()> {
        if !long {
            for entry in &manifest.entries {
                self.line(&entry.name);
            }
            return Ok(());
        }

        for entry in &manifest.entries {
            self.line(&Self::long_listing_line(entry));
        }
        self.line(&format!(
            "{} entries, {} ({} bytes)",
            Self::format_number(manifest.total_entries),
            Self::format_size(manifest.total_size),
            manifest.total_size
        ));
        Ok(())
    }

    fn format_zip_listing(&self, manifest: &ArchiveManifest) -> Result<()> {
        self.line(&format!(
            "{:>9}  {:>10}  {:<7}  {:<16}  Name",
            "Length", "Compressed", "Method", "Date"
        ));
        self.line(&format!(
            "{:->9}  {:->10}  {:-<7}  {:-<16}  ----",
            "", "", "", ""
        ));
        for entry in &manifest.entries {
            let method = entry
                .method
                .map_or_else(|| "-".to_string(), |m| m.to_string());
            self.line(&format!(
                "{:>9}  {:>10}  {:<7}  {:<16}  {}",
                entry.size,
                entry.compressed_size.unwrap_or(entry.size),
                method,
                Self::format_mtime(entry.mtime),
                entry.name
            ));
        }
        self.line(&format!(
            "{:->9}  {:->10}  {:<7}  {:<16}  ----",
            "", "", "", ""
        ));
        self.line(&format!(
            "{:>9}  {:>10}  {:<7}  {:<16}  {} files",
            manifest.total_size,
            manifest.total_compressed.unwrap_or(manifest.total_size),
            "",
            "",
            manifest.total_entries
        ));
        Ok(())
    }

    fn format_verification_report(
        &self,
        archive: &Path,
        report: &VerificationReport,
    ) -> Result<()> {
        for failure in &report.failures {
            let status = if self.use_colors {
                style("FAILED").red().bold().to_string()
            } else {
                "FAILED".to_string()
            };
            self.line(&format!(
                "    testing: {:<40} {status} ({})",
                failure.name, failure.message
            ));
        }

        if report.is_ok() {
            if !self.quiet {
                self.heading(&format!(
                    "No errors detected in compressed data of {}.",
                    archive.display()
                ));
            }
        } else {
            self.line(&format!(
                "{} error(s) detected in {}.",
                report.failures.len(),
                archive.display()
            ));
        }

        if self.verbose {
            self.line(&format!(
                "  Entries checked:  {}",
                Self::format_number(report.entries_checked)
            ));
            self.line(&format!(
                "  Bytes checked:    {}",
                Self::format_size(report.bytes_checked)
            ));
        }
        Ok(())
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!(
                "{} {operation} failed: {error:?}",
                style("error:").red().bold()
            ));
        } else {
            let _ = term.write_line(&format!("error: {operation} failed: {error:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1024), "1.0 KB");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024), "1.0 MB");
        assert_eq!(HumanFormatter::format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_mode_string() {
        let mut entry = ArchiveEntry::new("bin/run.sh", EntryKind::File, 10);
        entry.mode = 0o755;
        assert_eq!(HumanFormatter::mode_string(&entry), "-rwxr-xr-x");

        let dir = ArchiveEntry::new("docs/", EntryKind::Directory, 0);
        assert_eq!(HumanFormatter::mode_string(&dir), "drwxr-xr-x");

        let mut link = ArchiveEntry::new("link", EntryKind::Symlink, 0);
        link.mode = 0o777;
        assert_eq!(HumanFormatter::mode_string(&link), "lrwxrwxrwx");
    }

    #[test]
    fn test_format_mtime_is_utc() {
        assert_eq!(HumanFormatter::format_mtime(0), "1970-01-01 00:00");
        assert_eq!(
            HumanFormatter::format_mtime(1_600_000_000),
            "2020-09-13 12:26"
        );
        assert_eq!(HumanFormatter::format_mtime(u64::MAX), "-");
    }

    #[test]
    fn test_long_listing_line() {
        let mut entry = ArchiveEntry::new("link", EntryKind::Symlink, 0);
        entry.mode = 0o777;
        entry.mtime = 1_600_000_000;
        entry.uid = Some(1000);
        entry.gid = Some(100);
        entry.link_target = Some("a.txt".into());
        let line = HumanFormatter::long_listing_line(&entry);
        assert!(line.starts_with("lrwxrwxrwx"));
        assert!(line.contains("1000/100"));
        assert!(line.contains("2020-09-13 12:26"));
        assert!(line.ends_with("link -> a.txt"));

        let mut hard = ArchiveEntry::new("hard", EntryKind::Hardlink, 0);
        hard.link_target = Some("a.txt".into());
        assert!(HumanFormatter::long_listing_line(&hard).ends_with("hard link to a.txt"));
        assert!(HumanFormatter::long_listing_line(&hard).contains("-/-"));
    }
}
