//! CLI argument parsing using clap.

use clap::ArgGroup;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use coffer_core::formats::Compression;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coffer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, extract or list tar archives
    Tar(TarArgs),
    /// Package files into a zip archive
    Zip(ZipArgs),
    /// Extract, list or test a zip archive
    Unzip(UnzipArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Returns the `(verbose, quiet)` flags of the selected subcommand.
    pub const fn verbosity(&self) -> (bool, bool) {
        match self {
            Self::Tar(args) => (args.verbose, args.quiet),
            Self::Zip(args) => (args.verbose, args.quiet),
            Self::Unzip(args) => (args.verbose, args.quiet),
            Self::Completion { .. } => (false, true),
        }
    }

    /// Operation name used in diagnostics and JSON envelopes.
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Tar(args) if args.create => "create",
            Self::Tar(args) if args.extract => "extract",
            Self::Tar(_) => "list",
            Self::Zip(_) => "create",
            Self::Unzip(args) if args.list => "list",
            Self::Unzip(args) if args.test => "test",
            Self::Unzip(_) => "extract",
            Self::Completion { .. } => "completion",
        }
    }
}

#[derive(clap::Args)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["create", "extract", "list"])
))]
#[command(group(ArgGroup::new("codec").args(["gzip", "bzip2", "xz", "zstd"])))]
pub struct TarArgs {
    /// Create a new archive from PATHs
    #[arg(short = 'c', long)]
    pub create: bool,

    /// Extract the archive
    #[arg(short = 'x', long)]
    pub extract: bool,

    /// List the archive contents
    #[arg(short = 't', long)]
    pub list: bool,

    /// Archive file
    #[arg(short = 'f', long = "file", value_name = "ARCHIVE")]
    pub file: PathBuf,

    /// Print member names as they are processed; long listing with -t
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Filter the archive through gzip
    #[arg(short = 'z', long)]
    pub gzip: bool,

    /// Filter the archive through bzip2
    #[arg(short = 'j', long)]
    pub bzip2: bool,

    /// Filter the archive through xz
    #[arg(short = 'J', long)]
    pub xz: bool,

    /// Filter the archive through zstd
    #[arg(long)]
    pub zstd: bool,

    /// Compression level (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub level: Option<u8>,

    /// Skip members whose name matches PATTERN
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Only process files whose name matches PATTERN
    #[arg(long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Store every file in full instead of recording hardlinks
    #[arg(long)]
    pub no_hardlinks: bool,

    /// Replace an existing archive
    #[arg(long)]
    pub force: bool,

    /// Extract into DIR instead of the current directory
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Replace existing files when extracting
    #[arg(long)]
    pub overwrite: bool,

    /// Abort on the first unsafe member name instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Files, directories or glob patterns to archive
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

impl TarArgs {
    /// Compression requested by flag, if any.
    pub const fn compression(&self) -> Option<Compression> {
        if self.gzip {
            Some(Compression::Gzip)
        } else if self.bzip2 {
            Some(Compression::Bzip2)
        } else if self.xz {
            Some(Compression::Xz)
        } else if self.zstd {
            Some(Compression::Zstd)
        } else {
            None
        }
    }
}

#[derive(clap::Args)]
pub struct ZipArgs {
    /// Archive to write; `.zip` is appended when it has no extension
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Files, directories or glob patterns to add
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Travel the directory structure recursively
    #[arg(short = 'r', long)]
    pub recurse: bool,

    /// Print each member name as it is added
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Skip files whose name matches PATTERN
    #[arg(
        short = 'x',
        long = "exclude",
        visible_short_alias = 'e',
        value_name = "PATTERN"
    )]
    pub exclude: Vec<String>,

    /// Only add files whose name matches PATTERN
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Compression level (0 stores, 1-9 deflates)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub level: Option<u8>,

    /// Replace an existing archive
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("mode").args(["list", "test"])))]
pub struct UnzipArgs {
    /// Zip archive to read
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// List members with sizes, method and date
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Test member data without extracting
    #[arg(short = 't', long)]
    pub test: bool,

    /// Overwrite existing files
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Extract into DIR instead of the current directory
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Skip members whose name matches PATTERN
    #[arg(
        short = 'x',
        long = "exclude",
        visible_short_alias = 'e',
        value_name = "PATTERN"
    )]
    pub exclude: Vec<String>,

    /// Only process members whose name matches PATTERN
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Print each member name as it is extracted
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Abort on the first unsafe member name instead of skipping it
    #[arg(long)]
    pub strict: bool,
}
