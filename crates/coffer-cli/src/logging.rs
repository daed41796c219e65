//! Diagnostic logging setup.

use console::Term;
use tracing::Level;

/// Maps the verbosity flags to a maximum log level.
pub const fn level(verbose: bool, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Installs the stderr subscriber. Later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_ansi(Term::stderr().is_term())
        .with_target(false)
        .without_time()
        .try_init();
}
