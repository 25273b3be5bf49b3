//! Logging setup for the command line.
//!
//! Logs go to stderr so that JSON written to stdout stays machine readable.
//! `RUST_LOG` takes precedence; otherwise `--verbose` selects `debug` and the
//! default is `info`.
//!
//! ```bash
//! RUST_LOG=warn stockroom demo      # only rejections and denials
//! stockroom -v run session.json     # request payloads too
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: tests may run the CLI more than once in one process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
