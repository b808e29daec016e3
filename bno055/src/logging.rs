//! Node logging.
//!
//! Driver code logs through the [`Logger`] capability so that it can be
//! handed a node's logger or a test double. [`TracingLogger`] forwards to
//! `tracing` with the node name attached.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The logging capability a node hands to its components.
pub trait Logger {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
}

impl<L: Logger + ?Sized> Logger for &L {
    fn info(&self, msg: &str) {
        (**self).info(msg)
    }

    fn warn(&self, msg: &str) {
        (**self).warn(msg)
    }
}

/// Logger backed by `tracing`, tagged with the owning node's name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    node: String,
}

impl TracingLogger {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(node = %self.node, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(node = %self.node, "{}", msg);
    }
}

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `debug` selects between debug and
/// info output for this crate. Calling it twice is harmless.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("bno055=debug,bno055_params=debug")
        } else {
            EnvFilter::new("bno055=info,bno055_params=info")
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
