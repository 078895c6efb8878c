//! Batch driver for the ix introspection generator.
//!
//! Generates one artifact per bean class. Classes are independent, so a
//! batch runs them on a scoped worker pool; a failing class is reported
//! and skipped without affecting the others.
//!
//! # Tracing
//!
//! Call [`init_tracing`] once at startup and set `RUST_LOG` to enable
//! output, e.g. `RUST_LOG=ix_gen=debug` for per-class registration detail.

mod batch;

use std::sync::Once;

pub use batch::{generate_batch, BatchConfig, BatchReport, ClassFailure};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
