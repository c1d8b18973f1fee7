//! Logging infrastructure
//!
//! Provides tracing-based structured logging. The driver (out of scope for
//! this crate) decides whether/where to persist a log file; this module only
//! wires up the `tracing` subscriber the rest of the pipeline logs through.

use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with console output, and optional file output under `log_dir`.
pub fn init_logging(log_dir: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(ref dir) = log_dir {
        std::fs::create_dir_all(dir)?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cnc_motion_core=debug"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file_layer = if let Some(dir) = log_dir {
        let log_file = dir.join("cnc-motion-core.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        Some(
            fmt::layer()
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(console_layer);

    if let Some(file_layer) = file_layer {
        registry.with(file_layer).init();
    } else {
        registry.init();
    }

    Ok(())
}
