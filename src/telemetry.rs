//! Tracing setup helpers.
//!
//! The engine and the HTTP decision client are instrumented with `tracing`
//! spans carrying the session id, step, and operation. Binaries call
//! [`init_tracing`] once at startup; libraries embedding the engine usually
//! install their own subscriber instead.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "info,colloquy=info";

/// Install a fmt subscriber with env-filter support.
///
/// Honors `RUST_LOG` when present, otherwise falls back to
/// [`DEFAULT_DIRECTIVES`]. Span close events are included so step timings
/// show up in the log.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_span_events(FmtSpan::CLOSE))
        .try_init()
}
