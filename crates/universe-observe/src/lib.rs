//! Observability setup for UniVerse: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
