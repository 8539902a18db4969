//! Core types and utilities shared by the Grandmaster crates.
//!
//! This crate is intentionally small. It does *not* depend on any concrete
//! image type, serial port or chess rules implementation.

mod logger;
mod sink;
mod tag;

pub use sink::{LogSink, MemorySink, OutputSink, SharedSink, StdoutSink};
pub use tag::{TagDetection, TagFamily};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level, LOG_ENV};
