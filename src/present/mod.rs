//! Host-facing edge of the pipeline.
//!
//! The host is reached through two narrow seams: [`host::DisplaySource`] reports the current
//! canvas size and visibility once per tick, and [`sink::PresentSink`] shows an installed image on
//! one of the two surfaces. [`adapter::Presenter`] sits between the dispatcher and the sink.

/// Installs dequeued frames as per-surface images.
pub mod adapter;
/// Display size/visibility sources.
pub mod host;
/// Presentation sinks.
pub mod sink;
