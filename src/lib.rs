//! Plasma is a multi-process animation frame pipeline.
//!
//! A single-threaded coordinator keeps a display surface and an icon surface fed with frames
//! rendered by a pool of worker processes:
//!
//! - Spawn a [`WorkerPool`] that speaks the private task/result protocol over pipes
//! - Drive it with a [`Dispatcher`], which bounds in-flight and buffered work and restores
//!   presentation order through a [`FrameQueue`]
//! - Run a [`Session`] that ties the dispatcher to a [`DisplaySource`] and a [`PresentSink`]
//!
//! Resizing or iconifying the display starts a new [`Generation`]; results from older generations
//! are discarded on arrival.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Value types, errors and configuration.
pub mod foundation;
/// Host collaborators and the presentation adapter.
pub mod present;
/// Coordinator <-> worker wire protocol.
pub mod protocol;
/// Reassembly queue and dispatcher.
pub mod schedule;
/// Event loop.
pub mod session;
/// Worker processes: pool, serving loop, renderer.
pub mod worker;

pub use crate::foundation::config::{
    DEFAULT_ICON_SIZE, DEFAULT_MAX_PENDING, DEFAULT_TARGET_FPS, PipelineConfig,
};
pub use crate::foundation::core::{Canvas, DisplayState, FrameIndex, Generation, SurfaceKind};
pub use crate::foundation::error::{PlasmaError, PlasmaResult};

pub use crate::present::adapter::Presenter;
pub use crate::present::host::{DisplayChange, DisplaySource, FixedDisplay, ScriptedDisplay};
pub use crate::present::sink::{InMemorySink, NullSink, PngDirSink, PresentSink, PresentedFrame};
pub use crate::protocol::stream::{
    Incoming, ReadStatus, read_all, read_result, read_task, write_all, write_result, write_task,
};
pub use crate::protocol::wire::{MAX_PAYLOAD_BYTES, ResultHeader, Task};
pub use crate::schedule::dispatcher::{DispatchStats, Dispatcher};
pub use crate::schedule::queue::{Frame, FrameQueue};
pub use crate::session::event_loop::{RunLimit, Session};
pub use crate::worker::pool::{EventSource, TaskSubmit, WorkerCommand, WorkerEvent, WorkerPool};
pub use crate::worker::process::{WorkerExit, run_worker};
pub use crate::worker::render::{CheckerRenderer, FrameRenderer, TIME_STEPS};
