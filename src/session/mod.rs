/// The coordinator's event loop over workers, timer, display and sink.
pub mod event_loop;
