//! Private coordinator <-> worker wire protocol.
//!
//! The protocol is closed: the coordinator only ever talks to workers it spawned from its own
//! binary, so there is no versioning or negotiation. Each worker has one byte stream in each
//! direction; tasks flow down, results (header + raw RGBA8 payload) flow back.

/// All-or-nothing stream IO and message framing.
pub mod stream;
/// Fixed-layout message encoding.
pub mod wire;
