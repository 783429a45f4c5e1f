use std::collections::VecDeque;

use crate::foundation::core::{Canvas, FrameIndex, Generation, SurfaceKind};
use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::protocol::wire::ResultHeader;

/// A completed, not yet presented frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Generation the frame was requested in.
    pub generation: Generation,
    /// Position in presentation order.
    pub index: FrameIndex,
    /// Pixel dimensions.
    pub size: Canvas,
    /// Destination surface.
    pub surface: SurfaceKind,
    /// Straight-alpha RGBA8, `size.width * size.height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Build a frame from a worker result, enforcing the payload size contract.
    pub fn from_result(header: ResultHeader, payload: Vec<u8>) -> PlasmaResult<Self> {
        let size = header.validate()?;
        if payload.len() != size.rgba8_len() {
            return Err(PlasmaError::protocol(format!(
                "frame {} carries {} bytes, expected {}",
                header.frame_index.0,
                payload.len(),
                size.rgba8_len()
            )));
        }
        Ok(Self {
            generation: header.generation,
            index: header.frame_index,
            size,
            surface: header.surface,
            pixels: payload,
        })
    }
}

/// Index-ordered buffer restoring presentation order after out-of-order worker completion.
///
/// Frames with equal indices keep their arrival order.
#[derive(Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<Frame>,
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping ascending `index` order.
    pub fn insert(&mut self, frame: Frame) {
        let at = self.frames.partition_point(|f| f.index <= frame.index);
        self.frames.insert(at, frame);
    }

    /// Remove and return the lowest-index frame.
    pub fn pop_oldest(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Borrow the lowest-index frame.
    pub fn peek_oldest(&self) -> Option<&Frame> {
        self.frames.front()
    }

    /// Drop every buffered frame and release its pixels. Returns how many were dropped.
    pub fn purge_all(&mut self) -> usize {
        let n = self.frames.len();
        self.frames = VecDeque::new();
        n
    }

    /// Buffered, undisplayed frames.
    pub fn count(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total pixel bytes held.
    pub fn buffered_bytes(&self) -> usize {
        self.frames.iter().map(|f| f.pixels.len()).sum()
    }

    /// Iterate in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/queue.rs"]
mod tests;
