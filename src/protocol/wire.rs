use crate::foundation::core::{Canvas, FrameIndex, Generation, SurfaceKind};
use crate::foundation::error::{PlasmaError, PlasmaResult};

/// Encoded size of a [`Task`]: five `i32` fields.
pub const TASK_LEN: usize = 5 * 4;
/// Encoded size of a [`ResultHeader`]: six `i32` fields.
pub const RESULT_HEADER_LEN: usize = 6 * 4;
/// Largest payload a reader will drain to resynchronise after a malformed header.
pub const MAX_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Request to render one frame at one resolution for one surface.
///
/// Wire layout (little-endian `i32`, no padding):
/// `generation, frame_index, width, height, surface_kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Task {
    /// Dispatcher generation the task was issued in.
    pub generation: Generation,
    /// Frame counter within the generation.
    pub frame_index: FrameIndex,
    /// Requested frame size. Workers skip tasks with a zero dimension.
    pub size: Canvas,
    /// Target surface, echoed back in the result.
    pub surface: SurfaceKind,
}

impl Task {
    /// Serialize into the fixed wire layout.
    pub fn encode(&self) -> PlasmaResult<[u8; TASK_LEN]> {
        let mut out = [0u8; TASK_LEN];
        let fields = [
            to_wire_i32(self.generation.0, "generation")?,
            to_wire_i32(self.frame_index.0, "frame_index")?,
            to_wire_i32(self.size.width, "width")?,
            to_wire_i32(self.size.height, "height")?,
            self.surface.to_wire(),
        ];
        put_fields(&mut out, &fields);
        Ok(out)
    }

    /// Parse the fixed wire layout.
    ///
    /// Non-positive dimensions decode to zero so the worker can skip them instead of failing.
    pub fn decode(buf: &[u8; TASK_LEN]) -> PlasmaResult<Self> {
        let f = get_fields::<5>(buf);
        Ok(Self {
            generation: Generation(from_wire_u32(f[0], "generation")?),
            frame_index: FrameIndex(from_wire_u32(f[1], "frame_index")?),
            size: Canvas::new(f[2].max(0) as u32, f[3].max(0) as u32),
            surface: SurfaceKind::from_wire(f[4])?,
        })
    }
}

/// Header preceding a rendered frame's RGBA8 payload.
///
/// Wire layout (little-endian `i32`, no padding):
/// `generation, frame_index, width, height, surface_kind, payload_size`, followed by
/// `payload_size` raw bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultHeader {
    /// Generation copied from the task.
    pub generation: Generation,
    /// Frame index copied from the task.
    pub frame_index: FrameIndex,
    /// Width copied from the task.
    pub width: i32,
    /// Height copied from the task.
    pub height: i32,
    /// Surface kind copied from the task.
    pub surface: SurfaceKind,
    /// Declared payload length in bytes. Must equal `width * height * 4`.
    pub payload_size: i32,
}

impl ResultHeader {
    /// Header answering `task` with a payload of `payload_len` bytes.
    pub fn for_task(task: &Task, payload_len: usize) -> PlasmaResult<Self> {
        Ok(Self {
            generation: task.generation,
            frame_index: task.frame_index,
            width: to_wire_i32(task.size.width, "width")?,
            height: to_wire_i32(task.size.height, "height")?,
            surface: task.surface,
            payload_size: i32::try_from(payload_len).map_err(|_| {
                PlasmaError::validation(format!("payload of {payload_len} bytes exceeds i32"))
            })?,
        })
    }

    /// Serialize into the fixed wire layout.
    pub fn encode(&self) -> PlasmaResult<[u8; RESULT_HEADER_LEN]> {
        let mut out = [0u8; RESULT_HEADER_LEN];
        let fields = [
            to_wire_i32(self.generation.0, "generation")?,
            to_wire_i32(self.frame_index.0, "frame_index")?,
            self.width,
            self.height,
            self.surface.to_wire(),
            self.payload_size,
        ];
        put_fields(&mut out, &fields);
        Ok(out)
    }

    /// Parse the fixed wire layout. Sizes are not checked here; see [`ResultHeader::validate`].
    pub fn decode(buf: &[u8; RESULT_HEADER_LEN]) -> PlasmaResult<Self> {
        let f = get_fields::<6>(buf);
        Ok(Self {
            generation: Generation(from_wire_u32(f[0], "generation")?),
            frame_index: FrameIndex(from_wire_u32(f[1], "frame_index")?),
            width: f[2],
            height: f[3],
            surface: SurfaceKind::from_wire(f[4])?,
            payload_size: f[5],
        })
    }

    /// `width * height * 4` for the declared dimensions, if they are positive.
    pub fn expected_payload_len(&self) -> Option<usize> {
        if self.width <= 0 || self.height <= 0 {
            return None;
        }
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }

    /// Check the payload size contract.
    pub fn validate(&self) -> PlasmaResult<Canvas> {
        let Some(expected) = self.expected_payload_len() else {
            return Err(PlasmaError::protocol(format!(
                "result for frame {} has non-positive size {}x{}",
                self.frame_index.0, self.width, self.height
            )));
        };
        if usize::try_from(self.payload_size).ok() != Some(expected) {
            return Err(PlasmaError::protocol(format!(
                "result for frame {} declares {} payload bytes, expected {expected}",
                self.frame_index.0, self.payload_size
            )));
        }
        Ok(Canvas::new(self.width as u32, self.height as u32))
    }

    /// Payload bytes a reader can skip to stay aligned on the stream, if the size is sane.
    pub fn drainable_len(&self) -> Option<usize> {
        usize::try_from(self.payload_size)
            .ok()
            .filter(|&n| n <= MAX_PAYLOAD_BYTES)
    }
}

fn to_wire_i32(v: u32, field: &str) -> PlasmaResult<i32> {
    i32::try_from(v).map_err(|_| PlasmaError::validation(format!("{field} {v} exceeds i32")))
}

fn from_wire_u32(v: i32, field: &str) -> PlasmaResult<u32> {
    u32::try_from(v).map_err(|_| PlasmaError::protocol(format!("negative {field} {v}")))
}

fn put_fields(out: &mut [u8], fields: &[i32]) {
    for (chunk, v) in out.chunks_exact_mut(4).zip(fields) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

fn get_fields<const N: usize>(buf: &[u8]) -> [i32; N] {
    let mut out = [0i32; N];
    for (v, chunk) in out.iter_mut().zip(buf.chunks_exact(4)) {
        *v = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/wire.rs"]
mod tests;
