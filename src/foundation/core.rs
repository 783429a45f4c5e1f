use crate::foundation::error::{PlasmaError, PlasmaResult};

/// 0-based frame counter within one generation.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// The index following `self`.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Coordinator-local epoch. Results tagged with another generation are cancellation artifacts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Generation(pub u32);

impl Generation {
    /// Generation the dispatcher starts in.
    pub const FIRST: Generation = Generation(1);

    /// The generation following `self`.
    pub fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Surface dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas of `width` x `height` pixels.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size in bytes of a tightly packed RGBA8 buffer covering this canvas.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Canvas {
    type Err = PlasmaError;

    /// Parse `WxH`, e.g. `640x480`.
    fn from_str(s: &str) -> PlasmaResult<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| PlasmaError::validation(format!("expected WxH, got '{s}'")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| PlasmaError::validation(format!("invalid dimension '{v}': {e}")))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Which host surface a frame is destined for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SurfaceKind {
    /// The on-screen drawing canvas.
    Main,
    /// The small window icon, used while iconified.
    Icon,
}

impl SurfaceKind {
    /// Wire value of this surface kind.
    pub fn to_wire(self) -> i32 {
        match self {
            Self::Main => 0,
            Self::Icon => 1,
        }
    }

    /// Decode a wire value.
    pub fn from_wire(v: i32) -> PlasmaResult<Self> {
        match v {
            0 => Ok(Self::Main),
            1 => Ok(Self::Icon),
            other => Err(PlasmaError::protocol(format!("unknown surface kind {other}"))),
        }
    }
}

impl TryFrom<i32> for SurfaceKind {
    type Error = PlasmaError;

    fn try_from(v: i32) -> PlasmaResult<Self> {
        Self::from_wire(v)
    }
}

/// One sample of the host's display: current canvas size and whether the window is iconified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Current canvas size. A zero-sized canvas is treated as "not laid out yet".
    pub canvas: Canvas,
    /// Whether the window is currently iconified.
    pub iconified: bool,
}

impl DisplayState {
    /// A visible (non-iconified) display of the given size.
    pub fn visible(canvas: Canvas) -> Self {
        Self {
            canvas,
            iconified: false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
