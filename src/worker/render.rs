use crate::foundation::core::{Canvas, FrameIndex};

/// Frames per animation loop of the built-in renderer.
pub const TIME_STEPS: u32 = 240;

/// Pure pixel generator run inside worker processes.
///
/// Implementations must be deterministic for fixed inputs and return exactly
/// `size.width * size.height * 4` straight-alpha RGBA8 bytes, row-major, no stride padding.
pub trait FrameRenderer: Send {
    /// Render one frame.
    fn render(&self, size: Canvas, frame: FrameIndex, sequence_id: u32) -> Vec<u8>;

    /// Frames per loop; the worker derives `sequence_id = frame / time_steps`.
    fn time_steps(&self) -> u32 {
        TIME_STEPS
    }
}

/// Animated checkerboard: tiles scroll diagonally and the palette changes once per loop.
#[derive(Clone, Copy, Debug)]
pub struct CheckerRenderer {
    /// Tile edge length in pixels.
    pub tile: u32,
}

impl Default for CheckerRenderer {
    fn default() -> Self {
        Self { tile: 32 }
    }
}

const PALETTES: [[[u8; 3]; 2]; 4] = [
    [[0x18, 0x1c, 0x2a], [0xe0, 0x6c, 0x4c]],
    [[0x10, 0x24, 0x1c], [0x7c, 0xd0, 0x8c]],
    [[0x24, 0x14, 0x2c], [0xc8, 0x8c, 0xe8]],
    [[0x2a, 0x22, 0x10], [0xf0, 0xc8, 0x50]],
];

impl FrameRenderer for CheckerRenderer {
    fn render(&self, size: Canvas, frame: FrameIndex, sequence_id: u32) -> Vec<u8> {
        let mut out = vec![0u8; size.rgba8_len()];
        if size.is_empty() {
            return out;
        }

        let tile = self.tile.max(1);
        let t = frame.0 % self.time_steps().max(1);
        let shift = (t * tile * 2) / self.time_steps().max(1);
        let palette = PALETTES[(sequence_id as usize) % PALETTES.len()];

        for (y, row) in out.chunks_exact_mut(size.width as usize * 4).enumerate() {
            let ty = (y as u32 + shift) / tile;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let tx = (x as u32 + shift) / tile;
                let rgb = palette[((tx + ty) & 1) as usize];
                px[..3].copy_from_slice(&rgb);
                px[3] = 0xff;
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/render.rs"]
mod tests;
